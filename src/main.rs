use debris_fx::content::{AdminGate, ContentStore, JsonFileStore};
use debris_fx::{ControllerState, EffectController, FxConfig, FxResult, HeadlessRenderer};
use std::time::Duration;

const USAGE: &str = "usage: debris-fx [demo | content | content set <file> | login <password>]";

fn main() {
    let mut config = FxConfig::load_or_default();
    config.apply_env_overrides();
    initialize_logging(&config);

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = match args.as_slice() {
        [] | ["demo"] => run_demo(&config),
        ["content"] => print_content(&config),
        ["content", "set", file] => write_content(&config, file),
        ["login", password] => login(&config, password),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("debris-fx failed: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` 优先，否则使用配置中的级别
fn initialize_logging(config: &FxConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.as_filter()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run_demo(config: &FxConfig) -> FxResult<()> {
    let renderer = HeadlessRenderer::default();
    let stats = renderer.stats();
    let mut controller = EffectController::mount(config, Box::new(renderer))?;

    println!("[{}]", controller.trigger_label());
    let state = controller.wait_until_settled(Duration::from_secs(5))?.clone();
    if state != ControllerState::Ready {
        println!("[{}] {:?}", controller.trigger_label(), state);
        controller.unmount();
        return Ok(());
    }
    println!("[{}]", controller.trigger_label());

    controller.trigger()?;
    controller.run_frames(u64::from(config.scene.target_fps) * 2)?;

    let resting = controller
        .scene()
        .particles()
        .iter()
        .filter(|m| m.visible && m.position.y < config.burst.base_height)
        .count();
    println!(
        "frames={} snapshots={} last_tick={:?} visible={} below_spawn={}",
        stats.frames(),
        controller.snapshots_applied(),
        controller.last_tick(),
        stats.visible_particles(),
        resting
    );

    controller.unmount();
    Ok(())
}

fn print_content(config: &FxConfig) -> FxResult<()> {
    let store = JsonFileStore::new(&config.content.data_path);
    let document = store.read()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&document).map_err(debris_fx::core::ContentError::from)?
    );
    Ok(())
}

fn write_content(config: &FxConfig, file: &str) -> FxResult<()> {
    let raw = std::fs::read_to_string(file)?;
    let document: serde_json::Value =
        serde_json::from_str(&raw).map_err(debris_fx::core::ContentError::from)?;
    JsonFileStore::new(&config.content.data_path).write(&document)?;
    println!("Content updated successfully");
    Ok(())
}

fn login(config: &FxConfig, password: &str) -> FxResult<()> {
    AdminGate::from_env(&config.content.admin_password_env).check(password)?;
    println!("Login successful");
    Ok(())
}
