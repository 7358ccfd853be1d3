//! 固定步长与帧节奏
//!
//! 模拟线程按固定频率步进（默认 60 Hz），渲染循环按自己的目标帧率运行，
//! 两者互不等待。

use std::thread;
use std::time::{Duration, Instant};

/// 默认模拟频率
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// 将频率换算为周期，`hz` 为 0 时按 1 Hz 处理
pub fn period_from_hz(hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(hz.max(1)))
}

/// 渲染帧节奏器
///
/// 每次 `wait()` 睡眠到下一帧的截止时间；如果上一帧已经超时，则立即返回
/// 并从当前时刻重新计时，不会为了追帧而连续补帧。
#[derive(Debug)]
pub struct FramePacer {
    frame_duration: Duration,
    last_frame: Option<Instant>,
}

impl FramePacer {
    pub fn new(target_fps: u32) -> Self {
        Self {
            frame_duration: period_from_hz(target_fps),
            last_frame: None,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// 等待到下一帧
    pub fn wait(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame {
            let deadline = last + self.frame_duration;
            if deadline > now {
                thread::sleep(deadline - now);
                self.last_frame = Some(deadline);
                return;
            }
        }
        self.last_frame = Some(now);
    }
}
