//! 核心宏定义
//!
//! 为配置和状态结构体生成 `Default` / `new()` 实现，减少样板代码

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use debris_fx::impl_default;
///
/// struct GroundSlab {
///     half_height: f32,
///     label: String,
/// }
///
/// impl_default!(GroundSlab {
///     half_height: 0.1,
///     label: String::from("ground"),
/// });
///
/// assert_eq!(GroundSlab::default().half_height, 0.1);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

/// 同时实现Default和new()的宏
///
/// 使用示例:
/// ```rust
/// use debris_fx::impl_default_and_new;
///
/// struct FrameCounter {
///     frames: u64,
/// }
///
/// impl_default_and_new!(FrameCounter { frames: 0 });
///
/// assert_eq!(FrameCounter::new().frames, 0);
/// ```
#[macro_export]
macro_rules! impl_default_and_new {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }

        impl $struct_name {
            pub fn new() -> Self {
                Self::default()
            }
        }
    };
}

#[cfg(test)]
mod tests {

    struct TickCounter {
        ticks: u64,
        label: String,
    }

    impl_default_and_new!(TickCounter {
        ticks: 0,
        label: String::from("worker"),
    });

    #[test]
    fn test_impl_default_and_new() {
        let a = TickCounter::default();
        let b = TickCounter::new();

        assert_eq!(a.ticks, 0);
        assert_eq!(a.label, "worker");
        assert_eq!(b.ticks, 0);
        assert_eq!(b.label, "worker");
    }
}
