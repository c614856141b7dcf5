//! 日志初始化
//!
//! 默认级别为 `info`，可通过 `RUST_LOG` 覆盖，例如 `RUST_LOG=quiz_publisher=debug`

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化全局日志；重复调用不会报错
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
