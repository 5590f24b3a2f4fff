use std::io::Write;

use log::LevelFilter;

/// 初始化日志系统
///
/// 默认级别 Info，可通过 RUST_LOG 环境变量覆盖
pub fn init() {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format(|out, record| {
            // 保持现有格式: 时间戳 级别 [文件:行号] [模块] 消息
            let level_color = match record.level() {
                log::Level::Error => "\x1b[31;1m", // 红色加粗
                log::Level::Warn => "\x1b[33m",    // 黄色
                log::Level::Info => "\x1b[32m",    // 绿色
                log::Level::Debug => "\x1b[34m",   // 蓝色
                log::Level::Trace => "\x1b[36m",   // 青色
            };
            let reset = "\x1b[0m";

            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            let target = record.target();

            // 格式: 2025-12-29 10:30:45.123 INFO [main.rs:34] [pinchdrop] Clipboard slot updated
            writeln!(
                out,
                "{} {}{}{} [{}:{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                level_color,
                record.level(),
                reset,
                file,
                line,
                target,
                record.args()
            )
        });

    // 测试内可能被重复调用，忽略二次初始化错误
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger() {
        // 测试日志初始化是否正常（重复调用不应 panic）
        init();
        init();
    }
}
