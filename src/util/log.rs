//! 日志初始化
//! 控制台输出始终开启，可选每日滚动的文件输出；RUST_LOG 优先于配置级别

use std::io;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::util::config::LoggingConfig;

/// 初始化全局日志订阅器。文件输出开启时返回需要持有到进程退出的刷盘guard。
pub fn log_init_with_config(
    file_prefix: &str,
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>> {
    let use_json = config.structured.unwrap_or(false);

    if !config.file.enabled {
        if use_json {
            Registry::default()
                .with(
                    layer()
                        .json()
                        .with_writer(io::stdout)
                        .with_filter(env_filter(config)),
                )
                .init();
        } else {
            Registry::default()
                .with(layer().with_writer(io::stdout).with_filter(env_filter(config)))
                .init();
        }

        tracing::info!(event = "log.init", level = %config.level, file = false, structured = use_json);
        return Ok(None);
    }

    std::fs::create_dir_all(&config.file.directory)?;
    let appender = daily(&config.file.directory, format!("{file_prefix}.log"));
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    if use_json {
        Registry::default()
            .with(
                layer()
                    .json()
                    .with_writer(io::stdout)
                    .with_filter(env_filter(config)),
            )
            .with(
                layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(file_writer)
                    .with_filter(env_filter(config)),
            )
            .init();
    } else {
        Registry::default()
            .with(layer().with_writer(io::stdout).with_filter(env_filter(config)))
            .with(
                layer()
                    .with_ansi(false)
                    .with_writer(file_writer)
                    .with_filter(env_filter(config)),
            )
            .init();
    }

    tracing::info!(
        event = "log.init",
        level = %config.level,
        file = true,
        directory = %config.file.directory,
        rotation = "daily",
        structured = use_json
    );

    Ok(Some(guard))
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)))
}

// 配置中的级别字符串规范化为过滤指令，无法识别时回退 info
fn default_directive(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "off" => "off",
        "error" => "error",
        "warn" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(default_directive("verbose"), "info");
        assert_eq!(default_directive("WARN"), "warn");
        assert_eq!(default_directive("Trace"), "trace");
    }
}
