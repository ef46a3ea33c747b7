//! 服务器模块
//! 启动流程：日志初始化 → 路由构建（含版本文档预渲染） → 监听与优雅退出

pub mod http;

use anyhow::Result;
use tracing::info;

use crate::util::log;
use crate::{build_info, CONFIG};

/// 启动HTTP服务器
pub async fn start_server() -> Result<()> {
    // guard 持有至进程退出，保证文件日志落盘
    let _log_guard = log::log_init_with_config("version-server", &CONFIG.logging)?;

    info!(
        target: "server",
        event = "server.start",
        build = %build_info::summary(),
        program = %CONFIG.program.name,
        internal_version = %CONFIG.program.internal_version
    );

    http::run(&CONFIG).await
}
