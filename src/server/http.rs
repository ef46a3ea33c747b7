//! HTTP监听与请求服务
//! 版本接口挂载后在此绑定端口并处理优雅退出

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use crate::api;
use crate::util::config::Config;

/// 构建路由、绑定监听地址并服务请求，直到收到退出信号。
/// 响应体写失败属于连接级事件，由服务栈记录，不会改变已提交的状态码。
pub async fn run(config: &Config) -> Result<()> {
    // 路由构建阶段预渲染版本文档，失败即中止启动
    let app = api::routes()?;

    let listener = bind(config.server.port).await?;
    let local_addr = listener.local_addr()?;

    info!(target: "server.http", event = "http.listen", address = %local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP服务异常退出")?;

    info!(target: "server.http", event = "http.stopped");
    Ok(())
}

/// 双栈环境优先IPv6通配地址（localhost → ::1 可达），失败再降级IPv4
async fn bind(port: u16) -> Result<TcpListener> {
    let v6_addr = format!("[::]:{port}");
    match TcpListener::bind(&v6_addr).await {
        Ok(listener) => {
            info!(target: "server.http", event = "http.bind", protocol = "ipv6", address = %v6_addr);
            Ok(listener)
        }
        Err(e6) => {
            warn!("IPv6绑定失败: {}，尝试IPv4", e6);
            let v4_addr = format!("0.0.0.0:{port}");
            let listener = TcpListener::bind(&v4_addr)
                .await
                .with_context(|| format!("端口 {port} 绑定失败 (IPv4)，之前IPv6错误: {e6}"))?;
            info!(target: "server.http", event = "http.bind", protocol = "ipv4", address = %v4_addr);
            Ok(listener)
        }
    }
}

/// 等待 SIGINT 或 SIGTERM
async fn shutdown_signal() {
    tokio::select! {
        _ = ctrl_c() => {
            info!(target: "server.http", event = "http.signal", signal = "SIGINT");
        }
        _ = sigterm() => {
            info!(target: "server.http", event = "http.signal", signal = "SIGTERM");
        }
    }

    info!(target: "server.http", event = "http.shutdown");
}

#[cfg(unix)]
async fn sigterm() {
    match signal(SignalKind::terminate()) {
        Ok(mut term_signal) => {
            term_signal.recv().await;
        }
        Err(e) => {
            warn!("SIGTERM监听注册失败: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// 非Unix系统没有SIGTERM，永远等待
#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending::<()>().await;
}
