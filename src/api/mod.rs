//! 对外 HTTP 接口

mod version;

pub use version::{serve_version, VersionDocs};

use axum::routing::any;
use axum::Router;
use tracing::info;

use crate::version::VersionError;
use crate::CONFIG;

/// 创建应用路由。版本文档在此一次性预渲染，失败即中止启动。
pub fn routes() -> Result<Router, VersionError> {
    let docs = VersionDocs::prepare(&CONFIG.program.name, &CONFIG.program.internal_version)?;

    info!(
        target: "api",
        event = "api.router.build",
        routes = "/version"
    );

    // 处理器本身不区分方法与路径，挂载点由路由层决定
    Ok(Router::new()
        .route("/version", any(serve_version))
        .with_state(docs))
}
