//! 版本信息接口
//! 启动时一次性预渲染紧凑与美化两份 JSON 文档，请求阶段只做只读选择。

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use tracing::info;

use crate::version::{VersionError, VersionInfo};

/// 预渲染的版本文档，启动后作为只读数据在请求间共享。
#[derive(Clone)]
pub struct VersionDocs {
    compact: Bytes,
    pretty: Bytes,
}

impl VersionDocs {
    /// 构造版本信息并渲染两份文档。任何失败向上传播并中止启动，
    /// 此接口不做按请求重建，长期运行的进程始终报告启动时的 run_time 与 work_dir。
    pub fn prepare(program_name: &str, internal_version: &str) -> Result<Self, VersionError> {
        let info = VersionInfo::new(program_name, internal_version)?;
        let compact = Bytes::from(info.to_json()?);
        let pretty = Bytes::from(info.to_pretty_json()?);

        info!(
            target: "api.version",
            event = "version.docs.ready",
            program = %info.program_name,
            run_time = %info.run_time
        );

        Ok(Self { compact, pretty })
    }

    /// 带任意非空值的 pretty 参数选择美化文档，否则返回紧凑文档。
    fn select(&self, params: &HashMap<String, String>) -> Bytes {
        if params.get("pretty").is_some_and(|v| !v.is_empty()) {
            self.pretty.clone()
        } else {
            self.compact.clone()
        }
    }
}

/// 版本信息处理器：任意方法、任意挂载路径均返回 200 与 application/json。
pub async fn serve_version(
    State(docs): State<VersionDocs>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        docs.select(&params),
    )
}
