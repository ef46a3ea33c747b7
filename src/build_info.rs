/// 编译时注入的构建元数据，未注入的值为空字符串。
pub const VERSION: &str = env!("APP_BUILD_VERSION");
pub const BRANCH: &str = env!("APP_BUILD_BRANCH");
pub const COMMIT: &str = env!("APP_BUILD_COMMIT");
pub const BUILD_TIMESTAMP: &str = env!("APP_BUILD_TIMESTAMP");
pub const COMMENT: &str = env!("APP_BUILD_COMMENT");
pub const RUSTC_VERSION: &str = env!("APP_RUSTC_VERSION");

/// 可读的构建摘要，用于启动日志。
pub fn summary() -> String {
    format!(
        "{} (build {}, commit {}, built at {})",
        env!("CARGO_PKG_VERSION"),
        VERSION,
        COMMIT,
        BUILD_TIMESTAMP
    )
}
