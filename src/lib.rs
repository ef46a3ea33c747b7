use std::path::PathBuf;
use std::sync::LazyLock;

pub mod api;
pub mod build_info;
pub mod server;
pub mod util;
pub mod version;

use util::config::{Config, ConfigLoader};

/// CONFIG - 全局配置（惰性加载，文件损坏直接退出进程）
pub static CONFIG: LazyLock<Config> = LazyLock::new(load_config_or_exit);

fn load_config_or_exit() -> Config {
    let config_path = find_config_file_path("config.yaml");

    // 配置文件缺失时生成模板并以默认配置继续；文件损坏才是致命错误
    if !config_path.exists() {
        tracing::warn!(
            event = "config.missing",
            path = %config_path.display(),
            "配置文件不存在，生成模板后以默认配置启动"
        );
        let template = Config::default();
        if let Err(write_err) = template.write_yaml_to_path(&config_path) {
            tracing::error!(event = "config.template.write_failed", error = %write_err);
        }
        return ConfigLoader::apply_env_overrides(template);
    }

    match ConfigLoader::load_with_env_overrides(&config_path) {
        Ok(config) => {
            tracing::info!(event = "config.loaded", path = %config_path.display());
            config
        }
        Err(err) => {
            eprintln!("FATAL: 配置文件 {} 加载失败: {err}", config_path.display());
            eprintln!("请修复配置文件后重新启动。");
            std::process::exit(1);
        }
    }
}

/// 查找配置文件路径：优先当前工作目录，其次可执行文件所在目录
pub fn find_config_file_path(filename: &str) -> PathBuf {
    let local = PathBuf::from(filename);
    if local.exists() {
        return local;
    }

    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(filename)))
        .filter(|candidate| candidate.exists())
        .unwrap_or(local)
}
