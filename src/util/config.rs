//! 配置模块
//! 处理配置文件的读取、写入、环境变量覆盖与缺省模板生成

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// 主配置结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub program: ProgramConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            program: ProgramConfig::default(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// 程序标识配置：程序名与内部版本号，喂给版本信息构造
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    pub name: String,
    pub internal_version: String,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            internal_version: "v0.0.1".to_string(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub structured: Option<bool>,
    pub file: LogFileConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            structured: None,
            file: LogFileConfig::default(),
        }
    }
}

/// 日志文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFileConfig {
    pub enabled: bool,
    pub directory: String,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: "logs".to_string(),
        }
    }
}

impl Config {
    /// 把当前配置写成YAML文件，父目录不存在时一并创建
    pub fn write_yaml_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从YAML文件读取配置
    pub fn read_yaml(path: impl AsRef<Path>) -> Result<Config> {
        Ok(serde_yaml::from_str(&fs::read_to_string(path)?)?)
    }

    /// 环境变量覆盖，优先级高于配置文件
    pub fn apply_env_overrides(mut config: Config) -> Config {
        if let Some(port) = env_value("VERSION_PORT").and_then(|v| v.parse::<u16>().ok()) {
            tracing::info!(event = "config.override", port, "环境变量覆盖服务器端口");
            config.server.port = port;
        }

        if let Some(level) = env_value("VERSION_LOG_LEVEL") {
            tracing::info!(event = "config.override", level = %level, "环境变量覆盖日志级别");
            config.logging.level = level;
        }

        if let Some(name) = env_value("VERSION_PROGRAM_NAME") {
            tracing::info!(event = "config.override", program = %name, "环境变量覆盖程序名");
            config.program.name = name;
        }

        config
    }

    /// 读取配置并应用环境变量覆盖
    pub fn load_with_env_overrides(path: impl AsRef<Path>) -> Result<Config> {
        let config = Self::read_yaml(path)?;
        Ok(Self::apply_env_overrides(config))
    }
}

// 空值视为未设置
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: Config = serde_yaml::from_str("{}").expect("parse empty config");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.file.enabled);
        assert_eq!(config.program.internal_version, "v0.0.1");
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let yaml = "server:\n  port: 9000\nprogram:\n  name: demo\n";
        let config: Config = serde_yaml::from_str(yaml).expect("parse partial config");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.program.name, "demo");
        assert_eq!(config.program.internal_version, "v0.0.1");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn template_config_roundtrips_through_yaml() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.yaml");

        let template = Config::default();
        template.write_yaml_to_path(&path).expect("write template");

        let loaded = ConfigLoader::read_yaml(&path).expect("read template back");
        assert_eq!(loaded.server.port, template.server.port);
        assert_eq!(loaded.logging.level, template.logging.level);
        assert_eq!(loaded.program.name, template.program.name);
    }
}
