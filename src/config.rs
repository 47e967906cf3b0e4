use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::bridge::BridgeOptions;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// 配置结构版本号（用于未来的迁移/兼容）
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// 启动后自动走一次"检查 -> 申请"麦克风权限流程
    #[serde(default)]
    pub request_on_launch: bool,
    #[serde(default = "default_launch_request_delay_ms")]
    pub launch_request_delay_ms: u64,
    /// 系统权限弹窗等待上限（可选），默认 0 表示一直等待用户的决定
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            request_on_launch: false,
            launch_request_delay_ms: default_launch_request_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl AppConfig {
    pub fn bridge_options(&self) -> BridgeOptions {
        BridgeOptions {
            request_timeout: (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms)),
        }
    }

    pub fn launch_request_delay(&self) -> Duration {
        Duration::from_millis(self.launch_request_delay_ms)
    }
}

fn default_schema_version() -> u32 {
    1
}

fn default_launch_request_delay_ms() -> u64 {
    1500
}

fn default_request_timeout_ms() -> u64 {
    0
}

pub fn load_with_path() -> (AppConfig, Option<PathBuf>) {
    for path in candidate_paths() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(config) => return (config, Some(path)),
                Err(err) => {
                    tracing::warn!(
                        target: "config",
                        path = %path.display(),
                        error = %err,
                        "配置文件解析失败，跳过 | Config parse failed, skipping"
                    );
                }
            }
        }
    }

    (AppConfig::default(), None)
}

pub fn save_to_path(config: &AppConfig, path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let path = path.unwrap_or_else(default_save_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("create config dir")?;
        }
    }

    let content = serde_json::to_string_pretty(config).context("serialize config")?;
    std::fs::write(&path, content).context("write config")?;
    Ok(path)
}

const CONFIG_FILE: &str = "config.json";

/// 查找顺序：`WANDERLINK_CONFIG`、可执行文件目录、当前工作目录。
/// 保存时使用第一个候选。
fn candidate_paths() -> Vec<PathBuf> {
    let explicit = std::env::var_os("WANDERLINK_CONFIG").map(PathBuf::from);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE)));
    let cwd = std::env::current_dir().ok().map(|dir| dir.join(CONFIG_FILE));

    explicit.into_iter().chain(exe_dir).chain(cwd).collect()
}

fn default_save_path() -> PathBuf {
    candidate_paths()
        .into_iter()
        .next()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = serde_json::from_str::<AppConfig>(r#"{ "request_on_launch": true }"#).expect("deserialize");
        assert!(config.request_on_launch);
        assert_eq!(config.launch_request_delay_ms, 1500);
        assert_eq!(config.request_timeout_ms, 0);
        assert_eq!(config.bridge_options().request_timeout, None);
    }

    #[test]
    fn explicit_timeout_enables_watchdog() {
        let config = AppConfig {
            request_timeout_ms: 30_000,
            ..AppConfig::default()
        };
        assert_eq!(config.bridge_options().request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn save_writes_readable_config() {
        let dir = std::env::temp_dir().join(format!("wanderlink-config-{}", std::process::id()));
        let path = dir.join("config.json");
        let config = AppConfig {
            request_on_launch: true,
            launch_request_delay_ms: 250,
            ..AppConfig::default()
        };

        let saved = save_to_path(&config, Some(path.clone())).expect("save");
        assert_eq!(saved, path);
        let content = std::fs::read_to_string(&saved).expect("read back");
        let loaded = serde_json::from_str::<AppConfig>(&content).expect("parse");
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn candidates_end_with_config_file() {
        let paths = candidate_paths();
        assert!(!paths.is_empty());
        let explicit = std::env::var_os("WANDERLINK_CONFIG").is_some();
        for path in paths.iter().skip(usize::from(explicit)) {
            assert_eq!(path.file_name().and_then(|name| name.to_str()), Some(CONFIG_FILE));
        }
    }
}
