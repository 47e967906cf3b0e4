//! Web 侧可通过 `invoke` 调用的 Tauri 命令

use serde_json::Value;
use tauri::State;

use crate::app_state::AppState;
use crate::config::{self, AppConfig};

/// 桥调用协议：`invoke("bridge_call", { pluginId, methodName, options })`
#[tauri::command]
pub async fn bridge_call(
    state: State<'_, AppState>,
    plugin_id: String,
    method_name: String,
    options: Option<Value>,
) -> Result<Value, String> {
    state
        .bridge
        .call(&plugin_id, &method_name, options.unwrap_or(Value::Null))
        .await
        .map_err(|err| err.to_string())
}

#[derive(serde::Serialize)]
pub struct AppConfigResponse {
    config: AppConfig,
    path: Option<String>,
}

#[tauri::command]
pub fn load_app_config(state: State<'_, AppState>) -> AppConfigResponse {
    let config = state.config.lock().expect("config lock").clone();
    let path = state.config_path.lock().expect("config path lock").clone();
    AppConfigResponse {
        config,
        path: path.map(|p| p.display().to_string()),
    }
}

/// 保存配置；超时等桥接参数在下次启动时生效
#[tauri::command]
pub fn save_app_config(state: State<'_, AppState>, config: AppConfig) -> Result<AppConfigResponse, String> {
    let path = state.config_path.lock().expect("config path lock").clone();
    let saved = config::save_to_path(&config, path).map_err(|err| format!("{err:#}"))?;

    tracing::info!(
        target: "config",
        path = %saved.display(),
        "配置已保存 | Config saved"
    );

    *state.config.lock().expect("config lock") = config.clone();
    *state.config_path.lock().expect("config path lock") = Some(saved.clone());
    Ok(AppConfigResponse {
        config,
        path: Some(saved.display().to_string()),
    })
}
