//! WanderLink 原生壳：托管 Web 内容，并通过原生插件桥暴露麦克风权限。

pub mod app_state;
pub mod bridge;
mod commands;
pub mod config;
mod logging;
pub mod microphone;
pub mod permission;
pub mod platform;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tauri::plugin::TauriPlugin;
use tauri::{Manager, Runtime};
use tracing::{error, info};

use crate::bridge::{Bridge, BridgeResult};
use crate::config::AppConfig;
use crate::microphone::MicrophonePlugin;
use crate::platform::PermissionBackend;

/// 创建桥并注册全部原生插件；必须在 Web 内容可以调用之前完成
pub fn build_bridge(backend: Arc<dyn PermissionBackend>, config: &AppConfig) -> BridgeResult<Arc<Bridge>> {
    let bridge = Bridge::new(backend, config.bridge_options());
    bridge.register_plugin(MicrophonePlugin)?;
    Ok(Arc::new(bridge))
}

/// 宿主插件：在 Tauri 初始化阶段取得平台后端、建桥并注入 `AppState`
fn native_bridge<R: Runtime>(config: AppConfig, config_path: Option<PathBuf>) -> TauriPlugin<R> {
    tauri::plugin::Builder::<R>::new("native-bridge")
        .setup(move |app, api| {
            let backend = platform::system_backend(api)?;
            let bridge = build_bridge(backend, &config).map_err(|err| {
                error!(target: "app", error = %err, "插件注册失败 | Plugin registration failed");
                err
            })?;

            if config.request_on_launch {
                spawn_launch_request(bridge.clone(), config.launch_request_delay());
            }

            app.manage(app_state::AppState::new(bridge, config, config_path));
            Ok(())
        })
        .build()
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::init();

    info!(
        target: "app",
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "应用启动 | App starting"
    );

    let (config, config_path) = config::load_with_path();
    let path_display = config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    info!(
        target: "config",
        path = path_display.as_str(),
        request_on_launch = config.request_on_launch,
        request_timeout_ms = config.request_timeout_ms,
        "配置已加载 | Config loaded"
    );

    tauri::Builder::default()
        .plugin(native_bridge(config, config_path))
        .invoke_handler(tauri::generate_handler![
            commands::bridge_call,
            commands::load_app_config,
            commands::save_app_config
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

fn spawn_launch_request(bridge: Arc<Bridge>, delay: Duration) {
    tauri::async_runtime::spawn(async move {
        // 等 Web 内容就绪后再弹系统权限框
        tokio::time::sleep(delay).await;
        if let Err(err) = microphone::ensure_permission(&bridge).await {
            error!(
                target: "microphone",
                error = %err,
                "启动时申请麦克风权限失败 | Launch-time microphone request failed"
            );
        }
    });
}
