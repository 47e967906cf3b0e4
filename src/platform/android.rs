use serde::Serialize;
use serde_json::Value;
use tauri::plugin::{PluginApi, PluginHandle};
use tauri::Runtime;
use tracing::{debug, error};

use super::{Completion, PermissionBackend};
use crate::permission::{PermissionDecl, PermissionResult, PermissionState};

const PLUGIN_IDENTIFIER: &str = "com.wanderlink.app";
const PLUGIN_CLASS: &str = "MicrophonePlugin";

#[derive(Serialize)]
struct RequestPermissionsArgs {
    permissions: Vec<&'static str>,
}

/// Android 运行时权限：由 Kotlin 侧 `MicrophonePlugin`
/// （`@Permission(alias = "microphone", strings = [RECORD_AUDIO])`）读取与申请
pub struct AndroidPermissions<R: Runtime> {
    handle: PluginHandle<R>,
}

impl<R: Runtime> AndroidPermissions<R> {
    pub fn register(api: PluginApi<R, ()>) -> anyhow::Result<Self> {
        let handle = api.register_android_plugin(PLUGIN_IDENTIFIER, PLUGIN_CLASS)?;
        Ok(Self { handle })
    }
}

fn state_from(result: &PermissionResult, alias: &str) -> PermissionState {
    result.get(alias).unwrap_or(PermissionState::Prompt)
}

impl<R: Runtime> PermissionBackend for AndroidPermissions<R> {
    fn state(&self, decl: &PermissionDecl) -> PermissionState {
        match self.handle.run_mobile_plugin::<PermissionResult>("checkPermissions", ()) {
            Ok(result) => state_from(&result, decl.alias),
            Err(err) => {
                error!(
                    target: "platform",
                    alias = decl.alias,
                    error = %err,
                    "读取 Android 权限状态失败 | Failed to read Android permission state"
                );
                PermissionState::Denied
            }
        }
    }

    fn request(&self, decl: &PermissionDecl, done: Completion) {
        let handle = self.handle.clone();
        let alias = decl.alias;

        // run_mobile_plugin 会阻塞到用户在系统弹窗中做出选择
        std::thread::spawn(move || {
            let args = RequestPermissionsArgs {
                permissions: vec![alias],
            };
            match handle.run_mobile_plugin::<PermissionResult>("requestPermissions", args) {
                Ok(result) => debug!(
                    target: "platform",
                    alias,
                    state = %state_from(&result, alias),
                    "系统权限弹窗已返回 | Permission dialog answered"
                ),
                Err(err) => error!(
                    target: "platform",
                    alias,
                    error = %err,
                    "Android 权限申请失败 | Android permission request failed"
                ),
            }
            done();
        });
    }

    fn open_settings(&self, decl: &PermissionDecl) -> anyhow::Result<()> {
        self.handle
            .run_mobile_plugin::<Value>("openSettings", ())
            .map_err(|err| anyhow::anyhow!("打开权限设置失败({}): {err}", decl.alias))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::MICROPHONE;

    #[test]
    fn missing_alias_is_still_promptable() {
        let empty = serde_json::from_str::<PermissionResult>("{}").expect("deserialize");
        assert_eq!(state_from(&empty, MICROPHONE), PermissionState::Prompt);

        let granted = PermissionResult::single(MICROPHONE, PermissionState::Granted);
        assert_eq!(state_from(&granted, MICROPHONE), PermissionState::Granted);
    }
}
