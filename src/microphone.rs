//! `Microphone` 插件：向 Web 侧暴露麦克风权限状态。

use serde::de::Error as _;
use serde_json::Value;
use tracing::{info, warn};

use crate::bridge::{Bridge, BridgeError, BridgeResult, MethodTable, Plugin, PluginCall, PluginContext};
use crate::permission::{PermissionDecl, PermissionResult, PermissionState, MICROPHONE, MICROPHONE_DECL};

pub const PLUGIN_NAME: &str = "Microphone";

const PERMISSIONS_CALLBACK: &str = "permissionsCallback";

pub struct MicrophonePlugin;

impl MicrophonePlugin {
    fn check_permissions(&self, ctx: &PluginContext, call: PluginCall) {
        resolve_state(ctx, call);
    }

    fn request_permissions(&self, ctx: &PluginContext, call: PluginCall) {
        ctx.request_permission_for_alias(MICROPHONE, call, PERMISSIONS_CALLBACK);
    }

    fn permissions_callback(&self, ctx: &PluginContext, call: PluginCall) {
        resolve_state(ctx, call);
    }

    fn open_settings(&self, ctx: &PluginContext, call: PluginCall) {
        match ctx.open_settings(MICROPHONE) {
            Ok(()) => call.resolve(serde_json::json!({})),
            Err(err) => {
                warn!(
                    target: "microphone",
                    plugin = ctx.plugin_name(),
                    error = %err,
                    "打开麦克风设置失败 | Failed to open microphone settings"
                );
                call.reject(err);
            }
        }
    }
}

fn resolve_state(ctx: &PluginContext, call: PluginCall) {
    match ctx.permission_state(MICROPHONE) {
        Ok(state) => call.resolve(PermissionResult::single(MICROPHONE, state)),
        Err(err) => call.reject(err),
    }
}

impl Plugin for MicrophonePlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn permissions(&self) -> &'static [PermissionDecl] {
        &[MICROPHONE_DECL]
    }

    fn methods(&self) -> MethodTable<Self> {
        MethodTable::new()
            .method("checkPermissions", Self::check_permissions)
            .method("requestPermissions", Self::request_permissions)
            .method("openSettings", Self::open_settings)
            .permission_callback(PERMISSIONS_CALLBACK, Self::permissions_callback)
    }
}

async fn call_for_state(bridge: &Bridge, method: &str) -> BridgeResult<PermissionState> {
    let value = bridge.call(PLUGIN_NAME, method, Value::Null).await?;
    let result = serde_json::from_value::<PermissionResult>(value)?;
    result
        .get(MICROPHONE)
        .ok_or_else(|| BridgeError::from(serde_json::Error::missing_field(MICROPHONE)))
}

/// 先检查、必要时再申请：已授权直接返回；可弹窗则申请；
/// 已被拒绝只能由用户去系统设置中开启，这里只记录警告。
pub async fn ensure_permission(bridge: &Bridge) -> BridgeResult<PermissionState> {
    let state = call_for_state(bridge, "checkPermissions").await?;
    if state.is_granted() {
        return Ok(state);
    }

    let state = if state.can_prompt() {
        call_for_state(bridge, "requestPermissions").await?
    } else {
        state
    };

    match state {
        PermissionState::Granted => {
            info!(target: "microphone", "麦克风权限已授予 | Microphone permission granted");
        }
        PermissionState::Denied => {
            warn!(
                target: "microphone",
                "麦克风权限被拒绝，需要在系统设置中手动开启 | Microphone permission denied; enable it in system settings"
            );
        }
        other => {
            warn!(
                target: "microphone",
                state = %other,
                "麦克风权限仍未确定 | Microphone permission still undetermined"
            );
        }
    }
    Ok(state)
}
