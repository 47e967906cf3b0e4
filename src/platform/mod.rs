#[cfg(target_os = "android")]
mod android;
#[cfg(any(target_os = "macos", target_os = "ios"))]
mod apple;
#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "android")))]
mod fallback;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use tauri::plugin::PluginApi;
use tauri::Runtime;

use crate::permission::{PermissionDecl, PermissionState};

/// 系统弹窗给出结果后调用一次
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// 系统权限子系统的最小抽象：读取状态、触发申请、打开设置页。
///
/// 后端只负责"观察"与"触发"，不保存任何权限状态；
/// `request` 的 `done` 在系统给出决定后（可能在任意线程）被调用且仅调用一次，
/// 调用方随后重新读取 `state` 得到最终结果。
pub trait PermissionBackend: Send + Sync {
    fn state(&self, decl: &PermissionDecl) -> PermissionState;
    fn request(&self, decl: &PermissionDecl, done: Completion);
    fn open_settings(&self, decl: &PermissionDecl) -> anyhow::Result<()>;
}

/// 当前平台的系统权限后端。
///
/// Android 需要在插件 `setup` 中注册 Kotlin 侧插件，因此这里接收 `PluginApi`；
/// 其他平台直接使用系统 API。
pub fn system_backend<R: Runtime>(api: PluginApi<R, ()>) -> anyhow::Result<Arc<dyn PermissionBackend>> {
    #[cfg(target_os = "android")]
    {
        Ok(Arc::new(android::AndroidPermissions::register(api)?))
    }

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    {
        let _ = api;
        Ok(Arc::new(apple::SystemPermissions))
    }

    #[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "android")))]
    {
        let _ = api;
        Ok(Arc::new(fallback::SystemPermissions))
    }
}
