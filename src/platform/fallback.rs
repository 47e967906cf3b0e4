use tracing::debug;

use super::{Completion, PermissionBackend};
use crate::permission::{PermissionDecl, PermissionState};

/// 麦克风不受系统权限管控的平台：始终视为已授权
pub struct SystemPermissions;

impl PermissionBackend for SystemPermissions {
    fn state(&self, _decl: &PermissionDecl) -> PermissionState {
        PermissionState::Granted
    }

    fn request(&self, decl: &PermissionDecl, done: Completion) {
        debug!(
            target: "platform",
            alias = decl.alias,
            "当前平台无需申请，直接完成 | No OS prompt on this platform"
        );
        done();
    }

    fn open_settings(&self, decl: &PermissionDecl) -> anyhow::Result<()> {
        #[cfg(windows)]
        {
            use crate::permission::PermissionKind;
            use std::process::Command;

            let uri = match decl.kind {
                PermissionKind::Microphone => "ms-settings:privacy-microphone",
            };
            let status = Command::new("cmd").args(["/C", "start", "", uri]).status()?;
            if status.success() {
                return Ok(());
            }
            anyhow::bail!("打开权限设置失败: status={status}")
        }

        #[cfg(not(windows))]
        {
            anyhow::bail!("当前平台不支持自动打开权限设置: {}", decl.alias)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::MICROPHONE_DECL;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn request_completes_immediately_as_granted() {
        let backend = SystemPermissions;
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        backend.request(&MICROPHONE_DECL, Box::new(move || flag.store(true, Ordering::SeqCst)));
        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(backend.state(&MICROPHONE_DECL), PermissionState::Granted);
    }
}
