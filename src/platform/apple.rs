use std::sync::Mutex;

use block::ConcreteBlock;
use objc::runtime::{BOOL, NO};
use objc::{class, msg_send, sel, sel_impl};
use objc_foundation::{INSString, NSString};
use tracing::{debug, warn};

use super::{Completion, PermissionBackend};
use crate::permission::{PermissionDecl, PermissionKind, PermissionState};

#[link(name = "AVFoundation", kind = "framework")]
extern "C" {}

// AVMediaTypeAudio
const AV_MEDIA_TYPE_AUDIO: &str = "soun";

pub struct SystemPermissions;

fn media_type(kind: PermissionKind) -> &'static str {
    match kind {
        PermissionKind::Microphone => AV_MEDIA_TYPE_AUDIO,
    }
}

/// AVAuthorizationStatus -> PermissionState
fn from_av_status(status: isize) -> PermissionState {
    match status {
        0 => PermissionState::Prompt,  // NotDetermined
        1 => PermissionState::Denied,  // Restricted
        2 => PermissionState::Denied,  // Denied
        3 => PermissionState::Granted, // Authorized
        other => {
            warn!(target: "platform", status = other, "未知的授权状态 | Unknown AVAuthorizationStatus");
            PermissionState::Prompt
        }
    }
}

impl PermissionBackend for SystemPermissions {
    fn state(&self, decl: &PermissionDecl) -> PermissionState {
        let media_type = NSString::from_str(media_type(decl.kind));
        let status: isize = unsafe {
            msg_send![class!(AVCaptureDevice), authorizationStatusForMediaType: &*media_type]
        };
        from_av_status(status)
    }

    fn request(&self, decl: &PermissionDecl, done: Completion) {
        let media_type = NSString::from_str(media_type(decl.kind));
        let alias = decl.alias;
        let done = Mutex::new(Some(done));

        // 系统会复制该 block，并在用户做出选择后于后台队列回调
        let block = ConcreteBlock::new(move |granted: BOOL| {
            debug!(
                target: "platform",
                alias,
                granted = granted != NO,
                "系统权限弹窗已返回 | Permission dialog answered"
            );
            let done = done.lock().ok().and_then(|mut slot| slot.take());
            if let Some(done) = done {
                done();
            }
        });
        let block = block.copy();

        unsafe {
            let _: () = msg_send![
                class!(AVCaptureDevice),
                requestAccessForMediaType: &*media_type
                completionHandler: &*block
            ];
        }
    }

    #[cfg(target_os = "macos")]
    fn open_settings(&self, decl: &PermissionDecl) -> anyhow::Result<()> {
        use std::process::Command;

        let url = match decl.kind {
            PermissionKind::Microphone => {
                "x-apple.systempreferences:com.apple.preference.security?Privacy_Microphone"
            }
        };
        let status = Command::new("open").arg(url).status()?;
        if status.success() {
            return Ok(());
        }
        anyhow::bail!("open failed: status={status}")
    }

    #[cfg(target_os = "ios")]
    fn open_settings(&self, decl: &PermissionDecl) -> anyhow::Result<()> {
        anyhow::bail!("当前平台不支持自动打开权限设置: {}", decl.alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_maps_to_denied() {
        assert_eq!(from_av_status(0), PermissionState::Prompt);
        assert_eq!(from_av_status(1), PermissionState::Denied);
        assert_eq!(from_av_status(2), PermissionState::Denied);
        assert_eq!(from_av_status(3), PermissionState::Granted);
    }
}
