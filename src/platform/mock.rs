use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Completion, PermissionBackend};
use crate::permission::{PermissionDecl, PermissionState};

/// 测试用后端：状态可控，弹窗结果由测试手动给出
pub struct MockPermissions {
    state: Mutex<PermissionState>,
    prompts: Mutex<Vec<Completion>>,
    request_count: AtomicUsize,
}

impl MockPermissions {
    pub fn new(state: PermissionState) -> Self {
        Self {
            state: Mutex::new(state),
            prompts: Mutex::new(Vec::new()),
            request_count: AtomicUsize::new(0),
        }
    }

    pub fn set_state(&self, state: PermissionState) {
        *self.state.lock().expect("mock state lock") = state;
    }

    /// 模拟用户在系统弹窗中做出选择
    pub fn answer(&self, state: PermissionState) {
        self.set_state(state);
        let prompts = std::mem::take(&mut *self.prompts.lock().expect("mock prompts lock"));
        for done in prompts {
            done();
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn open_prompts(&self) -> usize {
        self.prompts.lock().expect("mock prompts lock").len()
    }
}

impl PermissionBackend for MockPermissions {
    fn state(&self, _decl: &PermissionDecl) -> PermissionState {
        *self.state.lock().expect("mock state lock")
    }

    fn request(&self, _decl: &PermissionDecl, done: Completion) {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().expect("mock prompts lock").push(done);
    }

    fn open_settings(&self, decl: &PermissionDecl) -> anyhow::Result<()> {
        anyhow::bail!("mock backend cannot open settings for {}", decl.alias)
    }
}
