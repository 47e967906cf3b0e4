use std::collections::HashMap;
use std::sync::Mutex;

use super::{CallId, PluginCall};

/// 等待系统弹窗结果的调用，以及结果到达后要执行的权限回调名
#[derive(Debug)]
pub struct PendingPermission {
    pub call: PluginCall,
    pub callback: &'static str,
}

/// 以调用 id 为键的待完成表。`take` 只会成功一次，
/// 因此系统回调与超时监控谁先到谁完成调用。
#[derive(Debug, Default)]
pub struct PendingCalls {
    calls: Mutex<HashMap<CallId, PendingPermission>>,
}

impl PendingCalls {
    pub fn save(&self, call: PluginCall, callback: &'static str) -> CallId {
        let id = call.id();
        self.calls
            .lock()
            .expect("pending calls lock")
            .insert(id, PendingPermission { call, callback });
        id
    }

    pub fn take(&self, id: CallId) -> Option<PendingPermission> {
        self.calls.lock().expect("pending calls lock").remove(&id)
    }

    pub fn len(&self) -> usize {
        self.calls.lock().expect("pending calls lock").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn take_succeeds_once() {
        let pending = PendingCalls::default();
        let (call, _rx) = PluginCall::new("requestPermissions", Value::Null);
        let id = pending.save(call, "permissionsCallback");

        let first = pending.take(id).expect("first take");
        assert_eq!(first.callback, "permissionsCallback");
        assert!(pending.take(id).is_none());
        assert_eq!(pending.len(), 0);
    }
}
