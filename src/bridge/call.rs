use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use super::{BridgeError, BridgeResult};

pub type CallId = u64;

static NEXT_CALL_ID: AtomicU64 = AtomicU64::new(1);

/// 一次来自 Web 侧的插件调用。
///
/// `resolve`/`reject` 会消耗 `self`，保证每个调用最多完成一次；
/// 未完成就被丢弃时，调用方会收到 `BridgeError::CallDropped`。
#[derive(Debug)]
pub struct PluginCall {
    id: CallId,
    method: String,
    options: Value,
    responder: oneshot::Sender<BridgeResult<Value>>,
}

impl PluginCall {
    pub fn new(method: impl Into<String>, options: Value) -> (Self, oneshot::Receiver<BridgeResult<Value>>) {
        let (responder, rx) = oneshot::channel();
        let call = Self {
            id: NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed),
            method: method.into(),
            options,
            responder,
        };
        (call, rx)
    }

    pub fn id(&self) -> CallId {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn options(&self) -> &Value {
        &self.options
    }

    pub fn resolve<T: Serialize>(self, data: T) {
        let result = serde_json::to_value(data).map_err(BridgeError::from);
        self.finish(result);
    }

    pub fn reject(self, err: BridgeError) {
        self.finish(Err(err));
    }

    fn finish(self, result: BridgeResult<Value>) {
        let ok = result.is_ok();
        if self.responder.send(result).is_err() {
            debug!(
                target: "bridge",
                call_id = self.id,
                method = self.method.as_str(),
                "调用方已离开，结果被丢弃 | Caller gone, result dropped"
            );
            return;
        }
        debug!(
            target: "bridge",
            call_id = self.id,
            method = self.method.as_str(),
            ok,
            "调用已完成 | Call completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_delivers_serialized_payload() {
        let (call, rx) = PluginCall::new("echo", Value::Null);
        call.resolve(serde_json::json!({ "ok": true }));
        let value = rx.await.expect("responder").expect("resolved");
        assert_eq!(value, serde_json::json!({ "ok": true }));
    }

    #[test]
    fn call_ids_are_unique() {
        let (a, _rx_a) = PluginCall::new("a", Value::Null);
        let (b, _rx_b) = PluginCall::new("b", Value::Null);
        assert_ne!(a.id(), b.id());
    }
}
