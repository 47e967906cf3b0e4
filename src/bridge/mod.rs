//! 原生插件桥：Web 侧按 `插件名 + 方法名` 调用，桥按启动时构建的显式方法表分发。

mod call;
mod error;
mod pending;

pub use call::{CallId, PluginCall};
pub use error::{BridgeError, BridgeResult};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::permission::{PermissionDecl, PermissionState};
use crate::platform::PermissionBackend;
use pending::PendingCalls;

pub type Handler<P> = fn(&P, &PluginContext, PluginCall);

type BoxedHandler = Arc<dyn Fn(&PluginContext, PluginCall) + Send + Sync>;

/// 插件的方法表。`method` 可被 Web 侧调用；`permission_callback`
/// 只能由权限申请流程触发。
pub struct MethodTable<P> {
    methods: Vec<(&'static str, Handler<P>)>,
    permission_callbacks: Vec<(&'static str, Handler<P>)>,
}

impl<P> MethodTable<P> {
    pub fn new() -> Self {
        Self {
            methods: Vec::new(),
            permission_callbacks: Vec::new(),
        }
    }

    pub fn method(mut self, name: &'static str, handler: Handler<P>) -> Self {
        self.methods.push((name, handler));
        self
    }

    pub fn permission_callback(mut self, name: &'static str, handler: Handler<P>) -> Self {
        self.permission_callbacks.push((name, handler));
        self
    }
}

impl<P> Default for MethodTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Plugin: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn permissions(&self) -> &'static [PermissionDecl] {
        &[]
    }

    fn methods(&self) -> MethodTable<Self>
    where
        Self: Sized;
}

struct RegisteredPlugin {
    name: &'static str,
    permissions: &'static [PermissionDecl],
    methods: HashMap<&'static str, BoxedHandler>,
    permission_callbacks: HashMap<&'static str, BoxedHandler>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeOptions {
    /// 可选：系统弹窗迟迟没有结果时，经权限回调以当前状态完成调用。
    /// 默认 `None`，一直等待系统给出用户的决定。
    pub request_timeout: Option<Duration>,
}

pub struct Bridge {
    backend: Arc<dyn PermissionBackend>,
    plugins: RwLock<HashMap<&'static str, Arc<RegisteredPlugin>>>,
    pending: Arc<PendingCalls>,
    options: BridgeOptions,
}

impl Bridge {
    pub fn new(backend: Arc<dyn PermissionBackend>, options: BridgeOptions) -> Self {
        Self {
            backend,
            plugins: RwLock::new(HashMap::new()),
            pending: Arc::new(PendingCalls::default()),
            options,
        }
    }

    pub fn register_plugin<P: Plugin>(&self, plugin: P) -> BridgeResult<()> {
        let name = plugin.name();
        let permissions = plugin.permissions();
        let table = plugin.methods();
        let plugin = Arc::new(plugin);

        let wrap = |handler: Handler<P>| -> BoxedHandler {
            let plugin = plugin.clone();
            Arc::new(move |ctx: &PluginContext, call: PluginCall| handler(&plugin, ctx, call))
        };
        let methods = table
            .methods
            .into_iter()
            .map(|(method, handler)| (method, wrap(handler)))
            .collect::<HashMap<_, _>>();
        let permission_callbacks = table
            .permission_callbacks
            .into_iter()
            .map(|(method, handler)| (method, wrap(handler)))
            .collect::<HashMap<_, _>>();

        let mut plugins = self.plugins.write().expect("plugin registry lock");
        if plugins.contains_key(name) {
            return Err(BridgeError::DuplicatePlugin(name.to_string()));
        }

        let mut method_names = methods.keys().copied().collect::<Vec<_>>();
        method_names.sort_unstable();
        info!(
            target: "bridge",
            plugin = name,
            methods = ?method_names,
            permissions = ?permissions.iter().map(|decl| decl.alias).collect::<Vec<_>>(),
            "插件已注册 | Plugin registered"
        );

        plugins.insert(
            name,
            Arc::new(RegisteredPlugin {
                name,
                permissions,
                methods,
                permission_callbacks,
            }),
        );
        Ok(())
    }

    pub fn has_plugin(&self, plugin_id: &str) -> bool {
        self.plugins.read().expect("plugin registry lock").contains_key(plugin_id)
    }

    /// 分发一次调用；找不到插件或方法时直接以错误完成该调用
    pub fn dispatch(&self, plugin_id: &str, call: PluginCall) {
        let plugin = self.plugins.read().expect("plugin registry lock").get(plugin_id).cloned();
        let Some(plugin) = plugin else {
            warn!(target: "bridge", plugin = plugin_id, "插件不存在 | Plugin not found");
            call.reject(BridgeError::PluginNotFound(plugin_id.to_string()));
            return;
        };

        let Some(handler) = plugin.methods.get(call.method()).cloned() else {
            warn!(
                target: "bridge",
                plugin = plugin.name,
                method = call.method(),
                "方法不存在 | Method not found"
            );
            let method = call.method().to_string();
            call.reject(BridgeError::MethodNotFound {
                plugin: plugin.name.to_string(),
                method,
            });
            return;
        };

        debug!(
            target: "bridge",
            plugin = plugin.name,
            method = call.method(),
            call_id = call.id(),
            "分发调用 | Dispatching call"
        );

        let ctx = PluginContext {
            plugin,
            backend: self.backend.clone(),
            pending: self.pending.clone(),
            request_timeout: self.options.request_timeout,
        };
        handler(&ctx, call);
    }

    /// 发起调用并等待结果（权限申请时会一直挂起到系统给出结果）
    pub async fn call(&self, plugin_id: &str, method: &str, options: Value) -> BridgeResult<Value> {
        let (call, rx) = PluginCall::new(method, options);
        self.dispatch(plugin_id, call);
        rx.await
            .map_err(|_| BridgeError::CallDropped(format!("{plugin_id}.{method}")))?
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }
}

/// 方法处理函数可用的桥接能力：读权限状态、发起权限申请、打开设置页
#[derive(Clone)]
pub struct PluginContext {
    plugin: Arc<RegisteredPlugin>,
    backend: Arc<dyn PermissionBackend>,
    pending: Arc<PendingCalls>,
    request_timeout: Option<Duration>,
}

impl PluginContext {
    pub fn plugin_name(&self) -> &'static str {
        self.plugin.name
    }

    fn decl(&self, alias: &str) -> BridgeResult<&'static PermissionDecl> {
        let permissions: &'static [PermissionDecl] = self.plugin.permissions;
        permissions
            .iter()
            .find(|decl| decl.alias == alias)
            .ok_or_else(|| BridgeError::UnknownPermissionAlias {
                plugin: self.plugin.name.to_string(),
                alias: alias.to_string(),
            })
    }

    pub fn permission_state(&self, alias: &str) -> BridgeResult<PermissionState> {
        let decl = self.decl(alias)?;
        Ok(self.backend.state(decl))
    }

    pub fn open_settings(&self, alias: &str) -> BridgeResult<()> {
        let decl = self.decl(alias)?;
        self.backend
            .open_settings(decl)
            .map_err(|err| BridgeError::Platform(format!("{err:#}")))
    }

    /// 为别名申请权限，结果经 `callback` 指定的权限回调完成 `call`。
    ///
    /// 已授权时不弹窗，立即走回调；否则将调用挂起，直到系统给出结果或超时。
    pub fn request_permission_for_alias(&self, alias: &str, call: PluginCall, callback: &'static str) {
        let decl = match self.decl(alias) {
            Ok(decl) => decl,
            Err(err) => {
                call.reject(err);
                return;
            }
        };

        if !self.plugin.permission_callbacks.contains_key(callback) {
            call.reject(BridgeError::MethodNotFound {
                plugin: self.plugin.name.to_string(),
                method: callback.to_string(),
            });
            return;
        }

        if self.backend.state(decl).is_granted() {
            debug!(
                target: "bridge",
                plugin = self.plugin.name,
                alias,
                "已授权，跳过系统弹窗 | Already granted, skipping prompt"
            );
            self.run_permission_callback(callback, call);
            return;
        }

        let call_id = self.pending.save(call, callback);
        info!(
            target: "bridge",
            plugin = self.plugin.name,
            alias,
            strings = ?decl.strings,
            call_id,
            "请求系统权限 | Requesting OS permission"
        );

        if let Some(timeout) = self.request_timeout {
            self.spawn_request_watchdog(call_id, timeout);
        }

        let ctx = self.clone();
        self.backend
            .request(decl, Box::new(move || ctx.complete_permission_request(call_id, "os")));
    }

    fn complete_permission_request(&self, call_id: CallId, source: &'static str) {
        let Some(pending) = self.pending.take(call_id) else {
            debug!(
                target: "bridge",
                call_id,
                source,
                "调用已完成，忽略迟到的结果 | Call already completed, ignoring late result"
            );
            return;
        };

        debug!(
            target: "bridge",
            plugin = self.plugin.name,
            call_id,
            source,
            callback = pending.callback,
            "执行权限回调 | Running permission callback"
        );
        self.run_permission_callback(pending.callback, pending.call);
    }

    fn run_permission_callback(&self, name: &'static str, call: PluginCall) {
        match self.plugin.permission_callbacks.get(name).cloned() {
            Some(handler) => handler(self, call),
            None => call.reject(BridgeError::MethodNotFound {
                plugin: self.plugin.name.to_string(),
                method: name.to_string(),
            }),
        }
    }

    fn spawn_request_watchdog(&self, call_id: CallId, timeout: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                target: "bridge",
                call_id,
                "没有异步运行时，无法监控申请超时 | No async runtime, request timeout disabled"
            );
            return;
        };

        let ctx = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(timeout).await;
            ctx.complete_permission_request(call_id, "timeout");
        });
    }
}
