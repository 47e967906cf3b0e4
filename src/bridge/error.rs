use thiserror::Error;

/// 桥接层错误。权限被拒绝不是错误，而是正常的 `denied` 结果。
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Method not found: {plugin}.{method}")]
    MethodNotFound { plugin: String, method: String },

    #[error("Plugin already registered: {0}")]
    DuplicatePlugin(String),

    #[error("Permission alias `{alias}` is not declared by {plugin}")]
    UnknownPermissionAlias { plugin: String, alias: String },

    #[error("Call `{0}` was dropped without a result")]
    CallDropped(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Platform error: {0}")]
    Platform(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
