use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 系统上报的权限状态（与 Web 侧 `PermissionState` 字符串一一对应）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
    PromptWithRationale,
}

impl PermissionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Prompt => "prompt",
            Self::PromptWithRationale => "prompt-with-rationale",
        }
    }

    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    /// 仍可以通过系统弹窗申请（未被用户永久拒绝）
    pub fn can_prompt(self) -> bool {
        matches!(self, Self::Prompt | Self::PromptWithRationale)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 原生层可识别的权限种类，供平台后端选择系统 API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    Microphone,
}

/// 插件声明的一项能力：别名 -> 系统权限字符串
#[derive(Debug, Clone, Copy)]
pub struct PermissionDecl {
    pub alias: &'static str,
    pub strings: &'static [&'static str],
    pub kind: PermissionKind,
}

pub const MICROPHONE: &str = "microphone";
pub const RECORD_AUDIO: &str = "android.permission.RECORD_AUDIO";

pub const MICROPHONE_DECL: PermissionDecl = PermissionDecl {
    alias: MICROPHONE,
    strings: &[RECORD_AUDIO],
    kind: PermissionKind::Microphone,
};

/// 返回给 Web 侧的权限结果：`{ "<alias>": "<state>" }`
///
/// 每次查询/申请都重新构造，不缓存、不修改。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PermissionResult(BTreeMap<String, PermissionState>);

impl PermissionResult {
    pub fn single(alias: &str, state: PermissionState) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(alias.to_string(), state);
        Self(entries)
    }

    pub fn get(&self, alias: &str) -> Option<PermissionState> {
        self.0.get(alias).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_serializes_as_web_strings() {
        let value = serde_json::to_value(PermissionState::PromptWithRationale).expect("serialize");
        assert_eq!(value, serde_json::json!("prompt-with-rationale"));
        assert_eq!(PermissionState::Granted.to_string(), "granted");
    }

    #[test]
    fn result_is_a_single_entry_mapping() {
        let result = PermissionResult::single(MICROPHONE, PermissionState::Prompt);
        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value, serde_json::json!({ "microphone": "prompt" }));
        assert_eq!(result.len(), 1);
        assert_eq!(result.get(MICROPHONE), Some(PermissionState::Prompt));
    }

    #[test]
    fn result_parses_web_payload() {
        let raw = r#"{ "microphone": "denied" }"#;
        let result = serde_json::from_str::<PermissionResult>(raw).expect("deserialize");
        assert_eq!(result.get(MICROPHONE), Some(PermissionState::Denied));
    }
}
