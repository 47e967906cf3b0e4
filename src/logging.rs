use tracing_subscriber::EnvFilter;

/// 初始化 `tracing` 日志输出（stderr）。
///
/// 级别优先读取 `WANDERLINK_LOG`，其次 `RUST_LOG`；
/// 都未设置时 debug 构建为 info，release 构建为 warn。
pub fn init() {
    let filter = std::env::var("WANDERLINK_LOG")
        .ok()
        .and_then(|raw| parse_filter(&raw))
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|raw| parse_filter(&raw)))
        .unwrap_or_else(|| EnvFilter::new(default_level()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_level() -> &'static str {
    if cfg!(debug_assertions) {
        "info"
    } else {
        "warn"
    }
}

fn parse_filter(raw: &str) -> Option<EnvFilter> {
    let directive = normalize_directive(raw)?;
    EnvFilter::try_new(directive).ok()
}

/// 兼容常见的级别写法（`warning`、大小写）；其余原样交给 `EnvFilter`
fn normalize_directive(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let level = match lower.as_str() {
        "off" | "error" | "warn" | "info" | "debug" | "trace" => lower.clone(),
        "warning" => "warn".to_string(),
        _ => return Some(trimmed.to_string()),
    };
    Some(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_plain_levels() {
        assert_eq!(normalize_directive(" Warning ").as_deref(), Some("warn"));
        assert_eq!(normalize_directive("DEBUG").as_deref(), Some("debug"));
        assert_eq!(normalize_directive("   "), None);
    }

    #[test]
    fn passes_target_directives_through() {
        let raw = "wanderlink_lib=debug,tauri=info";
        assert_eq!(normalize_directive(raw).as_deref(), Some(raw));
        assert!(parse_filter(raw).is_some());
    }
}
