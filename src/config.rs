use std::path::PathBuf;

const WORKSPACE_ENV: &str = "TIMETABLED_WORKSPACE";
const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace opened before the first request, if any.
    pub workspace: Option<PathBuf>,
    pub log_level: String,
}

impl Config {
    /// Reads the process environment, after merging a `.env` file when present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let workspace = get(WORKSPACE_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let log_level = get(LOG_LEVEL_ENV)
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "info".to_string());
        Self {
            workspace,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = Config::from_lookup(lookup(&[]));
        assert!(cfg.workspace.is_none());
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn reads_workspace_and_level() {
        let cfg = Config::from_lookup(lookup(&[
            ("TIMETABLED_WORKSPACE", " /tmp/school "),
            ("LOG_LEVEL", "DEBUG"),
        ]));
        assert_eq!(cfg.workspace, Some(PathBuf::from("/tmp/school")));
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn blank_values_fall_back() {
        let cfg = Config::from_lookup(lookup(&[("TIMETABLED_WORKSPACE", "  "), ("LOG_LEVEL", "")]));
        assert!(cfg.workspace.is_none());
        assert_eq!(cfg.log_level, "info");
    }
}
