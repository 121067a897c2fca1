//! Application configuration. API credentials, paths, retry timings.

use serde::Deserialize;

/// Extra numbered key variables checked after `GEMINI_API_KEY` (`GEMINI_API_KEY_1` ..= `_9`).
pub const MAX_NUMBERED_KEYS: usize = 9;

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Where reports are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub data_dir: Option<String>,

    /// "sqlite" (default) or "memory". Read from NEWS_SENTINEL_STORAGE.
    #[serde(default)]
    pub storage: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Gemini Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// Comma-separated keys. Read from NEWS_SENTINEL_GEMINI_API_KEYS.
    /// Combined with GEMINI_API_KEY and GEMINI_API_KEY_1..9.
    #[serde(default)]
    pub gemini_api_keys: Option<String>,

    /// API base URL. Read from NEWS_SENTINEL_GEMINI_API_URL.
    #[serde(default)]
    pub gemini_api_url: Option<String>,

    /// Model name. Defaults to "gemini-2.0-flash". Read from NEWS_SENTINEL_GEMINI_MODEL.
    #[serde(default)]
    pub gemini_model: Option<String>,

    /// HTTP timeout per remote call in seconds (default 60).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Retry / Backoff Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// Max keys tried per request (default 3).
    #[serde(default)]
    pub max_key_attempts: Option<usize>,

    /// Delay between rate-limited attempts in ms (default 1000).
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,

    /// Jitter bounds in ms before a degraded result (default 1000..=3000).
    #[serde(default)]
    pub fallback_jitter_min_ms: Option<u64>,
    #[serde(default)]
    pub fallback_jitter_max_ms: Option<u64>,

    /// Remote calls allowed in flight at once (default 4).
    #[serde(default)]
    pub max_concurrent_calls: Option<usize>,

    // ─────────────────────────────────────────────────────────────────────────
    // Reports
    // ─────────────────────────────────────────────────────────────────────────
    /// Default statistics window in days (default 7).
    #[serde(default)]
    pub stats_days: Option<u32>,

    /// Default number of recent reports shown (default 10).
    #[serde(default)]
    pub recent_limit: Option<usize>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("NEWS_SENTINEL"));
        if let Ok(path) = std::env::var("NEWS_SENTINEL_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// All configured API keys, in rotation order: GEMINI_API_KEY, GEMINI_API_KEY_1..9,
    /// then the comma-separated list. Blanks and duplicates are dropped.
    pub fn api_keys(&self) -> Vec<String> {
        let primary = std::env::var("GEMINI_API_KEY").ok();
        let numbered = (1..=MAX_NUMBERED_KEYS)
            .filter_map(|i| std::env::var(format!("GEMINI_API_KEY_{}", i)).ok());
        collect_keys(
            primary.into_iter().chain(numbered),
            self.gemini_api_keys.as_deref(),
        )
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Storage backend. Unknown values fall back to SQLite.
    pub fn storage_kind(&self) -> StorageKind {
        match self.storage.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("memory") => StorageKind::Memory,
            _ => StorageKind::Sqlite,
        }
    }

    pub fn gemini_api_url_or_default(&self) -> String {
        self.gemini_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string())
    }

    pub fn gemini_model_or_default(&self) -> String {
        self.gemini_model
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string())
    }

    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(60)
    }

    pub fn max_key_attempts_or_default(&self) -> usize {
        self.max_key_attempts.unwrap_or(3).max(1)
    }

    pub fn retry_delay_ms_or_default(&self) -> u64 {
        self.retry_delay_ms.unwrap_or(1000)
    }

    /// Jitter bounds; max is raised to min when misconfigured.
    pub fn fallback_jitter_ms_or_default(&self) -> (u64, u64) {
        let min = self.fallback_jitter_min_ms.unwrap_or(1000);
        let max = self.fallback_jitter_max_ms.unwrap_or(3000).max(min);
        (min, max)
    }

    pub fn max_concurrent_calls_or_default(&self) -> usize {
        self.max_concurrent_calls.unwrap_or(4).max(1)
    }

    pub fn stats_days_or_default(&self) -> u32 {
        self.stats_days.unwrap_or(7)
    }

    pub fn recent_limit_or_default(&self) -> usize {
        self.recent_limit.unwrap_or(10).max(1)
    }
}

/// Merge individually configured keys with a comma-separated list, preserving order.
pub fn collect_keys(
    individual: impl IntoIterator<Item = String>,
    comma_list: Option<&str>,
) -> Vec<String> {
    let listed = comma_list
        .unwrap_or_default()
        .split(',')
        .map(str::to_string);
    let mut keys: Vec<String> = Vec::new();
    for key in individual.into_iter().chain(listed) {
        let key = key.trim();
        if !key.is_empty() && !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_keys_order_and_dedup() {
        let keys = collect_keys(
            vec!["primary".to_string(), " second ".to_string(), String::new()],
            Some("third, primary ,,fourth"),
        );
        assert_eq!(keys, vec!["primary", "second", "third", "fourth"]);
    }

    #[test]
    fn test_collect_keys_none() {
        assert!(collect_keys(Vec::new(), None).is_empty());
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.storage_kind(), StorageKind::Sqlite);
        assert_eq!(cfg.max_key_attempts_or_default(), 3);
        assert_eq!(cfg.retry_delay_ms_or_default(), 1000);
        assert_eq!(cfg.fallback_jitter_ms_or_default(), (1000, 3000));
        assert_eq!(cfg.stats_days_or_default(), 7);
        assert_eq!(cfg.gemini_model_or_default(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_storage_and_jitter_overrides() {
        let cfg = AppConfig {
            storage: Some("Memory".to_string()),
            fallback_jitter_min_ms: Some(500),
            fallback_jitter_max_ms: Some(100),
            ..AppConfig::default()
        };
        assert_eq!(cfg.storage_kind(), StorageKind::Memory);
        assert_eq!(cfg.fallback_jitter_ms_or_default(), (500, 500));
    }
}
