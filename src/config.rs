//! Typed configuration for the translation subsystem.
//!
//! Configuration is a strongly-typed struct with named fields and explicit
//! defaults. A generic dotted-path accessor (`ConfigView`) is kept only for
//! the CLI tooling that genuinely needs dynamic traversal.

use anyhow::Result;
use serde_json::{json, Value};

use crate::locale::LocaleConfig;

/// Cache settings.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Whether the cache is consulted at all (production only)
    pub enabled: bool,
    /// Named cache backend; "default" means the host's default store
    pub store: String,
    /// Entry lifetime in minutes
    pub lifetime_minutes: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            store: "default".to_string(),
            lifetime_minutes: 1440,
        }
    }
}

/// Database settings.
#[derive(Debug, Clone)]
pub struct DbSettings {
    /// Autosave missing texts. Only honored in the "local" environment.
    pub autosave: bool,
    /// Path to the SQLite database file
    pub connection: String,
    /// Name of the texts table
    pub texts_table: String,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            autosave: true,
            connection: "storage/multilang.db".to_string(),
            texts_table: "texts".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct MultiLangConfig {
    /// Available locales for routing and text storage
    pub locales: Vec<LocaleConfig>,

    /// Fallback locale for routing
    pub default_locale: String,

    /// Path patterns excluded from locale redirects (trailing `*` wildcard)
    pub exclude_segments: Vec<String>,

    /// Load translations from database/cache at all
    pub use_texts: bool,

    /// Application base URL, stripped from paths before locale prefixing
    pub app_url: String,

    pub cache: CacheSettings,
    pub db: DbSettings,
}

impl Default for MultiLangConfig {
    fn default() -> Self {
        Self {
            locales: vec![LocaleConfig {
                code: "en".to_string(),
                name: "English".to_string(),
                native_name: "English".to_string(),
                canonical_locale: Some("en_GB".to_string()),
                full_locale: Some("en_GB.UTF-8".to_string()),
                is_default: true,
            }],
            default_locale: "en".to_string(),
            exclude_segments: Vec::new(),
            use_texts: true,
            app_url: String::new(),
            cache: CacheSettings::default(),
            db: DbSettings::default(),
        }
    }
}

impl MultiLangConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let locales = match std::env::var("MULTILANG_LOCALES") {
            Ok(codes) => codes
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(LocaleConfig::from_code)
                .collect(),
            Err(_) => defaults.locales,
        };

        Ok(Self {
            locales,
            default_locale: std::env::var("MULTILANG_DEFAULT_LOCALE")
                .unwrap_or(defaults.default_locale),
            exclude_segments: std::env::var("MULTILANG_EXCLUDE_SEGMENTS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            use_texts: std::env::var("MULTILANG_USE_TEXTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            app_url: std::env::var("APP_URL").unwrap_or_default(),
            cache: CacheSettings {
                enabled: std::env::var("MULTILANG_CACHE_ENABLED")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(true),
                store: std::env::var("CACHE_DRIVER").unwrap_or(defaults.cache.store),
                lifetime_minutes: std::env::var("MULTILANG_CACHE_LIFETIME")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1440),
            },
            db: DbSettings {
                autosave: std::env::var("MULTILANG_AUTOSAVE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(true),
                connection: std::env::var("DATABASE_URL").unwrap_or(defaults.db.connection),
                texts_table: std::env::var("MULTILANG_TEXTS_TABLE")
                    .unwrap_or(defaults.db.texts_table),
            },
        })
    }

    /// Dynamic view over the configuration tree, for tooling.
    pub fn view(&self) -> ConfigView {
        let locales: Value = self
            .locales
            .iter()
            .map(|locale| {
                (
                    locale.code.clone(),
                    json!({
                        "name": locale.name,
                        "native_name": locale.native_name,
                        "canonical_locale": locale.canonical_locale,
                        "full_locale": locale.full_locale,
                        "is_default": locale.is_default,
                    }),
                )
            })
            .collect::<serde_json::Map<_, _>>()
            .into();

        ConfigView::new(json!({
            "locales": locales,
            "default_locale": self.default_locale,
            "exclude_segments": self.exclude_segments,
            "use_texts": self.use_texts,
            "app_url": self.app_url,
            "cache": {
                "enabled": self.cache.enabled,
                "store": self.cache.store,
                "lifetime": self.cache.lifetime_minutes,
            },
            "db": {
                "autosave": self.db.autosave,
                "connection": self.db.connection,
                "texts_table": self.db.texts_table,
            },
        }))
    }
}

/// Read-only dotted-path accessor over a nested configuration tree.
///
/// Path resolution walks each dot-separated segment through nested
/// mappings; a missing segment or a non-mapping intermediate yields the
/// default. No error is ever raised for missing keys.
#[derive(Debug, Clone)]
pub struct ConfigView {
    data: Value,
}

impl ConfigView {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Get a config parameter by dotted path. `None` returns the whole tree.
    pub fn get(&self, path: Option<&str>, default: Value) -> Value {
        let Some(path) = path else {
            return self.data.clone();
        };

        let mut current = &self.data;
        for segment in path.split('.') {
            match current.as_object().and_then(|map| map.get(segment)) {
                Some(value) => current = value,
                None => return default,
            }
        }

        current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ConfigView {
        ConfigView::new(json!({
            "default_locale": "en",
            "cache": { "enabled": true, "lifetime": 1440 },
            "db": { "texts_table": "texts" },
        }))
    }

    // ==================== ConfigView Tests ====================

    #[test]
    fn test_get_top_level() {
        assert_eq!(view().get(Some("default_locale"), Value::Null), json!("en"));
    }

    #[test]
    fn test_get_nested() {
        assert_eq!(view().get(Some("cache.lifetime"), Value::Null), json!(1440));
        assert_eq!(
            view().get(Some("db.texts_table"), Value::Null),
            json!("texts")
        );
    }

    #[test]
    fn test_get_missing_returns_default() {
        assert_eq!(
            view().get(Some("missing"), json!("fallback")),
            json!("fallback")
        );
        assert_eq!(view().get(Some("cache.missing"), json!(5)), json!(5));
    }

    #[test]
    fn test_get_through_non_mapping_returns_default() {
        // "default_locale" is a string, so walking deeper must fail soft
        assert_eq!(
            view().get(Some("default_locale.deeper"), json!(null)),
            Value::Null
        );
    }

    #[test]
    fn test_get_null_path_returns_tree() {
        let tree = view().get(None, Value::Null);
        assert!(tree.is_object());
        assert_eq!(tree["cache"]["enabled"], json!(true));
    }

    // ==================== Typed Config Tests ====================

    #[test]
    fn test_defaults() {
        let config = MultiLangConfig::default();
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.cache.lifetime_minutes, 1440);
        assert_eq!(config.db.texts_table, "texts");
        assert!(config.use_texts);
        assert!(config.db.autosave);
    }

    #[test]
    fn test_view_round_trip() {
        let config = MultiLangConfig::default();
        let view = config.view();
        assert_eq!(view.get(Some("cache.lifetime"), Value::Null), json!(1440));
        assert_eq!(
            view.get(Some("locales.en.name"), Value::Null),
            json!("English")
        );
        assert_eq!(view.get(Some("db.texts_table"), Value::Null), json!("texts"));
    }
}
