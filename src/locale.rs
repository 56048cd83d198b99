//! Locale descriptors and the registry mapping codes to them.
//!
//! Locales are defined entirely in static configuration and are read-only
//! at runtime: the code → descriptor mapping is immutable for the process
//! lifetime. The registry is an owned value passed explicitly to whatever
//! needs it — there is no ambient singleton.

use std::collections::BTreeMap;

/// Configuration for a single supported locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    /// ISO 639-1 language code (e.g., "en", "ka")
    pub code: String,

    /// English name of the language (e.g., "English", "Georgian")
    pub name: String,

    /// Native name of the language (e.g., "English", "ქართული")
    pub native_name: String,

    /// Canonical locale identifier used when activating this locale
    /// (e.g., "en_GB"). Falls back to `code` when unset.
    pub canonical_locale: Option<String>,

    /// Full system locale string (e.g., "en_GB.UTF-8"), when known
    pub full_locale: Option<String>,

    /// Whether this is the default/fallback locale
    pub is_default: bool,
}

impl LocaleConfig {
    /// Build a minimal descriptor where all names default to the code.
    pub fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_string(),
            native_name: code.to_string(),
            canonical_locale: None,
            full_locale: None,
            is_default: false,
        }
    }

    /// The locale identifier to activate for this descriptor.
    pub fn canonical(&self) -> &str {
        self.canonical_locale.as_deref().unwrap_or(&self.code)
    }
}

/// Immutable registry of supported locales, keyed by code.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: BTreeMap<String, LocaleConfig>,
    default_locale: String,
}

impl LocaleRegistry {
    /// Build a registry from descriptors and a default locale code.
    ///
    /// The descriptor matching `default_locale` gets its `is_default` flag
    /// set; a missing default descriptor is tolerated (the code is still
    /// used as the routing fallback).
    pub fn new(locales: Vec<LocaleConfig>, default_locale: &str) -> Self {
        let mut map = BTreeMap::new();
        for mut locale in locales {
            locale.is_default = locale.code == default_locale;
            map.insert(locale.code.clone(), locale);
        }
        Self {
            locales: map,
            default_locale: default_locale.to_string(),
        }
    }

    /// Get a locale descriptor by its code.
    pub fn get(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.get(code)
    }

    /// Check whether a code names a configured locale.
    pub fn contains(&self, code: &str) -> bool {
        self.locales.contains_key(code)
    }

    /// The configured default/fallback locale code.
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// All configured locale codes, in lexical order.
    pub fn codes(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }

    /// All locale descriptors, in lexical code order.
    pub fn list(&self) -> Vec<&LocaleConfig> {
        self.locales.values().collect()
    }

    /// Number of configured locales.
    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}
