//! The translation service: combines store and cache, owns the current
//! locale/scope, the active snapshot and the missing-key queue.
//!
//! One instance is constructed per request scope and passed explicitly to
//! call sites. The store and cache it references are shared infrastructure;
//! the snapshot and queue are exclusively owned for the instance lifetime.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{Snapshot, TextCache};
use crate::config::MultiLangConfig;
use crate::error::{Error, Result};
use crate::locale::{LocaleConfig, LocaleRegistry};
use crate::router::{LocaleRouter, RequestInfo, RouteAction};
use crate::store::{TextRow, TextStore};

pub struct MultiLang {
    environment: String,
    config: MultiLangConfig,
    router: LocaleRouter,
    store: TextStore,
    cache: Arc<dyn TextCache>,
    lang: Option<String>,
    scope: String,
    texts: Option<Snapshot>,
    new_texts: BTreeMap<String, String>,
}

impl MultiLang {
    pub fn new(
        environment: &str,
        config: MultiLangConfig,
        store: TextStore,
        cache: Arc<dyn TextCache>,
    ) -> Self {
        let registry = LocaleRegistry::new(config.locales.clone(), &config.default_locale);
        let router = LocaleRouter::new(
            registry,
            config.exclude_segments.clone(),
            config.app_url.clone(),
        );

        Self {
            environment: environment.to_string(),
            config,
            router,
            store,
            cache,
            lang: None,
            scope: "global".to_string(),
            texts: None,
            new_texts: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &MultiLangConfig {
        &self.config
    }

    pub fn store(&self) -> &TextStore {
        &self.store
    }

    pub fn router(&self) -> &LocaleRouter {
        &self.router
    }

    /// Set the application scope ("global", "site", "admin", ...).
    pub fn set_scope(&mut self, scope: &str) {
        self.scope = scope.to_string();
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Set the current locale. Empty locales are caller misuse.
    pub fn set_locale(&mut self, lang: &str) -> Result<()> {
        if lang.is_empty() {
            return Err(Error::InvalidArgument("Locale is empty".to_string()));
        }
        self.lang = Some(lang.to_string());
        Ok(())
    }

    /// The current locale, falling back to the configured default.
    pub fn locale(&self) -> &str {
        self.lang.as_deref().unwrap_or(&self.config.default_locale)
    }

    /// Available locale descriptors.
    pub fn locales(&self) -> Vec<&LocaleConfig> {
        self.router.registry().list()
    }

    /// Load the snapshot for a (locale, scope) pair, replacing any
    /// previously held snapshot.
    ///
    /// Outside of production, or with caching disabled, the store is always
    /// read directly so development never sees stale translations. In
    /// production exactly one of three data paths runs: cache hit, or
    /// store read followed by write-through cache population.
    pub fn load_texts(&mut self, locale: Option<&str>, scope: Option<&str>) -> Result<&Snapshot> {
        let locale = locale.unwrap_or_else(|| self.locale()).to_string();
        let scope = scope.unwrap_or(&self.scope).to_string();

        let texts = if self.environment != "production" || !self.config.cache.enabled {
            debug!(%locale, %scope, "loading texts from store (cache bypass)");
            self.store.load(&locale, Some(&scope))?
        } else {
            let cache_name = self.store.cache_name(&locale, Some(&scope));
            if self.cache.has(&cache_name) {
                debug!(%locale, %scope, "loading texts from cache");
                self.cache.get(&cache_name).unwrap_or_default()
            } else {
                debug!(%locale, %scope, "cache miss, populating from store");
                let texts = self.store.load(&locale, Some(&scope))?;
                self.cache
                    .put(&cache_name, texts.clone(), self.config.cache.lifetime_minutes);
                texts
            }
        };

        Ok(self.texts.insert(texts))
    }

    /// Get the translated text for a key.
    ///
    /// Before a locale is set the key itself is returned unchanged and
    /// nothing is queued. With a locale set, the snapshot is lazily loaded
    /// on first use; a key absent from it is queued for saving (idempotent)
    /// and the key doubles as the fallback text. Placeholder replacements
    /// are applied to whatever text is resolved.
    pub fn get(&mut self, key: &str, replacements: &[(&str, &str)]) -> Result<String> {
        if !self.config.use_texts {
            return Err(Error::InvalidArgument(
                "Using texts from database is disabled in config".to_string(),
            ));
        }
        if key.is_empty() {
            return Err(Error::InvalidArgument("Text key not provided".to_string()));
        }

        if self.lang.is_none() {
            return Ok(key.to_string());
        }

        if self.texts.is_none() {
            self.load_texts(None, None)?;
        }

        let text = match self.texts.as_ref().and_then(|texts| texts.get(key)) {
            Some(text) => text.clone(),
            None => {
                self.queue_to_save(key);
                key.to_string()
            }
        };

        Ok(make_replacements(text, replacements))
    }

    /// Replace the snapshot manually.
    pub fn set_texts(&mut self, texts: Snapshot) {
        self.texts = Some(texts);
    }

    /// The active snapshot, if one has been loaded or set.
    pub fn texts(&self) -> Option<&Snapshot> {
        self.texts.as_ref()
    }

    /// Keys queued for saving, pending a `save_texts` flush.
    pub fn pending_texts(&self) -> &BTreeMap<String, String> {
        &self.new_texts
    }

    /// Full rows for administrative listing.
    pub fn get_all_texts(
        &self,
        lang: Option<&str>,
        scope: Option<&str>,
    ) -> Result<BTreeMap<String, BTreeMap<String, TextRow>>> {
        self.store.load_all(lang, scope)
    }

    /// Flush queued missing keys to the store.
    ///
    /// Returns false when nothing is queued. The queue is not cleared; a
    /// repeated flush re-attempts the same inserts, which is safe because
    /// the store's save is idempotent.
    pub fn save_texts(&self) -> Result<bool> {
        if self.new_texts.is_empty() {
            return Ok(false);
        }

        let codes = self.router.registry().codes();
        self.store
            .save(&self.new_texts, Some(&self.scope), &codes)?;
        Ok(true)
    }

    /// Whether missing keys should be auto-saved at end of request.
    pub fn auto_save_allowed(&self) -> bool {
        self.environment == "local" && self.config.db.autosave
    }

    /// Derive the locale for a request. Pure; does not mutate the service.
    pub fn detect_locale(&self, request: &RequestInfo) -> String {
        self.router.detect_locale(request)
    }

    /// Canonical redirect target for a request, if it needs one.
    pub fn redirect_url(&self, request: &RequestInfo) -> Option<String> {
        self.router.redirect_url(request)
    }

    /// Route an incoming request: redirect, JSON 404, or proceed.
    pub fn handle(&self, request: &RequestInfo) -> RouteAction {
        self.router.handle(request)
    }

    /// Locale-prefixed URL for a path, using the current locale unless an
    /// explicit one is given.
    pub fn url(&self, path: &str, lang: Option<&str>) -> String {
        let locale = lang.unwrap_or_else(|| self.locale());
        self.router.url(path, locale)
    }

    /// Locale-prefixed route name using the current locale.
    pub fn route(&self, name: &str) -> String {
        self.router.route(name, self.locale())
    }

    fn queue_to_save(&mut self, key: &str) {
        self.new_texts.insert(key.to_string(), key.to_string());
    }
}

/// Substitute `:name` placeholders into a text.
///
/// Each placeholder is replaced in three case variants: `:name` with the
/// value as-is, `:NAME` with the value uppercased, `:Name` with the value
/// capitalized. Longer placeholder names are resolved first so a short
/// name never partially matches a longer one sharing its prefix
/// (`:date` must not pre-empt `:date2`).
fn make_replacements(text: String, replacements: &[(&str, &str)]) -> String {
    if replacements.is_empty() {
        return text;
    }

    let mut sorted: Vec<(&str, &str)> = replacements.to_vec();
    sorted.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

    let mut text = text;
    for (name, value) in sorted {
        text = text.replace(&format!(":{}", name.to_uppercase()), &value.to_uppercase());
        text = text.replace(&format!(":{}", ucfirst(name)), &ucfirst(value));
        text = text.replace(&format!(":{}", name), value);
    }
    text
}

fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
