//! Database-backed text translations with locale-aware routing.
//!
//! Translations live in a single SQLite table keyed by (key, lang, scope)
//! and are served through a TTL cache. [`MultiLang`] is the entry point:
//! set a locale, look up keys with `:name` placeholder substitution, and
//! let unknown keys queue up for auto-saving in development. [`LocaleRouter`]
//! handles locale-prefixed paths and fallback redirects, and [`transfer`]
//! moves texts between the database and per-scope YAML files.

pub mod cache;
pub mod config;
pub mod error;
pub mod locale;
pub mod router;
pub mod service;
pub mod store;
pub mod transfer;

pub use cache::{cache_key, MemoryCache, Snapshot, TextCache};
pub use config::{CacheSettings, ConfigView, DbSettings, MultiLangConfig};
pub use error::{Error, Result};
pub use locale::{LocaleConfig, LocaleRegistry};
pub use router::{LocaleRouter, RequestInfo, RouteAction};
pub use service::MultiLang;
pub use store::{TextRow, TextStore};
pub use transfer::{ImportStats, TextFileEntry};
