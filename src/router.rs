//! Locale derivation from request paths and locale-prefixed URL helpers.
//!
//! Every servable path is classified as exactly one of
//! {valid-locale-prefixed, needs-redirect}; the classification is
//! deterministic and total over all path shapes, and a correctly prefixed
//! path is provably a no-redirect case, so repeated application cannot
//! loop.

use regex::Regex;

use crate::locale::LocaleRegistry;

/// Minimal view of an incoming HTTP request.
///
/// Exposes only what locale routing needs: path segments, the raw query
/// string, and whether the client expects a JSON response.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    segments: Vec<String>,
    query: String,
    accepts_json: bool,
}

impl RequestInfo {
    /// Build from a request path, e.g. `/en/users?page=2`.
    pub fn from_path(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, query.to_string()),
            None => (path, String::new()),
        };

        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            segments,
            query,
            accepts_json: false,
        }
    }

    /// Mark the request as expecting JSON (e.g. `Accept: application/json`).
    pub fn accepting_json(mut self) -> Self {
        self.accepts_json = true;
        self
    }

    /// One-based path segment, like the host framework's `segment(n)`.
    pub fn segment(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|i| self.segments.get(i))
            .map(String::as_str)
    }

    /// All path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Raw query string, without the leading `?`.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the client expects JSON.
    pub fn accepts_json(&self) -> bool {
        self.accepts_json
    }

    /// Path without locale handling, segments joined by `/`.
    fn joined_path(&self) -> String {
        self.segments.join("/")
    }
}

/// Outcome of routing an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// The path is well-formed; serve it under the resolved locale.
    Proceed { locale: String },
    /// Redirect to the canonical locale-prefixed URL.
    Redirect(String),
    /// JSON clients get a 404 instead of a redirect.
    NotFoundJson,
}

/// Locale-aware URL routing over an immutable locale registry.
#[derive(Debug, Clone)]
pub struct LocaleRouter {
    registry: LocaleRegistry,
    exclude_segments: Vec<String>,
    app_url: String,
}

impl LocaleRouter {
    pub fn new(registry: LocaleRegistry, exclude_segments: Vec<String>, app_url: String) -> Self {
        Self {
            registry,
            exclude_segments,
            app_url,
        }
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    /// Derive the locale from the first path segment.
    ///
    /// A matching configured code resolves to that locale's canonical
    /// locale (or the code itself if unset); anything else resolves to the
    /// configured default. Pure: same path, same result.
    pub fn detect_locale(&self, request: &RequestInfo) -> String {
        match request.segment(1).and_then(|code| self.registry.get(code)) {
            Some(locale) => locale.canonical().to_string(),
            None => self.registry.default_locale().to_string(),
        }
    }

    /// Compute the canonical redirect target for a request, if any.
    ///
    /// Paths matching an exclude pattern and paths already prefixed with a
    /// known locale yield no redirect. A 2-character unknown first segment
    /// is replaced with the fallback locale; a path with no locale segment
    /// at all gets the fallback prefixed. The query string is preserved
    /// verbatim.
    pub fn redirect_url(&self, request: &RequestInfo) -> Option<String> {
        let path = request.joined_path();
        if self
            .exclude_segments
            .iter()
            .any(|pattern| pattern_matches(pattern, &path))
        {
            return None;
        }

        let fallback = self.registry.default_locale();
        match request.segment(1) {
            Some(first) if first.chars().count() == 2 => {
                if self.registry.contains(first) {
                    return None;
                }
                let mut segments: Vec<&str> =
                    request.segments().iter().map(String::as_str).collect();
                segments[0] = fallback;
                Some(append_query(
                    format!("/{}", segments.join("/")),
                    request.query(),
                ))
            }
            _ => {
                let url = if path.is_empty() {
                    format!("/{}", fallback)
                } else {
                    format!("/{}/{}", fallback, path)
                };
                Some(append_query(url, request.query()))
            }
        }
    }

    /// Route an incoming request: redirect, JSON 404, or proceed.
    pub fn handle(&self, request: &RequestInfo) -> RouteAction {
        match self.redirect_url(request) {
            Some(_) if request.accepts_json() => RouteAction::NotFoundJson,
            Some(url) => RouteAction::Redirect(url),
            None => RouteAction::Proceed {
                locale: self.detect_locale(request),
            },
        }
    }

    /// Prefix a path with the given locale.
    ///
    /// Strips the configured application base URL and any existing known
    /// locale prefix first, so already-prefixed paths are never doubled.
    pub fn url(&self, path: &str, locale: &str) -> String {
        let path = self.remove_locale_from_path(path);
        format!("{}/{}", locale, path)
    }

    /// Locale-namespaced route name: `users.index` → `en.users.index`.
    pub fn route(&self, name: &str, locale: &str) -> String {
        format!("{}.{}", locale, name)
    }

    fn remove_locale_from_path(&self, path: &str) -> String {
        let mut path = path;
        if !self.app_url.is_empty() {
            if let Some(stripped) = path.strip_prefix(self.app_url.as_str()) {
                path = stripped;
            }
        }
        let path = path.trim_start_matches('/');

        match path.split_once('/') {
            Some((first, rest)) if self.registry.contains(first) => rest.to_string(),
            None if self.registry.contains(path) => String::new(),
            _ => path.to_string(),
        }
    }
}

fn append_query(url: String, query: &str) -> String {
    if query.is_empty() {
        url
    } else {
        format!("{}?{}", url, query)
    }
}

/// Match a path against an exclude pattern with `*` wildcards,
/// mirroring the host framework's `Request::is()`.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    if pattern == path {
        return true;
    }
    let regex = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
    Regex::new(&regex)
        .map(|re| re.is_match(path))
        .unwrap_or(false)
}
