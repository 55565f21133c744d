//! Current-request path extraction.
//!
//! Only the path component takes part in matching: scheme, host, query
//! string and fragment are dropped. A context that cannot produce a path
//! yields `None`, which the gate treats as "matches no rule".
//!
//! Paths are taken verbatim. Dot-segments are not resolved, so an offline
//! check sees the same path the middleware sees for the same request.

use axum::http::Uri;

/// Supplies the path of the request being evaluated.
pub trait RequestContext {
    fn current_path(&self) -> Option<&str>;
}

/// Context built from an already-parsed request URI.
#[derive(Debug, Clone)]
pub struct UriContext {
    path: String,
}

impl UriContext {
    pub fn new(uri: &Uri) -> Self {
        Self {
            path: uri.path().to_string(),
        }
    }
}

impl RequestContext for UriContext {
    fn current_path(&self) -> Option<&str> {
        Some(&self.path)
    }
}

/// Context built from an absolute URL such as `https://shop.test/cart?x=1`.
#[derive(Debug, Clone)]
pub struct UrlContext {
    path: Option<String>,
}

impl UrlContext {
    pub fn parse(raw: &str) -> Self {
        // Fragments never reach the server.
        let without_fragment = raw.split('#').next().unwrap_or(raw);
        let path = match without_fragment.parse::<Uri>() {
            Ok(uri) if uri.scheme().is_some() && uri.authority().is_some() => {
                Some(uri.path().to_string())
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(url = %raw, error = %e, "Unparsable request URL");
                None
            }
        };
        Self { path }
    }
}

impl RequestContext for UrlContext {
    fn current_path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// Context built from a bare path such as `/cart?x=1`.
#[derive(Debug, Clone)]
pub struct PathContext {
    path: Option<String>,
}

impl PathContext {
    pub fn parse(raw: &str) -> Self {
        let end = raw.find(['?', '#']).unwrap_or(raw.len());
        let path = &raw[..end];
        let path = if path.starts_with('/') {
            Some(path.to_string())
        } else {
            None
        };
        Self { path }
    }
}

impl RequestContext for PathContext {
    fn current_path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}
