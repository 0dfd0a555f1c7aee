//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for a request path
//! - Rewrite the matched prefix into the backend path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - Prefixes match whole path segments: `/a/json` does not match `/a/jsonp`
//! - Explicit `None` rather than silent default

use crate::config::RouteConfig;

/// A compiled route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    path_prefix: String,
    upstream_path: Option<String>,
    priority: u32,
}

impl Route {
    fn from_config(config: RouteConfig) -> Self {
        Self {
            name: config.name,
            path_prefix: config.path_prefix,
            upstream_path: config.upstream_path,
            priority: config.priority,
        }
    }

    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.path_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.path_prefix.ends_with('/'),
            None => false,
        }
    }

    /// Backend path for a client path this route matched.
    pub fn upstream_path(&self, path: &str) -> String {
        let Some(replacement) = &self.upstream_path else {
            return path.to_string();
        };
        let rest = path.strip_prefix(self.path_prefix.as_str()).unwrap_or_default();
        let rewritten = format!("{}{}", replacement.trim_end_matches('/'), rest);
        if rewritten.is_empty() {
            "/".to_string()
        } else {
            rewritten
        }
    }
}

/// Path-prefix router over the configured routes.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Compile routes: highest priority first, then longest prefix first.
    pub fn from_config(routes: Vec<RouteConfig>) -> Self {
        let mut routes: Vec<Route> = routes.into_iter().map(Route::from_config).collect();
        routes.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.path_prefix.len().cmp(&a.path_prefix.len()))
        });
        Self { routes }
    }

    /// First route matching `path`, if any.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, prefix: &str, upstream: Option<&str>, priority: u32) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            path_prefix: prefix.into(),
            upstream_path: upstream.map(Into::into),
            priority,
        }
    }

    #[test]
    fn test_segment_prefix_matching() {
        let router = Router::from_config(vec![route(
            "reverse",
            "/maps/api/geocode/json",
            Some("/v1/reverse"),
            0,
        )]);

        assert!(router.match_path("/maps/api/geocode/json").is_some());
        assert!(router.match_path("/maps/api/geocode/json/extra").is_some());
        assert!(router.match_path("/maps/api/geocode/jsonp").is_none());
        assert!(router.match_path("/maps/api/geocode").is_none());
    }

    #[test]
    fn test_priority_then_longest_prefix() {
        let router = Router::from_config(vec![
            route("catch-all", "/", None, 0),
            route("maps", "/maps", None, 0),
            route("geocode", "/maps/api/geocode/json", None, 0),
            route("pinned", "/maps/api", None, 10),
        ]);

        assert_eq!(router.match_path("/maps/api/geocode/json").unwrap().name, "pinned");
        assert_eq!(router.match_path("/maps/tiles").unwrap().name, "maps");
        assert_eq!(router.match_path("/other").unwrap().name, "catch-all");
    }

    #[test]
    fn test_upstream_path_rewrite() {
        let router = Router::from_config(vec![
            route("reverse", "/maps/api/geocode/json", Some("/v1/reverse"), 0),
            route("passthrough", "/v1", None, 0),
        ]);

        let reverse = router.match_path("/maps/api/geocode/json").unwrap();
        assert_eq!(reverse.upstream_path("/maps/api/geocode/json"), "/v1/reverse");
        assert_eq!(reverse.upstream_path("/maps/api/geocode/json/x"), "/v1/reverse/x");

        let passthrough = router.match_path("/v1/search").unwrap();
        assert_eq!(passthrough.upstream_path("/v1/search"), "/v1/search");
    }

    #[test]
    fn test_no_routes() {
        let router = Router::from_config(Vec::new());
        assert!(router.match_path("/").is_none());
    }
}
