//! Request evaluation against the rule table
//!
//! The router owns precedence: it selects the single matching rule for a
//! request (most specific first), enforces the rule's method set, and
//! computes the exact header/cookie/query set forwarded to the chosen
//! origin. A request to a dynamic-tagged path is never served from the
//! static origin, because the table orders the dynamic rule above the
//! static default.
//!
//! Routing failures are typed: a method outside the matched rule's set is
//! [`PromptEdgeError::MethodNotAllowed`], and an unmatched path (unreachable
//! while the table carries a default rule) fails closed as
//! [`PromptEdgeError::NoRouteMatched`] rather than falling through to an
//! origin.

use http::header::{HeaderName, HeaderValue, COOKIE};
use http::{HeaderMap, Method};

use crate::edge::rules::{
    CachePolicy, CookieForwarding, HeaderForwarding, OriginKind, RuleTable,
};
use crate::error::PromptEdgeError;

/// An incoming request as seen at the edge.
///
/// Cookies are modeled as parsed pairs rather than a raw `Cookie` header so
/// the whitelist policy can filter by name; the router rebuilds the header
/// for the origin when the matched rule forwards cookies.
#[derive(Debug, Clone)]
pub struct EdgeRequest {
    /// Request path, e.g. `/api/history`
    pub path: String,
    /// HTTP method
    pub method: Method,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    /// Cookie pairs sent by the client
    pub cookies: Vec<(String, String)>,
    /// Request headers
    pub headers: HeaderMap,
}

impl EdgeRequest {
    /// Creates a request with no query, cookies, or headers.
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
            query: None,
            cookies: Vec::new(),
            headers: HeaderMap::new(),
        }
    }

    /// Attaches a raw query string.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Adds a cookie pair.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }
}

/// The routing outcome for one request.
///
/// Carries the chosen origin together with the applied policy: the cache
/// behavior for the response and the exact header set (cookies already
/// folded in) to forward.
#[derive(Debug, Clone)]
pub struct RouteDecision {
    /// Origin that answers the request
    pub origin: OriginKind,
    /// Pattern of the matched rule
    pub pattern: String,
    /// Cache policy for the response
    pub cache: CachePolicy,
    /// Whether the query string is forwarded to the origin
    pub forward_query: bool,
    /// Headers to forward, filtered per the matched rule
    pub forwarded_headers: HeaderMap,
}

/// Rule-evaluation layer choosing an origin and policy per request.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use http::Method;
/// use promptedge::edge::{EdgeRequest, EdgeRouter, OriginKind, RuleTable};
///
/// let table = RuleTable::for_app("/api/", Duration::from_secs(86400)).unwrap();
/// let router = EdgeRouter::new(table);
///
/// let request = EdgeRequest::new("/api/history", Method::GET);
/// let decision = router.route(&request).unwrap();
/// assert_eq!(decision.origin, OriginKind::Dynamic);
/// ```
#[derive(Debug, Clone)]
pub struct EdgeRouter {
    table: RuleTable,
}

impl EdgeRouter {
    /// Creates a router over a validated rule table.
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    /// The underlying rule table.
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Evaluate `request` against the rule table.
    ///
    /// # Errors
    ///
    /// * [`PromptEdgeError::MethodNotAllowed`] when the matched rule does
    ///   not permit the request method.
    /// * [`PromptEdgeError::NoRouteMatched`] when no rule matches; the
    ///   request is rejected rather than forwarded anywhere.
    pub fn route(&self, request: &EdgeRequest) -> Result<RouteDecision, PromptEdgeError> {
        let rule = self
            .table
            .find(&request.path)
            .ok_or_else(|| PromptEdgeError::NoRouteMatched(request.path.clone()))?;

        if !rule.allows_method(&request.method) {
            return Err(PromptEdgeError::MethodNotAllowed {
                method: request.method.clone(),
                path: request.path.clone(),
            });
        }

        let mut forwarded = match &rule.forward_headers {
            HeaderForwarding::All => request.headers.clone(),
            HeaderForwarding::Named(names) => {
                let mut map = HeaderMap::new();
                for name in names {
                    if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) {
                        if let Some(value) = request.headers.get(&header_name) {
                            map.insert(header_name, value.clone());
                        }
                    }
                }
                map
            }
            HeaderForwarding::None => HeaderMap::new(),
        };

        // Cookies are owned by the cookie policy, not the header policy.
        forwarded.remove(COOKIE);
        if let Some(cookie_header) = Self::cookie_header(&rule.forward_cookies, &request.cookies) {
            forwarded.insert(COOKIE, cookie_header);
        }

        tracing::debug!(
            path = %request.path,
            method = %request.method,
            pattern = %rule.pattern,
            origin = %rule.origin,
            "Routed request"
        );

        Ok(RouteDecision {
            origin: rule.origin,
            pattern: rule.pattern.clone(),
            cache: rule.cache,
            forward_query: rule.forward_query,
            forwarded_headers: forwarded,
        })
    }

    /// Rebuilds the `Cookie` header per the rule's cookie policy.
    ///
    /// Returns `None` when no cookies are forwarded, so the header is
    /// absent rather than empty-valued.
    fn cookie_header(
        policy: &CookieForwarding,
        cookies: &[(String, String)],
    ) -> Option<HeaderValue> {
        let forwarded: Vec<String> = match policy {
            CookieForwarding::All => cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect(),
            CookieForwarding::Whitelist(names) => cookies
                .iter()
                .filter(|(name, _)| names.iter().any(|allowed| allowed == name))
                .map(|(name, value)| format!("{}={}", name, value))
                .collect(),
            CookieForwarding::None => Vec::new(),
        };

        if forwarded.is_empty() {
            return None;
        }
        HeaderValue::from_str(&forwarded.join("; ")).ok()
    }
}
