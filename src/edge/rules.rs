//! Route rule table for the edge router
//!
//! Path-based dispatch is modeled as an ordered, declarative list of
//! pattern -> policy mappings instead of nested conditionals. Rules are
//! evaluated most-specific-pattern-first: an exact pattern outranks a
//! wildcard prefix, a longer literal prefix outranks a shorter one, and the
//! single default rule (`*`) catches everything else. Ties between distinct
//! patterns break lexicographically so the evaluation order is total.
//!
//! Patterns are glob strings matched with the `glob-match` crate: `*`
//! stops at path separators, `**` crosses them, so a prefix rule covering
//! nested paths is written `/api/**`.

use std::collections::HashSet;
use std::time::Duration;

use glob_match::glob_match;
use http::Method;

use crate::error::{PromptEdgeError, Result};

/// The default catch-all pattern.
pub const DEFAULT_PATTERN: &str = "*";

/// Which backend answers a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginKind {
    /// Pre-built assets served from the content store
    Static,
    /// The compute service behind the load balancer
    Dynamic,
}

impl std::fmt::Display for OriginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Cache policy applied to responses for a matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Zero-duration freshness window: every request revalidates against
    /// the origin. Used for per-user, time-sensitive dynamic responses.
    Bypass,
    /// Long-lived caching with the given lifetime.
    Cacheable {
        /// Response lifetime before revalidation
        max_age: Duration,
    },
}

impl CachePolicy {
    /// Renders the policy as a `Cache-Control` header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use promptedge::edge::CachePolicy;
    ///
    /// assert_eq!(
    ///     CachePolicy::Bypass.cache_control(),
    ///     "no-cache, no-store, must-revalidate"
    /// );
    /// assert_eq!(
    ///     CachePolicy::Cacheable { max_age: Duration::from_secs(3600) }.cache_control(),
    ///     "public, max-age=3600"
    /// );
    /// ```
    pub fn cache_control(&self) -> String {
        match self {
            Self::Bypass => "no-cache, no-store, must-revalidate".to_string(),
            Self::Cacheable { max_age } => format!("public, max-age={}", max_age.as_secs()),
        }
    }

    /// Returns `true` when responses under this policy may be reused.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Cacheable { .. })
    }
}

/// Cookie forwarding policy for a route rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieForwarding {
    /// Forward every cookie unmodified
    All,
    /// Forward no cookies
    None,
    /// Forward only the named cookies
    Whitelist(Vec<String>),
}

/// Header forwarding policy for a route rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderForwarding {
    /// Forward every request header unmodified
    All,
    /// Forward only the named headers
    Named(Vec<String>),
    /// Forward no request headers
    None,
}

/// One pattern -> policy mapping in the rule table.
///
/// A rule pairs a path pattern with an origin, the methods it permits, and
/// the cache/forwarding policy applied when it matches.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Glob pattern; a bare `*` marks the default rule
    pub pattern: String,
    /// Origin answering requests matched by this rule
    pub origin: OriginKind,
    /// HTTP methods the rule permits
    pub methods: HashSet<Method>,
    /// Cache policy applied to matched responses
    pub cache: CachePolicy,
    /// Whether the query string is forwarded to the origin
    pub forward_query: bool,
    /// Cookie forwarding policy
    pub forward_cookies: CookieForwarding,
    /// Header forwarding policy
    pub forward_headers: HeaderForwarding,
}

impl RouteRule {
    /// Returns `true` when this is the default catch-all rule.
    pub fn is_default(&self) -> bool {
        self.pattern == DEFAULT_PATTERN
    }

    /// Returns `true` when the rule's pattern matches `path`.
    pub fn matches(&self, path: &str) -> bool {
        if self.is_default() {
            return true;
        }
        glob_match(&self.pattern, path)
    }

    /// Returns `true` when the rule permits `method`.
    pub fn allows_method(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// Specificity key used to totally order rules.
    ///
    /// Exact patterns (no wildcard) rank above wildcard prefixes, which rank
    /// above the default; within a rank, a longer literal prefix wins.
    pub fn specificity(&self) -> (u8, usize) {
        if self.is_default() {
            return (0, 0);
        }
        let literal_len = self
            .pattern
            .find(['*', '?'])
            .unwrap_or(self.pattern.len());
        if literal_len == self.pattern.len() {
            (2, literal_len)
        } else {
            (1, literal_len)
        }
    }
}

/// All HTTP methods the dynamic rule permits.
fn all_methods() -> HashSet<Method> {
    [
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ]
    .into_iter()
    .collect()
}

/// Methods the static default rule permits.
fn static_methods() -> HashSet<Method> {
    [Method::GET, Method::HEAD].into_iter().collect()
}

/// An ordered, validated rule table.
///
/// Construction validates the invariants the router relies on: exactly one
/// default rule, no duplicate patterns, and a non-empty method set on every
/// rule. Rules are stored sorted by descending specificity so evaluation is
/// a first-match scan.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use promptedge::edge::RuleTable;
///
/// let table = RuleTable::for_app("/api/", Duration::from_secs(86400)).unwrap();
/// assert_eq!(table.rules().len(), 2);
/// assert!(table.rules()[0].pattern.starts_with("/api/"));
/// ```
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<RouteRule>,
}

impl RuleTable {
    /// Build a validated table from `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`PromptEdgeError::RuleTable`] when the table has no default
    /// rule, more than one default rule, duplicate patterns, or a rule with
    /// an empty method set.
    pub fn new(rules: Vec<RouteRule>) -> Result<Self> {
        let default_count = rules.iter().filter(|r| r.is_default()).count();
        if default_count == 0 {
            return Err(PromptEdgeError::RuleTable(
                "exactly one default rule is required, found none".to_string(),
            )
            .into());
        }
        if default_count > 1 {
            return Err(PromptEdgeError::RuleTable(format!(
                "exactly one default rule is required, found {}",
                default_count
            ))
            .into());
        }

        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.pattern.clone()) {
                return Err(PromptEdgeError::RuleTable(format!(
                    "duplicate pattern: {}",
                    rule.pattern
                ))
                .into());
            }
            if rule.methods.is_empty() {
                return Err(PromptEdgeError::RuleTable(format!(
                    "rule {} permits no methods",
                    rule.pattern
                ))
                .into());
            }
        }

        let mut rules = rules;
        // Descending specificity; lexicographic pattern tiebreak keeps the
        // order total when two distinct patterns share a specificity key.
        rules.sort_by(|a, b| {
            b.specificity()
                .cmp(&a.specificity())
                .then_with(|| a.pattern.cmp(&b.pattern))
        });

        Ok(Self { rules })
    }

    /// Build the canonical application table: one dynamic rule covering the
    /// API prefix and the static default.
    ///
    /// The dynamic rule bypasses caching and forwards the full query string,
    /// all cookies, and all headers (including `Authorization`). The static
    /// default allows long-lived caching and forwards nothing.
    ///
    /// # Arguments
    ///
    /// * `api_prefix` - Path prefix routed to the dynamic origin (e.g. "/api/")
    /// * `static_max_age` - Cache lifetime for static responses
    ///
    /// # Errors
    ///
    /// Returns [`PromptEdgeError::RuleTable`] if `api_prefix` does not start
    /// with `/`.
    pub fn for_app(api_prefix: &str, static_max_age: Duration) -> Result<Self> {
        if !api_prefix.starts_with('/') {
            return Err(PromptEdgeError::RuleTable(format!(
                "API prefix must start with '/': {}",
                api_prefix
            ))
            .into());
        }

        let dynamic = RouteRule {
            pattern: format!("{}**", api_prefix),
            origin: OriginKind::Dynamic,
            methods: all_methods(),
            cache: CachePolicy::Bypass,
            forward_query: true,
            forward_cookies: CookieForwarding::All,
            forward_headers: HeaderForwarding::All,
        };

        let default = RouteRule {
            pattern: DEFAULT_PATTERN.to_string(),
            origin: OriginKind::Static,
            methods: static_methods(),
            cache: CachePolicy::Cacheable {
                max_age: static_max_age,
            },
            forward_query: false,
            forward_cookies: CookieForwarding::None,
            forward_headers: HeaderForwarding::None,
        };

        Self::new(vec![dynamic, default])
    }

    /// Builds a table without validation or sorting. Test-only: lets router
    /// tests exercise the no-match failure path, which a validated table
    /// makes unreachable.
    #[cfg(test)]
    pub(crate) fn unchecked(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// The rules in evaluation order (most specific first).
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Find the first rule matching `path` in specificity order.
    pub fn find(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }
}
