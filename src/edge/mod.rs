//! Edge routing core
//!
//! This module holds the rule table ([`rules`]), the request-evaluation
//! layer ([`router`]), and the proxy server that applies routing decisions
//! to live traffic ([`proxy`]).

pub mod proxy;
pub mod router;
pub mod rules;

pub use router::{EdgeRequest, EdgeRouter, RouteDecision};
pub use rules::{
    CachePolicy, CookieForwarding, HeaderForwarding, OriginKind, RouteRule, RuleTable,
    DEFAULT_PATTERN,
};
