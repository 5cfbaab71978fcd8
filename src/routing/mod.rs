//! # Routing Module
//!
//! Maps `(path, method)` pairs to endpoint components.
//!
//! ## Overview
//!
//! Paths are split into segments and stored in a radix tree. Static segments
//! match exactly and win over `{param}` segments, which capture one segment
//! each. Every terminal node keeps one route per HTTP method, so a request
//! resolves to one of three outcomes:
//!
//! - a [`MatchedRoute`] with the captured parameters
//! - [`RoutingError::NotFound`] when no path matches
//! - [`RoutingError::MethodNotAllowed`] when the path matches but not the
//!   method, listing the allowed methods
//!
//! Routes may be named; [`Router::url_for`] rebuilds their path from
//! parameters. Routers merge with `|` like the registries, the right-hand
//! router winning on a shared `(path, method)`.
//!
//! ```rust
//! use compono::routing::{Router, RoutingError};
//! use http::Method;
//!
//! let mut router: Router<&str> = Router::new();
//! router.get("/", "index").unwrap();
//! router.get("/doc/{id}", "doc").unwrap();
//!
//! let matched = router.match_route(&Method::GET, "/doc/42").unwrap();
//! assert_eq!(*matched.route.value(), "doc");
//! assert_eq!(matched.get_param("id"), Some("42"));
//!
//! assert!(matches!(
//!     router.match_route(&Method::POST, "/doc/42"),
//!     Err(RoutingError::MethodNotAllowed { .. })
//! ));
//! ```

mod core;
mod radix;

pub use core::{MatchedRoute, ParamVec, Route, Router, RoutingError, MAX_INLINE_PARAMS, METHODS};
