//! Middlewares for [`App`](crate::app::App) pipelines.
//!
//! - [`TracingMiddleware`]: a `tracing` span per request
//! - [`MetricsMiddleware`]: request, error and latency counters
//! - [`IdentityMiddleware`]: bearer token to user
//! - [`AuthMiddleware`]: 401 for anonymous requests outside whitelisted paths
//!
//! Identity has to run before auth, e.g. with a
//! [`MiddlewareChain`](crate::pipeline::MiddlewareChain) constraint
//! `auth` after `identity`.

mod auth;
mod metrics;
mod tracing;

pub use auth::{AuthMiddleware, IdentityMiddleware, USER_KEY, WHITELIST_KEY};
pub use metrics::MetricsMiddleware;
pub use self::tracing::TracingMiddleware;
