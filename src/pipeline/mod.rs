//! # Pipeline Module
//!
//! Composes an ordered list of middlewares around a terminal handler.
//!
//! ## Overview
//!
//! A [`Handler`] is a shared `Fn(Rq) -> Rs`. A [`Middleware`] receives the
//! inner handler and the pipeline configuration and returns a new handler
//! with the same contract. Any closure of the right shape is a middleware.
//!
//! [`Pipeline::wrap`] folds the middlewares right to left: the last one wraps
//! the terminal handler first, so the first declared middleware runs first
//! on the way in and last on the way out.
//!
//! ```text
//! Pipeline [auth, tracing]  wrapping  handler
//!
//! auth ─▶ tracing ─▶ handler
//! auth ◀─ tracing ◀─ handler
//! ```
//!
//! ## Memoization
//!
//! Composition runs once per distinct handler per pipeline. The cache is keyed
//! by the address of the handler's `Arc` and keeps the raw handler alive, so
//! an address can never be recycled for a different handler while its entry
//! exists. With no middlewares the handler is returned as is.
//!
//! ## Ordering by constraints
//!
//! [`MiddlewareChain`] collects named middlewares with `before`/`after`
//! constraints and builds a [`Pipeline`] in topology order.
//!
//! ```rust
//! use compono::pipeline::{Handler, Pipeline};
//! use std::sync::Arc;
//!
//! let shout: Handler<String, String> = Arc::new(|s: String| s.to_uppercase());
//! let suffix = |inner: Handler<String, String>, _cfg: Option<&compono::pipeline::Config>| {
//!     Arc::new(move |s: String| format!("{} !", inner(s))) as Handler<String, String>
//! };
//!
//! let pipeline = Pipeline::new([("suffix", suffix)], None);
//! let wrapped = pipeline.wrap(&shout);
//! assert_eq!(wrapped("hi".into()), "HI !");
//! ```

mod chain;
mod core;

pub use chain::MiddlewareChain;
pub use core::{Config, Handler, Middleware, Pipeline, PipelineError};
