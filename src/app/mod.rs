//! # App Module
//!
//! The explicit application object. It owns every registry a running
//! service needs, is built once during setup, and is then shared read-only
//! while serving.
//!
//! ## Request flow
//!
//! 1. [`App::handle`] matches the request against the router
//! 2. path parameters are copied into the [`Request`]
//! 3. the endpoint is wrapped by the pipeline (memoized per endpoint)
//! 4. the wrapped endpoint produces the [`Response`]
//!
//! ```rust
//! use compono::app::{endpoint, App, Response};
//! use http::Method;
//! use serde_json::json;
//!
//! let mut app = App::new();
//! app.router
//!     .get("/doc/{id}", endpoint(|req| Response::json(200, json!({ "id": req.get_param("id") }))))
//!     .unwrap();
//!
//! assert_eq!(app.call(Method::GET, "/doc/42").body, json!({ "id": "42" }));
//! assert_eq!(app.call(Method::GET, "/missing").status, 404);
//! assert_eq!(app.call(Method::PUT, "/doc/42").status, 405);
//! ```

mod core;
mod request;
mod response;

pub use core::{endpoint, App, Endpoint};
pub use request::{HeaderVec, Request, MAX_INLINE_HEADERS, REQUEST};
pub use response::{Response, RESPONSE};
