//! # CLI Module
//!
//! The `compono` binary works on an application description (see
//! [`config`](crate::config)) and offers three commands.
//!
//! ### `routes`
//!
//! List every route with its method and name:
//!
//! ```bash
//! compono routes --app app.yaml
//! ```
//!
//! ### `order`
//!
//! Print the middleware order resolved from the `before`/`after`
//! constraints; a cycle is reported as an error:
//!
//! ```bash
//! compono order --app app.yaml
//! ```
//!
//! ### `dispatch`
//!
//! Build the application, send one request through router and pipeline,
//! and print the response as JSON:
//!
//! ```bash
//! compono dispatch --app app.yaml GET /doc/42 -H "authorization: Bearer s3cret"
//! compono dispatch --app app.yaml POST /doc --body '{"title": "draft"}'
//! ```
//!
//! `--app` falls back to `COMPONO_APP_FILE`. Logging follows the
//! `COMPONO_LOG_*` variables described in [`logging`](crate::logging).

mod commands;


pub use commands::{build_app, build_chain, execute, run_cli, Cli, Commands};
