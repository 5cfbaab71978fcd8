//! # compono
//!
//! **compono** is a component-composition toolkit for building web
//! applications out of plugins. Components (handlers, UI fragments, layouts,
//! middlewares) are registered against typed signatures, looked up by the
//! most specific match, ordered by before/after constraints, and contributed
//! to an application by plugins with dependencies.
//!
//! ## Architecture
//!
//! - **[`kind`]** - explicit kind tags with single inheritance (`Kind`, `Typed`)
//! - **[`topology`]** - before/after constraint graph with cycle detection
//! - **[`chain`]** - ordered `(key, item)` collection keyed by a total order
//! - **[`signature`]** - kind tuples with an optional name, specificity ordering
//! - **[`component`]** - a value plus metadata and guard conditions
//! - **[`registry`]** - signature registries, named registries, collections, `Merge`
//! - **[`pipeline`]** - middleware composition with per-handler memoization
//! - **[`plugin`]** - plugins with lineage, lifecycle events and attribute merging
//! - **[`routing`]** - radix-tree path router with named routes
//! - **[`ui`]** - slots, slot items and layouts over named registries
//! - **[`middleware`]** - tracing, metrics, identity and auth middlewares
//! - **[`app`]** - the application object: router, ui, pipeline, installed plugins
//! - **[`config`]**, **[`logging`]**, **[`ids`]**, **[`cli`]** - ambient support
//!
//! ### Request flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant App as app::App
//!     participant Router as routing::Router
//!     participant Pipeline as pipeline::Pipeline
//!     participant Endpoint
//!
//!     Client->>App: handle(Request)
//!     App->>Router: match_route(method, path)
//!     alt no path
//!         Router-->>App: NotFound
//!         App-->>Client: 404
//!     else wrong method
//!         Router-->>App: MethodNotAllowed { allowed }
//!         App-->>Client: 405 + allow
//!     else match
//!         Router-->>App: MatchedRoute { params }
//!         App->>Pipeline: wrap(endpoint)
//!         Note over Pipeline: composed once per endpoint, then cached
//!         Pipeline-->>App: wrapped handler
//!         App->>Endpoint: wrapped(request)
//!         Endpoint-->>Client: Response
//!     end
//! ```
//!
//! ### Plugin installation
//!
//! ```mermaid
//! stateDiagram-v2
//!     [*] --> CheckInstalled
//!     CheckInstalled --> [*]: already installed
//!     CheckInstalled --> Ancestors: not installed
//!     Ancestors --> BeforeInstall: lineage installed first
//!     BeforeInstall --> Apply: hooks ok
//!     Apply --> Record: every component merged
//!     Record --> AfterInstall
//!     AfterInstall --> [*]
//!     BeforeInstall --> Failed: hook error
//!     Apply --> Failed: missing attribute / bad merge
//!     Failed --> [*]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use compono::app::{endpoint, App, Response};
//! use compono::plugin::Plugin;
//! use compono::routing::Router;
//! use http::Method;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let mut docs = Router::new();
//! docs.get("/doc/{id}", endpoint(|req| Response::json(200, json!({ "id": req.get_param("id") }))))
//!     .unwrap();
//!
//! let base = Arc::new(Plugin::<App>::builder("base").component("router", docs).build());
//! let site = Plugin::<App>::builder("site").depends_on(&base).build();
//!
//! let mut app = App::new();
//! app.install(&site).unwrap();
//!
//! assert_eq!(app.installed().collect::<Vec<_>>(), ["base", "site"]);
//! assert_eq!(app.call(Method::GET, "/doc/7").body, json!({ "id": "7" }));
//! ```
//!
//! ## Configuration
//!
//! Process settings come from `COMPONO_*` environment variables (see
//! [`config::AppConfig`] and [`logging::LogConfig`]). The `compono` binary
//! reads an application description from YAML; see [`cli`].

pub mod app;
pub mod chain;
pub mod cli;
pub mod component;
pub mod config;
pub mod ids;
pub mod kind;
pub mod logging;
pub mod middleware;
pub mod pipeline;
pub mod plugin;
pub mod registry;
pub mod routing;
pub mod signature;
pub mod topology;
pub mod ui;

pub use app::{endpoint, App, Request, Response};
pub use component::{Component, ComponentOptions, ConstraintError, ConstraintErrors};
pub use kind::{Kind, Typed, OBJECT};
pub use plugin::{Event, Plugin, PluginError};
pub use registry::{Collection, Merge, NamedRegistry, Registry};
pub use signature::{Lookup, LookupError, Signature};
