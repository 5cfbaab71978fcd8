use http::Method;
use std::sync::Arc;
use tracing::{debug, warn};

use super::request::Request;
use super::response::Response;
use crate::pipeline::{Handler, Pipeline};
use crate::plugin::{Application, Attribute, Container, InstalledPlugins, Plugin, PluginError};
use crate::routing::{Router, RoutingError};
use crate::ui::Ui;

/// Endpoint handler type used by [`App`].
pub type Endpoint = Handler<Request, Response>;

/// Wrap a closure as an [`Endpoint`].
pub fn endpoint<F>(handler: F) -> Endpoint
where
    F: Fn(Request) -> Response + Send + Sync + 'static,
{
    Arc::new(handler)
}

/// An application: routes, UI registries, the middleware pipeline, and the
/// set of installed plugins.
///
/// Plugins reach its attributes by path: `router`, `ui`, `ui.slots`,
/// `ui.layouts`.
#[derive(Debug, Default)]
pub struct App {
    pub router: Router<Endpoint>,
    pub ui: Ui,
    pipeline: Pipeline<Request, Response>,
    installed: Option<InstalledPlugins>,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pipeline(mut self, pipeline: Pipeline<Request, Response>) -> Self {
        self.pipeline = pipeline;
        self
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline<Request, Response> {
        &self.pipeline
    }

    pub fn install(&mut self, plugin: &Plugin<App>) -> Result<(), PluginError> {
        plugin.install(self)
    }

    /// Names of the installed plugins, in install order.
    pub fn installed(&self) -> impl Iterator<Item = &str> {
        self.installed.iter().flat_map(InstalledPlugins::iter)
    }

    /// Route the request and run its endpoint through the pipeline.
    ///
    /// Unmatched paths answer 404, matched paths with another method 405
    /// with an `allow` header.
    pub fn handle(&self, mut request: Request) -> Response {
        match self.router.match_route(&request.method, &request.path) {
            Ok(matched) => {
                debug!(
                    request_id = %request.request_id,
                    method = %request.method,
                    route = %matched.route.path(),
                    "Dispatching request"
                );
                request.params = matched.params;
                let handler = self.pipeline.wrap(matched.route.value());
                handler(request)
            }
            Err(RoutingError::NotFound { .. }) => Response::error(404, "Not Found"),
            Err(RoutingError::MethodNotAllowed { allowed, .. }) => {
                let mut response = Response::error(405, "Method Not Allowed");
                response.set_header("allow", allowed.join(", "));
                response
            }
            Err(err) => {
                warn!(error = %err, "Routing failed");
                Response::error(500, "Internal Server Error")
            }
        }
    }

    /// Convenience for `handle(Request::new(method, target))`.
    pub fn call(&self, method: Method, target: &str) -> Response {
        self.handle(Request::new(method, target))
    }
}

impl Container for App {
    fn resolve_mut(&mut self, segment: &str) -> Option<Attribute<'_>> {
        match segment {
            "router" => Some(Attribute::Leaf(&mut self.router)),
            "ui" => Some(Attribute::Node(&mut self.ui)),
            _ => None,
        }
    }
}

impl Application for App {
    fn installed_plugins(&mut self) -> &mut Option<InstalledPlugins> {
        &mut self.installed
    }
}
