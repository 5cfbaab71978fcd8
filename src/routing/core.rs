use http::Method;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::radix::{split_path, RadixNode};
use crate::component::{Component, ComponentOptions};
use crate::registry::Merge;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured path parameters, in path order.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// The HTTP methods routes may be registered for.
pub const METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
    Method::CONNECT,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("unknown HTTP method(s): {0}")]
    UnknownMethod(String),
    #[error("route name {name:?} already points to {existing:?}")]
    DuplicateName { name: String, existing: String },
    #[error("unknown route {0:?}")]
    UnknownName(String),
    #[error("route {name:?} needs parameter {param:?}")]
    MissingParam { name: String, param: String },
    #[error("no route matches {path}")]
    NotFound { path: String },
    #[error("{method} not allowed on {path}; allowed: {allowed:?}")]
    MethodNotAllowed {
        method: String,
        path: String,
        allowed: Vec<String>,
    },
}

/// An endpoint: a component registered for one path and method.
pub struct Route<V> {
    path: String,
    method: Method,
    component: Arc<Component<V>>,
}

impl<V> fmt::Debug for Route<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("name", &self.component.name())
            .finish()
    }
}

impl<V> Route<V> {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn component(&self) -> &Arc<Component<V>> {
        &self.component
    }

    /// The registered value, usually the endpoint handler.
    #[must_use]
    pub fn value(&self) -> &V {
        self.component.value()
    }
}

/// A route resolved for one request.
pub struct MatchedRoute<V> {
    pub route: Arc<Route<V>>,
    pub method: Method,
    pub path: String,
    pub params: ParamVec,
}

impl<V> fmt::Debug for MatchedRoute<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchedRoute")
            .field("route", &self.route)
            .field("path", &self.path)
            .field("params", &self.params)
            .finish()
    }
}

impl<V> MatchedRoute<V> {
    /// Get a path parameter by name; the last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_methods(methods: &[&str]) -> Result<Vec<Method>, RoutingError> {
    if methods.is_empty() {
        return Ok(vec![Method::GET]);
    }
    let unknown: Vec<&str> = methods
        .iter()
        .copied()
        .filter(|m| !METHODS.iter().any(|known| known.as_str() == *m))
        .collect();
    if !unknown.is_empty() {
        return Err(RoutingError::UnknownMethod(unknown.join(", ")));
    }
    methods
        .iter()
        .map(|m| Method::from_bytes(m.as_bytes()).map_err(|_| RoutingError::UnknownMethod((*m).to_string())))
        .collect()
}

/// Path router: `(path, method)` endpoints, a radix tree for matching, and
/// route names for reverse routing.
pub struct Router<V> {
    routes: IndexMap<(String, Method), Arc<Route<V>>>,
    names: HashMap<String, String>,
    tree: RadixNode<Arc<Route<V>>>,
}

impl<V> Clone for Router<V> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            names: self.names.clone(),
            tree: self.tree.clone(),
        }
    }
}

impl<V> Default for Router<V> {
    fn default() -> Self {
        Self {
            routes: IndexMap::new(),
            names: HashMap::new(),
            tree: RadixNode::root(),
        }
    }
}

impl<V> fmt::Debug for Router<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes.keys()).finish()
    }
}

impl<V> Router<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a route, replacing an existing one for the same path and method.
    pub fn add(&mut self, route: Route<V>) -> Result<(), RoutingError> {
        let name = route.component.name();
        if !name.is_empty() {
            match self.names.get(name) {
                Some(existing) if *existing != route.path => {
                    return Err(RoutingError::DuplicateName {
                        name: name.to_string(),
                        existing: existing.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    self.names.insert(name.to_string(), route.path.clone());
                }
            }
        }
        debug!(method = %route.method, path = %route.path, "Adding route");
        let route = Arc::new(route);
        let segments: Vec<&str> = split_path(&route.path).collect();
        self.tree
            .insert(&segments, route.method.clone(), Arc::clone(&route));
        self.routes
            .insert((route.path.clone(), route.method.clone()), route);
        Ok(())
    }

    /// Register `value` at `path` for each method (GET when none is given).
    ///
    /// A non-empty `name` makes the route reversible with [`url_for`](Self::url_for).
    pub fn register(
        &mut self,
        path: &str,
        methods: &[&str],
        name: &str,
        value: V,
        options: ComponentOptions<V>,
    ) -> Result<(), RoutingError> {
        let methods = parse_methods(methods)?;
        let component = Arc::new(Component::create(value, path, name, options));
        for method in methods {
            self.add(Route {
                path: path.to_string(),
                method,
                component: Arc::clone(&component),
            })?;
        }
        Ok(())
    }

    pub fn get(&mut self, path: &str, value: V) -> Result<(), RoutingError> {
        self.register(path, &["GET"], "", value, ComponentOptions::new())
    }

    pub fn post(&mut self, path: &str, value: V) -> Result<(), RoutingError> {
        self.register(path, &["POST"], "", value, ComponentOptions::new())
    }

    pub fn put(&mut self, path: &str, value: V) -> Result<(), RoutingError> {
        self.register(path, &["PUT"], "", value, ComponentOptions::new())
    }

    pub fn delete(&mut self, path: &str, value: V) -> Result<(), RoutingError> {
        self.register(path, &["DELETE"], "", value, ComponentOptions::new())
    }

    pub fn patch(&mut self, path: &str, value: V) -> Result<(), RoutingError> {
        self.register(path, &["PATCH"], "", value, ComponentOptions::new())
    }

    pub fn head(&mut self, path: &str, value: V) -> Result<(), RoutingError> {
        self.register(path, &["HEAD"], "", value, ComponentOptions::new())
    }

    pub fn options(&mut self, path: &str, value: V) -> Result<(), RoutingError> {
        self.register(path, &["OPTIONS"], "", value, ComponentOptions::new())
    }

    pub fn trace(&mut self, path: &str, value: V) -> Result<(), RoutingError> {
        self.register(path, &["TRACE"], "", value, ComponentOptions::new())
    }

    pub fn connect(&mut self, path: &str, value: V) -> Result<(), RoutingError> {
        self.register(path, &["CONNECT"], "", value, ComponentOptions::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    #[must_use]
    pub fn get_route(&self, path: &str, method: &Method) -> Option<&Arc<Route<V>>> {
        self.routes.get(&(path.to_string(), method.clone()))
    }

    /// Routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route<V>>> {
        self.routes.values()
    }

    /// Resolve a request to its endpoint.
    pub fn match_route(&self, method: &Method, path: &str) -> Result<MatchedRoute<V>, RoutingError> {
        let segments: Vec<&str> = split_path(path).collect();
        let mut params = ParamVec::new();
        let mut allowed = Vec::new();
        if let Some(route) = self.tree.search(&segments, method, &mut params, &mut allowed) {
            return Ok(MatchedRoute {
                route: Arc::clone(route),
                method: method.clone(),
                path: path.to_string(),
                params,
            });
        }
        if allowed.is_empty() {
            debug!(method = %method, path = %path, "No route found");
            return Err(RoutingError::NotFound {
                path: path.to_string(),
            });
        }
        Err(RoutingError::MethodNotAllowed {
            method: method.to_string(),
            path: path.to_string(),
            allowed: allowed.iter().map(ToString::to_string).collect(),
        })
    }

    /// Build the path of the route named `name`, filling `{param}` segments.
    ///
    /// Parameters the path does not use are ignored.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RoutingError> {
        let path = self
            .names
            .get(name)
            .ok_or_else(|| RoutingError::UnknownName(name.to_string()))?;
        let mut url = String::with_capacity(path.len());
        for (i, part) in path.split('/').enumerate() {
            if i > 0 {
                url.push('/');
            }
            match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(param) => {
                    let value = params
                        .iter()
                        .find(|(k, _)| *k == param)
                        .map(|(_, v)| *v)
                        .ok_or_else(|| RoutingError::MissingParam {
                            name: name.to_string(),
                            param: param.to_string(),
                        })?;
                    url.push_str(value);
                }
                None => url.push_str(part),
            }
        }
        Ok(url)
    }
}

impl<V> Merge for Router<V> {
    type Error = RoutingError;

    fn merge(&self, other: &Self) -> Result<Self, Self::Error> {
        let mut merged = self.clone();
        for route in other.routes.values() {
            merged.add(Route {
                path: route.path.clone(),
                method: route.method.clone(),
                component: Arc::clone(&route.component),
            })?;
        }
        Ok(merged)
    }
}

impl<V> BitOr for &Router<V> {
    type Output = Result<Router<V>, RoutingError>;

    fn bitor(self, other: Self) -> Self::Output {
        self.merge(other)
    }
}
