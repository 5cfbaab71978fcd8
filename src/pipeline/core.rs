use dashmap::DashMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::topology::TopologyError;

/// Free-form middleware configuration shared by every middleware of a pipeline.
pub type Config = Map<String, Value>;

/// A shared terminal or composed handler.
pub type Handler<Rq, Rs> = Arc<dyn Fn(Rq) -> Rs + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("middleware order cannot be resolved: {0}")]
    Cycle(#[from] TopologyError),
    #[error("middleware {0:?} is already registered")]
    Duplicate(String),
    #[error("middleware {0:?} is referenced but never registered")]
    Unknown(String),
}

/// Wraps an inner handler into a new handler with the same contract.
pub trait Middleware<Rq, Rs>: Send + Sync {
    fn wrap(&self, inner: Handler<Rq, Rs>, config: Option<&Config>) -> Handler<Rq, Rs>;
}

impl<Rq, Rs, F> Middleware<Rq, Rs> for F
where
    F: Fn(Handler<Rq, Rs>, Option<&Config>) -> Handler<Rq, Rs> + Send + Sync,
{
    fn wrap(&self, inner: Handler<Rq, Rs>, config: Option<&Config>) -> Handler<Rq, Rs> {
        self(inner, config)
    }
}

fn handler_key<Rq, Rs>(handler: &Handler<Rq, Rs>) -> usize {
    Arc::as_ptr(handler).cast::<()>() as usize
}

/// Frozen middleware list with per-handler memoized composition.
pub struct Pipeline<Rq, Rs> {
    middlewares: Vec<(String, Arc<dyn Middleware<Rq, Rs>>)>,
    config: Option<Config>,
    // raw handler retained next to its composition
    cache: DashMap<usize, (Handler<Rq, Rs>, Handler<Rq, Rs>)>,
}

impl<Rq, Rs> fmt::Debug for Pipeline<Rq, Rs> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("middlewares", &self.names())
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<Rq, Rs> Default for Pipeline<Rq, Rs> {
    fn default() -> Self {
        Self::from_shared(Vec::new(), None)
    }
}

impl<Rq, Rs> Pipeline<Rq, Rs> {
    pub fn new<N, M>(middlewares: impl IntoIterator<Item = (N, M)>, config: Option<Config>) -> Self
    where
        N: Into<String>,
        M: Middleware<Rq, Rs> + 'static,
    {
        let middlewares = middlewares
            .into_iter()
            .map(|(name, mw)| (name.into(), Arc::new(mw) as Arc<dyn Middleware<Rq, Rs>>))
            .collect();
        Self::from_shared(middlewares, config)
    }

    /// Build from already shared middlewares.
    #[must_use]
    pub fn from_shared(
        middlewares: Vec<(String, Arc<dyn Middleware<Rq, Rs>>)>,
        config: Option<Config>,
    ) -> Self {
        Self {
            middlewares,
            config,
            cache: DashMap::new(),
        }
    }

    /// Declared middleware names, outermost first.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.middlewares.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    #[must_use]
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    fn compose(&self, handler: &Handler<Rq, Rs>) -> Handler<Rq, Rs> {
        self.middlewares
            .iter()
            .rev()
            .fold(Arc::clone(handler), |inner, (_, mw)| {
                mw.wrap(inner, self.config.as_ref())
            })
    }

    /// The handler wrapped in every middleware, composed at most once.
    #[must_use]
    pub fn wrap(&self, handler: &Handler<Rq, Rs>) -> Handler<Rq, Rs> {
        if self.middlewares.is_empty() {
            return Arc::clone(handler);
        }
        let key = handler_key(handler);
        let entry = self.cache.entry(key).or_insert_with(|| {
            debug!(middlewares = ?self.names(), "Composing pipeline for handler");
            (Arc::clone(handler), self.compose(handler))
        });
        Arc::clone(&entry.value().1)
    }

    /// Number of handlers composed so far.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
