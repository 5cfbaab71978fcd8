use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::debug;

use super::core::{Config, Middleware, Pipeline, PipelineError};
use crate::topology::{ComponentsTopology, Node};

/// Named middlewares placed relative to each other.
///
/// ```rust
/// use compono::pipeline::{Config, Handler, MiddlewareChain};
/// use std::sync::Arc;
///
/// fn tag(label: &'static str) -> impl Fn(Handler<String, String>, Option<&Config>) -> Handler<String, String> {
///     move |inner, _| Arc::new(move |s: String| inner(format!("{s}{label}"))) as Handler<String, String>
/// }
///
/// let mut chain = MiddlewareChain::new();
/// chain.add("session", tag("s"), None, None).unwrap();
/// chain.add("auth", tag("a"), None, Some("session")).unwrap();
/// chain.add("csrf", tag("c"), Some("auth"), Some("session")).unwrap();
///
/// let pipeline = chain.build(None).unwrap();
/// assert_eq!(pipeline.names(), ["session", "csrf", "auth"]);
/// ```
pub struct MiddlewareChain<Rq, Rs> {
    middlewares: IndexMap<String, Arc<dyn Middleware<Rq, Rs>>>,
    references: IndexSet<String>,
    topology: ComponentsTopology<String>,
}

impl<Rq, Rs> Default for MiddlewareChain<Rq, Rs> {
    fn default() -> Self {
        Self {
            middlewares: IndexMap::new(),
            references: IndexSet::new(),
            topology: ComponentsTopology::new(),
        }
    }
}

impl<Rq, Rs> MiddlewareChain<Rq, Rs> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `middleware` under `name`, optionally before and/or after
    /// other named middlewares.
    pub fn add<M>(
        &mut self,
        name: &str,
        middleware: M,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<(), PipelineError>
    where
        M: Middleware<Rq, Rs> + 'static,
    {
        self.add_shared(name, Arc::new(middleware), before, after)
    }

    pub fn add_shared(
        &mut self,
        name: &str,
        middleware: Arc<dyn Middleware<Rq, Rs>>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<(), PipelineError> {
        if self.middlewares.contains_key(name) {
            return Err(PipelineError::Duplicate(name.to_string()));
        }
        self.topology.add(
            name.to_string(),
            before.map_or(Node::End, |b| Node::Item(b.to_string())),
            after.map_or(Node::Start, |a| Node::Item(a.to_string())),
        )?;
        self.references
            .extend(before.into_iter().chain(after).map(str::to_string));
        debug!(middleware = %name, "Middleware added to chain");
        self.middlewares.insert(name.to_string(), middleware);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Middleware names in resolved order.
    ///
    /// A `before`/`after` name that was never registered is reported as
    /// [`PipelineError::Unknown`] ahead of any ordering problem.
    pub fn order(&self) -> Result<Vec<String>, PipelineError> {
        if let Some(unknown) = self
            .references
            .iter()
            .find(|name| !self.middlewares.contains_key(*name))
        {
            return Err(PipelineError::Unknown(unknown.clone()));
        }
        Ok(self.topology.sorted()?.to_vec())
    }

    /// Freeze the resolved order into a [`Pipeline`].
    pub fn build(&self, config: Option<Config>) -> Result<Pipeline<Rq, Rs>, PipelineError> {
        let middlewares = self
            .order()?
            .into_iter()
            .filter_map(|name| {
                let mw = self.middlewares.get(&name).map(Arc::clone)?;
                Some((name, mw))
            })
            .collect();
        Ok(Pipeline::from_shared(middlewares, config))
    }
}
