use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use super::host::{Application, Attribute, Container, InstalledPlugins, MergeError, Mergeable};

/// Lifecycle points hooks can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    BeforeInstall,
    AfterInstall,
    BeforeUninstall,
    AfterUninstall,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Event::BeforeInstall => "before_install",
            Event::AfterInstall => "after_install",
            Event::BeforeUninstall => "before_uninstall",
            Event::AfterUninstall => "after_uninstall",
        })
    }
}

pub type Hook<A> = Arc<dyn Fn(&Plugin<A>, &mut A) -> anyhow::Result<()> + Send + Sync>;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin {plugin:?}: application has no component {path:?}")]
    MissingAttribute { plugin: String, path: String },
    #[error("plugin {plugin:?}: corrupt application state at {path:?}")]
    CorruptState { plugin: String, path: String },
    #[error("plugin {plugin:?}: bad merge into {path:?}")]
    Merge {
        plugin: String,
        path: String,
        #[source]
        source: MergeError,
    },
    #[error("plugin {plugin:?}: {event} hook failed")]
    Hook {
        plugin: String,
        event: Event,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("plugin {0:?}: uninstall is not implemented")]
    UninstallUnsupported(String),
}

/// A named bundle of component containers, installed at most once per
/// application after every plugin it depends on.
pub struct Plugin<A> {
    name: String,
    dependencies: Vec<Arc<Plugin<A>>>,
    components: Vec<(String, Box<dyn Mergeable>)>,
    hooks: HashMap<Event, Vec<Hook<A>>>,
    ancestors: Vec<Arc<Plugin<A>>>,
}

impl<A> fmt::Debug for Plugin<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("lineage", &self.lineage().map(Plugin::name).collect::<Vec<_>>())
            .field(
                "components",
                &self.components.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Flattened, de-duplicated dependency closure, dependencies first.
fn flatten<A>(dependencies: &[Arc<Plugin<A>>]) -> Vec<Arc<Plugin<A>>> {
    let mut ancestors: Vec<Arc<Plugin<A>>> = Vec::new();
    let candidates = dependencies.iter().flat_map(|dep| {
        dep.ancestors
            .iter()
            .chain(std::iter::once(dep))
    });
    for candidate in candidates {
        if !ancestors.iter().any(|a| a.name == candidate.name) {
            ancestors.push(Arc::clone(candidate));
        }
    }
    ancestors
}

impl<A> Plugin<A> {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PluginBuilder<A> {
        PluginBuilder {
            name: name.into(),
            dependencies: Vec::new(),
            components: Vec::new(),
            hooks: HashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Plugin<A>> {
        self.dependencies.iter().map(|d| d.as_ref())
    }

    /// Every transitive dependency, dependencies first, then this plugin.
    pub fn lineage(&self) -> impl Iterator<Item = &Plugin<A>> {
        self.ancestors
            .iter()
            .map(|a| a.as_ref())
            .chain(std::iter::once(self))
    }

    /// Attribute paths this plugin merges into.
    pub fn component_paths(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(p, _)| p.as_str())
    }
}

impl<A: Application> Plugin<A> {
    fn notify(&self, event: Event, app: &mut A) -> Result<(), PluginError> {
        let Some(hooks) = self.hooks.get(&event) else {
            return Ok(());
        };
        for hook in hooks {
            hook(self, app).map_err(|source| PluginError::Hook {
                plugin: self.name.clone(),
                event,
                source: source.into(),
            })?;
        }
        Ok(())
    }

    /// Merge every component into the attribute at its dotted path.
    pub fn apply(&self, app: &mut A) -> Result<(), PluginError> {
        for (path, component) in &self.components {
            self.merge_into(app, path, component.as_ref())?;
        }
        Ok(())
    }

    fn merge_into(
        &self,
        app: &mut A,
        path: &str,
        component: &dyn Mergeable,
    ) -> Result<(), PluginError> {
        let missing = || PluginError::MissingAttribute {
            plugin: self.name.clone(),
            path: path.to_string(),
        };
        let corrupt = || PluginError::CorruptState {
            plugin: self.name.clone(),
            path: path.to_string(),
        };

        let mut segments = path.split('.').peekable();
        let mut node: &mut dyn Container = app;
        while let Some(segment) = segments.next() {
            let attribute = node.resolve_mut(segment).ok_or_else(missing)?;
            match (attribute, segments.peek().is_some()) {
                (Attribute::Node(inner), true) => node = inner,
                (Attribute::Leaf(target), false) => {
                    debug!(plugin = %self.name, path = %path, "Merging component");
                    return target.merge_from(component).map_err(|source| PluginError::Merge {
                        plugin: self.name.clone(),
                        path: path.to_string(),
                        source,
                    });
                }
                _ => return Err(corrupt()),
            }
        }
        Err(missing())
    }

    /// Install this plugin and, first, its whole lineage.
    ///
    /// Already installed plugins are skipped by name. On failure the plugin
    /// is not recorded as installed, so a later call retries it.
    pub fn install(&self, app: &mut A) -> Result<(), PluginError> {
        let installed = app
            .installed_plugins()
            .get_or_insert_with(InstalledPlugins::default);
        if installed.contains(&self.name) {
            debug!(plugin = %self.name, "Plugin already installed, skipping");
            return Ok(());
        }

        for ancestor in &self.ancestors {
            ancestor.install(app)?;
        }

        let outcome = self
            .notify(Event::BeforeInstall, app)
            .and_then(|()| self.apply(app));
        if let Err(err) = outcome {
            error!(plugin = %self.name, error = %err, "Plugin installation failed");
            return Err(err);
        }

        app.installed_plugins()
            .get_or_insert_with(InstalledPlugins::default)
            .insert(&self.name);
        if let Err(err) = self.notify(Event::AfterInstall, app) {
            error!(plugin = %self.name, error = %err, "Plugin post-install hook failed");
            return Err(err);
        }
        info!(plugin = %self.name, "Plugin installed");
        Ok(())
    }

    pub fn uninstall(&self, _app: &mut A) -> Result<(), PluginError> {
        Err(PluginError::UninstallUnsupported(self.name.clone()))
    }
}

/// Assembles a [`Plugin`]; the lineage is computed by [`build`](Self::build).
pub struct PluginBuilder<A> {
    name: String,
    dependencies: Vec<Arc<Plugin<A>>>,
    components: Vec<(String, Box<dyn Mergeable>)>,
    hooks: HashMap<Event, Vec<Hook<A>>>,
}

impl<A> PluginBuilder<A> {
    /// Merge `container` into the application attribute at `path`
    /// (dotted, e.g. `"ui.slots"`).
    #[must_use]
    pub fn component<M: Mergeable>(mut self, path: impl Into<String>, container: M) -> Self {
        self.components.push((path.into(), Box::new(container)));
        self
    }

    #[must_use]
    pub fn depends_on(mut self, dependency: &Arc<Plugin<A>>) -> Self {
        self.dependencies.push(Arc::clone(dependency));
        self
    }

    #[must_use]
    pub fn subscribe<F>(mut self, event: Event, hook: F) -> Self
    where
        F: Fn(&Plugin<A>, &mut A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.entry(event).or_default().push(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn build(self) -> Plugin<A> {
        let ancestors = flatten(&self.dependencies);
        Plugin {
            name: self.name,
            dependencies: self.dependencies,
            components: self.components,
            hooks: self.hooks,
            ancestors,
        }
    }
}
