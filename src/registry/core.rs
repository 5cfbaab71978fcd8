use std::collections::HashMap;
use std::convert::Infallible;
use std::ops::BitOr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::chain::{ChainError, PriorityChain};
use crate::component::{Component, ComponentOptions};
use crate::kind::{kinds_of, Kind, Typed};
use crate::signature::{resolve, Lookup, LookupError, Signature};

/// Combine two containers of the same type into a new one.
///
/// On collisions the right-hand operand wins.
pub trait Merge: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    fn merge(&self, other: &Self) -> Result<Self, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no component registered under {0}")]
    Missing(String),
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Signature → component mapping with best-match and all-matches lookups.
pub struct Registry<V> {
    entries: HashMap<Signature, Arc<Component<V>>>,
    ordered: PriorityChain<Signature, String>,
}

impl<V> Clone for Registry<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            ordered: self.ordered.clone(),
        }
    }
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            ordered: PriorityChain::new(),
        }
    }
}

impl<V> std::fmt::Debug for Registry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ordered.keys()).finish()
    }
}

impl<V> Registry<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `component` under `signature`, replacing any previous holder.
    pub fn insert(
        &mut self,
        signature: Signature,
        component: Arc<Component<V>>,
    ) -> Result<(), RegistryError> {
        let identifier = component.identifier().to_string();
        if let Some(previous) = self.entries.get(&signature) {
            let previous = previous.identifier().to_string();
            if previous != identifier {
                self.ordered.remove(&signature, &previous)?;
                self.ordered.add(signature.clone(), identifier)?;
            }
            debug!(signature = %signature, "Replaced registered component");
        } else {
            self.ordered.add(signature.clone(), identifier)?;
        }
        self.entries.insert(signature, component);
        Ok(())
    }

    /// Create a component for `value` and register it for the given kinds.
    ///
    /// Returns the signature, which is the handle for [`remove`](Self::remove).
    pub fn register(
        &mut self,
        kinds: impl IntoIterator<Item = &'static Kind>,
        value: V,
        options: ComponentOptions<V>,
    ) -> Result<Signature, RegistryError> {
        let signature = Signature::new(kinds);
        let component = Component::create(value, signature.to_string(), "", options);
        debug!(signature = %signature, "Registering component");
        self.insert(signature.clone(), Arc::new(component))?;
        Ok(signature)
    }

    pub fn remove(&mut self, signature: &Signature) -> Result<Arc<Component<V>>, RegistryError> {
        let identifier = self
            .entries
            .get(signature)
            .ok_or_else(|| RegistryError::Missing(signature.to_string()))?
            .identifier()
            .to_string();
        self.ordered.remove(signature, &identifier)?;
        self.entries
            .remove(signature)
            .ok_or_else(|| RegistryError::Missing(signature.to_string()))
    }

    #[must_use]
    pub fn get(&self, signature: &Signature) -> Option<&Arc<Component<V>>> {
        self.entries.get(signature)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in priority order, most specific first.
    pub fn iter(&self) -> impl Iterator<Item = (&Signature, &Arc<Component<V>>)> {
        self.ordered
            .keys()
            .filter_map(move |sig| self.entries.get(sig).map(|c| (sig, c)))
    }

    pub(crate) fn find_one_with(
        &self,
        kinds: &[&'static Kind],
        lookup: Option<&Lookup>,
    ) -> Result<&Arc<Component<V>>, LookupError> {
        let signature = resolve(self.ordered.keys(), kinds, lookup)?;
        self.entries.get(signature).ok_or_else(|| LookupError::NotFound {
            args: signature.to_string(),
        })
    }

    pub(crate) fn find_all_with<'a>(
        &'a self,
        kinds: Vec<&'static Kind>,
        lookup: Option<Lookup>,
    ) -> impl Iterator<Item = &'a Arc<Component<V>>> + 'a {
        self.ordered
            .keys()
            .filter(move |sig| sig.matches(&kinds, lookup.as_ref()))
            .filter_map(move |sig| self.entries.get(sig))
    }

    /// The most specific component accepting these arguments.
    pub fn find_one(&self, args: &[&dyn Typed]) -> Result<&Arc<Component<V>>, LookupError> {
        self.find_one_with(&kinds_of(args), None)
    }

    /// Every component accepting these arguments, most specific first.
    pub fn find_all<'a>(
        &'a self,
        args: &[&dyn Typed],
    ) -> impl Iterator<Item = &'a Arc<Component<V>>> + 'a {
        self.find_all_with(kinds_of(args), None)
    }
}

impl<V> Merge for Registry<V> {
    type Error = RegistryError;

    fn merge(&self, other: &Self) -> Result<Self, Self::Error> {
        let mut merged = self.clone();
        for (signature, component) in other.iter() {
            merged.insert(signature.clone(), Arc::clone(component))?;
        }
        Ok(merged)
    }
}

impl<V> BitOr for &Registry<V> {
    type Output = Result<Registry<V>, RegistryError>;

    fn bitor(self, other: Self) -> Self::Output {
        self.merge(other)
    }
}

/// An ordered list of components.
pub struct Collection<V> {
    items: Vec<Arc<Component<V>>>,
}

impl<V> Clone for Collection<V> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<V> Default for Collection<V> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<V> Collection<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, component: Arc<Component<V>>) {
        self.items.push(component);
    }

    pub fn create(
        &mut self,
        value: V,
        identifier: impl Into<String>,
        name: impl Into<String>,
        options: ComponentOptions<V>,
    ) -> Arc<Component<V>> {
        let component = Arc::new(Component::create(value, identifier, name, options));
        self.items.push(Arc::clone(&component));
        component
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Component<V>>> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<V> Merge for Collection<V> {
    type Error = Infallible;

    fn merge(&self, other: &Self) -> Result<Self, Self::Error> {
        let mut items = self.items.clone();
        items.extend(other.items.iter().cloned());
        Ok(Self { items })
    }
}

impl<V> BitOr for &Collection<V> {
    type Output = Collection<V>;

    fn bitor(self, other: Self) -> Self::Output {
        let mut items = self.items.clone();
        items.extend(other.items.iter().cloned());
        Collection { items }
    }
}
