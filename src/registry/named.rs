use std::collections::HashSet;
use std::ops::BitOr;
use std::sync::Arc;
use tracing::debug;

use super::core::{Merge, Registry, RegistryError};
use crate::component::{Component, ComponentOptions};
use crate::kind::{kinds_of, Kind, Typed};
use crate::signature::{Lookup, LookupError, Signature};

/// A [`Registry`] whose signatures all end with a name.
pub struct NamedRegistry<V> {
    inner: Registry<V>,
}

impl<V> Clone for NamedRegistry<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V> Default for NamedRegistry<V> {
    fn default() -> Self {
        Self {
            inner: Registry::new(),
        }
    }
}

impl<V> std::fmt::Debug for NamedRegistry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl<V> NamedRegistry<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `name` for the given kinds.
    ///
    /// The component's identifier and name are both `name`; registering the
    /// same kinds and name again replaces the earlier component.
    pub fn register(
        &mut self,
        kinds: impl IntoIterator<Item = &'static Kind>,
        name: impl Into<String>,
        value: V,
        options: ComponentOptions<V>,
    ) -> Result<Signature, RegistryError> {
        let name = name.into();
        let signature = Signature::named(kinds, name.clone());
        debug!(signature = %signature, name = %name, "Registering named component");
        let component = Component::create(value, name.clone(), name, options);
        self.inner.insert(signature.clone(), Arc::new(component))?;
        Ok(signature)
    }

    pub fn remove(&mut self, signature: &Signature) -> Result<Arc<Component<V>>, RegistryError> {
        self.inner.remove(signature)
    }

    #[must_use]
    pub fn get(&self, signature: &Signature) -> Option<&Arc<Component<V>>> {
        self.inner.get(signature)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Signature, &Arc<Component<V>>)> {
        self.inner.iter()
    }

    /// The most specific component registered under `name` for these arguments.
    ///
    /// The conventional default name is the empty string.
    pub fn find_one(
        &self,
        args: &[&dyn Typed],
        name: &str,
    ) -> Result<&Arc<Component<V>>, LookupError> {
        self.inner
            .find_one_with(&kinds_of(args), Some(&Lookup::name(name)))
    }

    /// The best match for every name, most specific first.
    ///
    /// Once a name has been yielded, less specific components registered
    /// under the same name are skipped.
    pub fn find_all<'a>(
        &'a self,
        args: &[&dyn Typed],
    ) -> impl Iterator<Item = &'a Arc<Component<V>>> + 'a {
        let mut seen: HashSet<&'a str> = HashSet::new();
        self.inner
            .find_all_with(kinds_of(args), Some(Lookup::All))
            .filter(move |component| seen.insert(component.identifier()))
    }
}

impl<V> Merge for NamedRegistry<V> {
    type Error = RegistryError;

    fn merge(&self, other: &Self) -> Result<Self, Self::Error> {
        Ok(Self {
            inner: self.inner.merge(&other.inner)?,
        })
    }
}

impl<V> BitOr for &NamedRegistry<V> {
    type Output = Result<NamedRegistry<V>, RegistryError>;

    fn bitor(self, other: Self) -> Self::Output {
        self.merge(other)
    }
}
