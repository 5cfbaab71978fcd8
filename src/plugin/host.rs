use indexmap::IndexSet;
use std::any::{type_name, Any};
use std::error::Error;
use thiserror::Error;

use crate::registry::Merge;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("cannot merge {found} into {expected}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("merge failed: {0}")]
    Failed(#[source] Box<dyn Error + Send + Sync>),
}

/// Object-safe view of a [`Merge`] container, so plugins can carry
/// heterogeneous containers and merge them into host attributes in place.
pub trait Mergeable: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;

    /// Replace `self` with `self | other`. Fails without touching `self`
    /// when `other` is a different container type or the merge itself fails.
    fn merge_from(&mut self, other: &dyn Mergeable) -> Result<(), MergeError>;
}

impl<T> Mergeable for T
where
    T: Merge + Any + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn merge_from(&mut self, other: &dyn Mergeable) -> Result<(), MergeError> {
        let other = other
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| MergeError::Mismatch {
                expected: type_name::<T>(),
                found: other.type_name(),
            })?;
        *self = self
            .merge(other)
            .map_err(|e| MergeError::Failed(Box::new(e)))?;
        Ok(())
    }
}

/// One step of an attribute path walk.
pub enum Attribute<'a> {
    /// An intermediate object; the walk continues into it.
    Node(&'a mut dyn Container),
    /// A mergeable container; the walk ends here.
    Leaf(&'a mut dyn Mergeable),
}

/// Anything exposing named attributes to plugin installation.
pub trait Container {
    fn resolve_mut(&mut self, segment: &str) -> Option<Attribute<'_>>;
}

/// A host that plugins install into.
pub trait Application: Container {
    /// Names of installed plugins, created on first install.
    fn installed_plugins(&mut self) -> &mut Option<InstalledPlugins>;
}

/// Names of the plugins installed on one application, in install order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledPlugins(IndexSet<String>);

impl InstalledPlugins {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub(crate) fn insert(&mut self, name: &str) -> bool {
        self.0.insert(name.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
