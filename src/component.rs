//! # Components
//!
//! A [`Component`] is a registered value (usually a handler) plus the metadata
//! registries and UIs need: an identifier, a human name and title, classifiers,
//! free-form JSON metadata, and guard conditions.
//!
//! Conditions are predicates over the component and the call arguments.
//! [`Component::evaluate`] runs all of them, without stopping at the first
//! failure, and aggregates every failure into [`ConstraintErrors`].

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

use crate::kind::Typed;

/// A single failed condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConstraintError {
    pub message: String,
}

impl ConstraintError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Every condition that failed for one evaluation, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("constraints failed: {}", joined(.0))]
pub struct ConstraintErrors(pub Vec<ConstraintError>);

fn joined(errors: &[ConstraintError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConstraintErrors {
    #[must_use]
    pub fn errors(&self) -> &[ConstraintError] {
        &self.0
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

/// Guard predicate: `Ok(())` passes, `Err` explains why not.
pub type Condition<V> =
    Arc<dyn Fn(&Component<V>, &[&dyn Typed]) -> Result<(), ConstraintError> + Send + Sync>;

/// Optional fields for a new component.
pub struct ComponentOptions<V> {
    pub title: String,
    pub description: String,
    pub conditions: Vec<Condition<V>>,
    pub classifiers: BTreeSet<String>,
    pub metadata: Map<String, Value>,
}

impl<V> Default for ComponentOptions<V> {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            conditions: Vec::new(),
            classifiers: BTreeSet::new(),
            metadata: Map::new(),
        }
    }
}

impl<V> ComponentOptions<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Component<V>, &[&dyn Typed]) -> Result<(), ConstraintError> + Send + Sync + 'static,
    {
        self.conditions.push(Arc::new(condition));
        self
    }

    #[must_use]
    pub fn classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifiers.insert(classifier.into());
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

pub struct Component<V> {
    value: V,
    identifier: String,
    name: String,
    title: String,
    description: String,
    conditions: Vec<Condition<V>>,
    classifiers: BTreeSet<String>,
    metadata: Map<String, Value>,
}

impl<V: Clone> Clone for Component<V> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            identifier: self.identifier.clone(),
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            conditions: self.conditions.clone(),
            classifiers: self.classifiers.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl<V> fmt::Debug for Component<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("identifier", &self.identifier)
            .field("name", &self.name)
            .field("title", &self.title)
            .field("conditions", &self.conditions.len())
            .field("classifiers", &self.classifiers)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl<V> Component<V> {
    pub fn create(
        value: V,
        identifier: impl Into<String>,
        name: impl Into<String>,
        options: ComponentOptions<V>,
    ) -> Self {
        Self {
            value,
            identifier: identifier.into(),
            name: name.into(),
            title: options.title,
            description: options.description,
            conditions: options.conditions,
            classifiers: options.classifiers,
            metadata: options.metadata,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn classifiers(&self) -> &BTreeSet<String> {
        &self.classifiers
    }

    pub fn has_classifier(&self, classifier: &str) -> bool {
        self.classifiers.contains(classifier)
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Run every condition and collect all failures.
    pub fn evaluate(&self, args: &[&dyn Typed]) -> Option<ConstraintErrors> {
        let failures: Vec<ConstraintError> = self
            .conditions
            .iter()
            .filter_map(|condition| condition(self, args).err())
            .collect();
        if failures.is_empty() {
            None
        } else {
            Some(ConstraintErrors(failures))
        }
    }

    /// `true` when every condition passes.
    pub fn check(&self, args: &[&dyn Typed]) -> bool {
        self.conditions.is_empty() || self.evaluate(args).is_none()
    }

    /// Fail with the aggregated errors if any condition fails.
    pub fn ensure(&self, args: &[&dyn Typed]) -> Result<(), ConstraintErrors> {
        match self.evaluate(args) {
            None => Ok(()),
            Some(errors) => Err(errors),
        }
    }

    /// Invoke the shared callable this component wraps.
    pub fn call<A, R>(&self, args: A) -> R
    where
        V: Deref,
        V::Target: Fn(A) -> R,
    {
        (*self.value)(args)
    }

    /// Ensure the conditions against `guard` arguments, then invoke.
    pub fn call_checked<A, R>(&self, guard: &[&dyn Typed], args: A) -> Result<R, ConstraintErrors>
    where
        V: Deref,
        V::Target: Fn(A) -> R,
    {
        self.ensure(guard)?;
        Ok(self.call(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Kind, OBJECT};

    static USER: Kind = Kind::derive("user", &OBJECT);

    struct User {
        admin: bool,
        active: bool,
    }
    crate::typed!(User => USER);

    type Doubler = Arc<dyn Fn(u32) -> u32 + Send + Sync>;

    fn must_be_admin(_: &Component<Doubler>, args: &[&dyn Typed]) -> Result<(), ConstraintError> {
        match args.first().and_then(|a| a.downcast_ref::<User>()) {
            Some(user) if user.admin => Ok(()),
            _ => Err(ConstraintError::new("not an admin")),
        }
    }

    fn must_be_active(_: &Component<Doubler>, args: &[&dyn Typed]) -> Result<(), ConstraintError> {
        match args.first().and_then(|a| a.downcast_ref::<User>()) {
            Some(user) if user.active => Ok(()),
            _ => Err(ConstraintError::new("inactive")),
        }
    }

    fn guarded() -> Component<Doubler> {
        Component::create(
            Arc::new(|x: u32| x * 2) as Doubler,
            "double",
            "double",
            ComponentOptions::new()
                .title("Double")
                .classifier("math")
                .metadata("order", 10)
                .condition(must_be_admin)
                .condition(must_be_active),
        )
    }

    #[test]
    fn test_evaluate_collects_every_failure() {
        let component = guarded();
        let nobody = User { admin: false, active: false };
        let errors = component.evaluate(&[&nobody]).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors()[0].message, "not an admin");
        assert_eq!(errors.errors()[1].message, "inactive");
        assert_eq!(errors.to_string(), "constraints failed: not an admin; inactive");
    }

    #[test]
    fn test_check_and_ensure() {
        let component = guarded();
        let admin = User { admin: true, active: true };
        let lapsed = User { admin: true, active: false };
        assert!(component.check(&[&admin]));
        assert!(!component.check(&[&lapsed]));
        assert!(component.ensure(&[&admin]).is_ok());
        assert_eq!(component.ensure(&[&lapsed]).unwrap_err().len(), 1);
    }

    #[test]
    fn test_call_and_call_checked() {
        let component = guarded();
        assert_eq!(component.call(21), 42);
        let admin = User { admin: true, active: true };
        let nobody = User { admin: false, active: true };
        assert_eq!(component.call_checked(&[&admin], 4).unwrap(), 8);
        assert!(component.call_checked(&[&nobody], 4).is_err());
    }

    #[test]
    fn test_metadata_fields() {
        let component = guarded();
        assert_eq!(component.identifier(), "double");
        assert_eq!(component.title(), "Double");
        assert!(component.has_classifier("math"));
        assert_eq!(component.metadata()["order"], 10);
    }

    #[test]
    fn test_unconditioned_component_always_passes() {
        let component = Component::create(1u8, "one", "", ComponentOptions::new());
        assert!(component.check(&[]));
        assert!(component.evaluate(&[]).is_none());
    }
}
