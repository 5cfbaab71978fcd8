//! # Registry Module
//!
//! Signature-based multi-dispatch over [`Component`](crate::component::Component)s.
//!
//! ## Overview
//!
//! - [`Registry`] maps [`Signature`](crate::signature::Signature)s to components.
//!   Every signature is also recorded in a
//!   [`PriorityChain`](crate::chain::PriorityChain) so that
//!   [`find_all`](Registry::find_all) yields matches most-specific-first, while
//!   [`find_one`](Registry::find_one) resolves the single best match and
//!   reports ties as errors.
//! - [`NamedRegistry`] appends a name to every signature. One logical name (a
//!   UI slot, an action) can then have several kind-discriminated
//!   implementations; `find_all` keeps only the best match per name, so a
//!   specific override fully replaces a generic component of the same name.
//! - [`Collection`] is a plain ordered list of components.
//!
//! All three implement [`Merge`], the `|` operation plugins use to fold their
//! components into a host application.
//!
//! ## Example
//!
//! ```rust
//! use compono::component::ComponentOptions;
//! use compono::kind::{Kind, OBJECT};
//! use compono::registry::Registry;
//! use std::sync::Arc;
//!
//! static NUMBER: Kind = Kind::derive("number", &OBJECT);
//! struct Num(i64);
//! compono::typed!(Num => NUMBER);
//!
//! type Describe = Arc<dyn Fn(&str) -> String + Send + Sync>;
//!
//! let mut registry: Registry<Describe> = Registry::new();
//! registry
//!     .register([&OBJECT], Arc::new(|s: &str| format!("thing {s}")), ComponentOptions::new())
//!     .unwrap();
//! registry
//!     .register([&NUMBER], Arc::new(|s: &str| format!("number {s}")), ComponentOptions::new())
//!     .unwrap();
//!
//! let found = registry.find_one(&[&Num(1)]).unwrap();
//! assert_eq!(found.call("1"), "number 1");
//! assert_eq!(registry.find_all(&[&Num(1)]).count(), 2);
//! ```

mod core;
mod named;

pub use core::{Collection, Merge, Registry, RegistryError};
pub use named::NamedRegistry;
