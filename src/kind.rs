//! # Kinds
//!
//! Dispatch in compono never relies on native runtime type identity. Every value
//! that takes part in signature matching carries an explicit [`Kind`] tag, and
//! kinds form a single-inheritance tree rooted at [`OBJECT`].
//!
//! ```rust
//! use compono::kind::{Kind, OBJECT};
//!
//! static REQUEST: Kind = Kind::derive("request", &OBJECT);
//! static API_REQUEST: Kind = Kind::derive("api_request", &REQUEST);
//!
//! assert!(API_REQUEST.is_subkind_of(&REQUEST));
//! assert!(API_REQUEST.is_subkind_of(&OBJECT));
//! assert!(!REQUEST.is_subkind_of(&API_REQUEST));
//! assert_eq!(API_REQUEST.depth(), 2);
//! ```

use std::any::Any;
use std::fmt;

/// A named discriminant with an optional parent.
///
/// Kinds are meant to live in `static` items so they can be referenced as
/// `&'static Kind` from signatures and arguments alike.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Kind {
    name: &'static str,
    parent: Option<&'static Kind>,
}

/// The universal root kind. Every kind is a subkind of `OBJECT`.
pub static OBJECT: Kind = Kind::root("object");

impl Kind {
    /// A kind without a parent.
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A kind refining `parent`.
    #[must_use]
    pub const fn derive(name: &'static str, parent: &'static Kind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&'static Kind> {
        self.parent
    }

    /// Iterate over this kind and its ancestors, most specific first.
    pub fn lineage(&self) -> impl Iterator<Item = &Kind> {
        std::iter::successors(Some(self), |k| k.parent.map(|p| p as &Kind))
    }

    /// Reflexive subkind test: a kind is a subkind of itself.
    ///
    /// Roots other than [`OBJECT`] are still subkinds of `OBJECT`, so a
    /// signature declared over `OBJECT` accepts every argument.
    #[must_use]
    pub fn is_subkind_of(&self, other: &Kind) -> bool {
        if *other == OBJECT {
            return true;
        }
        self.lineage().any(|k| k == other)
    }

    /// Number of ancestors between this kind and [`OBJECT`].
    ///
    /// Parentless kinds other than `OBJECT` count as direct children of it.
    #[must_use]
    pub fn depth(&self) -> usize {
        if *self == OBJECT {
            return 0;
        }
        self.lineage().filter(|k| **k != OBJECT).count()
    }

    /// Dotted path from the root down to this kind, e.g. `object.request`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut names: Vec<&str> = self.lineage().map(|k| k.name).collect();
        names.reverse();
        names.join(".")
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A value that can be passed as a dispatch argument.
///
/// Implement it with the [`typed!`](crate::typed) macro.
pub trait Typed: Send + Sync {
    fn kind(&self) -> &'static Kind;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Typed + '_ {
    /// Downcast an argument to its concrete type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Kinds of every argument, in order.
#[must_use]
pub fn kinds_of(args: &[&dyn Typed]) -> Vec<&'static Kind> {
    args.iter().map(|a| a.kind()).collect()
}

/// Implement [`Typed`] for a type by naming its static kind.
///
/// ```rust
/// use compono::kind::{Kind, Typed, OBJECT};
///
/// static VIEW: Kind = Kind::derive("view", &OBJECT);
/// struct View;
/// compono::typed!(View => VIEW);
///
/// assert_eq!(View.kind().name(), "view");
/// ```
#[macro_export]
macro_rules! typed {
    ($ty:ty => $kind:expr) => {
        impl $crate::kind::Typed for $ty {
            fn kind(&self) -> &'static $crate::kind::Kind {
                &$kind
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}

/// A unit argument for positions that carry no value, such as an absent view.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nothing;

crate::typed!(Nothing => OBJECT);
