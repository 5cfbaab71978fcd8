//! # Priority Chain
//!
//! An ordered sequence of `(key, item)` pairs kept in ascending key order.
//!
//! Insertion uses a binary search and lands after any existing entries with an
//! equal key, so entries sharing a key keep their insertion order. Merging two
//! chains re-inserts every entry of the right-hand chain into a copy of the
//! left-hand one; the result is globally ordered, never a plain concatenation.
//!
//! ```rust
//! use compono::chain::PriorityChain;
//!
//! let mut a = PriorityChain::new();
//! a.add(1, "x").unwrap();
//! a.add(3, "z").unwrap();
//! let mut b = PriorityChain::new();
//! b.add(2, "y").unwrap();
//!
//! let merged = (&a | &b).unwrap();
//! let items: Vec<_> = merged.items().copied().collect();
//! assert_eq!(items, ["x", "y", "z"]);
//! ```

mod core;

pub use core::{ChainError, PriorityChain};
