//! # Topology Module
//!
//! Orders components relative to each other from `before`/`after` constraints.
//!
//! ## Overview
//!
//! A [`ComponentsTopology`] is a directed graph whose edges read "A must come
//! before B". Two sentinel nodes, [`Node::Start`] and [`Node::End`], bracket
//! every component: by default a component is placed after `Start` and before
//! `End`, so unconstrained components are always reachable.
//!
//! ## Sorting
//!
//! [`ComponentsTopology::sorted`] runs a depth-first post-order traversal from
//! `Start` and emits nodes in reverse post-order. Outgoing edges are kept in
//! insertion order, so when several orders satisfy the constraints the result
//! is reproducible and unconstrained components keep their insertion order.
//!
//! Cycles are detected lazily, at sort time. A back edge, or a component that
//! cannot be reached from `Start` (only possible when it sits on a cycle or
//! hangs off a node that was never added), fails the sort with
//! [`TopologyError::Cycle`]. No partial result is returned.
//!
//! ```rust
//! use compono::topology::{ComponentsTopology, Node};
//!
//! let mut topo = ComponentsTopology::new();
//! topo.add("a", Node::End, Node::Item("b")).unwrap();
//! topo.add("b", Node::Item("a"), Node::Start).unwrap();
//! topo.add("c", Node::End, Node::Item("a")).unwrap();
//! assert_eq!(topo.sorted().unwrap(), &["b", "a", "c"]);
//! ```

mod core;

pub use core::{ComponentsTopology, Node, TopologyError};
