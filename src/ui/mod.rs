//! # UI Module
//!
//! Slot and layout composition on top of [`NamedRegistry`](crate::registry::NamedRegistry).
//!
//! A slot is a named insertion point in a page. Rendering slot `name` for a
//! request, view and context:
//!
//! 1. finds the slot manager registered under `name` for those three kinds;
//!    with none, nothing is rendered
//! 2. collects every item registered under the manager's kind for the same
//!    three values, most specific first and one per item name
//! 3. renders the items whose conditions pass
//! 4. lets the manager combine them
//!
//! Because items are looked up per name, a plugin can replace a generic item
//! with a more specific one simply by registering under the same name.

mod core;

pub use core::{ItemRender, Layout, ManagerRender, Slot, SlotContext, Ui};
