//! # Plugin Module
//!
//! Plugins bundle component containers (registries, routers, UI registries)
//! and merge them into a host application.
//!
//! ## Lineage
//!
//! A plugin's lineage is the flattened, de-duplicated closure of its
//! dependencies followed by the plugin itself. It is computed once, when the
//! plugin is built, from dependencies that are already built.
//!
//! ## Installation
//!
//! [`Plugin::install`] is idempotent per plugin name and application:
//!
//! 1. The application's install set is created on first use.
//! 2. An already installed name is skipped.
//! 3. Every dependency is installed first through the same check, so a
//!    shared ancestor reached through two paths is installed once.
//! 4. `BeforeInstall` hooks fire, then each component is merged with `|` into
//!    the application attribute at its dotted path.
//! 5. Any failure is logged and returned; the plugin is not recorded.
//! 6. On success the name is recorded and `AfterInstall` hooks fire.
//!
//! The host exposes its attributes through [`Container`] and its install set
//! through [`Application`]. Uninstalling is not supported.

mod core;
mod host;
#[cfg(test)]
mod tests;

pub use core::{Event, Hook, Plugin, PluginBuilder, PluginError};
pub use host::{Application, Attribute, Container, InstalledPlugins, MergeError, Mergeable};
