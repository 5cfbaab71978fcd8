use std::any::Any;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use crate::component::ComponentOptions;
use crate::kind::{Kind, Typed};
use crate::plugin::{Attribute, Container};
use crate::registry::{Merge, NamedRegistry, RegistryError};
use crate::signature::Signature;

/// The three values slots and layouts are rendered against.
#[derive(Clone, Copy)]
pub struct SlotContext<'a> {
    pub request: &'a dyn Typed,
    pub view: &'a dyn Typed,
    pub context: &'a dyn Typed,
}

impl<'a> SlotContext<'a> {
    #[must_use]
    pub fn new(request: &'a dyn Typed, view: &'a dyn Typed, context: &'a dyn Typed) -> Self {
        Self {
            request,
            view,
            context,
        }
    }

    fn args(&self) -> [&'a dyn Typed; 3] {
        [self.request, self.view, self.context]
    }
}

pub type ManagerRender = Arc<dyn Fn(&SlotContext<'_>, Vec<String>) -> String + Send + Sync>;
pub type ItemRender = Arc<dyn Fn(&SlotContext<'_>) -> String + Send + Sync>;

/// Entry of the slot registry.
#[derive(Clone)]
pub enum Slot {
    /// Owns a named slot and combines the rendered items registered for it.
    Manager {
        kind: &'static Kind,
        render: ManagerRender,
    },
    /// Content placed in the slot of the manager whose kind leads its signature.
    Item(ItemRender),
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Manager { kind, .. } => write!(f, "Slot::Manager({kind})"),
            Slot::Item(_) => f.write_str("Slot::Item"),
        }
    }
}

/// Stands in for a manager instance as the first lookup argument for items.
struct ManagerTag(&'static Kind);

impl Typed for ManagerTag {
    fn kind(&self) -> &'static Kind {
        self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wraps rendered bodies into full pages.
#[derive(Clone)]
pub struct Layout {
    render: Arc<dyn Fn(&str, &SlotContext<'_>) -> String + Send + Sync>,
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Layout")
    }
}

impl Layout {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&str, &SlotContext<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            render: Arc::new(render),
        }
    }

    /// Layouts only apply to HTML responses.
    #[must_use]
    pub fn accepts(&self, content_type: &str) -> bool {
        content_type.contains("text/html")
    }

    #[must_use]
    pub fn wrap(&self, body: &str, ctx: &SlotContext<'_>) -> String {
        (self.render)(body, ctx)
    }
}

/// Slot and layout registries of an application.
#[derive(Debug, Clone, Default)]
pub struct Ui {
    pub slots: NamedRegistry<Slot>,
    pub layouts: NamedRegistry<Layout>,
}

impl Ui {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare slot `name` for requests, views and contexts of the given kinds.
    ///
    /// Items for the slot are registered under `manager`.
    pub fn register_slot<F>(
        &mut self,
        name: &str,
        manager: &'static Kind,
        discriminant: [&'static Kind; 3],
        render: F,
    ) -> Result<Signature, RegistryError>
    where
        F: Fn(&SlotContext<'_>, Vec<String>) -> String + Send + Sync + 'static,
    {
        let slot = Slot::Manager {
            kind: manager,
            render: Arc::new(render),
        };
        self.slots
            .register(discriminant, name, slot, ComponentOptions::new())
    }

    /// Register an item for the slot owned by `manager`.
    ///
    /// Items sharing a name replace each other by specificity; conditions in
    /// `options` decide per call whether the item renders.
    pub fn register_item<F>(
        &mut self,
        manager: &'static Kind,
        discriminant: [&'static Kind; 3],
        name: &str,
        render: F,
        options: ComponentOptions<Slot>,
    ) -> Result<Signature, RegistryError>
    where
        F: Fn(&SlotContext<'_>) -> String + Send + Sync + 'static,
    {
        let [request, view, context] = discriminant;
        self.slots.register(
            [manager, request, view, context],
            name,
            Slot::Item(Arc::new(render)),
            options,
        )
    }

    pub fn register_layout(
        &mut self,
        name: &str,
        discriminant: [&'static Kind; 2],
        layout: Layout,
    ) -> Result<Signature, RegistryError> {
        self.layouts
            .register(discriminant, name, layout, ComponentOptions::new())
    }

    /// Render slot `name`, or `None` when no manager serves it here.
    #[must_use]
    pub fn render_slot(&self, name: &str, ctx: &SlotContext<'_>) -> Option<String> {
        let args = ctx.args();
        let manager = self.slots.find_one(&args, name).ok()?;
        let Slot::Manager { kind, render } = manager.value() else {
            return None;
        };
        let tag = ManagerTag(*kind);
        let item_args: [&dyn Typed; 4] = [&tag, ctx.request, ctx.view, ctx.context];
        let items: Vec<String> = self
            .slots
            .find_all(&item_args)
            .filter(|item| item.check(&item_args))
            .filter_map(|item| match item.value() {
                Slot::Item(render) => Some(render(ctx)),
                Slot::Manager { .. } => None,
            })
            .collect();
        Some(render(ctx, items))
    }

    /// Wrap `body` in layout `name` when it applies to `content_type`.
    #[must_use]
    pub fn render_layout(
        &self,
        name: &str,
        ctx: &SlotContext<'_>,
        content_type: &str,
        body: &str,
    ) -> Option<String> {
        let layout = self
            .layouts
            .find_one(&[ctx.request, ctx.view], name)
            .ok()?;
        let layout = layout.value();
        layout
            .accepts(content_type)
            .then(|| layout.wrap(body, ctx))
    }
}

impl Merge for Ui {
    type Error = RegistryError;

    fn merge(&self, other: &Self) -> Result<Self, Self::Error> {
        Ok(Self {
            slots: self.slots.merge(&other.slots)?,
            layouts: self.layouts.merge(&other.layouts)?,
        })
    }
}

impl BitOr for &Ui {
    type Output = Result<Ui, RegistryError>;

    fn bitor(self, other: Self) -> Self::Output {
        self.merge(other)
    }
}

impl Container for Ui {
    fn resolve_mut(&mut self, segment: &str) -> Option<Attribute<'_>> {
        match segment {
            "slots" => Some(Attribute::Leaf(&mut self.slots)),
            "layouts" => Some(Attribute::Leaf(&mut self.layouts)),
            _ => None,
        }
    }
}
