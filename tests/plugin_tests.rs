//! Plugin installation into an [`App`].

use compono::app::{endpoint, App, Response, REQUEST};
use compono::kind::{Nothing, OBJECT};
use compono::plugin::{Event, Plugin, PluginError};
use compono::routing::Router;
use compono::ui::{SlotContext, Ui};
use compono::Request;
use http::Method;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn routes(path: &str, label: &'static str) -> Router<compono::app::Endpoint> {
    let mut router = Router::new();
    router
        .get(path, endpoint(move |_| Response::json(200, json!(label))))
        .unwrap();
    router
}

fn footer_slot() -> Ui {
    let mut ui = Ui::new();
    ui.register_slot("footer", &OBJECT, [&REQUEST, &OBJECT, &OBJECT], |_, items| {
        items.join(" ")
    })
    .unwrap();
    ui
}

fn footer_item(name: &str, text: &'static str) -> Ui {
    let mut ui = Ui::new();
    ui.register_item(
        &OBJECT,
        [&REQUEST, &OBJECT, &OBJECT],
        name,
        move |_| text.to_string(),
        Default::default(),
    )
    .unwrap();
    ui
}

fn footer(app: &App) -> Option<String> {
    let request = Request::new(Method::GET, "/");
    app.ui
        .render_slot("footer", &SlotContext::new(&request, &Nothing, &Nothing))
}

#[test]
fn test_installing_twice_is_idempotent() {
    let counter = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&counter);
    let plugin = Plugin::<App>::builder("docs")
        .component("router", routes("/docs", "docs"))
        .component("ui.slots", footer_slot().slots)
        .subscribe(Event::AfterInstall, move |_, _| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build();

    let mut app = App::new();
    app.install(&plugin).unwrap();
    let routes_once = app.router.len();
    let slots_once = app.ui.slots.len();
    app.install(&plugin).unwrap();

    assert_eq!(app.router.len(), routes_once);
    assert_eq!(app.ui.slots.len(), slots_once);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(app.installed().collect::<Vec<_>>(), ["docs"]);
}

#[test]
fn test_shared_grandparent_installs_once() {
    let base_installs = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&base_installs);
    let base = Arc::new(
        Plugin::<App>::builder("base")
            .component("ui.slots", footer_slot().slots)
            .subscribe(Event::BeforeInstall, move |_, _| {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build(),
    );
    let left = Arc::new(
        Plugin::<App>::builder("left")
            .component("ui.slots", footer_item("copyright", "(c)").slots)
            .depends_on(&base)
            .build(),
    );
    let right = Arc::new(
        Plugin::<App>::builder("right")
            .component("router", routes("/right", "right"))
            .depends_on(&base)
            .build(),
    );
    let top = Plugin::<App>::builder("top")
        .depends_on(&left)
        .depends_on(&right)
        .build();

    let names: Vec<&str> = top.lineage().map(|p| p.name()).collect();
    assert_eq!(names, ["base", "left", "right", "top"]);

    let mut app = App::new();
    app.install(&top).unwrap();
    assert_eq!(base_installs.load(Ordering::SeqCst), 1);
    assert_eq!(app.installed().collect::<Vec<_>>(), ["base", "left", "right", "top"]);
    assert_eq!(footer(&app).as_deref(), Some("(c)"));
    assert_eq!(app.call(Method::GET, "/right").body, json!("right"));
}

#[test]
fn test_later_plugin_overrides_item() {
    let base = Arc::new(
        Plugin::<App>::builder("base")
            .component("ui.slots", footer_slot().slots)
            .component("ui.slots", footer_item("copyright", "(c) generic").slots)
            .build(),
    );
    let branded = Plugin::<App>::builder("branded")
        .component("ui.slots", footer_item("copyright", "(c) ACME").slots)
        .depends_on(&base)
        .build();

    let mut app = App::new();
    app.install(&branded).unwrap();
    assert_eq!(footer(&app).as_deref(), Some("(c) ACME"));
}

#[test]
fn test_failed_install_can_be_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&attempts);
    let flaky = Plugin::<App>::builder("flaky")
        .component("router", routes("/flaky", "flaky"))
        .subscribe(Event::BeforeInstall, move |_, _| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("database not ready");
            }
            Ok(())
        })
        .build();

    let mut app = App::new();
    let err = app.install(&flaky).unwrap_err();
    assert!(matches!(err, PluginError::Hook { .. }));
    assert_eq!(app.installed().count(), 0);
    assert!(app.router.is_empty());

    app.install(&flaky).unwrap();
    assert_eq!(app.installed().collect::<Vec<_>>(), ["flaky"]);
    assert_eq!(app.call(Method::GET, "/flaky").status, 200);
}

#[test]
fn test_missing_path_and_wrong_container() {
    let mut app = App::new();

    let missing = Plugin::<App>::builder("menus")
        .component("ui.menus", footer_slot().slots)
        .build();
    assert!(matches!(
        app.install(&missing),
        Err(PluginError::MissingAttribute { ref path, .. }) if path == "ui.menus"
    ));

    let mismatched = Plugin::<App>::builder("mismatched")
        .component("router", footer_slot().slots)
        .build();
    assert!(matches!(app.install(&mismatched), Err(PluginError::Merge { .. })));

    let too_deep = Plugin::<App>::builder("too_deep")
        .component("router.routes", routes("/x", "x"))
        .build();
    assert!(matches!(app.install(&too_deep), Err(PluginError::CorruptState { .. })));

    assert_eq!(app.installed().count(), 0);
}

#[test]
fn test_uninstall_is_unsupported() {
    let plugin = Plugin::<App>::builder("docs").build();
    let mut app = App::new();
    app.install(&plugin).unwrap();
    assert!(matches!(
        plugin.uninstall(&mut app),
        Err(PluginError::UninstallUnsupported(ref name)) if name == "docs"
    ));
    assert_eq!(app.installed().collect::<Vec<_>>(), ["docs"]);
}
