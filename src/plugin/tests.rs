use std::sync::Arc;

use super::*;
use crate::component::ComponentOptions;
use crate::kind::{Kind, OBJECT};
use crate::registry::{Collection, NamedRegistry, Registry};

static VIEW: Kind = Kind::derive("view", &OBJECT);

struct View;
crate::typed!(View => VIEW);

type Label = &'static str;

#[derive(Default)]
struct Ui {
    slots: NamedRegistry<Label>,
}

impl Container for Ui {
    fn resolve_mut(&mut self, segment: &str) -> Option<Attribute<'_>> {
        match segment {
            "slots" => Some(Attribute::Leaf(&mut self.slots)),
            _ => None,
        }
    }
}

#[derive(Default)]
struct TestApp {
    views: Registry<Label>,
    tags: Collection<Label>,
    ui: Ui,
    installed: Option<InstalledPlugins>,
    log: Vec<String>,
}

impl Container for TestApp {
    fn resolve_mut(&mut self, segment: &str) -> Option<Attribute<'_>> {
        match segment {
            "views" => Some(Attribute::Leaf(&mut self.views)),
            "tags" => Some(Attribute::Leaf(&mut self.tags)),
            "ui" => Some(Attribute::Node(&mut self.ui)),
            _ => None,
        }
    }
}

impl Application for TestApp {
    fn installed_plugins(&mut self) -> &mut Option<InstalledPlugins> {
        &mut self.installed
    }
}

fn tags(label: Label) -> Collection<Label> {
    let mut tags = Collection::new();
    tags.create(label, label, label, ComponentOptions::new());
    tags
}

fn tagged(name: &'static str, deps: &[&Arc<Plugin<TestApp>>]) -> Arc<Plugin<TestApp>> {
    let mut builder = Plugin::builder(name).component("tags", tags(name));
    for dep in deps {
        builder = builder.depends_on(dep);
    }
    Arc::new(builder.build())
}

fn tag_values(app: &TestApp) -> Vec<Label> {
    app.tags.iter().map(|c| *c.value()).collect()
}

fn lineage(plugin: &Plugin<TestApp>) -> Vec<&str> {
    plugin.lineage().map(Plugin::name).collect()
}

#[test]
fn test_lineage_is_dependencies_first() {
    let p = tagged("p", &[]);
    let p1 = tagged("p1", &[&p]);
    let p2 = tagged("p2", &[&p1]);
    assert_eq!(lineage(&p), ["p"]);
    assert_eq!(lineage(&p1), ["p", "p1"]);
    assert_eq!(lineage(&p2), ["p", "p1", "p2"]);
}

#[test]
fn test_diamond_lineage_is_deduplicated() {
    let base = tagged("base", &[]);
    let left = tagged("left", &[&base]);
    let right = tagged("right", &[&base]);
    let top = tagged("top", &[&left, &right]);
    assert_eq!(lineage(&top), ["base", "left", "right", "top"]);
    let direct: Vec<&str> = top.dependencies().map(Plugin::name).collect();
    assert_eq!(direct, ["left", "right"]);
}

#[test]
fn test_install_merges_at_dotted_paths() {
    let mut views = Registry::new();
    views
        .register([&VIEW], "plugin view", ComponentOptions::new())
        .unwrap();
    let mut slots = NamedRegistry::new();
    slots
        .register([&VIEW], "header", "plugin header", ComponentOptions::new())
        .unwrap();
    let plugin: Plugin<TestApp> = Plugin::builder("views")
        .component("views", views)
        .component("ui.slots", slots)
        .build();

    let mut app = TestApp::default();
    plugin.install(&mut app).unwrap();

    assert_eq!(*app.views.find_one(&[&View]).unwrap().value(), "plugin view");
    assert_eq!(
        *app.ui.slots.find_one(&[&View], "header").unwrap().value(),
        "plugin header"
    );
    assert!(app.installed.as_ref().unwrap().contains("views"));
}

#[test]
fn test_install_twice_is_idempotent() {
    let counted: Plugin<TestApp> = Plugin::builder("counted")
        .component("tags", tags("counted"))
        .subscribe(Event::AfterInstall, |plugin, app: &mut TestApp| {
            app.log.push(format!("installed {}", plugin.name()));
            Ok(())
        })
        .build();

    let mut app = TestApp::default();
    counted.install(&mut app).unwrap();
    counted.install(&mut app).unwrap();

    assert_eq!(tag_values(&app), ["counted"]);
    assert_eq!(app.log, ["installed counted"]);
}

#[test]
fn test_shared_ancestor_installed_once() {
    let base = tagged("base", &[]);
    let left = tagged("left", &[&base]);
    let right = tagged("right", &[&base]);
    let top = tagged("top", &[&left, &right]);

    let mut app = TestApp::default();
    top.install(&mut app).unwrap();
    assert_eq!(tag_values(&app), ["base", "left", "right", "top"]);

    let order: Vec<&str> = app.installed.as_ref().unwrap().iter().collect();
    assert_eq!(order, ["base", "left", "right", "top"]);

    left.install(&mut app).unwrap();
    assert_eq!(app.tags.len(), 4);
}

#[test]
fn test_hooks_fire_around_apply() {
    let plugin: Plugin<TestApp> = Plugin::builder("hooked")
        .component("tags", tags("hooked"))
        .subscribe(Event::BeforeInstall, |_, app: &mut TestApp| {
            let seen = app.tags.len();
            app.log.push(format!("before: {seen} tags"));
            Ok(())
        })
        .subscribe(Event::AfterInstall, |_, app: &mut TestApp| {
            let seen = app.tags.len();
            app.log.push(format!("after: {seen} tags"));
            Ok(())
        })
        .build();

    let mut app = TestApp::default();
    plugin.install(&mut app).unwrap();
    assert_eq!(app.log, ["before: 0 tags", "after: 1 tags"]);
}

#[test]
fn test_missing_attribute_aborts_install() {
    let plugin: Plugin<TestApp> = Plugin::builder("lost")
        .component("tags", tags("lost"))
        .component("nowhere", tags("lost"))
        .build();

    let mut app = TestApp::default();
    let err = plugin.install(&mut app).unwrap_err();
    assert!(matches!(err, PluginError::MissingAttribute { ref path, .. } if path == "nowhere"));
    assert!(!app.installed.as_ref().unwrap().contains("lost"));

    let nested: Plugin<TestApp> = Plugin::builder("nested")
        .component("ui.footer", tags("nested"))
        .build();
    assert!(matches!(
        nested.install(&mut app),
        Err(PluginError::MissingAttribute { .. })
    ));
}

#[test]
fn test_path_shape_mismatch_is_corrupt_state() {
    let mut app = TestApp::default();

    let leaf_as_node: Plugin<TestApp> = Plugin::builder("a")
        .component("tags.inner", tags("a"))
        .build();
    assert!(matches!(
        leaf_as_node.install(&mut app),
        Err(PluginError::CorruptState { .. })
    ));

    let node_as_leaf: Plugin<TestApp> = Plugin::builder("b").component("ui", tags("b")).build();
    assert!(matches!(
        node_as_leaf.install(&mut app),
        Err(PluginError::CorruptState { .. })
    ));
}

#[test]
fn test_wrong_container_type_is_bad_merge() {
    let plugin: Plugin<TestApp> = Plugin::builder("confused")
        .component("views", tags("confused"))
        .build();
    let mut app = TestApp::default();
    let err = plugin.install(&mut app).unwrap_err();
    assert!(matches!(
        err,
        PluginError::Merge {
            source: MergeError::Mismatch { .. },
            ..
        }
    ));
    assert!(app.views.is_empty());
}

#[test]
fn test_failing_hook_leaves_plugin_uninstalled() {
    let plugin: Plugin<TestApp> = Plugin::builder("fragile")
        .component("tags", tags("fragile"))
        .subscribe(Event::BeforeInstall, |_, _: &mut TestApp| {
            Err(anyhow::anyhow!("database unavailable"))
        })
        .build();

    let mut app = TestApp::default();
    let err = plugin.install(&mut app).unwrap_err();
    assert!(matches!(err, PluginError::Hook { event: Event::BeforeInstall, .. }));
    assert!(app.tags.is_empty());
    assert!(!app.installed.as_ref().unwrap().contains("fragile"));
}

#[test]
fn test_uninstall_is_unsupported() {
    let plugin = tagged("p", &[]);
    let mut app = TestApp::default();
    plugin.install(&mut app).unwrap();
    assert!(matches!(
        plugin.uninstall(&mut app),
        Err(PluginError::UninstallUnsupported(_))
    ));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn test_failing_after_install_hook_is_logged() {
    let plugin: Plugin<TestApp> = Plugin::builder("noisy")
        .component("tags", tags("noisy"))
        .subscribe(Event::AfterInstall, |_, _: &mut TestApp| {
            Err(anyhow::anyhow!("cache warmup failed"))
        })
        .build();

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let mut app = TestApp::default();
    let err = tracing::subscriber::with_default(subscriber, || plugin.install(&mut app)).unwrap_err();

    assert!(matches!(err, PluginError::Hook { event: Event::AfterInstall, .. }));
    assert!(app.installed.as_ref().unwrap().contains("noisy"));
    let text = logs.text();
    assert!(text.contains("ERROR"), "{text}");
    assert!(text.contains("Plugin post-install hook failed"), "{text}");
    assert!(!text.contains("Plugin installed"), "{text}");
}
