//! Registries, chains and topology through the public API.

use compono::chain::{ChainError, PriorityChain};
use compono::component::{ComponentOptions, ConstraintError};
use compono::kind::{Kind, Typed, OBJECT};
use compono::registry::{Merge, NamedRegistry, Registry};
use compono::signature::LookupError;
use compono::topology::{ComponentsTopology, Node, TopologyError};

static NUMBER: Kind = Kind::derive("number", &OBJECT);
static INT: Kind = Kind::derive("int", &NUMBER);
static FLOAT: Kind = Kind::derive("float", &NUMBER);
static STR: Kind = Kind::derive("str", &OBJECT);
static REQUEST: Kind = Kind::derive("request", &OBJECT);
static API_REQUEST: Kind = Kind::derive("api_request", &REQUEST);

struct Int(i64);
compono::typed!(Int => INT);

struct Float(f64);
compono::typed!(Float => FLOAT);

struct Str(&'static str);
compono::typed!(Str => STR);

struct ApiRequest {
    admin: bool,
}
compono::typed!(ApiRequest => API_REQUEST);

type Label = &'static str;

#[test]
fn test_find_one_by_exact_kind() {
    let mut registry: Registry<Label> = Registry::new();
    registry.register([&INT], "int handler", ComponentOptions::new()).unwrap();
    registry.register([&STR], "str handler", ComponentOptions::new()).unwrap();

    let text = Str("hello");
    assert_eq!(*registry.find_one(&[&text]).unwrap().value(), "str handler");
    assert_eq!(*registry.find_one(&[&Int(1)]).unwrap().value(), "int handler");
    assert!(matches!(
        registry.find_one(&[&Float(1.5)]),
        Err(LookupError::NotFound { .. })
    ));
}

#[test]
fn test_find_all_is_most_specific_first() {
    let mut registry: Registry<Label> = Registry::new();
    registry.register([&OBJECT], "object", ComponentOptions::new()).unwrap();
    registry.register([&INT], "int", ComponentOptions::new()).unwrap();
    registry.register([&NUMBER], "number", ComponentOptions::new()).unwrap();
    registry.register([&STR], "str", ComponentOptions::new()).unwrap();

    let all: Vec<Label> = registry.find_all(&[&Int(3)]).map(|c| *c.value()).collect();
    assert_eq!(all, ["int", "number", "object"]);
    assert_eq!(registry.find_all(&[&Float(0.0), &Int(1)]).count(), 0);
}

#[test]
fn test_named_override_replaces_generic() {
    let mut slots: NamedRegistry<Label> = NamedRegistry::new();
    slots.register([&REQUEST], "header", "generic header", ComponentOptions::new()).unwrap();
    slots.register([&API_REQUEST], "header", "api header", ComponentOptions::new()).unwrap();
    slots.register([&REQUEST], "footer", "generic footer", ComponentOptions::new()).unwrap();

    let request = ApiRequest { admin: false };
    let args: [&dyn Typed; 1] = [&request];
    let all: Vec<Label> = slots.find_all(&args).map(|c| *c.value()).collect();
    assert_eq!(all, ["api header", "generic footer"]);
    assert_eq!(*slots.find_one(&args, "header").unwrap().value(), "api header");
    assert!(slots.find_one(&args, "sidebar").is_err());
}

#[test]
fn test_merge_right_wins_and_keeps_both_sides() {
    let mut left: Registry<Label> = Registry::new();
    left.register([&INT], "left int", ComponentOptions::new()).unwrap();
    left.register([&STR], "left str", ComponentOptions::new()).unwrap();
    let mut right: Registry<Label> = Registry::new();
    right.register([&INT], "right int", ComponentOptions::new()).unwrap();

    let merged = (&left | &right).unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(*merged.find_one(&[&Int(0)]).unwrap().value(), "right int");
    assert_eq!(*merged.find_one(&[&Str("")]).unwrap().value(), "left str");
    assert_eq!(*left.find_one(&[&Int(0)]).unwrap().value(), "left int");
    assert_eq!(merged.len(), left.merge(&right).unwrap().len());
}

#[test]
fn test_conditions_guard_a_found_component() {
    let mut registry: Registry<Label> = Registry::new();
    registry
        .register(
            [&API_REQUEST],
            "admin panel",
            ComponentOptions::new()
                .title("Admin")
                .condition(|_, args| {
                    match args.first().and_then(|a| a.downcast_ref::<ApiRequest>()) {
                        Some(ApiRequest { admin: true }) => Ok(()),
                        _ => Err(ConstraintError::new("admins only")),
                    }
                }),
        )
        .unwrap();

    let visitor = ApiRequest { admin: false };
    let admin = ApiRequest { admin: true };
    let component = registry.find_one(&[&visitor]).unwrap();
    assert_eq!(component.title(), "Admin");
    assert!(!component.check(&[&visitor]));
    assert!(component.check(&[&admin]));
    let errors = component.ensure(&[&visitor]).unwrap_err();
    assert_eq!(errors.errors()[0].message, "admins only");
}

#[test]
fn test_remove_then_lookup_fails() {
    let mut registry: Registry<Label> = Registry::new();
    let signature = registry.register([&INT], "int", ComponentOptions::new()).unwrap();
    registry.remove(&signature).unwrap();
    assert!(registry.is_empty());
    assert!(registry.find_one(&[&Int(1)]).is_err());
    assert!(registry.remove(&signature).is_err());
}

#[test]
fn test_chain_merge_is_ordered() {
    let mut a = PriorityChain::new();
    a.add(1, "x").unwrap();
    a.add(3, "z").unwrap();
    let mut b = PriorityChain::new();
    b.add(2, "y").unwrap();

    let merged = (&a | &b).unwrap();
    let pairs: Vec<(i32, &str)> = merged.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(pairs, [(1, "x"), (2, "y"), (3, "z")]);

    assert!(matches!(a.add(1, "x"), Err(ChainError::AlreadyExists(_))));
    a.remove(&3, &"z").unwrap();
    assert!(matches!(a.remove(&3, &"z"), Err(ChainError::DoesNotExist(_))));
}

#[test]
fn test_topology_respects_constraints() {
    let mut topology = ComponentsTopology::new();
    topology.add("c", Node::End, Node::Item("b")).unwrap();
    topology.insert("a").unwrap();
    topology.add("b", Node::Item("c"), Node::Item("a")).unwrap();
    topology.insert("d").unwrap();

    let order = topology.sorted().unwrap();
    let position = |x: &str| order.iter().position(|n| *n == x).unwrap();
    assert_eq!(order.len(), 4);
    assert!(position("a") < position("b"));
    assert!(position("b") < position("c"));
}

#[test]
fn test_topology_cycle_fails() {
    let mut topology = ComponentsTopology::new();
    topology.add("a", Node::End, Node::Item("b")).unwrap();
    topology.add("b", Node::End, Node::Item("a")).unwrap();
    assert!(matches!(topology.sorted(), Err(TopologyError::Cycle { .. })));
}
