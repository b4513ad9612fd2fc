//! End-to-end behaviour of the engine API: loading, state and context
//! merging, structural edits, drag/drop and hyper value evaluation.

use serde_json::{json, Value};
use std::collections::HashSet;
use tango_engine::*;
use tango_types::{ElementId, HyperValue, Material, Schema};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn object(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn schema_from_json(value: Value) -> Schema {
    serde_json::from_value(value).unwrap()
}

/// root → C → [A, B], with B accepting buttons and C a container
fn nested_schema() -> Schema {
    schema_from_json(json!({
        "elements": {
            "root": { "type": "Page" },
            "C": { "type": "Panel", "material": { "name": "Panel", "isContainer": true } },
            "A": { "type": "Button", "props": { "text": "Click" } },
            "B": { "type": "Slot", "material": { "name": "Slot", "dropTypes": ["Button"] } }
        },
        "layout": {
            "root": "root",
            "structure": { "root": ["C"], "C": ["A", "B"] }
        }
    }))
}

fn engine() -> Engine {
    Engine::builder()
        .material(Material::container("Page"))
        .schema(nested_schema())
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn load_yields_each_element_exactly_once() {
    let engine = engine();
    let ids: Vec<ElementId> = engine.get_elements().into_iter().map(|e| e.id).collect();
    let unique: HashSet<&ElementId> = ids.iter().collect();

    assert_eq!(ids.len(), 4);
    assert_eq!(unique.len(), 4);
    assert_eq!(ids[0], ElementId::new("root"));
    for key in nested_schema().elements.keys() {
        assert!(unique.contains(key));
    }
}

#[test]
fn invalid_schemas_are_rejected() {
    let mut engine = engine();

    let shared = schema_from_json(json!({
        "elements": { "r": {"type": "Page"}, "x": {"type": "Box"}, "y": {"type": "Box"}, "z": {"type": "Box"} },
        "layout": { "root": "r", "structure": { "r": ["x", "y"], "x": ["z"], "y": ["z"] } }
    }));
    let orphan = schema_from_json(json!({
        "elements": { "r": {"type": "Page"}, "lost": {"type": "Box"} },
        "layout": { "root": "r" }
    }));
    let rootless = schema_from_json(json!({ "elements": { "r": {"type": "Page"} } }));

    for bad in [shared, orphan, rootless] {
        assert!(matches!(engine.load(bad), Err(EngineError::SchemaValidation(_))));
    }
    assert_eq!(engine.element_count(), 4);
}

// ---------------------------------------------------------------------------
// State and context
// ---------------------------------------------------------------------------

#[test]
fn set_state_merges_shallowly() {
    let mut engine = engine();
    engine.set_state(state_patch("A".into(), "a", json!(1)));
    engine.set_state(state_patch("A".into(), "b", json!(2)));

    let state = engine.get_state(&"A".into());
    assert_eq!(state.get("a"), Some(&StateValue::from(json!(1))));
    assert_eq!(state.get("b"), Some(&StateValue::from(json!(2))));

    // identical input changes nothing
    engine.set_state(state_patch("A".into(), "b", json!(2)));
    assert_eq!(engine.get_state(&"A".into()), state);
    assert!(engine.get_element(&"A".into()).is_some());
}

#[test]
fn context_values_merge_per_key() {
    let mut engine = engine();
    engine.set_context_value(&"C".into(), object(json!({ "variables": ["x"] })));
    engine.set_context_value(&"C".into(), object(json!({ "methods": ["y"] })));

    assert_eq!(
        Value::Object(engine.get_context_value(&"C".into())),
        json!({ "variables": ["x"], "methods": ["y"] })
    );
    assert!(engine.get_context_value(&"A".into()).is_empty());
}

// ---------------------------------------------------------------------------
// Structural edits
// ---------------------------------------------------------------------------

#[test]
fn moving_under_own_descendant_fails_and_keeps_layout() {
    let mut engine = engine();
    let before = engine.to_schema().layout;

    let err = engine.move_element(&"C".into(), &"B".into(), 0).unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidDropTarget(InvalidDropTargetError::Cycle { .. })
    ));
    assert_eq!(engine.to_schema().layout, before);
}

#[test]
fn removing_a_container_removes_its_subtree() {
    let mut engine = engine();
    engine.set_state(state_patch("A".into(), "k", json!(true)));

    let removed = engine.remove_element(&"C".into()).unwrap();
    assert_eq!(removed.len(), 3);
    for id in ["C", "A", "B"] {
        assert!(!engine.contains(&id.into()));
    }
    assert!(engine.get_state(&"A".into()).is_empty());
    assert_eq!(engine.element_count(), 1);

    // removing again is a no-op
    assert!(engine.remove_element(&"C".into()).unwrap().is_empty());
}

#[test]
fn root_cannot_be_removed() {
    let mut engine = engine();
    assert!(matches!(
        engine.remove_element(&"root".into()),
        Err(EngineError::RootRemoval(_))
    ));
}

#[test]
fn snapshot_restores_previous_layout() {
    let mut engine = engine();
    let snapshot = engine.to_schema();
    engine.move_element(&"A".into(), &"root".into(), 0).unwrap();
    assert_ne!(engine.to_schema(), snapshot);

    engine.load(snapshot.clone()).unwrap();
    assert_eq!(engine.to_schema(), snapshot);
}

// ---------------------------------------------------------------------------
// Drag and drop
// ---------------------------------------------------------------------------

#[test]
fn drag_resolves_innermost_accepting_target() {
    let mut engine = engine();
    let mut session = DragSession::new();
    let payload = DragPayload::from_element(engine.get_element(&"A".into()).unwrap());
    session.start(payload).unwrap();

    let pointer = PointerTarget::new(["root", "C", "B"]);
    assert_eq!(
        session.resolve_target(&engine, &pointer).map(|o| o.parent),
        Some(ElementId::new("B"))
    );

    let outcome = session.drop(&mut engine, &pointer).unwrap().unwrap();
    assert_eq!(outcome.parent, ElementId::new("B"));
    assert_eq!(engine.parent_of(&"A".into()), Some(&ElementId::new("B")));
}

// ---------------------------------------------------------------------------
// Hyper values
// ---------------------------------------------------------------------------

fn hyper(value: Value) -> HyperValue {
    serde_json::from_value(value).unwrap()
}

#[test]
fn literal_hyper_values() {
    let engine = engine();
    let scope = Scope::new();

    let hi = engine.evaluate(&scope, &hyper(json!({"type": "string", "value": "hi"}))).unwrap();
    assert_eq!(hi, Evaluated::Value(json!("hi")));

    let null = engine.evaluate(&scope, &hyper(json!({"type": "null"}))).unwrap();
    assert_eq!(null, Evaluated::Value(Value::Null));

    let zero = engine.evaluate(&scope, &hyper(json!({"type": "number"}))).unwrap();
    assert_eq!(zero, Evaluated::Value(json!(0)));
}

#[test]
fn expression_failure_is_an_evaluation_error() {
    let engine = engine();
    let err = engine
        .evaluate(&Scope::new(), &HyperValue::expression("1 / 0"))
        .unwrap_err();
    assert!(err.to_string().contains("expression"));

    let engine_err: EngineError = err.into();
    assert!(matches!(engine_err, EngineError::Evaluation(_)));
}

#[test]
fn deeply_nested_snippets_are_evaluation_errors() {
    let engine = engine();
    let parens = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    let nots = format!("{}true", "!".repeat(2000));

    for source in [parens, nots] {
        let err = engine
            .evaluate(&Scope::new(), &HyperValue::expression(source))
            .unwrap_err();
        let cause = err.source.downcast_ref::<tango_expr::ExprError>();
        assert!(matches!(cause, Some(tango_expr::ExprError::NestingTooDeep(_))));
    }
}

#[test]
fn evaluation_respects_configured_budget() {
    let config = EngineConfig {
        max_evaluation_steps: 100,
        ..EngineConfig::default()
    };
    let engine = Engine::new(config);
    let err = engine
        .evaluate(&Scope::new(), &HyperValue::code("while (true) {}"))
        .unwrap_err();
    assert!(err.source.to_string().contains("100"));
}

#[test]
fn context_value_reads_published_record() {
    let mut engine = engine();
    engine.set_context_value(&"B".into(), object(json!({ "contextValues": { "rows": [1, 2, 3] } })));

    let out = engine
        .evaluate(&Scope::new(), &HyperValue::context_value("B.contextValues.rows.2"))
        .unwrap();
    assert_eq!(out, Evaluated::Value(json!(3)));

    let missing = engine
        .evaluate(&Scope::new(), &HyperValue::context_value("A.nothing"))
        .unwrap();
    assert!(missing.is_undefined());
}
