//! Context value plugin: hands each element a setter for its context

use tango_engine::{
    plugin_factory, state_patch, ContextSetter, EngineResult, InsertOrigin, Plugin, PluginFactory,
    Workspace, SET_CONTEXT_VALUES_KEY,
};
use tango_types::{Element, ElementId};

/// Injects a [`ContextSetter`] under `tg_setContextValues` into every
/// element, bound to that element's id
#[derive(Clone, Debug, Default)]
pub struct ContextValuePlugin;

impl ContextValuePlugin {
    pub const ID: &'static str = "context-value";

    pub fn new() -> Self {
        Self
    }

    pub fn factory() -> PluginFactory {
        plugin_factory(|_| Box::new(Self::new()))
    }

    fn inject(workspace: &mut Workspace, id: &ElementId) {
        let setter = ContextSetter::new(id.clone());
        workspace.set_state(state_patch(id.clone(), SET_CONTEXT_VALUES_KEY, setter));
    }
}

impl Plugin for ContextValuePlugin {
    fn id(&self) -> Option<&str> {
        Some(Self::ID)
    }

    fn init(&mut self, workspace: &mut Workspace) -> EngineResult<()> {
        for element in workspace.get_elements() {
            Self::inject(workspace, &element.id);
        }
        Ok(())
    }

    fn after_insert_material(
        &mut self,
        workspace: &mut Workspace,
        element: &Element,
        _origin: InsertOrigin,
    ) -> EngineResult<()> {
        Self::inject(workspace, &element.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tango_engine::Engine;
    use tango_types::Schema;

    fn engine() -> Engine {
        let mut schema = Schema::with_root(Element::new("root", "Page"));
        schema.add_child("root", Element::new("form", "Form"));
        Engine::builder()
            .schema(schema)
            .plugin(ContextValuePlugin::factory())
            .build()
            .unwrap()
    }

    fn setter_of(engine: &Engine, id: &str) -> ContextSetter {
        engine
            .state_value(&id.into(), SET_CONTEXT_VALUES_KEY)
            .and_then(|v| v.as_context_setter().cloned())
            .unwrap()
    }

    #[test]
    fn test_setter_is_bound_to_its_element() {
        let engine = engine();
        assert_eq!(setter_of(&engine, "form").element(), &ElementId::new("form"));
        assert_eq!(setter_of(&engine, "root").element(), &ElementId::new("root"));
    }

    #[test]
    fn test_publishing_through_setter_merges() {
        let mut engine = engine();
        let setter = setter_of(&engine, "form");

        let first = json!({ "variables": [{ "name": "email" }] });
        let second = json!({ "methods": [{ "name": "submit" }] });
        engine.publish_context(&setter, first.as_object().unwrap().clone());
        engine.publish_context(&setter, second.as_object().unwrap().clone());

        let record = engine.get_context_value(&"form".into());
        assert_eq!(record.len(), 2);
        assert_eq!(record["methods"], json!([{ "name": "submit" }]));
    }

    #[test]
    fn test_attaching_twice_is_a_no_op() {
        let mut engine = engine();
        assert!(!engine.use_plugin(ContextValuePlugin::factory()).unwrap());
        assert_eq!(engine.plugins().ids(), vec![ContextValuePlugin::ID]);
    }
}
