//! Mode plugin: tells every element which mode the engine runs in

use serde_json::Value;
use tango_engine::{
    plugin_factory, state_patch, EngineResult, InsertOrigin, Plugin, PluginFactory, Workspace,
    MODE_KEY,
};
use tango_types::{Element, ElementId};

/// Injects `tg_mode` into every element, current and future
#[derive(Clone, Debug)]
pub struct ModePlugin {
    mode: String,
}

impl ModePlugin {
    pub const ID: &'static str = "mode";

    pub fn new(mode: impl Into<String>) -> Self {
        Self { mode: mode.into() }
    }

    /// Factory taking the mode from the engine configuration
    pub fn factory() -> PluginFactory {
        plugin_factory(|workspace| Box::new(Self::new(workspace.config().mode.clone())))
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    fn inject(&self, workspace: &mut Workspace, id: &ElementId) {
        workspace.set_state(state_patch(id.clone(), MODE_KEY, Value::String(self.mode.clone())));
    }
}

impl Plugin for ModePlugin {
    fn id(&self) -> Option<&str> {
        Some(Self::ID)
    }

    fn init(&mut self, workspace: &mut Workspace) -> EngineResult<()> {
        let ids: Vec<ElementId> = workspace.get_elements().into_iter().map(|e| e.id).collect();
        for id in &ids {
            self.inject(workspace, id);
        }
        tracing::debug!(mode = %self.mode, elements = ids.len(), "Mode injected");
        Ok(())
    }

    fn after_insert_material(
        &mut self,
        workspace: &mut Workspace,
        element: &Element,
        _origin: InsertOrigin,
    ) -> EngineResult<()> {
        self.inject(workspace, &element.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tango_engine::{Engine, EngineConfig, StateValue};
    use tango_types::{Material, Schema};

    fn schema() -> Schema {
        let mut schema = Schema::with_root(Element::new("root", "Page"));
        schema.add_child("root", Element::new("btn", "Button"));
        schema
    }

    #[test]
    fn test_mode_reaches_loaded_and_inserted_elements() {
        let config = EngineConfig {
            mode: "preview".into(),
            ..EngineConfig::default()
        };
        let mut engine = Engine::builder()
            .config(config)
            .material(Material::container("Page"))
            .schema(schema())
            .plugin(ModePlugin::factory())
            .build()
            .unwrap();

        let expected = Some(StateValue::from(json!("preview")));
        assert_eq!(engine.state_value(&"btn".into(), MODE_KEY), expected);

        engine
            .insert_element(Element::new("new", "Button"), &"root".into(), 0)
            .unwrap();
        assert_eq!(engine.state_value(&"new".into(), MODE_KEY), expected);
    }

    #[test]
    fn test_mode_survives_reload() {
        let mut engine = Engine::builder()
            .schema(schema())
            .plugin(ModePlugin::factory())
            .build()
            .unwrap();
        engine.load(schema()).unwrap();
        assert_eq!(
            engine.state_value(&"root".into(), MODE_KEY),
            Some(StateValue::from(json!("design")))
        );
    }
}
