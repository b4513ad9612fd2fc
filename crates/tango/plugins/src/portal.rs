//! Portal plugin: opens overlay elements dropped from the palette
//!
//! Overlays such as modals render outside the normal flow and start
//! closed. When a designer drops a new one onto the canvas it should open
//! so it can be edited. The element does not exist in rendered form until
//! the canvas update that follows the insert, so opening is deferred to
//! `after_canvas_updated`.

use serde_json::Value;
use tango_engine::{
    plugin_factory, state_patch, EngineResult, InsertOrigin, Plugin, PluginFactory, Workspace,
};
use tango_types::{Element, ElementId};

/// State key holding an overlay's open flag
pub const OPEN_KEY: &str = "open";

/// Opens newly dropped overlays and closes the previously opened one
#[derive(Clone, Debug)]
pub struct PortalPlugin {
    portal_types: Vec<String>,
    pending: Option<ElementId>,
    opened: Option<ElementId>,
}

impl PortalPlugin {
    pub const ID: &'static str = "portal";

    pub fn new(portal_types: Vec<String>) -> Self {
        Self {
            portal_types,
            pending: None,
            opened: None,
        }
    }

    /// Factory taking the overlay types from the engine configuration
    pub fn factory() -> PluginFactory {
        plugin_factory(|workspace| Box::new(Self::new(workspace.config().portal_types.clone())))
    }

    /// Overlay waiting for the next canvas update
    pub fn pending(&self) -> Option<&ElementId> {
        self.pending.as_ref()
    }

    fn is_portal(&self, element_type: &str) -> bool {
        self.portal_types.iter().any(|t| t == element_type)
    }
}

impl Plugin for PortalPlugin {
    fn id(&self) -> Option<&str> {
        Some(Self::ID)
    }

    fn after_insert_material(
        &mut self,
        _workspace: &mut Workspace,
        element: &Element,
        origin: InsertOrigin,
    ) -> EngineResult<()> {
        if origin == InsertOrigin::Palette && self.is_portal(&element.element_type) {
            self.pending = Some(element.id.clone());
        }
        Ok(())
    }

    fn after_canvas_updated(&mut self, workspace: &mut Workspace) -> EngineResult<()> {
        let Some(id) = self.pending.take() else {
            return Ok(());
        };
        if !workspace.contains(&id) {
            return Ok(());
        }

        if let Some(previous) = self.opened.take() {
            if previous != id {
                workspace.set_state(state_patch(previous, OPEN_KEY, Value::Bool(false)));
            }
        }
        workspace.set_state(state_patch(id.clone(), OPEN_KEY, Value::Bool(true)));
        tracing::debug!(element_id = %id, "Portal opened");
        self.opened = Some(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tango_engine::{Engine, StateValue};
    use tango_types::{Material, Schema};

    fn engine() -> Engine {
        let mut schema = Schema::with_root(Element::new("root", "Page"));
        schema.add_child("root", Element::new("existing", "Modal"));
        Engine::builder()
            .material(Material::container("Page"))
            .schema(schema)
            .plugin(PortalPlugin::factory())
            .build()
            .unwrap()
    }

    fn open_flag(engine: &Engine, id: &str) -> Option<StateValue> {
        engine.state_value(&id.into(), OPEN_KEY)
    }

    #[test]
    fn test_loaded_portals_stay_closed() {
        let engine = engine();
        assert_eq!(open_flag(&engine, "existing"), None);
    }

    #[test]
    fn test_dropped_portal_opens_after_canvas_update() {
        let mut engine = engine();
        engine
            .insert_element(Element::new("m1", "Modal"), &"root".into(), 0)
            .unwrap();
        assert_eq!(open_flag(&engine, "m1"), Some(StateValue::from(json!(true))));

        engine
            .insert_element(Element::new("d1", "Drawer"), &"root".into(), 0)
            .unwrap();
        assert_eq!(open_flag(&engine, "d1"), Some(StateValue::from(json!(true))));
        assert_eq!(open_flag(&engine, "m1"), Some(StateValue::from(json!(false))));
    }

    #[test]
    fn test_other_types_are_ignored() {
        let mut engine = engine();
        engine
            .insert_element(Element::new("b", "Button"), &"root".into(), 0)
            .unwrap();
        assert_eq!(open_flag(&engine, "b"), None);
    }
}
