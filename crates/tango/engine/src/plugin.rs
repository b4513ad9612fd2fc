//! Plugin chain: lifecycle hooks invoked in registration order
//!
//! A plugin is created by a factory that sees the workspace, then attached
//! to the chain where `init` runs once. Plugins with the same id are
//! attached only once.
//!
//! `before_*` hooks get a read-only workspace and may veto a host
//! mutation by returning an error. `after_*` hooks get the workspace
//! mutably; the events their mutations cause are queued and delivered
//! after the current hook returns. The first hook error stops the cascade.

use crate::error::{EngineError, EngineResult};
use crate::workspace::{LifecycleEvent, Workspace};
use tango_types::Element;

/// How an element came to be in the graph
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOrigin {
    /// Part of a loaded schema
    Load,
    /// Dropped from the palette
    Palette,
}

/// A participant in the engine lifecycle
///
/// Every hook defaults to doing nothing.
pub trait Plugin {
    /// Stable id used for deduplication
    fn id(&self) -> Option<&str> {
        None
    }

    /// Name used in logs and errors
    fn name(&self) -> &str {
        self.id().unwrap_or("anonymous")
    }

    /// Runs once when the plugin is attached
    fn init(&mut self, _workspace: &mut Workspace) -> EngineResult<()> {
        Ok(())
    }

    fn before_insert_material(
        &mut self,
        _workspace: &Workspace,
        _element: &Element,
    ) -> EngineResult<()> {
        Ok(())
    }

    fn after_insert_material(
        &mut self,
        _workspace: &mut Workspace,
        _element: &Element,
        _origin: InsertOrigin,
    ) -> EngineResult<()> {
        Ok(())
    }

    fn before_canvas_updated(&mut self, _workspace: &Workspace) -> EngineResult<()> {
        Ok(())
    }

    fn after_canvas_updated(&mut self, _workspace: &mut Workspace) -> EngineResult<()> {
        Ok(())
    }
}

/// Creates a plugin with access to the workspace
pub type PluginFactory = Box<dyn FnOnce(&mut Workspace) -> Box<dyn Plugin>>;

/// Box a closure as a [`PluginFactory`]
pub fn plugin_factory<F>(factory: F) -> PluginFactory
where
    F: FnOnce(&mut Workspace) -> Box<dyn Plugin> + 'static,
{
    Box::new(factory)
}

/// Ordered list of attached plugins
#[derive(Default)]
pub struct PluginChain {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Ids of attached plugins, in order; anonymous plugins are omitted
    pub fn ids(&self) -> Vec<&str> {
        self.plugins.iter().filter_map(|p| p.id()).collect()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.plugins.iter().any(|p| p.id() == Some(id))
    }

    /// Create a plugin, run its `init` and append it
    ///
    /// Returns `Ok(false)` when a plugin with the same id is already
    /// attached; the new one is dropped without `init`.
    pub fn attach(&mut self, factory: PluginFactory, workspace: &mut Workspace) -> EngineResult<bool> {
        let mut plugin = factory(workspace);

        if let Some(id) = plugin.id() {
            if self.contains_id(id) {
                tracing::debug!(plugin = %id, "Plugin already attached, skipping");
                return Ok(false);
            }
        }

        plugin
            .init(workspace)
            .map_err(|e| hook_error(plugin.as_ref(), "init", e))?;
        tracing::info!(plugin = %plugin.name(), "Plugin attached");
        self.plugins.push(plugin);
        Ok(true)
    }

    pub(crate) fn before_insert_material(
        &mut self,
        workspace: &Workspace,
        element: &Element,
    ) -> EngineResult<()> {
        for plugin in &mut self.plugins {
            plugin
                .before_insert_material(workspace, element)
                .map_err(|e| hook_error(plugin.as_ref(), "before_insert_material", e))?;
        }
        Ok(())
    }

    pub(crate) fn before_canvas_updated(&mut self, workspace: &Workspace) -> EngineResult<()> {
        for plugin in &mut self.plugins {
            plugin
                .before_canvas_updated(workspace)
                .map_err(|e| hook_error(plugin.as_ref(), "before_canvas_updated", e))?;
        }
        Ok(())
    }

    /// Deliver one queued event to every plugin
    pub(crate) fn dispatch(
        &mut self,
        workspace: &mut Workspace,
        event: &LifecycleEvent,
    ) -> EngineResult<()> {
        match event {
            LifecycleEvent::AfterInsertMaterial { id, origin } => {
                for plugin in &mut self.plugins {
                    // An earlier hook may have removed the element
                    let Some(element) = workspace.get_element(id).cloned() else {
                        break;
                    };
                    plugin
                        .after_insert_material(workspace, &element, *origin)
                        .map_err(|e| hook_error(plugin.as_ref(), "after_insert_material", e))?;
                }
            }
            LifecycleEvent::AfterCanvasUpdated => {
                for plugin in &mut self.plugins {
                    plugin
                        .after_canvas_updated(workspace)
                        .map_err(|e| hook_error(plugin.as_ref(), "after_canvas_updated", e))?;
                }
            }
        }
        Ok(())
    }
}

fn hook_error(plugin: &dyn Plugin, hook: &'static str, err: EngineError) -> EngineError {
    let err = match err {
        already @ EngineError::Plugin { .. } => already,
        other => EngineError::Plugin {
            plugin: plugin.name().to_string(),
            hook,
            message: other.to_string(),
        },
    };
    tracing::warn!(plugin = %plugin.name(), hook, error = %err, "Plugin hook failed");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_store::state_patch;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tango_types::Schema;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        id: &'static str,
        log: Log,
    }

    impl Plugin for Recorder {
        fn id(&self) -> Option<&str> {
            Some(self.id)
        }

        fn init(&mut self, workspace: &mut Workspace) -> EngineResult<()> {
            self.log
                .borrow_mut()
                .push(format!("{}:init:{}", self.id, workspace.element_count()));
            Ok(())
        }

        fn after_insert_material(
            &mut self,
            _workspace: &mut Workspace,
            element: &Element,
            _origin: InsertOrigin,
        ) -> EngineResult<()> {
            self.log.borrow_mut().push(format!("{}:insert:{}", self.id, element.id));
            Ok(())
        }

        fn after_canvas_updated(&mut self, _workspace: &mut Workspace) -> EngineResult<()> {
            self.log.borrow_mut().push(format!("{}:canvas", self.id));
            Ok(())
        }
    }

    fn recorder(id: &'static str, log: &Log) -> PluginFactory {
        let log = log.clone();
        plugin_factory(move |_| Box::new(Recorder { id, log }))
    }

    fn workspace() -> Workspace {
        let mut ws = Workspace::default();
        ws.load(Schema::with_root(Element::new("root", "Page"))).unwrap();
        ws.clear_events();
        ws
    }

    #[test]
    fn test_attach_runs_init_and_dedups() {
        let log = Log::default();
        let mut ws = workspace();
        let mut chain = PluginChain::new();

        assert!(chain.attach(recorder("a", &log), &mut ws).unwrap());
        assert!(!chain.attach(recorder("a", &log), &mut ws).unwrap());
        assert_eq!(chain.len(), 1);
        assert_eq!(*log.borrow(), vec!["a:init:1"]);
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let log = Log::default();
        let mut ws = workspace();
        let mut chain = PluginChain::new();
        chain.attach(recorder("a", &log), &mut ws).unwrap();
        chain.attach(recorder("b", &log), &mut ws).unwrap();
        log.borrow_mut().clear();

        let event = LifecycleEvent::AfterInsertMaterial {
            id: "root".into(),
            origin: InsertOrigin::Load,
        };
        chain.dispatch(&mut ws, &event).unwrap();
        chain.dispatch(&mut ws, &LifecycleEvent::AfterCanvasUpdated).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["a:insert:root", "b:insert:root", "a:canvas", "b:canvas"]
        );
    }

    struct BrokenInit;

    impl Plugin for BrokenInit {
        fn id(&self) -> Option<&str> {
            Some("broken")
        }

        fn init(&mut self, _workspace: &mut Workspace) -> EngineResult<()> {
            Err(EngineError::Config("missing setting".into()))
        }
    }

    #[test]
    fn test_failed_init_is_not_attached() {
        let mut ws = workspace();
        let mut chain = PluginChain::new();
        let err = chain
            .attach(plugin_factory(|_| Box::new(BrokenInit)), &mut ws)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Plugin { ref plugin, hook: "init", .. } if plugin == "broken"
        ));
        assert!(chain.is_empty());
    }

    struct Veto;

    impl Plugin for Veto {
        fn before_canvas_updated(&mut self, _workspace: &Workspace) -> EngineResult<()> {
            Err(EngineError::Config("locked".into()))
        }

        fn after_canvas_updated(&mut self, workspace: &mut Workspace) -> EngineResult<()> {
            workspace.set_state(state_patch("root".into(), "seen", json!(true)));
            Ok(())
        }
    }

    #[test]
    fn test_hook_errors_are_wrapped() {
        let mut ws = workspace();
        let mut chain = PluginChain::new();
        chain.attach(plugin_factory(|_| Box::new(Veto)), &mut ws).unwrap();

        let err = chain.before_canvas_updated(&ws).unwrap_err();
        match err {
            EngineError::Plugin { plugin, hook, message } => {
                assert_eq!(plugin, "anonymous");
                assert_eq!(hook, "before_canvas_updated");
                assert!(message.contains("locked"));
            }
            other => panic!("unexpected error: {other}"),
        }

        chain.dispatch(&mut ws, &LifecycleEvent::AfterCanvasUpdated).unwrap();
        assert_eq!(ws.get_state(&"root".into()).len(), 1);
    }
}
