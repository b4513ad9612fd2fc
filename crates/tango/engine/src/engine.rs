//! Engine: the host-facing API over a workspace and its plugin chain
//!
//! Every structural mutation follows the same protocol: validate, give
//! the `before_*` hooks a chance to veto, apply the change to the
//! workspace, then drain the lifecycle events it queued through the
//! plugin chain until the queue is empty.

use crate::config::EngineConfig;
use crate::context_store::ContextRecord;
use crate::error::{EngineError, EngineResult};
use crate::evaluator::LogicExecutor;
use crate::graph::ElementGraph;
use crate::plugin::{PluginChain, PluginFactory};
use crate::state_store::{ContextSetter, StatePatch};
use crate::workspace::Workspace;
use std::ops::Deref;
use tango_types::{Element, ElementId, Material, Props, Schema};

/// A live composition engine
///
/// Read access goes through [`Deref`] to the [`Workspace`]; every mutation
/// is a method here so plugin hooks run around it.
pub struct Engine {
    workspace: Workspace,
    plugins: PluginChain,
}

impl Engine {
    /// Create an empty engine with no plugins
    pub fn new(config: EngineConfig) -> Self {
        Self {
            workspace: Workspace::new(config),
            plugins: PluginChain::new(),
        }
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn plugins(&self) -> &PluginChain {
        &self.plugins
    }

    /// Attach a plugin; `Ok(false)` when its id is already attached
    pub fn use_plugin(&mut self, factory: PluginFactory) -> EngineResult<bool> {
        let attached = self.plugins.attach(factory, &mut self.workspace)?;
        self.flush()?;
        Ok(attached)
    }

    pub fn register_material(&mut self, material: Material) {
        self.workspace.register_material(material);
    }

    pub fn set_executor(&mut self, executor: Box<dyn LogicExecutor>) {
        self.workspace.set_executor(executor);
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Validate and install a schema
    ///
    /// The previous schema stays installed if validation or a
    /// `before_canvas_updated` hook fails.
    pub fn load(&mut self, schema: Schema) -> EngineResult<()> {
        let graph = ElementGraph::from_schema(&schema)?;
        self.plugins.before_canvas_updated(&self.workspace)?;
        self.workspace.install(graph, schema.extensions);
        self.flush()
    }

    /// Merge state entries; ids not in the graph are skipped
    pub fn set_state(&mut self, patch: StatePatch) {
        self.workspace.set_state(patch);
    }

    pub fn set_context_value(&mut self, id: &ElementId, record: ContextRecord) {
        self.workspace.set_context_value(id, record);
    }

    /// Publish through a setter handed out by the context plugin
    pub fn publish_context(&mut self, setter: &ContextSetter, record: ContextRecord) {
        self.set_context_value(setter.element(), record);
    }

    /// Move `id` under `parent` at `index`, returning the index used
    pub fn move_element(
        &mut self,
        id: &ElementId,
        parent: &ElementId,
        index: usize,
    ) -> EngineResult<usize> {
        self.workspace.check_move(id, parent)?;
        self.plugins.before_canvas_updated(&self.workspace)?;
        let used = self.workspace.move_element(id, parent, index)?;
        self.flush()?;
        Ok(used)
    }

    /// Insert a new element under `parent` at `index`, returning the index used
    pub fn insert_element(
        &mut self,
        element: Element,
        parent: &ElementId,
        index: usize,
    ) -> EngineResult<usize> {
        self.workspace.check_insert(&element, parent)?;
        self.plugins
            .before_insert_material(&self.workspace, &element)?;
        self.plugins.before_canvas_updated(&self.workspace)?;
        let used = self.workspace.insert_element(element, parent, index)?;
        self.flush()?;
        Ok(used)
    }

    /// Remove `id` and its subtree; unknown ids are a no-op
    pub fn remove_element(&mut self, id: &ElementId) -> EngineResult<Vec<ElementId>> {
        if !self.workspace.contains(id) {
            return Ok(Vec::new());
        }
        if self.workspace.root_id() == Some(id) {
            return Err(EngineError::RootRemoval(id.clone()));
        }
        self.plugins.before_canvas_updated(&self.workspace)?;
        let removed = self.workspace.remove_element(id)?;
        self.flush()?;
        Ok(removed)
    }

    /// Replace the props of `id`
    pub fn update_props(&mut self, id: &ElementId, props: Props) -> EngineResult<()> {
        if !self.workspace.contains(id) {
            return Err(EngineError::ElementNotFound(id.clone()));
        }
        self.plugins.before_canvas_updated(&self.workspace)?;
        self.workspace.update_props(id, props)?;
        self.flush()
    }

    /// Deliver queued lifecycle events until none remain
    ///
    /// On a hook error the remaining events are dropped.
    fn flush(&mut self) -> EngineResult<()> {
        while let Some(event) = self.workspace.next_event() {
            if let Err(err) = self.plugins.dispatch(&mut self.workspace, &event) {
                self.workspace.clear_events();
                return Err(err);
            }
        }
        Ok(())
    }
}

impl Deref for Engine {
    type Target = Workspace;

    fn deref(&self) -> &Workspace {
        &self.workspace
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Assembles an engine: configuration, materials, executor, schema and
/// plugins
///
/// On [`build`](EngineBuilder::build) the schema is installed first, so
/// every plugin's `init` sees the loaded elements, and the load events are
/// delivered once all plugins are attached.
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    materials: Vec<Material>,
    executor: Option<Box<dyn LogicExecutor>>,
    schema: Option<Schema>,
    plugins: Vec<PluginFactory>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    pub fn materials(mut self, materials: impl IntoIterator<Item = Material>) -> Self {
        self.materials.extend(materials);
        self
    }

    pub fn executor(mut self, executor: Box<dyn LogicExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn plugin(mut self, factory: PluginFactory) -> Self {
        self.plugins.push(factory);
        self
    }

    pub fn build(self) -> EngineResult<Engine> {
        let mut engine = Engine::new(self.config);
        for material in self.materials {
            engine.workspace.register_material(material);
        }
        if let Some(executor) = self.executor {
            engine.workspace.set_executor(executor);
        }
        if let Some(schema) = self.schema {
            engine.workspace.load(schema)?;
        }
        for factory in self.plugins {
            engine.plugins.attach(factory, &mut engine.workspace)?;
        }
        engine.flush()?;
        Ok(engine)
    }
}
