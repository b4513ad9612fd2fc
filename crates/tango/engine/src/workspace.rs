//! Workspace: the mutable core of an engine
//!
//! The workspace owns the element graph, the state and context stores,
//! the material registry and the evaluator. Plugins receive it in their
//! hooks and may mutate it directly. Mutations never call plugins; they
//! queue lifecycle events which the [`Engine`](crate::Engine) dispatches
//! once the current hook has returned.

use crate::config::EngineConfig;
use crate::context_store::{ContextRecord, ContextStore};
use crate::error::{EngineError, EngineResult, EvaluationError, InvalidDropTargetError};
use crate::evaluator::{Evaluated, Evaluator, LogicExecutor, Scope};
use crate::graph::ElementGraph;
use crate::plugin::InsertOrigin;
use crate::registry::MaterialRegistry;
use crate::state_store::{StateEntry, StatePatch, StateStore, StateValue};
use std::collections::VecDeque;
use tango_types::{Element, ElementId, HyperValue, Material, Props, Schema};

/// Events queued by workspace mutations for the plugin chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    AfterInsertMaterial { id: ElementId, origin: InsertOrigin },
    AfterCanvasUpdated,
}

/// Graph, stores and registries of one engine instance
#[derive(Debug)]
pub struct Workspace {
    config: EngineConfig,
    materials: MaterialRegistry,
    graph: ElementGraph,
    state: StateStore,
    context: ContextStore,
    evaluator: Evaluator,
    extensions: serde_json::Map<String, serde_json::Value>,
    events: VecDeque<LifecycleEvent>,
}

impl Workspace {
    /// Create an empty workspace
    pub fn new(config: EngineConfig) -> Self {
        let evaluator = Evaluator::with_max_steps(config.max_evaluation_steps);
        Self {
            config,
            materials: MaterialRegistry::new(),
            graph: ElementGraph::new(),
            state: StateStore::new(),
            context: ContextStore::new(),
            evaluator,
            extensions: serde_json::Map::new(),
            events: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn register_material(&mut self, material: Material) {
        self.materials.register(material);
    }

    pub fn set_executor(&mut self, executor: Box<dyn LogicExecutor>) {
        self.evaluator.set_executor(executor);
    }

    pub fn graph(&self) -> &ElementGraph {
        &self.graph
    }

    // ── Schema ───────────────────────────────────────────────────────

    /// Validate and install `schema`
    ///
    /// On failure nothing changes. On success the stores are reset and an
    /// insert event is queued for every element in pre-order, followed by a
    /// canvas update.
    pub fn load(&mut self, schema: Schema) -> EngineResult<()> {
        let graph = ElementGraph::from_schema(&schema)?;
        self.install(graph, schema.extensions);
        Ok(())
    }

    pub(crate) fn install(
        &mut self,
        graph: ElementGraph,
        extensions: serde_json::Map<String, serde_json::Value>,
    ) {
        self.graph = graph;
        self.extensions = extensions;
        self.state.clear();
        self.context.clear();

        for id in self.graph.preorder() {
            self.events.push_back(LifecycleEvent::AfterInsertMaterial {
                id,
                origin: InsertOrigin::Load,
            });
        }
        self.events.push_back(LifecycleEvent::AfterCanvasUpdated);

        tracing::info!(
            root = ?self.graph.root().map(ElementId::as_str),
            elements = self.graph.len(),
            "Schema loaded"
        );
    }

    /// Snapshot the live graph as a schema document
    pub fn to_schema(&self) -> Schema {
        let mut schema = self.graph.to_schema();
        schema.extensions = self.extensions.clone();
        schema
    }

    pub fn extensions(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extensions
    }

    // ── Element queries ──────────────────────────────────────────────

    /// Snapshot of every element in pre-order from the root
    pub fn get_elements(&self) -> Vec<Element> {
        self.graph
            .preorder()
            .iter()
            .filter_map(|id| self.graph.get(id).cloned())
            .collect()
    }

    pub fn get_element(&self, id: &ElementId) -> Option<&Element> {
        self.graph.get(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.graph.contains(id)
    }

    pub fn element_count(&self) -> usize {
        self.graph.len()
    }

    pub fn root_id(&self) -> Option<&ElementId> {
        self.graph.root()
    }

    pub fn parent_of(&self, id: &ElementId) -> Option<&ElementId> {
        self.graph.parent_of(id)
    }

    pub fn children_of(&self, id: &ElementId) -> &[ElementId] {
        self.graph.children_of(id)
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: &ElementId) -> Vec<ElementId> {
        self.graph.ancestors(id)
    }

    // ── State ────────────────────────────────────────────────────────

    /// Merge each entry of `patch` into the state of its element
    ///
    /// Ids that are not in the graph are skipped.
    pub fn set_state(&mut self, patch: StatePatch) {
        for (id, entry) in patch {
            if !self.graph.contains(&id) {
                tracing::warn!(element_id = %id, "State patch for unknown element skipped");
                continue;
            }
            self.state.merge(&id, entry);
        }
    }

    /// Cloned state of `id`
    pub fn get_state(&self, id: &ElementId) -> StateEntry {
        self.state.get(id)
    }

    pub fn state_value(&self, id: &ElementId, key: &str) -> Option<StateValue> {
        self.state.value(id, key)
    }

    // ── Context values ───────────────────────────────────────────────

    /// Cloned context record of `id`, `{}` when nothing was published
    pub fn get_context_value(&self, id: &ElementId) -> ContextRecord {
        self.context.get(id)
    }

    /// Shallow-merge `record` into the context value of `id`
    pub fn set_context_value(&mut self, id: &ElementId, record: ContextRecord) {
        if !self.graph.contains(id) {
            tracing::warn!(element_id = %id, "Context value for unknown element skipped");
            return;
        }
        self.context.merge(id, record);
    }

    pub fn context_store(&self) -> &ContextStore {
        &self.context
    }

    // ── Evaluation ───────────────────────────────────────────────────

    /// Evaluate a hyper value against `scope` and the context store
    pub fn evaluate(&self, scope: &Scope, value: &HyperValue) -> Result<Evaluated, EvaluationError> {
        self.evaluator.evaluate(scope, value, &self.context)
    }

    // ── Drop targets ─────────────────────────────────────────────────

    /// The material governing `element`
    pub fn material_for<'a>(&'a self, element: &'a Element) -> Option<&'a Material> {
        self.materials.resolve(element)
    }

    /// Whether `target` accepts a dropped element of `source_type`
    ///
    /// Without a material the answer follows `strict_drop_targets`.
    pub fn accepts_drop(&self, target: &ElementId, source_type: &str) -> bool {
        let Some(element) = self.graph.get(target) else {
            return false;
        };
        match self.material_for(element) {
            Some(material) => material.accepts(source_type),
            None => !self.config.strict_drop_targets,
        }
    }

    /// Check that `id` may move under `parent`
    pub fn check_move(&self, id: &ElementId, parent: &ElementId) -> EngineResult<()> {
        let element = self
            .graph
            .get(id)
            .ok_or_else(|| EngineError::ElementNotFound(id.clone()))?;
        if !self.graph.contains(parent) {
            return Err(EngineError::ElementNotFound(parent.clone()));
        }
        if self.graph.root() == Some(id) {
            return Err(InvalidDropTargetError::RootImmovable(id.clone()).into());
        }
        if self.graph.is_ancestor_or_self(id, parent) {
            return Err(InvalidDropTargetError::Cycle {
                element: id.clone(),
                target: parent.clone(),
            }
            .into());
        }
        // Reordering within the current parent needs no acceptance
        let same_parent = self.graph.parent_of(id) == Some(parent);
        if !same_parent && !self.accepts_drop(parent, &element.element_type) {
            return Err(InvalidDropTargetError::Rejected {
                target: parent.clone(),
                element_type: element.element_type.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Check that `element` may be inserted under `parent`
    pub fn check_insert(&self, element: &Element, parent: &ElementId) -> EngineResult<()> {
        if self.graph.contains(&element.id) {
            return Err(EngineError::DuplicateElement(element.id.clone()));
        }
        if !self.graph.contains(parent) {
            return Err(EngineError::ElementNotFound(parent.clone()));
        }
        if !self.accepts_drop(parent, &element.element_type) {
            return Err(InvalidDropTargetError::Rejected {
                target: parent.clone(),
                element_type: element.element_type.clone(),
            }
            .into());
        }
        Ok(())
    }

    // ── Structural mutations ─────────────────────────────────────────

    /// Move `id` under `parent` at `index`, returning the index used
    pub fn move_element(
        &mut self,
        id: &ElementId,
        parent: &ElementId,
        index: usize,
    ) -> EngineResult<usize> {
        self.check_move(id, parent)?;
        let used = self.graph.move_to(id, parent, index);
        self.events.push_back(LifecycleEvent::AfterCanvasUpdated);
        tracing::debug!(element_id = %id, parent = %parent, index = used, "Element moved");
        Ok(used)
    }

    /// Insert a new element under `parent` at `index`, returning the index used
    pub fn insert_element(
        &mut self,
        element: Element,
        parent: &ElementId,
        index: usize,
    ) -> EngineResult<usize> {
        self.check_insert(&element, parent)?;
        let id = element.id.clone();
        let used = self.graph.insert(element, parent, index);
        self.events.push_back(LifecycleEvent::AfterInsertMaterial {
            id: id.clone(),
            origin: InsertOrigin::Palette,
        });
        self.events.push_back(LifecycleEvent::AfterCanvasUpdated);
        tracing::debug!(element_id = %id, parent = %parent, index = used, "Element inserted");
        Ok(used)
    }

    /// Remove `id` with its subtree, clearing their state and context
    ///
    /// Unknown ids are a no-op. The root cannot be removed.
    pub fn remove_element(&mut self, id: &ElementId) -> EngineResult<Vec<ElementId>> {
        if !self.graph.contains(id) {
            return Ok(Vec::new());
        }
        if self.graph.root() == Some(id) {
            return Err(EngineError::RootRemoval(id.clone()));
        }

        let removed = self.graph.remove_subtree(id);
        for rid in &removed {
            self.state.remove(rid);
            self.context.remove(rid);
        }
        self.events.push_back(LifecycleEvent::AfterCanvasUpdated);
        tracing::debug!(element_id = %id, removed = removed.len(), "Element removed");
        Ok(removed)
    }

    /// Replace the props of `id`
    pub fn update_props(&mut self, id: &ElementId, props: Props) -> EngineResult<()> {
        if !self.graph.set_props(id, props) {
            return Err(EngineError::ElementNotFound(id.clone()));
        }
        self.events.push_back(LifecycleEvent::AfterCanvasUpdated);
        Ok(())
    }

    // ── Event queue ──────────────────────────────────────────────────

    pub(crate) fn next_event(&mut self) -> Option<LifecycleEvent> {
        self.events.pop_front()
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of lifecycle events waiting for dispatch
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
