//! Element graph: arena of live elements with a parent/children index
//!
//! Elements are stored by id. The tree shape lives in two maps kept in
//! sync: ordered children per parent and the single parent per child.
//! Mutating methods are crate-private; callers validate through the
//! workspace before anything here changes.

use std::collections::{BTreeMap, HashMap, HashSet};
use tango_types::{Element, ElementDef, ElementId, Layout, Props, Schema, SchemaResult};

/// The live element tree of one engine instance
#[derive(Clone, Debug, Default)]
pub struct ElementGraph {
    nodes: HashMap<ElementId, Element>,
    children: HashMap<ElementId, Vec<ElementId>>,
    parents: HashMap<ElementId, ElementId>,
    root: Option<ElementId>,
}

impl ElementGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a schema, validating it first
    pub fn from_schema(schema: &Schema) -> SchemaResult<Self> {
        let order = schema.preorder()?;
        let mut graph = Self::new();

        for id in &order {
            if let Some(def) = schema.elements.get(id) {
                graph.nodes.insert(id.clone(), def.to_element(id));
            }
            let kids = schema.layout.children(id).to_vec();
            for child in &kids {
                graph.parents.insert(child.clone(), id.clone());
            }
            if !kids.is_empty() {
                graph.children.insert(id.clone(), kids);
            }
        }
        graph.root = order.into_iter().next();
        Ok(graph)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn root(&self) -> Option<&ElementId> {
        self.root.as_ref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.nodes.get(id)
    }

    pub fn parent_of(&self, id: &ElementId) -> Option<&ElementId> {
        self.parents.get(id)
    }

    /// Ordered children of `id`, empty for leaves and unknown ids
    pub fn children_of(&self, id: &ElementId) -> &[ElementId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every element id in depth-first pre-order from the root
    pub fn preorder(&self) -> Vec<ElementId> {
        match &self.root {
            Some(root) => self.subtree(root),
            None => Vec::new(),
        }
    }

    /// `id` and all its descendants in pre-order
    pub fn subtree(&self, id: &ElementId) -> Vec<ElementId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current.clone());
            stack.extend(self.children_of(current).iter().rev());
        }
        order
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: &ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut current = self.parents.get(id);
        while let Some(parent) = current {
            out.push(parent.clone());
            current = self.parents.get(parent);
        }
        out
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: &ElementId, id: &ElementId) -> bool {
        if ancestor == id {
            return true;
        }
        let mut current = self.parents.get(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parents.get(parent);
        }
        false
    }

    /// Position of `id` among its siblings
    pub fn index_in_parent(&self, id: &ElementId) -> Option<usize> {
        let parent = self.parents.get(id)?;
        self.children_of(parent).iter().position(|c| c == id)
    }

    /// Snapshot the layout tree
    pub fn to_layout(&self) -> Layout {
        let structure: BTreeMap<ElementId, Vec<ElementId>> = self
            .children
            .iter()
            .filter(|(_, kids)| !kids.is_empty())
            .map(|(id, kids)| (id.clone(), kids.clone()))
            .collect();
        Layout {
            root: self.root.clone(),
            structure,
        }
    }

    /// Snapshot the graph as a schema document without extensions
    pub fn to_schema(&self) -> Schema {
        let elements = self
            .nodes
            .iter()
            .map(|(id, element)| (id.clone(), ElementDef::from(element.clone())))
            .collect();
        Schema {
            elements,
            layout: self.to_layout(),
            extensions: serde_json::Map::new(),
        }
    }

    // ── Mutations (pre-validated) ────────────────────────────────────

    /// Attach a new element under `parent` at `index`, clamped to the
    /// child count. Returns the index actually used.
    pub(crate) fn insert(&mut self, element: Element, parent: &ElementId, index: usize) -> usize {
        let id = element.id.clone();
        self.nodes.insert(id.clone(), element);
        self.attach(id, parent, index)
    }

    /// Detach `id` and re-attach it under `parent` at `index`. The index
    /// is clamped to the child count after detaching.
    pub(crate) fn move_to(&mut self, id: &ElementId, parent: &ElementId, index: usize) -> usize {
        self.detach(id);
        self.attach(id.clone(), parent, index)
    }

    /// Remove `id` and its descendants, returning the removed ids in
    /// pre-order
    pub(crate) fn remove_subtree(&mut self, id: &ElementId) -> Vec<ElementId> {
        let removed = self.subtree(id);
        if removed.is_empty() {
            return removed;
        }
        self.detach(id);

        let gone: HashSet<&ElementId> = removed.iter().collect();
        for rid in &gone {
            self.nodes.remove(*rid);
            self.children.remove(*rid);
            self.parents.remove(*rid);
        }
        if self.root.as_ref().is_some_and(|r| gone.contains(r)) {
            self.root = None;
        }
        removed
    }

    /// Replace the props of `id`; false when the element is unknown
    pub(crate) fn set_props(&mut self, id: &ElementId, props: Props) -> bool {
        match self.nodes.get_mut(id) {
            Some(element) => {
                element.props = props;
                true
            }
            None => false,
        }
    }

    fn attach(&mut self, id: ElementId, parent: &ElementId, index: usize) -> usize {
        let kids = self.children.entry(parent.clone()).or_default();
        let index = index.min(kids.len());
        kids.insert(index, id.clone());
        self.parents.insert(id, parent.clone());
        index
    }

    fn detach(&mut self, id: &ElementId) {
        if let Some(parent) = self.parents.remove(id) {
            if let Some(kids) = self.children.get_mut(&parent) {
                kids.retain(|c| c != id);
                if kids.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
    }
}
