//! Rendering through a component registry
//!
//! The engine does not draw anything itself. A host registers one
//! [`Component`] per element type and [`render`] folds the element graph
//! bottom-up into whatever output type the host uses. The fold keeps its
//! own stack, so tree depth is limited by memory rather than the call stack.

use crate::error::{EngineError, EngineResult};
use crate::state_store::{ContextSetter, StateEntry, StateValue, DROP_PLACEHOLDER_KEY, MODE_KEY, SET_CONTEXT_VALUES_KEY};
use crate::workspace::Workspace;
use serde_json::Value;
use std::collections::HashMap;
use tango_types::{Element, ElementId, Props};

/// Props handed to a component: declared props plus injected state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedProps {
    pub props: Props,
    pub injected: StateEntry,
}

impl ResolvedProps {
    /// A declared prop
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// An injected state value
    pub fn injected(&self, key: &str) -> Option<&StateValue> {
        self.injected.get(key)
    }

    pub fn mode(&self) -> Option<&str> {
        self.injected(MODE_KEY)
            .and_then(StateValue::as_value)
            .and_then(Value::as_str)
    }

    pub fn drop_placeholder(&self) -> bool {
        self.injected(DROP_PLACEHOLDER_KEY)
            .and_then(StateValue::as_value)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn context_setter(&self) -> Option<&ContextSetter> {
        self.injected(SET_CONTEXT_VALUES_KEY)
            .and_then(StateValue::as_context_setter)
    }
}

/// Renders one element type into `R`
pub trait Component<R> {
    fn render(&self, element: &Element, props: ResolvedProps, children: Vec<R>) -> R;
}

impl<R, F> Component<R> for F
where
    F: Fn(&Element, ResolvedProps, Vec<R>) -> R,
{
    fn render(&self, element: &Element, props: ResolvedProps, children: Vec<R>) -> R {
        self(element, props, children)
    }
}

/// Components keyed by element type, with an optional fallback
pub struct ComponentRegistry<R> {
    components: HashMap<String, Box<dyn Component<R>>>,
    fallback: Option<Box<dyn Component<R>>>,
}

impl<R> ComponentRegistry<R> {
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
            fallback: None,
        }
    }

    pub fn register(&mut self, element_type: impl Into<String>, component: impl Component<R> + 'static) {
        self.components.insert(element_type.into(), Box::new(component));
    }

    /// Component used for types without a registration
    pub fn set_fallback(&mut self, component: impl Component<R> + 'static) {
        self.fallback = Some(Box::new(component));
    }

    pub fn contains(&self, element_type: &str) -> bool {
        self.components.contains_key(element_type)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn lookup(&self, element_type: &str) -> Option<&dyn Component<R>> {
        self.components
            .get(element_type)
            .or(self.fallback.as_ref())
            .map(|c| c.as_ref())
    }
}

impl<R> Default for ComponentRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the whole graph; `None` when nothing is loaded
pub fn render<R>(workspace: &Workspace, registry: &ComponentRegistry<R>) -> EngineResult<Option<R>> {
    match workspace.root_id() {
        Some(root) => render_element(workspace, registry, root).map(Some),
        None => Ok(None),
    }
}

/// Render the subtree rooted at `id`
pub fn render_element<R>(
    workspace: &Workspace,
    registry: &ComponentRegistry<R>,
    id: &ElementId,
) -> EngineResult<R> {
    enum Frame<'a, R> {
        Enter(&'a ElementId),
        Exit(&'a Element, &'a dyn Component<R>),
    }

    let mut frames = vec![Frame::Enter(id)];
    let mut rendered: Vec<R> = Vec::new();

    while let Some(frame) = frames.pop() {
        match frame {
            Frame::Enter(id) => {
                let element = workspace
                    .get_element(id)
                    .ok_or_else(|| EngineError::ElementNotFound(id.clone()))?;
                let component = registry
                    .lookup(&element.element_type)
                    .ok_or_else(|| EngineError::UnknownComponent(element.element_type.clone()))?;
                frames.push(Frame::Exit(element, component));
                // Reversed so the first child is rendered first
                for child in workspace.children_of(id).iter().rev() {
                    frames.push(Frame::Enter(child));
                }
            }
            Frame::Exit(element, component) => {
                let count = workspace.children_of(&element.id).len();
                let children = rendered.split_off(rendered.len() - count);
                let props = ResolvedProps {
                    props: element.props.clone(),
                    injected: workspace.get_state(&element.id),
                };
                rendered.push(component.render(element, props, children));
            }
        }
    }

    rendered
        .pop()
        .ok_or_else(|| EngineError::ElementNotFound(id.clone()))
}
