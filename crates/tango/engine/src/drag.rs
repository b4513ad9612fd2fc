//! Drag/drop layout mutation
//!
//! A [`DragSession`] tracks one gesture:
//! `Idle → Dragging → (Dropped | Cancelled)`. While dragging, the pointer
//! reports the stack of elements under it; the innermost element that can
//! take the payload becomes the drop target. The session highlights it via
//! the `tg_dropPlaceholder` state key and, on drop, moves or inserts the
//! payload through the engine.

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::state_store::{state_patch, DROP_PLACEHOLDER_KEY};
use crate::workspace::Workspace;
use serde_json::Value;
use tango_types::{Element, ElementId, Material, Props};

/// Where a dragged element comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOrigin {
    /// An element already on the canvas
    Canvas,
    /// A new element from the palette
    Palette,
}

/// What is being dragged
#[derive(Clone, Debug, PartialEq)]
pub struct DragPayload {
    pub id: ElementId,
    pub element_type: String,
    pub props: Props,
    pub material: Option<Material>,
    pub origin: DragOrigin,
}

impl DragPayload {
    /// Drag an element that is already on the canvas
    pub fn from_element(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            element_type: element.element_type.clone(),
            props: element.props.clone(),
            material: element.material.clone(),
            origin: DragOrigin::Canvas,
        }
    }

    /// Drag a new element of `element_type` from the palette
    pub fn from_palette(element_type: impl Into<String>, props: Props) -> Self {
        let element_type = element_type.into();
        Self {
            id: ElementId::generate(&element_type),
            element_type,
            props,
            material: None,
            origin: DragOrigin::Palette,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// The element a palette drop creates
    pub fn to_element(&self) -> Element {
        Element {
            id: self.id.clone(),
            element_type: self.element_type.clone(),
            props: self.props.clone(),
            material: self.material.clone(),
            context_config: None,
        }
    }
}

/// Side of the hovered element the pointer is on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// What the pointer is over
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerTarget {
    /// Elements under the pointer, outermost first
    pub stack: Vec<ElementId>,
    /// The hovered element, used to pick the insertion index
    pub over: Option<(ElementId, Placement)>,
}

impl PointerTarget {
    pub fn new(stack: impl IntoIterator<Item = impl Into<ElementId>>) -> Self {
        Self {
            stack: stack.into_iter().map(Into::into).collect(),
            over: None,
        }
    }

    pub fn over(mut self, id: impl Into<ElementId>, placement: Placement) -> Self {
        self.over = Some((id.into(), placement));
        self
    }
}

/// Where a drop landed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropOutcome {
    pub element: ElementId,
    pub parent: ElementId,
    pub index: usize,
}

/// Phase of a drag session
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragPayload),
    Dropped(DropOutcome),
    Cancelled,
}

/// One drag gesture
#[derive(Clone, Debug, Default)]
pub struct DragSession {
    state: DragState,
    placeholder: Option<ElementId>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn payload(&self) -> Option<&DragPayload> {
        match &self.state {
            DragState::Dragging(payload) => Some(payload),
            _ => None,
        }
    }

    /// The element currently highlighted as drop target
    pub fn placeholder(&self) -> Option<&ElementId> {
        self.placeholder.as_ref()
    }

    /// Begin dragging `payload`
    pub fn start(&mut self, payload: DragPayload) -> EngineResult<()> {
        if self.is_dragging() {
            return Err(EngineError::DragInProgress);
        }
        tracing::debug!(element_id = %payload.id, origin = ?payload.origin, "Drag started");
        self.state = DragState::Dragging(payload);
        Ok(())
    }

    /// Resolve the drop target for `pointer` without changing anything
    pub fn resolve_target(&self, workspace: &Workspace, pointer: &PointerTarget) -> Option<DropOutcome> {
        let payload = self.payload()?;
        resolve(workspace, payload, pointer)
    }

    /// Update the placeholder for the current pointer position
    ///
    /// Returns the resolved target parent, if any.
    pub fn hover(&mut self, engine: &mut Engine, pointer: &PointerTarget) -> EngineResult<Option<ElementId>> {
        let Some(payload) = self.payload() else {
            return Err(EngineError::NoActiveDrag);
        };
        let target = resolve(engine, payload, pointer).map(|outcome| outcome.parent);

        if target != self.placeholder {
            self.clear_placeholder(engine);
            if let Some(parent) = &target {
                engine.set_state(state_patch(parent.clone(), DROP_PLACEHOLDER_KEY, Value::Bool(true)));
            }
            self.placeholder = target.clone();
        }
        Ok(target)
    }

    /// Drop the payload at `pointer`
    ///
    /// Without a valid target the session is cancelled and the graph is
    /// left as it was. A rejected move or insert also cancels the session
    /// and returns the error.
    pub fn drop(&mut self, engine: &mut Engine, pointer: &PointerTarget) -> EngineResult<Option<DropOutcome>> {
        let Some(payload) = self.payload().cloned() else {
            return Err(EngineError::NoActiveDrag);
        };
        self.clear_placeholder(engine);

        let Some(outcome) = resolve(engine, &payload, pointer) else {
            tracing::debug!(element_id = %payload.id, "Drop without a valid target");
            self.state = DragState::Cancelled;
            return Ok(None);
        };

        let result = match payload.origin {
            DragOrigin::Canvas => engine.move_element(&payload.id, &outcome.parent, outcome.index),
            DragOrigin::Palette => {
                engine.insert_element(payload.to_element(), &outcome.parent, outcome.index)
            }
        };

        match result {
            Ok(index) => {
                let outcome = DropOutcome { index, ..outcome };
                tracing::debug!(
                    element_id = %outcome.element,
                    parent = %outcome.parent,
                    index = outcome.index,
                    "Drop completed"
                );
                self.state = DragState::Dropped(outcome.clone());
                Ok(Some(outcome))
            }
            Err(err) => {
                self.state = DragState::Cancelled;
                Err(err)
            }
        }
    }

    /// Abandon the gesture
    pub fn cancel(&mut self, engine: &mut Engine) {
        self.clear_placeholder(engine);
        if self.is_dragging() {
            self.state = DragState::Cancelled;
        }
    }

    /// Return to `Idle` after a finished gesture
    pub fn reset(&mut self) {
        if !self.is_dragging() {
            self.state = DragState::Idle;
        }
    }

    fn clear_placeholder(&mut self, engine: &mut Engine) {
        if let Some(previous) = self.placeholder.take() {
            engine.set_state(state_patch(previous, DROP_PLACEHOLDER_KEY, Value::Bool(false)));
        }
    }
}

/// Innermost element on the pointer stack that can take `payload`
fn resolve(workspace: &Workspace, payload: &DragPayload, pointer: &PointerTarget) -> Option<DropOutcome> {
    let moving = payload.origin == DragOrigin::Canvas;
    let graph = workspace.graph();

    for candidate in pointer.stack.iter().rev() {
        if !graph.contains(candidate) {
            continue;
        }
        if moving && graph.is_ancestor_or_self(&payload.id, candidate) {
            continue;
        }
        let same_parent = moving && graph.parent_of(&payload.id) == Some(candidate);
        if !same_parent && !workspace.accepts_drop(candidate, &payload.element_type) {
            continue;
        }

        let children = graph.children_of(candidate);
        let hovered = pointer.over.as_ref().and_then(|(over, placement)| {
            children.iter().position(|c| c == over).map(|pos| match placement {
                Placement::Before => pos,
                Placement::After => pos + 1,
            })
        });
        let mut index = hovered.unwrap_or(children.len());

        // Indices shift left once the source is detached from this parent
        if same_parent {
            if let Some(current) = children.iter().position(|c| c == &payload.id) {
                if current < index {
                    index -= 1;
                }
            }
        }

        return Some(DropOutcome {
            element: payload.id.clone(),
            parent: candidate.clone(),
            index,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_store::StateValue;
    use serde_json::json;
    use tango_types::Schema;

    fn engine() -> Engine {
        let mut schema = Schema::with_root(Element::new("root", "Page"));
        schema
            .add_child("root", Element::new("list", "List"))
            .add_child("root", Element::new("note", "Text"))
            .add_child("list", Element::new("x", "Item"))
            .add_child("list", Element::new("y", "Item"))
            .add_child("list", Element::new("z", "Item"));
        Engine::builder()
            .material(Material::container("Page"))
            .material(Material::new("List").with_drop_types(["Item"]))
            .schema(schema)
            .build()
            .unwrap()
    }

    fn drag(engine: &Engine, id: &str) -> DragSession {
        let mut session = DragSession::new();
        let element = engine.get_element(&id.into()).unwrap();
        session.start(DragPayload::from_element(element)).unwrap();
        session
    }

    fn placeholder_flag(engine: &Engine, id: &str) -> Option<StateValue> {
        engine.state_value(&id.into(), DROP_PLACEHOLDER_KEY)
    }

    #[test]
    fn test_start_twice_fails() {
        let engine = engine();
        let mut session = drag(&engine, "x");
        let again = DragPayload::from_element(engine.get_element(&"y".into()).unwrap());
        assert!(matches!(session.start(again), Err(EngineError::DragInProgress)));
    }

    #[test]
    fn test_reorder_after_sibling() {
        let mut engine = engine();
        let mut session = drag(&engine, "x");
        let pointer = PointerTarget::new(["root", "list", "z"]).over("z", Placement::After);

        let outcome = session.drop(&mut engine, &pointer).unwrap().unwrap();
        assert_eq!(outcome.parent, ElementId::new("list"));
        assert_eq!(outcome.index, 2);
        assert_eq!(
            engine.children_of(&"list".into()),
            &[ElementId::new("y"), ElementId::new("z"), ElementId::new("x")]
        );
        assert!(matches!(session.state(), DragState::Dropped(_)));
    }

    #[test]
    fn test_reorder_before_sibling() {
        let mut engine = engine();
        let mut session = drag(&engine, "z");
        let pointer = PointerTarget::new(["root", "list", "x"]).over("x", Placement::Before);
        session.drop(&mut engine, &pointer).unwrap();
        assert_eq!(
            engine.children_of(&"list".into()),
            &[ElementId::new("z"), ElementId::new("x"), ElementId::new("y")]
        );
    }

    #[test]
    fn test_rejecting_targets_are_skipped() {
        let mut engine = engine();
        // Text is not a container, so the drop falls through to the page
        let mut session = drag(&engine, "x");
        let pointer = PointerTarget::new(["root", "note"]);
        let outcome = session.drop(&mut engine, &pointer).unwrap().unwrap();
        assert_eq!(outcome.parent, ElementId::new("root"));
        assert_eq!(outcome.index, 2);
    }

    #[test]
    fn test_no_valid_target_cancels() {
        let mut engine = engine();
        let before = engine.to_schema();
        // a List only takes Items
        let mut session = drag(&engine, "note");
        let pointer = PointerTarget::new(["list"]);
        assert!(session.drop(&mut engine, &pointer).unwrap().is_none());
        assert_eq!(session.state(), &DragState::Cancelled);
        assert_eq!(engine.to_schema(), before);
    }

    #[test]
    fn test_cannot_drop_into_own_subtree() {
        let mut engine = engine();
        let mut session = drag(&engine, "list");
        let pointer = PointerTarget::new(["root", "list", "x"]);
        let outcome = session.drop(&mut engine, &pointer).unwrap().unwrap();
        // list and its children are skipped; root takes it
        assert_eq!(outcome.parent, ElementId::new("root"));
    }

    #[test]
    fn test_palette_insert() {
        let mut engine = engine();
        let mut session = DragSession::new();
        let payload = DragPayload::from_palette("Item", json!({"label": "new"}).as_object().unwrap().clone());
        let id = payload.id.clone();
        assert!(id.as_str().starts_with("Item-"));
        session.start(payload).unwrap();

        let pointer = PointerTarget::new(["root", "list", "y"]).over("y", Placement::Before);
        session.drop(&mut engine, &pointer).unwrap();
        assert_eq!(engine.parent_of(&id), Some(&ElementId::new("list")));
        assert_eq!(engine.children_of(&"list".into())[1], id);
    }

    #[test]
    fn test_hover_moves_placeholder() {
        let mut engine = engine();
        let mut session = drag(&engine, "x");

        let target = session.hover(&mut engine, &PointerTarget::new(["root", "list"])).unwrap();
        assert_eq!(target, Some(ElementId::new("list")));
        assert_eq!(placeholder_flag(&engine, "list"), Some(StateValue::from(json!(true))));

        session.hover(&mut engine, &PointerTarget::new(["root", "note"])).unwrap();
        assert_eq!(placeholder_flag(&engine, "list"), Some(StateValue::from(json!(false))));
        assert_eq!(placeholder_flag(&engine, "root"), Some(StateValue::from(json!(true))));

        session.cancel(&mut engine);
        assert_eq!(placeholder_flag(&engine, "root"), Some(StateValue::from(json!(false))));
        assert_eq!(session.state(), &DragState::Cancelled);
        assert!(session.placeholder().is_none());
    }

    #[test]
    fn test_drop_without_drag() {
        let mut engine = engine();
        let mut session = DragSession::new();
        let err = session.drop(&mut engine, &PointerTarget::default()).unwrap_err();
        assert!(matches!(err, EngineError::NoActiveDrag));
    }
}
