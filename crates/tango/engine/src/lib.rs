//! Tango composition engine
//!
//! The engine turns a [`Schema`](tango_types::Schema) into a live element
//! graph, lets plugins observe and decorate it, and applies layout edits
//! coming from drag gestures.
//!
//! # Architecture
//!
//! - [`Workspace`]: the mutable core. Graph, state store, context store,
//!   material registry, evaluator and the lifecycle event queue.
//! - [`Engine`]: the host API. Wraps a workspace and a [`PluginChain`], runs
//!   `before_*` hooks ahead of each mutation and dispatches queued
//!   `after_*` events once it is applied.
//! - [`Plugin`]: lifecycle participant, created by a factory that sees the
//!   workspace.
//! - [`Evaluator`]: resolves [`HyperValue`](tango_types::HyperValue)s,
//!   running expression and code text through a [`LogicExecutor`].
//! - [`DragSession`]: drag/drop state machine producing moves and inserts.
//! - [`ComponentRegistry`] and [`render`]: fold the graph into host output.
//!
//! # Example
//!
//! ```rust
//! use tango_engine::*;
//! use tango_types::{Element, Material, Schema};
//!
//! let mut schema = Schema::with_root(Element::new("page", "Page"));
//! schema.add_child("page", Element::new("form", "Form"));
//! schema.add_child("form", Element::new("ok", "Button"));
//!
//! let mut engine = Engine::builder()
//!     .material(Material::container("Page"))
//!     .material(Material::container("Form"))
//!     .schema(schema)
//!     .build()
//!     .unwrap();
//!
//! engine.move_element(&"ok".into(), &"page".into(), 0).unwrap();
//! assert_eq!(engine.parent_of(&"ok".into()).unwrap().as_str(), "page");
//!
//! // Moving a container under its own child is rejected
//! assert!(engine.move_element(&"form".into(), &"form".into(), 0).is_err());
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod context_store;
pub mod drag;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod plugin;
pub mod registry;
pub mod render;
pub mod state_store;
pub mod workspace;

// Re-export main types
pub use config::EngineConfig;
pub use context_store::{ContextRecord, ContextStore};
pub use drag::{DragOrigin, DragPayload, DragSession, DragState, DropOutcome, Placement, PointerTarget};
pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, EngineResult, EvaluationError, ExecutorError, InvalidDropTargetError};
pub use evaluator::{Evaluated, Evaluator, LogicExecutor, Scope, Snippet};
pub use graph::ElementGraph;
pub use plugin::{plugin_factory, InsertOrigin, Plugin, PluginChain, PluginFactory};
pub use registry::MaterialRegistry;
pub use render::{render, render_element, Component, ComponentRegistry, ResolvedProps};
pub use state_store::{
    state_patch, ContextSetter, StateEntry, StatePatch, StateStore, StateValue,
    DROP_PLACEHOLDER_KEY, MODE_KEY, SET_CONTEXT_VALUES_KEY,
};
pub use workspace::{LifecycleEvent, Workspace};
