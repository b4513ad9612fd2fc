//! Domain types for the Tango composition engine
//!
//! Everything in this crate is pure data. The engine crate gives it
//! behavior; hosts and plugins exchange it across the engine API.
//!
//! # Key Concepts
//!
//! - **Schema**: the declarative document an engine loads. It names every
//!   element, the layout tree that arranges them, and free-form extensions.
//! - **Element**: one node of the composed UI tree, typed by the component
//!   kind that renders it.
//! - **Material**: the editor-side descriptor of an element type. It declares
//!   whether the type is a container and which element types it accepts as
//!   dropped children.
//! - **HyperValue**: a typed dynamic value (literal, expression, code,
//!   function, context reference) resolved at runtime by flow logic.
//! - **FlowDocument**: the node/edge graph authored in the logic editor.
//!
//! # Example
//!
//! ```rust
//! use tango_types::*;
//!
//! let schema: Schema = serde_json::from_str(r#"{
//!     "elements": {
//!         "page": { "type": "Page" },
//!         "btn": { "type": "Button", "props": { "text": "OK" } }
//!     },
//!     "layout": { "root": "page", "structure": { "page": ["btn"] } }
//! }"#).unwrap();
//!
//! schema.validate().unwrap();
//! assert_eq!(schema.preorder().unwrap().len(), 2);
//! ```

#![deny(unsafe_code)]

mod element;
mod errors;
mod flow;
mod hyper_value;
mod material;
mod schema;

pub use element::*;
pub use errors::*;
pub use flow::*;
pub use hyper_value::*;
pub use material::*;
pub use schema::*;
