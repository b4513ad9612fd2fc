//! Built-in plugins for the Tango composition engine
//!
//! - [`ModePlugin`]: injects the engine mode as `tg_mode`.
//! - [`ContextValuePlugin`]: injects a context setter as
//!   `tg_setContextValues`.
//! - [`PortalPlugin`]: opens overlays dropped from the palette.
//!
//! [`defaults`] returns all three factories in the order a designer
//! canvas attaches them.
//!
//! # Example
//!
//! ```rust
//! use tango_engine::{Engine, MODE_KEY};
//! use tango_types::{Element, Schema};
//!
//! let schema = Schema::with_root(Element::new("page", "Page"));
//! let mut builder = Engine::builder().schema(schema);
//! for factory in tango_plugins::defaults() {
//!     builder = builder.plugin(factory);
//! }
//! let engine = builder.build().unwrap();
//!
//! assert!(engine.state_value(&"page".into(), MODE_KEY).is_some());
//! assert_eq!(engine.plugins().len(), 3);
//! ```

#![deny(unsafe_code)]

pub mod context;
pub mod mode;
pub mod portal;

pub use context::ContextValuePlugin;
pub use mode::ModePlugin;
pub use portal::{PortalPlugin, OPEN_KEY};

use tango_engine::PluginFactory;

/// Factories for every built-in plugin
pub fn defaults() -> Vec<PluginFactory> {
    vec![
        ModePlugin::factory(),
        ContextValuePlugin::factory(),
        PortalPlugin::factory(),
    ]
}
