//! # spark-form
//!
//! Schema-driven form synthesis for Rust.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! spark-form reflects over a message's schema and builds a tree of editable
//! widgets, one per field, then writes edited values back into the message.
//! Widgets live in an arena indexed by id; a registry maps each scoped field
//! path (`link::inertial::mass`) to its widget. Every control value is a
//! signal, so a rendering surface binds to it with `effect`/`derived`.
//!
//! ```text
//! Message → synthesize → Widget arena + path registry → commit → Message
//!                              ↑
//!                 edit / edit_control → ValueChanged events
//! ```
//!
//! Records with a recognized shape (vector, color, pose, geometry, density)
//! get a single composite widget; other records become collapsible groups of
//! their fields.
//!
//! ## Modules
//!
//! - [`types`] - Core value types (Vector3, Pose, GeometryValue, Rgba, etc.)
//! - [`schema`] - Schema pool, builder and the dynamic [`schema::Message`]
//! - [`composite`] - Composite type recognition and conversion
//! - [`widgets`] - Widget kinds, controls and the widget factory
//! - [`engine`] - Registry, synthesis, commit and events
//! - [`form`] - The [`MessageForm`] facade
//! - [`theme`] / [`policy`] / [`config`] - Styling, ranges, units and TOML config

pub mod composite;
pub mod config;
pub mod engine;
pub mod error;
pub mod form;
pub mod policy;
pub mod schema;
pub mod theme;
pub mod types;
pub mod widgets;

// Re-export commonly used items
pub use types::*;

pub use config::FormConfig;
pub use error::{FormError, FormResult};
pub use form::MessageForm;

pub use engine::{
    Cleanup, CommitReport, EventChannel, SynthesisMode, SynthesisReport, ValueChanged,
    WidgetRegistry, commit, synthesize, synthesize_merged,
};

pub use policy::{FieldPolicy, UnitRule, ValueRange};

pub use schema::{
    FieldDescriptor, FieldKind, FieldLabel, Message, SchemaPool, Value, scoped_path,
};

pub use theme::{Theme, get_preset, preset_names};

pub use widgets::{Control, Widget, WidgetFactory, WidgetFlags, WidgetId, WidgetKind};
