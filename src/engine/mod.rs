//! Form Engine - widget arena, synthesis, commit and change events.
//!
//! The engine manages the core data flow:
//! - Registry: widget arena, scoped path ↔ id mapping, parent links
//! - Synthesis: message → widget tree (full load or partial update)
//! - Commit: widget tree → message, honoring read-only subtrees
//! - Events: value-changed notifications to subscribers
//!
//! # Architecture
//!
//! Widgets are NOT linked objects. They are indices into one arena, and the
//! tree lives in the registry's parent and child indexes:
//!
//! ```text
//! Index 0: Record (root)
//! Index 1: Double "mass"          parent=0
//! Index 2: Pose   "pose"          parent=3
//! Index 3: Group  "pose"          parent=0
//! ```
//!
//! This keeps paths, tree links and widgets free of reference cycles.

pub mod commit;
pub mod events;
pub mod registry;
pub mod synthesize;

pub use commit::{CommitReport, commit};
pub use events::{Cleanup, EventChannel, ValueChanged, ValueHandler};
pub use registry::WidgetRegistry;
pub use synthesize::{SynthesisMode, SynthesisReport, joint_type, synthesize, synthesize_merged};
