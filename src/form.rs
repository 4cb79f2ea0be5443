//! MessageForm - an editable form synthesized from one message.
//!
//! The form owns a working copy of the last loaded message, the widget tree
//! built from it and an event channel. The host loads a message, lets the
//! rendering surface forward user edits through [`MessageForm::edit`] and
//! [`MessageForm::edit_control`], and reads the result back with
//! [`MessageForm::msg`].
//!
//! # API
//!
//! - `load(msg)` - Rebuild the tree from scratch
//! - `update_from_msg(msg)` - Apply only the fields present in `msg`
//! - `msg()` - Commit edits and return the resulting message
//! - `edit(path, value)` / `edit_control(path, index, value)` - User edits
//! - `subscribe(handler)` - Value-changed notifications; returns cleanup
//!
//! # Example
//!
//! ```
//! use spark_form::schema::{Message, SchemaPool};
//! use spark_form::{FormConfig, MessageForm, WidgetValue};
//!
//! let pool = SchemaPool::builder()
//!     .record("Link", |r| r.string("name").double("mass"))
//!     .build()
//!     .unwrap();
//! let link = Message::new(&pool, "Link").unwrap();
//!
//! let mut form = MessageForm::new(FormConfig::default());
//! form.load(&link);
//! form.edit("mass", WidgetValue::Double(2.5)).unwrap();
//!
//! let edited = form.msg().unwrap();
//! assert_eq!(edited.get_f64("mass").unwrap(), 2.5);
//! ```

use std::cell::RefCell;

use tracing::warn;

use crate::config::FormConfig;
use crate::engine::{
    Cleanup, CommitReport, EventChannel, SynthesisMode, SynthesisReport, ValueChanged,
    WidgetRegistry, commit, joint_type, synthesize, synthesize_merged,
};
use crate::error::{FormError, FormResult};
use crate::schema::{Message, PATH_SEPARATOR};
use crate::types::{
    Color, ControlValue, GeometryShape, GeometryValue, Pose, Vector3, WidgetValue,
};
use crate::widgets::{ComboBox, Widget, WidgetFactory, WidgetId, WidgetKind, controls};

pub struct MessageForm {
    config: FormConfig,
    registry: WidgetRegistry,
    working: Option<Message>,
    events: EventChannel,
    diagnostics: RefCell<Vec<FormError>>,
}

impl Default for MessageForm {
    fn default() -> Self {
        Self::new(FormConfig::default())
    }
}

impl MessageForm {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            registry: WidgetRegistry::new(),
            working: None,
            events: EventChannel::new(),
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn report(&self, err: FormError) {
        self.diagnostics.borrow_mut().push(err);
    }

    fn report_all(&self, errors: &[FormError]) {
        self.diagnostics.borrow_mut().extend(errors.iter().cloned());
    }

    /// Errors reported since the last [`take_diagnostics`](Self::take_diagnostics).
    pub fn diagnostics(&self) -> Vec<FormError> {
        self.diagnostics.borrow().clone()
    }

    pub fn take_diagnostics(&self) -> Vec<FormError> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    // =========================================================================
    // Message in / out
    // =========================================================================

    /// Discard the current tree and build a new one from `msg`.
    pub fn load(&mut self, msg: &Message) -> SynthesisReport {
        self.registry.clear();
        self.working = Some(msg.clone());

        let joint = joint_type(msg);
        let report = synthesize(
            &mut self.registry,
            &self.config,
            msg,
            SynthesisMode::FullLoad,
            joint.as_deref(),
        );
        self.report_all(&report.errors);
        report
    }

    /// Merge the present fields of `msg` into the working copy and refresh
    /// only their widgets. Loads `msg` when nothing is loaded yet.
    pub fn update_from_msg(&mut self, msg: &Message) -> FormResult<SynthesisReport> {
        let Some(working) = self.working.as_mut() else {
            return Ok(self.load(msg));
        };
        working.merge_from(msg)?;

        let joint = joint_type(working);
        let report = synthesize_merged(&mut self.registry, &self.config, msg, working, joint.as_deref());
        self.report_all(&report.errors);
        Ok(report)
    }

    /// Commit the widget values into the working copy and return it.
    ///
    /// `None` when no message has been loaded.
    pub fn msg(&mut self) -> Option<Message> {
        self.commit()?;
        self.working.clone()
    }

    /// Commit the widget values into the working copy.
    pub fn commit(&mut self) -> Option<CommitReport> {
        let working = self.working.as_mut()?;
        let report = commit(&self.registry, working);
        self.diagnostics.borrow_mut().extend(report.errors.iter().cloned());
        Some(report)
    }

    // =========================================================================
    // Tree access
    // =========================================================================

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn widget(&self, path: &str) -> Option<&Widget> {
        self.registry.widget(path)
    }

    /// Number of widgets registered under a path.
    pub fn property_widget_count(&self) -> usize {
        self.registry.len()
    }

    pub fn root(&self) -> Option<WidgetId> {
        self.registry.root()
    }

    /// Every widget below the root, depth-first in display order.
    pub fn walk(&self) -> Vec<&Widget> {
        let Some(root) = self.registry.root() else {
            return Vec::new();
        };
        self.registry
            .descendants(root)
            .into_iter()
            .skip(1)
            .filter_map(|id| self.registry.get(id))
            .collect()
    }

    // =========================================================================
    // Typed values by path
    // =========================================================================

    fn set_typed(&self, path: &str, value: WidgetValue) -> FormResult<()> {
        self.registry.require(path)?.set_value(&value)
    }

    fn typed<T>(&self, path: &str, expected: &'static str, default: T, pick: impl FnOnce(WidgetValue) -> Option<T>) -> T {
        let value = match self.registry.require(path).and_then(Widget::value) {
            Ok(value) => value,
            Err(err) => {
                warn!(path, error = %err, "widget value unavailable");
                self.report(err);
                return default;
            }
        };
        let kind = value.kind_name();
        match pick(value) {
            Some(v) => v,
            None => {
                let err = FormError::ShapeMismatch {
                    path: path.to_string(),
                    kind,
                    expected,
                };
                warn!(path, error = %err, "widget value has another type");
                self.report(err);
                default
            }
        }
    }

    pub fn set_int_value(&self, path: &str, value: i64) -> FormResult<()> {
        self.set_typed(path, WidgetValue::Int(value))
    }

    pub fn int_value(&self, path: &str) -> i64 {
        self.typed(path, "int", 0, |v| match v {
            WidgetValue::Int(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_uint_value(&self, path: &str, value: u64) -> FormResult<()> {
        self.set_typed(path, WidgetValue::UInt(value))
    }

    pub fn uint_value(&self, path: &str) -> u64 {
        self.typed(path, "uint", 0, |v| match v {
            WidgetValue::UInt(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_double_value(&self, path: &str, value: f64) -> FormResult<()> {
        self.set_typed(path, WidgetValue::Double(value))
    }

    pub fn double_value(&self, path: &str) -> f64 {
        self.typed(path, "double", 0.0, |v| match v {
            WidgetValue::Double(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_bool_value(&self, path: &str, value: bool) -> FormResult<()> {
        self.set_typed(path, WidgetValue::Bool(value))
    }

    pub fn bool_value(&self, path: &str) -> bool {
        self.typed(path, "bool", false, |v| match v {
            WidgetValue::Bool(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_string_value(&self, path: &str, value: &str) -> FormResult<()> {
        self.set_typed(path, WidgetValue::String(value.to_string()))
    }

    pub fn string_value(&self, path: &str) -> String {
        self.typed(path, "string", String::new(), |v| match v {
            WidgetValue::String(v) => Some(v),
            _ => None,
        })
    }

    /// Select the item named `value`; fails when the list has no such item.
    pub fn set_enum_value(&self, path: &str, value: &str) -> FormResult<()> {
        self.set_typed(path, WidgetValue::Enum(value.to_string()))
    }

    pub fn enum_value(&self, path: &str) -> String {
        self.typed(path, "enum", String::new(), |v| match v {
            WidgetValue::Enum(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_vector3_value(&self, path: &str, value: Vector3) -> FormResult<()> {
        self.set_typed(path, WidgetValue::Vector3(value))
    }

    pub fn vector3_value(&self, path: &str) -> Vector3 {
        self.typed(path, "vector3", Vector3::ZERO, |v| match v {
            WidgetValue::Vector3(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_color_value(&self, path: &str, value: Color) -> FormResult<()> {
        self.set_typed(path, WidgetValue::Color(value))
    }

    pub fn color_value(&self, path: &str) -> Color {
        self.typed(path, "color", Color::default(), |v| match v {
            WidgetValue::Color(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_pose_value(&self, path: &str, value: Pose) -> FormResult<()> {
        self.set_typed(path, WidgetValue::Pose(value))
    }

    pub fn pose_value(&self, path: &str) -> Pose {
        self.typed(path, "pose", Pose::default(), |v| match v {
            WidgetValue::Pose(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_geometry_value(&self, path: &str, value: GeometryValue) -> FormResult<()> {
        self.set_typed(path, WidgetValue::Geometry(value))
    }

    pub fn geometry_value(&self, path: &str) -> GeometryValue {
        let default = GeometryValue::new(GeometryShape::Box, Vector3::ONE);
        self.typed(path, "geometry", default, |v| match v {
            WidgetValue::Geometry(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_density_value(&self, path: &str, value: f64) -> FormResult<()> {
        self.set_typed(path, WidgetValue::Density(value))
    }

    pub fn density_value(&self, path: &str) -> f64 {
        self.typed(path, "density", 0.0, |v| match v {
            WidgetValue::Density(v) => Some(v),
            _ => None,
        })
    }

    // =========================================================================
    // Visibility and read-only
    // =========================================================================

    /// Visibility of the widget, or of its enclosing group when it has one.
    pub fn widget_visible(&self, path: &str) -> bool {
        match self.registry.flag_target(path) {
            Ok(widget) => widget.is_visible(),
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    pub fn set_widget_visible(&self, path: &str, visible: bool) -> FormResult<()> {
        self.registry.flag_target(path)?.set_visible(visible);
        Ok(())
    }

    /// Whether the widget (or its group) or any ancestor is read-only.
    pub fn widget_read_only(&self, path: &str) -> bool {
        match self.registry.flag_target(path) {
            Ok(widget) => self.registry.is_effectively_read_only(widget.id()),
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Set the widget's own read-only flag, on its group when it has one.
    /// Clearing it re-enables descendants that are not read-only themselves.
    pub fn set_widget_read_only(&self, path: &str, read_only: bool) -> FormResult<()> {
        self.registry.flag_target(path)?.set_read_only(read_only);
        Ok(())
    }

    // =========================================================================
    // Groups
    // =========================================================================

    fn group(&self, path: &str) -> FormResult<&Widget> {
        let widget = self.registry.require(path)?;
        self.registry
            .group_of(widget.id())
            .and_then(|id| self.registry.get(id))
            .ok_or_else(|| FormError::ShapeMismatch {
                path: path.to_string(),
                kind: widget.kind().name(),
                expected: "group",
            })
    }

    pub fn set_group_expanded(&self, path: &str, expanded: bool) -> FormResult<()> {
        self.group(path)?.set_expanded(expanded);
        Ok(())
    }

    pub fn group_expanded(&self, path: &str) -> bool {
        self.group(path).is_ok_and(Widget::is_expanded)
    }

    // =========================================================================
    // Property widgets
    // =========================================================================

    fn ensure_root(&mut self) -> WidgetId {
        if let Some(root) = self.registry.root() {
            return root;
        }
        let factory = WidgetFactory::new(&self.config.theme, &self.config.policy);
        let root = self.registry.insert(factory.root());
        self.registry.set_root(root);
        root
    }

    /// Add a widget that is not bound to a message field, showing `value`.
    pub fn add_property_widget(&mut self, name: &str, value: &WidgetValue) -> FormResult<WidgetId> {
        if name.is_empty() || name.contains(PATH_SEPARATOR) {
            warn!(name, "rejected property widget name");
            return Err(FormError::InvalidName(name.to_string()));
        }
        if self.registry.lookup(name).is_some() {
            warn!(name, "rejected duplicate property widget");
            return Err(FormError::DuplicatePath(name.to_string()));
        }

        let root = self.ensure_root();
        let widget = WidgetFactory::new(&self.config.theme, &self.config.policy).for_value(name, 0, value)?;
        let id = self.registry.insert(widget);
        self.registry.register(name, id)?;
        self.registry.attach(root, id);
        Ok(id)
    }

    // =========================================================================
    // Enum item lists
    // =========================================================================

    fn enum_combo(&self, path: &str) -> FormResult<&ComboBox> {
        let widget = self.registry.require(path)?;
        let mismatch = || FormError::ShapeMismatch {
            path: path.to_string(),
            kind: widget.kind().name(),
            expected: "enum",
        };
        if widget.kind() != WidgetKind::Enum {
            return Err(mismatch());
        }
        widget.control(controls::VALUE)?.combo().ok_or_else(mismatch)
    }

    /// Remove every item of an enum widget. No event is emitted.
    pub fn clear_enum_widget(&self, path: &str) -> FormResult<()> {
        self.enum_combo(path)?.clear();
        Ok(())
    }

    pub fn add_item_enum_widget(&self, path: &str, item: &str) -> FormResult<()> {
        self.enum_combo(path)?.add_item(item);
        Ok(())
    }

    /// Returns false when the widget has no such item.
    pub fn remove_item_enum_widget(&self, path: &str, item: &str) -> FormResult<bool> {
        Ok(self.enum_combo(path)?.remove_item(item))
    }

    // =========================================================================
    // User edits
    // =========================================================================

    fn editable(&self, path: &str) -> FormResult<&Widget> {
        let widget = self.registry.require(path)?;
        if self.registry.is_effectively_read_only(widget.id()) {
            return Err(FormError::ReadOnly(path.to_string()));
        }
        Ok(widget)
    }

    /// Replace a widget's whole value as a user edit and notify subscribers.
    pub fn edit(&self, path: &str, value: WidgetValue) -> FormResult<WidgetValue> {
        let widget = self.editable(path)?;
        widget.set_value(&value)?;
        let shown = widget.value()?;
        self.events.emit(ValueChanged::new(path, shown.clone()));
        Ok(shown)
    }

    /// Apply a user edit to one control and notify subscribers.
    pub fn edit_control(&self, path: &str, index: usize, value: ControlValue) -> FormResult<WidgetValue> {
        let widget = self.editable(path)?;
        let shown = widget.apply_control_edit(index, &value)?;
        self.events.emit(ValueChanged::new(path, shown.clone()));
        Ok(shown)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Subscribe to every value change. Returns cleanup function.
    pub fn subscribe<F>(&self, handler: F) -> Cleanup
    where
        F: Fn(&ValueChanged) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn events(&self) -> &EventChannel {
        &self.events
    }
}
