//! Widget construction.
//!
//! The factory turns a field path and nesting level into a widget with the
//! right controls, ranges, units and style. Theme and policy are passed in;
//! nothing here reads global state.

use super::controls::geometry;
use super::{ComboBox, Control, Input, SpinBox, VECTOR_PRESETS, Widget, WidgetKind, WidgetStyle};
use crate::composite::{CUSTOM_MATERIAL, CompositeKind, MATERIALS};
use crate::error::FormResult;
use crate::policy::{FieldPolicy, ValueRange};
use crate::schema::{FieldKind, path_key};
use crate::theme::Theme;
use crate::types::{GeometryShape, WidgetValue};

const INT_LIMIT: f64 = 1e8;
const DOUBLE_STEP: f64 = 0.01;
const DOUBLE_DECIMALS: u32 = 8;
const COMPOSITE_DECIMALS: u32 = 6;
const COLOR_DECIMALS: u32 = 3;
const DENSITY_DECIMALS: u32 = 1;

/// Field name shown as multi-line text.
const MULTILINE_KEY: &str = "innerxml";

/// Human-readable label for a field name: `max_vel` becomes `Max vel`.
pub fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct WidgetFactory<'a> {
    theme: &'a Theme,
    policy: &'a FieldPolicy,
}

impl<'a> WidgetFactory<'a> {
    pub fn new(theme: &'a Theme, policy: &'a FieldPolicy) -> Self {
        Self { theme, policy }
    }

    pub fn policy(&self) -> &FieldPolicy {
        self.policy
    }

    fn style(&self, level: usize) -> WidgetStyle {
        WidgetStyle {
            background: self.theme.background(level),
            text: self.theme.text,
            indent: self.theme.indent_for(level),
        }
    }

    fn build(&self, path: &str, level: usize, kind: WidgetKind, controls: Vec<Control>) -> Widget {
        Widget::new(path, humanize(path_key(path)), level, kind, controls, self.style(level))
    }

    fn spin(&self, name: &'static str, range: ValueRange, step: f64, decimals: u32, initial: f64) -> Control {
        Control::new(name, humanize(name), Input::Spin(SpinBox::new(range, step, decimals, initial)))
    }

    fn axis_spin(&self, name: &'static str, axis: usize, unit_key: Option<&str>) -> Control {
        let unit = unit_key
            .map(|key| self.policy.unit_for(key, None))
            .unwrap_or_default();
        Control::new(
            name,
            humanize(name),
            Input::Spin(SpinBox::new(ValueRange::UNBOUNDED, DOUBLE_STEP, COMPOSITE_DECIMALS, 0.0)),
        )
        .with_color(self.theme.axis_color(axis))
        .with_unit(&unit)
    }

    // =========================================================================
    // Primitive widgets
    // =========================================================================

    /// Widget for a primitive field kind; `None` for enums and records.
    pub fn primitive(&self, kind: FieldKind, path: &str, level: usize) -> Option<Widget> {
        match kind {
            FieldKind::Int32 | FieldKind::Int64 => Some(self.int(path, level)),
            FieldKind::UInt32 | FieldKind::UInt64 => Some(self.uint(path, level)),
            FieldKind::Float | FieldKind::Double => Some(self.double(path, level)),
            FieldKind::Bool => Some(self.boolean(path, level)),
            FieldKind::String => Some(self.string(path, level)),
            FieldKind::Enum | FieldKind::Record => None,
        }
    }

    pub fn int(&self, path: &str, level: usize) -> Widget {
        let spin = SpinBox::integer(ValueRange::new(-INT_LIMIT, INT_LIMIT));
        self.build(path, level, WidgetKind::Int, vec![Control::new("value", humanize(path_key(path)), Input::Spin(spin))])
    }

    pub fn uint(&self, path: &str, level: usize) -> Widget {
        let spin = SpinBox::integer(ValueRange::new(0.0, INT_LIMIT));
        self.build(path, level, WidgetKind::UInt, vec![Control::new("value", humanize(path_key(path)), Input::Spin(spin))])
    }

    /// Double spin with the policy range for the field name. The unit is
    /// set by the caller once the joint type is known.
    pub fn double(&self, path: &str, level: usize) -> Widget {
        let range = self.policy.range_for(path_key(path));
        let initial = range.clamp(0.0);
        let spin = SpinBox::new(range, DOUBLE_STEP, DOUBLE_DECIMALS, initial);
        self.build(path, level, WidgetKind::Double, vec![Control::new("value", humanize(path_key(path)), Input::Spin(spin))])
    }

    pub fn string(&self, path: &str, level: usize) -> Widget {
        let multiline = path_key(path) == MULTILINE_KEY;
        self.build(
            path,
            level,
            WidgetKind::String,
            vec![Control::new("value", humanize(path_key(path)), Input::line("", multiline))],
        )
    }

    pub fn boolean(&self, path: &str, level: usize) -> Widget {
        self.build(
            path,
            level,
            WidgetKind::Bool,
            vec![Control::new("value", humanize(path_key(path)), Input::toggle(false))],
        )
    }

    pub fn enumeration(&self, path: &str, level: usize, items: Vec<String>) -> Widget {
        self.build(
            path,
            level,
            WidgetKind::Enum,
            vec![Control::new("value", humanize(path_key(path)), Input::Combo(ComboBox::new(items)))],
        )
    }

    /// Widget of the kind matching `value`, showing it.
    pub fn for_value(&self, path: &str, level: usize, value: &WidgetValue) -> FormResult<Widget> {
        let widget = match value {
            WidgetValue::Int(_) => self.int(path, level),
            WidgetValue::UInt(_) => self.uint(path, level),
            WidgetValue::Double(_) => self.double(path, level),
            WidgetValue::Bool(_) => self.boolean(path, level),
            WidgetValue::String(_) => self.string(path, level),
            WidgetValue::Enum(name) => self.enumeration(path, level, vec![name.clone()]),
            WidgetValue::Vector3(_) => self.vector3(path, level),
            WidgetValue::Color(_) => self.color(path, level),
            WidgetValue::Pose(_) => self.pose(path, level),
            WidgetValue::Geometry(_) => self.geometry(path, level),
            WidgetValue::Density(_) => self.density(path, level),
        };
        widget.set_value(value)?;
        Ok(widget)
    }

    // =========================================================================
    // Composite widgets
    // =========================================================================

    pub fn composite(&self, kind: CompositeKind, path: &str, level: usize) -> Widget {
        match kind {
            CompositeKind::Geometry => self.geometry(path, level),
            CompositeKind::Pose => self.pose(path, level),
            CompositeKind::Vector3 => self.vector3(path, level),
            CompositeKind::Color => self.color(path, level),
            CompositeKind::Density => self.density(path, level),
        }
    }

    /// X, Y, Z spins plus a preset selector.
    pub fn vector3(&self, path: &str, level: usize) -> Widget {
        let presets = VECTOR_PRESETS.iter().map(|(name, _)| name.to_string()).collect();
        let controls = vec![
            self.axis_spin("x", 0, None),
            self.axis_spin("y", 1, None),
            self.axis_spin("z", 2, None),
            Control::new("preset", "Preset", Input::Combo(ComboBox::new(presets))),
        ];
        self.build(path, level, WidgetKind::Vector3, controls)
    }

    pub fn color(&self, path: &str, level: usize) -> Widget {
        let controls = ["r", "g", "b", "a"]
            .into_iter()
            .map(|name| self.spin(name, ValueRange::UNIT, 0.1, COLOR_DECIMALS, 0.0))
            .collect();
        self.build(path, level, WidgetKind::Color, controls)
    }

    /// Position in metres and roll/pitch/yaw in radians.
    pub fn pose(&self, path: &str, level: usize) -> Widget {
        let controls = vec![
            self.axis_spin("x", 0, Some("pos")),
            self.axis_spin("y", 1, Some("pos")),
            self.axis_spin("z", 2, Some("pos")),
            self.axis_spin("roll", 0, Some("rot")),
            self.axis_spin("pitch", 1, Some("rot")),
            self.axis_spin("yaw", 2, Some("rot")),
        ];
        self.build(path, level, WidgetKind::Pose, controls)
    }

    /// Shape selector, size X/Y/Z, radius, length and mesh URI.
    pub fn geometry(&self, path: &str, level: usize) -> Widget {
        let shapes = GeometryShape::ALL.iter().map(|s| s.as_str().to_string()).collect();
        let length_unit = self.policy.unit_for("length", None);
        let size_range = self.policy.range_for("length");

        let size = |name: &'static str, axis: usize| {
            self.spin(name, size_range, DOUBLE_STEP, COMPOSITE_DECIMALS, 1.0)
                .with_color(self.theme.axis_color(axis))
                .with_unit(&length_unit)
        };

        let controls = vec![
            Control::new("shape", "Shape", Input::Combo(ComboBox::new(shapes))),
            size("size_x", 0),
            size("size_y", 1),
            size("size_z", 2),
            self.spin("radius", self.policy.range_for("radius"), DOUBLE_STEP, COMPOSITE_DECIMALS, 0.5)
                .with_unit(&length_unit),
            self.spin("length", size_range, DOUBLE_STEP, COMPOSITE_DECIMALS, 1.0)
                .with_unit(&length_unit),
            Control::new("uri", "Uri", Input::line("", false)),
        ];
        let widget = self.build(path, level, WidgetKind::Geometry, controls);
        for index in [geometry::RADIUS, geometry::LENGTH, geometry::URI] {
            widget.controls[index].set_visible(false);
        }
        widget
    }

    /// Material selector plus density spin.
    pub fn density(&self, path: &str, level: usize) -> Widget {
        let mut materials: Vec<String> = MATERIALS.iter().map(|(name, _)| name.to_string()).collect();
        materials.push(CUSTOM_MATERIAL.to_string());
        let combo = ComboBox::new(materials);
        combo.set_current_text(CUSTOM_MATERIAL);

        let controls = vec![
            Control::new("material", "Material", Input::Combo(combo)),
            self.spin("density", self.policy.range_for("density"), 1.0, DENSITY_DECIMALS, 1.0)
                .with_unit(&self.policy.unit_for("density", None)),
        ];
        self.build(path, level, WidgetKind::Density, controls)
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Container for a generic nested record's fields.
    pub fn record(&self, path: &str, level: usize) -> Widget {
        self.build(path, level, WidgetKind::Record, Vec::new())
    }

    /// Collapsible group; starts collapsed.
    pub fn group(&self, path: &str, level: usize) -> Widget {
        self.build(path, level, WidgetKind::Group, Vec::new())
    }

    /// Tree root.
    pub fn root(&self) -> Widget {
        Widget::new("", String::new(), 0, WidgetKind::Record, Vec::new(), self.style(0))
    }
}
