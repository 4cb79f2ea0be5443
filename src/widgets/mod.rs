//! Widget Kinds.
//!
//! A [`Widget`] is bound to one scoped field path and owns the controls that
//! edit it. Widgets never hold tree links; parent and child relationships
//! live in the registry's arena.
//!
//! Every widget kind exposes the same contract:
//! - `value()` / `set_value()` for the whole typed value
//! - `apply_control_edit()` for a single edited control, with the kind's
//!   side effects (vector presets, density materials, geometry visibility)
//! - read-only, visibility and expansion flags

mod control;
mod factory;

pub use control::{ComboBox, Control, Input, SpinBox};
pub use factory::{WidgetFactory, humanize};

use spark_signals::{Signal, signal};

use crate::composite::{CUSTOM_MATERIAL, MATERIAL_EPSILON, material_density, nearest_material};
use crate::error::{FormError, FormResult};
use crate::schema::path_key;
use crate::types::{
    Color, ControlValue, GeometryShape, GeometryValue, Pose, Rgba, Vector3, WidgetValue,
};

/// Index of a widget in the registry arena.
pub type WidgetId = usize;

// =============================================================================
// Control layout per kind
// =============================================================================

/// Control indices of compound widgets.
pub mod controls {
    pub const VALUE: usize = 0;

    pub mod vector3 {
        pub const X: usize = 0;
        pub const Y: usize = 1;
        pub const Z: usize = 2;
        pub const PRESET: usize = 3;
    }

    pub mod color {
        pub const R: usize = 0;
        pub const G: usize = 1;
        pub const B: usize = 2;
        pub const A: usize = 3;
    }

    pub mod pose {
        pub const X: usize = 0;
        pub const Y: usize = 1;
        pub const Z: usize = 2;
        pub const ROLL: usize = 3;
        pub const PITCH: usize = 4;
        pub const YAW: usize = 5;
    }

    pub mod geometry {
        pub const SHAPE: usize = 0;
        pub const SIZE_X: usize = 1;
        pub const SIZE_Y: usize = 2;
        pub const SIZE_Z: usize = 3;
        pub const RADIUS: usize = 4;
        pub const LENGTH: usize = 5;
        pub const URI: usize = 6;
    }

    pub mod density {
        pub const MATERIAL: usize = 0;
        pub const DENSITY: usize = 1;
    }
}

/// Vector preset names and the vectors they select.
pub const VECTOR_PRESETS: [(&str, Option<Vector3>); 7] = [
    ("Custom", None),
    ("X", Some(Vector3::UNIT_X)),
    ("-X", Some(Vector3::new(-1.0, 0.0, 0.0))),
    ("Y", Some(Vector3::UNIT_Y)),
    ("-Y", Some(Vector3::new(0.0, -1.0, 0.0))),
    ("Z", Some(Vector3::UNIT_Z)),
    ("-Z", Some(Vector3::new(0.0, 0.0, -1.0))),
];

/// Preset matching `v` exactly, or `Custom`.
pub fn vector_preset(v: Vector3) -> &'static str {
    VECTOR_PRESETS
        .iter()
        .find(|(_, preset)| *preset == Some(v))
        .map(|(name, _)| *name)
        .unwrap_or(VECTOR_PRESETS[0].0)
}

// =============================================================================
// Kinds and flags
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Int,
    UInt,
    Double,
    String,
    Bool,
    Enum,
    Vector3,
    Color,
    Pose,
    Geometry,
    Density,
    /// Container for the fields of a generic nested record.
    Record,
    /// Collapsible group wrapping a record or composite widget.
    Group,
}

impl WidgetKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Double => "double",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Enum => "enum",
            Self::Vector3 => "vector3",
            Self::Color => "color",
            Self::Pose => "pose",
            Self::Geometry => "geometry",
            Self::Density => "density",
            Self::Record => "record",
            Self::Group => "group",
        }
    }

    pub const fn control_count(&self) -> usize {
        match self {
            Self::Int | Self::UInt | Self::Double | Self::String | Self::Bool | Self::Enum => 1,
            Self::Vector3 | Self::Color => 4,
            Self::Pose => 6,
            Self::Geometry => 7,
            Self::Density => 2,
            Self::Record | Self::Group => 0,
        }
    }
}

bitflags::bitflags! {
    /// Widget state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WidgetFlags: u8 {
        const NONE = 0;
        /// Explicitly disabled; also disables every descendant.
        const READ_ONLY = 1 << 0;
        const HIDDEN = 1 << 1;
        /// Group is showing its content.
        const EXPANDED = 1 << 2;
    }
}

/// Resolved presentation for a widget's nesting level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetStyle {
    pub background: Rgba,
    pub text: Rgba,
    pub indent: u16,
}

// =============================================================================
// Widget
// =============================================================================

pub struct Widget {
    pub(crate) id: WidgetId,
    path: String,
    label: String,
    level: usize,
    kind: WidgetKind,
    controls: Vec<Control>,
    flags: Signal<WidgetFlags>,
    style: WidgetStyle,
}

impl Widget {
    pub(crate) fn new(
        path: &str,
        label: String,
        level: usize,
        kind: WidgetKind,
        controls: Vec<Control>,
        style: WidgetStyle,
    ) -> Self {
        Self {
            id: 0,
            path: path.to_string(),
            label,
            level,
            kind,
            controls,
            flags: signal(WidgetFlags::NONE),
            style,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Field name: last segment of the path.
    pub fn key(&self) -> &str {
        path_key(&self.path)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn style(&self) -> WidgetStyle {
        self.style
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, index: usize) -> FormResult<&Control> {
        self.controls.get(index).ok_or_else(|| FormError::NoSuchControl {
            path: self.path.clone(),
            index,
        })
    }

    // =========================================================================
    // Flags
    // =========================================================================

    pub fn flags(&self) -> WidgetFlags {
        self.flags.get()
    }

    fn set_flag(&self, flag: WidgetFlags, on: bool) {
        let mut flags = self.flags.get();
        flags.set(flag, on);
        self.flags.set(flags);
    }

    /// Own read-only flag, ignoring ancestors.
    pub fn is_read_only(&self) -> bool {
        self.flags().contains(WidgetFlags::READ_ONLY)
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.set_flag(WidgetFlags::READ_ONLY, read_only);
    }

    pub fn is_visible(&self) -> bool {
        !self.flags().contains(WidgetFlags::HIDDEN)
    }

    pub fn set_visible(&self, visible: bool) {
        self.set_flag(WidgetFlags::HIDDEN, !visible);
    }

    pub fn is_expanded(&self) -> bool {
        self.flags().contains(WidgetFlags::EXPANDED)
    }

    pub fn set_expanded(&self, expanded: bool) {
        self.set_flag(WidgetFlags::EXPANDED, expanded);
    }

    /// Replace the unit label of a numeric widget.
    pub fn set_unit(&self, unit: &str) {
        if let Some(control) = self.controls.first() {
            if control.unit.get() != unit {
                control.unit.set(unit.to_string());
            }
        }
    }

    // =========================================================================
    // Control access
    // =========================================================================

    fn mismatch(&self, expected: &'static str) -> FormError {
        FormError::ShapeMismatch {
            path: self.path.clone(),
            kind: self.kind.name(),
            expected,
        }
    }

    fn check_shape(&self) -> FormResult<()> {
        if self.controls.len() != self.kind.control_count() {
            return Err(self.mismatch("a complete control set"));
        }
        Ok(())
    }

    fn spin(&self, index: usize) -> FormResult<&SpinBox> {
        self.control(index)?
            .spin()
            .ok_or_else(|| self.mismatch("spin control"))
    }

    fn combo(&self, index: usize) -> FormResult<&ComboBox> {
        self.control(index)?
            .combo()
            .ok_or_else(|| self.mismatch("combo control"))
    }

    fn text(&self, index: usize) -> FormResult<Signal<String>> {
        match &self.control(index)?.input {
            Input::Line { text, .. } => Ok(text.clone()),
            _ => Err(self.mismatch("line control")),
        }
    }

    fn toggle(&self, index: usize) -> FormResult<Signal<bool>> {
        match &self.control(index)?.input {
            Input::Toggle(on) => Ok(on.clone()),
            _ => Err(self.mismatch("toggle control")),
        }
    }

    fn spins<const N: usize>(&self, first: usize) -> FormResult<[f64; N]> {
        let mut values = [0.0; N];
        for (i, slot) in values.iter_mut().enumerate() {
            *slot = self.spin(first + i)?.value();
        }
        Ok(values)
    }

    fn set_spins(&self, first: usize, values: &[f64]) -> FormResult<()> {
        for (i, v) in values.iter().enumerate() {
            self.spin(first + i)?.set(*v);
        }
        Ok(())
    }

    // =========================================================================
    // Typed value
    // =========================================================================

    /// Current value shown by the controls.
    pub fn value(&self) -> FormResult<WidgetValue> {
        self.check_shape()?;
        use controls::*;

        Ok(match self.kind {
            WidgetKind::Int => WidgetValue::Int(self.spin(VALUE)?.value() as i64),
            WidgetKind::UInt => WidgetValue::UInt(self.spin(VALUE)?.value().max(0.0) as u64),
            WidgetKind::Double => WidgetValue::Double(self.spin(VALUE)?.value()),
            WidgetKind::String => WidgetValue::String(self.text(VALUE)?.get()),
            WidgetKind::Bool => WidgetValue::Bool(self.toggle(VALUE)?.get()),
            WidgetKind::Enum => {
                WidgetValue::Enum(self.combo(VALUE)?.current_text().unwrap_or_default())
            }
            WidgetKind::Vector3 => {
                WidgetValue::Vector3(Vector3::from_array(self.spins::<3>(vector3::X)?))
            }
            WidgetKind::Color => WidgetValue::Color(Color::from_array(self.spins::<4>(color::R)?)),
            WidgetKind::Pose => {
                let position = Vector3::from_array(self.spins::<3>(pose::X)?);
                let euler = Vector3::from_array(self.spins::<3>(pose::ROLL)?);
                WidgetValue::Pose(Pose::from_euler(position, euler))
            }
            WidgetKind::Geometry => WidgetValue::Geometry(self.geometry_value()?),
            WidgetKind::Density => WidgetValue::Density(self.spin(density::DENSITY)?.value()),
            WidgetKind::Record | WidgetKind::Group => return Err(self.mismatch("a value widget")),
        })
    }

    /// Show `value` in the controls. The value must match the widget kind.
    pub fn set_value(&self, value: &WidgetValue) -> FormResult<()> {
        self.check_shape()?;
        use controls::*;

        match (self.kind, value) {
            (WidgetKind::Int, WidgetValue::Int(v)) => {
                self.spin(VALUE)?.set(*v as f64);
            }
            (WidgetKind::UInt, WidgetValue::UInt(v)) => {
                self.spin(VALUE)?.set(*v as f64);
            }
            (WidgetKind::Double, WidgetValue::Double(v)) => {
                self.spin(VALUE)?.set(*v);
            }
            (WidgetKind::String, WidgetValue::String(v)) => {
                self.text(VALUE)?.set(v.clone());
            }
            (WidgetKind::Bool, WidgetValue::Bool(v)) => {
                self.toggle(VALUE)?.set(*v);
            }
            (WidgetKind::Enum, WidgetValue::Enum(name)) => {
                if !self.combo(VALUE)?.set_current_text(name) {
                    return Err(FormError::UnknownEnumName {
                        enum_type: self.path.clone(),
                        name: name.clone(),
                    });
                }
            }
            (WidgetKind::Vector3, WidgetValue::Vector3(v)) => {
                self.set_spins(vector3::X, &v.to_array())?;
                self.sync_vector_preset()?;
            }
            (WidgetKind::Color, WidgetValue::Color(c)) => {
                self.set_spins(color::R, &c.to_array())?;
            }
            (WidgetKind::Pose, WidgetValue::Pose(p)) => {
                self.set_spins(pose::X, &p.position.to_array())?;
                self.set_spins(pose::ROLL, &p.euler().to_array())?;
            }
            (WidgetKind::Geometry, WidgetValue::Geometry(g)) => self.set_geometry(g)?,
            (WidgetKind::Density, WidgetValue::Density(d)) => {
                self.spin(density::DENSITY)?.set(*d);
                self.sync_density_material()?;
            }
            _ => return Err(self.mismatch(value.kind_name())),
        }
        Ok(())
    }

    /// Apply a user edit to one control and run the kind's side effects.
    ///
    /// Returns the widget's resulting value.
    pub fn apply_control_edit(&self, index: usize, value: &ControlValue) -> FormResult<WidgetValue> {
        self.check_shape()?;
        self.control(index)?.set(&self.path, value)?;

        match (self.kind, index) {
            (WidgetKind::Vector3, controls::vector3::PRESET) => {
                let name = self.combo(index)?.current_text().unwrap_or_default();
                let preset = VECTOR_PRESETS
                    .iter()
                    .find(|(n, _)| *n == name)
                    .and_then(|(_, v)| *v);
                if let Some(v) = preset {
                    self.set_spins(controls::vector3::X, &v.to_array())?;
                }
            }
            (WidgetKind::Vector3, _) => self.sync_vector_preset()?,
            (WidgetKind::Geometry, controls::geometry::SHAPE) => self.sync_geometry_visibility()?,
            (WidgetKind::Density, controls::density::MATERIAL) => {
                let name = self.combo(index)?.current_text().unwrap_or_default();
                if let Some(d) = material_density(&name) {
                    self.spin(controls::density::DENSITY)?.set(d);
                }
            }
            (WidgetKind::Density, _) => self.sync_density_material()?,
            _ => {}
        }

        self.value()
    }

    // =========================================================================
    // Kind-specific side effects
    // =========================================================================

    fn sync_vector_preset(&self) -> FormResult<()> {
        let v = Vector3::from_array(self.spins::<3>(controls::vector3::X)?);
        self.combo(controls::vector3::PRESET)?
            .set_current_text(vector_preset(v));
        Ok(())
    }

    fn sync_density_material(&self) -> FormResult<()> {
        let d = self.spin(controls::density::DENSITY)?.value();
        let name = nearest_material(d, MATERIAL_EPSILON).unwrap_or(CUSTOM_MATERIAL);
        self.combo(controls::density::MATERIAL)?.set_current_text(name);
        Ok(())
    }

    fn geometry_shape(&self) -> FormResult<GeometryShape> {
        let name = self.combo(controls::geometry::SHAPE)?
            .current_text()
            .unwrap_or_default();
        GeometryShape::parse(&name).ok_or_else(|| self.mismatch("geometry shape"))
    }

    fn geometry_value(&self) -> FormResult<GeometryValue> {
        use controls::geometry::*;

        let shape = self.geometry_shape()?;
        let radius = self.spin(RADIUS)?.value();
        let dimensions = match shape {
            GeometryShape::Box | GeometryShape::Mesh => {
                Vector3::from_array(self.spins::<3>(SIZE_X)?)
            }
            GeometryShape::Cylinder => {
                Vector3::new(radius * 2.0, radius * 2.0, self.spin(LENGTH)?.value())
            }
            GeometryShape::Sphere => Vector3::new(radius * 2.0, radius * 2.0, radius * 2.0),
            GeometryShape::Polyline => Vector3::ZERO,
        };
        let uri = match shape {
            GeometryShape::Mesh => self.text(URI)?.get(),
            _ => String::new(),
        };

        Ok(GeometryValue { shape, dimensions, uri })
    }

    fn set_geometry(&self, value: &GeometryValue) -> FormResult<()> {
        use controls::geometry::*;

        self.combo(SHAPE)?.set_current_text(value.shape.as_str());
        let d = value.dimensions;
        match value.shape {
            GeometryShape::Box | GeometryShape::Mesh => self.set_spins(SIZE_X, &d.to_array())?,
            GeometryShape::Cylinder => {
                self.spin(RADIUS)?.set(d.x * 0.5);
                self.spin(LENGTH)?.set(d.z);
            }
            GeometryShape::Sphere => {
                self.spin(RADIUS)?.set(d.x * 0.5);
            }
            GeometryShape::Polyline => {}
        }
        self.text(URI)?.set(value.uri.clone());
        self.sync_geometry_visibility()
    }

    /// Show only the dimension controls the selected shape uses.
    fn sync_geometry_visibility(&self) -> FormResult<()> {
        use controls::geometry::*;

        let shape = self.geometry_shape()?;
        let sized = matches!(shape, GeometryShape::Box | GeometryShape::Mesh);
        let round = matches!(shape, GeometryShape::Cylinder | GeometryShape::Sphere);

        for index in [SIZE_X, SIZE_Y, SIZE_Z] {
            self.control(index)?.set_visible(sized);
        }
        self.control(RADIUS)?.set_visible(round);
        self.control(LENGTH)?
            .set_visible(shape == GeometryShape::Cylinder);
        self.control(URI)?.set_visible(shape == GeometryShape::Mesh);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FieldPolicy;
    use crate::theme::Theme;
    use std::f64::consts::FRAC_PI_2;

    fn factory_parts() -> (Theme, FieldPolicy) {
        (Theme::default(), FieldPolicy::default())
    }

    #[test]
    fn test_set_value_kind_mismatch() {
        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);
        let w = factory.int("count", 0);

        let err = w.set_value(&WidgetValue::Double(1.0)).unwrap_err();
        assert_eq!(
            err,
            FormError::ShapeMismatch {
                path: "count".into(),
                kind: "int",
                expected: "double"
            }
        );
        w.set_value(&WidgetValue::Int(-7)).unwrap();
        assert_eq!(w.value().unwrap(), WidgetValue::Int(-7));
    }

    #[test]
    fn test_int_range_clamped() {
        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);

        let w = factory.int("count", 0);
        w.set_value(&WidgetValue::Int(5_000_000_000)).unwrap();
        assert_eq!(w.value().unwrap(), WidgetValue::Int(100_000_000));

        let u = factory.uint("id", 0);
        u.set_value(&WidgetValue::UInt(3)).unwrap();
        assert_eq!(u.value().unwrap(), WidgetValue::UInt(3));
    }

    #[test]
    fn test_double_uses_policy_range() {
        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);
        let w = factory.double("link::mass", 1);

        w.set_value(&WidgetValue::Double(-3.0)).unwrap();
        assert_eq!(w.value().unwrap(), WidgetValue::Double(0.0));
        w.set_value(&WidgetValue::Double(1.123456789)).unwrap();
        assert_eq!(w.value().unwrap(), WidgetValue::Double(1.12345679));
    }

    #[test]
    fn test_vector_preset_follows_value() {
        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);
        let w = factory.vector3("axis", 0);
        let preset = controls::vector3::PRESET;

        w.set_value(&WidgetValue::Vector3(Vector3::new(0.0, -1.0, 0.0))).unwrap();
        assert_eq!(w.control(preset).unwrap().value(), ControlValue::Choice("-Y".into()));

        w.apply_control_edit(controls::vector3::X, &ControlValue::Number(0.5)).unwrap();
        assert_eq!(w.control(preset).unwrap().value(), ControlValue::Choice("Custom".into()));

        let v = w.apply_control_edit(preset, &ControlValue::Choice("Z".into())).unwrap();
        assert_eq!(v, WidgetValue::Vector3(Vector3::UNIT_Z));
    }

    #[test]
    fn test_pose_displays_euler() {
        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);
        let w = factory.pose("pose", 0);

        let pose = Pose::from_euler(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, FRAC_PI_2));
        w.set_value(&WidgetValue::Pose(pose)).unwrap();

        let yaw = w.control(controls::pose::YAW).unwrap().value();
        assert_eq!(yaw, ControlValue::Number(1.570796));
        assert_eq!(w.control(controls::pose::X).unwrap().unit.get(), "m");
        assert_eq!(w.control(controls::pose::ROLL).unwrap().unit.get(), "rad");

        let WidgetValue::Pose(read) = w.value().unwrap() else {
            panic!("pose widget returned a non-pose value");
        };
        assert!(read.euler().approx_eq(&Vector3::new(0.0, 0.0, FRAC_PI_2), 1e-6));
    }

    #[test]
    fn test_geometry_visibility_by_shape() {
        use controls::geometry::*;

        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);
        let w = factory.geometry("geometry", 0);
        let visible = |i: usize| w.control(i).unwrap().is_visible();

        assert!(visible(SIZE_X) && !visible(RADIUS) && !visible(URI));

        w.apply_control_edit(SHAPE, &ControlValue::Choice("cylinder".into())).unwrap();
        assert!(!visible(SIZE_X) && visible(RADIUS) && visible(LENGTH));

        w.apply_control_edit(SHAPE, &ControlValue::Choice("sphere".into())).unwrap();
        assert!(visible(RADIUS) && !visible(LENGTH));

        w.apply_control_edit(SHAPE, &ControlValue::Choice("mesh".into())).unwrap();
        assert!(visible(SIZE_Z) && visible(URI) && !visible(RADIUS));

        w.apply_control_edit(SHAPE, &ControlValue::Choice("polyline".into())).unwrap();
        assert!([SIZE_X, SIZE_Y, SIZE_Z, RADIUS, LENGTH, URI].iter().all(|i| !visible(*i)));
    }

    #[test]
    fn test_geometry_defaults_and_sphere_radius() {
        use controls::geometry::*;

        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);
        let w = factory.geometry("geometry", 0);

        assert_eq!(
            w.value().unwrap(),
            WidgetValue::Geometry(GeometryValue::new(GeometryShape::Box, Vector3::ONE))
        );

        w.apply_control_edit(SHAPE, &ControlValue::Choice("sphere".into())).unwrap();
        let value = w.apply_control_edit(RADIUS, &ControlValue::Number(2.0)).unwrap();
        assert_eq!(
            value,
            WidgetValue::Geometry(GeometryValue::new(GeometryShape::Sphere, Vector3::new(4.0, 4.0, 4.0)))
        );
    }

    #[test]
    fn test_density_material_selection() {
        use controls::density::*;

        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);
        let w = factory.density("density", 0);

        assert_eq!(w.control(MATERIAL).unwrap().value(), ControlValue::Choice(CUSTOM_MATERIAL.into()));

        let v = w.apply_control_edit(MATERIAL, &ControlValue::Choice("water".into())).unwrap();
        assert_eq!(v, WidgetValue::Density(1000.0));

        w.set_value(&WidgetValue::Density(7874.4)).unwrap();
        assert_eq!(w.control(MATERIAL).unwrap().value(), ControlValue::Choice("iron".into()));
        assert_eq!(w.value().unwrap(), WidgetValue::Density(7874.4));

        w.apply_control_edit(DENSITY, &ControlValue::Number(5000.0)).unwrap();
        assert_eq!(w.control(MATERIAL).unwrap().value(), ControlValue::Choice(CUSTOM_MATERIAL.into()));

        w.apply_control_edit(MATERIAL, &ControlValue::Choice(CUSTOM_MATERIAL.into())).unwrap();
        assert_eq!(w.value().unwrap(), WidgetValue::Density(5000.0));
    }

    #[test]
    fn test_containers_have_no_value() {
        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);
        let group = factory.group("material", 0);
        assert!(!group.is_expanded());
        assert!(matches!(group.value(), Err(FormError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_flags_are_independent() {
        let (theme, policy) = factory_parts();
        let factory = WidgetFactory::new(&theme, &policy);
        let w = factory.boolean("self_collide", 0);

        w.set_read_only(true);
        w.set_visible(false);
        assert!(w.is_read_only());
        assert!(!w.is_visible());
        w.set_read_only(false);
        assert!(!w.is_visible());
        assert_eq!(w.flags(), WidgetFlags::HIDDEN);
    }
}
