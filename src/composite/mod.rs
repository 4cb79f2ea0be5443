//! Composite Type Recognizers.
//!
//! Nested records whose declared type name and field signature match a known
//! composite are shown as a single compound widget instead of a generic
//! group. Each recognizer converts between the record's sub-fields and a
//! domain value from [`crate::types`].
//!
//! Recognition order is Geometry, Pose, Vector3, Color, Density.

mod density;
mod geometry;
mod pose;

pub use density::{MATERIALS, CUSTOM_MATERIAL, MATERIAL_EPSILON, material_density, nearest_material};
pub use geometry::{read_geometry, write_geometry};
pub use pose::{read_pose, write_pose};

use crate::error::{FormError, FormResult};
use crate::schema::{FieldDescriptor, FieldKind, Message, RecordSchema, SchemaPool, type_names};
use crate::types::{Color, Vector3, WidgetValue};

/// Composite record shapes with a dedicated widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Geometry,
    Pose,
    Vector3,
    Color,
    Density,
}

impl CompositeKind {
    /// Recognizers in dispatch order.
    pub const ORDER: [CompositeKind; 5] = [
        CompositeKind::Geometry,
        CompositeKind::Pose,
        CompositeKind::Vector3,
        CompositeKind::Color,
        CompositeKind::Density,
    ];

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Geometry => type_names::GEOMETRY,
            Self::Pose => type_names::POSE,
            Self::Vector3 => type_names::VECTOR3D,
            Self::Color => type_names::COLOR,
            Self::Density => type_names::DENSITY,
        }
    }

    /// Whether `schema` has this composite's name and field signature.
    pub fn matches(&self, pool: &SchemaPool, schema: &RecordSchema) -> bool {
        if schema.name != self.type_name() {
            return false;
        }
        match self {
            Self::Geometry => schema
                .field("type")
                .is_some_and(|f| f.kind == FieldKind::Enum && !f.is_repeated()),
            Self::Pose => pose::find_parts(pool, schema).is_some(),
            Self::Vector3 => is_vector3(schema),
            Self::Color => {
                let numeric = numeric_fields(schema).count();
                numeric > 0 && numeric <= 4 && numeric == schema.fields.len()
            }
            Self::Density => schema
                .field("density")
                .is_some_and(|f| f.kind.is_numeric() && !f.is_repeated()),
        }
    }

    /// Read the domain value out of a message of this composite's type.
    pub fn read(&self, msg: &Message) -> FormResult<WidgetValue> {
        Ok(match self {
            Self::Geometry => WidgetValue::Geometry(read_geometry(msg)?),
            Self::Pose => WidgetValue::Pose(read_pose(msg)?),
            Self::Vector3 => WidgetValue::Vector3(read_vector3(msg)?),
            Self::Color => WidgetValue::Color(read_color(msg)?),
            Self::Density => WidgetValue::Density(finite_or_zero(msg.get_f64("density")?)),
        })
    }

    /// Write a domain value into a message of this composite's type.
    pub fn write(&self, msg: &mut Message, value: &WidgetValue) -> FormResult<()> {
        match (self, value) {
            (Self::Geometry, WidgetValue::Geometry(g)) => write_geometry(msg, g),
            (Self::Pose, WidgetValue::Pose(p)) => write_pose(msg, p),
            (Self::Vector3, WidgetValue::Vector3(v)) => write_vector3(msg, *v),
            (Self::Color, WidgetValue::Color(c)) => write_color(msg, *c),
            (Self::Density, WidgetValue::Density(d)) => msg.set_f64("density", *d),
            _ => Err(FormError::ShapeMismatch {
                path: msg.type_name().to_string(),
                kind: value.kind_name(),
                expected: self.value_name(),
            }),
        }
    }

    pub const fn value_name(&self) -> &'static str {
        match self {
            Self::Geometry => "geometry",
            Self::Pose => "pose",
            Self::Vector3 => "vector3",
            Self::Color => "color",
            Self::Density => "density",
        }
    }
}

/// First composite whose recognizer accepts the record type of `field`.
pub fn recognize(pool: &SchemaPool, field: &FieldDescriptor) -> Option<CompositeKind> {
    let type_name = pool.nested_type_name(field)?;
    let schema = pool.record(type_name).ok()?;
    CompositeKind::ORDER
        .into_iter()
        .find(|kind| kind.matches(pool, &schema))
}

// =============================================================================
// Vector3 / Color
// =============================================================================

fn numeric_fields(schema: &RecordSchema) -> impl Iterator<Item = &FieldDescriptor> {
    schema
        .fields
        .iter()
        .filter(|f| f.kind.is_numeric() && !f.is_repeated())
}

pub(crate) fn is_vector3(schema: &RecordSchema) -> bool {
    schema.fields.len() == 3 && numeric_fields(schema).count() == 3
}

/// NaN and infinities display as 0.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub fn read_vector3(msg: &Message) -> FormResult<Vector3> {
    let mut xyz = [0.0; 3];
    for (slot, field) in xyz.iter_mut().zip(numeric_fields(msg.schema())) {
        *slot = finite_or_zero(msg.get_f64(&field.name)?);
    }
    Ok(Vector3::from_array(xyz))
}

pub fn write_vector3(msg: &mut Message, value: Vector3) -> FormResult<()> {
    let names: Vec<String> = numeric_fields(msg.schema()).map(|f| f.name.clone()).collect();
    for (name, v) in names.iter().zip(value.to_array()) {
        msg.set_f64(name, v)?;
    }
    Ok(())
}

/// Missing channels read as 0.
pub fn read_color(msg: &Message) -> FormResult<Color> {
    let mut rgba = [0.0; 4];
    for (slot, field) in rgba.iter_mut().zip(numeric_fields(msg.schema())) {
        *slot = finite_or_zero(msg.get_f64(&field.name)?);
    }
    Ok(Color::from_array(rgba))
}

pub fn write_color(msg: &mut Message, value: Color) -> FormResult<()> {
    let names: Vec<String> = numeric_fields(msg.schema()).map(|f| f.name.clone()).collect();
    for (name, v) in names.iter().zip(value.to_array()) {
        msg.set_f64(name, v)?;
    }
    Ok(())
}
