//! Geometry records.
//!
//! The `type` enum selects the shape; the dimensions live in the sub-record
//! named after the shape (`box`, `cylinder`, ...). Only that sub-record is
//! read or written, the others are left as they are.

use super::{finite_or_zero, is_vector3, read_vector3, write_vector3};
use crate::error::{FormError, FormResult};
use crate::schema::{FieldKind, Message};
use crate::types::{GeometryShape, GeometryValue, Vector3};

/// Singular record field of `msg` named after `shape`.
fn shape_field(msg: &Message, shape: GeometryShape) -> Option<&str> {
    msg.schema()
        .field(shape.as_str())
        .filter(|f| f.kind == FieldKind::Record && !f.is_repeated())
        .map(|f| f.name.as_str())
}

/// First field of `msg` holding a Vector3-shaped record.
fn vector_field(msg: &Message) -> Option<String> {
    msg.schema()
        .fields
        .iter()
        .filter(|f| f.kind == FieldKind::Record && !f.is_repeated())
        .find(|f| {
            f.type_name
                .as_deref()
                .and_then(|t| msg.pool().record(t).ok())
                .is_some_and(|s| is_vector3(&s))
        })
        .map(|f| f.name.clone())
}

fn string_field(msg: &Message) -> Option<String> {
    msg.schema()
        .fields
        .iter()
        .find(|f| f.kind == FieldKind::String && !f.is_repeated())
        .map(|f| f.name.clone())
}

fn read_shape(msg: &Message) -> FormResult<GeometryShape> {
    let name = msg.get_enum_name("type")?;
    GeometryShape::parse(&name).ok_or(FormError::UnknownEnumName {
        enum_type: "geometry shape".to_string(),
        name,
    })
}

/// Read shape, full-extent dimensions and mesh URI.
pub fn read_geometry(msg: &Message) -> FormResult<GeometryValue> {
    let shape = read_shape(msg)?;
    let mut value = GeometryValue::new(shape, Vector3::ZERO);

    let Some(field) = shape_field(msg, shape) else {
        return Ok(value);
    };
    let dims = msg.sub_message(field)?;

    match shape {
        GeometryShape::Box => {
            if let Some(size) = vector_field(&dims) {
                value.dimensions = read_vector3(&dims.sub_message(&size)?)?;
            }
        }
        GeometryShape::Cylinder => {
            let diameter = finite_or_zero(dims.get_f64("radius")?) * 2.0;
            let length = finite_or_zero(dims.get_f64("length")?);
            value.dimensions = Vector3::new(diameter, diameter, length);
        }
        GeometryShape::Sphere => {
            let diameter = finite_or_zero(dims.get_f64("radius")?) * 2.0;
            value.dimensions = Vector3::new(diameter, diameter, diameter);
        }
        GeometryShape::Mesh => {
            if let Some(scale) = vector_field(&dims) {
                value.dimensions = read_vector3(&dims.sub_message(&scale)?)?;
            }
            if let Some(uri) = string_field(&dims) {
                value.uri = dims.get_string(&uri)?;
            }
        }
        GeometryShape::Polyline => {}
    }

    Ok(value)
}

/// Set the shape enum and populate the selected shape's sub-record.
pub fn write_geometry(msg: &mut Message, value: &GeometryValue) -> FormResult<()> {
    msg.set_enum_name("type", value.shape.enum_name())?;

    let Some(field) = shape_field(msg, value.shape).map(str::to_string) else {
        return Ok(());
    };
    let dims = msg.sub_message_mut(&field)?;
    let d = value.dimensions;

    match value.shape {
        GeometryShape::Box => {
            if let Some(size) = vector_field(dims) {
                write_vector3(dims.sub_message_mut(&size)?, d)?;
            }
        }
        GeometryShape::Cylinder => {
            dims.set_f64("radius", d.x * 0.5)?;
            dims.set_f64("length", d.z)?;
        }
        GeometryShape::Sphere => {
            dims.set_f64("radius", d.x * 0.5)?;
        }
        GeometryShape::Mesh => {
            if let Some(uri) = string_field(dims) {
                dims.set_string(&uri, value.uri.clone())?;
            }
            if let Some(scale) = vector_field(dims) {
                write_vector3(dims.sub_message_mut(&scale)?, d)?;
            }
        }
        GeometryShape::Polyline => {}
    }
    Ok(())
}
