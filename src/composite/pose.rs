//! Pose records: a `Vector3d` position and a `Quaternion` orientation.
//!
//! Sub-fields are located by nested type name, not position in the record.

use super::{finite_or_zero, is_vector3, read_vector3, write_vector3};
use crate::error::{FormError, FormResult};
use crate::schema::{FieldKind, Message, RecordSchema, SchemaPool, type_names};
use crate::types::{Pose, Quaternion};

const QUATERNION_FIELDS: [&str; 4] = ["x", "y", "z", "w"];

/// Names of the position and orientation fields of a pose record.
pub(super) fn find_parts(pool: &SchemaPool, schema: &RecordSchema) -> Option<(String, String)> {
    let typed = |type_name: &str| {
        schema.fields.iter().find(|f| {
            f.kind == FieldKind::Record
                && !f.is_repeated()
                && f.type_name.as_deref() == Some(type_name)
        })
    };

    let position = typed(type_names::VECTOR3D)?;
    let orientation = typed(type_names::QUATERNION)?;

    let position_ok = pool
        .record(type_names::VECTOR3D)
        .is_ok_and(|s| is_vector3(&s));
    let orientation_ok = pool.record(type_names::QUATERNION).is_ok_and(|s| {
        QUATERNION_FIELDS
            .iter()
            .all(|n| s.field(n).is_some_and(|f| f.kind.is_numeric()))
    });

    (position_ok && orientation_ok).then(|| (position.name.clone(), orientation.name.clone()))
}

fn parts(msg: &Message) -> FormResult<(String, String)> {
    find_parts(msg.pool(), msg.schema()).ok_or_else(|| {
        FormError::InvalidSchema(format!("'{}' is not a pose record", msg.type_name()))
    })
}

pub fn read_pose(msg: &Message) -> FormResult<Pose> {
    let (position_field, orientation_field) = parts(msg)?;

    let position = read_vector3(&msg.sub_message(&position_field)?)?;

    let q = msg.sub_message(&orientation_field)?;
    let orientation = if msg.has_field(&orientation_field) {
        Quaternion::new(
            finite_or_zero(q.get_f64("w")?),
            finite_or_zero(q.get_f64("x")?),
            finite_or_zero(q.get_f64("y")?),
            finite_or_zero(q.get_f64("z")?),
        )
    } else {
        Quaternion::IDENTITY
    };

    Ok(Pose::new(position, orientation))
}

/// Write position and a normalized orientation.
pub fn write_pose(msg: &mut Message, value: &Pose) -> FormResult<()> {
    let (position_field, orientation_field) = parts(msg)?;

    write_vector3(msg.sub_message_mut(&position_field)?, value.position)?;

    let q = value.orientation.normalized();
    let orientation = msg.sub_message_mut(&orientation_field)?;
    orientation.set_f64("x", q.x)?;
    orientation.set_f64("y", q.y)?;
    orientation.set_f64("z", q.z)?;
    orientation.set_f64("w", q.w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::joint_pool;
    use crate::types::Vector3;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_absent_orientation_is_identity() {
        let pool = joint_pool();
        let pose = Message::new(&pool, "Pose").unwrap();
        let read = read_pose(&pose).unwrap();
        assert_eq!(read.orientation, Quaternion::IDENTITY);
        assert_eq!(read.position, Vector3::ZERO);
    }

    #[test]
    fn test_pose_write_read() {
        let pool = joint_pool();
        let mut msg = Message::new(&pool, "Pose").unwrap();
        let pose = Pose::from_euler(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, FRAC_PI_2));

        write_pose(&mut msg, &pose).unwrap();
        let read = read_pose(&msg).unwrap();

        assert_eq!(read.position, Vector3::new(1.0, 2.0, 3.0));
        assert!(read.euler().approx_eq(&Vector3::new(0.0, 0.0, FRAC_PI_2), 1e-9));
        let w = msg.sub_message("orientation").unwrap().get_f64("w").unwrap();
        assert!((w - (FRAC_PI_2 / 2.0).cos()).abs() < 1e-12);
    }

    #[test]
    fn test_fields_found_by_type_not_position() {
        let pool = SchemaPool::builder()
            .record("Vector3d", |r| r.double("x").double("y").double("z"))
            .record("Quaternion", |r| r.double("x").double("y").double("z").double("w"))
            .record("Pose", |r| {
                r.record("rot", "Quaternion").string("name").record("pos", "Vector3d")
            })
            .build()
            .unwrap();
        let schema = pool.record("Pose").unwrap();
        assert_eq!(
            find_parts(&pool, &schema),
            Some(("pos".to_string(), "rot".to_string()))
        );
    }
}
