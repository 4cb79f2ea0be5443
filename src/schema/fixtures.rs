//! Shared test schemas.

use std::rc::Rc;

use super::SchemaPool;

/// Standard types plus a joint and a link record covering every field kind.
pub(crate) fn joint_pool() -> Rc<SchemaPool> {
    SchemaPool::builder()
        .with_standard_types()
        .enum_type("JointType", &["REVOLUTE", "PRISMATIC", "FIXED"])
        .record("Axis", |r| {
            r.record("xyz", "Vector3d")
                .double("limit_lower")
                .double("limit_upper")
                .double("damping")
                .bool("use_parent_model_frame")
        })
        .record("Joint", |r| {
            r.string("name")
                .uint32("id")
                .enum_field("type", "JointType")
                .record("pose", "Pose")
                .double("damping")
                .float("effort_scale")
                .string("tags")
                .repeated()
                .record("axis", "Axis")
        })
        .record("Material", |r| r.record("ambient", "Color").record("diffuse", "Color"))
        .record("VelocityDecay", |r| r.double("linear").double("angular"))
        .record("Empty", |r| r)
        .record("Link", |r| {
            r.string("name")
                .double("mass")
                .bool("self_collide")
                .int32("count")
                .int64("big")
                .uint64("ubig")
                .string("innerxml")
                .record("pose", "Pose")
                .record("material", "Material")
                .record("geometry", "Geometry")
                .record("density", "Density")
                .record("velocity_decay", "VelocityDecay")
                .record("empty", "Empty")
        })
        .build()
        .expect("fixture schema is valid")
}
