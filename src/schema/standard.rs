//! Standard composite record types.
//!
//! These are the record shapes the composite recognizers know by name.
//! Applications add their own records on top with the same builder.

use super::SchemaPoolBuilder;

/// Type names of the standard records.
pub mod names {
    pub const VECTOR3D: &str = "Vector3d";
    pub const QUATERNION: &str = "Quaternion";
    pub const POSE: &str = "Pose";
    pub const COLOR: &str = "Color";
    pub const DENSITY: &str = "Density";
    pub const GEOMETRY: &str = "Geometry";
    pub const GEOMETRY_TYPE: &str = "GeometryType";
    pub const BOX_GEOM: &str = "BoxGeom";
    pub const CYLINDER_GEOM: &str = "CylinderGeom";
    pub const SPHERE_GEOM: &str = "SphereGeom";
    pub const MESH_GEOM: &str = "MeshGeom";
    pub const POLYLINE: &str = "Polyline";
}

impl SchemaPoolBuilder {
    /// Declare `Vector3d`, `Quaternion`, `Pose`, `Color`, `Density`,
    /// `Geometry` and the geometry shape records.
    pub fn with_standard_types(self) -> Self {
        use names::*;

        self.record(VECTOR3D, |r| r.double("x").double("y").double("z"))
            .record(QUATERNION, |r| r.double("x").double("y").double("z").double("w"))
            .record(POSE, |r| r.record("position", VECTOR3D).record("orientation", QUATERNION))
            .record(COLOR, |r| r.float("r").float("g").float("b").float("a"))
            .record(DENSITY, |r| r.double("density"))
            .enum_numbered(
                GEOMETRY_TYPE,
                &[
                    ("BOX", 1),
                    ("CYLINDER", 2),
                    ("SPHERE", 3),
                    ("MESH", 7),
                    ("POLYLINE", 10),
                ],
            )
            .record(BOX_GEOM, |r| r.record("size", VECTOR3D))
            .record(CYLINDER_GEOM, |r| r.double("radius").double("length"))
            .record(SPHERE_GEOM, |r| r.double("radius"))
            .record(MESH_GEOM, |r| r.string("filename").record("scale", VECTOR3D))
            .record(POLYLINE, |r| r.double("height").record("point", VECTOR3D).repeated())
            .record(GEOMETRY, |r| {
                r.enum_field("type", GEOMETRY_TYPE)
                    .record("box", BOX_GEOM)
                    .record("cylinder", CYLINDER_GEOM)
                    .record("sphere", SPHERE_GEOM)
                    .record("mesh", MESH_GEOM)
                    .record("polyline", POLYLINE)
                    .repeated()
            })
    }
}
