//! Named material densities.
//!
//! The material name shown next to a density value is a display convenience
//! only; the stored value is never snapped to a material.

/// Selection entry for values that match no material.
pub const CUSTOM_MATERIAL: &str = "Custom...";

/// A density within this distance (kg/m³) of a material selects it.
pub const MATERIAL_EPSILON: f64 = 1.0;

/// Material name and density in kg/m³, in ascending density.
pub const MATERIALS: [(&str, f64); 15] = [
    ("styrofoam", 75.0),
    ("pine", 373.0),
    ("wood", 700.0),
    ("oak", 710.0),
    ("ice", 916.0),
    ("water", 1000.0),
    ("plastic", 1175.0),
    ("concrete", 2000.0),
    ("aluminum", 2700.0),
    ("steel_alloy", 7600.0),
    ("steel_stainless", 7800.0),
    ("iron", 7874.0),
    ("brass", 8600.0),
    ("copper", 8940.0),
    ("tungsten", 19300.0),
];

pub fn material_density(name: &str) -> Option<f64> {
    MATERIALS
        .iter()
        .find(|(material, _)| *material == name)
        .map(|(_, density)| *density)
}

/// Closest material to `density` within `epsilon`, if any.
pub fn nearest_material(density: f64, epsilon: f64) -> Option<&'static str> {
    MATERIALS
        .iter()
        .map(|(name, d)| (*name, (d - density).abs()))
        .filter(|(_, distance)| *distance <= epsilon)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_material() {
        assert_eq!(nearest_material(1000.0, MATERIAL_EPSILON), Some("water"));
        assert_eq!(nearest_material(1000.9, MATERIAL_EPSILON), Some("water"));
        assert_eq!(nearest_material(1002.0, MATERIAL_EPSILON), None);
        assert_eq!(nearest_material(f64::NAN, MATERIAL_EPSILON), None);
    }

    #[test]
    fn test_material_density() {
        assert_eq!(material_density("tungsten"), Some(19300.0));
        assert_eq!(material_density(CUSTOM_MATERIAL), None);
    }
}
