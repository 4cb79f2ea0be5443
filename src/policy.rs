//! Unit / Range Policy.
//!
//! Numeric range and display unit per field name (the last segment of the
//! scoped path). Some units depend on the joint type of the message being
//! edited: a prismatic joint moves linearly, any other joint rotates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Joint type name that selects linear units.
pub const PRISMATIC: &str = "PRISMATIC";

/// Inclusive numeric range for a spin control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl ValueRange {
    pub const UNBOUNDED: Self = Self::new(-f64::MAX, f64::MAX);
    pub const NON_NEGATIVE: Self = Self::new(0.0, f64::MAX);
    pub const UNIT: Self = Self::new(0.0, 1.0);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// NaN bounds are ignored.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Display unit for a field.
///
/// With `prismatic` set, the rule is joint-dependent: `prismatic` applies to
/// prismatic joints, `unit` to every other joint type, and no unit is shown
/// when the message has no joint type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRule {
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prismatic: Option<String>,
}

impl UnitRule {
    pub fn fixed(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            prismatic: None,
        }
    }

    pub fn joint(prismatic: &str, revolute: &str) -> Self {
        Self {
            unit: revolute.to_string(),
            prismatic: Some(prismatic.to_string()),
        }
    }

    pub fn resolve(&self, joint_type: Option<&str>) -> String {
        match (&self.prismatic, joint_type) {
            (None, _) => self.unit.clone(),
            (Some(_), None) => String::new(),
            (Some(linear), Some(joint)) if joint.eq_ignore_ascii_case(PRISMATIC) => linear.clone(),
            (Some(_), Some(_)) => self.unit.clone(),
        }
    }
}

/// Range and unit tables keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPolicy {
    pub ranges: HashMap<String, ValueRange>,
    pub units: HashMap<String, UnitRule>,
}

impl Default for FieldPolicy {
    fn default() -> Self {
        let mut ranges = HashMap::new();
        for key in [
            "mass", "ixx", "ixy", "ixz", "iyy", "iyz", "izz", "length", "min_depth", "radius",
            "density",
        ] {
            ranges.insert(key.to_string(), ValueRange::NON_NEGATIVE);
        }
        for key in [
            "bounce",
            "transparency",
            "laser_retro",
            "ambient",
            "diffuse",
            "specular",
            "emissive",
            "restitution_coefficient",
        ] {
            ranges.insert(key.to_string(), ValueRange::UNIT);
        }

        let mut units = HashMap::new();
        let mut fixed = |keys: &[&str], unit: &str| {
            for key in keys {
                units.insert(key.to_string(), UnitRule::fixed(unit));
            }
        };
        fixed(&["pos", "length", "min_depth"], "m");
        fixed(&["rot"], "rad");
        fixed(&["kp", "kd"], "N/m");
        fixed(&["max_vel"], "m/s");
        fixed(&["mass"], "kg");
        fixed(&["ixx", "ixy", "ixz", "iyy", "iyz", "izz"], "kg·m²");
        fixed(&["density"], "kg/m³");

        for (keys, prismatic, revolute) in [
            (&["limit_lower", "limit_upper"][..], "m", "rad"),
            (&["limit_effort"][..], "N", "Nm"),
            (&["limit_velocity", "velocity"][..], "m/s", "rad/s"),
            (&["damping"][..], "Ns/m", "Nms/rad"),
            (&["friction"][..], "N", "Nm"),
        ] {
            for key in keys {
                units.insert(key.to_string(), UnitRule::joint(prismatic, revolute));
            }
        }

        Self { ranges, units }
    }
}

impl FieldPolicy {
    /// Policy with no ranges and no units.
    pub fn empty() -> Self {
        Self {
            ranges: HashMap::new(),
            units: HashMap::new(),
        }
    }

    pub fn range_for(&self, key: &str) -> ValueRange {
        self.ranges.get(key).copied().unwrap_or_default()
    }

    /// Unit label for `key`; empty when the field has none.
    pub fn unit_for(&self, key: &str, joint_type: Option<&str>) -> String {
        self.units
            .get(key)
            .map(|rule| rule.resolve(joint_type))
            .unwrap_or_default()
    }

    /// Entries of `other` replace entries of `self` with the same key.
    pub fn merge(&mut self, other: FieldPolicy) {
        self.ranges.extend(other.ranges);
        self.units.extend(other.units);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranges() {
        let policy = FieldPolicy::default();
        assert_eq!(policy.range_for("mass"), ValueRange::NON_NEGATIVE);
        assert_eq!(policy.range_for("transparency"), ValueRange::UNIT);
        assert_eq!(policy.range_for("x"), ValueRange::UNBOUNDED);
        assert_eq!(policy.range_for("transparency").clamp(1.5), 1.0);
    }

    #[test]
    fn test_clamp_ignores_nan_bounds() {
        assert_eq!(ValueRange::new(f64::NAN, 1.0).clamp(3.0), 1.0);
        assert_eq!(ValueRange::new(0.0, f64::NAN).clamp(-2.0), 0.0);
        assert_eq!(ValueRange::new(f64::NAN, f64::NAN).clamp(0.5), 0.5);
    }

    #[test]
    fn test_fixed_units() {
        let policy = FieldPolicy::default();
        assert_eq!(policy.unit_for("mass", None), "kg");
        assert_eq!(policy.unit_for("density", Some("REVOLUTE")), "kg/m³");
        assert_eq!(policy.unit_for("name", None), "");
    }

    #[test]
    fn test_joint_dependent_units() {
        let policy = FieldPolicy::default();
        assert_eq!(policy.unit_for("limit_lower", Some("PRISMATIC")), "m");
        assert_eq!(policy.unit_for("limit_lower", Some("REVOLUTE")), "rad");
        assert_eq!(policy.unit_for("damping", Some("prismatic")), "Ns/m");
        assert_eq!(policy.unit_for("damping", Some("REVOLUTE")), "Nms/rad");
        assert_eq!(policy.unit_for("damping", None), "");
    }

    #[test]
    fn test_merge_replaces_by_key() {
        let mut policy = FieldPolicy::default();
        let mut extra = FieldPolicy::empty();
        extra.ranges.insert("mass".into(), ValueRange::new(1.0, 10.0));
        extra.units.insert("stiffness".into(), UnitRule::fixed("N/m"));

        policy.merge(extra);
        assert_eq!(policy.range_for("mass"), ValueRange::new(1.0, 10.0));
        assert_eq!(policy.unit_for("stiffness", None), "N/m");
        assert_eq!(policy.unit_for("mass", None), "kg");
    }
}
