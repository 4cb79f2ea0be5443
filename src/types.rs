//! Core types for spark-form.
//!
//! Domain values that flow between the message accessor, the composite
//! recognizers and the widget kinds, plus the display color type used by
//! the theme.

use std::fmt;
use std::ops::Neg;

use serde::{Deserialize, Serialize};

// =============================================================================
// Vector3
// =============================================================================

/// Three-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const UNIT_X: Self = Self::new(1.0, 0.0, 0.0);
    pub const UNIT_Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Components as an array, in x, y, z order.
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub const fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.x, self.y, self.z)
    }
}

// =============================================================================
// Color
// =============================================================================

/// RGBA color with floating channels in `[0, 1]`.
///
/// This is the *data* color carried by messages. Display colors used by the
/// theme are [`Rgba`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn from_array(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

// =============================================================================
// Quaternion
// =============================================================================

/// Orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 0.0);

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Unit quaternion for the given roll (X), pitch (Y), yaw (Z) angles.
    pub fn from_euler(euler: Vector3) -> Self {
        let (sr, cr) = (euler.x * 0.5).sin_cos();
        let (sp, cp) = (euler.y * 0.5).sin_cos();
        let (sy, cy) = (euler.z * 0.5).sin_cos();

        Self::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
        .normalized()
    }

    /// Roll, pitch, yaw of this rotation.
    ///
    /// Pitch saturates to ±π/2 at the gimbal-lock singularity.
    pub fn to_euler(self) -> Vector3 {
        let q = self.normalized();
        let (sqw, sqx, sqy, sqz) = (q.w * q.w, q.x * q.x, q.y * q.y, q.z * q.z);

        let roll = (2.0 * (q.y * q.z + q.w * q.x)).atan2(sqw - sqx - sqy + sqz);

        let sarg = -2.0 * (q.x * q.z - q.w * q.y);
        let pitch = if sarg <= -1.0 {
            -std::f64::consts::FRAC_PI_2
        } else if sarg >= 1.0 {
            std::f64::consts::FRAC_PI_2
        } else {
            sarg.asin()
        };

        let yaw = (2.0 * (q.x * q.y + q.w * q.z)).atan2(sqw + sqx - sqy - sqz);

        Vector3::new(roll, pitch, yaw)
    }

    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit-length copy. A zero quaternion normalizes to identity.
    pub fn normalized(self) -> Self {
        let n = self.norm();
        if n <= f64::EPSILON {
            return Self::IDENTITY;
        }
        Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
    }
}

// =============================================================================
// Pose
// =============================================================================

/// Position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vector3,
    pub orientation: Quaternion,
}

impl Pose {
    pub const fn new(position: Vector3, orientation: Quaternion) -> Self {
        Self { position, orientation }
    }

    /// Build from position and roll/pitch/yaw.
    pub fn from_euler(position: Vector3, euler: Vector3) -> Self {
        Self::new(position, Quaternion::from_euler(euler))
    }

    pub fn euler(&self) -> Vector3 {
        self.orientation.to_euler()
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Shape selected by a geometry record's `type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryShape {
    Box,
    Cylinder,
    Sphere,
    Mesh,
    Polyline,
}

impl GeometryShape {
    /// All shapes in selection-list order.
    pub const ALL: [GeometryShape; 5] = [
        GeometryShape::Box,
        GeometryShape::Cylinder,
        GeometryShape::Sphere,
        GeometryShape::Mesh,
        GeometryShape::Polyline,
    ];

    /// Lowercase display name; also the name of the dimension sub-record.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Cylinder => "cylinder",
            Self::Sphere => "sphere",
            Self::Mesh => "mesh",
            Self::Polyline => "polyline",
        }
    }

    /// Enum value name used in the `type` field (uppercase).
    pub const fn enum_name(&self) -> &'static str {
        match self {
            Self::Box => "BOX",
            Self::Cylinder => "CYLINDER",
            Self::Sphere => "SPHERE",
            Self::Mesh => "MESH",
            Self::Polyline => "POLYLINE",
        }
    }

    /// Case-insensitive parse of a display or enum name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "box" => Some(Self::Box),
            "cylinder" => Some(Self::Cylinder),
            "sphere" => Some(Self::Sphere),
            "mesh" => Some(Self::Mesh),
            "polyline" => Some(Self::Polyline),
            _ => None,
        }
    }
}

impl fmt::Display for GeometryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry as edited: shape, full-extent dimensions and mesh URI.
///
/// Dimensions are always full extents: for cylinders `(diameter, diameter,
/// length)`, for spheres `(diameter, diameter, diameter)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryValue {
    pub shape: GeometryShape,
    pub dimensions: Vector3,
    pub uri: String,
}

impl GeometryValue {
    pub fn new(shape: GeometryShape, dimensions: Vector3) -> Self {
        Self {
            shape,
            dimensions,
            uri: String::new(),
        }
    }

    pub fn mesh(uri: impl Into<String>, scale: Vector3) -> Self {
        Self {
            shape: GeometryShape::Mesh,
            dimensions: scale,
            uri: uri.into(),
        }
    }
}

// =============================================================================
// Widget values
// =============================================================================

/// Value held by a widget, as seen by getters, setters and events.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetValue {
    Int(i64),
    UInt(u64),
    Double(f64),
    Bool(bool),
    String(String),
    /// Enum value name.
    Enum(String),
    Vector3(Vector3),
    Color(Color),
    Pose(Pose),
    Geometry(GeometryValue),
    Density(f64),
}

impl WidgetValue {
    /// Short kind name used in diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
            Self::Vector3(_) => "vector3",
            Self::Color(_) => "color",
            Self::Pose(_) => "pose",
            Self::Geometry(_) => "geometry",
            Self::Density(_) => "density",
        }
    }
}

/// Value of one primitive control, as edited by the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Number(f64),
    Text(String),
    Flag(bool),
    /// Selected item name of a selection control.
    Choice(String),
}

// =============================================================================
// Rgba (display color)
// =============================================================================

/// Display color with 8-bit channels, used by the theme.
///
/// Serialized as a hex string (`#RRGGBB` or `#RRGGBBAA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create from a packed `0xRRGGBB` integer.
    pub const fn from_rgb_int(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        )
    }

    /// Parse hex color string (#RGB, #RRGGBB, #RRGGBBAA).
    ///
    /// Returns None for invalid format.
    ///
    /// ```
    /// use spark_form::types::Rgba;
    ///
    /// assert_eq!(Rgba::from_hex("#d42b2b"), Some(Rgba::rgb(0xd4, 0x2b, 0x2b)));
    /// assert_eq!(Rgba::from_hex("fff"), Some(Rgba::WHITE));
    /// assert!(Rgba::from_hex("#gg0000").is_none());
    /// ```
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');

        fn hex_digit(c: u8) -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        }

        fn hex_byte(s: &[u8], i: usize) -> Option<u8> {
            let high = hex_digit(s[i])?;
            let low = hex_digit(s[i + 1])?;
            Some((high << 4) | low)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = hex_digit(bytes[0])?;
                let g = hex_digit(bytes[1])?;
                let b = hex_digit(bytes[2])?;
                Some(Self::rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
            }
            6 => Some(Self::rgb(
                hex_byte(bytes, 0)?,
                hex_byte(bytes, 2)?,
                hex_byte(bytes, 4)?,
            )),
            8 => Some(Self::new(
                hex_byte(bytes, 0)?,
                hex_byte(bytes, 2)?,
                hex_byte(bytes, 4)?,
                hex_byte(bytes, 6)?,
            )),
            _ => None,
        }
    }

    /// `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Relative luminance for WCAG contrast calculations.
    #[cfg(test)]
    pub(crate) fn relative_luminance(&self) -> f32 {
        fn channel_luminance(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        0.2126 * channel_luminance(self.r)
            + 0.7152 * channel_luminance(self.g)
            + 0.0722 * channel_luminance(self.b)
    }

    /// WCAG 2.1 contrast ratio between two colors (1.0 to 21.0).
    #[cfg(test)]
    pub(crate) fn contrast_ratio(c1: Self, c2: Self) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        (l1.max(l2) + 0.05) / (l1.min(l2) + 0.05)
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid hex color '{value}'"))
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_quaternion_yaw_round_trip() {
        let q = Quaternion::from_euler(Vector3::new(0.0, 0.0, FRAC_PI_2));
        assert!((q.w - (FRAC_PI_2 * 0.5).cos()).abs() < 1e-12);
        assert!((q.z - (FRAC_PI_2 * 0.5).sin()).abs() < 1e-12);

        let euler = q.to_euler();
        assert!(euler.approx_eq(&Vector3::new(0.0, 0.0, FRAC_PI_2), 1e-9));
    }

    #[test]
    fn test_quaternion_mixed_angles() {
        let angles = Vector3::new(0.3, -0.4, 1.2);
        let euler = Quaternion::from_euler(angles).to_euler();
        assert!(euler.approx_eq(&angles, 1e-9));
    }

    #[test]
    fn test_quaternion_pitch_saturates() {
        let euler = Quaternion::from_euler(Vector3::new(0.0, FRAC_PI_2, 0.0)).to_euler();
        assert!((euler.y - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_zero_quaternion_normalizes_to_identity() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0).normalized();
        assert_eq!(q, Quaternion::IDENTITY);
    }

    #[test]
    fn test_geometry_shape_parse() {
        assert_eq!(GeometryShape::parse("SPHERE"), Some(GeometryShape::Sphere));
        assert_eq!(GeometryShape::parse(" mesh "), Some(GeometryShape::Mesh));
        assert_eq!(GeometryShape::parse("plane"), None);
        assert_eq!(GeometryShape::Cylinder.enum_name(), "CYLINDER");
    }

    #[test]
    fn test_rgba_hex_round_trip() {
        let c = Rgba::from_rgb_int(0x3bc43b);
        assert_eq!(c.to_hex(), "#3bc43b");
        assert_eq!(Rgba::from_hex(&c.to_hex()), Some(c));

        let semi = Rgba::new(1, 2, 3, 4);
        assert_eq!(semi.to_hex(), "#01020304");
    }

    #[test]
    fn test_contrast_ratio_black_white() {
        let ratio = Rgba::contrast_ratio(Rgba::BLACK, Rgba::WHITE);
        assert!((ratio - 21.0).abs() < 0.01);
    }
}
