//! Theme presets for spark-form.
//!
//! - light (default - white to grey nesting backgrounds)
//! - dark
//! - contrast

use super::Theme;
use crate::types::Rgba;

const AXIS_X: Rgba = Rgba::rgb(0xd4, 0x2b, 0x2b); // red
const AXIS_Y: Rgba = Rgba::rgb(0x3b, 0xc4, 0x3b); // green
const AXIS_Z: Rgba = Rgba::rgb(0x0d, 0x0d, 0xf2); // blue

/// Light theme - backgrounds darken one step per nesting level.
pub fn light() -> Theme {
    Theme {
        name: "light".to_string(),
        backgrounds: [
            Rgba::from_rgb_int(0xFFFFFF),
            Rgba::from_rgb_int(0xDDDDDD),
            Rgba::from_rgb_int(0xBBBBBB),
            Rgba::from_rgb_int(0x999999),
        ],
        text: Rgba::BLACK,
        axis_x: AXIS_X,
        axis_y: AXIS_Y,
        axis_z: AXIS_Z,
        indent: 2,
    }
}

/// Dark theme - backgrounds lighten one step per nesting level.
pub fn dark() -> Theme {
    Theme {
        name: "dark".to_string(),
        backgrounds: [
            Rgba::from_rgb_int(0x1e1e1e),
            Rgba::from_rgb_int(0x2a2a2a),
            Rgba::from_rgb_int(0x363636),
            Rgba::from_rgb_int(0x424242),
        ],
        text: Rgba::from_rgb_int(0xe0e0e0),
        axis_x: Rgba::from_rgb_int(0xff5c5c),
        axis_y: Rgba::from_rgb_int(0x5cd65c),
        axis_z: Rgba::from_rgb_int(0x6b8cff),
        indent: 2,
    }
}

/// High contrast theme.
pub fn contrast() -> Theme {
    Theme {
        name: "contrast".to_string(),
        backgrounds: [Rgba::BLACK, Rgba::BLACK, Rgba::BLACK, Rgba::BLACK],
        text: Rgba::WHITE,
        axis_x: Rgba::from_rgb_int(0xff4040),
        axis_y: Rgba::from_rgb_int(0x40ff40),
        axis_z: Rgba::from_rgb_int(0x40c0ff),
        indent: 3,
    }
}

/// Get a preset theme by name (case-insensitive).
pub fn get_preset(name: &str) -> Option<Theme> {
    match name.to_lowercase().as_str() {
        "light" => Some(light()),
        "dark" => Some(dark()),
        "contrast" => Some(contrast()),
        _ => None,
    }
}

/// List all available preset names.
pub fn preset_names() -> &'static [&'static str] {
    &["light", "dark", "contrast"]
}

// =============================================================================
// Tests
// =============================================================================
