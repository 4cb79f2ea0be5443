//! Theme System for spark-form.
//!
//! A [`Theme`] is passed explicitly to the widget factory; nothing reads
//! global style state. It carries the per-nesting-level background colors,
//! the axis label colors used by vector, pose and geometry widgets, and the
//! indentation step.
//!
//! # Example
//!
//! ```rust
//! use spark_form::theme::get_preset;
//!
//! let light = get_preset("light").unwrap();
//! assert_eq!(light.background(0).to_hex(), "#ffffff");
//! assert_eq!(light.background(9), light.background(3));
//! ```

use serde::{Deserialize, Serialize};

use crate::types::Rgba;

pub mod presets;

pub use presets::*;

/// Number of distinct nesting-level backgrounds; deeper levels reuse the last.
pub const LEVELS: usize = 4;

// =============================================================================
// Theme
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    /// Group background by nesting level, outermost first.
    pub backgrounds: [Rgba; LEVELS],
    /// Label text.
    pub text: Rgba,
    pub axis_x: Rgba,
    pub axis_y: Rgba,
    pub axis_z: Rgba,
    /// Indentation added per nesting level, in cells.
    pub indent: u16,
}

impl Default for Theme {
    fn default() -> Self {
        presets::light()
    }
}

impl Theme {
    /// Background for a nesting level.
    pub fn background(&self, level: usize) -> Rgba {
        self.backgrounds[level.min(LEVELS - 1)]
    }

    pub fn indent_for(&self, level: usize) -> u16 {
        self.indent.saturating_mul(level.min(u16::MAX as usize) as u16)
    }

    /// Axis label color for component `index` (0 = x, 1 = y, 2 = z).
    pub fn axis_color(&self, index: usize) -> Option<Rgba> {
        match index {
            0 => Some(self.axis_x),
            1 => Some(self.axis_y),
            2 => Some(self.axis_z),
            _ => None,
        }
    }
}

/// Partial theme as read from configuration; set fields replace the base.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeOverrides {
    pub preset: Option<String>,
    pub backgrounds: Option<[Rgba; LEVELS]>,
    pub text: Option<Rgba>,
    pub axis_x: Option<Rgba>,
    pub axis_y: Option<Rgba>,
    pub axis_z: Option<Rgba>,
    pub indent: Option<u16>,
}

impl ThemeOverrides {
    /// Apply on top of `base`. Returns `None` for an unknown preset name.
    pub fn apply(&self, base: Theme) -> Option<Theme> {
        let mut theme = match &self.preset {
            Some(name) => get_preset(name)?,
            None => base,
        };
        if let Some(backgrounds) = self.backgrounds {
            theme.backgrounds = backgrounds;
        }
        if let Some(text) = self.text {
            theme.text = text;
        }
        if let Some(c) = self.axis_x {
            theme.axis_x = c;
        }
        if let Some(c) = self.axis_y {
            theme.axis_y = c;
        }
        if let Some(c) = self.axis_z {
            theme.axis_z = c;
        }
        if let Some(indent) = self.indent {
            theme.indent = indent;
        }
        Some(theme)
    }
}
