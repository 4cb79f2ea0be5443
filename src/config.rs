//! Form configuration: theme and unit/range policy.
//!
//! Configuration is built in code or loaded from TOML. TOML values override
//! the built-in defaults entry by entry:
//!
//! ```toml
//! [theme]
//! preset = "dark"
//! indent = 4
//!
//! [ranges.stiffness]
//! min = 0.0
//! max = 1000000.0
//!
//! [units.stiffness]
//! unit = "N/m"
//!
//! [units.travel]
//! unit = "rad"
//! prismatic = "m"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{FormError, FormResult};
use crate::policy::{FieldPolicy, UnitRule, ValueRange};
use crate::theme::{Theme, ThemeOverrides};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormConfig {
    pub theme: Theme,
    pub policy: FieldPolicy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FormToml {
    theme: ThemeOverrides,
    ranges: HashMap<String, ValueRange>,
    units: HashMap<String, UnitRule>,
}

impl FormToml {
    fn into_config(self) -> FormResult<FormConfig> {
        let theme = self.theme.apply(Theme::default()).ok_or_else(|| {
            FormError::Config(format!(
                "unknown theme preset '{}'",
                self.theme.preset.as_deref().unwrap_or_default()
            ))
        })?;

        for (key, range) in &self.ranges {
            // Also rejects NaN bounds.
            if !(range.min <= range.max) {
                return Err(FormError::Config(format!(
                    "range for '{key}' has invalid bounds {}..{}",
                    range.min, range.max
                )));
            }
        }

        let mut policy = FieldPolicy::default();
        policy.merge(FieldPolicy {
            ranges: self.ranges,
            units: self.units,
        });

        Ok(FormConfig { theme, policy })
    }
}

impl FormConfig {
    pub fn new(theme: Theme, policy: FieldPolicy) -> Self {
        Self { theme, policy }
    }

    /// Parse TOML text over the defaults.
    pub fn from_toml_str(text: &str) -> FormResult<Self> {
        let raw: FormToml = toml::from_str(text)?;
        raw.into_config()
    }

    pub fn load(path: impl AsRef<Path>) -> FormResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| FormError::Config(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
