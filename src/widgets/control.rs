//! Primitive controls.
//!
//! A widget is built from one or more controls. Every piece of control state
//! lives in a signal so a rendering surface can bind to it with `effect` or
//! `derived` and redraw only what changed.

use spark_signals::{Signal, signal};

use crate::error::{FormError, FormResult};
use crate::policy::ValueRange;
use crate::types::{ControlValue, Rgba};

// =============================================================================
// SpinBox
// =============================================================================

/// Numeric entry with a range, a step and a fixed number of decimals.
#[derive(Clone)]
pub struct SpinBox {
    value: Signal<f64>,
    range: ValueRange,
    step: f64,
    decimals: u32,
}

impl SpinBox {
    pub fn new(range: ValueRange, step: f64, decimals: u32, initial: f64) -> Self {
        let spin = Self {
            value: signal(0.0),
            range,
            step,
            decimals,
        };
        spin.set(initial);
        spin
    }

    /// Integer spin box (no decimals, unit step).
    pub fn integer(range: ValueRange) -> Self {
        Self::new(range, 1.0, 0, 0.0)
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    /// Clamp to the range and round to the display decimals.
    ///
    /// Returns the value actually stored. NaN stores 0.
    pub fn set(&self, value: f64) -> f64 {
        let value = if value.is_nan() { 0.0 } else { value };
        let clamped = self.range.clamp(value);
        let stored = round_to(clamped, self.decimals);
        self.value.set(stored);
        stored
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn signal(&self) -> Signal<f64> {
        self.value.clone()
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

// =============================================================================
// ComboBox
// =============================================================================

/// Selection from a list of named items.
#[derive(Clone)]
pub struct ComboBox {
    items: Signal<Vec<String>>,
    current: Signal<Option<usize>>,
}

impl ComboBox {
    pub fn new(items: Vec<String>) -> Self {
        let current = if items.is_empty() { None } else { Some(0) };
        Self {
            items: signal(items),
            current: signal(current),
        }
    }

    pub fn items(&self) -> Vec<String> {
        self.items.get()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current.get()
    }

    pub fn current_text(&self) -> Option<String> {
        let index = self.current.get()?;
        self.items.get().get(index).cloned()
    }

    /// Select the item named `text`. Returns false when there is none.
    pub fn set_current_text(&self, text: &str) -> bool {
        match self.items.get().iter().position(|item| item == text) {
            Some(index) => {
                self.current.set(Some(index));
                true
            }
            None => false,
        }
    }

    pub fn add_item(&self, item: &str) {
        let mut items = self.items.get();
        items.push(item.to_string());
        let first = items.len() == 1;
        self.items.set(items);
        if first {
            self.current.set(Some(0));
        }
    }

    /// Remove the item named `item`, keeping the selection on the same text
    /// when it survives. Returns false when there is no such item.
    pub fn remove_item(&self, item: &str) -> bool {
        let mut items = self.items.get();
        let Some(index) = items.iter().position(|i| i == item) else {
            return false;
        };
        let selected = self.current_text();
        items.remove(index);

        let current = match selected {
            Some(text) if text != item => items.iter().position(|i| *i == text),
            _ if items.is_empty() => None,
            _ => Some(index.min(items.len() - 1)),
        };
        self.items.set(items);
        self.current.set(current);
        true
    }

    pub fn clear(&self) {
        self.items.set(Vec::new());
        self.current.set(None);
    }

    pub fn items_signal(&self) -> Signal<Vec<String>> {
        self.items.clone()
    }

    pub fn current_signal(&self) -> Signal<Option<usize>> {
        self.current.clone()
    }
}

// =============================================================================
// Control
// =============================================================================

/// Editing surface of one control.
#[derive(Clone)]
pub enum Input {
    Spin(SpinBox),
    Line { text: Signal<String>, multiline: bool },
    Toggle(Signal<bool>),
    Combo(ComboBox),
}

impl Input {
    pub fn line(text: &str, multiline: bool) -> Self {
        Input::Line {
            text: signal(text.to_string()),
            multiline,
        }
    }

    pub fn toggle(on: bool) -> Self {
        Input::Toggle(signal(on))
    }
}

/// One labelled control of a widget.
pub struct Control {
    pub name: &'static str,
    pub label: String,
    pub label_color: Option<Rgba>,
    pub unit: Signal<String>,
    pub visible: Signal<bool>,
    pub input: Input,
}

impl Control {
    pub fn new(name: &'static str, label: impl Into<String>, input: Input) -> Self {
        Self {
            name,
            label: label.into(),
            label_color: None,
            unit: signal(String::new()),
            visible: signal(true),
            input,
        }
    }

    pub fn with_unit(self, unit: &str) -> Self {
        self.unit.set(unit.to_string());
        self
    }

    pub fn with_color(mut self, color: Option<Rgba>) -> Self {
        self.label_color = color;
        self
    }

    pub fn value(&self) -> ControlValue {
        match &self.input {
            Input::Spin(spin) => ControlValue::Number(spin.value()),
            Input::Line { text, .. } => ControlValue::Text(text.get()),
            Input::Toggle(on) => ControlValue::Flag(on.get()),
            Input::Combo(combo) => ControlValue::Choice(combo.current_text().unwrap_or_default()),
        }
    }

    /// Apply an edited value. The value must match the input type.
    pub fn set(&self, path: &str, value: &ControlValue) -> FormResult<()> {
        match (&self.input, value) {
            (Input::Spin(spin), ControlValue::Number(v)) => {
                spin.set(*v);
            }
            (Input::Line { text, .. }, ControlValue::Text(v)) => {
                text.set(v.clone());
            }
            (Input::Toggle(on), ControlValue::Flag(v)) => {
                on.set(*v);
            }
            (Input::Combo(combo), ControlValue::Choice(v)) => {
                if !combo.set_current_text(v) {
                    return Err(FormError::UnknownEnumName {
                        enum_type: format!("{path}::{}", self.name),
                        name: v.clone(),
                    });
                }
            }
            _ => {
                return Err(FormError::ShapeMismatch {
                    path: path.to_string(),
                    kind: self.input_name(),
                    expected: control_value_name(value),
                });
            }
        }
        Ok(())
    }

    pub fn input_name(&self) -> &'static str {
        match self.input {
            Input::Spin(_) => "spin",
            Input::Line { .. } => "line",
            Input::Toggle(_) => "toggle",
            Input::Combo(_) => "combo",
        }
    }

    pub fn spin(&self) -> Option<&SpinBox> {
        match &self.input {
            Input::Spin(spin) => Some(spin),
            _ => None,
        }
    }

    pub fn combo(&self) -> Option<&ComboBox> {
        match &self.input {
            Input::Combo(combo) => Some(combo),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
}

fn control_value_name(value: &ControlValue) -> &'static str {
    match value {
        ControlValue::Number(_) => "number",
        ControlValue::Text(_) => "text",
        ControlValue::Flag(_) => "flag",
        ControlValue::Choice(_) => "choice",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_clamps_and_rounds() {
        let spin = SpinBox::new(ValueRange::UNIT, 0.01, 3, 0.0);
        assert_eq!(spin.set(0.12345), 0.123);
        assert_eq!(spin.set(7.0), 1.0);
        assert_eq!(spin.set(-1.0), 0.0);
        assert_eq!(spin.set(f64::NAN), 0.0);
    }

    #[test]
    fn test_spin_unbounded_keeps_extremes() {
        let spin = SpinBox::new(ValueRange::UNBOUNDED, 0.01, 8, 0.0);
        assert_eq!(spin.set(f64::MAX), f64::MAX);
        assert_eq!(spin.set(1.234567891), 1.23456789);
    }

    #[test]
    fn test_combo_selection() {
        let combo = ComboBox::new(vec!["A".into(), "B".into()]);
        assert_eq!(combo.current_text().as_deref(), Some("A"));
        assert!(combo.set_current_text("B"));
        assert!(!combo.set_current_text("C"));
        assert_eq!(combo.current_index(), Some(1));
    }

    #[test]
    fn test_combo_remove_keeps_selection() {
        let combo = ComboBox::new(vec!["A".into(), "B".into(), "C".into()]);
        combo.set_current_text("C");
        assert!(combo.remove_item("A"));
        assert_eq!(combo.current_text().as_deref(), Some("C"));

        assert!(combo.remove_item("C"));
        assert_eq!(combo.current_text().as_deref(), Some("B"));
        assert!(!combo.remove_item("Z"));

        combo.clear();
        assert_eq!(combo.current_text(), None);
        combo.add_item("D");
        assert_eq!(combo.current_text().as_deref(), Some("D"));
    }

    #[test]
    fn test_control_rejects_wrong_value_type() {
        let control = Control::new("value", "Mass", Input::toggle(false));
        let err = control.set("mass", &ControlValue::Number(1.0)).unwrap_err();
        assert!(matches!(err, FormError::ShapeMismatch { kind: "toggle", .. }));
        control.set("mass", &ControlValue::Flag(true)).unwrap();
        assert_eq!(control.value(), ControlValue::Flag(true));
    }
}
