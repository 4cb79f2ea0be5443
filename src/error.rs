//! Error types.
//!
//! Nothing in synthesis or commit is fatal: per-field failures are collected
//! into reports and the form's diagnostics list, and the rest of the tree is
//! still processed.

use thiserror::Error;

use crate::schema::FieldKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    // Schema errors
    #[error("unknown record type '{0}'")]
    UnknownRecord(String),
    #[error("record '{record}' has no field '{field}'")]
    UnknownField { record: String, field: String },
    #[error("unknown enum type '{0}'")]
    UnknownEnum(String),
    #[error("field '{field}' holds enum number {number} that has no name")]
    UnresolvedEnumValue { field: String, number: i32 },
    #[error("enum '{enum_type}' has no value named '{name}'")]
    UnknownEnumName { enum_type: String, name: String },
    #[error("field '{field}' is {expected:?}, got {found:?}")]
    KindMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    // Shape mismatches
    #[error("widget '{path}' is a {kind} widget; expected {expected}")]
    ShapeMismatch {
        path: String,
        kind: &'static str,
        expected: &'static str,
    },
    #[error("widget '{path}' has no control {index}")]
    NoSuchControl { path: String, index: usize },

    // Registry
    #[error("a widget is already registered at '{0}'")]
    DuplicatePath(String),
    #[error("no widget registered at '{0}'")]
    UnknownPath(String),
    #[error("widget '{0}' is read-only")]
    ReadOnly(String),
    #[error("invalid widget name '{0}'")]
    InvalidName(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for FormError {
    fn from(err: toml::de::Error) -> Self {
        FormError::Config(err.to_string())
    }
}

pub type FormResult<T> = Result<T, FormError>;
