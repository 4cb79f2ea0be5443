//! Commit - write edited widget values back into a message.
//!
//! Mirrors the synthesis walk over the message schema. For each registered,
//! non-read-only field the widget value is compared with the value the
//! message currently shows, and only differing values are written; fields
//! the user never touched keep their presence state. A read-only widget
//! excludes itself and everything beneath it.

use std::rc::Rc;

use tracing::{debug, warn};

use super::registry::WidgetRegistry;
use super::synthesize::read_field;
use crate::composite::recognize;
use crate::error::{FormError, FormResult};
use crate::schema::{FieldDescriptor, Message, Value, scoped_path};
use crate::types::WidgetValue;
use crate::widgets::{Widget, WidgetKind};

/// Outcome of one commit pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReport {
    /// Fields written with a new value.
    pub written: usize,
    /// Fields whose widget still shows the message value.
    pub unchanged: usize,
    /// Registered fields excluded by their own or an ancestor's read-only flag.
    pub skipped_read_only: usize,
    pub errors: Vec<FormError>,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Write the registry's widget values into `msg`.
pub fn commit(registry: &WidgetRegistry, msg: &mut Message) -> CommitReport {
    let mut report = CommitReport::default();
    commit_record(registry, msg, "", &mut report);
    debug!(
        record = msg.type_name(),
        written = report.written,
        unchanged = report.unchanged,
        read_only = report.skipped_read_only,
        errors = report.errors.len(),
        "commit finished"
    );
    report
}

fn commit_record(registry: &WidgetRegistry, msg: &mut Message, path: &str, report: &mut CommitReport) {
    let schema = Rc::clone(msg.schema());
    for field in &schema.fields {
        if field.is_repeated() {
            continue;
        }
        let scoped = scoped_path(path, &field.name);
        let Some(id) = registry.lookup(&scoped) else {
            continue;
        };
        if registry.is_effectively_read_only(id) {
            report.skipped_read_only += 1;
            continue;
        }
        let Some(widget) = registry.get(id) else {
            continue;
        };

        if let Err(err) = commit_field(registry, msg, field, &scoped, widget, report) {
            warn!(path = %scoped, error = %err, "field not committed");
            report.errors.push(err);
        }
    }
}

fn commit_field(
    registry: &WidgetRegistry,
    msg: &mut Message,
    field: &FieldDescriptor,
    path: &str,
    widget: &Widget,
    report: &mut CommitReport,
) -> FormResult<()> {
    if widget.kind() == WidgetKind::Record {
        let current = msg.sub_message(&field.name)?;
        let mut edited = current.clone();
        commit_record(registry, &mut edited, path, report);
        if edited != current {
            msg.set(&field.name, Value::Record(edited))?;
        }
        return Ok(());
    }

    let value = widget.value()?;
    if let Ok(Some(current)) = read_field(msg, field) {
        if current == value {
            report.unchanged += 1;
            return Ok(());
        }
    }

    write_field(msg, field, &value)?;
    report.written += 1;
    Ok(())
}

/// Store a widget value in a non-repeated field of `msg`.
pub(crate) fn write_field(msg: &mut Message, field: &FieldDescriptor, value: &WidgetValue) -> FormResult<()> {
    let name = field.name.as_str();
    match value {
        WidgetValue::Int(v) => msg.set_i64(name, *v),
        WidgetValue::UInt(v) => msg.set_u64(name, *v),
        WidgetValue::Double(v) => msg.set_f64(name, *v),
        WidgetValue::Bool(v) => msg.set_bool(name, *v),
        WidgetValue::String(v) => msg.set_string(name, v.as_str()),
        WidgetValue::Enum(v) => msg.set_enum_name(name, v),
        WidgetValue::Vector3(_)
        | WidgetValue::Color(_)
        | WidgetValue::Pose(_)
        | WidgetValue::Geometry(_)
        | WidgetValue::Density(_) => {
            let kind = recognize(msg.pool(), field).ok_or_else(|| FormError::ShapeMismatch {
                path: name.to_string(),
                kind: value.kind_name(),
                expected: "record",
            })?;
            kind.write(msg.sub_message_mut(name)?, value)
        }
    }
}
