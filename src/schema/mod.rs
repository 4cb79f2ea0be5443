//! Schema Module - Runtime record and enum descriptions.
//!
//! A [`SchemaPool`] holds every record and enum type a form can reflect over.
//! Pools are built once with [`SchemaPoolBuilder`], validated, and then shared
//! immutably (`Rc<SchemaPool>`) by every [`Message`] created from them.
//!
//! # Reflection API
//!
//! - [`SchemaPool::fields`] - ordered field descriptors of a record type
//! - [`FieldDescriptor::kind`] - primitive kind of a field
//! - [`SchemaPool::enum_values`] - ordered value names of an enum field
//! - [`SchemaPool::nested_type_name`] - record type name of a record field
//!
//! # Example
//!
//! ```
//! use spark_form::schema::SchemaPool;
//!
//! let pool = SchemaPool::builder()
//!     .with_standard_types()
//!     .enum_type("JointType", &["REVOLUTE", "PRISMATIC"])
//!     .record("Joint", |r| {
//!         r.string("name")
//!             .enum_field("type", "JointType")
//!             .record("pose", "Pose")
//!             .double("damping")
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(pool.fields("Joint").unwrap().len(), 4);
//! ```

mod message;
mod standard;

#[cfg(test)]
pub(crate) mod fixtures;

pub use message::{Message, Value};
pub use standard::names as type_names;

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{FormError, FormResult};

/// Separator between field names in a scoped path.
pub const PATH_SEPARATOR: &str = "::";

// =============================================================================
// Field descriptors
// =============================================================================

/// Primitive kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Enum,
    Record,
}

impl FieldKind {
    pub const fn is_signed_integer(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }

    pub const fn is_unsigned_integer(&self) -> bool {
        matches!(self, Self::UInt32 | Self::UInt64)
    }

    pub const fn is_floating(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    pub const fn is_numeric(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer() || self.is_floating()
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldLabel {
    #[default]
    Optional,
    Required,
    Repeated,
}

/// One field of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub label: FieldLabel,
    /// Referenced type for `Enum` and `Record` fields.
    pub type_name: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: FieldLabel::Optional,
            type_name: None,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_repeated(&self) -> bool {
        self.label == FieldLabel::Repeated
    }
}

/// Ordered description of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field lookup that reports a missing descriptor.
    pub fn require_field(&self, name: &str) -> FormResult<&FieldDescriptor> {
        self.field(name).ok_or_else(|| FormError::UnknownField {
            record: self.name.clone(),
            field: name.to_string(),
        })
    }
}

/// Named enum values, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub name: String,
    pub values: Vec<(String, i32)>,
}

impl EnumSchema {
    pub fn names(&self) -> Vec<String> {
        self.values.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn name_of(&self, number: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(name, _)| name.as_str())
    }

    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// First declared value; used for absent fields.
    pub fn default_number(&self) -> i32 {
        self.values.first().map(|(_, n)| *n).unwrap_or(0)
    }
}

// =============================================================================
// Schema pool
// =============================================================================

/// Validated set of record and enum types.
#[derive(Debug, Default)]
pub struct SchemaPool {
    records: HashMap<String, Rc<RecordSchema>>,
    enums: HashMap<String, Rc<EnumSchema>>,
}

impl SchemaPool {
    pub fn builder() -> SchemaPoolBuilder {
        SchemaPoolBuilder::default()
    }

    pub fn record(&self, name: &str) -> FormResult<Rc<RecordSchema>> {
        self.records
            .get(name)
            .cloned()
            .ok_or_else(|| FormError::UnknownRecord(name.to_string()))
    }

    pub fn enum_schema(&self, name: &str) -> FormResult<Rc<EnumSchema>> {
        self.enums
            .get(name)
            .cloned()
            .ok_or_else(|| FormError::UnknownEnum(name.to_string()))
    }

    pub fn has_record(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Ordered field descriptors of `record_type`.
    pub fn fields(&self, record_type: &str) -> FormResult<&[FieldDescriptor]> {
        self.records
            .get(record_type)
            .map(|r| r.fields.as_slice())
            .ok_or_else(|| FormError::UnknownRecord(record_type.to_string()))
    }

    /// Value names of an enum field, in declaration order.
    pub fn enum_values(&self, field: &FieldDescriptor) -> FormResult<Vec<String>> {
        Ok(self.enum_schema_for(field)?.names())
    }

    /// Enum schema referenced by an enum field.
    pub fn enum_schema_for(&self, field: &FieldDescriptor) -> FormResult<Rc<EnumSchema>> {
        if field.kind != FieldKind::Enum {
            return Err(FormError::KindMismatch {
                field: field.name.clone(),
                expected: FieldKind::Enum,
                found: field.kind,
            });
        }
        let type_name = field
            .type_name
            .as_deref()
            .ok_or_else(|| FormError::UnknownEnum(format!("<{}>", field.name)))?;
        self.enum_schema(type_name)
    }

    /// Record type name of a record field; `None` for other kinds.
    pub fn nested_type_name<'a>(&self, field: &'a FieldDescriptor) -> Option<&'a str> {
        match field.kind {
            FieldKind::Record => field.type_name.as_deref(),
            _ => None,
        }
    }

    pub fn record_names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Fluent builder for one record's fields.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: Vec<FieldDescriptor>,
}

impl RecordBuilder {
    /// Append an arbitrary descriptor.
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    fn scalar(self, name: &str, kind: FieldKind) -> Self {
        self.field(FieldDescriptor::new(name, kind))
    }

    pub fn int32(self, name: &str) -> Self {
        self.scalar(name, FieldKind::Int32)
    }

    pub fn int64(self, name: &str) -> Self {
        self.scalar(name, FieldKind::Int64)
    }

    pub fn uint32(self, name: &str) -> Self {
        self.scalar(name, FieldKind::UInt32)
    }

    pub fn uint64(self, name: &str) -> Self {
        self.scalar(name, FieldKind::UInt64)
    }

    pub fn float(self, name: &str) -> Self {
        self.scalar(name, FieldKind::Float)
    }

    pub fn double(self, name: &str) -> Self {
        self.scalar(name, FieldKind::Double)
    }

    pub fn bool(self, name: &str) -> Self {
        self.scalar(name, FieldKind::Bool)
    }

    pub fn string(self, name: &str) -> Self {
        self.scalar(name, FieldKind::String)
    }

    pub fn enum_field(self, name: &str, enum_type: &str) -> Self {
        self.field(FieldDescriptor {
            type_name: Some(enum_type.to_string()),
            ..FieldDescriptor::new(name, FieldKind::Enum)
        })
    }

    pub fn record(self, name: &str, record_type: &str) -> Self {
        self.field(FieldDescriptor {
            type_name: Some(record_type.to_string()),
            ..FieldDescriptor::new(name, FieldKind::Record)
        })
    }

    /// Mark the most recently added field as required.
    pub fn required(mut self) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.label = FieldLabel::Required;
        }
        self
    }

    /// Mark the most recently added field as repeated.
    pub fn repeated(mut self) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.label = FieldLabel::Repeated;
        }
        self
    }
}

/// Builder for a [`SchemaPool`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SchemaPoolBuilder {
    records: Vec<RecordSchema>,
    enums: Vec<EnumSchema>,
}

impl SchemaPoolBuilder {
    pub fn record(mut self, name: &str, fields: impl FnOnce(RecordBuilder) -> RecordBuilder) -> Self {
        let built = fields(RecordBuilder::default());
        self.records.push(RecordSchema {
            name: name.to_string(),
            fields: built.fields,
        });
        self
    }

    /// Enum with values numbered from 0 in the given order.
    pub fn enum_type(self, name: &str, values: &[&str]) -> Self {
        let numbered: Vec<(&str, i32)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, i as i32))
            .collect();
        self.enum_numbered(name, &numbered)
    }

    /// Enum with explicit value numbers.
    pub fn enum_numbered(mut self, name: &str, values: &[(&str, i32)]) -> Self {
        self.enums.push(EnumSchema {
            name: name.to_string(),
            values: values.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
        });
        self
    }

    /// Validate and freeze the pool.
    ///
    /// Rejects empty or duplicate type names, empty or duplicate field names,
    /// field names containing the path separator, enums without values,
    /// references to undeclared types, and records that contain themselves
    /// through singular record fields.
    pub fn build(self) -> FormResult<Rc<SchemaPool>> {
        let mut pool = SchemaPool::default();

        for e in self.enums {
            if e.name.is_empty() {
                return Err(FormError::InvalidSchema("enum with empty name".into()));
            }
            if e.values.is_empty() {
                return Err(FormError::InvalidSchema(format!("enum '{}' has no values", e.name)));
            }
            if pool.enums.contains_key(&e.name) {
                return Err(FormError::InvalidSchema(format!("duplicate enum '{}'", e.name)));
            }
            pool.enums.insert(e.name.clone(), Rc::new(e));
        }

        for r in self.records {
            if r.name.is_empty() {
                return Err(FormError::InvalidSchema("record with empty name".into()));
            }
            if pool.records.contains_key(&r.name) {
                return Err(FormError::InvalidSchema(format!("duplicate record '{}'", r.name)));
            }
            for (i, f) in r.fields.iter().enumerate() {
                if f.name.is_empty() || f.name.contains(PATH_SEPARATOR) {
                    return Err(FormError::InvalidSchema(format!(
                        "record '{}' has invalid field name '{}'",
                        r.name, f.name
                    )));
                }
                if r.fields[..i].iter().any(|other| other.name == f.name) {
                    return Err(FormError::InvalidSchema(format!(
                        "record '{}' declares field '{}' twice",
                        r.name, f.name
                    )));
                }
            }
            pool.records.insert(r.name.clone(), Rc::new(r));
        }

        for r in pool.records.values() {
            for f in &r.fields {
                let missing = match (f.kind, f.type_name.as_deref()) {
                    (FieldKind::Enum, Some(t)) => !pool.enums.contains_key(t),
                    (FieldKind::Record, Some(t)) => !pool.records.contains_key(t),
                    (FieldKind::Enum | FieldKind::Record, None) => true,
                    _ => false,
                };
                if missing {
                    return Err(FormError::InvalidSchema(format!(
                        "field '{}::{}' references unknown type '{}'",
                        r.name,
                        f.name,
                        f.type_name.as_deref().unwrap_or("")
                    )));
                }
            }
        }

        if let Some(cycle) = singular_record_cycle(&pool) {
            return Err(FormError::InvalidSchema(format!(
                "record cycle through singular fields: {}",
                cycle.join(" -> ")
            )));
        }

        Ok(Rc::new(pool))
    }
}

/// First cycle of record types linked by singular record fields, as the
/// list of type names with the first repeated at the end.
///
/// Repeated fields are not followed: an empty list ends the nesting.
fn singular_record_cycle(pool: &SchemaPool) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Open,
        Done,
    }

    fn visit<'a>(
        pool: &'a SchemaPool,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match marks.get(name) {
            Some(Mark::Done) => return None,
            Some(Mark::Open) => {
                let start = stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Some(cycle);
            }
            None => {}
        }

        marks.insert(name, Mark::Open);
        stack.push(name);
        if let Some(record) = pool.records.get(name) {
            for f in &record.fields {
                if f.kind != FieldKind::Record || f.is_repeated() {
                    continue;
                }
                if let Some(nested) = f.type_name.as_deref() {
                    if let Some(cycle) = visit(pool, nested, marks, stack) {
                        return Some(cycle);
                    }
                }
            }
        }
        stack.pop();
        marks.insert(name, Mark::Done);
        None
    }

    let mut names: Vec<&str> = pool.records.keys().map(String::as_str).collect();
    names.sort_unstable();

    let mut marks = HashMap::new();
    let mut stack = Vec::new();
    names
        .into_iter()
        .find_map(|name| visit(pool, name, &mut marks, &mut stack))
}

/// Join a parent path and a field name with [`PATH_SEPARATOR`].
pub fn scoped_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{field}")
    }
}

/// Last segment of a scoped path.
pub fn path_key(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_api() {
        let pool = fixtures::joint_pool();
        let fields = pool.fields("Joint").unwrap();
        assert_eq!(fields[0].name, "name");
        assert_eq!(fields[0].kind(), FieldKind::String);

        let type_field = pool.record("Joint").unwrap().require_field("type").unwrap().clone();
        assert_eq!(
            pool.enum_values(&type_field).unwrap(),
            vec!["REVOLUTE", "PRISMATIC", "FIXED"]
        );

        let pose_field = pool.record("Joint").unwrap().require_field("pose").unwrap().clone();
        assert_eq!(pool.nested_type_name(&pose_field), Some("Pose"));
        assert_eq!(pool.nested_type_name(&type_field), None);
    }

    #[test]
    fn test_unknown_record_reported() {
        let pool = fixtures::joint_pool();
        assert_eq!(
            pool.fields("Nope").unwrap_err(),
            FormError::UnknownRecord("Nope".into())
        );
    }

    #[test]
    fn test_builder_rejects_duplicate_field() {
        let result = SchemaPool::builder()
            .record("A", |r| r.double("x").double("x"))
            .build();
        assert!(matches!(result, Err(FormError::InvalidSchema(_))));
    }

    #[test]
    fn test_builder_rejects_separator_in_name() {
        let result = SchemaPool::builder()
            .record("A", |r| r.double("a::b"))
            .build();
        assert!(matches!(result, Err(FormError::InvalidSchema(_))));
    }

    #[test]
    fn test_builder_rejects_unresolved_reference() {
        let result = SchemaPool::builder()
            .record("A", |r| r.record("b", "Missing"))
            .build();
        assert!(matches!(result, Err(FormError::InvalidSchema(_))));

        let result = SchemaPool::builder()
            .record("A", |r| r.enum_field("e", "MissingEnum"))
            .build();
        assert!(matches!(result, Err(FormError::InvalidSchema(_))));
    }

    #[test]
    fn test_builder_rejects_self_containing_record() {
        let result = SchemaPool::builder()
            .record("Node", |r| r.string("label").record("child", "Node"))
            .build();
        assert_eq!(
            result.err(),
            Some(FormError::InvalidSchema(
                "record cycle through singular fields: Node -> Node".into()
            ))
        );
    }

    #[test]
    fn test_builder_rejects_indirect_record_cycle() {
        let result = SchemaPool::builder()
            .record("Frame", |r| r.record("parent", "Link"))
            .record("Link", |r| r.double("mass").record("frame", "Frame"))
            .build();
        assert!(matches!(result, Err(FormError::InvalidSchema(msg)) if msg.contains("Frame -> Link -> Frame")));
    }

    #[test]
    fn test_builder_allows_repeated_self_reference() {
        let pool = SchemaPool::builder()
            .record("Node", |r| r.string("label").record("children", "Node").repeated())
            .build()
            .unwrap();
        assert!(pool.has_record("Node"));
    }

    #[test]
    fn test_enum_schema_lookup() {
        let e = EnumSchema {
            name: "E".into(),
            values: vec![("A".into(), 3), ("B".into(), 7)],
        };
        assert_eq!(e.name_of(7), Some("B"));
        assert_eq!(e.number_of("A"), Some(3));
        assert_eq!(e.name_of(0), None);
        assert_eq!(e.default_number(), 3);
    }

    #[test]
    fn test_scoped_path() {
        assert_eq!(scoped_path("", "pose"), "pose");
        assert_eq!(scoped_path("link::pose", "x"), "link::pose::x");
        assert_eq!(path_key("link::pose::x"), "x");
        assert_eq!(path_key("mass"), "mass");
    }
}
