//! Dynamic message instances.
//!
//! A [`Message`] is a record value conforming to a [`RecordSchema`]. Fields
//! are tracked for presence: absent fields read as their kind's default, and
//! sub-messages are created on demand through [`Message::sub_message_mut`].

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::{FieldDescriptor, FieldKind, RecordSchema, SchemaPool};
use crate::error::{FormError, FormResult};

// =============================================================================
// Value
// =============================================================================

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    /// Enum value number.
    Enum(i32),
    Record(Message),
    Repeated(Vec<Value>),
}

impl Value {
    /// Kind of a singular value; `None` for repeated values.
    pub fn kind(&self) -> Option<FieldKind> {
        Some(match self {
            Self::Int32(_) => FieldKind::Int32,
            Self::Int64(_) => FieldKind::Int64,
            Self::UInt32(_) => FieldKind::UInt32,
            Self::UInt64(_) => FieldKind::UInt64,
            Self::Float(_) => FieldKind::Float,
            Self::Double(_) => FieldKind::Double,
            Self::Bool(_) => FieldKind::Bool,
            Self::String(_) => FieldKind::String,
            Self::Enum(_) => FieldKind::Enum,
            Self::Record(_) => FieldKind::Record,
            Self::Repeated(_) => return None,
        })
    }

    /// Numeric view; enums read as their number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int32(v) => Some(*v as f64),
            Self::Int64(v) => Some(*v as f64),
            Self::UInt32(v) => Some(*v as f64),
            Self::UInt64(v) => Some(*v as f64),
            Self::Float(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            Self::Enum(v) => Some(*v as f64),
            _ => None,
        }
    }
}

// =============================================================================
// Message
// =============================================================================

/// Record value bound to a schema from a shared pool.
#[derive(Clone)]
pub struct Message {
    pool: Rc<SchemaPool>,
    schema: Rc<RecordSchema>,
    values: BTreeMap<String, Value>,
}

impl Message {
    /// Empty message of `type_name`.
    pub fn new(pool: &Rc<SchemaPool>, type_name: &str) -> FormResult<Self> {
        Ok(Self {
            pool: Rc::clone(pool),
            schema: pool.record(type_name)?,
            values: BTreeMap::new(),
        })
    }

    pub fn type_name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &Rc<RecordSchema> {
        &self.schema
    }

    pub fn pool(&self) -> &Rc<SchemaPool> {
        &self.pool
    }

    pub fn descriptor(&self, field: &str) -> FormResult<&FieldDescriptor> {
        self.schema.require_field(field)
    }

    /// Whether `field` has been set. Empty repeated fields count as absent.
    pub fn has_field(&self, field: &str) -> bool {
        match self.values.get(field) {
            Some(Value::Repeated(items)) => !items.is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    /// Names of present fields, in schema order.
    pub fn present_fields(&self) -> impl Iterator<Item = &str> {
        self.schema
            .fields
            .iter()
            .filter(|f| self.has_field(&f.name))
            .map(|f| f.name.as_str())
    }

    /// Default value of a field as read when absent.
    pub fn default_value(&self, desc: &FieldDescriptor) -> FormResult<Value> {
        if desc.is_repeated() {
            return Ok(Value::Repeated(Vec::new()));
        }
        Ok(match desc.kind {
            FieldKind::Int32 => Value::Int32(0),
            FieldKind::Int64 => Value::Int64(0),
            FieldKind::UInt32 => Value::UInt32(0),
            FieldKind::UInt64 => Value::UInt64(0),
            FieldKind::Float => Value::Float(0.0),
            FieldKind::Double => Value::Double(0.0),
            FieldKind::Bool => Value::Bool(false),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Enum => Value::Enum(self.pool.enum_schema_for(desc)?.default_number()),
            FieldKind::Record => {
                let type_name = self
                    .pool
                    .nested_type_name(desc)
                    .ok_or_else(|| FormError::UnknownRecord(format!("<{}>", desc.name)))?;
                Value::Record(Message::new(&self.pool, type_name)?)
            }
        })
    }

    /// Current value of `field`, or its default when absent.
    pub fn get(&self, field: &str) -> FormResult<Value> {
        match self.values.get(field) {
            Some(v) => Ok(v.clone()),
            None => {
                let desc = self.descriptor(field)?;
                self.default_value(desc)
            }
        }
    }

    /// Set `field`, checking the value against the field's kind.
    pub fn set(&mut self, field: &str, value: Value) -> FormResult<()> {
        let desc = self.descriptor(field)?;
        let check = |v: &Value| -> FormResult<()> {
            let found = v.kind().unwrap_or(desc.kind);
            if found != desc.kind || v.kind().is_none() {
                return Err(FormError::KindMismatch {
                    field: desc.name.clone(),
                    expected: desc.kind,
                    found,
                });
            }
            if let Value::Record(m) = v {
                if desc.type_name.as_deref() != Some(m.type_name()) {
                    return Err(FormError::InvalidSchema(format!(
                        "field '{}' expects record '{}', got '{}'",
                        desc.name,
                        desc.type_name.as_deref().unwrap_or(""),
                        m.type_name()
                    )));
                }
            }
            Ok(())
        };

        match (&value, desc.is_repeated()) {
            (Value::Repeated(items), true) => items.iter().try_for_each(check)?,
            (_, false) => check(&value)?,
            (_, true) => {
                return Err(FormError::KindMismatch {
                    field: desc.name.clone(),
                    expected: desc.kind,
                    found: value.kind().unwrap_or(desc.kind),
                });
            }
        }

        self.values.insert(field.to_string(), value);
        Ok(())
    }

    pub fn clear_field(&mut self, field: &str) {
        self.values.remove(field);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    /// Any numeric (or enum) field as `f64`.
    pub fn get_f64(&self, field: &str) -> FormResult<f64> {
        let value = self.get(field)?;
        value.as_f64().ok_or_else(|| self.mismatch(field, FieldKind::Double))
    }

    /// Write `value` into a numeric field, converting to the field's kind.
    ///
    /// Integer kinds round to nearest and saturate at their bounds.
    pub fn set_f64(&mut self, field: &str, value: f64) -> FormResult<()> {
        let kind = self.descriptor(field)?.kind;
        let converted = match kind {
            FieldKind::Int32 => Value::Int32(value.round() as i32),
            FieldKind::Int64 => Value::Int64(value.round() as i64),
            FieldKind::UInt32 => Value::UInt32(value.round() as u32),
            FieldKind::UInt64 => Value::UInt64(value.round() as u64),
            FieldKind::Float => Value::Float(value as f32),
            FieldKind::Double => Value::Double(value),
            _ => return Err(self.mismatch(field, FieldKind::Double)),
        };
        self.set(field, converted)
    }

    pub fn get_i64(&self, field: &str) -> FormResult<i64> {
        match self.get(field)? {
            Value::Int32(v) => Ok(v as i64),
            Value::Int64(v) => Ok(v),
            Value::UInt32(v) => Ok(v as i64),
            Value::UInt64(v) => Ok(i64::try_from(v).unwrap_or(i64::MAX)),
            _ => Err(self.mismatch(field, FieldKind::Int64)),
        }
    }

    pub fn set_i64(&mut self, field: &str, value: i64) -> FormResult<()> {
        let kind = self.descriptor(field)?.kind;
        let converted = match kind {
            FieldKind::Int32 => Value::Int32(value.clamp(i32::MIN as i64, i32::MAX as i64) as i32),
            FieldKind::Int64 => Value::Int64(value),
            FieldKind::UInt32 => Value::UInt32(value.clamp(0, u32::MAX as i64) as u32),
            FieldKind::UInt64 => Value::UInt64(value.max(0) as u64),
            FieldKind::Float | FieldKind::Double => return self.set_f64(field, value as f64),
            _ => return Err(self.mismatch(field, FieldKind::Int64)),
        };
        self.set(field, converted)
    }

    pub fn get_u64(&self, field: &str) -> FormResult<u64> {
        match self.get(field)? {
            Value::UInt32(v) => Ok(v as u64),
            Value::UInt64(v) => Ok(v),
            Value::Int32(v) => Ok(v.max(0) as u64),
            Value::Int64(v) => Ok(v.max(0) as u64),
            _ => Err(self.mismatch(field, FieldKind::UInt64)),
        }
    }

    pub fn set_u64(&mut self, field: &str, value: u64) -> FormResult<()> {
        let kind = self.descriptor(field)?.kind;
        let converted = match kind {
            FieldKind::UInt32 => Value::UInt32(value.min(u32::MAX as u64) as u32),
            FieldKind::UInt64 => Value::UInt64(value),
            FieldKind::Int32 | FieldKind::Int64 => {
                return self.set_i64(field, i64::try_from(value).unwrap_or(i64::MAX));
            }
            FieldKind::Float | FieldKind::Double => return self.set_f64(field, value as f64),
            _ => return Err(self.mismatch(field, FieldKind::UInt64)),
        };
        self.set(field, converted)
    }

    pub fn get_bool(&self, field: &str) -> FormResult<bool> {
        match self.get(field)? {
            Value::Bool(v) => Ok(v),
            _ => Err(self.mismatch(field, FieldKind::Bool)),
        }
    }

    pub fn set_bool(&mut self, field: &str, value: bool) -> FormResult<()> {
        self.set(field, Value::Bool(value))
    }

    pub fn get_string(&self, field: &str) -> FormResult<String> {
        match self.get(field)? {
            Value::String(v) => Ok(v),
            _ => Err(self.mismatch(field, FieldKind::String)),
        }
    }

    pub fn set_string(&mut self, field: &str, value: impl Into<String>) -> FormResult<()> {
        self.set(field, Value::String(value.into()))
    }

    pub fn get_enum_number(&self, field: &str) -> FormResult<i32> {
        match self.get(field)? {
            Value::Enum(v) => Ok(v),
            _ => Err(self.mismatch(field, FieldKind::Enum)),
        }
    }

    pub fn set_enum_number(&mut self, field: &str, number: i32) -> FormResult<()> {
        self.set(field, Value::Enum(number))
    }

    /// Name of the current enum value.
    pub fn get_enum_name(&self, field: &str) -> FormResult<String> {
        let number = self.get_enum_number(field)?;
        let schema = self.pool.enum_schema_for(self.descriptor(field)?)?;
        schema
            .name_of(number)
            .map(str::to_string)
            .ok_or_else(|| FormError::UnresolvedEnumValue {
                field: field.to_string(),
                number,
            })
    }

    pub fn set_enum_name(&mut self, field: &str, name: &str) -> FormResult<()> {
        let schema = self.pool.enum_schema_for(self.descriptor(field)?)?;
        let number = schema.number_of(name).ok_or_else(|| FormError::UnknownEnumName {
            enum_type: schema.name.clone(),
            name: name.to_string(),
        })?;
        self.set_enum_number(field, number)
    }

    // =========================================================================
    // Sub-messages
    // =========================================================================

    /// Copy of a record field; a default message when absent.
    pub fn sub_message(&self, field: &str) -> FormResult<Message> {
        match self.get(field)? {
            Value::Record(m) => Ok(m),
            _ => Err(self.mismatch(field, FieldKind::Record)),
        }
    }

    /// Borrow a present record field.
    pub fn sub_message_ref(&self, field: &str) -> Option<&Message> {
        match self.values.get(field) {
            Some(Value::Record(m)) => Some(m),
            _ => None,
        }
    }

    /// Mutable record field, created on demand.
    pub fn sub_message_mut(&mut self, field: &str) -> FormResult<&mut Message> {
        let desc = self.descriptor(field)?;
        if desc.kind != FieldKind::Record || desc.is_repeated() {
            return Err(self.mismatch(field, FieldKind::Record));
        }
        if !self.values.contains_key(field) {
            let default = self.default_value(self.descriptor(field)?)?;
            self.values.insert(field.to_string(), default);
        }
        match self.values.get_mut(field) {
            Some(Value::Record(m)) => Ok(m),
            _ => Err(FormError::KindMismatch {
                field: field.to_string(),
                expected: FieldKind::Record,
                found: FieldKind::Record,
            }),
        }
    }

    // =========================================================================
    // Repeated fields
    // =========================================================================

    pub fn add_repeated(&mut self, field: &str, value: Value) -> FormResult<()> {
        let mut items = match self.get(field)? {
            Value::Repeated(items) => items,
            _ => return Err(self.mismatch(field, self.descriptor(field)?.kind)),
        };
        items.push(value);
        self.set(field, Value::Repeated(items))
    }

    pub fn repeated_len(&self, field: &str) -> usize {
        match self.values.get(field) {
            Some(Value::Repeated(items)) => items.len(),
            _ => 0,
        }
    }

    // =========================================================================
    // Merge
    // =========================================================================

    /// Merge every present field of `other` into `self`.
    ///
    /// Scalars overwrite, records merge recursively, repeated fields append.
    pub fn merge_from(&mut self, other: &Message) -> FormResult<()> {
        if other.type_name() != self.type_name() {
            return Err(FormError::InvalidSchema(format!(
                "cannot merge '{}' into '{}'",
                other.type_name(),
                self.type_name()
            )));
        }
        for (name, theirs) in &other.values {
            match (self.values.get_mut(name), theirs) {
                (Some(Value::Record(mine)), Value::Record(theirs)) => mine.merge_from(theirs)?,
                (Some(Value::Repeated(mine)), Value::Repeated(theirs)) => {
                    mine.extend(theirs.iter().cloned())
                }
                _ => {
                    self.values.insert(name.clone(), theirs.clone());
                }
            }
        }
        Ok(())
    }

    fn mismatch(&self, field: &str, expected: FieldKind) -> FormError {
        match self.descriptor(field) {
            Ok(desc) => FormError::KindMismatch {
                field: field.to_string(),
                expected,
                found: desc.kind,
            },
            Err(e) => e,
        }
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.values == other.values
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("type", &self.schema.name)
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::joint_pool;

    #[test]
    fn test_absent_fields_read_defaults() {
        let pool = joint_pool();
        let joint = Message::new(&pool, "Joint").unwrap();

        assert!(!joint.has_field("damping"));
        assert_eq!(joint.get_f64("damping").unwrap(), 0.0);
        assert_eq!(joint.get_enum_name("type").unwrap(), "REVOLUTE");
        assert_eq!(joint.sub_message("pose").unwrap().type_name(), "Pose");
        assert!(!joint.has_field("pose"));
    }

    #[test]
    fn test_set_checks_kind() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();

        let err = joint.set("damping", Value::Bool(true)).unwrap_err();
        assert!(matches!(err, FormError::KindMismatch { .. }));
        assert!(joint.set("missing", Value::Bool(true)).is_err());
        assert!(!joint.has_field("damping"));
    }

    #[test]
    fn test_numeric_coercion() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();

        joint.set_f64("id", 41.6).unwrap();
        assert_eq!(joint.get("id").unwrap(), Value::UInt32(42));

        joint.set_i64("id", -5).unwrap();
        assert_eq!(joint.get_u64("id").unwrap(), 0);

        joint.set_f64("effort_scale", 0.5).unwrap();
        assert_eq!(joint.get("effort_scale").unwrap(), Value::Float(0.5));
    }

    #[test]
    fn test_enum_by_name() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();

        joint.set_enum_name("type", "PRISMATIC").unwrap();
        assert_eq!(joint.get_enum_number("type").unwrap(), 1);
        assert!(matches!(
            joint.set_enum_name("type", "BALL"),
            Err(FormError::UnknownEnumName { .. })
        ));

        joint.set_enum_number("type", 99).unwrap();
        assert_eq!(
            joint.get_enum_name("type").unwrap_err(),
            FormError::UnresolvedEnumValue {
                field: "type".into(),
                number: 99
            }
        );
    }

    #[test]
    fn test_sub_message_mut_creates_on_demand() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();

        joint
            .sub_message_mut("pose")
            .unwrap()
            .sub_message_mut("position")
            .unwrap()
            .set_f64("x", 1.5)
            .unwrap();

        assert!(joint.has_field("pose"));
        let pose = joint.sub_message_ref("pose").unwrap();
        assert_eq!(pose.sub_message("position").unwrap().get_f64("x").unwrap(), 1.5);
        assert!(!pose.has_field("orientation"));
    }

    #[test]
    fn test_merge_from() {
        let pool = joint_pool();
        let mut base = Message::new(&pool, "Joint").unwrap();
        base.set_string("name", "hinge").unwrap();
        base.set_f64("damping", 0.2).unwrap();
        base.sub_message_mut("pose").unwrap().sub_message_mut("position").unwrap().set_f64("x", 1.0).unwrap();

        let mut patch = Message::new(&pool, "Joint").unwrap();
        patch.set_f64("damping", 0.7).unwrap();
        patch.sub_message_mut("pose").unwrap().sub_message_mut("position").unwrap().set_f64("y", 2.0).unwrap();

        base.merge_from(&patch).unwrap();
        assert_eq!(base.get_string("name").unwrap(), "hinge");
        assert_eq!(base.get_f64("damping").unwrap(), 0.7);
        let position = base.sub_message("pose").unwrap().sub_message("position").unwrap();
        assert_eq!(position.get_f64("x").unwrap(), 1.0);
        assert_eq!(position.get_f64("y").unwrap(), 2.0);
    }

    #[test]
    fn test_repeated_fields() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();

        assert!(!joint.has_field("tags"));
        joint.add_repeated("tags", Value::String("a".into())).unwrap();
        joint.add_repeated("tags", Value::String("b".into())).unwrap();
        assert_eq!(joint.repeated_len("tags"), 2);
        assert!(joint.set("tags", Value::String("c".into())).is_err());
    }

    #[test]
    fn test_structural_copy_is_independent() {
        let pool = joint_pool();
        let mut original = Message::new(&pool, "Joint").unwrap();
        original.set_f64("damping", 1.0).unwrap();

        let mut copy = original.clone();
        copy.set_f64("damping", 2.0).unwrap();

        assert_eq!(original.get_f64("damping").unwrap(), 1.0);
        assert_ne!(original, copy);
    }
}
