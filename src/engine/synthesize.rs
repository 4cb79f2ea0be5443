//! Synthesis - build or update the widget tree from a message.
//!
//! Walks the message depth-first in schema field order:
//! 1. Repeated fields are skipped.
//! 2. In [`SynthesisMode::PartialUpdate`], absent fields are skipped and
//!    their widgets left untouched. With [`synthesize_merged`] presence is
//!    taken from the patch while values come from the merged message.
//! 3. A path that is already registered only has its displayed value
//!    updated; flags (expanded, read-only, visibility) are preserved.
//! 4. Otherwise a widget is created: primitive kinds directly, enums as a
//!    selection, records as a composite widget or a generic container, each
//!    wrapped in a collapsible group.
//!
//! Per-field failures are reported and the walk continues.

use std::rc::Rc;

use tracing::{debug, warn};

use super::registry::WidgetRegistry;
use crate::composite::{finite_or_zero, recognize};
use crate::config::FormConfig;
use crate::error::{FormError, FormResult};
use crate::schema::{FieldDescriptor, FieldKind, Message, scoped_path};
use crate::types::WidgetValue;
use crate::widgets::{Widget, WidgetFactory, WidgetId, WidgetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    /// Every field, present or not, is shown.
    FullLoad,
    /// Only present fields are applied.
    PartialUpdate,
}

/// Outcome of one synthesis pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisReport {
    /// Widgets registered by this pass.
    pub created: usize,
    /// Registered widgets whose value was refreshed.
    pub updated: usize,
    /// Repeated fields, empty records and absent fields in a partial update.
    pub skipped: usize,
    pub errors: Vec<FormError>,
}

impl SynthesisReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Name of the top-level `type` enum, used to pick joint-dependent units.
pub fn joint_type(msg: &Message) -> Option<String> {
    let field = msg.schema().field("type")?;
    if field.kind != FieldKind::Enum || field.is_repeated() {
        return None;
    }
    msg.get_enum_name("type").ok()
}

/// Displayed value of a non-repeated field; `None` for generic records.
pub(crate) fn read_field(msg: &Message, field: &FieldDescriptor) -> FormResult<Option<WidgetValue>> {
    let name = field.name.as_str();
    Ok(Some(match field.kind {
        FieldKind::Int32 | FieldKind::Int64 => WidgetValue::Int(msg.get_i64(name)?),
        FieldKind::UInt32 | FieldKind::UInt64 => WidgetValue::UInt(msg.get_u64(name)?),
        FieldKind::Float | FieldKind::Double => WidgetValue::Double(finite_or_zero(msg.get_f64(name)?)),
        FieldKind::Bool => WidgetValue::Bool(msg.get_bool(name)?),
        FieldKind::String => WidgetValue::String(msg.get_string(name)?),
        FieldKind::Enum => WidgetValue::Enum(msg.get_enum_name(name)?),
        FieldKind::Record => match recognize(msg.pool(), field) {
            Some(kind) => kind.read(&msg.sub_message(name)?)?,
            None => return Ok(None),
        },
    }))
}

/// Build or update the widgets for `msg` under the registry root.
///
/// `joint_type` selects joint-dependent units for double fields.
pub fn synthesize(
    registry: &mut WidgetRegistry,
    config: &FormConfig,
    msg: &Message,
    mode: SynthesisMode,
    joint_type: Option<&str>,
) -> SynthesisReport {
    run(registry, config, msg, msg, mode, joint_type)
}

/// Partial update driven by `patch` after it was merged into `merged`.
///
/// Presence comes from `patch`; displayed values are read from `merged`, so
/// a composite patched in one component keeps its other components.
pub fn synthesize_merged(
    registry: &mut WidgetRegistry,
    config: &FormConfig,
    patch: &Message,
    merged: &Message,
    joint_type: Option<&str>,
) -> SynthesisReport {
    run(registry, config, patch, merged, SynthesisMode::PartialUpdate, joint_type)
}

fn run(
    registry: &mut WidgetRegistry,
    config: &FormConfig,
    present: &Message,
    shown: &Message,
    mode: SynthesisMode,
    joint_type: Option<&str>,
) -> SynthesisReport {
    let factory = WidgetFactory::new(&config.theme, &config.policy);
    let root = match registry.root() {
        Some(root) => root,
        None => {
            let root = registry.insert(factory.root());
            registry.set_root(root);
            root
        }
    };

    let mut synthesizer = Synthesizer {
        registry,
        factory,
        mode,
        joint_type,
        report: SynthesisReport::default(),
    };
    if present.type_name() == shown.type_name() {
        synthesizer.record(present, shown, "", root, 0);
    } else {
        let err = FormError::InvalidSchema(format!(
            "update '{}' does not match shown message '{}'",
            present.type_name(),
            shown.type_name()
        ));
        synthesizer.fail("", err);
    }

    let report = synthesizer.report;
    debug!(
        record = shown.type_name(),
        ?mode,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        errors = report.errors.len(),
        "synthesis finished"
    );
    report
}

struct Synthesizer<'r, 'c> {
    registry: &'r mut WidgetRegistry,
    factory: WidgetFactory<'c>,
    mode: SynthesisMode,
    joint_type: Option<&'c str>,
    report: SynthesisReport,
}

impl Synthesizer<'_, '_> {
    fn fail(&mut self, path: &str, err: FormError) {
        warn!(path, error = %err, "field skipped");
        self.report.errors.push(err);
    }

    /// Walk `shown`'s fields; in a partial update only those present in
    /// `present` are applied.
    fn record(&mut self, present: &Message, shown: &Message, path: &str, container: WidgetId, level: usize) {
        let schema = Rc::clone(shown.schema());
        for field in &schema.fields {
            if field.is_repeated() {
                self.report.skipped += 1;
                continue;
            }
            if self.mode == SynthesisMode::PartialUpdate && !present.has_field(&field.name) {
                self.report.skipped += 1;
                continue;
            }

            let scoped = scoped_path(path, &field.name);
            match self.registry.lookup(&scoped) {
                Some(id) => self.update(present, shown, field, &scoped, id),
                None => self.create(present, shown, field, &scoped, container, level),
            }
        }
    }

    /// Sub-messages of a record field in both messages.
    fn nested(present: &Message, shown: &Message, field: &FieldDescriptor) -> FormResult<(Message, Message)> {
        Ok((present.sub_message(&field.name)?, shown.sub_message(&field.name)?))
    }

    // =========================================================================
    // Update
    // =========================================================================

    fn update(&mut self, present: &Message, shown: &Message, field: &FieldDescriptor, path: &str, id: WidgetId) {
        let Some((kind, level)) = self.registry.get(id).map(|w| (w.kind(), w.level())) else {
            return;
        };

        if kind == WidgetKind::Record {
            match Self::nested(present, shown, field) {
                Ok((present, shown)) => self.record(&present, &shown, path, id, level),
                Err(err) => self.fail(path, err),
            }
            return;
        }

        let value = match read_field(shown, field) {
            Ok(Some(value)) => value,
            Ok(None) => {
                let err = FormError::ShapeMismatch {
                    path: path.to_string(),
                    kind: kind.name(),
                    expected: "record",
                };
                return self.fail(path, err);
            }
            Err(err) => return self.fail(path, err),
        };

        let result = match self.registry.get(id) {
            Some(widget) => {
                self.refresh_unit(widget);
                widget.set_value(&value)
            }
            None => return,
        };
        match result {
            Ok(()) => self.report.updated += 1,
            Err(err) => self.fail(path, err),
        }
    }

    fn refresh_unit(&self, widget: &Widget) {
        if widget.kind() == WidgetKind::Double {
            widget.set_unit(&self.factory.policy().unit_for(widget.key(), self.joint_type));
        }
    }

    // =========================================================================
    // Create
    // =========================================================================

    fn create(
        &mut self,
        present: &Message,
        shown: &Message,
        field: &FieldDescriptor,
        path: &str,
        container: WidgetId,
        level: usize,
    ) {
        if field.kind == FieldKind::Record {
            return self.create_record(present, shown, field, path, container, level);
        }

        let value = match read_field(shown, field) {
            Ok(Some(value)) => value,
            Ok(None) => return,
            Err(err) => return self.fail(path, err),
        };

        let widget = if field.kind == FieldKind::Enum {
            match shown.pool().enum_values(field) {
                Ok(items) => self.factory.enumeration(path, level, items),
                Err(err) => return self.fail(path, err),
            }
        } else {
            match self.factory.primitive(field.kind, path, level) {
                Some(widget) => widget,
                None => return,
            }
        };

        self.refresh_unit(&widget);
        if let Err(err) = widget.set_value(&value) {
            return self.fail(path, err);
        }

        let id = self.registry.insert(widget);
        match self.registry.register(path, id) {
            Ok(()) => {
                self.registry.attach(container, id);
                self.report.created += 1;
            }
            Err(err) => self.fail(path, err),
        }
    }

    fn create_record(
        &mut self,
        present: &Message,
        shown: &Message,
        field: &FieldDescriptor,
        path: &str,
        container: WidgetId,
        level: usize,
    ) {
        let (present_sub, shown_sub) = match Self::nested(present, shown, field) {
            Ok(subs) => subs,
            Err(err) => return self.fail(path, err),
        };

        if let Some(kind) = recognize(shown.pool(), field) {
            let value = match kind.read(&shown_sub) {
                Ok(value) => value,
                Err(err) => return self.fail(path, err),
            };
            let widget = self.factory.composite(kind, path, level + 1);
            if let Err(err) = widget.set_value(&value) {
                return self.fail(path, err);
            }
            self.add_grouped(widget, path, container, level);
            return;
        }

        if shown_sub.schema().fields.is_empty() {
            self.report.skipped += 1;
            return;
        }

        let widget = self.factory.record(path, level + 1);
        if let Some(id) = self.add_grouped(widget, path, container, level) {
            self.record(&present_sub, &shown_sub, path, id, level + 1);
        }
    }

    /// Register `widget` at `path` inside a new collapsible group.
    fn add_grouped(&mut self, widget: Widget, path: &str, container: WidgetId, level: usize) -> Option<WidgetId> {
        let id = self.registry.insert(widget);
        if let Err(err) = self.registry.register(path, id) {
            self.fail(path, err);
            return None;
        }

        let group = self.registry.insert(self.factory.group(path, level));
        self.registry.attach(group, id);
        self.registry.attach(container, group);
        self.report.created += 1;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::joint_pool;
    use crate::types::{Pose, Vector3};

    fn load(msg: &Message) -> (WidgetRegistry, SynthesisReport) {
        let mut registry = WidgetRegistry::new();
        let report = synthesize(
            &mut registry,
            &FormConfig::default(),
            msg,
            SynthesisMode::FullLoad,
            joint_type(msg).as_deref(),
        );
        (registry, report)
    }

    #[test]
    fn test_full_load_creates_widgets_in_field_order() {
        let pool = joint_pool();
        let joint = Message::new(&pool, "Joint").unwrap();
        let (registry, report) = load(&joint);

        assert!(report.is_clean(), "{:?}", report.errors);
        // name, id, type, pose, damping, effort_scale, axis, axis::{xyz, limit_lower, limit_upper, damping, use_parent_model_frame}
        assert_eq!(report.created, 12);
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.widget("pose").unwrap().kind(), WidgetKind::Pose);
        assert_eq!(registry.widget("axis").unwrap().kind(), WidgetKind::Record);
        assert_eq!(registry.widget("axis::xyz").unwrap().kind(), WidgetKind::Vector3);
        assert!(registry.widget("tags").is_none());

        let root = registry.root().unwrap();
        let top: Vec<&str> = registry
            .children(root)
            .iter()
            .map(|id| registry.get(*id).unwrap().path())
            .collect();
        assert_eq!(top, vec!["name", "id", "type", "pose", "damping", "effort_scale", "axis"]);
    }

    #[test]
    fn test_records_wrapped_in_collapsed_groups() {
        let pool = joint_pool();
        let joint = Message::new(&pool, "Joint").unwrap();
        let (registry, _) = load(&joint);

        let pose = registry.lookup("pose").unwrap();
        let group = registry.group_of(pose).unwrap();
        let group_widget = registry.get(group).unwrap();
        assert_eq!(group_widget.kind(), WidgetKind::Group);
        assert!(!group_widget.is_expanded());
        assert_eq!(group_widget.level(), 0);
        assert_eq!(registry.get(pose).unwrap().level(), 1);

        let limit = registry.widget("axis::limit_lower").unwrap();
        assert_eq!(limit.level(), 1);
        assert_eq!(registry.group_of(limit.id()), None);
    }

    #[test]
    fn test_second_full_load_creates_nothing() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();
        joint.set_f64("damping", 0.5).unwrap();

        let (mut registry, first) = load(&joint);
        let second = synthesize(&mut registry, &FormConfig::default(), &joint, SynthesisMode::FullLoad, None);

        assert_eq!(second.created, 0);
        assert_eq!(second.updated, first.created - 1);
        assert_eq!(registry.len(), first.created);
    }

    #[test]
    fn test_partial_update_only_touches_present_fields() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();
        joint.set_string("name", "hinge").unwrap();
        let (mut registry, _) = load(&joint);

        let mut patch = Message::new(&pool, "Joint").unwrap();
        patch.sub_message_mut("axis").unwrap().set_f64("limit_upper", 1.5).unwrap();
        let report = synthesize(&mut registry, &FormConfig::default(), &patch, SynthesisMode::PartialUpdate, None);

        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 0);
        assert_eq!(
            registry.widget("axis::limit_upper").unwrap().value().unwrap(),
            WidgetValue::Double(1.5)
        );
        assert_eq!(
            registry.widget("name").unwrap().value().unwrap(),
            WidgetValue::String("hinge".into())
        );
    }

    #[test]
    fn test_partial_vector_patch_keeps_other_components() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();
        let xyz = joint.sub_message_mut("axis").unwrap().sub_message_mut("xyz").unwrap();
        xyz.set_f64("x", 1.0).unwrap();
        xyz.set_f64("y", 2.0).unwrap();
        xyz.set_f64("z", 3.0).unwrap();
        let (mut registry, _) = load(&joint);

        let mut patch = Message::new(&pool, "Joint").unwrap();
        patch
            .sub_message_mut("axis")
            .unwrap()
            .sub_message_mut("xyz")
            .unwrap()
            .set_f64("x", 5.0)
            .unwrap();
        let mut merged = joint.clone();
        merged.merge_from(&patch).unwrap();

        let report = synthesize_merged(&mut registry, &FormConfig::default(), &patch, &merged, None);

        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(report.updated, 1);
        assert_eq!(
            registry.widget("axis::xyz").unwrap().value().unwrap(),
            WidgetValue::Vector3(Vector3::new(5.0, 2.0, 3.0))
        );
    }

    #[test]
    fn test_merged_type_must_match_patch() {
        let pool = joint_pool();
        let joint = Message::new(&pool, "Joint").unwrap();
        let (mut registry, _) = load(&joint);

        let link = Message::new(&pool, "Link").unwrap();
        let report = synthesize_merged(&mut registry, &FormConfig::default(), &link, &joint, None);

        assert_eq!(report.updated, 0);
        assert!(matches!(report.errors.as_slice(), [FormError::InvalidSchema(_)]));
    }

    #[test]
    fn test_update_preserves_flags() {
        let pool = joint_pool();
        let joint = Message::new(&pool, "Joint").unwrap();
        let (mut registry, _) = load(&joint);

        let damping = registry.widget("damping").unwrap();
        damping.set_read_only(true);
        damping.set_visible(false);

        let mut patch = Message::new(&pool, "Joint").unwrap();
        patch.set_f64("damping", 3.0).unwrap();
        synthesize(&mut registry, &FormConfig::default(), &patch, SynthesisMode::PartialUpdate, None);

        let damping = registry.widget("damping").unwrap();
        assert!(damping.is_read_only());
        assert!(!damping.is_visible());
        assert_eq!(damping.value().unwrap(), WidgetValue::Double(3.0));
    }

    #[test]
    fn test_unresolved_enum_skipped_and_reported() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();
        joint.set_enum_number("type", 42).unwrap();
        let (registry, report) = load(&joint);

        assert!(registry.widget("type").is_none());
        assert!(registry.widget("damping").is_some());
        assert_eq!(
            report.errors,
            vec![FormError::UnresolvedEnumValue {
                field: "type".into(),
                number: 42
            }]
        );
    }

    #[test]
    fn test_joint_units() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();
        joint.set_enum_name("type", "PRISMATIC").unwrap();
        let (mut registry, _) = load(&joint);

        let unit = |registry: &WidgetRegistry, path: &str| registry.widget(path).unwrap().controls()[0].unit.get();
        assert_eq!(unit(&registry, "damping"), "Ns/m");
        assert_eq!(unit(&registry, "axis::limit_lower"), "m");

        joint.set_enum_name("type", "REVOLUTE").unwrap();
        synthesize(&mut registry, &FormConfig::default(), &joint, SynthesisMode::FullLoad, joint_type(&joint).as_deref());
        assert_eq!(unit(&registry, "damping"), "Nms/rad");
        assert_eq!(unit(&registry, "axis::limit_lower"), "rad");
    }

    #[test]
    fn test_nan_displays_zero() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();
        joint.set_f64("damping", f64::NAN).unwrap();
        let (registry, _) = load(&joint);
        assert_eq!(registry.widget("damping").unwrap().value().unwrap(), WidgetValue::Double(0.0));
    }

    #[test]
    fn test_empty_record_has_no_container() {
        let pool = joint_pool();
        let link = Message::new(&pool, "Link").unwrap();
        let (registry, report) = load(&link);

        assert!(registry.widget("empty").is_none());
        assert!(registry.widget("velocity_decay::linear").is_some());
        assert!(report.is_clean(), "{:?}", report.errors);
    }

    #[test]
    fn test_pose_value_shown() {
        let pool = joint_pool();
        let mut joint = Message::new(&pool, "Joint").unwrap();
        let pose = Pose::from_euler(Vector3::new(1.0, 0.0, 0.0), Vector3::ZERO);
        crate::composite::write_pose(joint.sub_message_mut("pose").unwrap(), &pose).unwrap();

        let (registry, _) = load(&joint);
        let WidgetValue::Pose(shown) = registry.widget("pose").unwrap().value().unwrap() else {
            panic!("pose widget returned a non-pose value");
        };
        assert_eq!(shown.position, Vector3::new(1.0, 0.0, 0.0));
    }
}
