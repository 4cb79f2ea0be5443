//! Widget Registry - arena of widgets plus path and tree indexes.
//!
//! Manages the widgets of one form tree:
//! - Arena of widgets indexed by [`WidgetId`]
//! - Scoped path ↔ id bidirectional mapping (registered widgets only)
//! - Parent and child indexes; widgets never own their parent
//!
//! Groups and the root are in the arena but not registered under a path.
//! Registered entries live until [`WidgetRegistry::clear`].

use std::collections::HashMap;

use tracing::warn;

use crate::error::{FormError, FormResult};
use crate::schema::PATH_SEPARATOR;
use crate::widgets::{Widget, WidgetId, WidgetKind};

#[derive(Default)]
pub struct WidgetRegistry {
    widgets: Vec<Widget>,
    path_to_id: HashMap<String, WidgetId>,
    id_to_path: HashMap<WidgetId, String>,
    parents: HashMap<WidgetId, WidgetId>,
    children: HashMap<WidgetId, Vec<WidgetId>>,
    root: Option<WidgetId>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Arena
    // =========================================================================

    /// Move a widget into the arena and return its id.
    pub fn insert(&mut self, mut widget: Widget) -> WidgetId {
        let id = self.widgets.len();
        widget.id = id;
        self.widgets.push(widget);
        id
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    /// Number of widgets in the arena, registered or not.
    pub fn arena_len(&self) -> usize {
        self.widgets.len()
    }

    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    pub fn set_root(&mut self, id: WidgetId) {
        self.root = Some(id);
    }

    // =========================================================================
    // Path registration
    // =========================================================================

    /// Register `id` under `path`.
    ///
    /// Fails on an empty path or one already registered; the existing entry
    /// is kept.
    pub fn register(&mut self, path: &str, id: WidgetId) -> FormResult<()> {
        if path.is_empty() || path.split(PATH_SEPARATOR).any(str::is_empty) {
            warn!(path, "rejected widget registration with invalid path");
            return Err(FormError::InvalidName(path.to_string()));
        }
        if self.path_to_id.contains_key(path) {
            warn!(path, "rejected duplicate widget registration");
            return Err(FormError::DuplicatePath(path.to_string()));
        }
        self.path_to_id.insert(path.to_string(), id);
        self.id_to_path.insert(id, path.to_string());
        Ok(())
    }

    pub fn lookup(&self, path: &str) -> Option<WidgetId> {
        self.path_to_id.get(path).copied()
    }

    /// Registered widget at `path`.
    pub fn widget(&self, path: &str) -> Option<&Widget> {
        self.lookup(path).and_then(|id| self.get(id))
    }

    pub fn require(&self, path: &str) -> FormResult<&Widget> {
        self.widget(path)
            .ok_or_else(|| FormError::UnknownPath(path.to_string()))
    }

    pub fn path_of(&self, id: WidgetId) -> Option<&str> {
        self.id_to_path.get(&id).map(String::as_str)
    }

    /// Number of registered widgets.
    pub fn len(&self) -> usize {
        self.path_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_to_id.is_empty()
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.path_to_id.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// Append `child` to `parent`'s children.
    pub fn attach(&mut self, parent: WidgetId, child: WidgetId) {
        self.parents.insert(child, parent);
        self.children.entry(parent).or_default().push(child);
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.parents.get(&id).copied()
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Collapsible group directly wrapping `id`, if any.
    pub fn group_of(&self, id: WidgetId) -> Option<WidgetId> {
        self.parent(id)
            .filter(|p| self.get(*p).is_some_and(|w| w.kind() == WidgetKind::Group))
    }

    /// Widget that carries read-only and visibility state for `path`: the
    /// enclosing group when there is one, otherwise the widget itself.
    pub fn flag_target(&self, path: &str) -> FormResult<&Widget> {
        let widget = self.require(path)?;
        Ok(self
            .group_of(widget.id())
            .and_then(|g| self.get(g))
            .unwrap_or(widget))
    }

    /// Whether `id` or any ancestor is read-only.
    pub fn is_effectively_read_only(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(cursor) = current {
            if self.get(cursor).is_some_and(Widget::is_read_only) {
                return true;
            }
            current = self.parent(cursor);
        }
        false
    }

    /// Ids of `id` and its descendants, depth-first in child order.
    pub fn descendants(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cursor) = stack.pop() {
            out.push(cursor);
            stack.extend(self.children(cursor).iter().rev());
        }
        out
    }

    /// Drop every widget and index.
    pub fn clear(&mut self) {
        self.widgets.clear();
        self.path_to_id.clear();
        self.id_to_path.clear();
        self.parents.clear();
        self.children.clear();
        self.root = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FieldPolicy;
    use crate::theme::Theme;
    use crate::widgets::WidgetFactory;

    fn setup() -> (Theme, FieldPolicy) {
        (Theme::default(), FieldPolicy::default())
    }

    #[test]
    fn test_register_and_lookup() {
        let (theme, policy) = setup();
        let factory = WidgetFactory::new(&theme, &policy);
        let mut registry = WidgetRegistry::new();

        let id = registry.insert(factory.double("mass", 0));
        registry.register("mass", id).unwrap();

        assert_eq!(registry.lookup("mass"), Some(id));
        assert_eq!(registry.path_of(id), Some("mass"));
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("inertia").is_none());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let (theme, policy) = setup();
        let factory = WidgetFactory::new(&theme, &policy);
        let mut registry = WidgetRegistry::new();

        let first = registry.insert(factory.double("mass", 0));
        let second = registry.insert(factory.double("mass", 0));
        registry.register("mass", first).unwrap();

        assert_eq!(
            registry.register("mass", second),
            Err(FormError::DuplicatePath("mass".into()))
        );
        assert_eq!(registry.lookup("mass"), Some(first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_paths_rejected() {
        let (theme, policy) = setup();
        let factory = WidgetFactory::new(&theme, &policy);
        let mut registry = WidgetRegistry::new();
        let id = registry.insert(factory.double("x", 0));

        assert!(matches!(registry.register("", id), Err(FormError::InvalidName(_))));
        assert!(matches!(registry.register("a::::b", id), Err(FormError::InvalidName(_))));
    }

    #[test]
    fn test_read_only_cascades_through_ancestors() {
        let (theme, policy) = setup();
        let factory = WidgetFactory::new(&theme, &policy);
        let mut registry = WidgetRegistry::new();

        let group = registry.insert(factory.group("link", 0));
        let record = registry.insert(factory.record("link", 1));
        let leaf = registry.insert(factory.double("link::mass", 1));
        registry.attach(group, record);
        registry.attach(record, leaf);
        registry.register("link", record).unwrap();
        registry.register("link::mass", leaf).unwrap();

        assert_eq!(registry.group_of(record), Some(group));
        assert_eq!(registry.group_of(leaf), None);
        assert_eq!(registry.flag_target("link").unwrap().id(), group);

        registry.get(group).unwrap().set_read_only(true);
        assert!(registry.is_effectively_read_only(leaf));
        assert!(!registry.get(leaf).unwrap().is_read_only());

        registry.get(group).unwrap().set_read_only(false);
        assert!(!registry.is_effectively_read_only(leaf));
    }

    #[test]
    fn test_descendants_in_child_order() {
        let (theme, policy) = setup();
        let factory = WidgetFactory::new(&theme, &policy);
        let mut registry = WidgetRegistry::new();

        let root = registry.insert(factory.root());
        let a = registry.insert(factory.double("a", 0));
        let b = registry.insert(factory.record("b", 0));
        let c = registry.insert(factory.double("b::c", 1));
        registry.attach(root, a);
        registry.attach(root, b);
        registry.attach(b, c);

        assert_eq!(registry.descendants(root), vec![root, a, b, c]);
    }

    #[test]
    fn test_clear() {
        let (theme, policy) = setup();
        let factory = WidgetFactory::new(&theme, &policy);
        let mut registry = WidgetRegistry::new();

        let root = registry.insert(factory.root());
        registry.set_root(root);
        let id = registry.insert(factory.double("mass", 0));
        registry.register("mass", id).unwrap();

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.root(), None);
        assert_eq!(registry.arena_len(), 0);
    }
}
