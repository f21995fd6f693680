use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use crate::model::config::EditorConfig;
use crate::model::document::Checklist;
use crate::model::field::FieldRegistry;
use crate::model::item::{FileMeta, Item, NodeId};
use crate::model::layout::LayoutVariant;
use crate::session::clipboard::Clipboard;
use crate::session::debounce::Debouncer;
use crate::session::events::DirtyEvent;
use crate::session::gate::{EventGate, GateState};
use crate::tree::path::{self, PathError, TreePath};
use crate::tree::renumber::renumber;

/// The currently selected item: its stable runtime id plus the positional
/// path it had when last resolved. The path is re-derived from the id after
/// every structural mutation, so callers never observe a stale path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: NodeId,
    pub path: TreePath,
}

#[derive(Debug, Default)]
struct DirtyState {
    dirty: bool,
    last_event: Option<DirtyEvent>,
}

/// One editing session over one open document.
///
/// Owns the tree store, selection, clipboard, and the mutual-exclusion
/// gate. All mutation operations take the session; there is no module-level
/// shared state.
pub struct Session {
    pub doc: Checklist,
    pub config: EditorConfig,
    pub registry: FieldRegistry,
    pub clipboard: Clipboard,
    gate: EventGate,
    selection: Option<Selection>,
    pub(crate) collapsed: HashSet<NodeId>,
    dirty: DirtyState,
    next_id: u64,
}

impl Session {
    /// Open a document for editing: assign runtime ids, compute the initial
    /// numbering, record the load event.
    pub fn new(doc: Checklist, config: EditorConfig) -> Self {
        let mut session = Session {
            doc,
            config,
            registry: FieldRegistry::default(),
            clipboard: Clipboard::default(),
            gate: EventGate::default(),
            selection: None,
            collapsed: HashSet::new(),
            dirty: DirtyState::default(),
            next_id: 1,
        };
        let mut next = session.next_id;
        for item in &mut session.doc.items {
            assign_ids(item, &mut next);
        }
        session.next_id = next;
        renumber(&mut session.doc.items);
        session.dirty.last_event = Some(DirtyEvent::ChecklistLoaded);
        session
    }

    pub fn open(doc: Checklist) -> Self {
        Session::new(doc, EditorConfig::default())
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// Assign fresh runtime ids to an item and its whole subtree. Every
    /// item entering the tree (new, duplicated, pasted) passes through
    /// here before insertion.
    pub(crate) fn register(&mut self, item: &mut Item) {
        let mut next = self.next_id;
        assign_ids(item, &mut next);
        self.next_id = next;
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn select(&mut self, target: &TreePath) -> Result<(), PathError> {
        match path::resolve(&self.doc.items, target) {
            Some(item) => {
                self.selection = Some(Selection {
                    id: item.id,
                    path: target.clone(),
                });
                Ok(())
            }
            None => Err(PathError::NotFound(target.clone())),
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_item(&self) -> Option<&Item> {
        let sel = self.selection.as_ref()?;
        path::resolve(&self.doc.items, &sel.path)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Re-derive the selection path from the stable id. Called after every
    /// structural mutation; drops the selection if the node left the tree.
    fn refresh_selection(&mut self) {
        let Some(sel) = self.selection.take() else {
            return;
        };
        match path::path_of(&self.doc.items, sel.id) {
            Some(current) => {
                self.selection = Some(Selection {
                    id: sel.id,
                    path: current,
                });
            }
            None => debug!("selection dropped: node no longer in tree"),
        }
    }

    // -----------------------------------------------------------------------
    // Gate
    // -----------------------------------------------------------------------

    pub fn gate_state(&self) -> &GateState {
        self.gate.state()
    }

    /// See [`EventGate::begin_event`]; false means the action must be
    /// skipped, not queued.
    pub fn begin_event(&mut self, action: &'static str) -> bool {
        self.gate.begin_event(action)
    }

    pub fn end_event(&mut self, action: &'static str) -> bool {
        self.gate.end_event(action)
    }

    // -----------------------------------------------------------------------
    // Dirty protocol
    // -----------------------------------------------------------------------

    /// Record a completed action. Structural events run the renumbering
    /// pass (under the renumber flag) and re-resolve the selection before
    /// anything downstream reads hns values.
    pub fn mark_dirty(&mut self, event: DirtyEvent) {
        let band = event.band();
        if band.needs_renumber() {
            if self.gate.begin_renumber() {
                renumber(&mut self.doc.items);
                self.gate.end_renumber();
            }
            self.refresh_selection();
        }
        if band.marks_dirty() {
            self.dirty.dirty = true;
        }
        self.dirty.last_event = Some(event);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.dirty
    }

    pub fn last_event(&self) -> Option<DirtyEvent> {
        self.dirty.last_event
    }

    /// Called by the persistence layer after a successful save.
    pub fn clear_dirty(&mut self) {
        self.dirty.dirty = false;
    }

    /// Whether autosave should fire after `idle` time without input.
    pub fn should_autosave(&self, idle: Duration) -> bool {
        let secs = self.config.editor.autosave_secs;
        self.dirty.dirty && secs > 0 && idle >= Duration::from_secs(secs)
    }

    /// A debouncer configured with this session's window.
    pub fn new_debouncer(&self) -> Debouncer {
        Debouncer::new(Duration::from_millis(self.config.editor.debounce_ms))
    }

    // -----------------------------------------------------------------------
    // Collapse state
    // -----------------------------------------------------------------------

    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.collapsed.contains(&id)
    }

    // -----------------------------------------------------------------------
    // Layout and document metadata
    // -----------------------------------------------------------------------

    pub fn reorder_column(&mut self, from: usize, to: usize) -> bool {
        if self.doc.layout.move_column(from, to) {
            self.mark_dirty(DirtyEvent::LayoutReorder);
            true
        } else {
            false
        }
    }

    pub fn set_column_visible(&mut self, field: &str, visible: bool) -> bool {
        if self.doc.layout.set_visible(field, visible) {
            self.mark_dirty(DirtyEvent::LayoutVisibility);
            true
        } else {
            false
        }
    }

    /// Save the active layout under a name, replacing any variant with the
    /// same name.
    pub fn save_layout(&mut self, name: impl Into<String>) {
        let variant = LayoutVariant {
            name: name.into(),
            layout: self.doc.layout.clone(),
        };
        match self.doc.layouts.iter_mut().find(|v| v.name == variant.name) {
            Some(existing) => *existing = variant,
            None => self.doc.layouts.push(variant),
        }
        self.mark_dirty(DirtyEvent::LayoutSave);
    }

    pub fn select_layout(&mut self, name: &str) -> bool {
        match self.doc.layouts.iter().find(|v| v.name == name) {
            Some(variant) => {
                self.doc.layout = variant.layout.clone();
                self.mark_dirty(DirtyEvent::LayoutSelect);
                true
            }
            None => false,
        }
    }

    pub fn add_document_file(&mut self, meta: FileMeta) {
        self.doc.files.push(meta);
        self.mark_dirty(DirtyEvent::AddFile);
    }
}

fn assign_ids(item: &mut Item, next: &mut u64) {
    item.id = NodeId(*next);
    *next += 1;
    if let Some(children) = item.children.as_deref_mut() {
        for child in children {
            assign_ids(child, next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::events::DirtyEvent;

    fn sample_doc() -> Checklist {
        let mut doc = Checklist::default();
        let mut a = Item::new("a");
        a.children_mut().push(Item::new("a1"));
        doc.items.push(a);
        doc.items.push(Item::new("b"));
        doc
    }

    #[test]
    fn open_assigns_ids_and_numbers() {
        let session = Session::open(sample_doc());
        assert!(session.doc.items[0].id.is_assigned());
        assert!(session.doc.items[0].children()[0].id.is_assigned());
        assert_ne!(session.doc.items[0].id, session.doc.items[1].id);
        assert_eq!(session.doc.items[0].hns, "1");
        assert_eq!(session.doc.items[0].children()[0].hns, "1.1");
        assert_eq!(session.doc.items[1].hns, "2");
        assert_eq!(session.last_event(), Some(DirtyEvent::ChecklistLoaded));
        assert!(!session.is_dirty());
    }

    #[test]
    fn select_resolves_and_stores_id() {
        let mut session = Session::open(sample_doc());
        session.select(&"1.1".parse().unwrap()).unwrap();
        let sel = session.selection().unwrap();
        assert_eq!(sel.path.to_string(), "1.1");
        assert_eq!(session.selected_item().unwrap().label, "a1");
        assert!(session.select(&"9".parse().unwrap()).is_err());
    }

    #[test]
    fn structural_event_renumbers_and_refreshes_selection() {
        let mut session = Session::open(sample_doc());
        session.select(&"2".parse().unwrap()).unwrap();
        // Simulate a structural edit done by an operation
        let item = session.doc.items.remove(1);
        session.doc.items.insert(0, item);
        session.mark_dirty(DirtyEvent::MoveAltUp);

        assert_eq!(session.doc.items[0].label, "b");
        assert_eq!(session.doc.items[0].hns, "1");
        // Selection followed the node to its new position
        assert_eq!(session.selection().unwrap().path.to_string(), "1");
        assert!(session.is_dirty());
    }

    #[test]
    fn selection_is_dropped_when_node_leaves_the_tree() {
        let mut session = Session::open(sample_doc());
        session.select(&"2".parse().unwrap()).unwrap();
        session.doc.items.remove(1);
        session.mark_dirty(DirtyEvent::Delete);
        assert!(session.selection().is_none());
    }

    #[test]
    fn style_event_marks_dirty_without_renumbering() {
        let mut session = Session::open(sample_doc());
        // Make the stored numbers stale on purpose
        session.doc.items[0].hns = "99".to_string();
        session.mark_dirty(DirtyEvent::SetColor);
        assert_eq!(session.doc.items[0].hns, "99");
        assert!(session.is_dirty());
    }

    #[test]
    fn ui_event_does_not_dirty() {
        let mut session = Session::open(sample_doc());
        session.mark_dirty(DirtyEvent::RefreshView);
        assert!(!session.is_dirty());
        assert_eq!(session.last_event(), Some(DirtyEvent::RefreshView));
    }

    #[test]
    fn autosave_requires_dirty_and_elapsed_idle() {
        let mut session = Session::open(sample_doc());
        session.config.editor.autosave_secs = 5;
        assert!(!session.should_autosave(Duration::from_secs(10)));
        session.mark_dirty(DirtyEvent::Rename);
        assert!(!session.should_autosave(Duration::from_secs(3)));
        assert!(session.should_autosave(Duration::from_secs(5)));
        session.config.editor.autosave_secs = 0;
        assert!(!session.should_autosave(Duration::from_secs(60)));
    }

    #[test]
    fn save_layout_replaces_by_name() {
        let mut session = Session::open(sample_doc());
        session.save_layout("default");
        session.save_layout("default");
        assert_eq!(session.doc.layouts.len(), 1);
        assert!(session.select_layout("default"));
        assert!(!session.select_layout("missing"));
    }
}
