use serde_json::Value;

use crate::model::item::{Attachment, FileMeta, Item, NodeId};
use crate::session::editor::{Selection, Session};
use crate::session::events::DirtyEvent;
use crate::tree::path::{self, TreePath};

/// Error type for mutation operations. All variants leave the tree
/// unchanged; callers surface them as notifications.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error("no item is selected")]
    NoSelection,
    #[error("editor is busy, {0} skipped")]
    Busy(&'static str),
    #[error("path no longer resolves: {0}")]
    Unresolved(TreePath),
    #[error("delete requires confirmation")]
    ConfirmationRequired,
    #[error("clipboard is empty")]
    EmptyClipboard,
    #[error("invalid value for field {0}")]
    InvalidField(String),
    #[error("tree inconsistent after edit: item not found")]
    Inconsistent,
}

fn require_selection(session: &Session) -> Result<Selection, OpError> {
    session.selection().cloned().ok_or(OpError::NoSelection)
}

/// Locate an item by id after a mutation settled. Failing here means the
/// gate was bypassed; it is a bug class, not a runtime condition.
fn located(session: &Session, id: NodeId) -> Result<TreePath, OpError> {
    path::path_of(&session.doc.items, id).ok_or(OpError::Inconsistent)
}

// ---------------------------------------------------------------------------
// Structural operations
//
// Protocol: validate the selection, acquire the event flag (skip if busy),
// mutate, release the flag, then signal the structural dirty event — which
// renumbers the tree and re-resolves the selection.
// ---------------------------------------------------------------------------

/// Insert a new item immediately after the selected one, in the same
/// parent array. Appends when the selection is the last sibling.
pub fn add_same_level(session: &mut Session, label: &str) -> Result<TreePath, OpError> {
    let sel = require_selection(session)?;
    if !session.begin_event("add-same-level") {
        return Err(OpError::Busy("add-same-level"));
    }
    let result = insert_after(session, &sel.path, Item::new(label));
    session.end_event("add-same-level");
    let id = result?;
    session.mark_dirty(DirtyEvent::AddSameLevel);
    located(session, id)
}

/// Append a new item as the last child of the selected one, materializing
/// the children array if the document never wrote it.
pub fn add_sub_level(session: &mut Session, label: &str) -> Result<TreePath, OpError> {
    let sel = require_selection(session)?;
    if !session.begin_event("add-sub-level") {
        return Err(OpError::Busy("add-sub-level"));
    }
    let result = (|| {
        let mut item = Item::new(label);
        session.register(&mut item);
        let id = item.id;
        let parent = path::resolve_mut(&mut session.doc.items, &sel.path)
            .ok_or_else(|| OpError::Unresolved(sel.path.clone()))?;
        parent.children_mut().push(item);
        Ok(id)
    })();
    session.end_event("add-sub-level");
    let id = result?;
    session.mark_dirty(DirtyEvent::AddSubLevel);
    located(session, id)
}

/// Append a new item at the end of the root level. Needs no selection.
pub fn new_item(session: &mut Session, label: &str) -> Result<TreePath, OpError> {
    append_root(session, Item::new(label), "new-item", DirtyEvent::NewItem)
}

/// Append a new chapter row (bold top-level item) at the end of the root
/// level.
pub fn new_chapter(session: &mut Session, label: &str) -> Result<TreePath, OpError> {
    let mut item = Item::new(label);
    item.bold = true;
    append_root(session, item, "new-chapter", DirtyEvent::NewChapter)
}

fn append_root(
    session: &mut Session,
    mut item: Item,
    action: &'static str,
    event: DirtyEvent,
) -> Result<TreePath, OpError> {
    if !session.begin_event(action) {
        return Err(OpError::Busy(action));
    }
    session.register(&mut item);
    let id = item.id;
    session.doc.items.push(item);
    session.end_event(action);
    session.mark_dirty(event);
    located(session, id)
}

/// Deep-clone the selected subtree and insert the clone immediately after
/// the original. The clone gets fresh runtime ids throughout; it shares no
/// state with the original.
pub fn duplicate(session: &mut Session) -> Result<TreePath, OpError> {
    let sel = require_selection(session)?;
    if !session.begin_event("duplicate") {
        return Err(OpError::Busy("duplicate"));
    }
    let result = (|| {
        let original = path::resolve(&session.doc.items, &sel.path)
            .ok_or_else(|| OpError::Unresolved(sel.path.clone()))?;
        let clone = original.clone();
        insert_after(session, &sel.path, clone)
    })();
    session.end_event("duplicate");
    let id = result?;
    session.mark_dirty(DirtyEvent::Duplicate);
    located(session, id)
}

/// Remove the selected item (and its subtree) from its parent array and
/// clear the selection. Refused without `confirmed` unless the config has
/// confirmation turned off.
pub fn delete(session: &mut Session, confirmed: bool) -> Result<(), OpError> {
    let sel = require_selection(session)?;
    if session.config.editor.confirm_delete && !confirmed {
        return Err(OpError::ConfirmationRequired);
    }
    if !session.begin_event("delete") {
        return Err(OpError::Busy("delete"));
    }
    let result = (|| {
        let arr = path::parent_array_mut(&mut session.doc.items, &sel.path)
            .map_err(|_| OpError::Unresolved(sel.path.clone()))?;
        let idx = sel.path.last();
        if idx > arr.len() {
            return Err(OpError::Unresolved(sel.path.clone()));
        }
        arr.remove(idx - 1);
        Ok(())
    })();
    session.end_event("delete");
    result?;
    session.clear_selection();
    session.mark_dirty(DirtyEvent::Delete);
    Ok(())
}

/// Swap the selected item with its previous sibling. No-op at the start of
/// the array.
pub fn move_alt_up(session: &mut Session) -> Result<TreePath, OpError> {
    let sel = require_selection(session)?;
    if sel.path.last() <= 1 {
        return Ok(sel.path);
    }
    if !session.begin_event("move-alt-up") {
        return Err(OpError::Busy("move-alt-up"));
    }
    let result = (|| {
        let arr = path::parent_array_mut(&mut session.doc.items, &sel.path)
            .map_err(|_| OpError::Unresolved(sel.path.clone()))?;
        let idx = sel.path.last();
        if idx > arr.len() {
            return Err(OpError::Unresolved(sel.path.clone()));
        }
        arr.swap(idx - 1, idx - 2);
        Ok(())
    })();
    session.end_event("move-alt-up");
    result?;
    session.mark_dirty(DirtyEvent::MoveAltUp);
    located(session, sel.id)
}

/// Swap the selected item with its next sibling. No-op at the end of the
/// array.
pub fn move_alt_down(session: &mut Session) -> Result<TreePath, OpError> {
    let sel = require_selection(session)?;
    if !session.begin_event("move-alt-down") {
        return Err(OpError::Busy("move-alt-down"));
    }
    let result = (|| {
        let arr = path::parent_array_mut(&mut session.doc.items, &sel.path)
            .map_err(|_| OpError::Unresolved(sel.path.clone()))?;
        let idx = sel.path.last();
        if idx > arr.len() {
            return Err(OpError::Unresolved(sel.path.clone()));
        }
        if idx == arr.len() {
            return Ok(false);
        }
        arr.swap(idx - 1, idx);
        Ok(true)
    })();
    session.end_event("move-alt-down");
    if result? {
        session.mark_dirty(DirtyEvent::MoveAltDown);
    }
    located(session, sel.id)
}

/// Outdent: re-parent the selected item one level shallower, immediately
/// after its old parent. Outdenting a root-level item is a no-op.
pub fn move_up_level(session: &mut Session) -> Result<TreePath, OpError> {
    let sel = require_selection(session)?;
    let Some(parent_path) = sel.path.parent() else {
        return Ok(sel.path);
    };
    if !session.begin_event("move-up-level") {
        return Err(OpError::Busy("move-up-level"));
    }
    let result = (|| {
        let arr = path::parent_array_mut(&mut session.doc.items, &sel.path)
            .map_err(|_| OpError::Unresolved(sel.path.clone()))?;
        let idx = sel.path.last();
        if idx > arr.len() {
            return Err(OpError::Unresolved(sel.path.clone()));
        }
        let node = arr.remove(idx - 1);
        // The grandparent array still resolves: the removal happened one
        // level below it.
        let grandparent = path::parent_array_mut(&mut session.doc.items, &parent_path)
            .map_err(|_| OpError::Unresolved(parent_path.clone()))?;
        let insert_at = parent_path.last().min(grandparent.len());
        grandparent.insert(insert_at, node);
        Ok(())
    })();
    session.end_event("move-up-level");
    result?;
    session.mark_dirty(DirtyEvent::MoveUpLevel);
    located(session, sel.id)
}

/// Indent: re-parent the selected item under its preceding sibling, as
/// that sibling's last child. No-op without a preceding sibling.
pub fn move_down_level(session: &mut Session) -> Result<TreePath, OpError> {
    let sel = require_selection(session)?;
    if sel.path.last() <= 1 {
        return Ok(sel.path);
    }
    if !session.begin_event("move-down-level") {
        return Err(OpError::Busy("move-down-level"));
    }
    let result = (|| {
        let arr = path::parent_array_mut(&mut session.doc.items, &sel.path)
            .map_err(|_| OpError::Unresolved(sel.path.clone()))?;
        let idx = sel.path.last();
        if idx > arr.len() {
            return Err(OpError::Unresolved(sel.path.clone()));
        }
        let node = arr.remove(idx - 1);
        arr[idx - 2].children_mut().push(node);
        Ok(())
    })();
    session.end_event("move-down-level");
    result?;
    session.mark_dirty(DirtyEvent::MoveDownLevel);
    located(session, sel.id)
}

/// Flip the collapse state of the selected item's subtree.
pub fn toggle_collapse(session: &mut Session) -> Result<bool, OpError> {
    let sel = require_selection(session)?;
    if !session.begin_event("toggle-collapse") {
        return Err(OpError::Busy("toggle-collapse"));
    }
    let collapsed = if session.collapsed.remove(&sel.id) {
        false
    } else {
        session.collapsed.insert(sel.id);
        true
    };
    session.end_event("toggle-collapse");
    session.mark_dirty(DirtyEvent::ToggleCollapse);
    Ok(collapsed)
}

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

/// Snapshot the selected subtree into the clipboard.
pub fn copy(session: &mut Session) -> Result<(), OpError> {
    let snapshot = session.selected_item().cloned().ok_or(OpError::NoSelection)?;
    session.clipboard.store(snapshot);
    session.mark_dirty(DirtyEvent::Copy);
    Ok(())
}

/// Insert a deep copy of the clipboard snapshot after the selection, or
/// append it at the root level when nothing is selected. The snapshot stays
/// in the clipboard for further pastes.
pub fn paste(session: &mut Session) -> Result<TreePath, OpError> {
    let item = session.clipboard.snapshot().ok_or(OpError::EmptyClipboard)?;
    if !session.begin_event("paste") {
        return Err(OpError::Busy("paste"));
    }
    let result = match session.selection().cloned() {
        Some(sel) => insert_after(session, &sel.path, item),
        None => {
            let mut item = item;
            session.register(&mut item);
            let id = item.id;
            session.doc.items.push(item);
            Ok(id)
        }
    };
    session.end_event("paste");
    let id = result?;
    session.mark_dirty(DirtyEvent::Paste);
    located(session, id)
}

// ---------------------------------------------------------------------------
// Style and content operations (no renumber, row-level render)
// ---------------------------------------------------------------------------

pub fn rename(session: &mut Session, label: &str) -> Result<(), OpError> {
    with_selected(session, DirtyEvent::Rename, |item| {
        item.label = label.to_string();
        Ok(())
    })
}

pub fn toggle_done(session: &mut Session) -> Result<bool, OpError> {
    let mut now_done = false;
    with_selected(session, DirtyEvent::ContentEdit, |item| {
        item.done = !item.done;
        now_done = item.done;
        Ok(())
    })?;
    Ok(now_done)
}

pub fn set_color(session: &mut Session, color: Option<String>) -> Result<(), OpError> {
    with_selected(session, DirtyEvent::SetColor, |item| {
        item.color = color;
        Ok(())
    })
}

pub fn set_bold(session: &mut Session, bold: bool) -> Result<(), OpError> {
    with_selected(session, DirtyEvent::SetBold, |item| {
        item.bold = bold;
        Ok(())
    })
}

/// Important rows render bold and red; toggling clears both.
pub fn toggle_important(session: &mut Session) -> Result<(), OpError> {
    with_selected(session, DirtyEvent::ToggleImportant, |item| {
        let important = item.bold && item.color.as_deref() == Some("red");
        if important {
            item.bold = false;
            item.color = None;
        } else {
            item.bold = true;
            item.color = Some("red".to_string());
        }
        Ok(())
    })
}

pub fn reset_style(session: &mut Session) -> Result<(), OpError> {
    with_selected(session, DirtyEvent::ResetStyle, |item| {
        item.color = None;
        item.bold = false;
        Ok(())
    })
}

/// Set a custom field on the selected item, validated against the field
/// registry.
pub fn set_field(session: &mut Session, key: &str, value: Value) -> Result<(), OpError> {
    if !session.registry.validate(key, &value) {
        return Err(OpError::InvalidField(key.to_string()));
    }
    with_selected(session, DirtyEvent::FieldEdit, |item| {
        item.fields.insert(key.to_string(), value);
        Ok(())
    })
}

pub fn add_item_file(session: &mut Session, meta: FileMeta) -> Result<(), OpError> {
    with_selected(session, DirtyEvent::AddFile, |item| {
        item.files.push(meta);
        Ok(())
    })
}

pub fn add_attachment(session: &mut Session, attachment: Attachment) -> Result<(), OpError> {
    with_selected(session, DirtyEvent::AddFile, |item| {
        item.attachments.push(attachment);
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Register and insert an item immediately after the node at `after`, in
/// the same parent array. Appends when `after` is the last sibling.
fn insert_after(session: &mut Session, after: &TreePath, mut item: Item) -> Result<NodeId, OpError> {
    session.register(&mut item);
    let id = item.id;
    let arr = path::parent_array_mut(&mut session.doc.items, after)
        .map_err(|_| OpError::Unresolved(after.clone()))?;
    let idx = after.last();
    if idx > arr.len() {
        return Err(OpError::Unresolved(after.clone()));
    }
    arr.insert(idx, item);
    Ok(id)
}

fn with_selected(
    session: &mut Session,
    event: DirtyEvent,
    edit: impl FnOnce(&mut Item) -> Result<(), OpError>,
) -> Result<(), OpError> {
    let sel = require_selection(session)?;
    let item = path::resolve_mut(&mut session.doc.items, &sel.path)
        .ok_or_else(|| OpError::Unresolved(sel.path.clone()))?;
    edit(item)?;
    session.mark_dirty(event);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
