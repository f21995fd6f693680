use crate::model::item::{Item, NodeId};

/// Single-slot clipboard holding a structural snapshot of the last copied
/// item. Copy stores a deep copy, not a live reference, so later edits to
/// the tree never leak into a pending paste. The slot persists until the
/// next copy overwrites it.
#[derive(Debug, Default)]
pub struct Clipboard {
    slot: Option<Item>,
}

impl Clipboard {
    /// Snapshot the given subtree. Runtime ids are stripped; the paste that
    /// consumes the snapshot assigns fresh ones.
    pub fn copy(&mut self, item: &Item) {
        self.store(item.clone());
    }

    /// Like [`copy`](Clipboard::copy), for an already-owned deep copy.
    pub fn store(&mut self, mut item: Item) {
        strip_ids(&mut item);
        self.slot = Some(item);
    }

    /// Deep copy of the held snapshot, leaving the slot intact for repeated
    /// pastes.
    pub fn snapshot(&self) -> Option<Item> {
        self.slot.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

fn strip_ids(item: &mut Item) {
    item.id = NodeId::UNASSIGNED;
    if let Some(children) = item.children.as_deref_mut() {
        for child in children {
            strip_ids(child);
        }
    }
}
