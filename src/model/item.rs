use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Runtime identity of a node in the item tree.
///
/// Ids are assigned by the session when a document is loaded or an item is
/// created, and are never serialized. Positional paths shift under
/// structural edits; the id does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// Id of a node that has not been registered with a session yet.
    pub const UNASSIGNED: NodeId = NodeId(0);

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

/// Metadata for a file attached to an item (or to the whole document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub uploader: String,
    pub uploaded: DateTime<Utc>,
}

/// A link attached to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// One entry in the hierarchical checklist tree.
///
/// `children` is `None` only in legacy documents that never wrote the field;
/// any mutation that touches a node materializes an empty array as the
/// canonical no-children state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Runtime identity, never persisted
    #[serde(skip)]
    pub id: NodeId,
    /// User-editable text
    #[serde(default)]
    pub label: String,
    /// Hierarchical number ("1.2.3"), recomputed after every structural
    /// mutation; never hand-edited
    #[serde(default)]
    pub hns: String,
    /// Completion flag
    #[serde(default)]
    pub done: bool,
    /// Per-row color override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Per-row bold override
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Item>>,
    /// Attached file metadata, in upload order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileMeta>,
    /// Attached links, in insertion order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Custom scalar fields (defined by the field registry), stored flat
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Item {
    /// Create a new item with the given label and an empty children array.
    pub fn new(label: impl Into<String>) -> Self {
        Item {
            id: NodeId::UNASSIGNED,
            label: label.into(),
            hns: String::new(),
            done: false,
            color: None,
            bold: false,
            children: Some(Vec::new()),
            files: Vec::new(),
            attachments: Vec::new(),
            fields: IndexMap::new(),
        }
    }

    /// Children as a slice, treating an absent array as empty.
    pub fn children(&self) -> &[Item] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Mutable children, materializing the canonical empty array if the
    /// legacy document never wrote one. The heal is logged so malformed
    /// documents stay visible.
    pub fn children_mut(&mut self) -> &mut Vec<Item> {
        if self.children.is_none() {
            tracing::warn!(label = %self.label, "healing missing children array");
        }
        self.children.get_or_insert_with(Vec::new)
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Number of nodes in this subtree, including this item.
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(Item::subtree_len).sum::<usize>()
    }
}

impl PartialEq for Item {
    // Runtime identity is excluded: two items are equal if their persisted
    // content is equal.
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.hns == other.hns
            && self.done == other.done
            && self.color == other.color
            && self.bold == other.bold
            && self.children() == other.children()
            && self.files == other.files
            && self.attachments == other.attachments
            && self.fields == other.fields
    }
}

impl Eq for Item {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_has_canonical_empty_children() {
        let item = Item::new("buy milk");
        assert_eq!(item.children, Some(Vec::new()));
        assert!(!item.has_children());
    }

    #[test]
    fn children_mut_heals_absent_array() {
        let mut item = Item::new("legacy");
        item.children = None;
        item.children_mut().push(Item::new("child"));
        assert_eq!(item.children().len(), 1);
    }

    #[test]
    fn absent_and_empty_children_compare_equal() {
        let mut a = Item::new("x");
        let b = Item::new("x");
        a.children = None;
        assert_eq!(a, b);
    }

    #[test]
    fn eq_ignores_node_id() {
        let mut a = Item::new("x");
        let b = Item::new("x");
        a.id = NodeId(42);
        assert_eq!(a, b);
    }

    #[test]
    fn deserialize_legacy_item_without_children() {
        let item: Item = serde_json::from_str(r#"{"label":"old","hns":"1"}"#).unwrap();
        assert_eq!(item.label, "old");
        assert!(item.children.is_none());
        assert!(!item.done);
    }

    #[test]
    fn custom_fields_round_trip_flat() {
        let json = r#"{"label":"t","owner":"ana","priority":3}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.fields.get("owner"), Some(&Value::from("ana")));
        assert_eq!(item.fields.get("priority"), Some(&Value::from(3)));

        let out = serde_json::to_value(&item).unwrap();
        assert_eq!(out["owner"], "ana");
        assert_eq!(out["priority"], 3);
    }

    #[test]
    fn subtree_len_counts_all_descendants() {
        let mut root = Item::new("r");
        let mut a = Item::new("a");
        a.children_mut().push(Item::new("a1"));
        root.children_mut().push(a);
        root.children_mut().push(Item::new("b"));
        assert_eq!(root.subtree_len(), 4);
    }
}
