use serde::{Deserialize, Serialize};

use super::item::{FileMeta, Item};
use super::layout::{Layout, LayoutVariant};

/// A checklist document: the root container the whole editing session
/// operates on. Saved and loaded as a single JSON file; there is no partial
/// persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    /// Root-level items, insertion order = display order
    #[serde(default)]
    pub items: Vec<Item>,
    /// Active column layout
    #[serde(default)]
    pub layout: Layout,
    /// Saved named layouts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layouts: Vec<LayoutVariant>,
    /// Usernames with access to this document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collaborators: Vec<String>,
    /// Document-level file attachments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileMeta>,
    /// Opaque conflict-detection token, stamped on save. The editing core
    /// never compares it; the persistence layer does.
    #[serde(default)]
    pub last_save: String,
    #[serde(default = "default_list_type")]
    pub list_type: String,
}

fn default_list_type() -> String {
    "checklist".to_string()
}

impl Default for Checklist {
    fn default() -> Self {
        Checklist {
            items: Vec::new(),
            layout: Layout::default(),
            layouts: Vec::new(),
            collaborators: Vec::new(),
            files: Vec::new(),
            last_save: String::new(),
            list_type: default_list_type(),
        }
    }
}

impl Checklist {
    pub fn new(list_type: impl Into<String>) -> Self {
        Checklist {
            list_type: list_type.into(),
            ..Checklist::default()
        }
    }

    /// Total number of items in the tree.
    pub fn item_count(&self) -> usize {
        self.items.iter().map(Item::subtree_len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_deserializes_with_defaults() {
        let doc: Checklist = serde_json::from_str("{}").unwrap();
        assert!(doc.items.is_empty());
        assert_eq!(doc.list_type, "checklist");
        assert_eq!(doc.last_save, "");
    }

    #[test]
    fn camel_case_field_names_on_the_wire() {
        let mut doc = Checklist::new("treelist");
        doc.last_save = "2026-08-07T10:00:00Z".into();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["listType"], "treelist");
        assert_eq!(json["lastSave"], "2026-08-07T10:00:00Z");
    }

    #[test]
    fn item_count_spans_the_whole_tree() {
        let mut doc = Checklist::default();
        let mut a = Item::new("a");
        a.children_mut().push(Item::new("a1"));
        doc.items.push(a);
        doc.items.push(Item::new("b"));
        assert_eq!(doc.item_count(), 3);
    }
}
