use serde::Serialize;

use crate::model::document::Checklist;
use crate::model::item::Item;
use crate::ops::search::SearchHit;

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// Render the whole tree as an indented outline, one row per item:
/// hierarchical number, checkbox, label, style markers.
pub fn render_outline(doc: &Checklist, show_done: bool) -> String {
    let mut out = String::new();
    render_items(&doc.items, show_done, &mut out);
    out
}

fn render_items(items: &[Item], show_done: bool, out: &mut String) {
    for item in items {
        if item.done && !show_done {
            continue;
        }
        // Depth from the number itself: "1.2.1" is two levels deep
        let depth = item.hns.matches('.').count();
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&item.hns);
        out.push_str(if item.done { " [x] " } else { " [ ] " });
        out.push_str(&item.label);
        if item.bold {
            out.push_str(" *");
        }
        if let Some(color) = &item.color {
            out.push_str(" (");
            out.push_str(color);
            out.push(')');
        }
        out.push('\n');
        render_items(item.children(), show_done, out);
    }
}

pub fn render_hits(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for hit in hits {
        out.push_str(&hit.hns);
        out.push(' ');
        out.push_str(&hit.label);
        if let Some(field) = &hit.field {
            out.push_str(" [in ");
            out.push_str(field);
            out.push(']');
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub hns: String,
    pub label: String,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemJson>,
}

impl ItemJson {
    pub fn from_item(item: &Item) -> Self {
        ItemJson {
            hns: item.hns.clone(),
            label: item.label.clone(),
            done: item.done,
            color: item.color.clone(),
            bold: item.bold,
            children: item.children().iter().map(ItemJson::from_item).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct OutlineJson {
    pub list_type: String,
    pub item_count: usize,
    pub items: Vec<ItemJson>,
}

impl OutlineJson {
    pub fn from_doc(doc: &Checklist) -> Self {
        OutlineJson {
            list_type: doc.list_type.clone(),
            item_count: doc.item_count(),
            items: doc.items.iter().map(ItemJson::from_item).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct HitJson {
    pub path: String,
    pub hns: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl HitJson {
    pub fn from_hit(hit: &SearchHit) -> Self {
        HitJson {
            path: hit.path.to_string(),
            hns: hit.hns.clone(),
            label: hit.label.clone(),
            field: hit.field.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::editor::Session;

    fn sample_doc() -> Checklist {
        let mut doc = Checklist::default();
        let mut groceries = Item::new("Groceries");
        let mut milk = Item::new("Buy milk");
        milk.done = true;
        groceries.children_mut().push(milk);
        let mut bread = Item::new("Buy bread");
        bread.bold = true;
        bread.color = Some("red".to_string());
        groceries.children_mut().push(bread);
        doc.items.push(groceries);
        doc.items.push(Item::new("Chores"));
        Session::open(doc).doc
    }

    #[test]
    fn outline_renders_numbers_checkboxes_and_styles() {
        let doc = sample_doc();
        insta::assert_snapshot!(render_outline(&doc, true), @r"
        1 [ ] Groceries
          1.1 [x] Buy milk
          1.2 [ ] Buy bread * (red)
        2 [ ] Chores
        ");
    }

    #[test]
    fn outline_can_hide_done_items() {
        let doc = sample_doc();
        let out = render_outline(&doc, false);
        assert!(!out.contains("Buy milk"));
        assert!(out.contains("Buy bread"));
    }

    #[test]
    fn item_json_drops_empty_children_and_default_style() {
        let doc = sample_doc();
        let json = serde_json::to_value(OutlineJson::from_doc(&doc)).unwrap();
        assert_eq!(json["item_count"], 4);
        assert_eq!(json["items"][1]["label"], "Chores");
        assert!(json["items"][1].get("children").is_none());
        assert!(json["items"][1].get("bold").is_none());
        assert_eq!(json["items"][0]["children"][1]["bold"], true);
    }
}
