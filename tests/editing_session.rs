//! End-to-end tests over the library API: load a document, run realistic
//! edit sequences through a session, save, and reload.

use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

use trellis::io::document_io::{load_document, migrate, save_document};
use trellis::model::document::Checklist;
use trellis::model::item::Item;
use trellis::ops::item_ops;
use trellis::session::editor::Session;
use trellis::tree::path::{for_each_with_path, resolve};

fn sample_doc() -> Checklist {
    let mut doc = Checklist::new("checklist");
    let mut groceries = Item::new("Groceries");
    groceries.children_mut().push(Item::new("Buy milk"));
    groceries.children_mut().push(Item::new("Buy bread"));
    doc.items.push(groceries);
    doc.items.push(Item::new("Chores"));
    doc.items.push(Item::new("Errands"));
    doc
}

fn assert_numbering(session: &Session) {
    for_each_with_path(&session.doc.items, &mut |path, item| {
        assert_eq!(item.hns, path.to_string(), "bad number at {path}");
    });
}

#[test]
fn edit_sequence_keeps_numbering_and_selection_consistent() {
    let mut session = Session::open(sample_doc());

    // Grow the tree a bit
    session.select(&"1.2".parse().unwrap()).unwrap();
    item_ops::add_same_level(&mut session, "Buy eggs").unwrap();
    session.select(&"2".parse().unwrap()).unwrap();
    item_ops::add_sub_level(&mut session, "Laundry").unwrap();
    assert_numbering(&session);

    // Move "Chores" (selected) up; its subtree travels with it
    let now_at = item_ops::move_alt_up(&mut session).unwrap();
    assert_eq!(now_at.to_string(), "1");
    assert_eq!(session.doc.items[0].label, "Chores");
    assert_eq!(session.doc.items[0].children()[0].label, "Laundry");
    assert_numbering(&session);

    // Indent "Errands" under "Groceries", then pull it back out
    session.select(&"3".parse().unwrap()).unwrap();
    let indented = item_ops::move_down_level(&mut session).unwrap();
    assert_eq!(indented.to_string(), "2.4");
    let outdented = item_ops::move_up_level(&mut session).unwrap();
    assert_eq!(outdented.to_string(), "3");
    assert_numbering(&session);

    // Duplicate the grocery subtree and delete the original
    session.select(&"2".parse().unwrap()).unwrap();
    item_ops::duplicate(&mut session).unwrap();
    assert_eq!(session.doc.items[2].children().len(), 3);
    item_ops::delete(&mut session, true).unwrap();
    assert!(session.selection().is_none());
    assert_eq!(session.doc.items[1].label, "Groceries");
    assert_numbering(&session);
}

#[test]
fn save_reload_round_trip_preserves_content() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("list.json");

    let mut session = Session::open(sample_doc());
    session.select(&"1.1".parse().unwrap()).unwrap();
    item_ops::toggle_done(&mut session).unwrap();
    item_ops::set_color(&mut session, Some("green".into())).unwrap();
    save_document(&path, &mut session.doc, false).unwrap();
    session.clear_dirty();

    let reloaded = Session::open(load_document(&path).unwrap());
    assert_eq!(reloaded.doc.items, session.doc.items);
    let milk = resolve(&reloaded.doc.items, &"1.1".parse().unwrap()).unwrap();
    assert!(milk.done);
    assert_eq!(milk.color.as_deref(), Some("green"));
    assert_eq!(milk.hns, "1.1");
}

#[test]
fn legacy_document_heals_on_first_touch_and_saves_canonical_form() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("legacy.json");
    fs::write(
        &path,
        r#"{
  "items": [
    { "label": "Old item", "owner": "ana" },
    { "label": "Other" }
  ],
  "lastSave": "2020-01-01T00:00:00Z"
}"#,
    )
    .unwrap();

    let mut doc = load_document(&path).unwrap();
    assert!(migrate(&mut doc) > 0); // default columns installed
    assert!(doc.items[0].children.is_none());

    let mut session = Session::new(doc, Default::default());
    // Custom fields survived the flat representation
    assert_eq!(
        session.doc.items[0].fields.get("owner"),
        Some(&serde_json::Value::from("ana"))
    );

    // First structural touch materializes the children array
    session.select(&"1".parse().unwrap()).unwrap();
    item_ops::add_sub_level(&mut session, "New sub").unwrap();
    assert_eq!(session.doc.items[0].children().len(), 1);
    assert_eq!(session.doc.items[0].children()[0].hns, "1.1");

    save_document(&path, &mut session.doc, true).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    // Canonical form on disk: the touched node has a real children array,
    // the untouched one still omits it
    assert!(value["items"][0]["children"].is_array());
    assert!(value["items"][1].get("children").is_none());
    assert_eq!(value["items"][0]["owner"], "ana");
}

#[test]
fn stale_save_is_refused_after_concurrent_edit() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("shared.json");

    let mut doc = sample_doc();
    save_document(&path, &mut doc, false).unwrap();

    let mut session_a = Session::open(load_document(&path).unwrap());
    let mut session_b = Session::open(load_document(&path).unwrap());

    session_a.select(&"2".parse().unwrap()).unwrap();
    item_ops::rename(&mut session_a, "Chores (A)").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(1100));
    save_document(&path, &mut session_a.doc, false).unwrap();

    session_b.select(&"2".parse().unwrap()).unwrap();
    item_ops::rename(&mut session_b, "Chores (B)").unwrap();
    let err = save_document(&path, &mut session_b.doc, false).unwrap_err();
    assert!(matches!(
        err,
        trellis::io::document_io::DocError::Conflict { .. }
    ));
    // The in-memory edit is not rolled back; the session stays dirty for
    // a user-driven retry
    assert!(session_b.is_dirty());
    assert_eq!(session_b.doc.items[1].label, "Chores (B)");
}
