use regex::RegexBuilder;

use crate::model::document::Checklist;
use crate::session::editor::Session;
use crate::session::events::DirtyEvent;
use crate::tree::path::{self, TreePath};

/// One search result: where the match lives and what matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: TreePath,
    pub hns: String,
    pub label: String,
    /// Field key the pattern matched in, or None for a label match
    pub field: Option<String>,
}

/// Case-insensitive regex search over item labels and custom string
/// fields, in display (pre-order) order. Read-only; selection and dirty
/// state are untouched.
pub fn search(doc: &Checklist, pattern: &str) -> Result<Vec<SearchHit>, regex::Error> {
    let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
    let mut hits = Vec::new();
    path::for_each_with_path(&doc.items, &mut |item_path, item| {
        if re.is_match(&item.label) {
            hits.push(SearchHit {
                path: item_path.clone(),
                hns: item.hns.clone(),
                label: item.label.clone(),
                field: None,
            });
            return;
        }
        for (key, value) in &item.fields {
            if let Some(text) = value.as_str()
                && re.is_match(text)
            {
                hits.push(SearchHit {
                    path: item_path.clone(),
                    hns: item.hns.clone(),
                    label: item.label.clone(),
                    field: Some(key.clone()),
                });
                return;
            }
        }
    });
    Ok(hits)
}

/// Move the selection to the first match, if any. Emits the UI-band
/// search-select event; the document does not become dirty.
pub fn select_first_match(
    session: &mut Session,
    pattern: &str,
) -> Result<Option<TreePath>, regex::Error> {
    let hits = search(&session.doc, pattern)?;
    let Some(hit) = hits.into_iter().next() else {
        return Ok(None);
    };
    if session.select(&hit.path).is_ok() {
        session.mark_dirty(DirtyEvent::SearchSelect);
        Ok(Some(hit.path))
    } else {
        Ok(None)
    }
}
