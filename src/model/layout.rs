use serde::{Deserialize, Serialize};

/// Visibility, order, and width of one column in the item table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Field key this column displays ("label", "done", or a custom field)
    pub field: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Display width in pixels; 0 = auto
    #[serde(default)]
    pub width: u32,
}

fn default_true() -> bool {
    true
}

/// The active column arrangement of a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Layout {
    /// Column positions follow vector order; moving a column is a reorder
    /// of this vector.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        if from >= self.columns.len() || to >= self.columns.len() {
            return false;
        }
        let col = self.columns.remove(from);
        self.columns.insert(to, col);
        true
    }

    pub fn set_visible(&mut self, field: &str, visible: bool) -> bool {
        match self.columns.iter_mut().find(|c| c.field == field) {
            Some(col) => {
                col.visible = visible;
                true
            }
            None => false,
        }
    }
}

/// A saved, named layout the user can switch to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutVariant {
    pub name: String,
    pub layout: Layout,
}
