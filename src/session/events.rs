/// What kind of change a completed action made. Downstream consumers use
/// the band to pick a render strategy and to decide whether the document is
/// dirty for autosave; the renumbering engine runs only for the Structural
/// band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyEvent {
    // Structural — tree shape or sibling order changed
    NewChapter,
    NewItem,
    AddSameLevel,
    AddSubLevel,
    Duplicate,
    Delete,
    MoveAltUp,
    MoveAltDown,
    MoveUpLevel,
    MoveDownLevel,
    ToggleCollapse,
    Paste,
    // Style — row-level presentation only
    ToggleImportant,
    SetColor,
    SetBold,
    ResetStyle,
    // Layout — column structure only
    LayoutReorder,
    LayoutVisibility,
    LayoutSave,
    LayoutSelect,
    // Metadata — header/title-level content
    Rename,
    Copy,
    ContentEdit,
    FieldEdit,
    AddFile,
    // System — load/migration lifecycle
    LoadComplete,
    MigrationApplied,
    ChecklistLoaded,
    // UI-only — no data change
    SaveClick,
    RefreshView,
    FilterChange,
    SearchSelect,
}

/// The render/save bands the events partition into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventBand {
    Structural,
    Style,
    Layout,
    Metadata,
    System,
    Ui,
}

impl EventBand {
    /// Only structural changes invalidate hierarchical numbers.
    pub fn needs_renumber(self) -> bool {
        self == EventBand::Structural
    }

    /// Whether the event leaves the document dirty for a future save.
    pub fn marks_dirty(self) -> bool {
        matches!(
            self,
            EventBand::Structural | EventBand::Style | EventBand::Layout | EventBand::Metadata
        )
    }

    /// Whether the whole visible tree must be rebuilt, as opposed to a
    /// cheap in-place update.
    pub fn full_render(self) -> bool {
        matches!(self, EventBand::Structural | EventBand::System)
    }
}

impl DirtyEvent {
    pub fn band(self) -> EventBand {
        use DirtyEvent::*;
        match self {
            NewChapter | NewItem | AddSameLevel | AddSubLevel | Duplicate | Delete | MoveAltUp
            | MoveAltDown | MoveUpLevel | MoveDownLevel | ToggleCollapse | Paste => {
                EventBand::Structural
            }
            ToggleImportant | SetColor | SetBold | ResetStyle => EventBand::Style,
            LayoutReorder | LayoutVisibility | LayoutSave | LayoutSelect => EventBand::Layout,
            Rename | Copy | ContentEdit | FieldEdit | AddFile => EventBand::Metadata,
            LoadComplete | MigrationApplied | ChecklistLoaded => EventBand::System,
            SaveClick | RefreshView | FilterChange | SearchSelect => EventBand::Ui,
        }
    }

    /// Stable kebab-case name, used for gate bookkeeping and logs.
    pub fn name(self) -> &'static str {
        use DirtyEvent::*;
        match self {
            NewChapter => "new-chapter",
            NewItem => "new-item",
            AddSameLevel => "add-same-level",
            AddSubLevel => "add-sub-level",
            Duplicate => "duplicate",
            Delete => "delete",
            MoveAltUp => "move-alt-up",
            MoveAltDown => "move-alt-down",
            MoveUpLevel => "move-up-level",
            MoveDownLevel => "move-down-level",
            ToggleCollapse => "toggle-collapse",
            Paste => "paste",
            ToggleImportant => "toggle-important",
            SetColor => "set-color",
            SetBold => "set-bold",
            ResetStyle => "reset-style",
            LayoutReorder => "layout-reorder",
            LayoutVisibility => "layout-visibility",
            LayoutSave => "layout-save",
            LayoutSelect => "layout-select",
            Rename => "rename",
            Copy => "copy",
            ContentEdit => "content-edit",
            FieldEdit => "field-edit",
            AddFile => "add-file",
            LoadComplete => "load-complete",
            MigrationApplied => "migration-applied",
            ChecklistLoaded => "checklist-loaded",
            SaveClick => "save-click",
            RefreshView => "refresh-view",
            FilterChange => "filter-change",
            SearchSelect => "search-select",
        }
    }
}

impl std::fmt::Display for DirtyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_structural_band_renumbers() {
        assert!(DirtyEvent::AddSubLevel.band().needs_renumber());
        assert!(DirtyEvent::Paste.band().needs_renumber());
        assert!(!DirtyEvent::SetColor.band().needs_renumber());
        assert!(!DirtyEvent::Rename.band().needs_renumber());
        assert!(!DirtyEvent::ChecklistLoaded.band().needs_renumber());
        assert!(!DirtyEvent::SearchSelect.band().needs_renumber());
    }

    #[test]
    fn system_and_ui_events_do_not_dirty_the_document() {
        assert!(!DirtyEvent::LoadComplete.band().marks_dirty());
        assert!(!DirtyEvent::RefreshView.band().marks_dirty());
        assert!(DirtyEvent::Delete.band().marks_dirty());
        assert!(DirtyEvent::LayoutSave.band().marks_dirty());
        assert!(DirtyEvent::Rename.band().marks_dirty());
    }

    #[test]
    fn structural_events_force_a_full_render() {
        assert!(DirtyEvent::MoveAltUp.band().full_render());
        assert!(!DirtyEvent::SetBold.band().full_render());
    }
}
