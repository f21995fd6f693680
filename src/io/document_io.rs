use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::model::document::Checklist;
use crate::model::layout::Column;

/// Error type for document persistence
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not serialize document: {0}")]
    Serialize(serde_json::Error),
    #[error("document changed on disk since load (saved {disk}); use force to overwrite")]
    Conflict { disk: String },
}

/// Load a checklist document from a JSON file. Unknown fields on items are
/// kept as flat custom fields; missing optional fields take their
/// defaults.
pub fn load_document(path: &Path) -> Result<Checklist, DocError> {
    let text = fs::read_to_string(path).map_err(|e| DocError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let doc: Checklist = serde_json::from_str(&text).map_err(|e| DocError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(doc)
}

/// Normalize legacy document shapes in place. Returns the number of
/// repairs made; the caller emits the migration event when nonzero.
///
/// Missing per-item `children` arrays are NOT materialized here — the path
/// resolver heals those lazily, with a diagnostic, on first touch.
pub fn migrate(doc: &mut Checklist) -> usize {
    let mut repairs = 0;

    if doc.layout.columns.is_empty() {
        doc.layout.columns = default_columns();
        repairs += 1;
    }

    let before = doc.collaborators.len();
    let mut seen = Vec::new();
    doc.collaborators.retain(|c| {
        if seen.contains(c) {
            false
        } else {
            seen.push(c.clone());
            true
        }
    });
    repairs += before - doc.collaborators.len();

    if repairs > 0 {
        info!(repairs, "legacy document normalized");
    }
    repairs
}

fn default_columns() -> Vec<Column> {
    vec![
        Column {
            field: "hns".to_string(),
            visible: true,
            width: 0,
        },
        Column {
            field: "label".to_string(),
            visible: true,
            width: 0,
        },
        Column {
            field: "done".to_string(),
            visible: true,
            width: 40,
        },
    ]
}

/// Save the whole document to `path`: stamp `lastSave`, serialize, and
/// write atomically (temp file + rename, never a partial file).
///
/// Last-write-wins conflict detection: if the file's `lastSave` token no
/// longer matches the one this document was loaded with, someone else
/// saved in between and the write is refused unless `force` is set. The
/// in-memory document is left dirty for a retry either way.
pub fn save_document(path: &Path, doc: &mut Checklist, force: bool) -> Result<(), DocError> {
    if !force {
        check_conflict(path, doc)?;
    }
    doc.last_save = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let content =
        serde_json::to_string_pretty(doc).map_err(DocError::Serialize)?;
    atomic_write(path, content.as_bytes()).map_err(|e| DocError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn check_conflict(path: &Path, doc: &Checklist) -> Result<(), DocError> {
    if !path.exists() {
        return Ok(());
    }
    let on_disk = load_document(path)?;
    if on_disk.last_save != doc.last_save {
        warn!(
            disk = %on_disk.last_save,
            session = %doc.last_save,
            "refusing save: lastSave token mismatch"
        );
        return Err(DocError::Conflict {
            disk: on_disk.last_save,
        });
    }
    Ok(())
}

/// Write `content` to `path` atomically using a temp file + rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
