//! Durable storage for the application document.
//!
//! The whole document lives in a single JSON file. Reads are forgiving: a
//! missing, unreadable or malformed file is treated as an empty document.
//! Writes are staged into a temp file in the target's directory, synced to
//! disk and then renamed over the target, so a reader only ever sees a
//! complete previous or complete new document.
//!
//! There is no locking. Two concurrent replaces race on the final rename and
//! the last one to land wins.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// The persisted application state: string keys to arbitrary JSON values.
pub type Document = Map<String, Value>;

/// Handle to the file backing the document.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document. Never fails.
    pub fn load(&self) -> Document {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Document::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "document unreadable, starting empty");
                return Document::new();
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(doc)) => doc,
            Ok(other) => {
                warn!(
                    path = %self.path.display(),
                    found = json_kind(&other),
                    "document is not a JSON object, starting empty"
                );
                Document::new()
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "document is corrupt, starting empty");
                Document::new()
            }
        }
    }

    /// Atomically replace the stored document with `doc`.
    pub fn replace(&self, doc: &Document) -> Result<()> {
        self.stage(doc)?.commit()
    }

    /// Write `doc` to a synced temp file beside the target without touching
    /// the target itself. Call [`StagedReplace::commit`] to publish it.
    pub fn stage(&self, doc: &Document) -> Result<StagedReplace> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;

        let bytes = serde_json::to_vec_pretty(doc)?;

        let mut file = tempfile::Builder::new()
            .prefix(&format!(".{}.", self.file_name()))
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|err| Error::io(dir, err))?;
        let temp_path = file.path().to_path_buf();

        // On any error below `file` is dropped, which unlinks the temp file.
        write_synced(&mut file, &bytes).map_err(|err| Error::io(&temp_path, err))?;

        debug!(temp = %temp_path.display(), bytes = bytes.len(), "document staged");
        Ok(StagedReplace {
            file,
            target: self.path.clone(),
        })
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }
}

/// A fully written temp file waiting to be renamed over its target.
///
/// Dropping it without calling [`commit`](Self::commit) removes the temp file.
#[derive(Debug)]
pub struct StagedReplace {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagedReplace {
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the staged file over the target.
    pub fn commit(self) -> Result<()> {
        let Self { file, target } = self;
        match file.persist(&target) {
            Ok(_) => {
                debug!(path = %target.display(), "document replaced");
                Ok(())
            }
            Err(err) => {
                discard(err.file);
                Err(Error::Persist {
                    path: target,
                    source: err.error,
                })
            }
        }
    }

    /// Give up on the staged write and remove the temp file.
    pub fn abort(self) {
        discard(self.file);
    }
}

fn write_synced(file: &mut NamedTempFile, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes)?;
    file.flush()?;
    file.as_file().sync_all()
}

/// Best-effort removal of a temp file; failures are logged and swallowed.
fn discard(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(err) = file.close() {
        warn!(path = %path.display(), error = %err, "failed to remove staged document file");
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
