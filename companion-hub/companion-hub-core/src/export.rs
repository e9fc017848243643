//! Plain-file exports into a user-facing directory (normally Downloads).

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ExportDir {
    dir: PathBuf,
}

impl ExportDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The current user's downloads directory, or `~/Downloads` when the
    /// platform does not report one.
    pub fn downloads() -> Option<Self> {
        dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `content` verbatim to `file_name` inside the export directory,
    /// creating the directory first if needed.
    ///
    /// `file_name` is joined as given: absolute paths and `..` components are
    /// not rejected.
    pub fn save(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|err| Error::io(&self.dir, err))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, content).map_err(|err| Error::io(&path, err))?;
        info!(path = %path.display(), bytes = content.len(), "file exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_creates_directory_and_writes_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let exports = ExportDir::new(temp_dir.path().join("Downloads"));
        let content = "[Me:] hi\n[Aiko:] hello ☂\n";

        let path = exports.save("memory.txt", content).unwrap();

        assert_eq!(path, temp_dir.path().join("Downloads").join("memory.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let exports = ExportDir::new(temp_dir.path());
        exports.save("note.txt", "first version, longer").unwrap();
        let path = exports.save("note.txt", "second").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "second");
    }

    #[test]
    fn save_into_missing_subdirectory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let exports = ExportDir::new(temp_dir.path());
        let err = exports.save("missing/note.txt", "x").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
