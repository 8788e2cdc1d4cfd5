//! Filesystem collaborator: discovery of design files and placement of
//! results into category folders.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, PlaceError};

/// The filesystem operations the pipeline consumes. Tests substitute
/// in-memory or failure-injecting implementations.
pub trait FileRepository {
    /// List design files under `dir` in a deterministic (lexicographic)
    /// order. `exclude` skips a subtree, so a destination folder nested
    /// inside the source is never re-discovered on later runs.
    fn list_design_files(
        &self,
        dir: &Path,
        exclude: Option<&Path>,
    ) -> Result<Vec<PathBuf>, ConfigError>;

    /// Idempotent directory creation.
    fn ensure_dir(&self, dir: &Path) -> Result<(), PlaceError>;

    /// Copy `source` into `dest_dir`, keeping the file name. A failed
    /// copy must not leave a partial destination file behind.
    fn copy_into(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf, PlaceError>;

    fn exists(&self, path: &Path) -> bool;
}

/// Production repository over `std::fs`.
#[derive(Debug, Default, Clone)]
pub struct FsRepository;

impl FsRepository {
    pub fn new() -> Self {
        Self
    }

    fn walk(
        &self,
        dir: &Path,
        exclude: Option<&Path>,
        found: &mut Vec<PathBuf>,
    ) -> Result<(), ConfigError> {
        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::SourceUnreadable {
            path: dir.to_path_buf(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::SourceUnreadable {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if let Some(skip) = exclude
                && path == skip
            {
                continue;
            }
            if path.is_dir() {
                self.walk(&path, exclude, found)?;
            } else if is_design_file(&path) {
                found.push(path);
            }
        }
        Ok(())
    }
}

/// `.pes` in any capitalization.
fn is_design_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pes"))
}

impl FileRepository for FsRepository {
    fn list_design_files(
        &self,
        dir: &Path,
        exclude: Option<&Path>,
    ) -> Result<Vec<PathBuf>, ConfigError> {
        if !dir.exists() {
            return Err(ConfigError::SourceMissing(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(ConfigError::SourceNotADirectory(dir.to_path_buf()));
        }

        let mut found = Vec::new();
        self.walk(dir, exclude, &mut found)?;
        // Stable ordering is what makes --start-after reproducible.
        found.sort();
        tracing::info!(count = found.len(), dir = %dir.display(), "design files discovered");
        Ok(found)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), PlaceError> {
        std::fs::create_dir_all(dir).map_err(|e| PlaceError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })
    }

    fn copy_into(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf, PlaceError> {
        let file_name = source.file_name().ok_or_else(|| PlaceError::Copy {
            path: source.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let dest = dest_dir.join(file_name);

        if let Err(e) = std::fs::copy(source, &dest) {
            // Copy is all-or-nothing: never leave a half-written file.
            let _ = std::fs::remove_file(&dest);
            return Err(PlaceError::Copy {
                path: source.to_path_buf(),
                source: e,
            });
        }
        Ok(dest)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
