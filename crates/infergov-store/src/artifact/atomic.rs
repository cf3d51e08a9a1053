//! Staged temp→rename writes
//!
//! A staged file is fully written and synced before it can be published.
//! Dropping it unpublished removes the temp file, so a failed or losing
//! writer leaves nothing behind.

use crate::errors::{io_error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct StagedFile {
    temp_path: PathBuf,
    target_path: PathBuf,
    published: bool,
}

impl StagedFile {
    /// Write `content` next to `target_path` under a unique temp name
    pub fn stage(target_path: &Path, content: &[u8]) -> Result<Self> {
        let parent = target_path
            .parent()
            .ok_or_else(|| io_error("stage_artifact", std::io::ErrorKind::InvalidInput.into()))?;
        fs::create_dir_all(parent).map_err(|e| io_error("create_artifact_dir", e))?;

        let file_name = target_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("artifact");
        let temp_path = parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        // constructed first so Drop cleans up a partial write
        let staged = Self {
            temp_path,
            target_path: target_path.to_path_buf(),
            published: false,
        };
        let mut file = File::create(&staged.temp_path).map_err(|e| io_error("write_artifact_temp", e))?;
        file.write_all(content)
            .map_err(|e| io_error("write_artifact_temp", e))?;
        file.sync_all()
            .map_err(|e| io_error("sync_artifact_temp", e))?;
        Ok(staged)
    }

    /// Rename into place
    pub fn publish(&mut self) -> Result<()> {
        fs::rename(&self.temp_path, &self.target_path)
            .map_err(|e| io_error("rename_artifact_temp", e))?;
        self.published = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.published {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn test_publish_moves_into_place() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("a.json");

        let mut staged = StagedFile::stage(&target, b"{}").unwrap();
        assert!(!target.exists());
        staged.publish().unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"{}");
        assert_eq!(temp_files(&dir.path().join("nested")), 0);
    }

    #[test]
    fn test_unpublished_stage_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a.json");

        let staged = StagedFile::stage(&target, b"{}").unwrap();
        assert_eq!(temp_files(dir.path()), 1);
        drop(staged);

        assert_eq!(temp_files(dir.path()), 0);
        assert!(!target.exists());
    }
}
