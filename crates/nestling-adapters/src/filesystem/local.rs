//! Local filesystem adapter using std::fs, with walkdir for tree copies.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use nestling_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{NestlingError, NestlingResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> NestlingResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> NestlingResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_to_string(&self, path: &Path) -> NestlingResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn copy(&self, from: &Path, to: &Path) -> NestlingResult<()> {
        if !from.is_dir() {
            if let Some(parent) = to.parent() {
                self.create_dir_all(parent)?;
            }
            return std::fs::copy(from, to)
                .map(|_| ())
                .map_err(|e| map_io_error(from, e, "copy file"));
        }

        for entry in WalkDir::new(from).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(from).to_path_buf();
                map_io_error(&path, io::Error::other(e), "walk directory")
            })?;
            // Entries from WalkDir::new(from) always live under `from`.
            let Ok(relative) = entry.path().strip_prefix(from) else {
                continue;
            };
            let target = to.join(relative);
            if entry.file_type().is_dir() {
                self.create_dir_all(&target)?;
            } else {
                std::fs::copy(entry.path(), &target)
                    .map_err(|e| map_io_error(entry.path(), e, "copy file"))?;
            }
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> NestlingResult<()> {
        std::fs::rename(from, to).map_err(|e| map_io_error(from, e, "rename"))
    }

    fn remove_file(&self, path: &Path) -> NestlingResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn remove_dir_all(&self, path: &Path) -> NestlingResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn list_dir(&self, path: &Path) -> NestlingResult<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)
            .map_err(|e| map_io_error(path, e, "list directory"))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| map_io_error(path, e, "list directory"))?;
        entries.sort();
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> NestlingError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copy_tree_preserves_structure() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("out/api");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("pet.service.ts"), "pet").unwrap();
        std::fs::write(src.join("nested/x.ts"), "x").unwrap();

        let fs = LocalFilesystem::new();
        let dst = tmp.path().join("module/services");
        fs.copy(&src, &dst).unwrap();

        assert_eq!(
            std::fs::read_to_string(dst.join("pet.service.ts")).unwrap(),
            "pet"
        );
        assert!(dst.join("nested/x.ts").is_file());
    }

    #[test]
    fn copy_file_creates_parent_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.ts");
        let dst = tmp.path().join("deep/dir/a.ts");
        std::fs::write(&src, "new").unwrap();

        let fs = LocalFilesystem::new();
        fs.copy(&src, &dst).unwrap();
        std::fs::write(&src, "newer").unwrap();
        fs.copy(&src, &dst).unwrap();

        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "newer");
    }

    #[test]
    fn list_dir_is_sorted() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.ts", "a.ts", "c.ts"] {
            std::fs::write(tmp.path().join(name), "").unwrap();
        }
        let names: Vec<_> = LocalFilesystem::new()
            .list_dir(tmp.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.ts", "b.ts", "c.ts"]);
    }

    #[test]
    fn io_errors_carry_the_path() {
        let err = LocalFilesystem::new()
            .remove_file(Path::new("/definitely/not/here.ts"))
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.ts"));
    }
}
