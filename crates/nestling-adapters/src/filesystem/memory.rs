//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use nestling_core::{
    application::{ApplicationError, ports::Filesystem},
    error::NestlingResult,
};

/// In-memory filesystem for testing.
///
/// Clones share state, so a test can hand one clone to the pipeline and
/// inspect the tree through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn add_ancestors(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.directories.contains(parent),
            _ => true,
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, creating its parents (testing helper).
    pub fn seed(&self, path: impl AsRef<Path>, content: &str) -> &Self {
        let path = path.as_ref();
        if let Ok(mut inner) = self.inner.write() {
            if let Some(parent) = path.parent() {
                inner.add_ancestors(parent);
            }
            inner.files.insert(path.to_path_buf(), content.to_string());
        }
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    /// All files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Files under `root`, as slash-separated relative paths.
    pub fn files_under(&self, root: impl AsRef<Path>) -> Vec<String> {
        let root = root.as_ref();
        self.list_files()
            .into_iter()
            .filter_map(|p| {
                p.strip_prefix(root)
                    .ok()
                    .map(|r| r.to_string_lossy().replace('\\', "/"))
            })
            .collect()
    }

    fn read(&self) -> NestlingResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }

    fn write(&self) -> NestlingResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }
}

fn not_found(path: &Path) -> ApplicationError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: "No such file or directory".into(),
    }
}

fn rebase(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
    path.strip_prefix(from).ok().map(|rel| {
        if rel.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(rel)
        }
    })
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> NestlingResult<()> {
        self.write()?.add_ancestors(path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> NestlingResult<()> {
        let mut inner = self.write()?;

        if !inner.parent_exists(path) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "Parent directory does not exist".into(),
            }
            .into());
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> NestlingResult<String> {
        self.read()?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path).into())
    }

    fn copy(&self, from: &Path, to: &Path) -> NestlingResult<()> {
        let mut inner = self.write()?;

        if let Some(content) = inner.files.get(from).cloned() {
            if let Some(parent) = to.parent() {
                inner.add_ancestors(parent);
            }
            inner.files.insert(to.to_path_buf(), content);
            return Ok(());
        }
        if !inner.directories.contains(from) {
            return Err(not_found(from).into());
        }

        let dirs: Vec<PathBuf> = inner
            .directories
            .iter()
            .filter_map(|d| rebase(d, from, to))
            .collect();
        let files: Vec<(PathBuf, String)> = inner
            .files
            .iter()
            .filter_map(|(p, c)| rebase(p, from, to).map(|t| (t, c.clone())))
            .collect();

        inner.add_ancestors(to);
        for dir in dirs {
            inner.add_ancestors(&dir);
        }
        inner.files.extend(files);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> NestlingResult<()> {
        let mut inner = self.write()?;

        if !inner.parent_exists(to) {
            return Err(ApplicationError::FilesystemError {
                path: to.to_path_buf(),
                reason: "Parent directory does not exist".into(),
            }
            .into());
        }

        if let Some(content) = inner.files.remove(from) {
            inner.files.insert(to.to_path_buf(), content);
            return Ok(());
        }
        if !inner.directories.contains(from) {
            return Err(not_found(from).into());
        }

        let dirs: Vec<PathBuf> = inner
            .directories
            .iter()
            .filter(|d| d.starts_with(from))
            .cloned()
            .collect();
        let files: Vec<PathBuf> = inner
            .files
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();

        for dir in dirs {
            inner.directories.remove(&dir);
            if let Some(target) = rebase(&dir, from, to) {
                inner.directories.insert(target);
            }
        }
        for file in files {
            if let (Some(content), Some(target)) =
                (inner.files.remove(&file), rebase(&file, from, to))
            {
                inner.files.insert(target, content);
            }
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> NestlingResult<()> {
        self.write()?
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path).into())
    }

    fn remove_dir_all(&self, path: &Path) -> NestlingResult<()> {
        let mut inner = self.write()?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));

        Ok(())
    }

    fn list_dir(&self, path: &Path) -> NestlingResult<Vec<PathBuf>> {
        let inner = self.read()?;
        if !inner.directories.contains(path) {
            return Err(not_found(path).into());
        }

        let children: BTreeSet<PathBuf> = inner
            .directories
            .iter()
            .chain(inner.files.keys())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        Ok(children.into_iter().collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("/a/b.ts"), "x").is_err());
        fs.create_dir_all(Path::new("/a")).unwrap();
        fs.write_file(Path::new("/a/b.ts"), "x").unwrap();
        assert_eq!(fs.read_file("/a/b.ts").as_deref(), Some("x"));
    }

    #[test]
    fn rename_moves_whole_subtree() {
        let fs = MemoryFilesystem::new();
        fs.seed("/r/src/modules/user/dto/a.ts", "a");
        fs.create_dir_all(Path::new("/r/src/modules/pet")).unwrap();

        fs.rename(
            Path::new("/r/src/modules/user"),
            Path::new("/r/src/modules/pet/user"),
        )
        .unwrap();

        assert!(!fs.exists(Path::new("/r/src/modules/user")));
        assert_eq!(
            fs.read_file("/r/src/modules/pet/user/dto/a.ts").as_deref(),
            Some("a")
        );
    }

    #[test]
    fn copy_tree_merges_into_existing_directory() {
        let fs = MemoryFilesystem::new();
        fs.seed("/out/api/pet.service.ts", "new");
        fs.seed("/out/api/api.ts", "agg");
        fs.seed("/mod/services/petDb.service.ts", "base");

        fs.copy(Path::new("/out/api"), Path::new("/mod/services"))
            .unwrap();

        assert_eq!(
            fs.files_under("/mod/services"),
            vec!["api.ts", "pet.service.ts", "petDb.service.ts"]
        );
    }

    #[test]
    fn list_dir_returns_direct_children_only() {
        let fs = MemoryFilesystem::new();
        fs.seed("/d/a.ts", "");
        fs.seed("/d/sub/b.ts", "");

        assert_eq!(
            fs.list_dir(Path::new("/d")).unwrap(),
            vec![PathBuf::from("/d/a.ts"), PathBuf::from("/d/sub")]
        );
        assert!(fs.list_dir(Path::new("/missing")).is_err());
    }
}
