//! Read-only file access for `include`/`embed`.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Source of files for composition directives.
pub trait FileSystem: Send + Sync {
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Files under a root directory.
///
/// Names are relative to the root. Absolute names and names that climb out
/// of the root with `..` are rejected.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirFs { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let mut depth = 0usize;
        for component in relative.components() {
            match component {
                Component::Normal(_) => depth += 1,
                Component::CurDir => {}
                Component::ParentDir if depth > 0 => depth -= 1,
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        format!("path escapes filesystem root: {}", name),
                    ));
                }
            }
        }
        Ok(self.root.join(relative))
    }
}

impl FileSystem for DirFs {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(name)?)
    }
}

/// In-memory files, keyed by name.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, name: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize(&name.into()), contents.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_file(self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents);
        self
    }
}

/// Drop leading `/` and `.` components and resolve `..`.
fn normalize(name: &str) -> String {
    let mut result = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(s) => result.push(s),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    result.to_string_lossy().into_owned()
}

impl FileSystem for MemoryFs {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files
            .read()
            .map_err(|_| io::Error::other("lock poisoned"))?
            .get(&normalize(name))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("file not found: {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fs_reads_inserted_files() {
        let fs = MemoryFs::new().with_file("base.yaml", "env: prod\n");
        assert_eq!(fs.read("./base.yaml").unwrap(), b"env: prod\n");
        assert_eq!(fs.read("conf/../base.yaml").unwrap(), b"env: prod\n");
        assert_eq!(fs.read("other.yaml").unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn dir_fs_stays_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/a.yaml"), "a: 1\n").unwrap();

        let fs = DirFs::new(dir.path());
        assert_eq!(fs.read("sub/a.yaml").unwrap(), b"a: 1\n");
        assert_eq!(fs.read("sub/../sub/a.yaml").unwrap(), b"a: 1\n");
        assert_eq!(
            fs.read("../escape.yaml").unwrap_err().kind(),
            io::ErrorKind::PermissionDenied
        );
        assert!(fs.read("/etc/hosts").is_err());
    }
}
