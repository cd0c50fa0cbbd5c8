use std::path::{Component, Path, PathBuf};

use kiln_core::Result;
use rustc_hash::FxHashMap;

/// 场景源 Trait
/// Supplies scene file bytes and resolves nested file references.
pub trait SceneSource {
    /// Reads the whole file at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Resolves `relative` against the directory of `including_file`.
    fn resolve(&self, including_file: &Path, relative: &str) -> PathBuf {
        including_file
            .parent()
            .unwrap_or(Path::new(""))
            .join(relative)
    }
}

impl<S: SceneSource + ?Sized> SceneSource for &S {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        (**self).read(path)
    }

    fn resolve(&self, including_file: &Path, relative: &str) -> PathBuf {
        (**self).resolve(including_file, relative)
    }
}

/// 本地文件读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl SceneSource for FileSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }
}

/// In-memory file table, keyed by lexically normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: FxHashMap<PathBuf, Vec<u8>>,
}

/// Folds `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root stays at the root.
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.files.insert(normalize(path.as_ref()), contents.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }
}

impl SceneSource for MemorySource {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{} not found", path.display())).into()
        })
    }

    fn resolve(&self, including_file: &Path, relative: &str) -> PathBuf {
        normalize(&including_file.parent().unwrap_or(Path::new("")).join(relative))
    }
}
