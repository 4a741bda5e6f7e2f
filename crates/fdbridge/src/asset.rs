//! Asset access for the model loader.
//!
//! Mirrors a platform asset manager: open by path, ask the length, read,
//! close on drop.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// An opened asset. Closing happens on drop.
pub trait Asset: Read {
    /// Total size in bytes as reported when the asset was opened.
    fn length(&self) -> u64;
}

/// Resolves asset paths within some namespace.
pub trait AssetReader {
    /// Open `path`. A missing asset should report
    /// [`io::ErrorKind::NotFound`].
    fn open(&self, path: &str) -> io::Result<Box<dyn Asset + '_>>;
}

/// Serves assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssetReader {
    root: PathBuf,
}

impl DirAssetReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

struct FileAsset {
    file: File,
    length: u64,
}

impl Read for FileAsset {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Asset for FileAsset {
    fn length(&self) -> u64 {
        self.length
    }
}

impl AssetReader for DirAssetReader {
    fn open(&self, path: &str) -> io::Result<Box<dyn Asset + '_>> {
        // asset paths are relative and may not climb out of the root
        let rel = Path::new(path);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("asset path `{path}` is outside the asset root"),
            ));
        }
        let file = File::open(self.root.join(rel))?;
        let length = file.metadata()?.len();
        Ok(Box::new(FileAsset { file, length }))
    }
}

/// In-memory asset namespace.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetReader {
    assets: HashMap<String, Arc<[u8]>>,
}

impl MemoryAssetReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.assets.insert(path.into(), bytes.into());
    }

    pub fn with_asset(mut self, path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

struct MemoryAsset(Cursor<Arc<[u8]>>);

impl Read for MemoryAsset {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Asset for MemoryAsset {
    fn length(&self) -> u64 {
        self.0.get_ref().len() as u64
    }
}

impl AssetReader for MemoryAssetReader {
    fn open(&self, path: &str) -> io::Result<Box<dyn Asset + '_>> {
        let bytes = self.assets.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no asset named `{path}`"))
        })?;
        Ok(Box::new(MemoryAsset(Cursor::new(Arc::clone(bytes)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_reader_serves_bytes() {
        let reader = MemoryAssetReader::new().with_asset("model.onnx", vec![1u8, 2, 3]);
        let mut asset = reader.open("model.onnx").unwrap();
        assert_eq!(asset.length(), 3);
        let mut out = Vec::new();
        asset.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn memory_reader_missing_is_not_found() {
        let reader = MemoryAssetReader::new();
        let err = reader.open("nope").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn dir_reader_rejects_escaping_paths() {
        let reader = DirAssetReader::new("/tmp");
        for path in ["../etc/passwd", "/etc/passwd", "a/../../b"] {
            let err = reader.open(path).err().unwrap();
            assert_eq!(err.kind(), io::ErrorKind::NotFound, "{path}");
        }
    }
}
