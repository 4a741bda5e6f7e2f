// Model loading: asset → contiguous buffer, with scoped release.

use std::io::{self, Read};

use log::{trace, warn};

use crate::asset::AssetReader;
use crate::{BridgeError, Result};

/// Upper bound on the up-front allocation; larger assets grow while reading.
const MAX_PREALLOC: u64 = 64 << 20;

/// Model definition bytes read from an asset.
///
/// Owned by the load call that created it and freed when that call returns,
/// whether the detector accepted the bytes or not.
pub(crate) struct ModelBuffer {
    bytes: Vec<u8>,
    path: String,
}

impl ModelBuffer {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for ModelBuffer {
    fn drop(&mut self) {
        trace!(
            "released {} byte model buffer for `{}`",
            self.bytes.len(),
            self.path
        );
    }
}

/// Read the whole asset at `path` into memory. The asset is closed before
/// this returns.
pub(crate) fn read_model(reader: &dyn AssetReader, path: &str) -> Result<ModelBuffer> {
    let mut asset = reader.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BridgeError::AssetNotFound(path.to_owned()),
        _ => BridgeError::AssetRead {
            path: path.to_owned(),
            source: e,
        },
    })?;

    let declared = asset.length();
    let mut bytes = Vec::with_capacity(declared.min(MAX_PREALLOC) as usize);
    asset
        .read_to_end(&mut bytes)
        .map_err(|source| BridgeError::AssetRead {
            path: path.to_owned(),
            source,
        })?;
    drop(asset);

    if bytes.len() as u64 != declared {
        warn!(
            "asset `{path}` declared {declared} bytes but yielded {}",
            bytes.len()
        );
    }
    Ok(ModelBuffer {
        bytes,
        path: path.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    use crate::asset::{Asset, MemoryAssetReader};

    /// Reports a length far beyond what it yields.
    struct Inflated(Cursor<Vec<u8>>);

    impl Read for Inflated {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Asset for Inflated {
        fn length(&self) -> u64 {
            u64::MAX
        }
    }

    struct InflatedReader;

    impl AssetReader for InflatedReader {
        fn open(&self, _path: &str) -> io::Result<Box<dyn Asset + '_>> {
            Ok(Box::new(Inflated(Cursor::new(vec![3u8; 16]))))
        }
    }

    #[test]
    fn reads_whole_asset() {
        let reader = MemoryAssetReader::new().with_asset("m.bin", vec![9u8; 1024]);
        let buffer = read_model(&reader, "m.bin").unwrap();
        assert_eq!(buffer.as_bytes().len(), 1024);
    }

    #[test]
    fn declared_length_is_not_trusted() {
        let buffer = read_model(&InflatedReader, "m.bin").unwrap();
        assert_eq!(buffer.as_bytes(), &[3u8; 16][..]);
    }

    #[test]
    fn missing_asset() {
        let reader = MemoryAssetReader::new();
        let err = read_model(&reader, "m.bin").err().unwrap();
        assert!(matches!(err, BridgeError::AssetNotFound(ref p) if p == "m.bin"));
    }
}
