use fdbridge_detect::DetectError;
use fdbridge_frame::FrameError;
use fdbridge_preprocess::PreprocessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("asset `{0}` not found")]
    AssetNotFound(String),

    #[error("failed to read asset `{path}`: {source}")]
    AssetRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to construct detector: {0}")]
    Construction(#[source] DetectError),

    #[error("unknown or released model handle {0:#x}")]
    UnknownHandle(u64),

    #[error("invalid frame: {0}")]
    InvalidFrame(#[source] PreprocessError),

    #[error("detection failed: {0}")]
    Detection(#[source] DetectError),

    #[error("failed to read config: {0}")]
    ConfigIo(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Coarse classification of [`BridgeError`] for callers on the far side of
/// the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No handle was produced; the model or its asset is unusable.
    Construction,
    /// The handle is unknown or already released.
    InvalidHandle,
    /// Frame bytes do not match the declared geometry.
    InvalidInput,
    /// The detector failed on an otherwise valid frame.
    Detection,
    Config,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::AssetNotFound(_)
            | BridgeError::AssetRead { .. }
            | BridgeError::Construction(_) => ErrorKind::Construction,
            BridgeError::UnknownHandle(_) => ErrorKind::InvalidHandle,
            BridgeError::InvalidFrame(_) => ErrorKind::InvalidInput,
            BridgeError::Detection(_) => ErrorKind::Detection,
            BridgeError::ConfigIo(_) | BridgeError::ConfigParse(_) => ErrorKind::Config,
        }
    }
}

impl From<FrameError> for BridgeError {
    fn from(e: FrameError) -> Self {
        BridgeError::InvalidFrame(PreprocessError::Frame(e))
    }
}

impl From<PreprocessError> for BridgeError {
    fn from(e: PreprocessError) -> Self {
        BridgeError::InvalidFrame(e)
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
