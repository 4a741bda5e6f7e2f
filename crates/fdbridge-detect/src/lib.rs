// fdbridge-detect/src/lib.rs
// ============================================================
// fdbridge-detect  –  Face-detection stage
// Wraps an opaque face model behind a small trait so the bridge
// never sees model internals.
// ------------------------------------------------------------
// Pipeline: Frame (BGRA, upright) → Vec<Detection>
// ------------------------------------------------------------
// Public API
//   * DetectorFactory::load(bytes) – build a detector from a model blob
//   * Detector::detect(frame, heatmap_thr, nms_thr)
//     where Detection { x1, y1, x2, y2, score }
// ------------------------------------------------------------
//   Build notes
//     * Reference backend = CenterFace on Tract (pure Rust).
// ============================================================

//! fdbridge – detection layer
//!
//! [`DetectorFactory`] turns model bytes into a [`Detector`]; the bridge
//! keeps one detector per handle. Construction failures and inference
//! failures are separate [`DetectError`] kinds so callers can tell a bad
//! model from a bad frame.
//!
//! Detectors are stateful (`&mut self`) and not reentrant: callers that
//! share one across threads must serialize access themselves.

use fdbridge_frame::Frame;
use fdbridge_preprocess::PreprocessError;
use thiserror::Error;

mod centerface;
mod nms;

pub use centerface::{CenterFace, CenterFaceFactory};
pub use nms::{iou, non_max_suppression};
/// Error type carried by [`DetectError::ModelLoad`] and [`DetectError::Inference`].
pub use tract_onnx::prelude::TractError;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("model buffer is empty")]
    EmptyModel,
    #[error("model input {width}x{height} must be a non-zero multiple of 32")]
    InputSize { width: u32, height: u32 },
    #[error("model rejected: {0}")]
    ModelLoad(#[source] TractError),
    #[error("inference failed: {0}")]
    Inference(#[source] TractError),
    #[error("output `{name}` has unexpected shape {shape:?}")]
    InvalidOutputShape { name: &'static str, shape: Vec<usize> },
    #[error("model produced {0} outputs, expected at least 3")]
    MissingOutputs(usize),
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
}

impl DetectError {
    /// True for failures raised while building a detector, as opposed to
    /// while running one.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            DetectError::EmptyModel | DetectError::InputSize { .. } | DetectError::ModelLoad(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DetectError>;

/// One face: corner box in pixels of the upright frame, plus confidence.
///
/// `x1 <= x2` and `y1 <= y2` are expected but not checked; a backend may
/// break them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self { x1, y1, x2, y2, score }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// A loaded face model.
pub trait Detector: Send {
    /// Find faces in an upright BGRA frame.
    ///
    /// Candidates scoring at or below `heatmap_threshold` are dropped before
    /// suppression; `nms_threshold` is the IoU above which the weaker of two
    /// overlapping boxes is removed. Neither threshold is validated.
    fn detect(
        &mut self,
        frame: &Frame,
        heatmap_threshold: f32,
        nms_threshold: f32,
    ) -> Result<Vec<Detection>>;
}

/// Builds detectors from a model definition blob.
pub trait DetectorFactory {
    type Detector: Detector;

    /// Construct a detector. An empty or malformed blob is an error, never
    /// a half-built detector.
    fn load(&self, model: &[u8]) -> Result<Self::Detector>;
}
