// fdbridge/src/lib.rs
// ============================================================
// fdbridge – camera frame in, flat detections out
// ------------------------------------------------------------
// Public API:
//   * FaceBridge::load_detector(assets, path) → ModelHandle
//   * FaceBridge::detect(&handle, nv21, thr, nms, w, h, rot) → Vec<f32>
//   * FaceBridge::release(handle)
// ============================================================

//! Face detection bridge for callers that share no memory with us.
//!
//! A caller hands over an NV21 camera frame, its size and the clockwise
//! rotation to the user's orientation. The bridge converts it to BGRA,
//! rotates it upright, runs the detector behind a [`ModelHandle`], and
//! returns detections as a flat `Vec<f32>` of `(x1, y1, x2, y2, score)`
//! tuples in upright-frame pixels.
//!
//! ```no_run
//! use fdbridge::{BridgeConfig, DirAssetReader, FaceBridge};
//!
//! let cfg = BridgeConfig::default();
//! let mut bridge = FaceBridge::new(cfg.factory());
//! let handle = bridge
//!     .load_detector(&DirAssetReader::new("assets"), &cfg.model_path)
//!     .unwrap();
//!
//! let nv21 = vec![128u8; 640 * 480 * 3 / 2];
//! let faces = bridge
//!     .detect(&handle, &nv21, cfg.heatmap_threshold, cfg.nms_threshold, 640, 480, 90)
//!     .unwrap();
//! for face in faces.chunks_exact(fdbridge::FACE_ATTRIBUTES) {
//!     println!("{face:?}");
//! }
//! bridge.release(handle).unwrap();
//! ```

mod asset;
mod bridge;
mod config;
mod encode;
mod error;
mod handle;
mod loader;

pub use asset::{Asset, AssetReader, DirAssetReader, MemoryAssetReader};
pub use bridge::FaceBridge;
pub use config::BridgeConfig;
pub use encode::{decode_detections, encode_detections, FACE_ATTRIBUTES};
pub use error::{BridgeError, ErrorKind, Result};
pub use handle::{HandleTable, ModelHandle};

pub use fdbridge_detect::{Detection, DetectError, Detector, DetectorFactory};
pub use fdbridge_frame::{Frame, PixelEncoding, Rotation};

use fdbridge_frame::Nv21Frame;
use fdbridge_preprocess::{nv21_to_bgra, rotate};

/// First two pipeline stages: NV21 → BGRA, then rotate upright.
///
/// The caller's buffer is only borrowed. Dimensions must be even and
/// non-zero and the buffer at least `width*height*3/2` bytes long.
pub fn normalize_frame(frame: &[u8], width: u32, height: u32, rotation: i32) -> Result<Frame> {
    let src = Nv21Frame::new(frame, width, height)?;
    let mut bgra = nv21_to_bgra(&src)?;
    rotate(&mut bgra, Rotation::from(rotation))?;
    Ok(bgra)
}
