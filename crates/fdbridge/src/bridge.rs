use std::time::Instant;

use fdbridge_detect::{DetectError, Detector, DetectorFactory};
use log::{debug, info, warn};

use crate::asset::AssetReader;
use crate::encode::encode_detections;
use crate::handle::{HandleTable, ModelHandle};
use crate::{loader, normalize_frame, BridgeError, Result};

/// Owns every loaded detector and runs the frame pipeline against them.
///
/// All mutating calls take `&mut self` and no lock is held internally.
/// Callers that detect from several threads wrap the bridge in a `Mutex`,
/// which also serializes calls per handle.
pub struct FaceBridge<F: DetectorFactory> {
    factory: F,
    detectors: HandleTable<F::Detector>,
}

impl<F: DetectorFactory> FaceBridge<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            detectors: HandleTable::new(),
        }
    }

    /// Read `model_path` from `assets`, build a detector and register it.
    ///
    /// The model bytes are released before this returns on every path.
    pub fn load_detector(
        &mut self,
        assets: &dyn AssetReader,
        model_path: &str,
    ) -> Result<ModelHandle> {
        let buffer = loader::read_model(assets, model_path).map_err(|e| {
            warn!("cannot load model `{model_path}`: {e}");
            e
        })?;
        self.load_detector_from_bytes(buffer.as_bytes())
    }

    /// Build a detector from a model blob already in memory.
    ///
    /// Nothing is registered on failure.
    pub fn load_detector_from_bytes(&mut self, model: &[u8]) -> Result<ModelHandle> {
        let built = if model.is_empty() {
            Err(DetectError::EmptyModel)
        } else {
            self.factory.load(model)
        };
        let detector = built.map_err(|e| {
            warn!("detector construction failed: {e}");
            BridgeError::Construction(e)
        })?;

        let handle = self.detectors.insert(detector);
        info!(
            "loaded detector {:#x} from {} byte model ({} live)",
            handle.as_raw(),
            model.len(),
            self.detectors.len()
        );
        Ok(handle)
    }

    /// Convert, orient and run detection on one NV21 frame.
    ///
    /// `frame` must hold `width*height*3/2` bytes; `rotation` is the
    /// clockwise angle to the user's orientation, and anything other than
    /// 0/90/180/270 is treated as 0. Returns `5 * N` floats laid out as
    /// `x1, y1, x2, y2, score` per face in the rotated frame.
    #[allow(clippy::too_many_arguments)]
    pub fn detect(
        &mut self,
        handle: &ModelHandle,
        frame: &[u8],
        heatmap_threshold: f32,
        nms_threshold: f32,
        width: u32,
        height: u32,
        rotation: i32,
    ) -> Result<Vec<f32>> {
        let start = Instant::now();
        let detector = self
            .detectors
            .get_mut(handle)
            .ok_or(BridgeError::UnknownHandle(handle.as_raw()))?;

        let upright = normalize_frame(frame, width, height, rotation)?;
        let faces = detector
            .detect(&upright, heatmap_threshold, nms_threshold)
            .map_err(BridgeError::Detection)?;
        let encoded = encode_detections(&faces);

        let elapsed = start.elapsed();
        debug!(
            "detect {:#x}: {} faces in {:.1} ms ({:.1} fps)",
            handle.as_raw(),
            faces.len(),
            elapsed.as_secs_f64() * 1e3,
            1.0 / elapsed.as_secs_f64().max(f64::EPSILON)
        );
        Ok(encoded)
    }

    /// Destroy a detector. The handle, and any raw copy of it, stops
    /// resolving.
    pub fn release(&mut self, handle: ModelHandle) -> Result<()> {
        let raw = handle.as_raw();
        self.detectors
            .remove(&handle)
            .ok_or(BridgeError::UnknownHandle(raw))?;
        info!("released detector {raw:#x} ({} live)", self.detectors.len());
        Ok(())
    }

    pub fn contains(&self, handle: &ModelHandle) -> bool {
        self.detectors.contains(handle)
    }

    /// Number of live detectors.
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}
