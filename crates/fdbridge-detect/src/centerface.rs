//! CenterFace on Tract.
//!
//! The network maps a `1×3×H×W` RGB tensor (0–255, no mean) to three
//! stride-4 maps: a face heatmap, log box sizes, and sub-cell centre
//! offsets. A fourth landmark output may be present and is ignored.

use std::io::Cursor;

use fdbridge_frame::Frame;
use fdbridge_preprocess::Preprocessor;
use log::debug;
use tract_onnx::prelude::*;
use tract_onnx::prelude::tract_ndarray::{Array4, ArrayView4, Ix4};

use crate::{non_max_suppression, DetectError, Detection, Detector, DetectorFactory, Result};

const STRIDE: f32 = 4.0;
const INPUT_ALIGN: u32 = 32;

/// Builds [`CenterFace`] detectors with a fixed model input size.
#[derive(Debug, Clone)]
pub struct CenterFaceFactory {
    input_width: u32,
    input_height: u32,
}

impl CenterFaceFactory {
    pub fn new(input_width: u32, input_height: u32) -> Self {
        Self {
            input_width,
            input_height,
        }
    }
}

impl Default for CenterFaceFactory {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl DetectorFactory for CenterFaceFactory {
    type Detector = CenterFace;

    fn load(&self, model: &[u8]) -> Result<CenterFace> {
        CenterFace::from_bytes(model, self.input_width, self.input_height)
    }
}

/// Tract-powered CenterFace detector.
pub struct CenterFace {
    model: RunnableModel<TypedFact, Box<dyn TypedOp>, TypedModel>,
    preprocessor: Preprocessor,
}

impl CenterFace {
    /// Parse and optimise an ONNX model held in memory.
    ///
    /// Frames of any size are resized to `input_width × input_height`
    /// before inference; both must be multiples of 32.
    pub fn from_bytes(model: &[u8], input_width: u32, input_height: u32) -> Result<Self> {
        if model.is_empty() {
            return Err(DetectError::EmptyModel);
        }
        if input_width == 0
            || input_height == 0
            || input_width % INPUT_ALIGN != 0
            || input_height % INPUT_ALIGN != 0
        {
            return Err(DetectError::InputSize {
                width: input_width,
                height: input_height,
            });
        }

        let (w, h) = (input_width as usize, input_height as usize);
        let model = tract_onnx::onnx()
            .model_for_read(&mut Cursor::new(model))
            .and_then(|m| {
                m.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec![1, 3, h, w]))
            })
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(DetectError::ModelLoad)?;

        Ok(Self {
            model,
            preprocessor: Preprocessor::new(input_width, input_height).with_scale(1.0),
        })
    }
}

impl Detector for CenterFace {
    fn detect(
        &mut self,
        frame: &Frame,
        heatmap_threshold: f32,
        nms_threshold: f32,
    ) -> Result<Vec<Detection>> {
        // 1) BGRA frame → (H, W, 3) RGB, resized to the model input
        let input = self.preprocessor.run(frame)?;
        let (h, w) = (input.shape()[0], input.shape()[1]);

        // 2) HWC → NCHW tensor
        let arr4 = Array4::<f32>::from_shape_fn((1, 3, h, w), |(_, c, y, x)| input[(y, x, c)]);
        let tensor: Tensor = arr4.into_tensor();

        // 3) Run the model
        let outputs = self
            .model
            .run(tvec![tensor.into()])
            .map_err(DetectError::Inference)?;
        if outputs.len() < 3 {
            return Err(DetectError::MissingOutputs(outputs.len()));
        }
        let heatmap = output_view(&outputs[0], "heatmap")?;
        let scale = output_view(&outputs[1], "scale")?;
        let offset = output_view(&outputs[2], "offset")?;

        // 4) Decode + NMS in model space, then map back onto the frame
        let candidates = decode(heatmap, scale, offset, heatmap_threshold, (w, h))?;
        let n_candidates = candidates.len();
        let kept = non_max_suppression(candidates, nms_threshold);
        let faces = to_frame(kept, (w, h), frame);

        debug!(
            "centerface: {} candidates above {heatmap_threshold}, {} after nms",
            n_candidates,
            faces.len()
        );
        Ok(faces)
    }
}

/// Rescale boxes from model-input pixels onto `frame` and clamp them to it.
fn to_frame(dets: Vec<Detection>, input: (usize, usize), frame: &Frame) -> Vec<Detection> {
    let (fw, fh) = (frame.width() as f32, frame.height() as f32);
    let sx = fw / input.0 as f32;
    let sy = fh / input.1 as f32;
    dets.into_iter()
        .map(|d| {
            Detection::new(
                (d.x1 * sx).clamp(0.0, fw),
                (d.y1 * sy).clamp(0.0, fh),
                (d.x2 * sx).clamp(0.0, fw),
                (d.y2 * sy).clamp(0.0, fh),
                d.score,
            )
        })
        .collect()
}

fn output_view<'a>(value: &'a TValue, name: &'static str) -> Result<ArrayView4<'a, f32>> {
    let view = value.to_array_view::<f32>().map_err(DetectError::Inference)?;
    let shape = view.shape().to_vec();
    view.into_dimensionality::<Ix4>()
        .map_err(|_| DetectError::InvalidOutputShape { name, shape })
}

/// Turn the three stride-4 maps into candidate boxes in model-input pixels.
///
/// `heatmap` is `[1, 1, gh, gw]`; `scale` and `offset` are `[1, 2, gh, gw]`
/// with channel 0 along y and channel 1 along x.
fn decode<'a>(
    heatmap: ArrayView4<'a, f32>,
    scale: ArrayView4<'a, f32>,
    offset: ArrayView4<'a, f32>,
    threshold: f32,
    input: (usize, usize),
) -> Result<Vec<Detection>> {
    let (_, hc, gh, gw) = heatmap.dim();
    if hc < 1 {
        return Err(DetectError::InvalidOutputShape {
            name: "heatmap",
            shape: heatmap.shape().to_vec(),
        });
    }
    for (name, map) in [("scale", &scale), ("offset", &offset)] {
        let (_, c, mh, mw) = map.dim();
        if c < 2 || mh != gh || mw != gw {
            return Err(DetectError::InvalidOutputShape {
                name,
                shape: map.shape().to_vec(),
            });
        }
    }

    let (iw, ih) = (input.0 as f32, input.1 as f32);
    let mut dets = Vec::new();
    for r in 0..gh {
        for c in 0..gw {
            let score = heatmap[[0, 0, r, c]];
            if score.is_nan() || score <= threshold {
                continue;
            }
            let box_h = scale[[0, 0, r, c]].exp() * STRIDE;
            let box_w = scale[[0, 1, r, c]].exp() * STRIDE;
            let cy = (r as f32 + offset[[0, 0, r, c]] + 0.5) * STRIDE;
            let cx = (c as f32 + offset[[0, 1, r, c]] + 0.5) * STRIDE;

            let x1 = (cx - box_w / 2.0).max(0.0).min(iw);
            let y1 = (cy - box_h / 2.0).max(0.0).min(ih);
            dets.push(Detection::new(
                x1,
                y1,
                (x1 + box_w).min(iw),
                (y1 + box_h).min(ih),
                score,
            ));
        }
    }
    Ok(dets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps(gh: usize, gw: usize) -> (Array4<f32>, Array4<f32>, Array4<f32>) {
        (
            Array4::zeros((1, 1, gh, gw)),
            Array4::zeros((1, 2, gh, gw)),
            Array4::zeros((1, 2, gh, gw)),
        )
    }

    #[test]
    fn single_hot_cell() {
        let (mut heat, scale, offset) = maps(4, 4);
        heat[[0, 0, 1, 2]] = 0.9;
        heat[[0, 0, 3, 3]] = 0.2;
        let dets = decode(heat.view(), scale.view(), offset.view(), 0.5, (16, 16)).unwrap();
        assert_eq!(dets, vec![Detection::new(8.0, 4.0, 12.0, 8.0, 0.9)]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let (mut heat, scale, offset) = maps(2, 2);
        heat[[0, 0, 0, 0]] = 0.5;
        let dets = decode(heat.view(), scale.view(), offset.view(), 0.5, (8, 8)).unwrap();
        assert!(dets.is_empty());
    }

    #[test]
    fn offsets_shift_the_centre() {
        let (mut heat, scale, mut offset) = maps(4, 4);
        heat[[0, 0, 1, 1]] = 0.8;
        offset[[0, 0, 1, 1]] = 0.25; // y
        offset[[0, 1, 1, 1]] = 0.5; // x
        let dets = decode(heat.view(), scale.view(), offset.view(), 0.5, (16, 16)).unwrap();
        // centre (8, 7), 4x4 box
        assert_eq!(dets, vec![Detection::new(6.0, 5.0, 10.0, 9.0, 0.8)]);
    }

    #[test]
    fn boxes_are_clamped_to_input() {
        let (mut heat, mut scale, offset) = maps(4, 4);
        heat[[0, 0, 0, 0]] = 0.95;
        scale[[0, 0, 0, 0]] = 4f32.ln(); // 16 px tall
        scale[[0, 1, 0, 0]] = 8f32.ln(); // 32 px wide
        let dets = decode(heat.view(), scale.view(), offset.view(), 0.5, (16, 16)).unwrap();
        let d = dets[0];
        assert_eq!((d.x1, d.y1), (0.0, 0.0));
        assert!((d.x2 - 16.0).abs() < 1e-4);
        assert!((d.y2 - 16.0).abs() < 1e-4);
    }

    #[test]
    fn mismatched_maps_are_rejected() {
        let heat = Array4::<f32>::zeros((1, 1, 4, 4));
        let scale = Array4::<f32>::zeros((1, 2, 2, 2));
        let offset = Array4::<f32>::zeros((1, 2, 4, 4));
        let err = decode(heat.view(), scale.view(), offset.view(), 0.5, (16, 16)).unwrap_err();
        assert!(matches!(
            err,
            DetectError::InvalidOutputShape { name: "scale", .. }
        ));
    }

    fn blank(width: u32, height: u32) -> Frame {
        Frame::bgra(vec![0; (width * height * 4) as usize], width, height).unwrap()
    }

    #[test]
    fn boxes_rescale_per_axis_onto_the_frame() {
        // portrait upright frame behind a landscape model input
        let frame = blank(480, 640);
        let dets = vec![Detection::new(64.0, 48.0, 128.0, 96.0, 0.9)];
        let out = to_frame(dets, (640, 480), &frame);
        let d = out[0];
        assert!((d.x1 - 48.0).abs() < 1e-4, "{d:?}");
        assert!((d.y1 - 64.0).abs() < 1e-4, "{d:?}");
        assert!((d.x2 - 96.0).abs() < 1e-4, "{d:?}");
        assert!((d.y2 - 128.0).abs() < 1e-4, "{d:?}");
        assert_eq!(d.score, 0.9);
    }

    #[test]
    fn rescaled_boxes_stay_inside_the_frame() {
        let frame = blank(320, 240);
        let dets = vec![
            Detection::new(600.0, 400.0, 700.0, 520.0, 0.8),
            Detection::new(0.0, 0.0, 640.0, 480.0, 0.7),
        ];
        let out = to_frame(dets, (640, 480), &frame);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Detection::new(300.0, 200.0, 320.0, 240.0, 0.8));
        assert_eq!(out[1], Detection::new(0.0, 0.0, 320.0, 240.0, 0.7));
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = CenterFaceFactory::default().load(&[]).err().unwrap();
        assert!(matches!(err, DetectError::EmptyModel));
        assert!(err.is_construction());
    }

    #[test]
    fn unaligned_input_is_rejected() {
        let err = CenterFace::from_bytes(b"x", 100, 96).err().unwrap();
        assert!(matches!(err, DetectError::InputSize { width: 100, .. }));
    }

    #[test]
    fn malformed_model_is_a_construction_error() {
        let err = CenterFaceFactory::default()
            .load(b"definitely not an onnx graph")
            .err()
            .unwrap();
        assert!(matches!(err, DetectError::ModelLoad(_)));
        assert!(err.is_construction());
    }
}
