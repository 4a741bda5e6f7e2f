// ------------------------------------------------------------
// helpers: IoU • NMS
// ------------------------------------------------------------
use std::cmp::Ordering;

use crate::Detection;

/// Intersection over union of two corner boxes.
pub fn iou(a: &Detection, b: &Detection) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);
    let iw = (ix2 - ix1).max(0.0);
    let ih = (iy2 - iy1).max(0.0);
    let inter = iw * ih;
    inter / (a.area() + b.area() - inter + 1e-6)
}

/// Greedy suppression: highest score first, drop anything overlapping a
/// kept box by more than `iou_thr`. Output is score-descending.
pub fn non_max_suppression(dets: Vec<Detection>, iou_thr: f32) -> Vec<Detection> {
    let mut dets = dets;
    dets.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut keep: Vec<Detection> = Vec::with_capacity(dets.len());

    'outer: for d in dets {
        for k in &keep {
            if iou(&d, k) > iou_thr {
                continue 'outer;
            }
        }
        keep.push(d);
    }
    keep
}
