//! Flat detection layout shared with the caller.
//!
//! Each face is five consecutive `f32`s: `x1, y1, x2, y2, score`.

use fdbridge_detect::Detection;

/// Floats per detection in the flat layout.
pub const FACE_ATTRIBUTES: usize = 5;

/// Pack detections in order. The result has exactly `5 * faces.len()`
/// elements; no faces gives an empty vector.
pub fn encode_detections(faces: &[Detection]) -> Vec<f32> {
    let mut out = Vec::with_capacity(faces.len() * FACE_ATTRIBUTES);
    for f in faces {
        out.extend_from_slice(&[f.x1, f.y1, f.x2, f.y2, f.score]);
    }
    out
}

/// Read a flat buffer back into detections. A trailing partial tuple is
/// ignored.
pub fn decode_detections(flat: &[f32]) -> Vec<Detection> {
    flat.chunks_exact(FACE_ATTRIBUTES)
        .map(|c| Detection::new(c[0], c[1], c[2], c[3], c[4]))
        .collect()
}
