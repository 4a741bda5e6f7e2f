// fdbridge-preprocess/src/convert.rs
//
// NV21 → BGRA, full-range BT.601, nearest chroma up-sample.

use fdbridge_frame::{Frame, FrameError, Nv21Frame, PixelEncoding};

use crate::Result;

/// Convert a borrowed NV21 frame into a newly allocated BGRA frame.
///
/// The source buffer is only read. Alpha is always 255.
pub fn nv21_to_bgra(src: &Nv21Frame<'_>) -> Result<Frame> {
    let w = src.width() as usize;
    let h = src.height() as usize;
    let len = PixelEncoding::Bgra
        .frame_len(src.width(), src.height())
        .ok_or(FrameError::TooLarge {
            width: src.width(),
            height: src.height(),
        })?;
    let mut out = vec![0u8; len];
    nv21_to_bgra_into(src.luma(), src.chroma(), w, h, &mut out);
    Ok(Frame::bgra(out, src.width(), src.height())?)
}

fn nv21_to_bgra_into(y: &[u8], vu: &[u8], w: usize, h: usize, out: &mut [u8]) {
    for (j, row) in out.chunks_exact_mut(w * 4).take(h).enumerate() {
        let chroma_row = (j / 2) * w;
        for (i, px) in row.chunks_exact_mut(4).enumerate() {
            let y_val = y[j * w + i] as f32;
            // NV21 stores V before U
            let vu_idx = chroma_row + (i & !1);
            let v = vu[vu_idx] as f32 - 128.0;
            let u = vu[vu_idx + 1] as f32 - 128.0;

            let [b, g, r] = yuv_to_bgr(y_val, u, v);
            px[0] = b;
            px[1] = g;
            px[2] = r;
            px[3] = u8::MAX;
        }
    }
}

/// One pixel, chroma already centred on zero.
fn yuv_to_bgr(y: f32, u: f32, v: f32) -> [u8; 3] {
    let r = y + 1.402 * v;
    let g = y - 0.344_136 * u - 0.714_136 * v;
    let b = y + 1.772 * u;
    [to_u8(b), to_u8(g), to_u8(r)]
}

fn to_u8(x: f32) -> u8 {
    x.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nv21(width: u32, height: u32, y: u8, v: u8, u: u8) -> Vec<u8> {
        let pixels = (width * height) as usize;
        let mut bytes = vec![y; pixels];
        for _ in 0..pixels / 4 {
            bytes.push(v);
            bytes.push(u);
        }
        bytes
    }

    #[test]
    fn uniform_mid_gray() {
        let bytes = nv21(8, 6, 128, 128, 128);
        let src = Nv21Frame::new(&bytes, 8, 6).unwrap();
        let frame = nv21_to_bgra(&src).unwrap();
        assert_eq!(frame.as_bytes().len(), 8 * 6 * 4);
        for px in frame.as_bytes().chunks_exact(4) {
            for &c in &px[..3] {
                assert!((c as i32 - 128).abs() <= 1, "channel {c}");
            }
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn neutral_chroma_copies_luma() {
        let bytes = [0u8, 64, 200, 255, 128, 128];
        let src = Nv21Frame::new(&bytes, 2, 2).unwrap();
        let frame = nv21_to_bgra(&src).unwrap();
        let luma: Vec<u8> = frame.as_bytes().chunks_exact(4).map(|px| px[0]).collect();
        assert_eq!(luma, vec![0, 64, 200, 255]);
    }

    #[test]
    fn strong_v_is_red() {
        // V high, U neutral → red channel dominates
        let bytes = nv21(2, 2, 128, 255, 128);
        let src = Nv21Frame::new(&bytes, 2, 2).unwrap();
        let frame = nv21_to_bgra(&src).unwrap();
        let px = frame.pixel(0, 0).unwrap();
        assert_eq!(px[2], 255);
        assert_eq!(px[0], 128);
        assert!(px[1] < 128);
    }

    #[test]
    fn strong_u_is_blue() {
        let bytes = nv21(2, 2, 128, 128, 255);
        let src = Nv21Frame::new(&bytes, 2, 2).unwrap();
        let frame = nv21_to_bgra(&src).unwrap();
        let px = frame.pixel(1, 1).unwrap();
        assert_eq!(px[0], 255);
        assert_eq!(px[2], 128);
    }

    #[test]
    fn chroma_is_shared_per_2x2_block() {
        // 4x2 frame: left block neutral, right block saturated V
        let mut bytes = vec![100u8; 8];
        bytes.extend_from_slice(&[128, 128, 255, 128]);
        let src = Nv21Frame::new(&bytes, 4, 2).unwrap();
        let frame = nv21_to_bgra(&src).unwrap();
        for y in 0..2 {
            assert_eq!(frame.pixel(0, y).unwrap()[2], 100);
            assert_eq!(frame.pixel(1, y).unwrap()[2], 100);
            assert!(frame.pixel(2, y).unwrap()[2] > 200);
            assert!(frame.pixel(3, y).unwrap()[2] > 200);
        }
    }

    #[test]
    fn input_is_untouched() {
        let bytes = nv21(4, 4, 90, 30, 220);
        let copy = bytes.clone();
        let src = Nv21Frame::new(&bytes, 4, 4).unwrap();
        let _ = nv21_to_bgra(&src).unwrap();
        assert_eq!(bytes, copy);
    }
}
