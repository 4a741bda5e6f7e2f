//! fdbridge‑preprocess – NV21 → BGRA, orientation, and model input.
//!
//! The bridge runs [`nv21_to_bgra`] then [`rotate`] on every frame; a
//! detector backend that wants a float tensor hands the result to a
//! [`Preprocessor`].

use std::borrow::Cow;

use fdbridge_frame::{Frame, FrameError, PixelEncoding};
use ndarray::Array3;
use resize::{new, Pixel, Type};
use rgb::FromSlice;
use thiserror::Error;

mod convert;
mod orient;

pub use convert::nv21_to_bgra;
pub use orient::rotate;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("pixel buffer does not match frame shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("resize failed: {0}")]
    Resize(String),
    #[error("pixel data does not fit a {width}x{height} image")]
    ImageBuffer { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, PreprocessError>;

#[derive(Debug, Clone)]
pub struct Preprocessor {
    dst_w: u32,
    dst_h: u32,
    scale: f32,
}

impl Preprocessor {
    /// Create a pre‑processor that outputs WxH RGB (0‑1.0f32).
    pub fn new(dst_w: u32, dst_h: u32) -> Self {
        Self {
            dst_w,
            dst_h,
            scale: 1.0 / 255.0,
        }
    }

    /// Multiplier applied to each 8-bit channel. `1.0` keeps the 0–255 range
    /// some face models are trained on.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn dst_dims(&self) -> (u32, u32) {
        (self.dst_w, self.dst_h)
    }

    /// Resize a BGRA frame and pack it as an (H, W, 3) RGB array.
    pub fn run(&self, frame: &Frame) -> Result<Array3<f32>> {
        frame.ensure_encoding(PixelEncoding::Bgra)?;

        let (dw, dh) = (self.dst_w as usize, self.dst_h as usize);
        let pixels: Cow<'_, [u8]> = if (frame.width(), frame.height()) == self.dst_dims() {
            Cow::Borrowed(frame.as_bytes())
        } else {
            let mut dst = vec![0u8; dw * dh * 4];
            let mut resizer = new(
                frame.width() as usize,
                frame.height() as usize,
                dw,
                dh,
                Pixel::RGBA8,
                Type::Triangle,
            )
            .map_err(|e| PreprocessError::Resize(format!("{e:?}")))?;
            // channel order is irrelevant to the filter
            resizer
                .resize(frame.as_bytes().as_rgba(), dst.as_rgba_mut())
                .map_err(|e| PreprocessError::Resize(format!("{e:?}")))?;
            Cow::Owned(dst)
        };

        // BGRA → RGB: output channel c reads source byte 2 - c
        let scale = self.scale;
        Ok(Array3::from_shape_fn((dh, dw, 3), |(y, x, c)| {
            pixels[(y * dw + x) * 4 + 2 - c] as f32 * scale
        }))
    }
}

/// Copy a BGRA frame into an [`image::RgbaImage`] for debugging dumps.
pub fn to_rgba_image(frame: &Frame) -> Result<image::RgbaImage> {
    frame.ensure_encoding(PixelEncoding::Bgra)?;
    let mut bytes = frame.as_bytes().to_vec();
    for px in bytes.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
    image::RgbaImage::from_raw(frame.width(), frame.height(), bytes).ok_or(
        PreprocessError::ImageBuffer {
            width: frame.width(),
            height: frame.height(),
        },
    )
}
