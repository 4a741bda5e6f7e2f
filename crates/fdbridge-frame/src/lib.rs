// fdbridge-frame/src/lib.rs
// ============================================================
// Frame types shared by every fdbridge stage
// Camera frames arrive as NV21 (Android's default preview
// format) and leave the converter as interleaved BGRA.
// ------------------------------------------------------------
// Public API:
//   * Nv21Frame::new() – borrow-check a caller buffer's geometry
//   * Frame::bgra()    – wrap an interleaved colour buffer
//   * Rotation         – tagged sensor→user orientation
// ============================================================

//! fdbridge – frame layer
//!
//! A [`Frame`] is a rectangular byte buffer plus its width, height and
//! [`PixelEncoding`]. The raw caller buffer is never owned by the pipeline:
//! [`Nv21Frame`] only borrows it for the duration of a call, and conversion
//! produces a fresh, owned BGRA [`Frame`].

use thiserror::Error;

mod rotation;
pub use rotation::Rotation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame dimensions are zero ({width}x{height})")]
    ZeroDimensions { width: u32, height: u32 },
    #[error("4:2:0 frames need even dimensions, got {width}x{height}")]
    OddDimensions { width: u32, height: u32 },
    #[error("frame of {width}x{height} does not fit in memory")]
    TooLarge { width: u32, height: u32 },
    #[error("frame buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },
    #[error("expected a {expected:?} frame, got {actual:?}")]
    UnexpectedEncoding {
        expected: PixelEncoding,
        actual: PixelEncoding,
    },
    #[error("pixel data has {actual} bytes, {expected} needed for the declared geometry")]
    DataLength { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;

/// How the bytes of a frame are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelEncoding {
    /// Y plane followed by an interleaved V/U plane at half resolution.
    Nv21,
    /// Four bytes per pixel, blue first, alpha last.
    Bgra,
}

impl PixelEncoding {
    /// Interleaved channel count. NV21 is planar, so it reports a single
    /// luma channel.
    pub fn channels(self) -> usize {
        match self {
            PixelEncoding::Nv21 => 1,
            PixelEncoding::Bgra => 4,
        }
    }

    /// Bytes needed to hold a `width × height` frame in this encoding.
    ///
    /// `None` when the size overflows `usize`.
    pub fn frame_len(self, width: u32, height: u32) -> Option<usize> {
        let pixels = (width as usize).checked_mul(height as usize)?;
        match self {
            PixelEncoding::Nv21 => pixels.checked_mul(3).map(|n| n / 2),
            PixelEncoding::Bgra => pixels.checked_mul(4),
        }
    }

    fn checked_frame_len(self, width: u32, height: u32) -> Result<usize> {
        self.frame_len(width, height)
            .ok_or(FrameError::TooLarge { width, height })
    }
}

/// A caller-owned NV21 buffer, borrowed read-only for one pipeline call.
#[derive(Debug, Clone, Copy)]
pub struct Nv21Frame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Nv21Frame<'a> {
    /// Check the declared geometry against the buffer.
    ///
    /// Trailing bytes past `width*height*3/2` are ignored; some camera HALs
    /// pad their preview buffers.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimensions { width, height });
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(FrameError::OddDimensions { width, height });
        }
        let expected = PixelEncoding::Nv21.checked_frame_len(width, height)?;
        if data.len() < expected {
            return Err(FrameError::BufferTooShort {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: &data[..expected],
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Full-resolution luma plane.
    pub fn luma(&self) -> &'a [u8] {
        &self.data[..self.width as usize * self.height as usize]
    }

    /// Interleaved V/U plane, one pair per 2×2 block.
    pub fn chroma(&self) -> &'a [u8] {
        &self.data[self.width as usize * self.height as usize..]
    }
}

/// An owned, interleaved frame produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    encoding: PixelEncoding,
}

impl Frame {
    /// Wrap a BGRA buffer of exactly `width*height*4` bytes.
    pub fn bgra(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = PixelEncoding::Bgra.checked_frame_len(width, height)?;
        if data.len() != expected {
            return Err(FrameError::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            encoding: PixelEncoding::Bgra,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    pub fn channels(&self) -> usize {
        self.encoding.channels()
    }

    /// Row-major pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Channel bytes of the pixel at (`x`, `y`), or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels();
        let base = (y as usize * self.width as usize + x as usize) * c;
        self.data.get(base..base + c)
    }

    /// Swap in new pixel data after a geometric transform.
    ///
    /// The encoding is kept; the length must match the new geometry.
    pub fn replace_data(&mut self, data: Vec<u8>, width: u32, height: u32) -> Result<()> {
        let expected = self.encoding.checked_frame_len(width, height)?;
        if data.len() != expected {
            return Err(FrameError::DataLength {
                expected,
                actual: data.len(),
            });
        }
        self.data = data;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Fail unless this frame is in `expected` encoding.
    pub fn ensure_encoding(&self, expected: PixelEncoding) -> Result<()> {
        if self.encoding != expected {
            return Err(FrameError::UnexpectedEncoding {
                expected,
                actual: self.encoding,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nv21_splits_planes() {
        let bytes: Vec<u8> = (0..24).collect();
        let frame = Nv21Frame::new(&bytes, 4, 4).unwrap();
        assert_eq!(frame.luma().len(), 16);
        assert_eq!(frame.chroma(), &[16, 17, 18, 19, 20, 21, 22, 23]);
    }

    #[test]
    fn nv21_ignores_trailing_padding() {
        let bytes = vec![0u8; 30];
        let frame = Nv21Frame::new(&bytes, 4, 4).unwrap();
        assert_eq!(frame.chroma().len(), 8);
    }

    #[test]
    fn nv21_rejects_short_buffer() {
        let err = Nv21Frame::new(&[0u8; 5], 2, 2).unwrap_err();
        assert_eq!(
            err,
            FrameError::BufferTooShort {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn nv21_rejects_bad_geometry() {
        assert!(matches!(
            Nv21Frame::new(&[0u8; 64], 0, 4),
            Err(FrameError::ZeroDimensions { .. })
        ));
        assert!(matches!(
            Nv21Frame::new(&[0u8; 64], 3, 4),
            Err(FrameError::OddDimensions { .. })
        ));
    }

    #[test]
    fn nv21_rejects_oversized_geometry() {
        let err = Nv21Frame::new(&[0u8; 6], 0xFFFF_FFFE, 0xFFFF_FFFE).unwrap_err();
        assert_eq!(
            err,
            FrameError::TooLarge {
                width: 0xFFFF_FFFE,
                height: 0xFFFF_FFFE
            }
        );
    }

    #[test]
    fn frame_len_overflow_is_none() {
        assert_eq!(PixelEncoding::Bgra.frame_len(u32::MAX, u32::MAX), None);
        assert_eq!(PixelEncoding::Nv21.frame_len(4, 4), Some(24));
        assert_eq!(PixelEncoding::Bgra.frame_len(2, 3), Some(24));
    }

    #[test]
    fn bgra_pixel_lookup() {
        let data: Vec<u8> = (0..16).collect();
        let frame = Frame::bgra(data, 2, 2).unwrap();
        assert_eq!(frame.pixel(1, 1), Some(&[12u8, 13, 14, 15][..]));
        assert_eq!(frame.pixel(2, 0), None);
        assert_eq!(frame.channels(), 4);
    }

    #[test]
    fn replace_data_checks_length() {
        let mut frame = Frame::bgra(vec![0; 24], 3, 2).unwrap();
        assert!(frame.replace_data(vec![0; 24], 2, 3).is_ok());
        assert_eq!((frame.width(), frame.height()), (2, 3));
        assert!(frame.replace_data(vec![0; 8], 2, 3).is_err());
    }
}
