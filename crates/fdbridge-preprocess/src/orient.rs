// fdbridge-preprocess/src/orient.rs
//
// Quarter-turn rotations as transpose + flip on an (H, W, C) view.

use fdbridge_frame::{Frame, Rotation};
use log::debug;
use ndarray::{s, ArrayView3};

use crate::Result;

/// Rotate `frame` clockwise by `rotation`, replacing its pixel data.
///
/// | rotation | transform                         |
/// |----------|-----------------------------------|
/// | 0        | none                              |
/// | 90       | transpose, mirror columns         |
/// | 180      | mirror rows and columns           |
/// | 270      | transpose, mirror rows            |
/// | other    | none                              |
pub fn rotate(frame: &mut Frame, rotation: Rotation) -> Result<()> {
    let (w, h, c) = (
        frame.width() as usize,
        frame.height() as usize,
        frame.channels(),
    );
    let view = ArrayView3::from_shape((h, w, c), frame.as_bytes())?;

    let rotated = match rotation {
        Rotation::Deg0 => return Ok(()),
        Rotation::Other(degrees) => {
            debug!("ignoring unsupported rotation of {degrees} degrees");
            return Ok(());
        }
        Rotation::Deg90 => view.permuted_axes([1, 0, 2]).slice_move(s![.., ..;-1, ..]),
        Rotation::Deg180 => view.slice_move(s![..;-1, ..;-1, ..]),
        Rotation::Deg270 => view.permuted_axes([1, 0, 2]).slice_move(s![..;-1, .., ..]),
    };

    let (new_h, new_w, _) = rotated.dim();
    // logical-order iteration yields a row-major buffer
    let data: Vec<u8> = rotated.iter().copied().collect();
    frame.replace_data(data, new_w as u32, new_h as u32)?;
    Ok(())
}
