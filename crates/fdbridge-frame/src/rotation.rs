// fdbridge-frame/src/rotation.rs

/// Clockwise rotation that takes sensor output to the user's orientation.
///
/// Callers pass a plain integer angle; anything outside the four canonical
/// values is kept as [`Rotation::Other`] and treated as no rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
    Other(i32),
}

impl Rotation {
    /// The rotation that undoes this one. `Other` maps to itself.
    pub fn inverse(self) -> Self {
        match self {
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg90,
            other => other,
        }
    }

    /// Whether width and height trade places.
    pub fn swaps_dims(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Frame size after applying this rotation to a `width × height` frame.
    ///
    /// Detections are reported in this space, so a caller scaling boxes onto
    /// a view needs it.
    pub fn oriented_dims(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dims() {
            (height, width)
        } else {
            (width, height)
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
            Rotation::Other(d) => d,
        }
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Self {
        match degrees {
            0 => Rotation::Deg0,
            90 => Rotation::Deg90,
            180 => Rotation::Deg180,
            270 => Rotation::Deg270,
            other => Rotation::Other(other),
        }
    }
}
