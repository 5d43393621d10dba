use geo::{Coord, GeoFloat};

use crate::{
    error::{Result, TopologyError},
    utils::round_half_up,
};

/// The grid that coordinates are rounded onto.
///
/// A `Fixed` model with scale `s` rounds every ordinate to the nearest
/// multiple of `1 / s`; a `Floating` model leaves coordinates as they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrecisionModel<T: GeoFloat> {
    Floating,
    Fixed { scale: T },
}

impl<T: GeoFloat> Default for PrecisionModel<T> {
    fn default() -> Self {
        PrecisionModel::Floating
    }
}

impl<T: GeoFloat> PrecisionModel<T> {
    /// A fixed grid with `scale` cells per unit.
    pub fn fixed(scale: T) -> Result<Self> {
        if scale > T::zero() && scale.is_finite() {
            Ok(PrecisionModel::Fixed { scale })
        } else {
            Err(TopologyError::InvalidScale(
                scale.to_f64().unwrap_or(f64::NAN),
            ))
        }
    }

    #[inline]
    pub fn is_floating(&self) -> bool {
        matches!(self, PrecisionModel::Floating)
    }

    /// Scale factor of the grid (`1` for a floating model).
    #[inline]
    pub fn scale(&self) -> T {
        match self {
            PrecisionModel::Floating => T::one(),
            PrecisionModel::Fixed { scale } => *scale,
        }
    }

    #[inline]
    pub fn make_precise_value(&self, value: T) -> T {
        match self {
            PrecisionModel::Floating => value,
            PrecisionModel::Fixed { scale } => round_half_up(value * *scale) / *scale,
        }
    }

    #[inline]
    pub fn make_precise(&self, coord: Coord<T>) -> Coord<T> {
        Coord {
            x: self.make_precise_value(coord.x),
            y: self.make_precise_value(coord.y),
        }
    }
}
