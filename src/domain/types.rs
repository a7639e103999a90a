//! Core domain types

use std::ops::BitOr;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Complex baseband sample (single precision unless stated otherwise)
pub type ComplexSample<T = f32> = Complex<T>;

/// Flag set carried by every [`ComplexVector`](crate::dsp::ComplexVector)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VectorFlags(u32);

impl VectorFlags {
    /// No flags set: owned storage carrying genuine complex data
    pub const NONE: Self = Self(0);
    /// Imaginary components are undefined and must be ignored
    pub const REAL_ONLY: Self = Self(1 << 0);
    /// Storage belongs to someone else; the vector is an aliasing view
    pub const BORROWED: Self = Self(1 << 1);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_real_only(&self) -> bool {
        self.contains(Self::REAL_ONLY)
    }
}

impl BitOr for VectorFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Transform direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Inverse,
}

/// Normalisation applied by a transform handle
///
/// The convention is fixed when the handle is created. Whatever the choice,
/// an inverse transform of a forward transform returns the input multiplied
/// by [`Scaling::round_trip_factor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    /// Neither direction is scaled
    None,
    /// Forward is unscaled, inverse is scaled by `1/size`
    #[default]
    Inverse,
    /// Both directions are scaled by `1/sqrt(size)`
    Unitary,
}

impl Scaling {
    /// Multiplier applied to the output of a transform in `direction`,
    /// or `None` when the output is left as computed
    pub fn factor(&self, direction: Direction, size: usize) -> Option<f64> {
        match (self, direction) {
            (Scaling::None, _) | (Scaling::Inverse, Direction::Forward) => None,
            (Scaling::Inverse, Direction::Inverse) => Some(1.0 / size as f64),
            (Scaling::Unitary, _) => Some(1.0 / (size as f64).sqrt()),
        }
    }

    /// Gain of `inverse(forward(x))` relative to `x`
    pub fn round_trip_factor(&self, size: usize) -> f64 {
        match self {
            Scaling::None => size as f64,
            Scaling::Inverse | Scaling::Unitary => 1.0,
        }
    }
}

/// FFT algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Let the planner pick; any non-zero size
    #[default]
    Auto,
    /// Fixed radix-4 decomposition; powers of two only
    Radix4,
}
