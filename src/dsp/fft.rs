//! Spectral transform handles
//!
//! A `SpectralTransform` owns one FFT plan bound to a size and direction.
//! Build it once at pipeline setup and reuse it for every block: planning
//! computes twiddle tables, applying only runs the butterflies.
//!
//! Scaling is fixed per handle (see [`Scaling`]); with the default
//! `Scaling::Inverse` the forward transform is unscaled and the inverse
//! divides by `size`, so an inverse of a forward returns the input.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use num_complex::Complex;
use rustfft::algorithm::Radix4;
use rustfft::{Fft, FftDirection, FftNum, FftPlanner};

use super::vector::{zero, ComplexVector};
use crate::domain::{
    Algorithm, Direction, Scaling, SigprocError, SigprocResult, TransformConfig,
};

impl From<Direction> for FftDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => FftDirection::Forward,
            Direction::Inverse => FftDirection::Inverse,
        }
    }
}

/// FFT plan bound to a size and direction
///
/// The plan is immutable and shared, so a handle can be used from several
/// threads. [`apply`](Self::apply) and [`apply_in_place`](Self::apply_in_place)
/// borrow the handle's internal scratch buffer and therefore serialise
/// against each other; use [`apply_with_scratch`](Self::apply_with_scratch)
/// with per-thread scratch for concurrent transforms on one handle.
pub struct SpectralTransform<T: FftNum = f32> {
    fft: Arc<dyn Fft<T>>,
    size: usize,
    direction: Direction,
    scaling: Scaling,
    algorithm: Algorithm,
    scale: Option<T>,
    scratch: Mutex<Vec<Complex<T>>>,
}

impl<T: FftNum> fmt::Debug for SpectralTransform<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralTransform")
            .field("size", &self.size)
            .field("direction", &self.direction)
            .field("scaling", &self.scaling)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl<T: FftNum> SpectralTransform<T> {
    /// Plan a transform with the default scaling and algorithm
    pub fn create(size: usize, direction: Direction) -> SigprocResult<Self> {
        Self::from_config(&TransformConfig::new(size, direction))
    }

    /// Plan a transform described by `config`
    ///
    /// Sizes are validated before anything is allocated.
    pub fn from_config(config: &TransformConfig) -> SigprocResult<Self> {
        let size = config.size;
        if size == 0 {
            return Err(SigprocError::UnsupportedSize {
                size,
                reason: "transform size must be non-zero",
            });
        }
        if config.algorithm == Algorithm::Radix4 && !size.is_power_of_two() {
            return Err(SigprocError::UnsupportedSize {
                size,
                reason: "radix-4 transforms need a power-of-two size",
            });
        }

        let scale = match config.scaling.factor(config.direction, size) {
            Some(factor) => Some(T::from_f64(factor).ok_or(SigprocError::UnsupportedSize {
                size,
                reason: "scale factor is not representable",
            })?),
            None => None,
        };

        let fft: Arc<dyn Fft<T>> = match config.algorithm {
            Algorithm::Auto => FftPlanner::new().plan_fft(size, config.direction.into()),
            Algorithm::Radix4 => Arc::new(Radix4::new(size, config.direction.into())),
        };
        let scratch = vec![zero(); fft.get_inplace_scratch_len()];

        log::debug!(
            "Planned {size}-point {:?} FFT ({:?}, {:?} scaling)",
            config.direction,
            config.algorithm,
            config.scaling
        );

        Ok(Self {
            fft,
            size,
            direction: config.direction,
            scaling: config.scaling,
            algorithm: config.algorithm,
            scale,
            scratch: Mutex::new(scratch),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn scaling(&self) -> Scaling {
        self.scaling
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Minimum scratch length accepted by [`apply_with_scratch`](Self::apply_with_scratch)
    pub fn scratch_len(&self) -> usize {
        self.fft.get_inplace_scratch_len()
    }

    /// Transform `input` into `output`
    ///
    /// Both vectors must hold exactly `size` samples. A `REAL_ONLY` input is
    /// read with zero imaginary parts; the output must be a complex vector.
    pub fn apply(
        &self,
        input: &ComplexVector<'_, T>,
        output: &mut ComplexVector<'_, T>,
    ) -> SigprocResult<()> {
        self.check_len("in", input.len())?;
        self.check_output(output)?;

        load(input, output);
        let mut scratch = self.scratch.lock().unwrap_or_else(PoisonError::into_inner);
        self.run(output.as_mut_slice(), &mut scratch);
        Ok(())
    }

    /// Transform `buffer` in place
    pub fn apply_in_place(&self, buffer: &mut ComplexVector<'_, T>) -> SigprocResult<()> {
        self.check_output(buffer)?;

        let mut scratch = self.scratch.lock().unwrap_or_else(PoisonError::into_inner);
        self.run(buffer.as_mut_slice(), &mut scratch);
        Ok(())
    }

    /// Transform `input` into `output` using caller-provided scratch
    ///
    /// Never touches the handle's shared scratch, so concurrent calls on one
    /// handle proceed in parallel.
    pub fn apply_with_scratch(
        &self,
        input: &ComplexVector<'_, T>,
        output: &mut ComplexVector<'_, T>,
        scratch: &mut [Complex<T>],
    ) -> SigprocResult<()> {
        self.check_len("in", input.len())?;
        self.check_output(output)?;
        if scratch.len() < self.scratch_len() {
            return Err(SigprocError::InvalidLength {
                arg: "scratch",
                expected: self.scratch_len(),
                got: scratch.len(),
            });
        }

        load(input, output);
        self.run(output.as_mut_slice(), scratch);
        Ok(())
    }

    /// Release the plan and scratch tables
    ///
    /// Equivalent to dropping the handle.
    pub fn destroy(self) {
        drop(self);
    }

    fn check_len(&self, arg: &'static str, len: usize) -> SigprocResult<()> {
        if len != self.size {
            let err = SigprocError::InvalidLength {
                arg,
                expected: self.size,
                got: len,
            };
            log::warn!("fft: {err}");
            return Err(err);
        }
        Ok(())
    }

    fn check_output(&self, output: &ComplexVector<'_, T>) -> SigprocResult<()> {
        self.check_len("out", output.len())?;
        if output.is_real_only() {
            let err = SigprocError::InvalidFormat("Transform output must be complex".to_string());
            log::warn!("fft: {err}");
            return Err(err);
        }
        Ok(())
    }

    fn run(&self, buffer: &mut [Complex<T>], scratch: &mut [Complex<T>]) {
        self.fft.process_with_scratch(buffer, scratch);
        if let Some(scale) = self.scale {
            for sample in buffer.iter_mut() {
                *sample = sample.scale(scale);
            }
        }
    }
}

impl<T: FftNum> Drop for SpectralTransform<T> {
    fn drop(&mut self) {
        log::debug!("Destroyed {}-point {:?} FFT", self.size, self.direction);
    }
}

fn load<T: FftNum>(input: &ComplexVector<'_, T>, output: &mut ComplexVector<'_, T>) {
    let dst = output.as_mut_slice();
    if input.is_real_only() {
        for (d, s) in dst.iter_mut().zip(input.as_slice()) {
            *d = Complex::new(s.re, T::zero());
        }
    } else {
        dst.copy_from_slice(input.as_slice());
    }
}
