//! Transceiver baseband signal-processing kernels
//!
//! FIR convolution and FFT over blocks of complex samples, sitting between
//! the radio sample I/O and burst processing.
//!
//! ## Layout
//!
//! - `domain/` - Sample and flag types, transform conventions, configuration, errors
//! - `dsp/` - Headroom-aware vectors, convolution kernels, FIR stages, FFT handles
//!
//! ## Conventions
//!
//! - Taps are stored time-reversed: the last tap multiplies the newest sample.
//! - A convolution input carries `taps - 1` samples of history in its headroom.
//! - Forward transforms are unscaled; inverse transforms divide by the size
//!   unless a handle is configured otherwise.

pub mod domain;
pub mod dsp;

pub use domain::{
    Algorithm, ComplexSample, Direction, Scaling, SigprocError, SigprocResult, TransformConfig,
    VectorFlags,
};
pub use dsp::{
    convolve, convolve_complex, convolve_complex_single, convolve_single, ComplexVector,
    FirFilter, SpectralTransform, TapKind,
};
