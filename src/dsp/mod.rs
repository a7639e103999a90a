//! Digital Signal Processing
//!
//! Numeric kernels over caller-supplied buffers. No I/O, no threads, no
//! process-level side effects.

pub mod convolve;
pub mod fft;
pub mod filter;
pub mod mac;
pub mod vector;

// Re-export commonly used items
pub use convolve::{convolve, convolve_complex, convolve_complex_single, convolve_single, TapKind};
pub use fft::SpectralTransform;
pub use filter::FirFilter;
pub use vector::ComplexVector;
