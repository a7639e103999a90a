//! Complex FIR convolution
//!
//! Taps are stored time-reversed, in the manner of block DSP libraries: the
//! last tap multiplies the newest sample. For output index `i` and a filter
//! of `L` taps
//!
//! ```text
//! out[i] = sum_{k=0}^{L-1} in[i - (L - 1) + k] * taps[k]
//! ```
//!
//! so the input must carry at least `L - 1` samples of headroom before its
//! logical start. All preconditions are checked before the output is
//! touched; a rejected call leaves `out` exactly as it was.

use num_complex::Complex;
use rustfft::FftNum;

use super::mac::{self, MacFn};
use super::vector::ComplexVector;
use crate::domain::{SigprocError, SigprocResult};

/// How a tap vector's coefficients are multiplied into the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    /// Real coefficients, complex-by-real multiply
    Real,
    /// Complex coefficients, full complex multiply
    Complex,
}

impl TapKind {
    fn kernel<T: FftNum>(self, taps: usize) -> MacFn<T> {
        match self {
            TapKind::Real => mac::select_real(taps),
            TapKind::Complex => mac::select_complex(taps),
        }
    }
}

fn reject<R>(op: &str, err: SigprocError) -> SigprocResult<R> {
    log::warn!("{op}: {err}");
    Err(err)
}

fn check_taps<T: FftNum>(
    op: &str,
    taps: &ComplexVector<'_, T>,
    kind: TapKind,
) -> SigprocResult<()> {
    match kind {
        TapKind::Real if !taps.is_real_only() => {
            return reject(
                op,
                SigprocError::InvalidFormat("Filter taps must be real".to_string()),
            );
        }
        TapKind::Complex if taps.is_real_only() => {
            return reject(
                op,
                SigprocError::InvalidFormat(
                    "Filter taps are real-only; use the real-tap convolution".to_string(),
                ),
            );
        }
        _ => {}
    }

    if taps.is_empty() {
        return reject(
            op,
            SigprocError::InvalidLength {
                arg: "taps",
                expected: 1,
                got: 0,
            },
        );
    }
    Ok(())
}

fn check_input<T: FftNum>(op: &str, input: &ComplexVector<'_, T>) -> SigprocResult<()> {
    if input.is_real_only() {
        return reject(
            op,
            SigprocError::InvalidFormat("Input data must be complex".to_string()),
        );
    }
    Ok(())
}

fn convolve_block<T: FftNum>(
    op: &str,
    input: &ComplexVector<'_, T>,
    taps: &ComplexVector<'_, T>,
    output: &mut ComplexVector<'_, T>,
    kind: TapKind,
) -> SigprocResult<usize> {
    if input.len() < output.len() {
        return reject(
            op,
            SigprocError::InvalidLength {
                arg: "out",
                expected: input.len(),
                got: output.len(),
            },
        );
    }
    check_input(op, input)?;
    if output.is_real_only() {
        return reject(
            op,
            SigprocError::InvalidFormat("Output must be complex".to_string()),
        );
    }
    check_taps(op, taps, kind)?;

    let history = taps.len() - 1;
    if input.headroom() < history {
        return reject(
            op,
            SigprocError::InvalidLength {
                arg: "headroom",
                expected: history,
                got: input.headroom(),
            },
        );
    }

    let mac = kind.kernel::<T>(taps.len());
    let window = input.with_history(history)?;
    let h = taps.as_slice();

    for (i, y) in output.as_mut_slice().iter_mut().enumerate() {
        *y = mac(&window[i..i + h.len()], h);
    }

    Ok(output.len())
}

fn convolve_at<T: FftNum>(
    op: &str,
    input: &ComplexVector<'_, T>,
    index: usize,
    taps: &ComplexVector<'_, T>,
    kind: TapKind,
) -> SigprocResult<Complex<T>> {
    check_input(op, input)?;
    check_taps(op, taps, kind)?;

    if index >= input.len() {
        return reject(
            op,
            SigprocError::InvalidLength {
                arg: "index",
                expected: input.len(),
                got: index,
            },
        );
    }

    let history = taps.len() - 1;
    let reach = input.headroom() + index;
    if reach < history {
        return reject(
            op,
            SigprocError::InvalidLength {
                arg: "headroom",
                expected: history - index,
                got: input.headroom(),
            },
        );
    }

    let window = input.with_history(input.headroom())?;
    let start = reach - history;
    let h = taps.as_slice();
    Ok(kind.kernel::<T>(h.len())(&window[start..start + h.len()], h))
}

/// Convolve a complex input with real taps
///
/// Writes `out.len()` samples and returns that count. `taps` must be flagged
/// `REAL_ONLY`, `input` and `out` must not be, `input.len() >= out.len()` and
/// the input's headroom must cover `taps.len() - 1` samples of history.
pub fn convolve<T: FftNum>(
    input: &ComplexVector<'_, T>,
    taps: &ComplexVector<'_, T>,
    output: &mut ComplexVector<'_, T>,
) -> SigprocResult<usize> {
    convolve_block("convolve", input, taps, output, TapKind::Real)
}

/// One output of [`convolve`]
///
/// `index` is the logical input position aligned with the last tap; the
/// window reaches back `taps.len() - 1` samples, into the headroom if needed.
pub fn convolve_single<T: FftNum>(
    input: &ComplexVector<'_, T>,
    index: usize,
    taps: &ComplexVector<'_, T>,
) -> SigprocResult<Complex<T>> {
    convolve_at("convolve_single", input, index, taps, TapKind::Real)
}

/// Convolve a complex input with complex taps
///
/// Same windowing and length rules as [`convolve`]; the taps must *not* be
/// flagged `REAL_ONLY`.
pub fn convolve_complex<T: FftNum>(
    input: &ComplexVector<'_, T>,
    taps: &ComplexVector<'_, T>,
    output: &mut ComplexVector<'_, T>,
) -> SigprocResult<usize> {
    convolve_block("convolve_complex", input, taps, output, TapKind::Complex)
}

/// One output of [`convolve_complex`]
pub fn convolve_complex_single<T: FftNum>(
    input: &ComplexVector<'_, T>,
    index: usize,
    taps: &ComplexVector<'_, T>,
) -> SigprocResult<Complex<T>> {
    convolve_at("convolve_complex_single", input, index, taps, TapKind::Complex)
}
