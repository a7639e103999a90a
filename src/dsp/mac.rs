//! Multiply-accumulate kernels
//!
//! Each kernel reduces one window of input against the full tap vector and
//! returns the accumulated output sample. Short, common filter lengths get a
//! fixed-size kernel the compiler can unroll; every other length uses the
//! generic loop. Both paths accumulate in the same order.

use num_complex::Complex;
use rustfft::FftNum;

use super::vector::zero;

/// Window-by-taps reduction used by the convolution loops
pub(crate) type MacFn<T> = fn(&[Complex<T>], &[Complex<T>]) -> Complex<T>;

/// Tap lengths that have a dedicated kernel
pub const SPECIALISED_LENGTHS: [usize; 7] = [4, 8, 12, 16, 20, 24, 32];

/// Complex sample times real tap; the tap's imaginary part is never read
#[inline(always)]
fn mac_real<T: FftNum>(acc: Complex<T>, x: Complex<T>, h: Complex<T>) -> Complex<T> {
    Complex::new(acc.re + x.re * h.re, acc.im + x.im * h.re)
}

#[inline(always)]
fn mac_cmplx<T: FftNum>(acc: Complex<T>, x: Complex<T>, h: Complex<T>) -> Complex<T> {
    Complex::new(
        acc.re + x.re * h.re - x.im * h.im,
        acc.im + x.re * h.im + x.im * h.re,
    )
}

pub(crate) fn mac_real_n<T: FftNum>(x: &[Complex<T>], h: &[Complex<T>]) -> Complex<T> {
    x.iter()
        .zip(h)
        .fold(zero(), |acc, (&x, &h)| mac_real(acc, x, h))
}

pub(crate) fn mac_cmplx_n<T: FftNum>(x: &[Complex<T>], h: &[Complex<T>]) -> Complex<T> {
    x.iter()
        .zip(h)
        .fold(zero(), |acc, (&x, &h)| mac_cmplx(acc, x, h))
}

fn mac_real_fixed<T: FftNum, const N: usize>(x: &[Complex<T>], h: &[Complex<T>]) -> Complex<T> {
    let (Ok(xs), Ok(hs)) = (<&[Complex<T>; N]>::try_from(x), <&[Complex<T>; N]>::try_from(h))
    else {
        return mac_real_n(x, h);
    };
    let mut acc = zero();
    for k in 0..N {
        acc = mac_real(acc, xs[k], hs[k]);
    }
    acc
}

fn mac_cmplx_fixed<T: FftNum, const N: usize>(x: &[Complex<T>], h: &[Complex<T>]) -> Complex<T> {
    let (Ok(xs), Ok(hs)) = (<&[Complex<T>; N]>::try_from(x), <&[Complex<T>; N]>::try_from(h))
    else {
        return mac_cmplx_n(x, h);
    };
    let mut acc = zero();
    for k in 0..N {
        acc = mac_cmplx(acc, xs[k], hs[k]);
    }
    acc
}

/// Complex-by-real kernel for a filter of `taps` coefficients
pub(crate) fn select_real<T: FftNum>(taps: usize) -> MacFn<T> {
    match taps {
        4 => mac_real_fixed::<T, 4>,
        8 => mac_real_fixed::<T, 8>,
        12 => mac_real_fixed::<T, 12>,
        16 => mac_real_fixed::<T, 16>,
        20 => mac_real_fixed::<T, 20>,
        24 => mac_real_fixed::<T, 24>,
        32 => mac_real_fixed::<T, 32>,
        _ => mac_real_n::<T>,
    }
}

/// Complex-by-complex kernel for a filter of `taps` coefficients
pub(crate) fn select_complex<T: FftNum>(taps: usize) -> MacFn<T> {
    match taps {
        4 => mac_cmplx_fixed::<T, 4>,
        8 => mac_cmplx_fixed::<T, 8>,
        12 => mac_cmplx_fixed::<T, 12>,
        16 => mac_cmplx_fixed::<T, 16>,
        20 => mac_cmplx_fixed::<T, 20>,
        24 => mac_cmplx_fixed::<T, 24>,
        32 => mac_cmplx_fixed::<T, 32>,
        _ => mac_cmplx_n::<T>,
    }
}
