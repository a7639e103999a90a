//! FIR filter stages
//!
//! A `FirFilter` pairs a validated tap vector with the convolution routine
//! that matches its format, so a pipeline stage checks its taps once at
//! setup and then only feeds blocks through.

use std::f64::consts::PI;

use num_complex::Complex;
use rustfft::FftNum;

use super::convolve::{
    convolve, convolve_complex, convolve_complex_single, convolve_single, TapKind,
};
use super::vector::ComplexVector;
use crate::domain::{SigprocError, SigprocResult, VectorFlags};

/// Windowed-sinc lowpass prototype in classic order, unity DC gain
fn sinc_prototype(cutoff_freq: f64, sample_rate: f64, num_taps: usize) -> SigprocResult<Vec<f64>> {
    if num_taps == 0 {
        return Err(SigprocError::InvalidParameter(
            "filter needs at least one tap".to_string(),
        ));
    }
    if !(cutoff_freq > 0.0 && cutoff_freq < sample_rate / 2.0) {
        return Err(SigprocError::InvalidParameter(format!(
            "cutoff {cutoff_freq} Hz must lie between 0 and Nyquist ({} Hz)",
            sample_rate / 2.0
        )));
    }

    let normalized_cutoff = cutoff_freq / sample_rate;
    let middle = num_taps / 2;
    let mut coefficients: Vec<f64> = (0..num_taps)
        .map(|i| {
            let n = i as f64 - middle as f64;
            let sinc = if n == 0.0 {
                2.0 * normalized_cutoff
            } else {
                (2.0 * PI * normalized_cutoff * n).sin() / (PI * n)
            };
            // Hann window
            let window = 0.5 * (1.0 - (2.0 * PI * i as f64 / num_taps as f64).cos());
            sinc * window
        })
        .collect();

    let sum: f64 = coefficients.iter().sum();
    if sum.abs() < 1e-12 {
        return Err(SigprocError::InvalidParameter(format!(
            "{num_taps} taps are too few for a {cutoff_freq} Hz cutoff"
        )));
    }
    for c in &mut coefficients {
        *c /= sum;
    }
    Ok(coefficients)
}

fn to_sample<T: FftNum>(value: f64) -> SigprocResult<T> {
    T::from_f64(value).ok_or_else(|| {
        SigprocError::InvalidParameter(format!("coefficient {value} is not representable"))
    })
}

/// FIR filter stage over complex sample blocks
#[derive(Debug)]
pub struct FirFilter<T: FftNum = f32> {
    taps: ComplexVector<'static, T>,
    kind: TapKind,
}

impl<T: FftNum> FirFilter<T> {
    /// Wrap a tap vector in engine (reversed) order
    ///
    /// `REAL_ONLY` taps run through the complex-by-real engine, all others
    /// through the complex-tap engine.
    pub fn new(taps: ComplexVector<'static, T>) -> SigprocResult<Self> {
        if taps.is_empty() {
            return Err(SigprocError::InvalidLength {
                arg: "taps",
                expected: 1,
                got: 0,
            });
        }
        let kind = if taps.is_real_only() {
            TapKind::Real
        } else {
            TapKind::Complex
        };
        Ok(Self { taps, kind })
    }

    /// Hann-windowed sinc lowpass with unity DC gain
    pub fn lowpass(cutoff_freq: f64, sample_rate: f64, num_taps: usize) -> SigprocResult<Self> {
        let prototype = sinc_prototype(cutoff_freq, sample_rate, num_taps)?;
        let coeffs = prototype
            .iter()
            .map(|&c| to_sample(c))
            .collect::<SigprocResult<Vec<T>>>()?;
        Self::new(ComplexVector::from_classic_taps(&coeffs)?)
    }

    /// Single-sided bandpass around `center_freq`
    ///
    /// The lowpass prototype at `bandwidth / 2` is shifted up by a complex
    /// exponential rather than a cosine, so only `+center_freq` passes; the
    /// mirror image at `-center_freq` is rejected. Gain at the center is one.
    pub fn complex_bandpass(
        center_freq: f64,
        bandwidth: f64,
        sample_rate: f64,
        num_taps: usize,
    ) -> SigprocResult<Self> {
        if center_freq.abs() >= sample_rate / 2.0 {
            return Err(SigprocError::InvalidParameter(format!(
                "center {center_freq} Hz lies beyond Nyquist ({} Hz)",
                sample_rate / 2.0
            )));
        }
        let prototype = sinc_prototype(bandwidth / 2.0, sample_rate, num_taps)?;

        let mut taps = ComplexVector::<T>::allocate(num_taps, 0, VectorFlags::NONE)?;
        // Engine order: classic h[n] lands at position L - 1 - n
        for (n, (tap, &lp)) in taps
            .as_mut_slice()
            .iter_mut()
            .rev()
            .zip(&prototype)
            .enumerate()
        {
            let phase = 2.0 * PI * center_freq * n as f64 / sample_rate;
            *tap = Complex::new(to_sample(lp * phase.cos())?, to_sample(lp * phase.sin())?);
        }
        Self::new(taps)
    }

    pub fn taps(&self) -> &ComplexVector<'static, T> {
        &self.taps
    }

    pub fn kind(&self) -> TapKind {
        self.kind
    }

    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Headroom an input vector needs for this filter
    pub fn history(&self) -> usize {
        self.taps.len() - 1
    }

    /// Input vector of `len` samples with exactly the headroom this filter reads
    pub fn allocate_input(&self, len: usize) -> SigprocResult<ComplexVector<'static, T>> {
        ComplexVector::allocate(len, self.history(), VectorFlags::NONE)
    }

    /// Filter `input` into `output`, returning the number of samples written
    pub fn filter(
        &self,
        input: &ComplexVector<'_, T>,
        output: &mut ComplexVector<'_, T>,
    ) -> SigprocResult<usize> {
        match self.kind {
            TapKind::Real => convolve(input, &self.taps, output),
            TapKind::Complex => convolve_complex(input, &self.taps, output),
        }
    }

    /// One output sample aligned with input position `index`
    pub fn filter_single(
        &self,
        input: &ComplexVector<'_, T>,
        index: usize,
    ) -> SigprocResult<Complex<T>> {
        match self.kind {
            TapKind::Real => convolve_single(input, index, &self.taps),
            TapKind::Complex => convolve_complex_single(input, index, &self.taps),
        }
    }

    /// Filter one block of a continuous stream
    ///
    /// After filtering, the block's tail moves into the input's headroom so
    /// the caller can write the next block straight into `input`.
    pub fn filter_stream(
        &self,
        input: &mut ComplexVector<'_, T>,
        output: &mut ComplexVector<'_, T>,
    ) -> SigprocResult<usize> {
        let written = self.filter(input, output)?;
        input.retain_history();
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    const RATE: f64 = 48000.0;

    fn tone(freq: f64, len: usize, history: usize) -> ComplexVector<'static, f32> {
        let mut input = ComplexVector::allocate(len, history, VectorFlags::NONE).unwrap();
        let total = (history + len) as isize;
        for n in 0..total {
            let phase = 2.0 * PI * freq * n as f64 / RATE;
            let sample = Complex32::new(phase.cos() as f32, phase.sin() as f32);
            let index = n - history as isize;
            if index < 0 {
                input.headroom_mut()[n as usize] = sample;
            } else {
                input.as_mut_slice()[index as usize] = sample;
            }
        }
        input
    }

    fn peak_magnitude(filter: &FirFilter<f32>, input: &ComplexVector<'_, f32>) -> f32 {
        let mut out = ComplexVector::allocate(input.len(), 0, VectorFlags::NONE).unwrap();
        filter.filter(input, &mut out).unwrap();
        out.as_slice().iter().map(|s| s.norm()).fold(0.0, f32::max)
    }

    #[test]
    fn lowpass_passes_dc() {
        let filter = FirFilter::<f32>::lowpass(1000.0, RATE, 63).unwrap();
        assert_eq!(filter.kind(), TapKind::Real);
        assert!(filter.taps().is_real_only());

        let mut input = filter.allocate_input(16).unwrap();
        input.headroom_mut().fill(Complex32::new(1.0, -1.0));
        input.as_mut_slice().fill(Complex32::new(1.0, -1.0));
        let mut out = ComplexVector::allocate(16, 0, VectorFlags::NONE).unwrap();
        filter.filter(&input, &mut out).unwrap();

        for s in out.as_slice() {
            assert!((s - Complex32::new(1.0, -1.0)).norm() < 0.01, "got {s}");
        }
    }

    #[test]
    fn lowpass_coefficients_normalized() {
        let filter = FirFilter::<f64>::lowpass(1000.0, RATE, 63).unwrap();
        let sum: f64 = filter.taps().as_slice().iter().map(|t| t.re).sum();
        assert!((sum - 1.0).abs() < 1e-9, "Coefficients should sum to 1, got {sum}");
    }

    #[test]
    fn lowpass_attenuates_high_frequency() {
        let filter = FirFilter::<f32>::lowpass(500.0, RATE, 127).unwrap();
        let input = tone(10000.0, 1000, filter.history());
        let peak = peak_magnitude(&filter, &input);
        assert!(peak < 0.05, "10 kHz should be attenuated, got {peak}");
    }

    #[test]
    fn lowpass_rejects_bad_parameters() {
        assert!(matches!(
            FirFilter::<f32>::lowpass(1000.0, RATE, 0),
            Err(SigprocError::InvalidParameter(_))
        ));
        assert!(matches!(
            FirFilter::<f32>::lowpass(30000.0, RATE, 63),
            Err(SigprocError::InvalidParameter(_))
        ));
        assert!(matches!(
            FirFilter::<f32>::lowpass(-5.0, RATE, 63),
            Err(SigprocError::InvalidParameter(_))
        ));
    }

    #[test]
    fn complex_bandpass_selects_positive_frequency() {
        let filter = FirFilter::<f32>::complex_bandpass(6000.0, 2000.0, RATE, 127).unwrap();
        assert_eq!(filter.kind(), TapKind::Complex);

        let wanted = peak_magnitude(&filter, &tone(6000.0, 1000, filter.history()));
        let mirror = peak_magnitude(&filter, &tone(-6000.0, 1000, filter.history()));

        assert!(wanted > 0.9 && wanted < 1.1, "+6 kHz should pass, got {wanted}");
        assert!(mirror < 0.05, "-6 kHz should be rejected, got {mirror}");
    }

    #[test]
    fn new_rejects_empty_taps() {
        let taps = ComplexVector::<f32>::from_real_taps(&[]).unwrap();
        assert!(matches!(
            FirFilter::new(taps),
            Err(SigprocError::InvalidLength { arg: "taps", .. })
        ));
    }

    #[test]
    fn filter_single_agrees_with_filter() {
        let filter = FirFilter::<f32>::lowpass(3000.0, RATE, 16).unwrap();
        let input = tone(1500.0, 64, filter.history());
        let mut out = ComplexVector::allocate(64, 0, VectorFlags::NONE).unwrap();
        filter.filter(&input, &mut out).unwrap();

        for index in [0, 1, 17, 63] {
            let single = filter.filter_single(&input, index).unwrap();
            assert!((single - out.as_slice()[index]).norm() < 1e-5);
        }
    }

    #[test]
    fn filter_stream_carries_history_between_blocks() {
        let filter = FirFilter::<f32>::lowpass(2000.0, RATE, 24).unwrap();
        let whole = tone(700.0, 96, filter.history());
        let mut reference = ComplexVector::allocate(96, 0, VectorFlags::NONE).unwrap();
        filter.filter(&whole, &mut reference).unwrap();

        let mut block = filter.allocate_input(32).unwrap();
        block
            .headroom_mut()
            .copy_from_slice(whole.headroom_slice());
        let mut out = ComplexVector::allocate(32, 0, VectorFlags::NONE).unwrap();

        for chunk in 0..3 {
            let range = chunk * 32..(chunk + 1) * 32;
            block.copy_from_slice(&whole.as_slice()[range.clone()]).unwrap();
            filter.filter_stream(&mut block, &mut out).unwrap();
            for (got, want) in out.as_slice().iter().zip(&reference.as_slice()[range]) {
                assert!((got - want).norm() < 1e-5);
            }
        }
    }
}
