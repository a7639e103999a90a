//! Headroom-aware complex sample buffers
//!
//! A `ComplexVector` is one contiguous run of samples split into two regions:
//!
//! ```text
//! storage: [ h h h h | d d d d d d d d ]
//!            headroom   logical data
//!                     ^ index 0
//! ```
//!
//! The headroom holds history that convolution reads at negative indices,
//! so a filter can run over a block without copying the previous block's
//! tail in front of it.

use num_complex::Complex;
use rustfft::FftNum;

use crate::domain::{SigprocError, SigprocResult, VectorFlags};

pub(crate) fn zero<T: FftNum>() -> Complex<T> {
    Complex::new(T::zero(), T::zero())
}

#[derive(Debug)]
enum Storage<'a, T> {
    Owned(Vec<Complex<T>>),
    Borrowed(&'a mut [Complex<T>]),
}

impl<T> Storage<'_, T> {
    fn as_slice(&self) -> &[Complex<T>] {
        match self {
            Storage::Owned(v) => v,
            Storage::Borrowed(s) => s,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [Complex<T>] {
        match self {
            Storage::Owned(v) => v,
            Storage::Borrowed(s) => s,
        }
    }
}

/// Complex sample buffer with explicit headroom
///
/// `len`, `headroom` and `flags` are fixed at construction. Only sample
/// values change afterwards.
#[derive(Debug)]
pub struct ComplexVector<'a, T = f32> {
    storage: Storage<'a, T>,
    headroom: usize,
    len: usize,
    flags: VectorFlags,
}

impl<T: FftNum> ComplexVector<'static, T> {
    /// Allocate `headroom + len` zeroed samples
    pub fn allocate(len: usize, headroom: usize, flags: VectorFlags) -> SigprocResult<Self> {
        if flags.contains(VectorFlags::BORROWED) {
            return Err(SigprocError::InvalidFormat(
                "allocated vectors own their storage and cannot be flagged BORROWED".to_string(),
            ));
        }

        let total = headroom
            .checked_add(len)
            .ok_or(SigprocError::Allocation { requested: usize::MAX })?;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(total)
            .map_err(|_| SigprocError::Allocation { requested: total })?;
        storage.resize(total, zero());

        Ok(Self {
            storage: Storage::Owned(storage),
            headroom,
            len,
            flags,
        })
    }

    /// Complex vector holding a copy of `samples`, preceded by `headroom` zeros
    pub fn from_samples(samples: &[Complex<T>], headroom: usize) -> SigprocResult<Self> {
        let mut vector = Self::allocate(samples.len(), headroom, VectorFlags::NONE)?;
        vector.as_mut_slice().copy_from_slice(samples);
        Ok(vector)
    }

    /// Real-only tap vector from coefficients already in engine order
    ///
    /// Engine order is time-reversed: the last coefficient multiplies the
    /// newest sample.
    pub fn from_real_taps(coeffs: &[T]) -> SigprocResult<Self> {
        let mut taps = Self::allocate(coeffs.len(), 0, VectorFlags::REAL_ONLY)?;
        for (tap, &c) in taps.as_mut_slice().iter_mut().zip(coeffs) {
            *tap = Complex::new(c, T::zero());
        }
        Ok(taps)
    }

    /// Real-only tap vector from a classic impulse response `h[0..L]`
    ///
    /// `h[0]` applies to the newest sample, so the coefficients are stored
    /// reversed.
    pub fn from_classic_taps(coeffs: &[T]) -> SigprocResult<Self> {
        let reversed: Vec<T> = coeffs.iter().rev().copied().collect();
        Self::from_real_taps(&reversed)
    }

    /// Complex tap vector from coefficients already in engine order
    pub fn from_complex_taps(coeffs: &[Complex<T>]) -> SigprocResult<Self> {
        Self::from_samples(coeffs, 0)
    }
}

impl<'a, T: FftNum> ComplexVector<'a, T> {
    /// Aliasing view over a caller-owned buffer
    ///
    /// The first `headroom` samples of `storage` become history, the rest the
    /// logical data. The view never frees the buffer.
    pub fn wrap(
        storage: &'a mut [Complex<T>],
        headroom: usize,
        flags: VectorFlags,
    ) -> SigprocResult<Self> {
        if headroom > storage.len() {
            return Err(SigprocError::InvalidLength {
                arg: "headroom",
                expected: storage.len(),
                got: headroom,
            });
        }
        let len = storage.len() - headroom;
        Ok(Self {
            storage: Storage::Borrowed(storage),
            headroom,
            len,
            flags: flags | VectorFlags::BORROWED,
        })
    }

    /// Release owned storage
    ///
    /// Fails with [`SigprocError::NotOwner`] for a view created by
    /// [`ComplexVector::wrap`]; the borrowed buffer stays with its owner.
    pub fn release(self) -> SigprocResult<()> {
        match self.storage {
            Storage::Owned(samples) => {
                drop(samples);
                Ok(())
            }
            Storage::Borrowed(_) => Err(SigprocError::NotOwner),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn headroom(&self) -> usize {
        self.headroom
    }

    pub fn flags(&self) -> VectorFlags {
        self.flags
    }

    pub fn is_real_only(&self) -> bool {
        self.flags.is_real_only()
    }

    pub fn owns_storage(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Logical data, index 0 onwards
    pub fn as_slice(&self) -> &[Complex<T>] {
        &self.storage.as_slice()[self.headroom..]
    }

    pub fn as_mut_slice(&mut self) -> &mut [Complex<T>] {
        let headroom = self.headroom;
        &mut self.storage.as_mut_slice()[headroom..]
    }

    /// History region preceding index 0, oldest sample first
    pub fn headroom_slice(&self) -> &[Complex<T>] {
        &self.storage.as_slice()[..self.headroom]
    }

    pub fn headroom_mut(&mut self) -> &mut [Complex<T>] {
        let headroom = self.headroom;
        &mut self.storage.as_mut_slice()[..headroom]
    }

    /// Logical data preceded by its `history` newest headroom samples
    pub fn with_history(&self, history: usize) -> SigprocResult<&[Complex<T>]> {
        if history > self.headroom {
            return Err(SigprocError::InvalidLength {
                arg: "headroom",
                expected: history,
                got: self.headroom,
            });
        }
        Ok(&self.storage.as_slice()[self.headroom - history..])
    }

    /// Bounds-checked read; negative indices reach into the headroom
    pub fn get(&self, index: isize) -> Option<Complex<T>> {
        let position = if index < 0 {
            self.headroom.checked_sub(index.unsigned_abs())?
        } else {
            let forward = index as usize;
            if forward >= self.len {
                return None;
            }
            self.headroom + forward
        };
        self.storage.as_slice().get(position).copied()
    }

    /// Fill the logical data from `src`
    pub fn copy_from_slice(&mut self, src: &[Complex<T>]) -> SigprocResult<()> {
        if src.len() != self.len {
            return Err(SigprocError::InvalidLength {
                arg: "src",
                expected: self.len,
                got: src.len(),
            });
        }
        self.as_mut_slice().copy_from_slice(src);
        Ok(())
    }

    /// Zero the logical data, leaving the headroom intact
    pub fn reset(&mut self) {
        self.as_mut_slice().fill(zero());
    }

    pub fn reset_history(&mut self) {
        self.headroom_mut().fill(zero());
    }

    /// Move the newest `headroom` samples into the headroom
    ///
    /// After this call the vector is ready to receive the next block: index
    /// `-1` holds the previous block's last sample. When the block is shorter
    /// than the headroom, older history shifts down to fill the gap.
    pub fn retain_history(&mut self) {
        let (headroom, len) = (self.headroom, self.len);
        if headroom == 0 {
            return;
        }
        self.storage
            .as_mut_slice()
            .copy_within(len..len + headroom, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    fn c(re: f32, im: f32) -> Complex32 {
        Complex32::new(re, im)
    }

    #[test]
    fn allocate_offsets_data_past_headroom() {
        let vector = ComplexVector::<f32>::allocate(8, 3, VectorFlags::NONE).unwrap();
        assert_eq!(vector.len(), 8);
        assert_eq!(vector.headroom(), 3);
        assert_eq!(vector.as_slice().len(), 8);
        assert_eq!(vector.headroom_slice().len(), 3);
        assert!(vector.owns_storage());
        assert!(vector.as_slice().iter().all(|s| *s == c(0.0, 0.0)));
    }

    #[test]
    fn allocate_reports_overflowing_request() {
        let err = ComplexVector::<f32>::allocate(usize::MAX, 1, VectorFlags::NONE).unwrap_err();
        assert!(matches!(err, SigprocError::Allocation { .. }));
    }

    #[test]
    fn allocate_reports_unsatisfiable_request() {
        let err = ComplexVector::<f32>::allocate(usize::MAX / 2, 0, VectorFlags::NONE).unwrap_err();
        assert!(matches!(err, SigprocError::Allocation { .. }));
    }

    #[test]
    fn allocate_rejects_borrowed_flag() {
        let err = ComplexVector::<f32>::allocate(4, 0, VectorFlags::BORROWED).unwrap_err();
        assert!(matches!(err, SigprocError::InvalidFormat(_)));
    }

    #[test]
    fn negative_indices_read_headroom() {
        let mut vector = ComplexVector::<f32>::allocate(2, 2, VectorFlags::NONE).unwrap();
        vector.headroom_mut().copy_from_slice(&[c(1.0, 0.0), c(2.0, 0.0)]);
        vector.as_mut_slice().copy_from_slice(&[c(3.0, 0.0), c(4.0, 0.0)]);

        assert_eq!(vector.get(-2), Some(c(1.0, 0.0)));
        assert_eq!(vector.get(-1), Some(c(2.0, 0.0)));
        assert_eq!(vector.get(0), Some(c(3.0, 0.0)));
        assert_eq!(vector.get(1), Some(c(4.0, 0.0)));
        assert_eq!(vector.get(-3), None);
        assert_eq!(vector.get(2), None);
    }

    #[test]
    fn with_history_checks_headroom() {
        let vector = ComplexVector::<f32>::allocate(4, 2, VectorFlags::NONE).unwrap();
        assert_eq!(vector.with_history(2).unwrap().len(), 6);
        assert_eq!(vector.with_history(0).unwrap().len(), 4);
        assert!(vector.with_history(3).is_err());
    }

    #[test]
    fn classic_taps_are_reversed() {
        let taps = ComplexVector::from_classic_taps(&[1.0f32, 2.0, 3.0]).unwrap();
        assert!(taps.is_real_only());
        let re: Vec<f32> = taps.as_slice().iter().map(|t| t.re).collect();
        assert_eq!(re, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn wrap_creates_borrowed_view() {
        let mut buffer = vec![c(0.0, 0.0); 6];
        let view = ComplexVector::wrap(&mut buffer, 2, VectorFlags::NONE).unwrap();
        assert_eq!(view.len(), 4);
        assert_eq!(view.headroom(), 2);
        assert!(view.flags().contains(VectorFlags::BORROWED));
        assert!(!view.owns_storage());
        assert_eq!(view.release(), Err(SigprocError::NotOwner));
        // The buffer is still usable by its owner
        assert_eq!(buffer.len(), 6);
    }

    #[test]
    fn wrap_rejects_headroom_past_buffer() {
        let mut buffer = vec![c(0.0, 0.0); 2];
        assert!(ComplexVector::wrap(&mut buffer, 3, VectorFlags::NONE).is_err());
    }

    #[test]
    fn release_frees_owned_storage() {
        let vector = ComplexVector::<f64>::allocate(16, 4, VectorFlags::NONE).unwrap();
        assert!(vector.release().is_ok());
    }

    #[test]
    fn retain_history_carries_block_tail() {
        let mut vector = ComplexVector::<f32>::allocate(4, 2, VectorFlags::NONE).unwrap();
        vector
            .copy_from_slice(&[c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0), c(4.0, 0.0)])
            .unwrap();
        vector.retain_history();
        assert_eq!(vector.headroom_slice(), &[c(3.0, 0.0), c(4.0, 0.0)]);
    }

    #[test]
    fn retain_history_with_short_block_keeps_older_history() {
        let mut vector = ComplexVector::<f32>::allocate(1, 3, VectorFlags::NONE).unwrap();
        vector
            .headroom_mut()
            .copy_from_slice(&[c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0)]);
        vector.copy_from_slice(&[c(4.0, 0.0)]).unwrap();
        vector.retain_history();
        assert_eq!(
            vector.headroom_slice(),
            &[c(2.0, 0.0), c(3.0, 0.0), c(4.0, 0.0)]
        );
    }

    #[test]
    fn reset_leaves_headroom_alone() {
        let mut vector = ComplexVector::from_samples(&[c(1.0, 1.0), c(2.0, 2.0)], 1).unwrap();
        vector.headroom_mut()[0] = c(9.0, 9.0);
        vector.reset();
        assert!(vector.as_slice().iter().all(|s| *s == c(0.0, 0.0)));
        assert_eq!(vector.get(-1), Some(c(9.0, 9.0)));
        vector.reset_history();
        assert_eq!(vector.get(-1), Some(c(0.0, 0.0)));
    }

    #[test]
    fn copy_from_slice_rejects_length_mismatch() {
        let mut vector = ComplexVector::<f32>::allocate(3, 0, VectorFlags::NONE).unwrap();
        let err = vector.copy_from_slice(&[c(1.0, 0.0)]).unwrap_err();
        assert_eq!(
            err,
            SigprocError::InvalidLength {
                arg: "src",
                expected: 3,
                got: 1
            }
        );
    }
}
