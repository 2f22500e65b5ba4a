//! This module contains the pure, stateless kernels for differencing and
//! prefix summing integer buffers in place.
//!
//! The transforms come in two orders: order-1 (each value differenced
//! against its immediate predecessor) and order-4 (against the value four
//! positions back, the lane stride of the 128-bit codecs). The generic
//! scalar engine is the reference implementation; the `u32` entry points
//! dispatch to a vectorized variant when [`crate::simd::detect`] reports
//! the hardware for it, and every variant must agree with the engine
//! exactly. All arithmetic wraps, so the transforms are total over
//! non-monotonic input.

use num_traits::{PrimInt, WrappingAdd, WrappingSub};

use crate::simd::{self, SimdLevel};

//==================================================================================
// 1. Generic Core Logic (The "Engine" - In-Place & Performant)
//==================================================================================

/// Performs forward differencing **in-place** on a mutable slice.
///
/// Iterates backwards so every subtraction sees original values:
/// `data[i] = data[i] - data[i - order]`.
pub(crate) fn diff_slice_inplace<T>(data: &mut [T], order: usize)
where
    T: PrimInt + WrappingSub,
{
    if data.len() <= order {
        return;
    }
    for i in (order..data.len()).rev() {
        data[i] = data[i].wrapping_sub(&data[i - order]);
    }
}

/// Reconstructs original values from a difference stream **in-place**.
///
/// Iterates forwards so every addition sees already-reconstructed values:
/// `data[i] = data[i] + data[i - order]`.
pub(crate) fn undiff_slice_inplace<T>(data: &mut [T], order: usize)
where
    T: PrimInt + WrappingAdd,
{
    if data.len() <= order {
        return;
    }
    for i in order..data.len() {
        data[i] = data[i].wrapping_add(&data[i - order]);
    }
}

//==================================================================================
// 2. Public API (u32, runtime-dispatched)
//==================================================================================

/// Order-1 forward difference, in place. `data[0]` keeps its value.
pub fn delta1(data: &mut [u32]) {
    match simd::detect() {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::V256 => unsafe { simd::x86::delta1_avx2(data) },
        #[cfg(target_arch = "x86_64")]
        SimdLevel::V128 => unsafe { simd::x86::delta1_sse2(data) },
        _ => diff_slice_inplace(data, 1),
    }
}

/// Order-1 inverse difference (cumulative sum), in place.
pub fn undelta1(data: &mut [u32]) {
    match simd::detect() {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::V256 => unsafe { simd::x86::prefix_sum_avx2(data) },
        #[cfg(target_arch = "x86_64")]
        SimdLevel::V128 => unsafe { simd::x86::prefix_sum_sse2(data) },
        _ => undiff_slice_inplace(data, 1),
    }
}

/// Vectorized cumulative sum, in place. Identical to [`undelta1`]; exposed
/// under the name callers reach for when the buffer was never differenced.
pub fn prefix_sum(data: &mut [u32]) {
    undelta1(data);
}

/// Order-4 forward difference, in place. A buffer of 4 or fewer values is
/// left untouched.
pub fn delta4(data: &mut [u32]) {
    if data.len() <= 4 {
        return;
    }
    match simd::detect() {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::V128 | SimdLevel::V256 => unsafe { simd::x86::delta4_sse2(data) },
        _ => diff_slice_inplace(data, 4),
    }
}

/// Order-4 inverse difference, in place.
pub fn undelta4(data: &mut [u32]) {
    if data.len() <= 4 {
        return;
    }
    match simd::detect() {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::V128 | SimdLevel::V256 => unsafe { simd::x86::undelta4_sse2(data) },
        _ => undiff_slice_inplace(data, 4),
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_engine_order1_known_values() {
        let mut data: Vec<u32> = vec![100, 110, 115, 112, 122];
        diff_slice_inplace(&mut data, 1);
        // 112 - 115 wraps.
        assert_eq!(data, vec![100, 10, 5, 3u32.wrapping_neg(), 10]);
        undiff_slice_inplace(&mut data, 1);
        assert_eq!(data, vec![100, 110, 115, 112, 122]);
    }

    #[test]
    fn test_engine_order4_reads_originals() {
        // Forward differencing must see original values at i-4 even after
        // those slots were rewritten, hence the backward iteration.
        let original: Vec<u32> = (0..12).map(|i| i * i).collect();
        let mut data = original.clone();
        diff_slice_inplace(&mut data, 4);
        for i in 4..original.len() {
            assert_eq!(data[i], original[i].wrapping_sub(original[i - 4]));
        }
        undiff_slice_inplace(&mut data, 4);
        assert_eq!(data, original);
    }

    #[test]
    fn test_tiny_buffers_are_untouched_or_exact() {
        for len in 0..=4 {
            let original: Vec<u32> = (0..len as u32).map(|i| i + 7).collect();
            let mut data = original.clone();
            delta4(&mut data);
            assert_eq!(data, original);

            let mut data = original.clone();
            delta1(&mut data);
            undelta1(&mut data);
            assert_eq!(data, original);
        }
    }

    fn random_buffer(rng: &mut StdRng, len: usize) -> Vec<u32> {
        (0..len).map(|_| rng.random::<u32>()).collect()
    }

    #[test]
    fn test_dispatched_order1_agrees_with_engine() {
        let mut rng = StdRng::seed_from_u64(0x1A7E);
        for len in (0..64usize).chain([255, 1024, 4099]) {
            let original = random_buffer(&mut rng, len);

            let mut dispatched = original.clone();
            delta1(&mut dispatched);
            let mut reference = original.clone();
            diff_slice_inplace(&mut reference, 1);
            assert_eq!(dispatched, reference, "delta1 len {}", len);

            undelta1(&mut dispatched);
            assert_eq!(dispatched, original, "undelta1 len {}", len);

            let mut summed = reference;
            undiff_slice_inplace(&mut summed, 1);
            assert_eq!(summed, original);
        }
    }

    #[test]
    fn test_dispatched_order4_agrees_with_engine() {
        let mut rng = StdRng::seed_from_u64(0x4A7E);
        for len in (0..64usize).chain([129, 2048, 3001]) {
            let original = random_buffer(&mut rng, len);

            let mut dispatched = original.clone();
            delta4(&mut dispatched);
            let mut reference = original.clone();
            diff_slice_inplace(&mut reference, 4);
            assert_eq!(dispatched, reference, "delta4 len {}", len);

            undelta4(&mut dispatched);
            assert_eq!(dispatched, original, "undelta4 len {}", len);
        }
    }

    #[test]
    fn test_prefix_sum_is_inverse_of_delta1() {
        let original: Vec<u32> = vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let mut data = original.clone();
        delta1(&mut data);
        prefix_sum(&mut data);
        assert_eq!(data, original);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_every_available_variant_agrees_with_engine() {
        use crate::simd::x86;

        let mut rng = StdRng::seed_from_u64(0x5EED);
        // Deliberately awkward lengths around the 4- and 8-lane strides.
        for len in [0usize, 1, 3, 4, 5, 7, 8, 9, 15, 16, 17, 31, 33, 100] {
            let original = random_buffer(&mut rng, len);

            let mut reference = original.clone();
            diff_slice_inplace(&mut reference, 1);

            let mut sse = original.clone();
            unsafe { x86::delta1_sse2(&mut sse) };
            assert_eq!(sse, reference, "delta1_sse2 len {}", len);

            unsafe { x86::prefix_sum_sse2(&mut sse) };
            assert_eq!(sse, original, "prefix_sum_sse2 len {}", len);

            if is_x86_feature_detected!("avx2") {
                let mut avx = original.clone();
                unsafe { x86::delta1_avx2(&mut avx) };
                assert_eq!(avx, reference, "delta1_avx2 len {}", len);

                unsafe { x86::prefix_sum_avx2(&mut avx) };
                assert_eq!(avx, original, "prefix_sum_avx2 len {}", len);
            }

            let mut reference4 = original.clone();
            diff_slice_inplace(&mut reference4, 4);
            let mut sse4 = original.clone();
            unsafe { x86::delta4_sse2(&mut sse4) };
            assert_eq!(sse4, reference4, "delta4_sse2 len {}", len);
            unsafe { x86::undelta4_sse2(&mut sse4) };
            assert_eq!(sse4, original, "undelta4_sse2 len {}", len);
        }
    }
}
