//! x86_64 vector kernels: hardware byte shifts for the 128-bit lane
//! primitives and the SSE2/AVX2 variants of the difference and prefix-sum
//! transforms.
//!
//! Every function here has a scalar twin in `kernels::delta` (or in
//! `simd::shuffle_gather` for the shifts) and the test suites hold the pair
//! to exact equality. Callers go through the dispatch functions; nothing in
//! this module is reachable without the matching CPU feature having been
//! detected, except the SSE2 baseline which x86_64 always carries.

#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;

//==================================================================================
// 1. Hardware lane shifts (SSE2 baseline)
//==================================================================================

/// `_mm_slli_si128` wants its immediate at compile time; fan the runtime
/// byte count out over the sixteen constants.
///
/// # Safety
/// SSE2 is part of the x86_64 baseline, so this is callable on any x86_64.
#[inline]
pub(crate) unsafe fn shl_bytes_hw(lane: [u8; 16], k: usize) -> [u8; 16] {
    let v = _mm_loadu_si128(lane.as_ptr() as *const __m128i);
    let shifted = match k {
        0 => v,
        1 => _mm_slli_si128::<1>(v),
        2 => _mm_slli_si128::<2>(v),
        3 => _mm_slli_si128::<3>(v),
        4 => _mm_slli_si128::<4>(v),
        5 => _mm_slli_si128::<5>(v),
        6 => _mm_slli_si128::<6>(v),
        7 => _mm_slli_si128::<7>(v),
        8 => _mm_slli_si128::<8>(v),
        9 => _mm_slli_si128::<9>(v),
        10 => _mm_slli_si128::<10>(v),
        11 => _mm_slli_si128::<11>(v),
        12 => _mm_slli_si128::<12>(v),
        13 => _mm_slli_si128::<13>(v),
        14 => _mm_slli_si128::<14>(v),
        15 => _mm_slli_si128::<15>(v),
        _ => _mm_setzero_si128(),
    };
    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, shifted);
    out
}

/// Runtime-count `_mm_srli_si128`, same scheme as [`shl_bytes_hw`].
///
/// # Safety
/// SSE2 is part of the x86_64 baseline, so this is callable on any x86_64.
#[inline]
pub(crate) unsafe fn shr_bytes_hw(lane: [u8; 16], k: usize) -> [u8; 16] {
    let v = _mm_loadu_si128(lane.as_ptr() as *const __m128i);
    let shifted = match k {
        0 => v,
        1 => _mm_srli_si128::<1>(v),
        2 => _mm_srli_si128::<2>(v),
        3 => _mm_srli_si128::<3>(v),
        4 => _mm_srli_si128::<4>(v),
        5 => _mm_srli_si128::<5>(v),
        6 => _mm_srli_si128::<6>(v),
        7 => _mm_srli_si128::<7>(v),
        8 => _mm_srli_si128::<8>(v),
        9 => _mm_srli_si128::<9>(v),
        10 => _mm_srli_si128::<10>(v),
        11 => _mm_srli_si128::<11>(v),
        12 => _mm_srli_si128::<12>(v),
        13 => _mm_srli_si128::<13>(v),
        14 => _mm_srli_si128::<14>(v),
        15 => _mm_srli_si128::<15>(v),
        _ => _mm_setzero_si128(),
    };
    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, shifted);
    out
}

//==================================================================================
// 2. Order-1 difference / prefix sum, 128-bit
//==================================================================================

/// In-place order-1 forward difference over 4-lane groups.
///
/// Each group subtracts its one-lane-left neighbour; the group's first lane
/// subtracts the previous group's last lane, carried in a vector that holds
/// that value in lane 0 and zeros elsewhere.
///
/// # Safety
/// Requires SSE2 (x86_64 baseline).
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn delta1_sse2(data: &mut [u32]) {
    let chunks = data.len() / 4;
    let mut prev = _mm_setzero_si128();
    for c in 0..chunks {
        let ptr = data.as_mut_ptr().add(4 * c);
        let cur = _mm_loadu_si128(ptr as *const __m128i);
        let left = _mm_slli_si128::<4>(cur);
        let diff = _mm_sub_epi32(_mm_sub_epi32(cur, left), prev);
        _mm_storeu_si128(ptr as *mut __m128i, diff);
        prev = _mm_srli_si128::<12>(cur);
    }
    let mut carry = _mm_cvtsi128_si32(prev) as u32;
    for i in chunks * 4..data.len() {
        let next = data[i];
        data[i] = data[i].wrapping_sub(carry);
        carry = next;
    }
}

/// In-place prefix sum (inverse of [`delta1_sse2`]) using the classic
/// shift-and-add carry pattern: two intra-lane byte shifts build the 4-lane
/// cumulative sum, then the previous group's last lane is broadcast in.
///
/// # Safety
/// Requires SSE2 (x86_64 baseline).
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn prefix_sum_sse2(data: &mut [u32]) {
    let chunks = data.len() / 4;
    let mut prev = _mm_setzero_si128();
    for c in 0..chunks {
        let ptr = data.as_mut_ptr().add(4 * c);
        let cur = _mm_loadu_si128(ptr as *const __m128i);
        let tmp1 = _mm_add_epi32(cur, _mm_slli_si128::<4>(cur));
        let tmp2 = _mm_add_epi32(tmp1, _mm_slli_si128::<8>(tmp1));
        prev = _mm_add_epi32(tmp2, _mm_shuffle_epi32::<0xFF>(prev));
        _mm_storeu_si128(ptr as *mut __m128i, prev);
    }
    let mut carry = _mm_cvtsi128_si32(_mm_shuffle_epi32::<0xFF>(prev)) as u32;
    for i in chunks * 4..data.len() {
        data[i] = data[i].wrapping_add(carry);
        carry = data[i];
    }
}

//==================================================================================
// 3. Order-4 difference / inverse, 128-bit
//==================================================================================

/// In-place order-4 forward difference: whole-vector subtraction against the
/// unmodified previous group.
///
/// # Safety
/// Requires SSE2 (x86_64 baseline).
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn delta4_sse2(data: &mut [u32]) {
    if data.len() <= 4 {
        return;
    }
    let mut prev = _mm_loadu_si128(data.as_ptr() as *const __m128i);
    let mut i = 4;
    while i + 4 <= data.len() {
        let ptr = data.as_mut_ptr().add(i);
        let cur = _mm_loadu_si128(ptr as *const __m128i);
        _mm_storeu_si128(ptr as *mut __m128i, _mm_sub_epi32(cur, prev));
        prev = cur;
        i += 4;
    }
    // Tail lanes subtract originals preserved in `prev`, not the freshly
    // written deltas.
    let mut prev_arr = [0u32; 4];
    _mm_storeu_si128(prev_arr.as_mut_ptr() as *mut __m128i, prev);
    let base = i - 4;
    while i < data.len() {
        data[i] = data[i].wrapping_sub(prev_arr[i - 4 - base]);
        i += 1;
    }
}

/// In-place order-4 inverse (4-lane running sum).
///
/// # Safety
/// Requires SSE2 (x86_64 baseline).
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn undelta4_sse2(data: &mut [u32]) {
    if data.len() <= 4 {
        return;
    }
    let mut prev = _mm_loadu_si128(data.as_ptr() as *const __m128i);
    let mut i = 4;
    while i + 4 <= data.len() {
        let ptr = data.as_mut_ptr().add(i);
        let cur = _mm_loadu_si128(ptr as *const __m128i);
        prev = _mm_add_epi32(cur, prev);
        _mm_storeu_si128(ptr as *mut __m128i, prev);
        i += 4;
    }
    let mut prev_arr = [0u32; 4];
    _mm_storeu_si128(prev_arr.as_mut_ptr() as *mut __m128i, prev);
    let base = i - 4;
    while i < data.len() {
        data[i] = data[i].wrapping_add(prev_arr[i - 4 - base]);
        i += 1;
    }
}

//==================================================================================
// 4. Order-1 difference / prefix sum, 256-bit
//==================================================================================

/// AVX2 order-1 forward difference over 8-lane groups.
///
/// # Safety
/// Requires AVX2; callers dispatch on [`crate::simd::detect`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn delta1_avx2(data: &mut [u32]) {
    let chunks = data.len() / 8;
    let zero = _mm256_setzero_si256();
    let rotate_down = _mm256_setr_epi32(0, 0, 1, 2, 3, 4, 5, 6);
    let last = _mm256_set1_epi32(7);
    let mut prev = zero;
    for c in 0..chunks {
        let ptr = data.as_mut_ptr().add(8 * c);
        let cur = _mm256_loadu_si256(ptr as *const __m256i);
        let shifted = _mm256_blend_epi32::<0x01>(_mm256_permutevar8x32_epi32(cur, rotate_down), zero);
        let diff = _mm256_sub_epi32(_mm256_sub_epi32(cur, shifted), prev);
        _mm256_storeu_si256(ptr as *mut __m256i, diff);
        prev = _mm256_blend_epi32::<0xFE>(_mm256_permutevar8x32_epi32(cur, last), zero);
    }
    let mut carry = _mm_cvtsi128_si32(_mm256_castsi256_si128(prev)) as u32;
    for i in chunks * 8..data.len() {
        let next = data[i];
        data[i] = data[i].wrapping_sub(carry);
        carry = next;
    }
}

/// AVX2 prefix sum: per-half shift-and-add, then the low half's total is
/// folded into the high half before the running carry is broadcast in.
///
/// # Safety
/// Requires AVX2; callers dispatch on [`crate::simd::detect`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn prefix_sum_avx2(data: &mut [u32]) {
    let chunks = data.len() / 8;
    let zero = _mm256_setzero_si256();
    let lane3 = _mm256_set1_epi32(3);
    let lane7 = _mm256_set1_epi32(7);
    let mut carry = zero;
    for c in 0..chunks {
        let ptr = data.as_mut_ptr().add(8 * c);
        let mut x = _mm256_loadu_si256(ptr as *const __m256i);
        x = _mm256_add_epi32(x, _mm256_slli_si256::<4>(x));
        x = _mm256_add_epi32(x, _mm256_slli_si256::<8>(x));
        let spill = _mm256_blend_epi32::<0x0F>(_mm256_permutevar8x32_epi32(x, lane3), zero);
        x = _mm256_add_epi32(x, spill);
        x = _mm256_add_epi32(x, carry);
        _mm256_storeu_si256(ptr as *mut __m256i, x);
        carry = _mm256_permutevar8x32_epi32(x, lane7);
    }
    let mut carry = _mm_cvtsi128_si32(_mm256_castsi256_si128(carry)) as u32;
    for i in chunks * 8..data.len() {
        data[i] = data[i].wrapping_add(carry);
        carry = data[i];
    }
}
