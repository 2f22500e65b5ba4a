//! Hardware capability detection and the byte-granularity lane-shift
//! primitives shared by the codec kernels.
//!
//! Everything here operates on a single 128-bit lane. The public shift
//! functions pick a hardware byte-shift instruction when the target has one
//! and otherwise fall back to a table-driven byte gather; the two paths are
//! bit-identical and the fallback stays available for testing on every
//! platform.

use std::sync::OnceLock;

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86;

//==================================================================================
// 1. Runtime capability detection
//==================================================================================

/// Vector width available at runtime, probed once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SimdLevel {
    /// No usable vector unit; every kernel runs its scalar reference.
    Scalar,
    /// 128-bit lanes (SSSE3 + SSE4.1 on x86_64).
    V128,
    /// 256-bit lanes (AVX2) for the order-1 transforms.
    V256,
}

/// Query the vector width once; subsequent calls are a cached load.
pub fn detect() -> SimdLevel {
    static LEVEL: OnceLock<SimdLevel> = OnceLock::new();
    *LEVEL.get_or_init(|| {
        let level = probe();
        log::debug!("simd level selected: {:?}", level);
        level
    })
}

fn probe() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        let v128 = is_x86_feature_detected!("ssse3") && is_x86_feature_detected!("sse4.1");
        if v128 && is_x86_feature_detected!("avx2") {
            return SimdLevel::V256;
        }
        if v128 {
            return SimdLevel::V128;
        }
    }
    SimdLevel::Scalar
}

//==================================================================================
// 2. Lane shifts (left/right by 0-15 bytes, zero-filling)
//==================================================================================

/// Index value meaning "fill this byte with zero" in a gather mask, matching
/// the high-bit convention of the hardware byte-shuffle instructions.
pub(crate) const ZERO_FILL: u8 = 0x80;

/// Shift all 16 bytes of `lane` towards higher indices by `k`, filling with
/// zeros. `k >= 16` clears the lane.
#[inline]
pub fn shift_left_bytes(lane: [u8; 16], k: usize) -> [u8; 16] {
    if k >= 16 {
        return [0; 16];
    }
    #[cfg(target_arch = "x86_64")]
    {
        // SSE2 is part of the x86_64 baseline.
        unsafe { x86::shl_bytes_hw(lane, k) }
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        shift_left_bytes_fallback(lane, k)
    }
}

/// Shift all 16 bytes of `lane` towards lower indices by `k`, filling with
/// zeros. `k >= 16` clears the lane.
#[inline]
pub fn shift_right_bytes(lane: [u8; 16], k: usize) -> [u8; 16] {
    if k >= 16 {
        return [0; 16];
    }
    #[cfg(target_arch = "x86_64")]
    {
        unsafe { x86::shr_bytes_hw(lane, k) }
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        shift_right_bytes_fallback(lane, k)
    }
}

/// Table-driven rendition of [`shift_left_bytes`]. Public only so the
/// equivalence tests can hold it against the hardware path on platforms
/// that have one; prefer [`shift_left_bytes`].
pub fn shift_left_bytes_fallback(lane: [u8; 16], k: usize) -> [u8; 16] {
    shuffle_gather(lane, SHL_MASKS[k % 16])
}

/// Table-driven rendition of [`shift_right_bytes`]; prefer
/// [`shift_right_bytes`].
pub fn shift_right_bytes_fallback(lane: [u8; 16], k: usize) -> [u8; 16] {
    shuffle_gather(lane, SHR_MASKS[k % 16])
}

/// Byte gather with hardware shuffle semantics: an index with the high bit
/// set yields zero, otherwise the low four bits select a source byte.
pub(crate) fn shuffle_gather(lane: [u8; 16], mask: [u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    let mut j = 0;
    while j < 16 {
        if mask[j] & 0x80 == 0 {
            out[j] = lane[(mask[j] & 0x0F) as usize];
        }
        j += 1;
    }
    out
}

// Every out-of-range slot uses ZERO_FILL; no other sentinel is valid.
const fn build_shl_masks() -> [[u8; 16]; 16] {
    let mut table = [[0u8; 16]; 16];
    let mut k = 0;
    while k < 16 {
        let mut j = 0;
        while j < 16 {
            table[k][j] = if j >= k { (j - k) as u8 } else { ZERO_FILL };
            j += 1;
        }
        k += 1;
    }
    table
}

const fn build_shr_masks() -> [[u8; 16]; 16] {
    let mut table = [[0u8; 16]; 16];
    let mut k = 0;
    while k < 16 {
        let mut j = 0;
        while j < 16 {
            table[k][j] = if j + k < 16 { (j + k) as u8 } else { ZERO_FILL };
            j += 1;
        }
        k += 1;
    }
    table
}

pub(crate) const SHL_MASKS: [[u8; 16]; 16] = build_shl_masks();
pub(crate) const SHR_MASKS: [[u8; 16]; 16] = build_shr_masks();

//==================================================================================
// 3. Unit Tests
//==================================================================================
