//! This module contains the byte-length adaptive codec: StreamVByte with
//! integrated order-1 delta coding.
//!
//! Each value is stored as the wrapping delta from its predecessor, in the
//! smallest of 1-4 little-endian bytes; a 2-bit length code per value is
//! packed four-to-a-key-byte ahead of the data region. Encoding is scalar.
//! Decoding runs a vectorized path on x86_64 that reconstructs 32 values per
//! iteration (an all-one-byte fast path plus a shuffle-table gather for
//! mixed lengths) and hands the running carry to the scalar path for the
//! tail. The block size is 1: any input length is accepted.
//!
//! Format: `[u32 count][ceil(count/4) key bytes][data bytes]`.

use crate::codec::IntCodec;
use crate::error::LanepackError;
use crate::util::ByteReader;

/// StreamVByte with order-1 delta coding.
pub struct StreamVByteD1;

impl IntCodec for StreamVByteD1 {
    const BLOCK_SIZE: usize = 1;

    /// Worst case is 4 data bytes per value, plus the count header and the
    /// key bytes.
    fn max_compressed_len(input: &[u32]) -> usize {
        input.len() * 4 + 4 + input.len().div_ceil(4)
    }

    fn decompressed_len(input: &[u8]) -> Result<usize, LanepackError> {
        Ok(ByteReader::new(input).get_u32_le()? as usize)
    }

    fn encode(input: &[u32], output: &mut [u8]) -> Result<usize, LanepackError> {
        let count = input.len();
        let key_len = count.div_ceil(4);
        if output.len() < 4 + key_len {
            return Err(LanepackError::corrupt(
                "output buffer too small for count header and key bytes",
            ));
        }
        output[..4].copy_from_slice(&(count as u32).to_le_bytes());
        let (keys, data) = output[4..].split_at_mut(key_len);
        keys.fill(0);

        let mut pos = 0usize;
        let mut prev = 0u32;
        for (i, &value) in input.iter().enumerate() {
            let delta = value.wrapping_sub(prev);
            prev = value;
            let len = delta_byte_len(delta);
            let dst = data.get_mut(pos..pos + len).ok_or_else(|| {
                LanepackError::corrupt("output buffer too small for record data")
            })?;
            dst.copy_from_slice(&delta.to_le_bytes()[..len]);
            pos += len;
            keys[i / 4] |= ((len - 1) as u8) << ((i % 4) * 2);
        }
        Ok(4 + key_len + pos)
    }

    fn decode(input: &[u8], output: &mut [u32]) -> Result<usize, LanepackError> {
        let count = Self::decompressed_len(input)?;
        if count == 0 {
            return Ok(0);
        }
        let key_len = count.div_ceil(4);
        let keys = input
            .get(4..4 + key_len)
            .ok_or_else(|| LanepackError::corrupt("key region truncated"))?;
        let data = &input[4 + key_len..];
        if output.len() < count {
            return Err(LanepackError::corrupt(format!(
                "output buffer holds {} values, buffer declares {}",
                output.len(),
                count
            )));
        }
        let out = &mut output[..count];

        let mut decoded = 0usize;
        let mut pos = 0usize;
        let mut prev = 0u32;

        #[cfg(target_arch = "x86_64")]
        if crate::simd::detect() >= crate::simd::SimdLevel::V128 {
            (decoded, pos, prev) = unsafe { vector::decode_groups(keys, data, out) };
            log::trace!("streamvbyte vector path decoded {} of {}", decoded, count);
        }

        decode_scalar(keys, data, out, decoded, pos, prev)?;
        Ok(count)
    }
}

/// Smallest number of little-endian bytes that represents `delta`.
#[inline]
fn delta_byte_len(delta: u32) -> usize {
    if delta < (1 << 8) {
        1
    } else if delta < (1 << 16) {
        2
    } else if delta < (1 << 24) {
        3
    } else {
        4
    }
}

/// Reference decode path: one record at a time, every read bounds-checked.
fn decode_scalar(
    keys: &[u8],
    data: &[u8],
    out: &mut [u32],
    start: usize,
    mut pos: usize,
    mut prev: u32,
) -> Result<(), LanepackError> {
    for i in start..out.len() {
        let code = (keys[i / 4] >> ((i % 4) * 2)) & 0x3;
        let len = code as usize + 1;
        let bytes = data
            .get(pos..pos + len)
            .ok_or_else(|| LanepackError::corrupt("record data truncated"))?;
        let mut delta = 0u32;
        for (j, &byte) in bytes.iter().enumerate() {
            delta |= (byte as u32) << (8 * j);
        }
        pos += len;
        prev = prev.wrapping_add(delta);
        out[i] = prev;
    }
    Ok(())
}

//==================================================================================
// Vectorized decode (x86_64)
//==================================================================================

#[cfg(target_arch = "x86_64")]
mod vector {
    use std::arch::x86_64::*;

    use crate::kernels::svb_tables::{LENGTH_TABLE, SHUFFLE_TABLE};

    /// Decode full groups of 32 values (8 key bytes) while at least 128 data
    /// bytes remain, which keeps every 16-byte load inside the buffer: a
    /// group consumes at most 128 bytes and its furthest load starts within
    /// them. Returns `(values decoded, data bytes consumed, carry)`.
    ///
    /// # Safety
    /// Requires SSSE3 and SSE4.1; callers dispatch on [`crate::simd::detect`].
    #[target_feature(enable = "ssse3", enable = "sse4.1")]
    pub(super) unsafe fn decode_groups(
        keys: &[u8],
        data: &[u8],
        out: &mut [u32],
    ) -> (usize, usize, u32) {
        let count = out.len();
        let mut decoded = 0usize;
        let mut pos = 0usize;
        let mut prev = _mm_setzero_si128();

        while decoded + 32 <= count && data.len() - pos >= 128 {
            let group_keys = &keys[decoded / 4..decoded / 4 + 8];
            let mut or_keys = 0u8;
            for &key in group_keys {
                or_keys |= key;
            }
            if or_keys == 0 {
                // 32 one-byte deltas in a row: skip the tables, widen raw
                // bytes to 16-bit lanes and cumulative-sum eight at a time.
                for half in 0..4 {
                    let raw = _mm_loadl_epi64(data.as_ptr().add(pos + 8 * half) as *const __m128i);
                    let widened = _mm_cvtepu8_epi16(raw);
                    prev = write_eight(out.as_mut_ptr().add(decoded + 8 * half), widened, prev);
                }
                pos += 32;
            } else {
                for quad in 0..8 {
                    let key = group_keys[quad];
                    let gathered = gather_quad(key, data.as_ptr().add(pos));
                    pos += LENGTH_TABLE[key as usize] as usize;
                    prev = write_four(out.as_mut_ptr().add(decoded + 4 * quad), gathered, prev);
                }
            }
            decoded += 32;
        }

        let carry = _mm_cvtsi128_si32(_mm_shuffle_epi32::<0xFF>(prev)) as u32;
        (decoded, pos, carry)
    }

    /// Spread one key byte's four variable-length deltas into 32-bit lanes.
    #[inline]
    unsafe fn gather_quad(key: u8, src: *const u8) -> __m128i {
        let bytes = _mm_loadu_si128(src as *const __m128i);
        let mask = _mm_loadu_si128(SHUFFLE_TABLE[key as usize].as_ptr() as *const __m128i);
        _mm_shuffle_epi8(bytes, mask)
    }

    /// Turn 4 delta lanes into absolute values: two byte shifts build the
    /// intra-group cumulative sum, then the previous group's last value is
    /// broadcast in. Returns the written vector as the next carry.
    #[inline]
    unsafe fn write_four(out: *mut u32, quad: __m128i, prev: __m128i) -> __m128i {
        let prev_last = _mm_shuffle_epi32::<0xFF>(prev);
        let mut vec = _mm_add_epi32(quad, _mm_slli_si128::<4>(quad));
        vec = _mm_add_epi32(vec, _mm_slli_si128::<8>(vec));
        vec = _mm_add_epi32(vec, prev_last);
        _mm_storeu_si128(out as *mut __m128i, vec);
        vec
    }

    /// Same pattern over eight 16-bit delta lanes (the all-one-byte fast
    /// path); the lane sums stay below 8 × 255 so 16-bit adds cannot carry.
    #[inline]
    unsafe fn write_eight(out: *mut u32, deltas: __m128i, prev: __m128i) -> __m128i {
        let prev_last = _mm_shuffle_epi32::<0xFF>(prev);
        let mut vec = _mm_add_epi16(deltas, _mm_slli_si128::<2>(deltas));
        vec = _mm_add_epi16(vec, _mm_slli_si128::<4>(vec));
        let low = _mm_add_epi32(_mm_cvtepu16_epi32(vec), prev_last);
        let widen_high = _mm_setr_epi8(8, 9, -1, -1, 10, 11, -1, -1, 12, 13, -1, -1, 14, 15, -1, -1);
        let high = _mm_add_epi32(_mm_shuffle_epi8(vec, widen_high), low);
        _mm_storeu_si128(out as *mut __m128i, low);
        _mm_storeu_si128(out.add(4) as *mut __m128i, high);
        high
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
