//! This module contains the block bit-packing codec: 128-integer miniblocks
//! packed at the minimum bit width their order-4 deltas need, with the delta
//! carried across miniblocks through a 4-lane offset vector.
//!
//! Miniblocks are grouped 16 to a superblock; each superblock leads with four
//! header words carrying its miniblock bit widths (one byte per width, first
//! width in the most significant byte), followed by the packed data. The
//! packing is vertical: lane `k` of every 4-integer group feeds lane `k` of
//! the output words, low bits first, so a width-`b` miniblock occupies
//! exactly `4 b` words. A trailing partial superblock keeps the full four
//! header words with the unused width slots zero.
//!
//! Format: `[u32 elementCount]` then per superblock
//! `[4 x u32 widthWord][packed miniblocks]`. The codec only accepts input
//! lengths divisible by 128; the composite combinator feeds it the aligned
//! prefix and routes the tail elsewhere.

use crate::codec::IntCodec;
use crate::error::LanepackError;
use crate::util::{ByteReader, ByteWriter};

/// Integers per miniblock, and the codec's block size.
pub(crate) const MINI_BLOCK: usize = 128;
/// Miniblocks per superblock header batch.
const MINIS_PER_SUPER: usize = 16;
/// Integers per full superblock.
const SUPER_BLOCK: usize = MINI_BLOCK * MINIS_PER_SUPER;

/// SIMD-oriented binary packing, 128 integers per block, order-4 delta.
pub struct Bp128D4;

impl IntCodec for Bp128D4 {
    const BLOCK_SIZE: usize = MINI_BLOCK;

    /// Exact worst case: the count header, four width words per (possibly
    /// partial) superblock, and every delta packed at the full 32 bits.
    fn max_compressed_len(input: &[u32]) -> usize {
        4 + input.len().div_ceil(SUPER_BLOCK) * 16 + input.len() * 4
    }

    fn decompressed_len(input: &[u8]) -> Result<usize, LanepackError> {
        Ok(ByteReader::new(input).get_u32_le()? as usize)
    }

    fn encode(input: &[u32], output: &mut [u8]) -> Result<usize, LanepackError> {
        if input.len() % MINI_BLOCK != 0 {
            return Err(LanepackError::InputLength {
                block_size: MINI_BLOCK,
                len: input.len(),
            });
        }
        let mut writer = ByteWriter::new(output);
        writer.put_u32_le(input.len() as u32)?;

        let mut offset = [0u32; 4];
        for super_chunk in input.chunks(SUPER_BLOCK) {
            // Widths are probed with a throwaway copy of the offset vector;
            // packing below replays the identical delta sequence.
            let mut widths = [0u8; MINIS_PER_SUPER];
            let mut probe = offset;
            for (i, mini) in super_chunk.chunks_exact(MINI_BLOCK).enumerate() {
                widths[i] = max_bits(mini, &mut probe) as u8;
            }

            for word in widths.chunks_exact(4) {
                let packed = u32::from(word[0]) << 24
                    | u32::from(word[1]) << 16
                    | u32::from(word[2]) << 8
                    | u32::from(word[3]);
                writer.put_u32_le(packed)?;
            }
            for (i, mini) in super_chunk.chunks_exact(MINI_BLOCK).enumerate() {
                pack_block(mini, u32::from(widths[i]), &mut offset, &mut writer)?;
            }
        }
        log::trace!(
            "bp128 encoded {} ints into {} bytes",
            input.len(),
            writer.written()
        );
        Ok(writer.written())
    }

    fn decode(input: &[u8], output: &mut [u32]) -> Result<usize, LanepackError> {
        let mut reader = ByteReader::new(input);
        let count = reader.get_u32_le()? as usize;
        if count % MINI_BLOCK != 0 {
            return Err(LanepackError::corrupt(format!(
                "element count {} is not a multiple of {}",
                count, MINI_BLOCK
            )));
        }
        if output.len() < count {
            return Err(LanepackError::corrupt(format!(
                "output buffer holds {} values, buffer declares {}",
                output.len(),
                count
            )));
        }

        let mut offset = [0u32; 4];
        let mut decoded = 0usize;
        while decoded < count {
            let minis = ((count - decoded) / MINI_BLOCK).min(MINIS_PER_SUPER);
            let mut widths = [0u8; MINIS_PER_SUPER];
            for word in widths.chunks_exact_mut(4) {
                let packed = reader.get_u32_le()?;
                word[0] = (packed >> 24) as u8;
                word[1] = (packed >> 16) as u8;
                word[2] = (packed >> 8) as u8;
                word[3] = packed as u8;
            }
            for &width in widths.iter().take(minis) {
                let width = u32::from(width);
                if width > 32 {
                    return Err(LanepackError::corrupt(format!(
                        "bit width {} exceeds 32",
                        width
                    )));
                }
                let words = reader.take(width as usize * 16)?;
                unpack_block(
                    words,
                    width,
                    &mut offset,
                    &mut output[decoded..decoded + MINI_BLOCK],
                );
                decoded += MINI_BLOCK;
            }
        }
        reader.expect_consumed()?;
        Ok(count)
    }
}

//==================================================================================
// 1. Miniblock kernels
//==================================================================================

/// OR together the miniblock's 128 order-4 deltas and report the bit width
/// of the result; advances the offset vector to the block's last raw group.
fn max_bits(block: &[u32], offset: &mut [u32; 4]) -> u32 {
    debug_assert_eq!(block.len(), MINI_BLOCK);
    let mut acc = [0u32; 4];
    let mut prev = *offset;
    for group in block.chunks_exact(4) {
        for lane in 0..4 {
            acc[lane] |= group[lane].wrapping_sub(prev[lane]);
            prev[lane] = group[lane];
        }
    }
    *offset = prev;
    32 - (acc[0] | acc[1] | acc[2] | acc[3]).leading_zeros()
}

/// Pack one miniblock's deltas at `width` bits per value. Each lane owns a
/// 64-bit bit buffer; a full 32 bits flush as one word per lane, which yields
/// the vector-interleaved layout the decoder expects.
fn pack_block(
    block: &[u32],
    width: u32,
    offset: &mut [u32; 4],
    writer: &mut ByteWriter<'_>,
) -> Result<(), LanepackError> {
    let mut prev = *offset;
    let mut acc = [0u64; 4];
    let mut filled = 0u32;
    for group in block.chunks_exact(4) {
        for lane in 0..4 {
            let delta = group[lane].wrapping_sub(prev[lane]);
            acc[lane] |= u64::from(delta) << filled;
            prev[lane] = group[lane];
        }
        filled += width;
        if filled >= 32 {
            for slot in acc.iter_mut() {
                writer.put_u32_le(*slot as u32)?;
                *slot >>= 32;
            }
            filled -= 32;
        }
    }
    debug_assert_eq!(filled, 0);
    *offset = prev;
    Ok(())
}

/// Inverse of [`pack_block`]: consume `16 width` bytes of packed words and
/// rebuild the 128 values by cumulative lane addition onto the offset vector.
fn unpack_block(words: &[u8], width: u32, offset: &mut [u32; 4], out: &mut [u32]) {
    debug_assert_eq!(words.len(), width as usize * 16);
    debug_assert_eq!(out.len(), MINI_BLOCK);
    let mask = (1u64 << width) - 1;
    let mut prev = *offset;
    let mut acc = [0u64; 4];
    let mut avail = 0u32;
    let mut pos = 0usize;
    for group in out.chunks_exact_mut(4) {
        if avail < width {
            for slot in acc.iter_mut() {
                let word = u32::from_le_bytes([
                    words[pos],
                    words[pos + 1],
                    words[pos + 2],
                    words[pos + 3],
                ]);
                *slot |= u64::from(word) << avail;
                pos += 4;
            }
            avail += 32;
        }
        for lane in 0..4 {
            let delta = (acc[lane] & mask) as u32;
            acc[lane] >>= width;
            prev[lane] = prev[lane].wrapping_add(delta);
            group[lane] = prev[lane];
        }
        avail -= width;
    }
    *offset = prev;
}

//==================================================================================
// 2. Unit Tests
//==================================================================================
