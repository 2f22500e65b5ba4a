//! This module defines the contract every integer codec in the crate
//! implements.
//!
//! The operations are associated functions rather than methods: a codec is a
//! pure transform with no per-instance state, and the composite combinator
//! selects its two halves entirely at compile time.

use crate::error::LanepackError;

/// A lossless codec over sequences of unsigned 32-bit integers.
///
/// Buffers are caller-owned on both sides: size the compressed buffer with
/// [`IntCodec::max_compressed_len`] and truncate it to the length `encode`
/// returns; size the decode buffer with [`IntCodec::decompressed_len`].
pub trait IntCodec {
    /// Granularity `encode` accepts: input lengths must be a multiple of
    /// this. A block size of 1 means any length.
    const BLOCK_SIZE: usize;

    /// Safe upper bound on the encoded size of `input`, derived from its
    /// length alone.
    fn max_compressed_len(input: &[u32]) -> usize;

    /// Number of integers `input` decodes to, read from the fixed-size
    /// header without touching the body.
    fn decompressed_len(input: &[u8]) -> Result<usize, LanepackError>;

    /// Compress `input` into `output`, returning the bytes written.
    ///
    /// Fails with [`LanepackError::InputLength`] when `input.len()` is not a
    /// multiple of [`IntCodec::BLOCK_SIZE`], and with
    /// [`LanepackError::Corrupt`] when `output` cannot hold the encoding.
    fn encode(input: &[u32], output: &mut [u8]) -> Result<usize, LanepackError>;

    /// Decompress `input` into `output`, returning the values written.
    ///
    /// Malformed input is reported as [`LanepackError::Corrupt`]; it never
    /// reads or writes out of bounds.
    fn decode(input: &[u8], output: &mut [u32]) -> Result<usize, LanepackError>;
}
