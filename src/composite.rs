//! This module composes two codecs into one that accepts arbitrary-length
//! input: a bulk codec handles the longest prefix its block size divides,
//! and a remainder codec (block size 1) takes the tail.
//!
//! Binary format:
//!
//! ```text
//! [bulkByteLen]  4 bytes           length in bytes of the bulk codec's data
//! [bulk data]    bulkByteLen bytes prefix, encoded by the bulk codec
//! [tail data]    remaining bytes   tail, encoded by the remainder codec
//! ```
//!
//! The combinator is itself an [`IntCodec`], so combinators nest; the crate
//! uses a single level, fixed in the [`BinaryPacking128`] alias.

use std::marker::PhantomData;

use crate::codec::IntCodec;
use crate::error::LanepackError;
use crate::kernels::{Bp128D4, StreamVByteD1};
use crate::util::ByteReader;

/// Composition of a bulk codec `B` and a remainder codec `R`.
pub struct CompositeCodec<B, R> {
    _marker: PhantomData<(B, R)>,
}

/// The crate's default codec: block bit-packing for the aligned prefix,
/// StreamVByte for the tail.
pub type BinaryPacking128 = CompositeCodec<Bp128D4, StreamVByteD1>;

impl<B: IntCodec, R: IntCodec> CompositeCodec<B, R> {
    /// Split `input` into the longest prefix the bulk codec accepts and the
    /// tail the remainder codec takes.
    fn split(input: &[u32]) -> (&[u32], &[u32]) {
        input.split_at(input.len() / B::BLOCK_SIZE * B::BLOCK_SIZE)
    }

    /// Split a compressed buffer into the two codec regions described by the
    /// length prefix.
    fn split_encoded(input: &[u8]) -> Result<(&[u8], &[u8]), LanepackError> {
        let bulk_len = ByteReader::new(input).get_u32_le()? as usize;
        let bulk = input.get(4..4 + bulk_len).ok_or_else(|| {
            LanepackError::corrupt(format!(
                "bulk region of {} bytes overruns buffer of {}",
                bulk_len,
                input.len()
            ))
        })?;
        Ok((bulk, &input[4 + bulk_len..]))
    }
}

impl<B: IntCodec, R: IntCodec> IntCodec for CompositeCodec<B, R> {
    /// The remainder codec's granularity; the combinator aligns the bulk
    /// half internally.
    const BLOCK_SIZE: usize = R::BLOCK_SIZE;

    fn max_compressed_len(input: &[u32]) -> usize {
        let (head, tail) = Self::split(input);
        4 + B::max_compressed_len(head) + R::max_compressed_len(tail)
    }

    fn decompressed_len(input: &[u8]) -> Result<usize, LanepackError> {
        let (bulk, rest) = Self::split_encoded(input)?;
        Ok(B::decompressed_len(bulk)? + R::decompressed_len(rest)?)
    }

    fn encode(input: &[u32], output: &mut [u8]) -> Result<usize, LanepackError> {
        let (head, tail) = Self::split(input);
        if output.len() < 4 {
            return Err(LanepackError::corrupt(
                "output buffer too small for the length prefix",
            ));
        }

        // Leave 4 bytes for the bulk length, then fill it in once known.
        let bulk_len = B::encode(head, &mut output[4..])?;
        let tail_len = R::encode(tail, &mut output[4 + bulk_len..])?;
        output[..4].copy_from_slice(&(bulk_len as u32).to_le_bytes());
        log::trace!(
            "composite split {} head / {} tail ints into {}+{} bytes",
            head.len(),
            tail.len(),
            bulk_len,
            tail_len
        );
        Ok(4 + bulk_len + tail_len)
    }

    fn decode(input: &[u8], output: &mut [u32]) -> Result<usize, LanepackError> {
        let (bulk, rest) = Self::split_encoded(input)?;
        let head_count = B::decode(bulk, output)?;
        let tail_count = R::decode(rest, &mut output[head_count..])?;
        Ok(head_count + tail_count)
    }
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn roundtrip(input: &[u32]) -> Vec<u8> {
        let mut encoded = vec![0u8; BinaryPacking128::max_compressed_len(input)];
        let written = BinaryPacking128::encode(input, &mut encoded).unwrap();
        assert!(written <= encoded.len());
        encoded.truncate(written);

        assert_eq!(
            BinaryPacking128::decompressed_len(&encoded).unwrap(),
            input.len()
        );
        let mut decoded = vec![0u32; input.len()];
        let values = BinaryPacking128::decode(&encoded, &mut decoded).unwrap();
        assert_eq!(values, input.len());
        assert_eq!(decoded, input);
        encoded
    }

    #[test]
    fn test_block_size_is_the_remainder_codec() {
        assert_eq!(BinaryPacking128::BLOCK_SIZE, 1);
    }

    #[test]
    fn test_empty_input_is_framing_only() {
        let encoded = roundtrip(&[]);
        // Length prefix + empty bulk header + empty tail header.
        assert_eq!(encoded.len(), 4 + 4 + 4);
        assert_eq!(&encoded[..4], &4u32.to_le_bytes());
    }

    #[test]
    fn test_split_lengths_around_the_block_size() {
        let mut rng = StdRng::seed_from_u64(0xC0);
        for len in [1usize, 127, 128, 129, 255, 256, 2048, 2049, 5000] {
            let mut value = 0u32;
            let input: Vec<u32> = (0..len)
                .map(|_| {
                    value = value.wrapping_add(rng.random_range(0..200));
                    value
                })
                .collect();
            roundtrip(&input);
        }
    }

    #[test]
    fn test_head_and_tail_counts_add_up() {
        let input: Vec<u32> = (0..300u32).collect();
        let mut encoded = vec![0u8; BinaryPacking128::max_compressed_len(&input)];
        let written = BinaryPacking128::encode(&input, &mut encoded).unwrap();
        let encoded = &encoded[..written];

        let bulk_len = u32::from_le_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]) as usize;
        let head = Bp128D4::decompressed_len(&encoded[4..4 + bulk_len]).unwrap();
        let tail = StreamVByteD1::decompressed_len(&encoded[4 + bulk_len..]).unwrap();
        assert_eq!(head, 256);
        assert_eq!(tail, 44);
        assert_eq!(
            BinaryPacking128::decompressed_len(encoded).unwrap(),
            head + tail
        );
    }

    #[test]
    fn test_sparse_posting_scenario_compresses_well() {
        // One million candidate ids kept with probability 1/33.
        let mut rng = StdRng::seed_from_u64(123_123);
        let input: Vec<u32> = (0..1_000_000u32)
            .filter(|_| rng.random_range(0..33u32) == 0)
            .collect();
        assert!(input.len() > 20_000);

        let encoded = roundtrip(&input);
        // Near-monotonic small deltas must beat raw storage by a wide margin.
        assert!(encoded.len() * 2 < input.len() * 4);
    }

    #[test]
    fn test_nested_combinator_is_still_a_codec() {
        let input: Vec<u32> = (0..400u32).map(|i| i * 7).collect();
        type Nested = CompositeCodec<Bp128D4, CompositeCodec<Bp128D4, StreamVByteD1>>;

        let mut encoded = vec![0u8; Nested::max_compressed_len(&input)];
        let written = Nested::encode(&input, &mut encoded).unwrap();
        let mut decoded = vec![0u32; input.len()];
        let values = Nested::decode(&encoded[..written], &mut decoded).unwrap();
        assert_eq!(values, input.len());
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_bulk_prefix_overrunning_buffer_is_rejected() {
        let input: Vec<u32> = (0..200u32).collect();
        let mut encoded = vec![0u8; BinaryPacking128::max_compressed_len(&input)];
        let written = BinaryPacking128::encode(&input, &mut encoded).unwrap();

        // Claim a bulk region longer than the whole buffer.
        encoded[..4].copy_from_slice(&(written as u32).to_le_bytes());
        let mut out = vec![0u32; input.len()];
        let result = BinaryPacking128::decode(&encoded[..written], &mut out);
        assert!(matches!(result, Err(LanepackError::Corrupt(_))));

        let result = BinaryPacking128::decompressed_len(&encoded[..written]);
        assert!(matches!(result, Err(LanepackError::Corrupt(_))));
    }

    #[test]
    fn test_truncated_framing_is_rejected() {
        let mut out = vec![0u32; 4];
        let result = BinaryPacking128::decode(&[1, 0], &mut out);
        assert!(matches!(result, Err(LanepackError::Corrupt(_))));
    }

    #[test]
    fn test_max_compressed_len_bounds_actual() {
        let mut rng = StdRng::seed_from_u64(0xFEED);
        for len in [0usize, 1, 128, 129, 4096, 10_000] {
            let input: Vec<u32> = (0..len).map(|_| rng.random::<u32>()).collect();
            let mut encoded = vec![0u8; BinaryPacking128::max_compressed_len(&input)];
            let written = BinaryPacking128::encode(&input, &mut encoded).unwrap();
            assert!(written <= BinaryPacking128::max_compressed_len(&input));
        }
    }
}
