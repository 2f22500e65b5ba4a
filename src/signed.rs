//! Boundary adapter for callers holding `i32` identifiers.
//!
//! Document and posting ids are frequently typed signed even though they are
//! never negative. These wrappers verify non-negativity, then reinterpret
//! the slice as unsigned via a zero-copy `bytemuck` cast and defer to the
//! chosen codec. Decoding casts back unchecked: whatever the unsigned codec
//! reproduces is bit-identical to what was encoded.

use crate::codec::IntCodec;
use crate::error::LanepackError;

/// Index of the first negative value, if any.
fn first_negative(input: &[i32]) -> Option<usize> {
    input.iter().position(|&value| value < 0)
}

/// [`IntCodec::max_compressed_len`] over signed input.
pub fn max_compressed_len<C: IntCodec>(input: &[i32]) -> Result<usize, LanepackError> {
    if let Some(index) = first_negative(input) {
        return Err(LanepackError::NegativeValue { index });
    }
    Ok(C::max_compressed_len(bytemuck::cast_slice(input)))
}

/// [`IntCodec::encode`] over signed input. Fails before writing anything if
/// any value is negative.
pub fn encode<C: IntCodec>(input: &[i32], output: &mut [u8]) -> Result<usize, LanepackError> {
    if let Some(index) = first_negative(input) {
        return Err(LanepackError::NegativeValue { index });
    }
    C::encode(bytemuck::cast_slice(input), output)
}

/// [`IntCodec::decode`] into a signed output buffer.
pub fn decode<C: IntCodec>(input: &[u8], output: &mut [i32]) -> Result<usize, LanepackError> {
    C::decode(input, bytemuck::cast_slice_mut(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::BinaryPacking128;

    #[test]
    fn test_signed_roundtrip() {
        let input: Vec<i32> = (0..300).map(|i| i * 11).collect();
        let mut encoded = vec![0u8; max_compressed_len::<BinaryPacking128>(&input).unwrap()];
        let written = encode::<BinaryPacking128>(&input, &mut encoded).unwrap();

        let mut decoded = vec![0i32; input.len()];
        let values = decode::<BinaryPacking128>(&encoded[..written], &mut decoded).unwrap();
        assert_eq!(values, input.len());
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_negative_values_are_rejected_with_their_index() {
        let input: Vec<i32> = vec![5, 9, -1, 12];
        let mut output = vec![0u8; 64];
        assert_eq!(
            encode::<BinaryPacking128>(&input, &mut output),
            Err(LanepackError::NegativeValue { index: 2 })
        );
        assert_eq!(
            max_compressed_len::<BinaryPacking128>(&input),
            Err(LanepackError::NegativeValue { index: 2 })
        );
    }
}
