//! Precomputed lookup tables for the vectorized StreamVByte decoder.
//!
//! A key byte holds the 2-bit length codes of four consecutive records. For
//! each of the 256 possible key bytes, [`SHUFFLE_TABLE`] carries the byte
//! gather mask that spreads the four variable-length deltas into fixed
//! 32-bit lanes (index 0x80 and above zero-fills the lane's upper bytes),
//! and [`LENGTH_TABLE`] carries the total number of data bytes the four
//! records occupy. Pure data; the tables are built at compile time.

/// Gather index meaning "this output byte is zero".
const PAD: u8 = 0xFF;

const fn build_shuffle_table() -> [[u8; 16]; 256] {
    let mut table = [[PAD; 16]; 256];
    let mut key = 0usize;
    while key < 256 {
        let mut src = 0u8;
        let mut slot = 0usize;
        while slot < 4 {
            let len = ((key >> (2 * slot)) & 0x3) + 1;
            let mut byte = 0usize;
            while byte < 4 {
                if byte < len {
                    table[key][4 * slot + byte] = src;
                    src += 1;
                }
                byte += 1;
            }
            slot += 1;
        }
        key += 1;
    }
    table
}

const fn build_length_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut key = 0usize;
    while key < 256 {
        let mut total = 0u8;
        let mut slot = 0;
        while slot < 4 {
            total += (((key >> (2 * slot)) & 0x3) + 1) as u8;
            slot += 1;
        }
        table[key] = total;
        key += 1;
    }
    table
}

pub(crate) const SHUFFLE_TABLE: [[u8; 16]; 256] = build_shuffle_table();
pub(crate) const LENGTH_TABLE: [u8; 256] = build_length_table();
