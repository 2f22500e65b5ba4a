//! lanepack - SIMD-oriented lossless compression for 32-bit integer
//! sequences.
//!
//! The crate packs sorted (or nearly sorted) identifier streams, as found in
//! inverted-index postings, into compact byte buffers and restores them
//! exactly. Two codecs do the work: a block bit-packer that stores each
//! 128-integer miniblock at the minimum bit width its order-4 deltas need,
//! and a StreamVByte variant that spends 1-4 bytes per order-1 delta. The
//! [`CompositeCodec`] combinator welds them into a codec over any input
//! length, exposed ready-made as [`BinaryPacking128`].
//!
//! ```
//! use lanepack::{BinaryPacking128, IntCodec};
//!
//! let input: Vec<u32> = (0..1000).map(|i| i * 3).collect();
//!
//! let mut compressed = vec![0u8; BinaryPacking128::max_compressed_len(&input)];
//! let written = BinaryPacking128::encode(&input, &mut compressed)?;
//! compressed.truncate(written);
//!
//! let mut output = vec![0u32; BinaryPacking128::decompressed_len(&compressed)?];
//! let count = BinaryPacking128::decode(&compressed, &mut output)?;
//! assert_eq!(&output[..count], &input[..]);
//! # Ok::<(), lanepack::LanepackError>(())
//! ```
//!
//! All operations are synchronous and stateless; distinct calls on disjoint
//! buffers may run on separate threads without synchronization. Hardware
//! vector width is probed once at runtime and every vectorized path has a
//! scalar twin it agrees with bit-for-bit.

/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// Module Declarations
//==================================================================================

pub mod kernels;
pub mod signed;
pub mod simd;

mod codec;
mod composite;
mod error;
mod util;

pub use codec::IntCodec;
pub use composite::{BinaryPacking128, CompositeCodec};
pub use error::LanepackError;
pub use kernels::{Bp128D4, StreamVByteD1};
