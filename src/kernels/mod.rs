//! The codec and transform kernels. Everything here is pure and stateless:
//! buffers in, buffers out, no state carried across calls.

pub mod delta;

mod bp128;
mod stream_vbyte;
mod svb_tables;

pub use bp128::Bp128D4;
pub use stream_vbyte::StreamVByteD1;
