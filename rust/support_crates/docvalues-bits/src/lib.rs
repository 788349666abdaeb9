//! Bit-level primitives shared by the doc-values encoders:
//!
//! - [`packed`]: fixed-width bit packing of unsigned integers.
//! - [`bitset`]: a sparse document bitset with a jump table, used to record
//!   which documents carry a value.

pub mod bitset;
pub mod packed;

pub use bitset::{BitSetWriter, IndexedBitSet};
pub use packed::{PackedReader, PackedWriter};
