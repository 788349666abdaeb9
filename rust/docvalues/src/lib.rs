//! Doc values column store of a search index segment.
//!
//! A segment's doc values live in two framed streams: the data stream holds
//! bit-packed, raw and compressed payloads; the meta stream holds one record
//! per field with the offsets of its structures in the data stream, followed
//! by an end-of-fields marker.
//!
//! [`DocValuesWriter`] encodes fields from value producers; [`DocValuesReader`]
//! parses the streams back and offers random access by document id.

pub mod config;
pub mod field;
pub mod producer;
pub mod read;
pub mod write;

#[cfg(test)]
mod tests;

pub use config::DocValuesConfig;
pub use docvalues_common::{Result, error::Error, error::ErrorKind};
pub use field::{FieldInfo, SegmentInfo, ValueType};
pub use read::DocValuesReader;
pub use write::{DocValuesWriter, FieldSummary, FieldValues, SegmentSummary};

/// Codec name in the header of the data stream.
pub const DATA_CODEC: &str = "DocValuesData";

/// Codec name in the header of the meta stream.
pub const META_CODEC: &str = "DocValuesMetadata";

pub const VERSION_START: u32 = 0;
pub const VERSION_CURRENT: u32 = VERSION_START;

/// Field id marking the end of the meta stream's field records.
pub const END_OF_FIELDS: i32 = -1;
