//! Per-field encoders of the doc values column store and their decoders.
//!
//! Every encoder appends payload bytes to the segment's data stream and records
//! the offsets needed to locate them in the meta stream. The decoders parse a
//! meta record and answer random-access queries over the data stream bytes.

pub mod monotonic;
pub mod numeric;
pub mod presence;
pub mod skip_index;
pub mod stats;
pub mod terms_dict;
pub mod values;
