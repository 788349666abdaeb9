//! Which documents of the segment carry a value for a field.
//!
//! Meta record: `i64` offset or sentinel, `i64` length, `i32` jump table entry
//! count, `i8` dense rank power (`-1` when rank tables are disabled). The two
//! sentinels `-2` (no document has a value) and `-1` (every document has a
//! value) come with a zero length and no data bytes.

use byteorder::{LE, WriteBytesExt};
use docvalues_bits::{BitSetWriter, IndexedBitSet};
use docvalues_common::{Result, verify_contract, verify_data};
use docvalues_io::{ArtifactWriter, DataInput};

use crate::values::DocCursor;

pub const NO_DOCS: i64 = -2;
pub const ALL_DOCS: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    NoDocs,
    AllDocs,
    Sparse {
        offset: u64,
        length: u64,
        jump_table_entries: u32,
        rank_power: Option<u8>,
    },
}

impl Presence {
    pub fn write_meta(&self, meta: &mut ArtifactWriter) -> Result<()> {
        match *self {
            Presence::NoDocs | Presence::AllDocs => {
                let sentinel = if *self == Presence::NoDocs {
                    NO_DOCS
                } else {
                    ALL_DOCS
                };
                meta.write_i64::<LE>(sentinel)?;
                meta.write_i64::<LE>(0)?;
                meta.write_i32::<LE>(-1)?;
                meta.write_i8(-1)?;
            }
            Presence::Sparse {
                offset,
                length,
                jump_table_entries,
                rank_power,
            } => {
                meta.write_i64::<LE>(offset as i64)?;
                meta.write_i64::<LE>(length as i64)?;
                meta.write_i32::<LE>(jump_table_entries as i32)?;
                meta.write_i8(rank_power.map_or(-1, |p| p as i8))?;
            }
        }
        Ok(())
    }

    pub fn read_meta(meta: &mut DataInput) -> Result<Presence> {
        let offset = meta.read_i64()?;
        let length = meta.read_i64()?;
        let jump_table_entries = meta.read_i32()?;
        let rank_power = meta.read_i8()?;
        match offset {
            NO_DOCS => Ok(Presence::NoDocs),
            ALL_DOCS => Ok(Presence::AllDocs),
            _ => {
                verify_data!(presence_offset, offset >= 0 && length >= 0);
                verify_data!(jump_table_entries, jump_table_entries >= 0);
                Ok(Presence::Sparse {
                    offset: offset as u64,
                    length: length as u64,
                    jump_table_entries: jump_table_entries as u32,
                    rank_power: (rank_power >= 0).then_some(rank_power as u8),
                })
            }
        }
    }

    /// Returns the index of `doc` among the documents with a value, or `None`
    /// when `doc` has no value. `data` is the whole data stream.
    pub fn index_of(&self, data: &[u8], doc: u32) -> Result<Option<u64>> {
        match *self {
            Presence::NoDocs => Ok(None),
            Presence::AllDocs => Ok(Some(doc as u64)),
            Presence::Sparse {
                offset,
                length,
                jump_table_entries,
                rank_power,
            } => {
                let bytes = DataInput::at(data, offset)?.read_bytes(length as usize)?;
                IndexedBitSet::new(bytes, jump_table_entries, rank_power)?.index_of(doc)
            }
        }
    }

    /// Lists the documents with a value in increasing order.
    pub fn docs(&self, data: &[u8], max_doc: u32) -> Result<Vec<u32>> {
        match *self {
            Presence::NoDocs => Ok(Vec::new()),
            Presence::AllDocs => Ok((0..max_doc).collect()),
            Presence::Sparse {
                offset,
                length,
                jump_table_entries,
                rank_power,
            } => {
                let bytes = DataInput::at(data, offset)?.read_bytes(length as usize)?;
                IndexedBitSet::new(bytes, jump_table_entries, rank_power)?
                    .docs()
                    .collect()
            }
        }
    }
}

/// Picks the presence policy from the number of documents with a value and,
/// for the sparse case, writes the bitset of `docs` to `data`.
///
/// `docs` must be a fresh cursor over the same documents that were counted.
pub fn write_presence(
    docs: &mut dyn DocCursor,
    num_docs_with_value: u64,
    max_doc: u32,
    rank_power: Option<u8>,
    data: &mut ArtifactWriter,
) -> Result<Presence> {
    verify_contract!(
        num_docs_with_value,
        num_docs_with_value <= max_doc as u64
    );
    if num_docs_with_value == 0 {
        return Ok(Presence::NoDocs);
    }
    if num_docs_with_value == max_doc as u64 {
        return Ok(Presence::AllDocs);
    }

    let offset = data.position();
    let mut writer = BitSetWriter::new(&mut *data, rank_power)?;
    while let Some(doc) = docs.next_doc()? {
        verify_contract!(doc_id, doc < max_doc);
        writer.add(doc)?;
    }
    let (_, summary) = writer.finish()?;
    verify_contract!(
        num_docs_with_value,
        summary.cardinality == num_docs_with_value
    );
    log::trace!(
        "sparse presence: {} docs, {} jump entries, {} bytes",
        summary.cardinality,
        summary.jump_table_entries,
        summary.length
    );
    Ok(Presence::Sparse {
        offset,
        length: summary.length,
        jump_table_entries: summary.jump_table_entries,
        rank_power,
    })
}
