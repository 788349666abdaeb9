//! Multi-level skip index: per doc range summaries of a field's values, letting
//! range scans skip documents whose values cannot match.
//!
//! Leaves (level 0 intervals) cover runs of consecutive documents. Every
//! `1 << LEVEL_SHIFT` leaves are merged into a level 1 interval, and so on up to
//! [`MAX_LEVEL`] levels. Leaves are written in groups of at most
//! `1 << (LEVEL_SHIFT * (MAX_LEVEL - 1))`. For each leaf of a group the data
//! stream holds one `u8` level count followed, coarsest level first, by
//! `i32 max_doc, i32 min_doc, i64 max_value, i64 min_value, i32 doc_count` of
//! every interval starting at that leaf.
//!
//! Meta record: `i64 offset, i64 length, i64 global_max_value,
//! i64 global_min_value, i32 global_doc_count, i32 max_doc_id`.

use byteorder::{LE, WriteBytesExt};
use docvalues_common::{Result, verify_contract, verify_data};
use docvalues_io::{ArtifactWriter, DataInput};

use crate::values::SortedNumericProducer;

pub const LEVEL_SHIFT: u32 = 3;
pub const MAX_LEVEL: usize = 4;
pub const MAX_LEAVES_PER_GROUP: usize = 1 << (LEVEL_SHIFT as usize * (MAX_LEVEL - 1));
pub const DEFAULT_INTERVAL_SIZE: u32 = 4096;
pub const NO_MORE_DOCS: i32 = i32::MAX;

/// Bytes of one interval record.
const INTERVAL_BYTES: u64 = 4 + 4 + 8 + 8 + 4;

/// Byte length of a complete group of intervals at each level, counted from
/// the level byte of its first leaf.
const GROUP_BYTES: [u64; MAX_LEVEL] = {
    let mut sizes = [0u64; MAX_LEVEL];
    sizes[0] = 1 + INTERVAL_BYTES;
    let mut level = 1;
    while level < MAX_LEVEL {
        sizes[level] = (1 << LEVEL_SHIFT) * sizes[level - 1] + INTERVAL_BYTES;
        level += 1;
    }
    sizes
};

/// Summary of a run of documents. Doc ids are stored as `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipInterval {
    pub min_doc: i32,
    pub max_doc: i32,
    pub doc_count: i32,
    pub min_value: i64,
    pub max_value: i64,
}

impl SkipInterval {
    /// An interval starting at `doc`, with no documents yet.
    pub fn starting_at(doc: i32) -> SkipInterval {
        SkipInterval {
            min_doc: doc,
            max_doc: doc,
            doc_count: 0,
            min_value: i64::MAX,
            max_value: i64::MIN,
        }
    }

    pub fn with_doc(self, doc: i32) -> SkipInterval {
        SkipInterval {
            max_doc: doc,
            doc_count: self.doc_count + 1,
            ..self
        }
    }

    pub fn with_value(self, value: i64) -> SkipInterval {
        SkipInterval {
            min_value: self.min_value.min(value),
            max_value: self.max_value.max(value),
            ..self
        }
    }

    /// The smallest interval containing both `self` and `other`.
    pub fn merge(self, other: SkipInterval) -> SkipInterval {
        SkipInterval {
            min_doc: self.min_doc.min(other.min_doc),
            max_doc: self.max_doc.max(other.max_doc),
            doc_count: self.doc_count + other.doc_count,
            min_value: self.min_value.min(other.min_value),
            max_value: self.max_value.max(other.max_value),
        }
    }

    /// Whether the interval should be closed before `next_doc` is added.
    ///
    /// Below `interval_size` documents the interval always stays open. Past it,
    /// the interval keeps growing only while it holds a single repeated value,
    /// the next document carries exactly that value once, and the run has no
    /// doc id gaps.
    pub fn is_done(
        &self,
        interval_size: u32,
        value_count: u32,
        next_value: i64,
        next_doc: i32,
    ) -> bool {
        if (self.doc_count as u32) < interval_size {
            return false;
        }
        value_count > 1
            || self.min_value != self.max_value
            || self.min_value != next_value
            || self.doc_count != next_doc - self.min_doc
    }

    fn write<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_i32::<LE>(self.max_doc)?;
        out.write_i32::<LE>(self.min_doc)?;
        out.write_i64::<LE>(self.max_value)?;
        out.write_i64::<LE>(self.min_value)?;
        out.write_i32::<LE>(self.doc_count)
    }
}

/// Global summary written to the meta stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipIndexEntry {
    pub offset: u64,
    pub length: u64,
    pub max_value: i64,
    pub min_value: i64,
    pub doc_count: i32,
    /// Last document covered by the index, `-1` when the field has no values.
    pub max_doc_id: i32,
}

impl SkipIndexEntry {
    pub fn write_meta(&self, meta: &mut ArtifactWriter) -> Result<()> {
        meta.write_i64::<LE>(self.offset as i64)?;
        meta.write_i64::<LE>(self.length as i64)?;
        meta.write_i64::<LE>(self.max_value)?;
        meta.write_i64::<LE>(self.min_value)?;
        meta.write_i32::<LE>(self.doc_count)?;
        meta.write_i32::<LE>(self.max_doc_id)?;
        Ok(())
    }

    pub fn read_meta(meta: &mut DataInput) -> Result<SkipIndexEntry> {
        let offset = meta.read_i64()?;
        let length = meta.read_i64()?;
        verify_data!(skip_index_range, offset >= 0 && length >= 0);
        Ok(SkipIndexEntry {
            offset: offset as u64,
            length: length as u64,
            max_value: meta.read_i64()?,
            min_value: meta.read_i64()?,
            doc_count: meta.read_i32()?,
            max_doc_id: meta.read_i32()?,
        })
    }
}

/// Builds the skip index of `producer` into `data` and returns its meta entry.
pub fn write_skip_index(
    producer: &dyn SortedNumericProducer,
    interval_size: u32,
    data: &mut ArtifactWriter,
) -> Result<SkipIndexEntry> {
    let start = data.position();
    let mut global = SkipInterval::starting_at(-1);
    let mut leaves: Vec<SkipInterval> = Vec::with_capacity(MAX_LEAVES_PER_GROUP);
    let mut current: Option<SkipInterval> = None;
    let mut num_groups = 0usize;

    let mut cursor = producer.cursor()?;
    while let Some(doc) = cursor.next_doc()? {
        verify_contract!(doc_id, doc <= i32::MAX as u32);
        let doc = doc as i32;
        let value_count = cursor.value_count();
        verify_contract!(value_count, value_count > 0);
        let first_value = cursor.next_value()?;
        if let Some(leaf) = current {
            if leaf.is_done(interval_size, value_count, first_value, doc) {
                global = global.merge(leaf);
                leaves.push(leaf);
                current = None;
                if leaves.len() == MAX_LEAVES_PER_GROUP {
                    write_group(&leaves, data)?;
                    leaves.clear();
                    num_groups += 1;
                }
            }
        }
        let mut leaf = current
            .unwrap_or_else(|| SkipInterval::starting_at(doc))
            .with_doc(doc)
            .with_value(first_value);
        for _ in 1..value_count {
            leaf = leaf.with_value(cursor.next_value()?);
        }
        current = Some(leaf);
    }
    if let Some(leaf) = current {
        global = global.merge(leaf);
        leaves.push(leaf);
    }
    if !leaves.is_empty() {
        write_group(&leaves, data)?;
        num_groups += 1;
    }

    let entry = SkipIndexEntry {
        offset: start,
        length: data.position() - start,
        max_value: global.max_value,
        min_value: global.min_value,
        doc_count: global.doc_count,
        max_doc_id: global.max_doc,
    };
    log::debug!(
        "skip index: {} docs up to doc {}, {} leaf groups, {} bytes",
        entry.doc_count,
        entry.max_doc_id,
        num_groups,
        entry.length
    );
    Ok(entry)
}

/// Merges every complete run of `1 << LEVEL_SHIFT` intervals into one parent.
pub fn build_level(intervals: &[SkipInterval]) -> Vec<SkipInterval> {
    intervals
        .chunks_exact(1 << LEVEL_SHIFT)
        .map(|chunk| {
            chunk[1..]
                .iter()
                .fold(chunk[0], |parent, &child| parent.merge(child))
        })
        .collect()
}

/// Number of levels written for the leaf at `index` of a group of `size` leaves.
pub fn levels_at(index: usize, size: usize) -> usize {
    let trailing_zeros = if index == 0 {
        usize::BITS
    } else {
        index.trailing_zeros()
    };
    let left = size - index;
    (1..MAX_LEVEL)
        .rev()
        .find(|&level| {
            trailing_zeros >= LEVEL_SHIFT * level as u32
                && left >= 1 << (LEVEL_SHIFT as usize * level)
        })
        .map_or(1, |level| level + 1)
}

fn write_group(leaves: &[SkipInterval], data: &mut ArtifactWriter) -> Result<()> {
    let mut levels = vec![leaves.to_vec()];
    for level in 1..MAX_LEVEL {
        let next = build_level(&levels[level - 1]);
        levels.push(next);
    }
    let mut buf = Vec::with_capacity(leaves.len() * (1 + INTERVAL_BYTES as usize));
    for index in 0..leaves.len() {
        let count = levels_at(index, leaves.len());
        buf.write_u8(count as u8)?;
        for level in (0..count).rev() {
            levels[level][index >> (LEVEL_SHIFT as usize * level)].write(&mut buf)?;
        }
    }
    log::trace!("skip index group: {} leaves", leaves.len());
    data.write_all(&buf)?;
    Ok(())
}

/// Forward-only reader of a skip index.
///
/// After [`advance`](Self::advance)`(target)`, levels `0..num_levels()` describe
/// intervals of increasing size that contain or follow `target`.
pub struct DocValuesSkipper<'a> {
    entry: SkipIndexEntry,
    input: DataInput<'a>,
    levels: usize,
    min_doc: [i32; MAX_LEVEL],
    max_doc: [i32; MAX_LEVEL],
    min_value: [i64; MAX_LEVEL],
    max_value: [i64; MAX_LEVEL],
    doc_count: [i32; MAX_LEVEL],
}

impl<'a> DocValuesSkipper<'a> {
    /// `data` is the whole data stream.
    pub fn new(entry: SkipIndexEntry, data: &'a [u8]) -> Result<DocValuesSkipper<'a>> {
        let end = entry.offset.checked_add(entry.length);
        verify_data!(
            skip_index_range,
            end.is_some_and(|end| end <= data.len() as u64)
        );
        let bytes = &data[entry.offset as usize..(entry.offset + entry.length) as usize];
        Ok(DocValuesSkipper {
            entry,
            input: DataInput::new(bytes),
            levels: 0,
            min_doc: [-1; MAX_LEVEL],
            max_doc: [-1; MAX_LEVEL],
            min_value: [0; MAX_LEVEL],
            max_value: [0; MAX_LEVEL],
            doc_count: [0; MAX_LEVEL],
        })
    }

    /// Moves to the first leaf whose max doc is at least `target`. The skipper
    /// stays in place when the current leaf already reaches `target`.
    pub fn advance(&mut self, target: u32) -> Result<()> {
        let target = i32::try_from(target).unwrap_or(NO_MORE_DOCS);
        if target > self.entry.max_doc_id {
            self.levels = MAX_LEVEL;
            self.min_doc = [NO_MORE_DOCS; MAX_LEVEL];
            self.max_doc = [NO_MORE_DOCS; MAX_LEVEL];
            return Ok(());
        }
        if target <= self.max_doc[0] {
            return Ok(());
        }
        loop {
            let levels = self.input.read_u8()? as usize;
            verify_data!(skip_levels, (1..=MAX_LEVEL).contains(&levels));
            let mut found = true;
            for level in (0..levels).rev() {
                self.max_doc[level] = self.input.read_i32()?;
                if self.max_doc[level] < target {
                    self.input.skip(GROUP_BYTES[level] - 5)?;
                    found = false;
                    break;
                }
                self.min_doc[level] = self.input.read_i32()?;
                self.max_value[level] = self.input.read_i64()?;
                self.min_value[level] = self.input.read_i64()?;
                self.doc_count[level] = self.input.read_i32()?;
            }
            if found {
                let mut levels = levels;
                while levels < MAX_LEVEL && self.max_doc[levels] >= target {
                    levels += 1;
                }
                self.levels = levels;
                return Ok(());
            }
        }
    }

    pub fn num_levels(&self) -> usize {
        self.levels
    }

    pub fn min_doc_id(&self, level: usize) -> i32 {
        self.min_doc[level]
    }

    pub fn max_doc_id(&self, level: usize) -> i32 {
        self.max_doc[level]
    }

    pub fn min_value(&self, level: usize) -> i64 {
        self.min_value[level]
    }

    pub fn max_value(&self, level: usize) -> i64 {
        self.max_value[level]
    }

    pub fn doc_count(&self, level: usize) -> i32 {
        self.doc_count[level]
    }

    pub fn global_min_value(&self) -> i64 {
        self.entry.min_value
    }

    pub fn global_max_value(&self) -> i64 {
        self.entry.max_value
    }

    pub fn global_doc_count(&self) -> i32 {
        self.entry.doc_count
    }
}
