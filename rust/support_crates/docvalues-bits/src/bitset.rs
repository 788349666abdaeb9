//! Sparse document bitset with a jump table.
//!
//! The doc id space is split into blocks of 65536 documents. Every block holding
//! at least one document is written as a header (`u16` block id, `u16`
//! cardinality minus one) followed by a payload in one of three layouts:
//!
//! * SPARSE (up to 4095 documents): the sorted low 16 bits of each doc id as `u16`.
//! * ALL (65536 documents): no payload.
//! * DENSE (anything else): an optional rank table followed by 1024 `u64` words.
//!   The rank table holds `65536 >> rank_power` `u16` entries; entry `r` is the
//!   number of documents in the block below doc `r << rank_power`.
//!
//! Blocks are followed by the jump table: one `(u32 index, u32 offset)` pair per
//! block id `0..=last_block`, where `index` counts the documents before the block
//! and `offset` is the block's position relative to the start of the bitset.
//! Block ids without documents point at the next present block.
//!
//! All integers are little-endian.

use std::io::Write;

use byteorder::{LE, WriteBytesExt};
use docvalues_common::{Result, try_or_ret_some_err, verify_arg, verify_contract, verify_data};
use docvalues_io::DataInput;

pub const BLOCK_SHIFT: u32 = 16;
pub const BLOCK_SIZE: u32 = 1 << BLOCK_SHIFT;
pub const MAX_SPARSE_CARDINALITY: u32 = 4095;
pub const MIN_RANK_POWER: u8 = 7;
pub const MAX_RANK_POWER: u8 = 15;

const DENSE_WORDS: usize = (BLOCK_SIZE / 64) as usize;
const JUMP_ENTRY_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockLayout {
    Sparse,
    All,
    Dense,
}

impl BlockLayout {
    fn for_cardinality(cardinality: u32) -> BlockLayout {
        if cardinality <= MAX_SPARSE_CARDINALITY {
            BlockLayout::Sparse
        } else if cardinality == BLOCK_SIZE {
            BlockLayout::All
        } else {
            BlockLayout::Dense
        }
    }
}

fn rank_table_len(rank_power: Option<u8>) -> usize {
    rank_power.map_or(0, |power| (BLOCK_SIZE >> power) as usize * 2)
}

/// Totals reported by [`BitSetWriter::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSetSummary {
    /// Number of documents in the set.
    pub cardinality: u64,
    /// Number of jump table entries.
    pub jump_table_entries: u32,
    /// Total number of bytes written, jump table included.
    pub length: u64,
}

/// Streaming writer of the bitset. Documents are added in strictly increasing
/// order.
pub struct BitSetWriter<W: Write> {
    out: W,
    written: u64,
    rank_power: Option<u8>,
    words: Vec<u64>,
    block: Option<u32>,
    block_cardinality: u32,
    cardinality: u64,
    last_doc: Option<u32>,
    jumps: Vec<(u32, u32)>,
}

impl<W: Write> BitSetWriter<W> {
    pub fn new(out: W, rank_power: Option<u8>) -> Result<BitSetWriter<W>> {
        if let Some(power) = rank_power {
            verify_arg!(
                rank_power,
                (MIN_RANK_POWER..=MAX_RANK_POWER).contains(&power)
            );
        }
        Ok(BitSetWriter {
            out,
            written: 0,
            rank_power,
            words: vec![0; DENSE_WORDS],
            block: None,
            block_cardinality: 0,
            cardinality: 0,
            last_doc: None,
            jumps: Vec::new(),
        })
    }

    pub fn add(&mut self, doc: u32) -> Result<()> {
        verify_contract!(
            doc_order,
            self.last_doc.is_none_or(|last| doc > last)
        );
        self.last_doc = Some(doc);
        let block = doc >> BLOCK_SHIFT;
        if self.block != Some(block) {
            self.flush_block()?;
            while self.jumps.len() as u32 <= block {
                self.jumps.push((self.cardinality as u32, self.written as u32));
            }
            self.block = Some(block);
        }
        let low = (doc & (BLOCK_SIZE - 1)) as usize;
        self.words[low >> 6] |= 1u64 << (low & 63);
        self.block_cardinality += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(W, BitSetSummary)> {
        self.flush_block()?;
        for &(index, offset) in &self.jumps {
            self.out.write_u32::<LE>(index)?;
            self.out.write_u32::<LE>(offset)?;
        }
        self.written += (self.jumps.len() * JUMP_ENTRY_SIZE) as u64;
        let summary = BitSetSummary {
            cardinality: self.cardinality,
            jump_table_entries: self.jumps.len() as u32,
            length: self.written,
        };
        Ok((self.out, summary))
    }

    fn flush_block(&mut self) -> Result<()> {
        let Some(block) = self.block.take() else {
            return Ok(());
        };
        let cardinality = self.block_cardinality;
        let mut payload = Vec::with_capacity(4 + DENSE_WORDS * 8);
        payload.write_u16::<LE>(block as u16)?;
        payload.write_u16::<LE>((cardinality - 1) as u16)?;
        match BlockLayout::for_cardinality(cardinality) {
            BlockLayout::Sparse => {
                for (word_index, &word) in self.words.iter().enumerate() {
                    let mut bits = word;
                    while bits != 0 {
                        let low = word_index * 64 + bits.trailing_zeros() as usize;
                        payload.write_u16::<LE>(low as u16)?;
                        bits &= bits - 1;
                    }
                }
            }
            BlockLayout::All => {}
            BlockLayout::Dense => {
                if let Some(power) = self.rank_power {
                    let words_per_entry = 1usize << (power - 6);
                    let mut rank = 0u32;
                    for chunk in self.words.chunks(words_per_entry) {
                        payload.write_u16::<LE>(rank as u16)?;
                        rank += chunk.iter().map(|w| w.count_ones()).sum::<u32>();
                    }
                }
                for &word in &self.words {
                    payload.write_u64::<LE>(word)?;
                }
            }
        }
        self.out.write_all(&payload)?;
        self.written += payload.len() as u64;
        self.cardinality += cardinality as u64;
        self.block_cardinality = 0;
        self.words.fill(0);
        Ok(())
    }
}

/// Read-only view of a bitset written by [`BitSetWriter`].
#[derive(Clone, Copy)]
pub struct IndexedBitSet<'a> {
    blocks: &'a [u8],
    jumps: &'a [u8],
    jump_table_entries: u32,
    rank_power: Option<u8>,
}

impl<'a> IndexedBitSet<'a> {
    /// Wraps the bytes of a complete bitset (blocks followed by the jump table).
    pub fn new(
        data: &'a [u8],
        jump_table_entries: u32,
        rank_power: Option<u8>,
    ) -> Result<IndexedBitSet<'a>> {
        let jump_len = jump_table_entries as usize * JUMP_ENTRY_SIZE;
        verify_data!(jump_table, data.len() >= jump_len);
        if let Some(power) = rank_power {
            verify_data!(
                rank_power,
                (MIN_RANK_POWER..=MAX_RANK_POWER).contains(&power)
            );
        }
        let (blocks, jumps) = data.split_at(data.len() - jump_len);
        Ok(IndexedBitSet {
            blocks,
            jumps,
            jump_table_entries,
            rank_power,
        })
    }

    /// Returns the position of `doc` among the documents of the set (its rank),
    /// or `None` when `doc` is absent.
    pub fn index_of(&self, doc: u32) -> Result<Option<u64>> {
        let block = doc >> BLOCK_SHIFT;
        if block >= self.jump_table_entries {
            return Ok(None);
        }
        let mut jump = DataInput::at(self.jumps, block as u64 * JUMP_ENTRY_SIZE as u64)?;
        let index = jump.read_u32()? as u64;
        let offset = jump.read_u32()? as u64;
        if offset == self.blocks.len() as u64 {
            return Ok(None);
        }
        let mut input = DataInput::at(self.blocks, offset)?;
        if input.read_u16()? as u32 != block {
            return Ok(None);
        }
        let cardinality = input.read_u16()? as u32 + 1;
        let low = doc & (BLOCK_SIZE - 1);
        match BlockLayout::for_cardinality(cardinality) {
            BlockLayout::Sparse => {
                let lows = input.read_bytes(cardinality as usize * 2)?;
                let lows: Vec<u16> = lows
                    .chunks_exact(2)
                    .map(|b| u16::from_le_bytes([b[0], b[1]]))
                    .collect();
                Ok(lows
                    .binary_search(&(low as u16))
                    .ok()
                    .map(|pos| index + pos as u64))
            }
            BlockLayout::All => Ok(Some(index + low as u64)),
            BlockLayout::Dense => {
                let rank = input.read_bytes(rank_table_len(self.rank_power))?;
                let words = input.read_bytes(DENSE_WORDS * 8)?;
                let word_at = |i: usize| {
                    u64::from_le_bytes(words[i * 8..i * 8 + 8].try_into().unwrap_or([0; 8]))
                };
                let word_index = (low >> 6) as usize;
                let bit = 1u64 << (low & 63);
                let word = word_at(word_index);
                if word & bit == 0 {
                    return Ok(None);
                }
                let (base, start_word) = match self.rank_power {
                    Some(power) => {
                        let entry = (low >> power) as usize;
                        let base = u16::from_le_bytes([rank[entry * 2], rank[entry * 2 + 1]]);
                        (base as u64, (entry << power) >> 6)
                    }
                    None => (0, 0),
                };
                let before: u64 = (start_word..word_index)
                    .map(|i| word_at(i).count_ones() as u64)
                    .sum();
                let within = (word & (bit - 1)).count_ones() as u64;
                Ok(Some(index + base + before + within))
            }
        }
    }

    /// Iterates the documents of the set in increasing order.
    pub fn docs(&self) -> BitSetDocs<'a> {
        BitSetDocs {
            set: *self,
            pos: 0,
            block_docs: Vec::new(),
            next: 0,
        }
    }

    fn decode_block(&self, pos: u64, docs: &mut Vec<u32>) -> Result<u64> {
        let mut input = DataInput::at(self.blocks, pos)?;
        let base = (input.read_u16()? as u32) << BLOCK_SHIFT;
        let cardinality = input.read_u16()? as u32 + 1;
        docs.clear();
        match BlockLayout::for_cardinality(cardinality) {
            BlockLayout::Sparse => {
                for _ in 0..cardinality {
                    docs.push(base | input.read_u16()? as u32);
                }
            }
            BlockLayout::All => docs.extend(base..base + BLOCK_SIZE),
            BlockLayout::Dense => {
                input.skip(rank_table_len(self.rank_power) as u64)?;
                for word_index in 0..DENSE_WORDS as u32 {
                    let mut bits = input.read_u64()?;
                    while bits != 0 {
                        docs.push(base | (word_index * 64 + bits.trailing_zeros()));
                        bits &= bits - 1;
                    }
                }
                verify_data!(cardinality, docs.len() as u32 == cardinality);
            }
        }
        Ok(input.position())
    }
}

/// Iterator over the documents of an [`IndexedBitSet`].
pub struct BitSetDocs<'a> {
    set: IndexedBitSet<'a>,
    pos: u64,
    block_docs: Vec<u32>,
    next: usize,
}

impl Iterator for BitSetDocs<'_> {
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.block_docs.len() {
            if self.pos >= self.set.blocks.len() as u64 {
                return None;
            }
            self.pos = try_or_ret_some_err!(self.set.decode_block(self.pos, &mut self.block_docs));
            self.next = 0;
        }
        let doc = self.block_docs[self.next];
        self.next += 1;
        Some(Ok(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(docs: &[u32], rank_power: Option<u8>) -> (Vec<u8>, BitSetSummary) {
        let mut writer = BitSetWriter::new(Vec::new(), rank_power).unwrap();
        for &doc in docs {
            writer.add(doc).unwrap();
        }
        writer.finish().unwrap()
    }

    fn check(docs: &[u32], rank_power: Option<u8>) {
        let (bytes, summary) = build(docs, rank_power);
        assert_eq!(summary.cardinality, docs.len() as u64);
        assert_eq!(summary.length, bytes.len() as u64);
        let set = IndexedBitSet::new(&bytes, summary.jump_table_entries, rank_power).unwrap();

        let decoded = set.docs().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(decoded, docs);

        for (index, &doc) in docs.iter().enumerate() {
            assert_eq!(set.index_of(doc).unwrap(), Some(index as u64));
        }
        let max = docs.last().copied().unwrap_or(0);
        for probe in [0, 1, max / 2, max + 1, max + 70_000] {
            let expected = docs.binary_search(&probe).ok().map(|i| i as u64);
            assert_eq!(set.index_of(probe).unwrap(), expected, "doc {probe}");
        }
    }

    #[test]
    fn test_sparse_blocks() {
        check(&[0, 3, 100, 65535, 65536, 200_000], Some(9));
    }

    #[test]
    fn test_dense_and_all_blocks() {
        let mut docs: Vec<u32> = (0..BLOCK_SIZE).collect();
        let mut rng = fastrand::Rng::with_seed(3);
        docs.extend((BLOCK_SIZE..2 * BLOCK_SIZE).filter(|_| rng.bool()));
        docs.extend(3 * BLOCK_SIZE..3 * BLOCK_SIZE + 5000);
        for rank_power in [None, Some(7), Some(9), Some(15)] {
            check(&docs, rank_power);
        }
    }

    #[test]
    fn test_jump_table_gaps() {
        let docs = [10, 5 * BLOCK_SIZE + 1];
        let (bytes, summary) = build(&docs, Some(9));
        assert_eq!(summary.jump_table_entries, 6);
        let set = IndexedBitSet::new(&bytes, summary.jump_table_entries, Some(9)).unwrap();
        assert_eq!(set.index_of(2 * BLOCK_SIZE + 10).unwrap(), None);
        assert_eq!(set.index_of(5 * BLOCK_SIZE + 1).unwrap(), Some(1));
    }

    #[test]
    fn test_random_probes() {
        let mut rng = fastrand::Rng::with_seed(99);
        let density = [0.001, 0.05, 0.5, 0.99];
        for &p in &density {
            let docs: Vec<u32> = (0..300_000u32).filter(|_| rng.f64() < p).collect();
            if docs.is_empty() {
                continue;
            }
            check(&docs, Some(9));
        }
    }

    #[test]
    fn test_contract() {
        let mut writer = BitSetWriter::new(Vec::new(), None).unwrap();
        writer.add(5).unwrap();
        let err = writer.add(5).unwrap_err();
        assert!(err.is_fatal());
        assert!(BitSetWriter::new(Vec::new(), Some(6)).is_err());
    }
}
