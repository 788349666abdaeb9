//! Term dictionary of the ordinal fields.
//!
//! Terms are split into blocks of `1 << block_shift` ordinals. The first term of
//! a block is stored raw (`vint` length + bytes). The remaining terms are
//! front-coded against their predecessor: one byte
//! `min(prefix, 15) | min(suffix - 1, 15) << 4`, a `vint` of `prefix - 15` when
//! `prefix >= 15`, a `vint` of `suffix - 16` when `suffix >= 16`, then the
//! suffix bytes. The front-coded bytes of a block are compressed as one zstd
//! frame whose dictionary is seeded with the block's first term, so every block
//! decodes on its own. A compressed block is stored as `vint` uncompressed
//! length, `vint` compressed length, compressed bytes; blocks with a single
//! term have none.
//!
//! A monotonic table holds the offset of every block. The reverse index samples
//! one ordinal out of `1 << reverse_shift` and keeps the shortest prefix of the
//! sampled term that sorts after the term preceding it.
//!
//! Meta record:
//!
//! ```text
//! vlong term_count
//! u8    block_shift
//! u8    monotonic_block_shift
//! ...   block address headers
//! i32   max_term_length
//! i32   max_block_length
//! i64   terms_offset, i64 terms_length
//! i64   terms_addresses_offset, i64 terms_addresses_length
//! u8    reverse_shift
//! ...   reverse index address headers
//! i64   reverse_offset, i64 reverse_length
//! i64   reverse_addresses_offset, i64 reverse_addresses_length
//! ```

use std::cmp::Ordering;

use byteorder::{LE, WriteBytesExt};
use docvalues_common::{Result, verify_contract, verify_data};
use docvalues_io::{ArtifactWriter, DataInput, VarIntWrite};

use crate::{
    monotonic::{MonotonicMeta, MonotonicWriter},
    values::TermsProducer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermsDictPolicy {
    pub block_shift: u8,
    pub reverse_shift: u8,
    pub monotonic_block_shift: u8,
    pub compression_level: i32,
}

impl Default for TermsDictPolicy {
    fn default() -> Self {
        TermsDictPolicy {
            block_shift: 6,
            reverse_shift: 10,
            monotonic_block_shift: 16,
            compression_level: 3,
        }
    }
}

/// Sizes reported by [`write_terms_dict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermsDictSummary {
    pub term_count: u64,
    pub num_blocks: u64,
    pub compressed_blocks: u64,
    pub max_term_length: u32,
    pub max_block_length: u32,
}

/// Writes the dictionary of `producer`; the producer's terms are scanned twice.
pub fn write_terms_dict(
    producer: &dyn TermsProducer,
    policy: &TermsDictPolicy,
    data: &mut ArtifactWriter,
    meta: &mut ArtifactWriter,
) -> Result<TermsDictSummary> {
    let summary = write_terms(producer, policy, data, meta)?;
    write_reverse_index(producer, policy, data, meta)?;
    log::debug!(
        "terms dictionary: {} terms, {} blocks ({} compressed), max term length {}, max block length {}",
        summary.term_count,
        summary.num_blocks,
        summary.compressed_blocks,
        summary.max_term_length,
        summary.max_block_length
    );
    Ok(summary)
}

fn write_terms(
    producer: &dyn TermsProducer,
    policy: &TermsDictPolicy,
    data: &mut ArtifactWriter,
    meta: &mut ArtifactWriter,
) -> Result<TermsDictSummary> {
    let term_count = producer.term_count();
    let block_mask = (1u64 << policy.block_shift) - 1;
    let num_blocks = term_count.div_ceil(1 << policy.block_shift);
    meta.write_vlong(term_count)?;
    meta.write_u8(policy.block_shift)?;
    meta.write_u8(policy.monotonic_block_shift)?;

    let mut addresses = MonotonicWriter::new(
        &mut *meta,
        Vec::new(),
        num_blocks,
        policy.monotonic_block_shift,
    )?;
    let start = data.position();
    let mut previous = Vec::new();
    let mut dictionary = Vec::new();
    let mut block = Vec::new();
    let mut summary = TermsDictSummary {
        term_count,
        num_blocks,
        compressed_blocks: 0,
        max_term_length: 0,
        max_block_length: 0,
    };

    let mut ord = 0u64;
    let mut terms = producer.terms()?;
    while let Some(term) = terms.next_term()? {
        verify_contract!(term_count, ord < term_count);
        verify_contract!(term_order, ord == 0 || previous.as_slice() < term);
        if ord & block_mask == 0 {
            if !block.is_empty() {
                let len = write_block(&dictionary, &mut block, policy, data)?;
                summary.max_block_length = summary.max_block_length.max(len);
                summary.compressed_blocks += 1;
            }
            addresses.add((data.position() - start) as i64)?;
            data.write_vint(term.len() as u32)?;
            data.write_all(term)?;
            dictionary = block_dictionary(term);
        } else {
            let prefix = mismatch(&previous, term);
            let suffix = term.len() - prefix;
            block.push((prefix.min(15) | ((suffix - 1).min(15) << 4)) as u8);
            if prefix >= 15 {
                block.write_vint((prefix - 15) as u32)?;
            }
            if suffix >= 16 {
                block.write_vint((suffix - 16) as u32)?;
            }
            block.extend_from_slice(&term[prefix..]);
        }
        summary.max_term_length = summary.max_term_length.max(term.len() as u32);
        previous.clear();
        previous.extend_from_slice(term);
        ord += 1;
    }
    verify_contract!(term_count, ord == term_count);
    if !block.is_empty() {
        let len = write_block(&dictionary, &mut block, policy, data)?;
        summary.max_block_length = summary.max_block_length.max(len);
        summary.compressed_blocks += 1;
    }
    let (_, address_data, _) = addresses.finish()?;

    meta.write_i32::<LE>(summary.max_term_length as i32)?;
    meta.write_i32::<LE>(summary.max_block_length as i32)?;
    meta.write_i64::<LE>(start as i64)?;
    meta.write_i64::<LE>((data.position() - start) as i64)?;
    let address_start = data.position();
    data.write_all(&address_data)?;
    meta.write_i64::<LE>(address_start as i64)?;
    meta.write_i64::<LE>(address_data.len() as i64)?;
    Ok(summary)
}

/// Compresses and writes the front-coded bytes of one block, returning their
/// uncompressed length.
fn write_block(
    dictionary: &[u8],
    block: &mut Vec<u8>,
    policy: &TermsDictPolicy,
    data: &mut ArtifactWriter,
) -> Result<u32> {
    let compressed = zstd::bulk::Compressor::with_dictionary(policy.compression_level, dictionary)?
        .compress(block)?;
    let len = block.len() as u32;
    data.write_vint(len)?;
    data.write_vint(compressed.len() as u32)?;
    data.write_all(&compressed)?;
    log::trace!("terms block: {} bytes, {} compressed", len, compressed.len());
    block.clear();
    Ok(len)
}

fn write_reverse_index(
    producer: &dyn TermsProducer,
    policy: &TermsDictPolicy,
    data: &mut ArtifactWriter,
    meta: &mut ArtifactWriter,
) -> Result<()> {
    let term_count = producer.term_count();
    let mask = (1u64 << policy.reverse_shift) - 1;
    let num_entries = 1 + term_count.div_ceil(1 << policy.reverse_shift);
    meta.write_u8(policy.reverse_shift)?;

    let mut addresses = MonotonicWriter::new(
        &mut *meta,
        Vec::new(),
        num_entries,
        policy.monotonic_block_shift,
    )?;
    let start = data.position();
    let mut offset = 0i64;
    let mut previous = Vec::new();
    let mut ord = 0u64;
    let mut terms = producer.terms()?;
    while let Some(term) = terms.next_term()? {
        if ord & mask == 0 {
            addresses.add(offset)?;
            let len = if ord == 0 {
                0
            } else {
                sort_key_length(&previous, term)
            };
            data.write_all(&term[..len])?;
            offset += len as i64;
        } else if ord & mask == mask {
            previous.clear();
            previous.extend_from_slice(term);
        }
        ord += 1;
    }
    verify_contract!(term_count, ord == term_count);
    addresses.add(offset)?;
    let (_, address_data, _) = addresses.finish()?;

    meta.write_i64::<LE>(start as i64)?;
    meta.write_i64::<LE>((data.position() - start) as i64)?;
    let address_start = data.position();
    data.write_all(&address_data)?;
    meta.write_i64::<LE>(address_start as i64)?;
    meta.write_i64::<LE>(address_data.len() as i64)?;
    Ok(())
}

/// Compression dictionary of a block: a zero byte followed by the first term.
/// The leading byte keeps the seed from ever reading as a trained zstd
/// dictionary header.
fn block_dictionary(first_term: &[u8]) -> Vec<u8> {
    let mut dictionary = Vec::with_capacity(first_term.len() + 1);
    dictionary.push(0);
    dictionary.extend_from_slice(first_term);
    dictionary
}

/// Length of the common prefix of `a` and `b`.
fn mismatch(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Length of the shortest prefix of `term` sorting strictly after `prior`,
/// given `prior < term`.
pub fn sort_key_length(prior: &[u8], term: &[u8]) -> usize {
    mismatch(prior, term) + 1
}

/// Decoded term dictionary meta record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsDictEntry {
    pub term_count: u64,
    pub block_shift: u8,
    pub addresses: MonotonicMeta,
    pub max_term_length: u32,
    pub max_block_length: u32,
    pub terms_offset: u64,
    pub terms_length: u64,
    pub addresses_offset: u64,
    pub addresses_length: u64,
    pub reverse_shift: u8,
    pub reverse_addresses: MonotonicMeta,
    pub reverse_offset: u64,
    pub reverse_length: u64,
    pub reverse_addresses_offset: u64,
    pub reverse_addresses_length: u64,
}

impl TermsDictEntry {
    pub fn read(meta: &mut DataInput) -> Result<TermsDictEntry> {
        let term_count = meta.read_vlong()?;
        let block_shift = meta.read_u8()?;
        let monotonic_block_shift = meta.read_u8()?;
        verify_data!(block_shift, block_shift < 32);
        let num_blocks = term_count.div_ceil(1 << block_shift);
        let addresses = MonotonicMeta::read(meta, num_blocks, monotonic_block_shift)?;
        let max_term_length = meta.read_i32()?;
        let max_block_length = meta.read_i32()?;
        verify_data!(max_lengths, max_term_length >= 0 && max_block_length >= 0);
        let (terms_offset, terms_length) = read_range(meta)?;
        let (addresses_offset, addresses_length) = read_range(meta)?;
        let reverse_shift = meta.read_u8()?;
        verify_data!(reverse_shift, reverse_shift >= 1 && reverse_shift < 32);
        let num_entries = 1 + term_count.div_ceil(1 << reverse_shift);
        let reverse_addresses = MonotonicMeta::read(meta, num_entries, monotonic_block_shift)?;
        let (reverse_offset, reverse_length) = read_range(meta)?;
        let (reverse_addresses_offset, reverse_addresses_length) = read_range(meta)?;
        Ok(TermsDictEntry {
            term_count,
            block_shift,
            addresses,
            max_term_length: max_term_length as u32,
            max_block_length: max_block_length as u32,
            terms_offset,
            terms_length,
            addresses_offset,
            addresses_length,
            reverse_shift,
            reverse_addresses,
            reverse_offset,
            reverse_length,
            reverse_addresses_offset,
            reverse_addresses_length,
        })
    }

    pub fn num_blocks(&self) -> u64 {
        self.term_count.div_ceil(1 << self.block_shift)
    }

    pub fn open<'a>(&'a self, data: &'a [u8]) -> Result<TermsDict<'a>> {
        Ok(TermsDict {
            entry: self,
            terms: slice(data, self.terms_offset, self.terms_length)?,
            addresses: slice(data, self.addresses_offset, self.addresses_length)?,
            reverse: slice(data, self.reverse_offset, self.reverse_length)?,
            reverse_addresses: slice(
                data,
                self.reverse_addresses_offset,
                self.reverse_addresses_length,
            )?,
        })
    }
}

fn read_range(meta: &mut DataInput) -> Result<(u64, u64)> {
    let offset = meta.read_i64()?;
    let length = meta.read_i64()?;
    verify_data!(range, offset >= 0 && length >= 0);
    Ok((offset as u64, length as u64))
}

fn slice(data: &[u8], offset: u64, length: u64) -> Result<&[u8]> {
    Ok(DataInput::at(data, offset)?.read_bytes(length as usize)?)
}

/// Lookups over a term dictionary.
pub struct TermsDict<'a> {
    entry: &'a TermsDictEntry,
    terms: &'a [u8],
    addresses: &'a [u8],
    reverse: &'a [u8],
    reverse_addresses: &'a [u8],
}

impl TermsDict<'_> {
    pub fn term_count(&self) -> u64 {
        self.entry.term_count
    }

    /// Decodes every term of block `block`.
    pub fn block_terms(&self, block: u64) -> Result<Vec<Vec<u8>>> {
        verify_data!(block, block < self.entry.num_blocks());
        let block_size = 1u64 << self.entry.block_shift;
        let count = std::cmp::min(block_size, self.entry.term_count - block * block_size) as usize;
        let offset = self.entry.addresses.get(self.addresses, block)?;
        verify_data!(block_offset, offset >= 0);
        let mut input = DataInput::at(self.terms, offset as u64)?;
        let first_len = input.read_vint()? as usize;
        verify_data!(term_length, first_len <= self.entry.max_term_length as usize);
        let first = input.read_bytes(first_len)?.to_vec();
        let mut terms = Vec::with_capacity(count);
        if count > 1 {
            let uncompressed_len = input.read_vint()? as usize;
            let compressed_len = input.read_vint()? as usize;
            verify_data!(
                block_length,
                uncompressed_len <= self.entry.max_block_length as usize
            );
            let compressed = input.read_bytes(compressed_len)?;
            let bytes = zstd::bulk::Decompressor::with_dictionary(&block_dictionary(&first))?
                .decompress(compressed, uncompressed_len)?;
            verify_data!(block_length, bytes.len() == uncompressed_len);

            let mut coded = DataInput::new(&bytes);
            let mut previous = first.clone();
            terms.push(first);
            for _ in 1..count {
                let token = coded.read_u8()? as usize;
                let mut prefix = token & 0x0f;
                let mut suffix = 1 + (token >> 4);
                if prefix == 15 {
                    prefix += coded.read_vint()? as usize;
                }
                if suffix == 16 {
                    suffix += coded.read_vint()? as usize;
                }
                verify_data!(term_prefix, prefix <= previous.len());
                let mut term = Vec::with_capacity(prefix + suffix);
                term.extend_from_slice(&previous[..prefix]);
                term.extend_from_slice(coded.read_bytes(suffix)?);
                previous.clone_from(&term);
                terms.push(term);
            }
        } else {
            terms.push(first);
        }
        Ok(terms)
    }

    /// Returns the term of ordinal `ord`.
    pub fn term(&self, ord: u64) -> Result<Vec<u8>> {
        verify_data!(ord, ord < self.entry.term_count);
        let mut terms = self.block_terms(ord >> self.entry.block_shift)?;
        let index = (ord & ((1 << self.entry.block_shift) - 1)) as usize;
        Ok(terms.swap_remove(index))
    }

    /// Returns the smallest ordinal whose term is at least `key`, or `None` when
    /// every term sorts before `key`.
    pub fn seek_ceil(&self, key: &[u8]) -> Result<Option<u64>> {
        let term_count = self.entry.term_count;
        if term_count == 0 {
            return Ok(None);
        }

        // The sampled prefix of entry `i` sorts after every term below ordinal
        // `i << reverse_shift` and at or before the term at that ordinal.
        let sampled = term_count.div_ceil(1 << self.entry.reverse_shift);
        let (mut lo, mut hi) = (0u64, sampled - 1);
        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            if self.index_term(mid)? <= key {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let first_ord = lo << self.entry.reverse_shift;
        let last_ord = std::cmp::min((lo + 1) << self.entry.reverse_shift, term_count) - 1;

        let block_shift = self.entry.block_shift;
        let (mut lo_block, mut hi_block) = (first_ord >> block_shift, last_ord >> block_shift);
        if self.block_terms(lo_block)?[0].as_slice() > key {
            return Ok(Some(first_ord));
        }
        while lo_block < hi_block {
            let mid = lo_block + (hi_block - lo_block).div_ceil(2);
            if self.block_terms(mid)?[0].as_slice() <= key {
                lo_block = mid;
            } else {
                hi_block = mid - 1;
            }
        }

        let base = lo_block << block_shift;
        for (i, term) in self.block_terms(lo_block)?.iter().enumerate() {
            if term.as_slice() >= key {
                return Ok(Some(base + i as u64));
            }
        }
        let next = (lo_block + 1) << block_shift;
        Ok((next < term_count).then_some(next))
    }

    /// Returns the ordinal of `key`, or `None` when it is not in the dictionary.
    pub fn lookup_term(&self, key: &[u8]) -> Result<Option<u64>> {
        match self.seek_ceil(key)? {
            Some(ord) if self.term(ord)?.as_slice().cmp(key) == Ordering::Equal => Ok(Some(ord)),
            _ => Ok(None),
        }
    }

    fn index_term(&self, index: u64) -> Result<&[u8]> {
        let start = self.entry.reverse_addresses.get(self.reverse_addresses, index)?;
        let end = self
            .entry
            .reverse_addresses
            .get(self.reverse_addresses, index + 1)?;
        verify_data!(
            reverse_index,
            0 <= start && start <= end && end as u64 <= self.reverse.len() as u64
        );
        Ok(&self.reverse[start as usize..end as usize])
    }
}

#[cfg(test)]
mod tests {
    use docvalues_io::{
        framing::{StreamHeader, verify_footer},
        memory::SharedBuffer,
    };

    use super::*;
    use crate::values::TermsCursor;

    struct Terms(Vec<Vec<u8>>);

    struct TermsIter<'a> {
        terms: &'a [Vec<u8>],
        next: usize,
    }

    impl TermsCursor for TermsIter<'_> {
        fn next_term(&mut self) -> Result<Option<&[u8]>> {
            let term = self.terms.get(self.next).map(|t| t.as_slice());
            self.next += 1;
            Ok(term)
        }
    }

    impl TermsProducer for Terms {
        fn terms(&self) -> Result<Box<dyn TermsCursor + '_>> {
            Ok(Box::new(TermsIter {
                terms: &self.0,
                next: 0,
            }))
        }

        fn term_count(&self) -> u64 {
            self.0.len() as u64
        }
    }

    fn encode(terms: &Terms, policy: &TermsDictPolicy) -> Result<(TermsDictSummary, TermsDictEntry, Vec<u8>)> {
        let header = StreamHeader::new("Terms", 0, [0; 16]);
        let data_buf = SharedBuffer::new();
        let meta_buf = SharedBuffer::new();
        let mut data = ArtifactWriter::framed(Box::new(data_buf.clone()), "d", &header)?;
        let mut meta = ArtifactWriter::framed(Box::new(meta_buf.clone()), "m", &header)?;
        let summary = write_terms_dict(terms, policy, &mut data, &mut meta)?;
        data.seal()?;
        meta.seal()?;

        let meta_stream = meta_buf.contents();
        let body = verify_footer(&meta_stream, "m")?;
        let mut input = DataInput::at(body, header.encoded_len() as u64)?;
        let entry = TermsDictEntry::read(&mut input)?;
        assert_eq!(input.remaining(), 0);
        Ok((summary, entry, data_buf.contents()))
    }

    fn random_terms(rng: &mut fastrand::Rng, count: usize) -> Vec<Vec<u8>> {
        let mut terms: Vec<Vec<u8>> = (0..count * 2)
            .map(|_| {
                let len = rng.usize(0..40);
                let prefix = rng.u8(b'a'..b'e');
                std::iter::once(prefix)
                    .chain((0..len).map(|_| rng.u8(b'a'..=b'z')))
                    .collect()
            })
            .collect();
        terms.sort();
        terms.dedup();
        terms.truncate(count);
        terms
    }

    #[test]
    fn test_two_blocks() {
        let policy = TermsDictPolicy::default();
        let block_size = 1usize << policy.block_shift;
        let mut rng = fastrand::Rng::with_seed(1);
        let terms = Terms(random_terms(&mut rng, 2 * block_size));
        assert_eq!(terms.0.len(), 2 * block_size);

        let (summary, entry, data) = encode(&terms, &policy).unwrap();
        assert_eq!(summary.num_blocks, 2);
        assert_eq!(summary.compressed_blocks, 2);
        assert_eq!(entry.num_blocks(), 2);

        let dict = entry.open(&data).unwrap();
        assert_eq!(dict.block_terms(1).unwrap(), terms.0[block_size..]);
        assert_eq!(dict.block_terms(0).unwrap(), terms.0[..block_size]);
    }

    #[test]
    fn test_blocks_decode_independently() {
        let policy = TermsDictPolicy::default();
        let block_size = 1u64 << policy.block_shift;
        let terms = Terms(
            (0..2 * block_size)
                .map(|i| format!("term-{i:05}").into_bytes())
                .collect(),
        );
        let (_, entry, data) = encode(&terms, &policy).unwrap();
        let dict = entry.open(&data).unwrap();

        // Each compressed block decompresses with its own first term as the only seed.
        for block in 0..2 {
            let offset = entry.addresses.get(dict.addresses, block).unwrap() as u64;
            let mut input = DataInput::at(dict.terms, offset).unwrap();
            let first_len = input.read_vint().unwrap() as usize;
            let first = input.read_bytes(first_len).unwrap();
            assert_eq!(first, terms.0[(block * block_size) as usize]);
            let uncompressed = input.read_vint().unwrap() as usize;
            let compressed = input.read_vint().unwrap() as usize;
            let bytes = zstd::bulk::Decompressor::with_dictionary(&block_dictionary(first))
                .unwrap()
                .decompress(input.read_bytes(compressed).unwrap(), uncompressed)
                .unwrap();
            assert_eq!(bytes.len(), uncompressed);
        }
    }

    #[test]
    fn test_lookups() {
        check_lookups(TermsDictPolicy {
            block_shift: 3,
            reverse_shift: 4,
            ..TermsDictPolicy::default()
        });
        // Reverse index entries falling inside a block.
        check_lookups(TermsDictPolicy {
            block_shift: 6,
            reverse_shift: 2,
            ..TermsDictPolicy::default()
        });
    }

    fn check_lookups(policy: TermsDictPolicy) {
        let mut rng = fastrand::Rng::with_seed(2);
        let terms = Terms(random_terms(&mut rng, 1000));
        let (summary, entry, data) = encode(&terms, &policy).unwrap();
        assert_eq!(summary.term_count, terms.0.len() as u64);
        assert!(summary.max_term_length <= 41);
        let dict = entry.open(&data).unwrap();

        for (ord, term) in terms.0.iter().enumerate() {
            assert_eq!(&dict.term(ord as u64).unwrap(), term);
            assert_eq!(dict.lookup_term(term).unwrap(), Some(ord as u64));
        }
        for _ in 0..500 {
            let len = rng.usize(0..10);
            let key: Vec<u8> = (0..len).map(|_| rng.u8(b'a'..=b'f')).collect();
            let expected = terms.0.partition_point(|t| t < &key) as u64;
            let expected = (expected < terms.0.len() as u64).then_some(expected);
            assert_eq!(dict.seek_ceil(&key).unwrap(), expected, "key {key:?}");
            if terms.0.binary_search(&key).is_err() {
                assert_eq!(dict.lookup_term(&key).unwrap(), None);
            }
        }
        assert_eq!(dict.seek_ceil(b"zzzz").unwrap(), None);
        assert_eq!(dict.seek_ceil(b"").unwrap(), Some(0));
    }

    #[test]
    fn test_long_prefixes_and_suffixes() {
        let base = vec![b'x'; 40];
        let mut terms = vec![base.clone()];
        let mut with_suffix = base.clone();
        with_suffix.extend(std::iter::repeat_n(b'y', 30));
        terms.push(with_suffix);
        terms.push(vec![b'y'; 3]);
        let terms = Terms(terms);
        let (_, entry, data) = encode(&terms, &TermsDictPolicy::default()).unwrap();
        let dict = entry.open(&data).unwrap();
        assert_eq!(dict.block_terms(0).unwrap(), terms.0);
    }

    #[test]
    fn test_empty_and_single_term() {
        let (summary, entry, data) = encode(&Terms(vec![]), &TermsDictPolicy::default()).unwrap();
        assert_eq!(summary.num_blocks, 0);
        let dict = entry.open(&data).unwrap();
        assert_eq!(dict.seek_ceil(b"a").unwrap(), None);

        let (summary, entry, data) =
            encode(&Terms(vec![b"only".to_vec()]), &TermsDictPolicy::default()).unwrap();
        assert_eq!(summary.compressed_blocks, 0);
        let dict = entry.open(&data).unwrap();
        assert_eq!(dict.term(0).unwrap(), b"only");
        assert_eq!(dict.lookup_term(b"only").unwrap(), Some(0));
    }

    #[test]
    fn test_unsorted_terms_rejected() {
        let terms = Terms(vec![b"b".to_vec(), b"a".to_vec()]);
        let err = encode(&terms, &TermsDictPolicy::default()).unwrap_err();
        assert!(err.is_fatal());

        let terms = Terms(vec![b"a".to_vec(), b"a".to_vec()]);
        assert!(encode(&terms, &TermsDictPolicy::default()).is_err());
    }

    #[test]
    fn test_sort_key_length() {
        assert_eq!(sort_key_length(b"abc", b"abd"), 3);
        assert_eq!(sort_key_length(b"ab", b"abc"), 3);
        assert_eq!(sort_key_length(b"a", b"b"), 1);
    }
}
