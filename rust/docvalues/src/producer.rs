//! In-memory columns implementing the value producer traits.
//!
//! The columns store what they are given: document order, value order and
//! ordinal ranges are checked by the writer, not here. The `from_*` builders
//! of the dictionary columns produce valid dictionaries and ordinals.

use std::collections::BTreeSet;

use ahash::AHashMap;
use docvalues_common::Result;
use docvalues_encodings::values::{
    BinaryCursor, BinaryProducer, DocCursor, NumericCursor, NumericProducer, SortedCursor,
    SortedNumericCursor, SortedNumericProducer, SortedProducer, SortedSetCursor,
    SortedSetProducer, TermsCursor, TermsProducer,
};

/// Position of a cursor over parallel per-document vectors.
#[derive(Debug, Default, Clone, Copy)]
struct Position {
    next: usize,
}

impl Position {
    /// Advances over `docs`, returning the index of the new current document.
    fn advance(&mut self, docs: &[u32]) -> Option<usize> {
        let index = self.next;
        if index < docs.len() {
            self.next += 1;
            Some(index)
        } else {
            None
        }
    }

    fn current(&self) -> usize {
        self.next.saturating_sub(1)
    }
}

/// One integer per document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericColumn {
    docs: Vec<u32>,
    values: Vec<i64>,
}

impl NumericColumn {
    pub fn new() -> NumericColumn {
        Default::default()
    }

    pub fn push(&mut self, doc: u32, value: i64) {
        self.docs.push(doc);
        self.values.push(value);
    }

    pub fn docs(&self) -> &[u32] {
        &self.docs
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

impl FromIterator<(u32, i64)> for NumericColumn {
    fn from_iter<T: IntoIterator<Item = (u32, i64)>>(iter: T) -> Self {
        let (docs, values) = iter.into_iter().unzip();
        NumericColumn { docs, values }
    }
}

struct NumericColumnCursor<'a> {
    column: &'a NumericColumn,
    pos: Position,
}

impl DocCursor for NumericColumnCursor<'_> {
    fn next_doc(&mut self) -> Result<Option<u32>> {
        Ok(self.pos.advance(&self.column.docs).map(|i| self.column.docs[i]))
    }
}

impl NumericCursor for NumericColumnCursor<'_> {
    fn value(&self) -> Result<i64> {
        Ok(self.column.values[self.pos.current()])
    }
}

impl NumericProducer for NumericColumn {
    fn cursor(&self) -> Result<Box<dyn NumericCursor + '_>> {
        Ok(Box::new(NumericColumnCursor {
            column: self,
            pos: Position::default(),
        }))
    }
}

/// One byte string per document, stored back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryColumn {
    docs: Vec<u32>,
    offsets: Vec<usize>,
    bytes: Vec<u8>,
}

impl BinaryColumn {
    pub fn new() -> BinaryColumn {
        BinaryColumn {
            docs: Vec::new(),
            offsets: vec![0],
            bytes: Vec::new(),
        }
    }

    pub fn push(&mut self, doc: u32, value: &[u8]) {
        self.docs.push(doc);
        self.bytes.extend_from_slice(value);
        self.offsets.push(self.bytes.len());
    }

    pub fn docs(&self) -> &[u32] {
        &self.docs
    }

    pub fn value(&self, index: usize) -> &[u8] {
        &self.bytes[self.offsets[index]..self.offsets[index + 1]]
    }
}

impl Default for BinaryColumn {
    fn default() -> Self {
        BinaryColumn::new()
    }
}

impl<V: AsRef<[u8]>> FromIterator<(u32, V)> for BinaryColumn {
    fn from_iter<T: IntoIterator<Item = (u32, V)>>(iter: T) -> Self {
        let mut column = BinaryColumn::new();
        for (doc, value) in iter {
            column.push(doc, value.as_ref());
        }
        column
    }
}

struct BinaryColumnCursor<'a> {
    column: &'a BinaryColumn,
    pos: Position,
}

impl DocCursor for BinaryColumnCursor<'_> {
    fn next_doc(&mut self) -> Result<Option<u32>> {
        Ok(self.pos.advance(&self.column.docs).map(|i| self.column.docs[i]))
    }
}

impl BinaryCursor for BinaryColumnCursor<'_> {
    fn binary_value(&self) -> Result<&[u8]> {
        Ok(self.column.value(self.pos.current()))
    }
}

impl BinaryProducer for BinaryColumn {
    fn cursor(&self) -> Result<Box<dyn BinaryCursor + '_>> {
        Ok(Box::new(BinaryColumnCursor {
            column: self,
            pos: Position::default(),
        }))
    }
}

/// Lists of integers per document; each list is kept sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedNumericColumn {
    docs: Vec<u32>,
    offsets: Vec<usize>,
    values: Vec<i64>,
}

impl SortedNumericColumn {
    pub fn new() -> SortedNumericColumn {
        SortedNumericColumn {
            docs: Vec::new(),
            offsets: vec![0],
            values: Vec::new(),
        }
    }

    /// Appends the values of `doc` in ascending order.
    pub fn push(&mut self, doc: u32, values: &[i64]) {
        let start = self.values.len();
        self.docs.push(doc);
        self.values.extend_from_slice(values);
        self.values[start..].sort_unstable();
        self.offsets.push(self.values.len());
    }

    pub fn docs(&self) -> &[u32] {
        &self.docs
    }

    pub fn values(&self, index: usize) -> &[i64] {
        &self.values[self.offsets[index]..self.offsets[index + 1]]
    }
}

impl Default for SortedNumericColumn {
    fn default() -> Self {
        SortedNumericColumn::new()
    }
}

impl<V: AsRef<[i64]>> FromIterator<(u32, V)> for SortedNumericColumn {
    fn from_iter<T: IntoIterator<Item = (u32, V)>>(iter: T) -> Self {
        let mut column = SortedNumericColumn::new();
        for (doc, values) in iter {
            column.push(doc, values.as_ref());
        }
        column
    }
}

struct ListCursor<'a, T> {
    docs: &'a [u32],
    offsets: &'a [usize],
    items: &'a [T],
    pos: Position,
    next_item: usize,
}

impl<'a, T: Copy> ListCursor<'a, T> {
    fn new(docs: &'a [u32], offsets: &'a [usize], items: &'a [T]) -> Self {
        ListCursor {
            docs,
            offsets,
            items,
            pos: Position::default(),
            next_item: 0,
        }
    }

    fn advance(&mut self) -> Option<u32> {
        let index = self.pos.advance(self.docs)?;
        self.next_item = self.offsets[index];
        Some(self.docs[index])
    }

    fn count(&self) -> u32 {
        let index = self.pos.current();
        (self.offsets[index + 1] - self.offsets[index]) as u32
    }

    fn next_item(&mut self) -> T {
        let item = self.items[self.next_item];
        self.next_item += 1;
        item
    }
}

impl DocCursor for ListCursor<'_, i64> {
    fn next_doc(&mut self) -> Result<Option<u32>> {
        Ok(self.advance())
    }
}

impl SortedNumericCursor for ListCursor<'_, i64> {
    fn value_count(&self) -> u32 {
        self.count()
    }

    fn next_value(&mut self) -> Result<i64> {
        Ok(self.next_item())
    }
}

impl SortedNumericProducer for SortedNumericColumn {
    fn cursor(&self) -> Result<Box<dyn SortedNumericCursor + '_>> {
        Ok(Box::new(ListCursor::new(
            &self.docs,
            &self.offsets,
            &self.values,
        )))
    }
}

struct TermsIter<'a> {
    terms: &'a [Vec<u8>],
    next: usize,
}

impl TermsCursor for TermsIter<'_> {
    fn next_term(&mut self) -> Result<Option<&[u8]>> {
        let term = self.terms.get(self.next).map(Vec::as_slice);
        self.next += 1;
        Ok(term)
    }
}

/// Assigns ordinals to the distinct `terms` in byte order.
fn build_dictionary<'t>(terms: impl Iterator<Item = &'t [u8]>) -> (Vec<Vec<u8>>, AHashMap<&'t [u8], u64>) {
    let sorted: BTreeSet<&[u8]> = terms.collect();
    let ords = sorted
        .iter()
        .enumerate()
        .map(|(ord, &term)| (term, ord as u64))
        .collect();
    (sorted.into_iter().map(<[u8]>::to_vec).collect(), ords)
}

/// One term per document, stored as ordinals into a sorted dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedColumn {
    terms: Vec<Vec<u8>>,
    docs: Vec<u32>,
    ords: Vec<u64>,
}

impl SortedColumn {
    /// Wraps an existing dictionary and per-document ordinals.
    pub fn new(terms: Vec<Vec<u8>>, docs: Vec<u32>, ords: Vec<u64>) -> SortedColumn {
        SortedColumn { terms, docs, ords }
    }

    /// Builds the dictionary from per-document terms.
    pub fn from_terms<V: AsRef<[u8]>>(values: &[(u32, V)]) -> SortedColumn {
        let (terms, ords) = build_dictionary(values.iter().map(|(_, v)| v.as_ref()));
        SortedColumn {
            docs: values.iter().map(|&(doc, _)| doc).collect(),
            ords: values.iter().map(|(_, v)| ords[v.as_ref()]).collect(),
            terms,
        }
    }

    pub fn terms(&self) -> &[Vec<u8>] {
        &self.terms
    }

    pub fn docs(&self) -> &[u32] {
        &self.docs
    }

    pub fn ords(&self) -> &[u64] {
        &self.ords
    }
}

struct SortedColumnCursor<'a> {
    column: &'a SortedColumn,
    pos: Position,
}

impl DocCursor for SortedColumnCursor<'_> {
    fn next_doc(&mut self) -> Result<Option<u32>> {
        Ok(self.pos.advance(&self.column.docs).map(|i| self.column.docs[i]))
    }
}

impl SortedCursor for SortedColumnCursor<'_> {
    fn ord(&self) -> Result<u64> {
        Ok(self.column.ords[self.pos.current()])
    }
}

impl TermsProducer for SortedColumn {
    fn terms(&self) -> Result<Box<dyn TermsCursor + '_>> {
        Ok(Box::new(TermsIter {
            terms: &self.terms,
            next: 0,
        }))
    }

    fn term_count(&self) -> u64 {
        self.terms.len() as u64
    }
}

impl SortedProducer for SortedColumn {
    fn cursor(&self) -> Result<Box<dyn SortedCursor + '_>> {
        Ok(Box::new(SortedColumnCursor {
            column: self,
            pos: Position::default(),
        }))
    }
}

/// Sets of terms per document, stored as ascending ordinals into a sorted
/// dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedSetColumn {
    terms: Vec<Vec<u8>>,
    docs: Vec<u32>,
    offsets: Vec<usize>,
    ords: Vec<u64>,
}

impl SortedSetColumn {
    /// Wraps an existing dictionary and per-document ordinal lists.
    pub fn new(terms: Vec<Vec<u8>>, values: Vec<(u32, Vec<u64>)>) -> SortedSetColumn {
        let mut column = SortedSetColumn {
            terms,
            docs: Vec::with_capacity(values.len()),
            offsets: vec![0],
            ords: Vec::new(),
        };
        for (doc, ords) in values {
            column.docs.push(doc);
            column.ords.extend(ords);
            column.offsets.push(column.ords.len());
        }
        column
    }

    /// Builds the dictionary from per-document terms; duplicate terms of a
    /// document collapse into one ordinal.
    pub fn from_terms<V: AsRef<[u8]>>(values: &[(u32, Vec<V>)]) -> SortedSetColumn {
        let (terms, ords) = build_dictionary(
            values
                .iter()
                .flat_map(|(_, terms)| terms.iter().map(AsRef::as_ref)),
        );
        let values = values
            .iter()
            .map(|(doc, doc_terms)| {
                let set: BTreeSet<u64> = doc_terms.iter().map(|t| ords[t.as_ref()]).collect();
                (*doc, set.into_iter().collect())
            })
            .collect();
        SortedSetColumn::new(terms, values)
    }

    pub fn terms(&self) -> &[Vec<u8>] {
        &self.terms
    }

    pub fn docs(&self) -> &[u32] {
        &self.docs
    }

    pub fn ords(&self, index: usize) -> &[u64] {
        &self.ords[self.offsets[index]..self.offsets[index + 1]]
    }
}

impl DocCursor for ListCursor<'_, u64> {
    fn next_doc(&mut self) -> Result<Option<u32>> {
        Ok(self.advance())
    }
}

impl SortedSetCursor for ListCursor<'_, u64> {
    fn value_count(&self) -> u32 {
        self.count()
    }

    fn next_ord(&mut self) -> Result<u64> {
        Ok(self.next_item())
    }
}

impl TermsProducer for SortedSetColumn {
    fn terms(&self) -> Result<Box<dyn TermsCursor + '_>> {
        Ok(Box::new(TermsIter {
            terms: &self.terms,
            next: 0,
        }))
    }

    fn term_count(&self) -> u64 {
        self.terms.len() as u64
    }
}

impl SortedSetProducer for SortedSetColumn {
    fn cursor(&self) -> Result<Box<dyn SortedSetCursor + '_>> {
        Ok(Box::new(ListCursor::new(&self.docs, &self.offsets, &self.ords)))
    }
}
