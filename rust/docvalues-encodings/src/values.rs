//! Forward-only value cursors and the restartable producers handing them out.
//!
//! A cursor walks the documents of one field that carry at least one value, in
//! increasing doc id order. After [`DocCursor::next_doc`] returns a document, the
//! type-specific accessors describe that document's value(s). Cursors are
//! single-use: every pass over a field (skip index, statistics, presence,
//! values) asks its producer for a fresh one.

use docvalues_common::Result;

pub trait DocCursor {
    /// Advances to the next document with a value and returns its id, or `None`
    /// once the field is exhausted.
    fn next_doc(&mut self) -> Result<Option<u32>>;
}

/// One integer per document.
pub trait NumericCursor: DocCursor {
    fn value(&self) -> Result<i64>;
}

/// One or more integers per document, in ascending order.
pub trait SortedNumericCursor: DocCursor {
    /// Number of values of the current document, at least 1.
    fn value_count(&self) -> u32;

    /// Returns the next value of the current document. Must be called at most
    /// `value_count()` times per document.
    fn next_value(&mut self) -> Result<i64>;
}

/// One byte string per document.
pub trait BinaryCursor: DocCursor {
    fn binary_value(&self) -> Result<&[u8]>;
}

/// One term ordinal per document.
pub trait SortedCursor: DocCursor {
    fn ord(&self) -> Result<u64>;
}

/// One or more distinct term ordinals per document, in ascending order.
pub trait SortedSetCursor: DocCursor {
    fn value_count(&self) -> u32;

    fn next_ord(&mut self) -> Result<u64>;
}

/// Walks the terms of a dictionary in ascending byte order.
pub trait TermsCursor {
    fn next_term(&mut self) -> Result<Option<&[u8]>>;
}

pub trait NumericProducer {
    fn cursor(&self) -> Result<Box<dyn NumericCursor + '_>>;
}

pub trait BinaryProducer {
    fn cursor(&self) -> Result<Box<dyn BinaryCursor + '_>>;
}

/// Integer lists per document.
///
/// The numeric encoder, the statistics collector and the skip index builder
/// consume this shape only; numeric and ordinal fields are viewed through it.
pub trait SortedNumericProducer {
    fn cursor(&self) -> Result<Box<dyn SortedNumericCursor + '_>>;
}

/// The ascending, duplicate-free terms of a dictionary field.
pub trait TermsProducer {
    fn terms(&self) -> Result<Box<dyn TermsCursor + '_>>;

    fn term_count(&self) -> u64;
}

/// Dictionary-encoded values: per-document ordinals plus the term dictionary
/// they index. Ordinal `i` names the `i`-th term of [`TermsProducer::terms`].
pub trait SortedProducer: TermsProducer {
    fn cursor(&self) -> Result<Box<dyn SortedCursor + '_>>;
}

pub trait SortedSetProducer: TermsProducer {
    fn cursor(&self) -> Result<Box<dyn SortedSetCursor + '_>>;
}
