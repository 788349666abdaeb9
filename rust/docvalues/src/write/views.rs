//! Numeric views of the producers that are not integer lists already.
//!
//! The statistics collector, the numeric encoder and the skip index builder
//! only consume [`SortedNumericProducer`]; single integers and term ordinals
//! are presented to them through these adapters. The ordinal views check the
//! ordinal contracts while the values stream through.

use docvalues_common::{Result, verify_contract};
use docvalues_encodings::values::{
    DocCursor, NumericCursor, NumericProducer, SortedCursor, SortedNumericCursor,
    SortedNumericProducer, SortedProducer, SortedSetCursor, SortedSetProducer,
};

/// One integer per document, as single-element lists.
pub struct NumericView<'a>(pub &'a dyn NumericProducer);

struct NumericViewCursor<'a> {
    inner: Box<dyn NumericCursor + 'a>,
}

impl DocCursor for NumericViewCursor<'_> {
    fn next_doc(&mut self) -> Result<Option<u32>> {
        self.inner.next_doc()
    }
}

impl SortedNumericCursor for NumericViewCursor<'_> {
    fn value_count(&self) -> u32 {
        1
    }

    fn next_value(&mut self) -> Result<i64> {
        self.inner.value()
    }
}

impl SortedNumericProducer for NumericView<'_> {
    fn cursor(&self) -> Result<Box<dyn SortedNumericCursor + '_>> {
        Ok(Box::new(NumericViewCursor {
            inner: self.0.cursor()?,
        }))
    }
}

/// The ordinal of every document of a sorted field.
pub struct SortedOrdsView<'a>(pub &'a dyn SortedProducer);

struct SortedOrdsCursor<'a> {
    inner: Box<dyn SortedCursor + 'a>,
    term_count: u64,
}

impl DocCursor for SortedOrdsCursor<'_> {
    fn next_doc(&mut self) -> Result<Option<u32>> {
        self.inner.next_doc()
    }
}

impl SortedNumericCursor for SortedOrdsCursor<'_> {
    fn value_count(&self) -> u32 {
        1
    }

    fn next_value(&mut self) -> Result<i64> {
        let ord = self.inner.ord()?;
        verify_contract!(ord, ord < self.term_count);
        Ok(ord as i64)
    }
}

impl SortedNumericProducer for SortedOrdsView<'_> {
    fn cursor(&self) -> Result<Box<dyn SortedNumericCursor + '_>> {
        Ok(Box::new(SortedOrdsCursor {
            inner: self.0.cursor()?,
            term_count: self.0.term_count(),
        }))
    }
}

/// The ordinal lists of a sorted set field.
pub struct SortedSetOrdsView<'a>(pub &'a dyn SortedSetProducer);

struct SortedSetOrdsCursor<'a> {
    inner: Box<dyn SortedSetCursor + 'a>,
    term_count: u64,
    previous: Option<u64>,
}

impl DocCursor for SortedSetOrdsCursor<'_> {
    fn next_doc(&mut self) -> Result<Option<u32>> {
        self.previous = None;
        self.inner.next_doc()
    }
}

impl SortedNumericCursor for SortedSetOrdsCursor<'_> {
    fn value_count(&self) -> u32 {
        self.inner.value_count()
    }

    fn next_value(&mut self) -> Result<i64> {
        let ord = self.inner.next_ord()?;
        verify_contract!(ord, ord < self.term_count);
        verify_contract!(ord_order, self.previous.is_none_or(|p| ord > p));
        self.previous = Some(ord);
        Ok(ord as i64)
    }
}

impl SortedNumericProducer for SortedSetOrdsView<'_> {
    fn cursor(&self) -> Result<Box<dyn SortedNumericCursor + '_>> {
        Ok(Box::new(SortedSetOrdsCursor {
            inner: self.0.cursor()?,
            term_count: self.0.term_count(),
            previous: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::{NumericColumn, SortedColumn, SortedSetColumn};

    fn drain(producer: &dyn SortedNumericProducer) -> Result<Vec<(u32, Vec<i64>)>> {
        let mut cursor = producer.cursor()?;
        let mut out = Vec::new();
        while let Some(doc) = cursor.next_doc()? {
            let values = (0..cursor.value_count())
                .map(|_| cursor.next_value())
                .collect::<Result<Vec<_>>>()?;
            out.push((doc, values));
        }
        Ok(out)
    }

    #[test]
    fn test_numeric_view() {
        let column: NumericColumn = [(1, -5), (4, 7)].into_iter().collect();
        assert_eq!(
            drain(&NumericView(&column)).unwrap(),
            [(1, vec![-5]), (4, vec![7])]
        );
    }

    #[test]
    fn test_ordinal_contracts() {
        let column = SortedColumn::new(vec![b"a".to_vec()], vec![0, 1], vec![0, 1]);
        assert!(drain(&SortedOrdsView(&column)).unwrap_err().is_fatal());

        let column = SortedSetColumn::new(
            vec![b"a".to_vec(), b"b".to_vec()],
            vec![(0, vec![1, 0])],
        );
        assert!(drain(&SortedSetOrdsView(&column)).unwrap_err().is_fatal());

        let column = SortedSetColumn::from_terms(&[(0, vec!["b", "a"]), (3, vec!["c"])]);
        assert_eq!(
            drain(&SortedSetOrdsView(&column)).unwrap(),
            [(0, vec![0, 1]), (3, vec![2])]
        );
    }
}
