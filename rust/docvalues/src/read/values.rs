//! Random access to the values of one field by document id.

use docvalues_common::{Result, verify_arg, verify_data};
use docvalues_encodings::{
    numeric::NumericValues,
    presence::Presence,
    terms_dict::{TermsDict, TermsDictEntry},
};

use super::entries::{AddressEntry, BinaryEntry, NumericLayout, SortedNumericLayout};

/// Presence lookup plus value access shared by the integer shaped fields.
struct Numeric<'a> {
    presence: &'a Presence,
    values: NumericValues<'a>,
    data: &'a [u8],
    max_doc: u32,
}

impl<'a> Numeric<'a> {
    fn open(layout: &'a NumericLayout, data: &'a [u8], max_doc: u32) -> Result<Numeric<'a>> {
        Ok(Numeric {
            presence: &layout.presence,
            values: layout.values.values(data)?,
            data,
            max_doc,
        })
    }

    /// Index of `doc` among the documents with a value.
    fn index_of(&self, doc: u32) -> Result<Option<u64>> {
        verify_arg!(doc, doc < self.max_doc);
        self.presence.index_of(self.data, doc)
    }

    fn docs(&self) -> Result<Vec<u32>> {
        self.presence.docs(self.data, self.max_doc)
    }
}

/// Value lists of the multi-valued integer fields.
struct Lists<'a> {
    numeric: Numeric<'a>,
    addresses: Option<&'a AddressEntry>,
}

impl<'a> Lists<'a> {
    fn open(layout: &'a SortedNumericLayout, data: &'a [u8], max_doc: u32) -> Result<Lists<'a>> {
        Ok(Lists {
            numeric: Numeric::open(&layout.numeric, data, max_doc)?,
            addresses: layout.addresses.as_ref(),
        })
    }

    fn values(&self, doc: u32) -> Result<Vec<i64>> {
        let Some(index) = self.numeric.index_of(doc)? else {
            return Ok(Vec::new());
        };
        let (start, end) = match self.addresses {
            Some(addresses) => (
                addresses.get(self.numeric.data, index)?,
                addresses.get(self.numeric.data, index + 1)?,
            ),
            None => (index, index + 1),
        };
        verify_data!(value_range, start <= end);
        (start..end).map(|i| self.numeric.values.get(i)).collect()
    }
}

pub struct NumericDocValues<'a> {
    numeric: Numeric<'a>,
}

impl<'a> NumericDocValues<'a> {
    pub(crate) fn open(
        layout: &'a NumericLayout,
        data: &'a [u8],
        max_doc: u32,
    ) -> Result<NumericDocValues<'a>> {
        Ok(NumericDocValues {
            numeric: Numeric::open(layout, data, max_doc)?,
        })
    }

    /// Returns the value of `doc`, or `None` when it has none.
    pub fn get(&self, doc: u32) -> Result<Option<i64>> {
        self.numeric
            .index_of(doc)?
            .map(|index| self.numeric.values.get(index))
            .transpose()
    }

    /// Documents with a value, in increasing order.
    pub fn docs(&self) -> Result<Vec<u32>> {
        self.numeric.docs()
    }
}

pub struct BinaryDocValues<'a> {
    entry: &'a BinaryEntry,
    data: &'a [u8],
    bytes: &'a [u8],
    max_doc: u32,
}

impl<'a> BinaryDocValues<'a> {
    pub(crate) fn open(
        entry: &'a BinaryEntry,
        data: &'a [u8],
        max_doc: u32,
    ) -> Result<BinaryDocValues<'a>> {
        let end = entry.data_offset.checked_add(entry.data_length);
        verify_data!(binary_range, end.is_some_and(|end| end <= data.len() as u64));
        Ok(BinaryDocValues {
            entry,
            data,
            bytes: &data[entry.data_offset as usize..(entry.data_offset + entry.data_length) as usize],
            max_doc,
        })
    }

    pub fn get(&self, doc: u32) -> Result<Option<&'a [u8]>> {
        verify_arg!(doc, doc < self.max_doc);
        let Some(index) = self.entry.presence.index_of(self.data, doc)? else {
            return Ok(None);
        };
        let (start, end) = match &self.entry.addresses {
            Some(addresses) => (
                addresses.get(self.data, index)?,
                addresses.get(self.data, index + 1)?,
            ),
            None => {
                let len = self.entry.max_length as u64;
                (index * len, (index + 1) * len)
            }
        };
        verify_data!(
            binary_value,
            start <= end && end <= self.bytes.len() as u64
        );
        Ok(Some(&self.bytes[start as usize..end as usize]))
    }

    pub fn docs(&self) -> Result<Vec<u32>> {
        self.entry.presence.docs(self.data, self.max_doc)
    }
}

pub struct SortedDocValues<'a> {
    ords: Numeric<'a>,
    terms: TermsDict<'a>,
}

impl<'a> SortedDocValues<'a> {
    pub(crate) fn open(
        ords: &'a NumericLayout,
        terms: &'a TermsDictEntry,
        data: &'a [u8],
        max_doc: u32,
    ) -> Result<SortedDocValues<'a>> {
        Ok(SortedDocValues {
            ords: Numeric::open(ords, data, max_doc)?,
            terms: terms.open(data)?,
        })
    }

    /// Returns the ordinal of the term of `doc`.
    pub fn ord(&self, doc: u32) -> Result<Option<u64>> {
        let Some(index) = self.ords.index_of(doc)? else {
            return Ok(None);
        };
        let ord = self.ords.values.get(index)?;
        verify_data!(ord, ord >= 0 && (ord as u64) < self.terms.term_count());
        Ok(Some(ord as u64))
    }

    /// Returns the term of `doc`.
    pub fn get(&self, doc: u32) -> Result<Option<Vec<u8>>> {
        self.ord(doc)?.map(|ord| self.terms.term(ord)).transpose()
    }

    pub fn lookup_ord(&self, ord: u64) -> Result<Vec<u8>> {
        self.terms.term(ord)
    }

    pub fn lookup_term(&self, term: &[u8]) -> Result<Option<u64>> {
        self.terms.lookup_term(term)
    }

    /// Smallest ordinal whose term is at least `term`.
    pub fn seek_ceil(&self, term: &[u8]) -> Result<Option<u64>> {
        self.terms.seek_ceil(term)
    }

    pub fn term_count(&self) -> u64 {
        self.terms.term_count()
    }

    pub fn docs(&self) -> Result<Vec<u32>> {
        self.ords.docs()
    }
}

pub struct SortedNumericDocValues<'a> {
    lists: Lists<'a>,
}

impl<'a> SortedNumericDocValues<'a> {
    pub(crate) fn open(
        layout: &'a SortedNumericLayout,
        data: &'a [u8],
        max_doc: u32,
    ) -> Result<SortedNumericDocValues<'a>> {
        Ok(SortedNumericDocValues {
            lists: Lists::open(layout, data, max_doc)?,
        })
    }

    /// Returns the values of `doc` in ascending order; empty when it has none.
    pub fn values(&self, doc: u32) -> Result<Vec<i64>> {
        self.lists.values(doc)
    }

    pub fn docs(&self) -> Result<Vec<u32>> {
        self.lists.numeric.docs()
    }
}

enum SetOrds<'a> {
    Single(Numeric<'a>),
    Multi(Lists<'a>),
}

pub struct SortedSetDocValues<'a> {
    ords: SetOrds<'a>,
    terms: TermsDict<'a>,
}

impl<'a> SortedSetDocValues<'a> {
    pub(crate) fn open_single(
        ords: &'a NumericLayout,
        terms: &'a TermsDictEntry,
        data: &'a [u8],
        max_doc: u32,
    ) -> Result<SortedSetDocValues<'a>> {
        Ok(SortedSetDocValues {
            ords: SetOrds::Single(Numeric::open(ords, data, max_doc)?),
            terms: terms.open(data)?,
        })
    }

    pub(crate) fn open_multi(
        ords: &'a SortedNumericLayout,
        terms: &'a TermsDictEntry,
        data: &'a [u8],
        max_doc: u32,
    ) -> Result<SortedSetDocValues<'a>> {
        Ok(SortedSetDocValues {
            ords: SetOrds::Multi(Lists::open(ords, data, max_doc)?),
            terms: terms.open(data)?,
        })
    }

    /// Returns the ordinals of `doc` in ascending order.
    pub fn ords(&self, doc: u32) -> Result<Vec<u64>> {
        let values = match &self.ords {
            SetOrds::Single(numeric) => match numeric.index_of(doc)? {
                Some(index) => vec![numeric.values.get(index)?],
                None => Vec::new(),
            },
            SetOrds::Multi(lists) => lists.values(doc)?,
        };
        let term_count = self.terms.term_count();
        values
            .into_iter()
            .map(|ord| -> Result<u64> {
                verify_data!(ord, ord >= 0 && (ord as u64) < term_count);
                Ok(ord as u64)
            })
            .collect()
    }

    /// Returns the terms of `doc` in ascending order.
    pub fn terms(&self, doc: u32) -> Result<Vec<Vec<u8>>> {
        self.ords(doc)?
            .into_iter()
            .map(|ord| self.terms.term(ord))
            .collect()
    }

    pub fn lookup_ord(&self, ord: u64) -> Result<Vec<u8>> {
        self.terms.term(ord)
    }

    pub fn lookup_term(&self, term: &[u8]) -> Result<Option<u64>> {
        self.terms.lookup_term(term)
    }

    pub fn seek_ceil(&self, term: &[u8]) -> Result<Option<u64>> {
        self.terms.seek_ceil(term)
    }

    pub fn term_count(&self) -> u64 {
        self.terms.term_count()
    }

    /// Whether the field was written with the single-valued layout.
    pub fn is_single_valued(&self) -> bool {
        matches!(self.ords, SetOrds::Single(_))
    }

    pub fn docs(&self) -> Result<Vec<u32>> {
        match &self.ords {
            SetOrds::Single(numeric) => numeric.docs(),
            SetOrds::Multi(lists) => lists.numeric.docs(),
        }
    }
}
