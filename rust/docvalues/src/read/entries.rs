//! Parsed per-field meta records.

use docvalues_common::{Result, error::Error, verify_data};
use docvalues_encodings::{
    monotonic::MonotonicMeta, numeric::NumericEntry, presence::Presence,
    skip_index::SkipIndexEntry, terms_dict::TermsDictEntry,
};
use docvalues_io::DataInput;

use crate::field::ValueType;

/// Monotonic table of `num_values` cumulative offsets stored in the data
/// stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressEntry {
    pub offset: u64,
    pub length: u64,
    pub table: MonotonicMeta,
}

impl AddressEntry {
    fn read(meta: &mut DataInput, num_values: u64) -> Result<AddressEntry> {
        let offset = meta.read_i64()?;
        let block_shift = meta.read_u8()?;
        let table = MonotonicMeta::read(meta, num_values, block_shift)?;
        let length = meta.read_i64()?;
        verify_data!(address_range, offset >= 0 && length >= 0);
        Ok(AddressEntry {
            offset: offset as u64,
            length: length as u64,
            table,
        })
    }

    pub fn get(&self, data: &[u8], index: u64) -> Result<u64> {
        let end = self.offset.checked_add(self.length);
        verify_data!(address_range, end.is_some_and(|end| end <= data.len() as u64));
        let table = &data[self.offset as usize..(self.offset + self.length) as usize];
        let value = self.table.get(table, index)?;
        verify_data!(address, value >= 0);
        Ok(value as u64)
    }
}

/// Presence and values of an integer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericLayout {
    pub presence: Presence,
    pub values: NumericEntry,
}

impl NumericLayout {
    fn read(meta: &mut DataInput) -> Result<NumericLayout> {
        Ok(NumericLayout {
            presence: Presence::read_meta(meta)?,
            values: NumericEntry::read(meta)?,
        })
    }
}

/// An integer field whose documents may hold several values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedNumericLayout {
    pub numeric: NumericLayout,
    pub num_docs: u64,
    /// Cumulative value counts per document; `None` when every document has
    /// exactly one value.
    pub addresses: Option<AddressEntry>,
}

impl SortedNumericLayout {
    fn read(meta: &mut DataInput) -> Result<SortedNumericLayout> {
        let numeric = NumericLayout::read(meta)?;
        let num_docs = meta.read_i32()?;
        verify_data!(num_docs, num_docs >= 0);
        let num_docs = num_docs as u64;
        let addresses = if numeric.values.num_values > num_docs {
            Some(AddressEntry::read(meta, num_docs + 1)?)
        } else {
            None
        };
        Ok(SortedNumericLayout {
            numeric,
            num_docs,
            addresses,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryEntry {
    pub data_offset: u64,
    pub data_length: u64,
    pub presence: Presence,
    pub num_docs: u64,
    pub min_length: u32,
    pub max_length: u32,
    pub addresses: Option<AddressEntry>,
}

impl BinaryEntry {
    fn read(meta: &mut DataInput) -> Result<BinaryEntry> {
        let data_offset = meta.read_i64()?;
        let data_length = meta.read_i64()?;
        verify_data!(binary_range, data_offset >= 0 && data_length >= 0);
        let presence = Presence::read_meta(meta)?;
        let num_docs = meta.read_i32()?;
        let min_length = meta.read_i32()?;
        let max_length = meta.read_i32()?;
        verify_data!(
            binary_lengths,
            num_docs >= 0 && 0 <= min_length && min_length <= max_length
        );
        let addresses = if max_length > min_length {
            Some(AddressEntry::read(meta, num_docs as u64 + 1)?)
        } else {
            None
        };
        Ok(BinaryEntry {
            data_offset: data_offset as u64,
            data_length: data_length as u64,
            presence,
            num_docs: num_docs as u64,
            min_length: min_length as u32,
            max_length: max_length as u32,
            addresses,
        })
    }
}

/// Ordinals of a sorted set field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortedSetOrds {
    /// Every document has exactly one ordinal.
    Single(NumericLayout),
    Multi(SortedNumericLayout),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLayout {
    Numeric(NumericLayout),
    Binary(BinaryEntry),
    Sorted {
        ords: NumericLayout,
        terms: TermsDictEntry,
    },
    SortedNumeric(SortedNumericLayout),
    SortedSet {
        ords: SortedSetOrds,
        terms: TermsDictEntry,
    },
}

/// Meta record of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub id: u32,
    pub value_type: ValueType,
    pub skip_index: Option<SkipIndexEntry>,
    pub layout: FieldLayout,
}

impl FieldEntry {
    /// Reads the record following a field id.
    pub(crate) fn read(id: u32, meta: &mut DataInput) -> Result<FieldEntry> {
        let value_type = ValueType::from_tag(meta.read_u8()?)?;
        let skip_index = match meta.read_u8()? {
            0 => None,
            1 => Some(SkipIndexEntry::read_meta(meta)?),
            _ => return Err(Error::invalid_format("skip index flag")),
        };
        let layout = match value_type {
            ValueType::Numeric => FieldLayout::Numeric(NumericLayout::read(meta)?),
            ValueType::Binary => FieldLayout::Binary(BinaryEntry::read(meta)?),
            ValueType::Sorted => FieldLayout::Sorted {
                ords: NumericLayout::read(meta)?,
                terms: TermsDictEntry::read(meta)?,
            },
            ValueType::SortedNumeric => {
                FieldLayout::SortedNumeric(SortedNumericLayout::read(meta)?)
            }
            ValueType::SortedSet => {
                let ords = match meta.read_u8()? {
                    0 => SortedSetOrds::Single(NumericLayout::read(meta)?),
                    1 => SortedSetOrds::Multi(SortedNumericLayout::read(meta)?),
                    _ => return Err(Error::invalid_format("sorted set multi-valued flag")),
                };
                FieldLayout::SortedSet {
                    ords,
                    terms: TermsDictEntry::read(meta)?,
                }
            }
        };
        Ok(FieldEntry {
            id,
            value_type,
            skip_index,
            layout,
        })
    }

    /// Presence and numeric record of the field's integers or ordinals;
    /// `None` for binary fields.
    pub fn numeric(&self) -> Option<&NumericLayout> {
        match &self.layout {
            FieldLayout::Numeric(numeric) => Some(numeric),
            FieldLayout::Binary(_) => None,
            FieldLayout::Sorted { ords, .. } => Some(ords),
            FieldLayout::SortedNumeric(layout) => Some(&layout.numeric),
            FieldLayout::SortedSet { ords, .. } => match ords {
                SortedSetOrds::Single(numeric) => Some(numeric),
                SortedSetOrds::Multi(layout) => Some(&layout.numeric),
            },
        }
    }

    pub fn presence(&self) -> &Presence {
        match &self.layout {
            FieldLayout::Binary(binary) => &binary.presence,
            _ => match self.numeric() {
                Some(numeric) => &numeric.presence,
                None => &Presence::NoDocs,
            },
        }
    }

    pub fn terms(&self) -> Option<&TermsDictEntry> {
        match &self.layout {
            FieldLayout::Sorted { terms, .. } | FieldLayout::SortedSet { terms, .. } => {
                Some(terms)
            }
            _ => None,
        }
    }
}
