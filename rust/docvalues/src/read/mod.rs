//! Segment reader: validates the two streams of a segment, parses every field
//! record, and hands out per-field random access.

use std::path::Path;

use ahash::AHashMap;
use docvalues_common::{Result, error::Error, verify_arg, verify_data};
use docvalues_encodings::skip_index::DocValuesSkipper;
use docvalues_io::{DataInput, ReadAt, file::FileReader, framing::{self, StreamHeader}};

use crate::{
    DATA_CODEC, END_OF_FIELDS, META_CODEC, VERSION_CURRENT, VERSION_START,
    field::{SegmentInfo, ValueType},
};

pub mod entries;
pub mod values;

pub use entries::{FieldEntry, FieldLayout};
pub use values::{
    BinaryDocValues, NumericDocValues, SortedDocValues, SortedNumericDocValues,
    SortedSetDocValues,
};

use entries::SortedSetOrds;

pub struct DocValuesReader {
    segment: SegmentInfo,
    version: u32,
    data: Vec<u8>,
    fields: Vec<FieldEntry>,
    by_id: AHashMap<u32, usize>,
}

impl DocValuesReader {
    /// Opens the segment's files in `dir`.
    pub fn open(dir: impl AsRef<Path>, segment: &SegmentInfo) -> Result<DocValuesReader> {
        let dir = dir.as_ref();
        let read = |name: String| -> Result<Vec<u8>> {
            let path = dir.join(name);
            FileReader::open(&path)
                .and_then(|file| file.read_all())
                .map_err(|e| Error::io(path.display().to_string(), e))
        };
        let data = read(segment.data_file_name())?;
        let meta = read(segment.meta_file_name())?;
        DocValuesReader::from_streams(segment, data, &meta)
    }

    /// Parses a segment from its complete data and meta streams.
    pub fn from_streams(
        segment: &SegmentInfo,
        data: Vec<u8>,
        meta: &[u8],
    ) -> Result<DocValuesReader> {
        let meta_body = framing::verify_footer(meta, &segment.meta_file_name())?;
        let mut input = DataInput::new(meta_body);
        let version = StreamHeader::check(
            &mut input,
            META_CODEC,
            VERSION_START,
            VERSION_CURRENT,
            &segment.id,
        )?;

        let mut fields = Vec::new();
        let mut by_id = AHashMap::new();
        loop {
            let id = input.read_i32()?;
            if id == END_OF_FIELDS {
                break;
            }
            verify_data!(field_id, id >= 0);
            let entry = FieldEntry::read(id as u32, &mut input)?;
            verify_data!(
                duplicate_field,
                by_id.insert(entry.id, fields.len()).is_none()
            );
            fields.push(entry);
        }
        verify_data!(meta_trailing_bytes, input.remaining() == 0);

        framing::verify_footer(&data, &segment.data_file_name())?;
        let data_version = StreamHeader::check(
            &mut DataInput::new(&data),
            DATA_CODEC,
            VERSION_START,
            VERSION_CURRENT,
            &segment.id,
        )?;
        verify_data!(stream_versions, data_version == version);

        log::debug!(
            "opened doc values of segment {}: {} fields, {} data bytes",
            segment.name,
            fields.len(),
            data.len()
        );
        Ok(DocValuesReader {
            segment: segment.clone(),
            version,
            data,
            fields,
            by_id,
        })
    }

    pub fn segment(&self) -> &SegmentInfo {
        &self.segment
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    pub fn field(&self, id: u32) -> Result<&FieldEntry> {
        self.by_id
            .get(&id)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| Error::invalid_arg("field", format!("no field with id {id}")))
    }

    fn typed_field(&self, id: u32, value_type: ValueType) -> Result<&FieldEntry> {
        let field = self.field(id)?;
        verify_arg!(value_type, field.value_type == value_type);
        Ok(field)
    }

    pub fn numeric(&self, id: u32) -> Result<NumericDocValues<'_>> {
        let field = self.typed_field(id, ValueType::Numeric)?;
        match &field.layout {
            FieldLayout::Numeric(layout) => {
                NumericDocValues::open(layout, &self.data, self.segment.max_doc)
            }
            _ => Err(Error::invalid_format("numeric layout")),
        }
    }

    pub fn binary(&self, id: u32) -> Result<BinaryDocValues<'_>> {
        let field = self.typed_field(id, ValueType::Binary)?;
        match &field.layout {
            FieldLayout::Binary(entry) => {
                BinaryDocValues::open(entry, &self.data, self.segment.max_doc)
            }
            _ => Err(Error::invalid_format("binary layout")),
        }
    }

    pub fn sorted(&self, id: u32) -> Result<SortedDocValues<'_>> {
        let field = self.typed_field(id, ValueType::Sorted)?;
        match &field.layout {
            FieldLayout::Sorted { ords, terms } => {
                SortedDocValues::open(ords, terms, &self.data, self.segment.max_doc)
            }
            _ => Err(Error::invalid_format("sorted layout")),
        }
    }

    pub fn sorted_numeric(&self, id: u32) -> Result<SortedNumericDocValues<'_>> {
        let field = self.typed_field(id, ValueType::SortedNumeric)?;
        match &field.layout {
            FieldLayout::SortedNumeric(layout) => {
                SortedNumericDocValues::open(layout, &self.data, self.segment.max_doc)
            }
            _ => Err(Error::invalid_format("sorted numeric layout")),
        }
    }

    pub fn sorted_set(&self, id: u32) -> Result<SortedSetDocValues<'_>> {
        let field = self.typed_field(id, ValueType::SortedSet)?;
        let max_doc = self.segment.max_doc;
        match &field.layout {
            FieldLayout::SortedSet { ords, terms } => match ords {
                SortedSetOrds::Single(layout) => {
                    SortedSetDocValues::open_single(layout, terms, &self.data, max_doc)
                }
                SortedSetOrds::Multi(layout) => {
                    SortedSetDocValues::open_multi(layout, terms, &self.data, max_doc)
                }
            },
            _ => Err(Error::invalid_format("sorted set layout")),
        }
    }

    /// Returns the skip index of the field, or `None` when it was written
    /// without one.
    pub fn skipper(&self, id: u32) -> Result<Option<DocValuesSkipper<'_>>> {
        self.field(id)?
            .skip_index
            .map(|entry| DocValuesSkipper::new(entry, &self.data))
            .transpose()
    }
}
