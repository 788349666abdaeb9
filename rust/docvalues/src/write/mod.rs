//! Segment writer: owns the data and meta streams of one segment and encodes
//! fields into them one at a time.

use std::path::Path;

use ahash::AHashSet;
use byteorder::{LE, WriteBytesExt};
use docvalues_common::{Result, error::Error, verify_arg};
use docvalues_encodings::values::{
    BinaryProducer, NumericProducer, SortedNumericProducer, SortedProducer, SortedSetProducer,
};
use docvalues_io::{ArtifactWriter, SealingWrite, file::FileWriter, framing::StreamHeader};

use crate::{
    DATA_CODEC, END_OF_FIELDS, META_CODEC, VERSION_CURRENT,
    config::DocValuesConfig,
    field::{FieldInfo, SegmentInfo, ValueType},
};

pub mod field_writer;
pub mod views;

pub use field_writer::FieldSummary;

/// The values of one field, tagged with their shape.
#[derive(Clone, Copy)]
pub enum FieldValues<'a> {
    Numeric(&'a dyn NumericProducer),
    Binary(&'a dyn BinaryProducer),
    Sorted(&'a dyn SortedProducer),
    SortedNumeric(&'a dyn SortedNumericProducer),
    SortedSet(&'a dyn SortedSetProducer),
}

impl FieldValues<'_> {
    pub fn value_type(&self) -> ValueType {
        match self {
            FieldValues::Numeric(_) => ValueType::Numeric,
            FieldValues::Binary(_) => ValueType::Binary,
            FieldValues::Sorted(_) => ValueType::Sorted,
            FieldValues::SortedNumeric(_) => ValueType::SortedNumeric,
            FieldValues::SortedSet(_) => ValueType::SortedSet,
        }
    }
}

/// Result of a completed segment write.
#[derive(Debug, Clone)]
pub struct SegmentSummary {
    pub data_length: u64,
    pub meta_length: u64,
    pub fields: Vec<FieldSummary>,
}

struct Streams {
    data: ArtifactWriter,
    meta: ArtifactWriter,
}

/// Writes the doc values of one segment.
///
/// Fields are encoded strictly one after the other. A failed field leaves
/// offsets in the streams that no meta record will ever reference, so the
/// writer refuses any further work after an error and the caller must discard
/// both streams.
pub struct DocValuesWriter {
    segment: SegmentInfo,
    config: DocValuesConfig,
    streams: Option<Streams>,
    field_ids: AHashSet<u32>,
    fields: Vec<FieldSummary>,
}

impl DocValuesWriter {
    /// Creates a writer over the given data and meta sinks and writes the
    /// stream headers.
    pub fn new(
        segment: SegmentInfo,
        config: DocValuesConfig,
        data: Box<dyn SealingWrite>,
        meta: Box<dyn SealingWrite>,
    ) -> Result<DocValuesWriter> {
        segment.validate()?;
        config.validate()?;
        let data = ArtifactWriter::framed(
            data,
            segment.data_file_name(),
            &StreamHeader::new(DATA_CODEC, VERSION_CURRENT, segment.id),
        )?;
        let meta = ArtifactWriter::framed(
            meta,
            segment.meta_file_name(),
            &StreamHeader::new(META_CODEC, VERSION_CURRENT, segment.id),
        )?;
        log::debug!(
            "writing doc values of segment {} ({} docs)",
            segment.name,
            segment.max_doc
        );
        Ok(DocValuesWriter {
            segment,
            config,
            streams: Some(Streams { data, meta }),
            field_ids: AHashSet::new(),
            fields: Vec::new(),
        })
    }

    /// Creates the segment's two files in `dir`; neither may exist yet.
    pub fn create(
        dir: impl AsRef<Path>,
        segment: SegmentInfo,
        config: DocValuesConfig,
    ) -> Result<DocValuesWriter> {
        let dir = dir.as_ref();
        let data_path = dir.join(segment.data_file_name());
        let meta_path = dir.join(segment.meta_file_name());
        let data = FileWriter::create(&data_path)
            .map_err(|e| Error::io(data_path.display().to_string(), e))?;
        let meta = FileWriter::create(&meta_path)
            .map_err(|e| Error::io(meta_path.display().to_string(), e))?;
        DocValuesWriter::new(segment, config, Box::new(data), Box::new(meta))
    }

    pub fn segment(&self) -> &SegmentInfo {
        &self.segment
    }

    pub fn config(&self) -> &DocValuesConfig {
        &self.config
    }

    /// Encodes one field. On error the writer becomes unusable.
    pub fn add_field(&mut self, field: &FieldInfo, values: FieldValues) -> Result<FieldSummary> {
        field.validate()?;
        verify_arg!(field_id, !self.field_ids.contains(&field.id));
        let mut streams = self
            .streams
            .take()
            .ok_or_else(|| Error::invalid_operation("add_field on a failed writer"))?;
        let mut writer = field_writer::FieldWriter {
            segment: &self.segment,
            config: &self.config,
            data: &mut streams.data,
            meta: &mut streams.meta,
        };
        let summary = writer.write(field, values)?;
        self.streams = Some(streams);
        self.field_ids.insert(field.id);
        self.fields.push(summary.clone());
        Ok(summary)
    }

    /// Writes the end-of-fields marker and seals both streams.
    pub fn finish(mut self) -> Result<SegmentSummary> {
        let Streams { data, mut meta } = self
            .streams
            .take()
            .ok_or_else(|| Error::invalid_operation("finish on a failed writer"))?;
        meta.write_i32::<LE>(END_OF_FIELDS)?;
        let meta_length = meta.seal()?;
        let data_length = data.seal()?;
        log::debug!(
            "segment {}: {} fields, {} data bytes, {} meta bytes",
            self.segment.name,
            self.fields.len(),
            data_length,
            meta_length
        );
        Ok(SegmentSummary {
            data_length,
            meta_length,
            fields: self.fields,
        })
    }
}
