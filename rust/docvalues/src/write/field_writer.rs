//! Encoding of one field into the data and meta streams.
//!
//! Per field, in order: skip index (when enabled), statistics, presence, values,
//! then the type-specific extras (document addresses, term dictionary). Meta
//! record of a field:
//!
//! ```text
//! i32  field id
//! u8   value type tag
//! u8   skip index flag
//! ...  skip index entry            iff the flag is set
//! u8   multi-valued flag           sorted set only
//! ...  type-specific layout
//! ```

use byteorder::{LE, WriteBytesExt};
use docvalues_common::{Result, verify_contract};
use docvalues_encodings::{
    monotonic::MonotonicWriter,
    numeric::{self, NumericEncoding},
    presence::{self, Presence},
    skip_index,
    stats::{self, NumericStats},
    terms_dict::{self, TermsDictSummary},
    values::{BinaryProducer, SortedNumericProducer, TermsProducer},
};
use docvalues_io::ArtifactWriter;

use crate::{
    config::DocValuesConfig,
    field::{FieldInfo, SegmentInfo, ValueType},
};

use super::{
    FieldValues,
    views::{NumericView, SortedOrdsView, SortedSetOrdsView},
};

/// What was written for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub field_id: u32,
    pub value_type: ValueType,
    pub num_docs_with_value: u64,
    pub num_values: u64,
    pub presence: Presence,
    /// Name of the numeric scheme; `None` for binary fields.
    pub encoding: Option<&'static str>,
    pub bits_per_value: u8,
    pub terms: Option<TermsDictSummary>,
    /// Bytes appended to the data stream for this field.
    pub data_bytes: u64,
}

pub(crate) struct FieldWriter<'a> {
    pub segment: &'a SegmentInfo,
    pub config: &'a DocValuesConfig,
    pub data: &'a mut ArtifactWriter,
    pub meta: &'a mut ArtifactWriter,
}

impl FieldWriter<'_> {
    pub fn write(&mut self, field: &FieldInfo, values: FieldValues) -> Result<FieldSummary> {
        verify_contract!(value_type, values.value_type() == field.value_type);
        let start = self.data.position();
        self.meta.write_i32::<LE>(field.id as i32)?;
        self.meta.write_u8(field.value_type.tag())?;
        self.meta.write_u8(field.skip_index as u8)?;

        let mut summary = match values {
            FieldValues::Numeric(producer) => {
                let view = NumericView(producer);
                let (stats, encoding, presence) = self.write_numeric(field, &view, false)?;
                summary_of(field, &stats, Some(&encoding), presence)
            }
            FieldValues::SortedNumeric(producer) => {
                let (stats, encoding, presence) = self.write_numeric(field, producer, false)?;
                self.write_doc_addresses(producer, &stats)?;
                summary_of(field, &stats, Some(&encoding), presence)
            }
            FieldValues::Sorted(producer) => {
                let view = SortedOrdsView(producer);
                let (stats, encoding, presence) = self.write_numeric(field, &view, true)?;
                let terms = self.write_terms(producer)?;
                FieldSummary {
                    terms: Some(terms),
                    ..summary_of(field, &stats, Some(&encoding), presence)
                }
            }
            FieldValues::SortedSet(producer) => {
                let view = SortedSetOrdsView(producer);
                let (stats, encoding, presence) = self.write_sorted_set_ords(field, &view)?;
                let terms = self.write_terms(producer)?;
                FieldSummary {
                    terms: Some(terms),
                    ..summary_of(field, &stats, Some(&encoding), presence)
                }
            }
            FieldValues::Binary(producer) => self.write_binary(field, producer)?,
        };
        summary.data_bytes = self.data.position() - start;
        log::debug!(
            "field {} ({:?}): {} docs, {} values, {:?} presence, {} data bytes",
            field.id,
            field.value_type,
            summary.num_docs_with_value,
            summary.num_values,
            summary.presence,
            summary.data_bytes
        );
        Ok(summary)
    }

    /// Skip index, statistics, presence and the numeric record of an integer
    /// field.
    fn write_numeric(
        &mut self,
        field: &FieldInfo,
        producer: &dyn SortedNumericProducer,
        ordinals: bool,
    ) -> Result<(NumericStats, NumericEncoding, Presence)> {
        let stats = self.collect_stats(field, producer)?;
        let (encoding, presence) = self.write_values(producer, &stats, ordinals)?;
        Ok((stats, encoding, presence))
    }

    fn collect_stats(
        &mut self,
        field: &FieldInfo,
        producer: &dyn SortedNumericProducer,
    ) -> Result<NumericStats> {
        if field.skip_index {
            let entry = skip_index::write_skip_index(
                producer,
                self.config.skip_index_interval_size,
                self.data,
            )?;
            entry.write_meta(self.meta)?;
        }
        let stats = stats::collect(
            producer,
            self.segment.max_doc,
            self.config.numeric_block_shift,
        )?;
        if !field.multi_valued {
            verify_contract!(
                single_value,
                stats.num_values == stats.num_docs_with_value
            );
        }
        Ok(stats)
    }

    fn write_values(
        &mut self,
        producer: &dyn SortedNumericProducer,
        stats: &NumericStats,
        ordinals: bool,
    ) -> Result<(NumericEncoding, Presence)> {
        let presence = presence::write_presence(
            &mut *producer.cursor()?,
            stats.num_docs_with_value,
            self.segment.max_doc,
            self.config.dense_rank_power,
            self.data,
        )?;
        presence.write_meta(self.meta)?;

        let encoding = numeric::choose_encoding(stats, ordinals, &self.config.numeric_policy())?;
        numeric::write_values(producer, stats, &encoding, self.data, self.meta)?;
        Ok((encoding, presence))
    }

    /// Sorted set ordinals: the single-valued sorted layout when every document
    /// has exactly one ordinal, the sorted numeric layout otherwise.
    fn write_sorted_set_ords(
        &mut self,
        field: &FieldInfo,
        view: &SortedSetOrdsView,
    ) -> Result<(NumericStats, NumericEncoding, Presence)> {
        let stats = self.collect_stats(field, view)?;
        let multi_valued = stats.num_values > stats.num_docs_with_value;
        self.meta.write_u8(multi_valued as u8)?;
        let (encoding, presence) = self.write_values(view, &stats, true)?;
        if multi_valued {
            self.write_doc_addresses(view, &stats)?;
        }
        log::debug!(
            "sorted set field {}: {} layout",
            field.id,
            if multi_valued { "multi-valued" } else { "single-valued" }
        );
        Ok((stats, encoding, presence))
    }

    /// Number of documents with a value, then the cumulative value counts per
    /// document when some document has more than one value.
    fn write_doc_addresses(
        &mut self,
        producer: &dyn SortedNumericProducer,
        stats: &NumericStats,
    ) -> Result<()> {
        self.meta.write_i32::<LE>(stats.num_docs_with_value as i32)?;
        if stats.num_values <= stats.num_docs_with_value {
            return Ok(());
        }
        let mut addresses = self.start_addresses(stats.num_docs_with_value + 1)?;
        addresses.add(0)?;
        let mut total = 0i64;
        let mut cursor = producer.cursor()?;
        while cursor.next_doc()?.is_some() {
            total += cursor.value_count() as i64;
            addresses.add(total)?;
        }
        let (_, _, written) = addresses.finish()?;
        self.meta.write_i64::<LE>(written as i64)?;
        Ok(())
    }

    /// Writes the address table prefix to meta and returns the table writer;
    /// the caller finishes the table and records its data length.
    fn start_addresses(
        &mut self,
        num_values: u64,
    ) -> Result<MonotonicWriter<&mut ArtifactWriter, &mut ArtifactWriter>> {
        let shift = self.config.monotonic_block_shift;
        self.meta.write_i64::<LE>(self.data.position() as i64)?;
        self.meta.write_u8(shift)?;
        MonotonicWriter::new(&mut *self.meta, &mut *self.data, num_values, shift)
    }

    fn write_terms(&mut self, producer: &dyn TermsProducer) -> Result<TermsDictSummary> {
        terms_dict::write_terms_dict(
            producer,
            &self.config.terms_dict_policy(),
            self.data,
            self.meta,
        )
    }

    /// Raw concatenated values, presence, length bounds and, when the lengths
    /// differ, an address table over the cumulative lengths.
    fn write_binary(
        &mut self,
        field: &FieldInfo,
        producer: &dyn BinaryProducer,
    ) -> Result<FieldSummary> {
        let max_doc = self.segment.max_doc;
        let start = self.data.position();
        let mut num_docs = 0u64;
        let mut min_len = u32::MAX;
        let mut max_len = 0u32;
        let mut last_doc = None;
        let mut cursor = producer.cursor()?;
        while let Some(doc) = cursor.next_doc()? {
            verify_contract!(doc_id, doc < max_doc);
            verify_contract!(doc_order, last_doc.is_none_or(|last| doc > last));
            last_doc = Some(doc);
            let value = cursor.binary_value()?;
            verify_contract!(binary_length, value.len() <= i32::MAX as usize);
            self.data.write_all(value)?;
            num_docs += 1;
            min_len = min_len.min(value.len() as u32);
            max_len = max_len.max(value.len() as u32);
        }
        if num_docs == 0 {
            min_len = 0;
        }
        self.meta.write_i64::<LE>(start as i64)?;
        self.meta.write_i64::<LE>((self.data.position() - start) as i64)?;

        let presence = presence::write_presence(
            &mut *producer.cursor()?,
            num_docs,
            max_doc,
            self.config.dense_rank_power,
            self.data,
        )?;
        presence.write_meta(self.meta)?;
        self.meta.write_i32::<LE>(num_docs as i32)?;
        self.meta.write_i32::<LE>(min_len as i32)?;
        self.meta.write_i32::<LE>(max_len as i32)?;

        if max_len > min_len {
            let mut addresses = self.start_addresses(num_docs + 1)?;
            addresses.add(0)?;
            let mut offset = 0i64;
            let mut cursor = producer.cursor()?;
            while cursor.next_doc()?.is_some() {
                offset += cursor.binary_value()?.len() as i64;
                addresses.add(offset)?;
            }
            let (_, _, written) = addresses.finish()?;
            self.meta.write_i64::<LE>(written as i64)?;
        }
        log::debug!(
            "binary field {}: {} docs, lengths {}..={}",
            field.id,
            num_docs,
            min_len,
            max_len
        );

        Ok(FieldSummary {
            field_id: field.id,
            value_type: field.value_type,
            num_docs_with_value: num_docs,
            num_values: num_docs,
            presence,
            encoding: None,
            bits_per_value: 0,
            terms: None,
            data_bytes: 0,
        })
    }
}

fn summary_of(
    field: &FieldInfo,
    stats: &NumericStats,
    encoding: Option<&NumericEncoding>,
    presence: Presence,
) -> FieldSummary {
    FieldSummary {
        field_id: field.id,
        value_type: field.value_type,
        num_docs_with_value: stats.num_docs_with_value,
        num_values: stats.num_values,
        presence,
        encoding: encoding.map(NumericEncoding::name),
        bits_per_value: encoding.map_or(0, NumericEncoding::bits_per_value),
        terms: None,
        data_bytes: 0,
    }
}
