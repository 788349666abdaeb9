use docvalues_io::memory::SharedBuffer;

use crate::{
    DocValuesConfig, DocValuesReader, DocValuesWriter, FieldInfo, FieldSummary, FieldValues,
    Result, SegmentInfo,
};

/// A segment written to in-memory buffers.
pub struct SegmentStore {
    pub segment: SegmentInfo,
    data: SharedBuffer,
    meta: SharedBuffer,
    writer: Option<DocValuesWriter>,
}

impl SegmentStore {
    pub fn new(max_doc: u32) -> SegmentStore {
        SegmentStore::with_config(max_doc, DocValuesConfig::default())
    }

    pub fn with_config(max_doc: u32, config: DocValuesConfig) -> SegmentStore {
        let segment = SegmentInfo::new("_0", max_doc);
        let data = SharedBuffer::new();
        let meta = SharedBuffer::new();
        let writer = DocValuesWriter::new(
            segment.clone(),
            config,
            Box::new(data.clone()),
            Box::new(meta.clone()),
        )
        .unwrap();
        SegmentStore {
            segment,
            data,
            meta,
            writer: Some(writer),
        }
    }

    pub fn add(&mut self, field: &FieldInfo, values: FieldValues) -> Result<FieldSummary> {
        self.writer
            .as_mut()
            .expect("segment already finished")
            .add_field(field, values)
    }

    pub fn finish(&mut self) -> DocValuesReader {
        self.writer
            .take()
            .expect("segment already finished")
            .finish()
            .unwrap();
        assert!(self.data.is_sealed());
        assert!(self.meta.is_sealed());
        DocValuesReader::from_streams(&self.segment, self.data.contents(), &self.meta.contents())
            .unwrap()
    }

    pub fn data(&self) -> Vec<u8> {
        self.data.contents()
    }

    pub fn meta(&self) -> Vec<u8> {
        self.meta.contents()
    }
}
