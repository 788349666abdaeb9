//! Field and segment descriptors.

use docvalues_common::{Result, error::Error, verify_arg};
use docvalues_io::framing::SEGMENT_ID_LEN;
use serde::{Deserialize, Serialize};

/// Extension of the data stream file.
pub const DATA_EXTENSION: &str = "dvd";

/// Extension of the meta stream file.
pub const META_EXTENSION: &str = "dvm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Numeric,
    Binary,
    Sorted,
    SortedSet,
    SortedNumeric,
}

impl ValueType {
    pub fn tag(self) -> u8 {
        match self {
            ValueType::Numeric => 0,
            ValueType::Binary => 1,
            ValueType::Sorted => 2,
            ValueType::SortedSet => 3,
            ValueType::SortedNumeric => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Result<ValueType> {
        Ok(match tag {
            0 => ValueType::Numeric,
            1 => ValueType::Binary,
            2 => ValueType::Sorted,
            3 => ValueType::SortedSet,
            4 => ValueType::SortedNumeric,
            _ => return Err(Error::invalid_format(format!("value type {tag}"))),
        })
    }

    /// Whether the values are ordinals into a term dictionary.
    pub fn is_ordinal(self) -> bool {
        matches!(self, ValueType::Sorted | ValueType::SortedSet)
    }

    /// Whether a document may carry more than one value.
    pub fn allows_multiple_values(self) -> bool {
        matches!(self, ValueType::SortedSet | ValueType::SortedNumeric)
    }
}

/// Describes one field of a segment; immutable for the duration of the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub id: u32,
    pub value_type: ValueType,
    #[serde(default)]
    pub multi_valued: bool,
    #[serde(default)]
    pub skip_index: bool,
}

impl FieldInfo {
    pub fn new(id: u32, value_type: ValueType) -> FieldInfo {
        FieldInfo {
            id,
            value_type,
            multi_valued: value_type.allows_multiple_values(),
            skip_index: false,
        }
    }

    pub fn with_skip_index(mut self) -> FieldInfo {
        self.skip_index = true;
        self
    }

    pub fn with_multi_valued(mut self, multi_valued: bool) -> FieldInfo {
        self.multi_valued = multi_valued;
        self
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(field_id, self.id < i32::MAX as u32);
        verify_arg!(
            multi_valued,
            !self.multi_valued || self.value_type.allows_multiple_values()
        );
        verify_arg!(
            skip_index,
            !self.skip_index || self.value_type != ValueType::Binary
        );
        Ok(())
    }
}

/// The document universe `[0, max_doc)` of one segment and the names of its
/// two files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub name: String,
    pub max_doc: u32,
    pub id: [u8; SEGMENT_ID_LEN],
}

impl SegmentInfo {
    /// Creates a segment descriptor with a fresh random id.
    pub fn new(name: impl Into<String>, max_doc: u32) -> SegmentInfo {
        SegmentInfo {
            name: name.into(),
            max_doc,
            id: uuid::Uuid::new_v4().into_bytes(),
        }
    }

    pub fn with_id(mut self, id: [u8; SEGMENT_ID_LEN]) -> SegmentInfo {
        self.id = id;
        self
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(max_doc, self.max_doc <= i32::MAX as u32);
        verify_arg!(
            name,
            !self.name.is_empty() && !self.name.contains(['/', '\\'])
        );
        Ok(())
    }

    pub fn data_file_name(&self) -> String {
        format!("{}.{DATA_EXTENSION}", self.name)
    }

    pub fn meta_file_name(&self) -> String {
        format!("{}.{META_EXTENSION}", self.name)
    }

    pub fn id_string(&self) -> String {
        uuid::Uuid::from_bytes(self.id).to_string()
    }
}
