//! Record-by-record decoding of segment arrays.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use super::{Segment, SegmentRejection};

/// Segments decoded from one wire array.
///
/// Each record is decoded on its own, so a record with a wrongly typed field
/// lands in `malformed` instead of failing the whole array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentBatch {
    pub segments: Vec<Segment>,
    pub malformed: Vec<SegmentRejection>,
}

impl SegmentBatch {
    pub fn from_values(records: Vec<Value>) -> Self {
        let mut batch = Self::default();
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Segment>(record) {
                Ok(segment) => batch.segments.push(segment),
                Err(e) => {
                    debug!("Segment record {} is malformed: {}", index, e);
                    batch.malformed.push(SegmentRejection::Malformed {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.segments.len() + self.malformed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<Segment>> for SegmentBatch {
    fn from(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            malformed: Vec::new(),
        }
    }
}

impl<'de> Deserialize<'de> for SegmentBatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Option::<Vec<Value>>::deserialize(deserializer)?;
        Ok(Self::from_values(records.unwrap_or_default()))
    }
}

impl Serialize for SegmentBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.segments.serialize(serializer)
    }
}
