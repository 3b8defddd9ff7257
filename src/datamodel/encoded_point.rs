use super::ScalarValue;
use smallvec::SmallVec;

pub type PointTags = SmallVec<[(String, String); 1]>;
pub type PointFields = SmallVec<[(String, ScalarValue); 4]>;

/// A point ready for the line protocol writer.
///
/// Built once per encode call. It is not mutated afterwards: deduplication
/// produces a new point holding the fields that survived.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPoint {
    measurement: String,
    tags: PointTags,
    fields: PointFields,
    timestamp: i64,
}

impl EncodedPoint {
    pub fn new(
        measurement: impl Into<String>,
        tags: PointTags,
        fields: PointFields,
        timestamp: i64,
    ) -> Self {
        Self {
            measurement: measurement.into(),
            tags,
            fields,
            timestamp,
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn fields(&self) -> &[(String, ScalarValue)] {
        &self.fields
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag_key, _)| tag_key == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn field(&self, key: &str) -> Option<&ScalarValue> {
        self.fields
            .iter()
            .find(|(field_key, _)| field_key == key)
            .map(|(_, value)| value)
    }

    /// The entity the point belongs to: the value of its first tag.
    pub fn entity(&self) -> &str {
        self.tags.first().map(|(_, value)| value.as_str()).unwrap_or("")
    }

    /// Keeps the fields accepted by `keep` and returns `None` when none are left.
    pub fn retain_fields<F>(self, mut keep: F) -> Option<EncodedPoint>
    where
        F: FnMut(&str, &ScalarValue) -> bool,
    {
        let fields: PointFields = self
            .fields
            .into_iter()
            .filter(|(name, value)| keep(name, value))
            .collect();
        if fields.is_empty() {
            return None;
        }
        Some(EncodedPoint {
            measurement: self.measurement,
            tags: self.tags,
            fields,
            timestamp: self.timestamp,
        })
    }
}
