use super::FieldValue;

/// A structured sample: one value per entity, in insertion order.
///
/// Entities are device labels, plus `"total"` for the site-wide aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSample {
    entries: Vec<(String, FieldValue)>,
}

impl SiteSample {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of an entity, replacing a previous value in place.
    pub fn insert(&mut self, entity: impl Into<String>, value: impl Into<FieldValue>) {
        let entity = entity.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == entity) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((entity, value)),
        }
    }

    pub fn get(&self, entity: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == entity)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(entity, value)| (entity.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for SiteSample {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut sample = SiteSample::new();
        for (entity, value) in iter {
            sample.insert(entity, value);
        }
        sample
    }
}
