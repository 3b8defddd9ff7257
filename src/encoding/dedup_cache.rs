use super::line_protocol::render_field;
use crate::datamodel::EncodedPoint;
use clru::CLruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Points that survived deduplication.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DedupOutcome {
    pub points: Vec<EncodedPoint>,
    pub suppressed_fields: usize,
}

/// Remembers the last rendered value of every (measurement, entity, field)
/// so unchanged values are written only once.
pub struct DedupCache {
    entries: Mutex<CLruCache<String, String>>,
}

impl fmt::Debug for DedupCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DedupCache")
            .field("len", &self.len())
            .finish()
    }
}

impl DedupCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(CLruCache::new(capacity)),
        }
    }

    /// `{measurement}_{entity}_{field}`, with `\` and `_` escaped inside
    /// each part so that `("inv_a", "b")` and `("inv", "a_b")` stay distinct.
    pub fn signature(measurement: &str, entity: &str, field: &str) -> String {
        let mut signature =
            String::with_capacity(measurement.len() + entity.len() + field.len() + 2);
        for (index, part) in [measurement, entity, field].into_iter().enumerate() {
            if index > 0 {
                signature.push('_');
            }
            for c in part.chars() {
                if c == '\\' || c == '_' {
                    signature.push('\\');
                }
                signature.push(c);
            }
        }
        signature
    }

    fn lock(&self) -> MutexGuard<'_, CLruCache<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true when `rendered` must be emitted, and remembers it.
    pub fn check_and_update(&self, signature: &str, rendered: &str) -> bool {
        let mut entries = self.lock();
        if entries.get(signature).is_some_and(|last| last == rendered) {
            return false;
        }
        entries.put(signature.to_string(), rendered.to_string());
        true
    }

    /// Removes unchanged fields, and the points left without fields.
    pub fn filter(&self, points: Vec<EncodedPoint>) -> DedupOutcome {
        let mut suppressed_fields = 0;
        let points = points
            .into_iter()
            .filter_map(|point| {
                let measurement = point.measurement().to_string();
                let entity = point.entity().to_string();
                point.retain_fields(|field, value| {
                    let signature = Self::signature(&measurement, &entity, field);
                    let emit = self.check_and_update(&signature, &render_field(value));
                    if !emit {
                        suppressed_fields += 1;
                    }
                    emit
                })
            })
            .collect();
        DedupOutcome {
            points,
            suppressed_fields,
        }
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn evict(&self, signature: &str) -> bool {
        self.lock().pop(signature).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::ScalarValue;
    use smallvec::smallvec;
    use std::sync::Arc;

    fn cache(capacity: usize) -> DedupCache {
        DedupCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn point(entity: &str, fields: Vec<(&str, i64)>, timestamp: i64) -> EncodedPoint {
        EncodedPoint::new(
            "production",
            smallvec![("inverter".to_string(), entity.to_string())],
            fields
                .into_iter()
                .map(|(key, value)| (key.to_string(), ScalarValue::Int(value)))
                .collect(),
            timestamp,
        )
    }

    #[test]
    fn test_signature() {
        assert_eq!(
            DedupCache::signature("production", "inv1", "power"),
            "production_inv1_power"
        );
        assert_eq!(
            DedupCache::signature("status", "inv_1", "operating_status"),
            r"status_inv\_1_operating\_status"
        );
    }

    #[test]
    fn test_underscores_do_not_merge_signatures() {
        let cache = cache(16);
        let first = point("inv_a", vec![("b", 1)], 0);
        let second = point("inv", vec![("a_b", 1)], 0);

        let outcome = cache.filter(vec![first, second]);
        assert_eq!(outcome.points.len(), 2);
        assert_eq!(outcome.suppressed_fields, 0);
    }

    #[test]
    fn test_check_and_update() {
        let cache = cache(16);
        assert!(cache.check_and_update("production_inv1_power", "42i"));
        assert!(!cache.check_and_update("production_inv1_power", "42i"));
        assert!(cache.check_and_update("production_inv1_power", "43i"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_filter_ignores_timestamps() {
        let cache = cache(16);
        let first = cache.filter(vec![point("inv1", vec![("today", 1)], 100)]);
        assert_eq!(first.points.len(), 1);

        let second = cache.filter(vec![point("inv1", vec![("today", 1)], 200)]);
        assert!(second.points.is_empty());
        assert_eq!(second.suppressed_fields, 1);
    }

    #[test]
    fn test_filter_keeps_changed_fields_only() {
        let cache = cache(16);
        cache.filter(vec![point("inv1", vec![("power_a", 1), ("power_b", 2)], 0)]);

        let outcome = cache.filter(vec![
            point("inv1", vec![("power_a", 1), ("power_b", 3)], 1),
            point("inv2", vec![("power_a", 1)], 1),
        ]);
        assert_eq!(outcome.points.len(), 2);
        assert_eq!(outcome.points[0].fields().len(), 1);
        assert_eq!(outcome.points[0].field("power_b"), Some(&ScalarValue::Int(3)));
        assert_eq!(outcome.suppressed_fields, 1);
    }

    #[test]
    fn test_reset_and_evict() {
        let cache = cache(16);
        cache.check_and_update("a", "1i");
        cache.check_and_update("b", "1i");
        assert!(cache.evict("a"));
        assert!(!cache.evict("a"));
        assert!(cache.check_and_update("a", "1i"));

        cache.reset();
        assert!(cache.is_empty());
        assert!(cache.check_and_update("b", "1i"));
    }

    #[test]
    fn test_capacity_bound_reemits() {
        let cache = cache(2);
        cache.check_and_update("a", "1i");
        cache.check_and_update("b", "1i");
        cache.check_and_update("c", "1i");
        assert_eq!(cache.len(), 2);
        // "a" was the least recently used entry
        assert!(cache.check_and_update("a", "1i"));
    }

    #[tokio::test]
    async fn test_concurrent_updates() {
        let cache = Arc::new(cache(64));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.check_and_update("shared", "1i") })
            })
            .collect();
        let mut emitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 1);
    }
}
