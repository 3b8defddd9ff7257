use super::{EncodingError, metric_lookup};
use crate::datamodel::{
    EncodedPoint, FieldValue, PointFields, ScalarValue, SITE_LABEL, SeriesSet, SiteSample,
    TOTAL_ENTITY, pv_datetime::now_unix_seconds,
};
use smallvec::smallvec;

pub const ENTITY_TAG: &str = "inverter";

/// Where the timestamp of encoded points comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamping {
    /// Backfill: every point is stamped with the given unix seconds.
    At(i64),
    /// Live: the current time, read once per encode call.
    Now,
}

/// How series samples are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Rounded to the nearest integer, written with the `i` suffix.
    Integer,
    Float,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PointEncoder;

impl PointEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes one structured sample into one point per entity.
    pub fn encode(
        &self,
        path: &str,
        sample: &SiteSample,
        timestamping: Timestamping,
    ) -> Result<Vec<EncodedPoint>, EncodingError> {
        let target = metric_lookup::lookup(path)?;
        let timestamp = match timestamping {
            Timestamping::At(timestamp) => timestamp,
            Timestamping::Now => now_unix_seconds().map_err(|error| EncodingError::Clock {
                details: error.to_string(),
            })?,
        };

        let mut points = Vec::with_capacity(sample.len());
        for (entity, value) in sample.iter() {
            let is_site = entity == TOTAL_ENTITY;
            let fields = entity_fields(entity, is_site, target.field, value)?;
            if fields.is_empty() {
                continue;
            }
            let tag_value = if is_site { SITE_LABEL } else { entity };
            points.push(EncodedPoint::new(
                target.measurement,
                smallvec![(ENTITY_TAG.to_string(), tag_value.to_string())],
                fields,
                timestamp,
            ));
        }
        Ok(points)
    }

    /// Encodes every non-null sample of every series, stamped with its own
    /// timestamp. The series label is the entity.
    pub fn encode_series(
        &self,
        path: &str,
        series_set: &SeriesSet,
        kind: ValueKind,
    ) -> Result<Vec<EncodedPoint>, EncodingError> {
        let target = metric_lookup::lookup(path)?;

        let mut points = Vec::new();
        for series in series_set {
            let entity = if series.label() == TOTAL_ENTITY {
                SITE_LABEL
            } else {
                series.label()
            };
            for sample in series.samples() {
                let Some(value) = sample.value else {
                    continue;
                };
                let value = scalar_from_f64(entity, target.field, value, kind)?;
                points.push(EncodedPoint::new(
                    target.measurement,
                    smallvec![(ENTITY_TAG.to_string(), entity.to_string())],
                    smallvec![(target.field.to_string(), value)],
                    sample.timestamp,
                ));
            }
        }
        Ok(points)
    }
}

fn scalar_from_f64(
    entity: &str,
    field: &str,
    value: f64,
    kind: ValueKind,
) -> Result<ScalarValue, EncodingError> {
    if !value.is_finite() {
        return Err(EncodingError::NonFiniteFloat {
            entity: entity.to_string(),
            field: field.to_string(),
        });
    }
    Ok(match kind {
        ValueKind::Integer => ScalarValue::Int(value.round() as i64),
        ValueKind::Float => ScalarValue::Float(value),
    })
}

fn scalar_field(entity: &str, field: &str, value: &FieldValue) -> Result<ScalarValue, EncodingError> {
    match value {
        FieldValue::Float(value) => scalar_from_f64(entity, field, *value, ValueKind::Float),
        FieldValue::Nested(_) => Err(EncodingError::NestedTooDeep {
            entity: entity.to_string(),
        }),
        other => other.as_scalar().ok_or_else(|| EncodingError::NestedTooDeep {
            entity: entity.to_string(),
        }),
    }
}

fn entity_fields(
    entity: &str,
    is_site: bool,
    field: &str,
    value: &FieldValue,
) -> Result<PointFields, EncodingError> {
    let FieldValue::Nested(entries) = value else {
        return Ok(smallvec![(
            field.to_string(),
            scalar_field(entity, field, value)?
        )]);
    };

    let mut fields = PointFields::with_capacity(entries.len());
    for (subkey, subvalue) in entries {
        let subkey = match subkey.as_str() {
            TOTAL_ENTITY if is_site => SITE_LABEL,
            TOTAL_ENTITY => ENTITY_TAG,
            other => other,
        };
        let name = format!("{}_{}", field, subkey);
        let scalar = scalar_field(entity, &name, subvalue)?;
        fields.push((name, scalar));
    }
    Ok(fields)
}
