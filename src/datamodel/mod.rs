pub mod encoded_point;
pub mod field_value;
pub mod pv_datetime;
pub mod sample;
pub mod sample_series;
pub mod series_set;
pub mod site_sample;

pub use encoded_point::{EncodedPoint, PointFields, PointTags};
pub use field_value::{FieldValue, ScalarValue};
pub use pv_datetime::{PvDateTime, PvDateTimeExt};
pub use sample::{AggregatedPoint, Sample};
pub use sample_series::SampleSeries;
pub use series_set::SeriesSet;
pub use site_sample::SiteSample;

/// Label of the synthesized site-wide series, and tag value of site points.
pub const SITE_LABEL: &str = "site";

/// Entity key under which producers put the site-wide aggregate.
pub const TOTAL_ENTITY: &str = "total";
