use crate::datamodel::{Sample, SampleSeries, SiteSample, TOTAL_ENTITY, pv_datetime::month_start};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Production periods reported by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionPeriod {
    Today,
    Month,
    Year,
    Lifetime,
}

impl ProductionPeriod {
    pub const ALL: [ProductionPeriod; 4] = [
        ProductionPeriod::Today,
        ProductionPeriod::Month,
        ProductionPeriod::Year,
        ProductionPeriod::Lifetime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionPeriod::Today => "today",
            ProductionPeriod::Month => "month",
            ProductionPeriod::Year => "year",
            ProductionPeriod::Lifetime => "lifetime",
        }
    }

    pub fn production_metric(&self) -> String {
        format!("production/{}", self.as_str())
    }

    pub fn co2_metric(&self) -> String {
        format!("co2avoided/{}", self.as_str())
    }
}

/// Bucket size of the production history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPeriod {
    /// One value per meter interval, usually a day
    Day,
    /// Intervals summed per UTC month
    Month,
}

impl HistoryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryPeriod::Day => "day",
            HistoryPeriod::Month => "month",
        }
    }

    pub fn metric(&self) -> String {
        format!("history/{}", self.as_str())
    }

    /// kWh produced by a device in each bucket of its meter readings.
    pub fn deltas(&self, meter: &SampleSeries) -> SampleSeries {
        let deltas = interval_deltas(meter);
        match self {
            HistoryPeriod::Day => deltas,
            HistoryPeriod::Month => rollup_by_month(&deltas),
        }
    }
}

impl FromStr for HistoryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(HistoryPeriod::Day),
            "month" => Ok(HistoryPeriod::Month),
            other => Err(format!("Unsupported history period: {}", other)),
        }
    }
}

/// Energy meter readings (Wh) of one device at the start of each period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProductionBaselines {
    pub today: f64,
    pub month: f64,
    pub year: f64,
    pub lifetime: f64,
}

impl ProductionBaselines {
    pub fn for_period(&self, period: ProductionPeriod) -> f64 {
        match period {
            ProductionPeriod::Today => self.today,
            ProductionPeriod::Month => self.month,
            ProductionPeriod::Year => self.year,
            ProductionPeriod::Lifetime => self.lifetime,
        }
    }
}

/// Current meter reading of a device together with its baselines.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProduction {
    pub label: String,
    pub current_wh: f64,
    pub baselines: ProductionBaselines,
}

/// Decimals kept on kWh values.
pub const PRODUCTION_PRECISION: i32 = 3;

/// Decimals kept on kg and ton values of avoided CO2.
pub const CO2_PRECISION: i32 = 2;

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

/// kWh produced since `baseline_wh`.
pub fn period_production(current_wh: f64, baseline_wh: f64) -> f64 {
    (current_wh - baseline_wh) / 1000.0
}

/// Converts cumulative Wh meter readings into kWh produced per interval.
///
/// The output has one sample per interval, stamped with the start of the
/// interval. A null reading is replaced by the last value seen, which is 0
/// until the first reading.
pub fn interval_deltas(series: &SampleSeries) -> SampleSeries {
    let mut last_seen = 0.0;
    let samples = series
        .samples()
        .windows(2)
        .map(|pair| {
            let start = pair[0].value.unwrap_or(last_seen);
            let end = pair[1].value.unwrap_or(last_seen);
            last_seen = end;
            Sample::new(pair[0].timestamp, (end - start) / 1000.0)
        })
        .collect();
    SampleSeries::from_unchecked(series.label(), samples)
}

/// Sums values into buckets starting at the first day of each UTC month.
pub fn rollup_by_month(series: &SampleSeries) -> SampleSeries {
    let mut months: BTreeMap<i64, f64> = BTreeMap::new();
    for sample in series.samples() {
        if let Some(value) = sample.value {
            *months.entry(month_start(sample.timestamp)).or_insert(0.0) += value;
        }
    }
    SampleSeries::from_unchecked(
        series.label(),
        months
            .into_iter()
            .map(|(timestamp, value)| Sample::new(timestamp, value))
            .collect(),
    )
}

/// Per period production of each device and of the whole site, in kWh.
///
/// Reported values are rounded to [`PRODUCTION_PRECISION`]. The site totals
/// are summed, and kept for CO2 computation, before rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionStats {
    periods: Vec<(ProductionPeriod, SiteSample)>,
    totals: Vec<(ProductionPeriod, f64)>,
}

impl ProductionStats {
    pub fn compute(devices: &[DeviceProduction]) -> Self {
        let mut totals = Vec::with_capacity(ProductionPeriod::ALL.len());
        let periods = ProductionPeriod::ALL
            .iter()
            .map(|&period| {
                let mut sample = SiteSample::new();
                let mut total = 0.0;
                for device in devices {
                    let produced = period_production(
                        device.current_wh,
                        device.baselines.for_period(period),
                    );
                    total += produced;
                    sample.insert(
                        device.label.as_str(),
                        round_to(produced, PRODUCTION_PRECISION),
                    );
                }
                sample.insert(TOTAL_ENTITY, round_to(total, PRODUCTION_PRECISION));
                totals.push((period, total));
                (period, sample)
            })
            .collect();
        Self { periods, totals }
    }

    pub fn periods(&self) -> &[(ProductionPeriod, SiteSample)] {
        &self.periods
    }

    pub fn get(&self, period: ProductionPeriod) -> Option<&SiteSample> {
        self.periods
            .iter()
            .find(|(candidate, _)| *candidate == period)
            .map(|(_, sample)| sample)
    }

    fn site_total(&self, period: ProductionPeriod) -> f64 {
        self.totals
            .iter()
            .find(|(candidate, _)| *candidate == period)
            .map_or(0.0, |(_, total)| *total)
    }
}

/// CO2 avoided by the site production of each period.
///
/// `factor_kg` is the grid emission factor in kgCO2e per kWh. Today and month
/// are reported in kg, year and lifetime in metric tons, both rounded to
/// [`CO2_PRECISION`].
pub fn co2_avoided(stats: &ProductionStats, factor_kg: f64) -> Vec<(ProductionPeriod, SiteSample)> {
    ProductionPeriod::ALL
        .iter()
        .map(|&period| {
            let factor = match period {
                ProductionPeriod::Today | ProductionPeriod::Month => factor_kg,
                ProductionPeriod::Year | ProductionPeriod::Lifetime => factor_kg / 1000.0,
            };
            let mut sample = SiteSample::new();
            sample.insert(
                TOTAL_ENTITY,
                round_to(stats.site_total(period) * factor, CO2_PRECISION),
            );
            (period, sample)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::FieldValue;

    fn float(sample: &SiteSample, entity: &str) -> f64 {
        match sample.get(entity) {
            Some(FieldValue::Float(value)) => *value,
            other => panic!("unexpected value for {}: {:?}", entity, other),
        }
    }

    #[test]
    fn test_interval_deltas() {
        let meter = SampleSeries::new(
            "inv1",
            vec![
                Sample::new(100, 1000.0),
                Sample::new(200, 3000.0),
                Sample::null(300),
                Sample::new(400, 4500.0),
            ],
        )
        .unwrap();

        let deltas = interval_deltas(&meter);
        let values: Vec<(i64, f64)> = deltas
            .samples()
            .iter()
            .map(|sample| (sample.timestamp, sample.value.unwrap()))
            .collect();
        assert_eq!(values, vec![(100, 2.0), (200, 0.0), (300, 1.5)]);
    }

    #[test]
    fn test_interval_deltas_of_single_sample() {
        let meter = SampleSeries::new("inv1", vec![Sample::new(100, 1000.0)]).unwrap();
        assert!(interval_deltas(&meter).is_empty());
    }

    #[test]
    fn test_rollup_by_month() {
        let daily = SampleSeries::new(
            "site",
            vec![
                Sample::new(1706659200, 1.0), // 2024-01-31
                Sample::new(1706745600, 2.0), // 2024-02-01
                Sample::new(1706832000, 3.0), // 2024-02-02
                Sample::null(1706918400),
            ],
        )
        .unwrap();
        let monthly = rollup_by_month(&daily);
        let values: Vec<(i64, f64)> = monthly
            .samples()
            .iter()
            .map(|sample| (sample.timestamp, sample.value.unwrap()))
            .collect();
        assert_eq!(values, vec![(1704067200, 1.0), (1706745600, 5.0)]);
    }

    #[test]
    fn test_production_stats() {
        let devices = vec![
            DeviceProduction {
                label: "inv1".to_string(),
                current_wh: 10_000.0,
                baselines: ProductionBaselines {
                    today: 8_000.0,
                    month: 5_000.0,
                    year: 2_000.0,
                    lifetime: 0.0,
                },
            },
            DeviceProduction {
                label: "inv2".to_string(),
                current_wh: 6_000.0,
                baselines: ProductionBaselines {
                    today: 5_500.0,
                    month: 4_000.0,
                    year: 1_000.0,
                    lifetime: 0.0,
                },
            },
        ];

        let stats = ProductionStats::compute(&devices);
        let today = stats.get(ProductionPeriod::Today).unwrap();
        assert_eq!(float(today, "inv1"), 2.0);
        assert_eq!(float(today, "inv2"), 0.5);
        assert_eq!(float(today, TOTAL_ENTITY), 2.5);

        let lifetime = stats.get(ProductionPeriod::Lifetime).unwrap();
        assert_eq!(float(lifetime, TOTAL_ENTITY), 16.0);
        assert_eq!(stats.periods().len(), 4);
    }

    #[test]
    fn test_co2_avoided_units() {
        let devices = vec![DeviceProduction {
            label: "inv1".to_string(),
            current_wh: 20_000.0,
            baselines: ProductionBaselines {
                today: 10_000.0,
                month: 10_000.0,
                year: 0.0,
                lifetime: 0.0,
            },
        }];
        let stats = ProductionStats::compute(&devices);
        let co2 = co2_avoided(&stats, 0.5);

        assert_eq!(co2.len(), 4);
        assert_eq!(co2[0].0, ProductionPeriod::Today);
        assert_eq!(float(&co2[0].1, TOTAL_ENTITY), 5.0); // 10 kWh, kg
        assert_eq!(float(&co2[2].1, TOTAL_ENTITY), 0.01); // 20 kWh, tons
        assert!(co2[0].1.get("inv1").is_none());
    }

    #[test]
    fn test_reported_values_are_rounded() {
        let devices = vec![
            DeviceProduction {
                label: "inv1".to_string(),
                current_wh: 400.1,
                baselines: ProductionBaselines {
                    today: 100.0,
                    ..Default::default()
                },
            },
            DeviceProduction {
                label: "inv2".to_string(),
                current_wh: 200.0,
                baselines: ProductionBaselines {
                    today: 0.4,
                    ..Default::default()
                },
            },
        ];
        let stats = ProductionStats::compute(&devices);
        let today = stats.get(ProductionPeriod::Today).unwrap();
        assert_eq!(float(today, "inv1"), 0.3);
        assert_eq!(float(today, "inv2"), 0.2);
        assert_eq!(float(today, TOTAL_ENTITY), 0.5);

        let co2 = co2_avoided(&stats, 0.44);
        assert_eq!(float(&co2[0].1, TOTAL_ENTITY), 0.22);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.30010000000000003, 3), 0.3);
        assert_eq!(round_to(0.132044, 2), 0.13);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-1.2345, 2), -1.23);
    }

    #[test]
    fn test_metric_paths() {
        assert_eq!(ProductionPeriod::Today.production_metric(), "production/today");
        assert_eq!(ProductionPeriod::Lifetime.co2_metric(), "co2avoided/lifetime");
        assert_eq!(HistoryPeriod::Month.metric(), "history/month");
    }

    #[test]
    fn test_history_period_deltas() {
        // 2024-01-30 to 2024-02-02, one reading per day
        let meter = SampleSeries::new(
            "inv1",
            vec![
                Sample::new(1706572800, 1000.0),
                Sample::new(1706659200, 3000.0),
                Sample::new(1706745600, 4500.0),
                Sample::new(1706832000, 5500.0),
            ],
        )
        .unwrap();

        let daily: Vec<(i64, f64)> = HistoryPeriod::Day
            .deltas(&meter)
            .samples()
            .iter()
            .map(|sample| (sample.timestamp, sample.value.unwrap()))
            .collect();
        assert_eq!(
            daily,
            vec![(1706572800, 2.0), (1706659200, 1.5), (1706745600, 1.0)]
        );

        let monthly: Vec<(i64, f64)> = HistoryPeriod::Month
            .deltas(&meter)
            .samples()
            .iter()
            .map(|sample| (sample.timestamp, sample.value.unwrap()))
            .collect();
        assert_eq!(monthly, vec![(1704067200, 3.5), (1706745600, 1.0)]);
    }

    #[test]
    fn test_history_period_from_str() {
        assert_eq!("day".parse::<HistoryPeriod>(), Ok(HistoryPeriod::Day));
        assert_eq!("Month".parse::<HistoryPeriod>(), Ok(HistoryPeriod::Month));
        assert!("week".parse::<HistoryPeriod>().is_err());
    }
}
