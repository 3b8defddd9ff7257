use anyhow::Error;
use confique::Config;
use std::{
    num::NonZeroUsize,
    sync::{Arc, OnceLock},
};

use crate::sources::SiteLocation;
use crate::writers::OutputCompression;

pub use self::device::{DeviceConfig, parse_devices_env};
pub mod device;

#[derive(Debug, Config)]
pub struct PvCollectConfig {
    #[config(env = "PVCOLLECT_SITE_NAME", default = "pvsite")]
    pub site_name: String,

    #[config(env = "PVCOLLECT_LATITUDE", default = 59.94)]
    pub latitude: f64,
    #[config(env = "PVCOLLECT_LONGITUDE", default = 10.72)]
    pub longitude: f64,
    #[config(env = "PVCOLLECT_TILT", default = 30.0)]
    pub tilt: f64,
    #[config(env = "PVCOLLECT_AZIMUTH", default = 180.0)]
    pub azimuth: f64,

    #[config(env = "PVCOLLECT_DEVICES", parse_env = parse_devices_env)]
    pub devices: Option<Vec<DeviceConfig>>,

    #[config(env = "PVCOLLECT_METRIC", default = "production/total")]
    pub metric: String,

    #[config(env = "PVCOLLECT_INTEGER_VALUES", default = true)]
    pub integer_values: bool,

    #[config(env = "PVCOLLECT_DEDUP_CAPACITY", default = 4096)]
    pub dedup_capacity: usize,

    #[config(env = "PVCOLLECT_OUTPUT", default = "-")]
    pub output: String,

    #[config(env = "PVCOLLECT_OUTPUT_COMPRESSION", default = "none")]
    pub output_compression: String,

    #[config(env = "PVCOLLECT_OUTPUT_BUFFER_SIZE", default = "64kb")]
    pub output_buffer_size: String,

    #[config(env = "PVCOLLECT_IRRADIANCE_FILE")]
    pub irradiance_file: Option<String>,

    #[config(env = "PVCOLLECT_IRRADIANCE_FREQ_SECONDS", default = 900)]
    pub irradiance_freq_seconds: i64,

    /// Grid emission factor, kgCO2e per kWh
    #[config(env = "PVCOLLECT_CO2_FACTOR", default = 0.44)]
    pub co2_factor: f64,

    #[config(env = "PVCOLLECT_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

impl PvCollectConfig {
    pub fn load() -> Result<PvCollectConfig, Error> {
        let c = PvCollectConfig::builder()
            .env()
            .file("settings.toml")
            .load()?;

        Ok(c)
    }

    pub fn parse_output_buffer_size(&self) -> Result<usize, Error> {
        let size = byte_unit::Byte::parse_str(self.output_buffer_size.clone(), true)?.as_u64();
        if size > 64 * 1024 * 1024 {
            anyhow::bail!("Output buffer size is too big: > 64MB");
        }
        Ok(size as usize)
    }

    pub fn parse_output_compression(&self) -> Result<OutputCompression, Error> {
        self.output_compression.parse().map_err(Error::msg)
    }

    pub fn dedup_capacity(&self) -> Result<NonZeroUsize, Error> {
        NonZeroUsize::new(self.dedup_capacity)
            .ok_or_else(|| Error::msg("Dedup capacity must be greater than zero"))
    }

    pub fn location(&self) -> SiteLocation {
        SiteLocation {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Configured devices, without the disabled ones.
    pub fn enabled_devices(&self) -> impl Iterator<Item = &DeviceConfig> {
        self.devices
            .iter()
            .flatten()
            .filter(|device| device.enabled)
    }
}

static PVCOLLECT_CONFIG: OnceLock<Arc<PvCollectConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<PvCollectConfig>, Error> {
    PVCOLLECT_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    if PVCOLLECT_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = PvCollectConfig::load()?;
    PVCOLLECT_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_config() {
        let config = PvCollectConfig::load().unwrap();

        assert_eq!(config.site_name, "pvsite");
        assert_eq!(config.metric, "production/total");
        assert_eq!(config.dedup_capacity().unwrap().get(), 4096);
        assert_eq!(config.co2_factor, 0.44);
        assert_eq!(config.output, "-");
        assert!(config.devices.is_none());

        temp_env::with_var("PVCOLLECT_SITE_NAME", Some("rooftop"), || {
            let config = PvCollectConfig::load().unwrap();
            assert_eq!(config.site_name, "rooftop");
        });
    }

    #[test]
    #[serial]
    fn test_devices_from_env() {
        temp_env::with_var(
            "PVCOLLECT_DEVICES",
            Some(r#"[{"name": "inv1", "history_file": "a.json"}, {"name": "inv2", "history_file": "b.json", "enabled": false}]"#),
            || {
                let config = PvCollectConfig::load().unwrap();
                let names: Vec<&str> = config
                    .enabled_devices()
                    .map(|device| device.name.as_str())
                    .collect();
                assert_eq!(names, vec!["inv1"]);
            },
        );
    }

    #[test]
    #[serial]
    fn test_parse_output_buffer_size() {
        let config = PvCollectConfig::load().unwrap();
        assert_eq!(config.parse_output_buffer_size().unwrap(), 64000);

        temp_env::with_var("PVCOLLECT_OUTPUT_BUFFER_SIZE", Some("8KiB"), || {
            let config = PvCollectConfig::load().unwrap();
            assert_eq!(config.parse_output_buffer_size().unwrap(), 8192);
        });

        temp_env::with_var("PVCOLLECT_OUTPUT_BUFFER_SIZE", Some("1gb"), || {
            let config = PvCollectConfig::load().unwrap();
            assert!(config.parse_output_buffer_size().is_err());
        });
    }

    #[test]
    #[serial]
    fn test_invalid_settings() {
        temp_env::with_vars(
            [
                ("PVCOLLECT_DEDUP_CAPACITY", Some("0")),
                ("PVCOLLECT_OUTPUT_COMPRESSION", Some("brotli")),
            ],
            || {
                let config = PvCollectConfig::load().unwrap();
                assert!(config.dedup_capacity().is_err());
                assert!(config.parse_output_compression().is_err());
            },
        );
    }

    #[test]
    #[serial]
    fn test_load_configuration() {
        load_configuration().unwrap();
        assert!(PVCOLLECT_CONFIG.get().is_some());

        let config = get().unwrap();
        assert_eq!(config.site_name, "pvsite");
    }
}
