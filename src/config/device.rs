use serde::Deserialize;
use serde_inline_default::serde_inline_default;
use std::path::PathBuf;

#[serde_inline_default]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DeviceConfig {
    pub name: String,
    pub history_file: PathBuf,
    pub fine_history_file: Option<PathBuf>,

    #[serde_inline_default(true)]
    pub enabled: bool,
}

/// Devices given as a JSON array in the environment.
pub fn parse_devices_env(value: &str) -> Result<Vec<DeviceConfig>, serde_json::Error> {
    serde_json::from_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices_env() {
        let devices = parse_devices_env(
            r#"[{"name": "inv1", "history_file": "/data/inv1.json"},
                {"name": "inv2", "history_file": "/data/inv2.json",
                 "fine_history_file": "/data/inv2_fine.json", "enabled": false}]"#,
        )
        .unwrap();

        assert_eq!(devices.len(), 2);
        assert!(devices[0].enabled);
        assert_eq!(devices[0].fine_history_file, None);
        assert!(!devices[1].enabled);
        assert_eq!(
            devices[1].fine_history_file,
            Some(PathBuf::from("/data/inv2_fine.json"))
        );

        assert!(parse_devices_env(r#"[{"name": "inv1"}]"#).is_err());
    }
}
