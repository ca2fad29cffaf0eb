use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::PicologError;

/// Everything both pipelines need to know, in one place. The CLI layers its
/// flag overrides on top of either the defaults or a JSON config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Serial port the Pico enumerates on.
    pub port_name: String,
    pub baud_rate: u32,
    /// CSV consumed by the plotting pipeline.
    pub source_path: PathBuf,
    /// CSV written by the fetch pipeline.
    pub destination_path: PathBuf,
    pub accel_plot_path: PathBuf,
    pub gyro_plot_path: PathBuf,
    /// LSB per g at the configured ±2 g full-scale range.
    pub accel_scale: f64,
    /// LSB per °/s at the configured ±250 °/s full-scale range.
    pub gyro_scale: f64,
    /// Per-read timeout on the serial port. A silent device ends the
    /// transfer here; there is no overall session timeout.
    pub read_timeout_ms: u64,
    /// Wait after opening the port; the Pico resets on DTR toggle.
    pub settle_delay_ms: u64,
    /// Wait after the mount command while the SD card spins up.
    pub mount_delay_ms: u64,
    /// Wait after the dump command before collecting lines.
    pub dump_delay_ms: u64,
    pub unmount_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port_name: default_port().to_string(),
            baud_rate: 115_200,
            source_path: PathBuf::from("pico_imu.csv"),
            destination_path: PathBuf::from("pico_imu.csv"),
            accel_plot_path: PathBuf::from("accel_plot.png"),
            gyro_plot_path: PathBuf::from("gyro_plot.png"),
            accel_scale: 16384.0,
            gyro_scale: 131.0,
            read_timeout_ms: 1_000,
            settle_delay_ms: 2_000,
            mount_delay_ms: 1_000,
            dump_delay_ms: 1_000,
            unmount_delay_ms: 500,
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> Result<Self, PicologError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PicologError::MissingInputFile {
                path: path.to_path_buf(),
            },
            _ => PicologError::Io(e),
        })?;
        serde_json::from_reader(file).map_err(|e| PicologError::MalformedInput {
            line: e.line(),
            reason: e.to_string(),
        })
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(windows)]
fn default_port() -> &'static str {
    "COM6"
}

#[cfg(not(windows))]
fn default_port() -> &'static str {
    "/dev/ttyACM0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sensor_setup() {
        let cfg = Config::default();
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.accel_scale, 16384.0);
        assert_eq!(cfg.gyro_scale, 131.0);
    }

    #[test]
    fn json_file_overrides_defaults() {
        let path = std::env::temp_dir().join("picolog_config_test.json");
        std::fs::write(&path, r#"{"baud_rate": 9600, "port_name": "COM3"}"#).unwrap();
        let cfg = Config::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.port_name, "COM3");
        assert_eq!(cfg.accel_scale, 16384.0);
    }

    #[test]
    fn missing_config_file_is_distinct() {
        let err = Config::from_json_file(Path::new("no_such_config.json")).unwrap_err();
        assert!(matches!(err, PicologError::MissingInputFile { .. }));
    }
}
