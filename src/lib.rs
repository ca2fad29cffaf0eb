pub mod chart;
pub mod config;
pub mod convert;
pub mod error;
pub mod link;
pub mod sample;
pub mod stats;
pub mod timeline;

pub use chart::{render_sensor_png, ChannelSeries, ChartStyle};
pub use config::Config;
pub use convert::{convert_all, to_physical, PhysicalSample, ACCEL_LSB_PER_G, GYRO_LSB_PER_DPS};
pub use error::PicologError;
pub use link::{fetch_log, LineClass, LineClassifier, PicoStatusClassifier};
pub use sample::{load_capture, write_lines, Capture, RawSample, Schema};
pub use stats::{min_max, ChannelSummary};
pub use timeline::{end_of_collection, reconstruct};
