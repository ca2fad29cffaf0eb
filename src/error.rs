use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PicologError {
    #[error("input file not found: {path}")]
    MissingInputFile { path: PathBuf },
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },
    #[error("unrecognized column header: {header:?}")]
    BadHeader { header: String },
    #[error("cannot open serial port {port}: {source}")]
    ConnectionFailure {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("no data lines received from the device")]
    EmptyTransfer,
    #[error("capture holds no samples")]
    EmptyCapture,
    #[error("failed to render chart: {0}")]
    Plot(String),
    #[error("serial link: {0}")]
    Serial(#[from] serialport::Error),
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for PicologError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        PicologError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for PicologError {
    fn from(value: image::ImageError) -> Self {
        PicologError::Plot(value.to_string())
    }
}
