use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::error::PicologError;

/// Column layout of the logger file, selected from the header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schema {
    /// `timestamp_us;ax;ay;az;gx;gy;gz` — raw ADC counts, integers.
    /// A trailing `temp_raw` column from the firmware is accepted and ignored.
    Raw,
    /// `timestamp_us;ax_avg;...;gz_avg` — counts pre-averaged on the device.
    Averaged,
}

/// One logger record. Channel values are raw counts (or averaged raw counts),
/// not physical units; `timestamp_us` is the device's free-running microsecond
/// counter, relative to boot, not wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawSample {
    pub timestamp_us: u64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
}

impl RawSample {
    pub fn channels(&self) -> [f64; 6] {
        [self.ax, self.ay, self.az, self.gx, self.gy, self.gz]
    }
}

pub const CHANNEL_NAMES: [&str; 6] = ["ax", "ay", "az", "gx", "gy", "gz"];

/// A fully parsed logger file, held in memory for the analysis run.
#[derive(Clone, Debug)]
pub struct Capture {
    pub schema: Schema,
    pub samples: Vec<RawSample>,
}

impl Capture {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

const RAW_COLUMNS: [&str; 7] = ["timestamp_us", "ax", "ay", "az", "gx", "gy", "gz"];
const AVG_COLUMNS: [&str; 7] = [
    "timestamp_us",
    "ax_avg",
    "ay_avg",
    "az_avg",
    "gx_avg",
    "gy_avg",
    "gz_avg",
];

/// Matches the header row against the known schemas. Extra trailing columns
/// (the firmware appends `temp_raw`) do not disqualify a match.
pub fn detect_schema(header: &str) -> Result<Schema, PicologError> {
    let columns: Vec<&str> = header.split(';').map(str::trim).collect();
    if starts_with_columns(&columns, &RAW_COLUMNS) {
        Ok(Schema::Raw)
    } else if starts_with_columns(&columns, &AVG_COLUMNS) {
        Ok(Schema::Averaged)
    } else {
        Err(PicologError::BadHeader {
            header: header.to_string(),
        })
    }
}

fn starts_with_columns(columns: &[&str], expected: &[&str; 7]) -> bool {
    columns.len() >= expected.len() && columns[..expected.len()] == expected[..]
}

fn parse_row(line: &str, schema: Schema, line_no: usize) -> Result<RawSample, PicologError> {
    let malformed = |reason: String| PicologError::MalformedInput {
        line: line_no,
        reason,
    };
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() < 7 {
        return Err(malformed(format!(
            "expected at least 7 fields, got {}",
            fields.len()
        )));
    }
    let timestamp_us: u64 = fields[0]
        .parse()
        .map_err(|e| malformed(format!("bad timestamp {:?}: {e}", fields[0])))?;
    let mut channels = [0.0f64; 6];
    for (slot, field) in channels.iter_mut().zip(&fields[1..7]) {
        *slot = match schema {
            // raw counts are integers; reject fractional values early
            Schema::Raw => field
                .parse::<i64>()
                .map_err(|e| malformed(format!("bad raw count {field:?}: {e}")))?
                as f64,
            Schema::Averaged => field
                .parse::<f64>()
                .map_err(|e| malformed(format!("bad averaged value {field:?}: {e}")))?,
        };
    }
    Ok(RawSample {
        timestamp_us,
        ax: channels[0],
        ay: channels[1],
        az: channels[2],
        gx: channels[3],
        gy: channels[4],
        gz: channels[5],
    })
}

/// Loads a semicolon-delimited logger file: one header row, then data rows.
/// Blank lines are skipped. A missing file is reported distinctly from other
/// I/O failures.
pub fn load_capture(path: &Path) -> Result<Capture, PicologError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PicologError::MissingInputFile {
            path: path.to_path_buf(),
        },
        _ => PicologError::Io(e),
    })?;
    let reader = BufReader::new(file);
    let mut schema = None;
    let mut samples = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match schema {
            None => schema = Some(detect_schema(line)?),
            Some(s) => samples.push(parse_row(line, s, idx + 1)?),
        }
    }
    let schema = schema.ok_or(PicologError::EmptyCapture)?;
    Ok(Capture { schema, samples })
}

/// Persists the raw lines exactly as received, newline-terminated, so the
/// integer columns survive a round trip untouched.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<(), PicologError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}
