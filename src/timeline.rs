use std::path::Path;

use chrono::{DateTime, Duration, Local};
use log::warn;

use crate::error::PicologError;
use crate::sample::RawSample;

/// Reads the session time anchor off the capture file: its last-modified time,
/// taken as "approximately when collection ended". OS write buffering makes
/// this a proxy, not a measurement; expect sub-second to a few seconds of skew.
pub fn end_of_collection(path: &Path) -> Result<DateTime<Local>, PicologError> {
    let modified = std::fs::metadata(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PicologError::MissingInputFile {
                path: path.to_path_buf(),
            },
            _ => PicologError::Io(e),
        })?
        .modified()?;
    Ok(DateTime::<Local>::from(modified))
}

/// Maps every device-relative microsecond counter onto wall-clock time.
///
/// `duration = last - first` counters, interpreted as microseconds; the
/// session start is `end_of_collection - duration` and each sample lands at
/// `start + (timestamp_us - first)`. Device clock drift over the session is
/// assumed negligible. A counter that runs backwards (wraparound) is tolerated:
/// the resulting instants are non-monotonic and a warning is logged.
pub fn reconstruct(
    samples: &[RawSample],
    end_of_collection: DateTime<Local>,
) -> Result<Vec<DateTime<Local>>, PicologError> {
    let first = samples.first().ok_or(PicologError::EmptyCapture)?;
    let last = samples.last().ok_or(PicologError::EmptyCapture)?;
    let first_us = first.timestamp_us as i64;
    let duration_us = last.timestamp_us as i64 - first_us;
    if duration_us < 0 {
        warn!("timestamp counter runs backwards over the capture; real times will be non-monotonic");
    }
    let start = end_of_collection - Duration::microseconds(duration_us);
    let mut instants = Vec::with_capacity(samples.len());
    let mut previous = first_us;
    for sample in samples {
        let offset_us = sample.timestamp_us as i64 - first_us;
        if (sample.timestamp_us as i64) < previous {
            warn!(
                "timestamp_us {} is earlier than its predecessor; keeping it as-is",
                sample.timestamp_us
            );
        }
        previous = sample.timestamp_us as i64;
        instants.push(start + Duration::microseconds(offset_us));
    }
    Ok(instants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(timestamp_us: u64) -> RawSample {
        RawSample {
            timestamp_us,
            ax: 0.0,
            ay: 0.0,
            az: 0.0,
            gx: 0.0,
            gy: 0.0,
            gz: 0.0,
        }
    }

    fn anchor() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn first_and_last_instants_bracket_the_anchor() {
        let samples = [sample(1000), sample(2500), sample(5000)];
        let end = anchor();
        let real = reconstruct(&samples, end).unwrap();
        let duration = Duration::microseconds(4000);
        assert_eq!(real[0], end - duration);
        assert_eq!(*real.last().unwrap(), end);
    }

    #[test]
    fn interior_samples_keep_their_relative_offsets() {
        let samples = [sample(1000), sample(2500), sample(5000)];
        let end = anchor();
        let real = reconstruct(&samples, end).unwrap();
        assert_eq!(real[1] - real[0], Duration::microseconds(1500));
    }

    #[test]
    fn single_sample_collapses_to_the_anchor() {
        let real = reconstruct(&[sample(42)], anchor()).unwrap();
        assert_eq!(real, vec![anchor()]);
    }

    #[test]
    fn empty_capture_is_an_error() {
        let err = reconstruct(&[], anchor()).unwrap_err();
        assert!(matches!(err, PicologError::EmptyCapture));
    }

    #[test]
    fn backwards_counter_is_tolerated_not_rejected() {
        // wraparound produces non-monotonic instants, by contract
        let samples = [sample(5000), sample(1000)];
        let end = anchor();
        let real = reconstruct(&samples, end).unwrap();
        assert_eq!(real[0], end - Duration::microseconds(-4000));
        assert!(real[1] < real[0]);
    }
}
