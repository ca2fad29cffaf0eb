use std::io::Cursor;

use chrono::{DateTime, Duration, Local};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;

use crate::error::PicologError;
use crate::stats::min_max;

/// One channel of a sensor group, already in physical units and wall-clock
/// time.
#[derive(Clone, Debug)]
pub struct ChannelSeries {
    pub label: String,
    pub points: Vec<(DateTime<Local>, f64)>,
}

#[derive(Clone, Debug)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 800,
            background: WHITE,
            palette: vec![RED, GREEN, BLUE],
        }
    }
}

/// Renders one sensor group as stacked, time-aligned subplots (one per
/// channel) and returns the encoded PNG. The x axis is wall-clock time of
/// day; each legend carries the channel's min/max.
pub fn render_sensor_png(
    title: &str,
    unit: &str,
    channels: &[ChannelSeries],
    style: &ChartStyle,
) -> Result<Vec<u8>, PicologError> {
    let first = channels.first().ok_or(PicologError::EmptyCapture)?;
    let x_start = first.points.first().ok_or(PicologError::EmptyCapture)?.0;
    let x_end = first.points.last().ok_or(PicologError::EmptyCapture)?.0;
    // a single-instant session still needs a non-degenerate axis
    let (x_start, x_end) = if x_start == x_end {
        (x_start - Duration::seconds(1), x_end + Duration::seconds(1))
    } else {
        (x_start, x_end)
    };

    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let root = root.titled(title, ("sans-serif", 26))?;
        let panels = root.split_evenly((channels.len(), 1));
        for (idx, (panel, channel)) in panels.iter().zip(channels).enumerate() {
            let summary = min_max(channel.points.iter().map(|p| p.1)).ok_or_else(|| {
                PicologError::Plot(format!("channel {} has no plottable values", channel.label))
            })?;
            let spread = summary.max - summary.min;
            let (y_lo, y_hi) = if spread.abs() < f64::EPSILON {
                (summary.min - 1.0, summary.max + 1.0)
            } else {
                (summary.min - 0.05 * spread, summary.max + 0.05 * spread)
            };
            let color = style.palette[idx % style.palette.len()];
            let mut chart = ChartBuilder::on(panel)
                .margin(8)
                .set_label_area_size(LabelAreaPosition::Left, 60)
                .set_label_area_size(LabelAreaPosition::Bottom, 32)
                .build_cartesian_2d(x_start..x_end, y_lo..y_hi)?;
            chart
                .configure_mesh()
                .light_line_style(&BLACK.mix(0.15))
                .x_label_formatter(&|t: &DateTime<Local>| t.format("%H:%M:%S").to_string())
                .y_desc(format!("{} [{}]", channel.label, unit))
                .draw()?;
            chart
                .draw_series(LineSeries::new(channel.points.iter().cloned(), &color))?
                .label(format!(
                    "{} (min {:.2}, max {:.2})",
                    channel.label, summary.min, summary.max
                ))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .border_style(&BLACK.mix(0.3))
                .background_style(&WHITE.mix(0.9))
                .draw()?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, PicologError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| PicologError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series(label: &str, values: &[f64]) -> ChannelSeries {
        let start = Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        ChannelSeries {
            label: label.to_string(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| (start + Duration::milliseconds(i as i64 * 100), *v))
                .collect(),
        }
    }

    #[test]
    fn renders_three_panel_png() {
        let channels = vec![
            series("ax", &[0.0, 0.5, 1.0, 0.5]),
            series("ay", &[-1.0, 0.0, 1.0, 0.0]),
            series("az", &[1.0, 1.0, 1.0, 1.0]),
        ];
        let png = render_sensor_png("Accelerometer", "g", &channels, &ChartStyle::default())
            .unwrap();
        assert!(!png.is_empty());
        // PNG magic
        assert_eq!(png[..4], [0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn flat_channel_still_renders() {
        let channels = vec![series("gz", &[0.0, 0.0, 0.0])];
        let png =
            render_sensor_png("Gyroscope", "°/s", &channels, &ChartStyle::default()).unwrap();
        assert!(!png.is_empty());
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = render_sensor_png("x", "g", &[], &ChartStyle::default()).unwrap_err();
        assert!(matches!(err, PicologError::EmptyCapture));
    }
}
