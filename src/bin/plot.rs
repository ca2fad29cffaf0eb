use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use picolog::{
    convert_all, end_of_collection, load_capture, reconstruct, render_sensor_png, ChannelSeries,
    ChartStyle, Config,
};

/// Plots a fetched logger CSV as two multi-panel time-series charts.
#[derive(Parser, Debug)]
#[command(name = "picolog-plot", version, about)]
struct Args {
    /// CSV file produced by picolog-fetch.
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output PNG for the accelerometer chart.
    #[arg(long)]
    accel_out: Option<PathBuf>,
    /// Output PNG for the gyroscope chart.
    #[arg(long)]
    gyro_out: Option<PathBuf>,
    /// JSON config file; CLI flags override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(input) = args.input {
        config.source_path = input;
    }
    if let Some(path) = args.accel_out {
        config.accel_plot_path = path;
    }
    if let Some(path) = args.gyro_out {
        config.gyro_plot_path = path;
    }

    let capture = load_capture(&config.source_path)
        .with_context(|| format!("loading {}", config.source_path.display()))?;
    let end = end_of_collection(&config.source_path)?;
    let real_times = reconstruct(&capture.samples, end)?;
    let physical = convert_all(&capture.samples, config.accel_scale, config.gyro_scale);
    info!(
        "loaded {} samples ({:?} schema), session {} .. {}",
        capture.len(),
        capture.schema,
        real_times.first().map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default(),
        end.format("%H:%M:%S")
    );
    for (t, p) in real_times.iter().zip(&physical).take(5) {
        info!(
            "{}  ax={:+.3} g  ay={:+.3} g  az={:+.3} g",
            t.format("%H:%M:%S%.3f"),
            p.ax_g,
            p.ay_g,
            p.az_g
        );
    }

    let accel = channel_series(&["ax", "ay", "az"], &real_times, |p| p.accel(), &physical);
    let gyro = channel_series(&["gx", "gy", "gz"], &real_times, |p| p.gyro(), &physical);

    let style = ChartStyle::default();
    let accel_png = render_sensor_png("Accelerometer", "g", &accel, &style)?;
    fs::write(&config.accel_plot_path, accel_png)
        .with_context(|| format!("writing {}", config.accel_plot_path.display()))?;
    println!("saved {}", config.accel_plot_path.display());

    let gyro_png = render_sensor_png("Gyroscope", "°/s", &gyro, &style)?;
    fs::write(&config.gyro_plot_path, gyro_png)
        .with_context(|| format!("writing {}", config.gyro_plot_path.display()))?;
    println!("saved {}", config.gyro_plot_path.display());
    Ok(())
}

fn channel_series(
    labels: &[&str; 3],
    times: &[chrono::DateTime<chrono::Local>],
    pick: impl Fn(&picolog::PhysicalSample) -> [f64; 3],
    physical: &[picolog::PhysicalSample],
) -> Vec<ChannelSeries> {
    (0..3)
        .map(|axis| ChannelSeries {
            label: labels[axis].to_string(),
            points: times
                .iter()
                .zip(physical)
                .map(|(t, p)| (*t, pick(p)[axis]))
                .collect(),
        })
        .collect()
}
