use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use picolog::{fetch_log, Config, PicoStatusClassifier};

/// Pulls the logged CSV off the Pico over its serial shortcut commands.
#[derive(Parser, Debug)]
#[command(name = "picolog-fetch", version, about)]
struct Args {
    /// Serial port the Pico enumerates on.
    #[arg(short, long)]
    port: Option<String>,
    /// Baud rate of the serial link.
    #[arg(short, long)]
    baud: Option<u32>,
    /// Where to save the received CSV.
    #[arg(short, long)]
    output: Option<PathBuf>,
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
    if let Some(port) = args.port {
        config.port_name = port;
    }
    if let Some(baud) = args.baud {
        config.baud_rate = baud;
    }
    if let Some(output) = args.output {
        config.destination_path = output;
    }

    let lines = fetch_log(&config, &PicoStatusClassifier)
        .context("acquisition session failed")?;
    println!(
        "saved {} lines to {}",
        lines,
        config.destination_path.display()
    );
    Ok(())
}
