use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::thread::sleep;
use std::time::Duration;

use log::{debug, info, warn};
use serialport::{ClearBuffer, SerialPort};

use crate::config::Config;
use crate::error::PicologError;
use crate::sample;

// Firmware shortcut bytes.
const CMD_MOUNT: u8 = b'a';
const CMD_DUMP: u8 = b'd';
const CMD_UNMOUNT: u8 = b'b';

/// What a received line means to the collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineClass {
    /// Column header; starts the data block, discarding anything collected
    /// before it.
    Header,
    /// A row worth keeping.
    Data,
    /// Firmware chatter; dropped.
    Noise,
}

/// Policy that decides what each response line is. Kept separate from the
/// transport so the string-matching can evolve without touching the serial
/// plumbing.
pub trait LineClassifier {
    fn classify(&self, line: &str) -> LineClass;
}

/// Matches the status banners the Pico firmware prints around a file dump.
#[derive(Debug, Default)]
pub struct PicoStatusClassifier;

impl PicoStatusClassifier {
    const NOISE_MARKERS: [&'static str; 4] = [
        "Conteúdo do arquivo",
        "Leitura do arquivo",
        "Escolha o comando",
        "Comandos disponíveis",
    ];
    const HEADER_MARKER: &'static str = "timestamp_us;ax;ay;az";
}

impl LineClassifier for PicoStatusClassifier {
    fn classify(&self, line: &str) -> LineClass {
        if Self::NOISE_MARKERS.iter().any(|m| line.contains(m)) {
            LineClass::Noise
        } else if line.contains(Self::HEADER_MARKER) {
            LineClass::Header
        } else {
            LineClass::Data
        }
    }
}

/// An open serial session with the logger. The port is released when the
/// session drops, on every exit path.
pub struct SerialSession {
    port: Box<dyn SerialPort>,
}

impl SerialSession {
    /// Opens the configured port and waits out the device reset (the Pico
    /// reboots when DTR toggles).
    pub fn open(config: &Config) -> Result<Self, PicologError> {
        let port = serialport::new(&config.port_name, config.baud_rate)
            .timeout(config.read_timeout())
            .open()
            .map_err(|source| PicologError::ConnectionFailure {
                port: config.port_name.clone(),
                source,
            })?;
        info!(
            "connected to {} at {} baud, settling {} ms",
            config.port_name, config.baud_rate, config.settle_delay_ms
        );
        sleep(Duration::from_millis(config.settle_delay_ms));
        Ok(Self { port })
    }

    fn command(&mut self, byte: u8, delay_ms: u64) -> Result<(), PicologError> {
        self.port.write_all(&[byte])?;
        self.port.flush()?;
        sleep(Duration::from_millis(delay_ms));
        Ok(())
    }

    /// Throws away whatever the device has queued (mount banners and the
    /// command menu).
    fn drain(&mut self) -> Result<(), PicologError> {
        let pending = self.port.bytes_to_read()?;
        if pending > 0 {
            self.port.clear(ClearBuffer::Input)?;
            debug!("drained {pending} pending bytes of status output");
        }
        Ok(())
    }

    /// Reads newline-delimited responses until the device sends an empty line
    /// or goes quiet for one read timeout. Bytes that do not decode as UTF-8
    /// are skipped and reading continues (line noise happens).
    fn collect_lines(&mut self, classifier: &dyn LineClassifier) -> Result<Vec<String>, PicologError> {
        let mut reader = BufReader::new(self.port.try_clone()?);
        let mut collected: Vec<String> = Vec::new();
        let mut raw = Vec::new();
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    debug!("read timeout, treating transfer as finished");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
            let line = match std::str::from_utf8(&raw) {
                Ok(s) => s.trim(),
                Err(_) => {
                    warn!("skipping undecodable line ({} bytes)", raw.len());
                    continue;
                }
            };
            if line.is_empty() {
                break;
            }
            match classifier.classify(line) {
                LineClass::Noise => debug!("dropping status line: {line}"),
                LineClass::Header => {
                    // anything before the header was leftover chatter
                    collected.clear();
                    collected.push(line.to_string());
                }
                LineClass::Data => collected.push(line.to_string()),
            }
        }
        Ok(collected)
    }
}

/// Runs the whole acquisition session: mount the SD card, dump the log file,
/// unmount, and persist the retained lines. Returns the number of lines
/// written.
pub fn fetch_log(config: &Config, classifier: &dyn LineClassifier) -> Result<usize, PicologError> {
    let mut session = SerialSession::open(config)?;

    info!("mounting SD card");
    session.command(CMD_MOUNT, config.mount_delay_ms)?;
    session.drain()?;

    info!("requesting file dump");
    session.command(CMD_DUMP, config.dump_delay_ms)?;
    let lines = session.collect_lines(classifier)?;

    info!("unmounting SD card");
    session.command(CMD_UNMOUNT, config.unmount_delay_ms)?;
    drop(session);

    if lines.is_empty() {
        return Err(PicologError::EmptyTransfer);
    }
    sample::write_lines(&config.destination_path, &lines)?;
    info!(
        "saved {} lines to {}",
        lines.len(),
        config.destination_path.display()
    );
    Ok(lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_banners_are_noise() {
        let classifier = PicoStatusClassifier;
        assert_eq!(
            classifier.classify("Conteúdo do arquivo adc_data1.csv:"),
            LineClass::Noise
        );
        assert_eq!(
            classifier.classify("Leitura do arquivo adc_data1.csv concluída."),
            LineClass::Noise
        );
        assert_eq!(
            classifier.classify("Escolha o comando:"),
            LineClass::Noise
        );
    }

    #[test]
    fn header_starts_the_data_block() {
        let classifier = PicoStatusClassifier;
        assert_eq!(
            classifier.classify("timestamp_us;ax;ay;az;gx;gy;gz;temp_raw"),
            LineClass::Header
        );
    }

    #[test]
    fn sample_rows_are_data() {
        let classifier = PicoStatusClassifier;
        assert_eq!(
            classifier.classify("123456;16384;-12;3;131;0;-7;512"),
            LineClass::Data
        );
    }
}
