// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `aisdecode`: decode AIS messages from AIVDM/AIVDO sentence logs or a
//! live TCP feed.

mod config;
mod network;
mod report;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use ais_decoder::{Decoder, DecoderConfig, ErrorMode, MessageDecoder};
use clap::{ArgAction, Parser};
use log::{error, info, warn};

use config::{AppConfig, OutputFormat};
use network::{Feed, FeedConfig, FeedEvent, FeedState};
use report::{ReportOptions, Reporter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sentence log to decode; standard input when omitted
    file: Option<PathBuf>,

    /// Read sentences from a TCP feed (address from the config file when omitted)
    #[arg(long, value_name = "HOST:PORT", conflicts_with = "file")]
    tcp: Option<Option<String>>,

    /// Pipe-delimited values, one message per line
    #[arg(short = 'c', long)]
    dsv: bool,

    /// One `legend: value` line per field
    #[arg(short, long)]
    dump: bool,

    /// Count messages by type and print the totals at end of input
    #[arg(short = 'H', long)]
    histogram: bool,

    /// One JSON object per message
    #[arg(short, long)]
    json: bool,

    /// Print the raw text of messages with a bad payload length
    #[arg(short, long)]
    malformed: bool,

    /// Suppress the default dump report
    #[arg(short, long)]
    quiet: bool,

    /// Render values in engineering units
    #[arg(short, long)]
    scaled: bool,

    /// Only report these message types (comma-separated)
    #[arg(short, long, value_delimiter = ',', value_name = "LIST")]
    types: Vec<u64>,

    /// Echo raw sentences and raise the log level (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Stop at the first decoding error
    #[arg(short = 'x', long)]
    strict: bool,

    /// Store the effective settings as the new defaults and exit
    #[arg(long)]
    save_config: bool,
}

impl Args {
    fn format(&self, config: &AppConfig) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else if self.dsv {
            Some(OutputFormat::Dsv)
        } else if self.histogram {
            Some(OutputFormat::Histogram)
        } else if self.dump {
            Some(OutputFormat::Dump)
        } else if self.malformed || self.quiet {
            None
        } else {
            Some(config.output)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {e}. Using defaults.");
        AppConfig::default()
    });
    if let Ok(path) = AppConfig::get_config_path() {
        info!("Config file: {}", path.display());
    }

    let options = ReportOptions {
        format: args.format(&config),
        scaled: args.scaled || config.scaled,
        malformed: args.malformed || config.show_malformed,
        echo_raw: args.verbose > 0,
        types: args.types.clone(),
    };
    let decoder_config = DecoderConfig {
        mode: if args.strict || config.strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        },
        ..DecoderConfig::default()
    };

    if args.save_config {
        if let Some(format) = options.format {
            config.output = format;
        }
        config.scaled = options.scaled;
        config.strict = decoder_config.mode == ErrorMode::Strict;
        config.show_malformed = options.malformed;
        if let Some(Some(address)) = &args.tcp {
            config.feed_address.clone_from(address);
        }
        return match config.save() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Failed to save config: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let reporter = Reporter::new(io::stdout().lock(), options);
    let result = match &args.tcp {
        Some(address) => {
            let feed = FeedConfig {
                address: address.clone().unwrap_or_else(|| config.feed_address.clone()),
                reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
                ..FeedConfig::default()
            };
            run_feed(feed, decoder_config, reporter)
        }
        None => match open_input(args.file.as_ref()) {
            Ok(input) => run_stream(input, decoder_config, reporter),
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        // A closed pipe downstream (`aisdecode log | head`) is not an error.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn open_input(path: Option<&PathBuf>) -> io::Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    })
}

/// Decode a finite input. Returns whether it finished without a strict-mode
/// failure.
fn run_stream<R: BufRead, W: Write>(
    input: R,
    config: DecoderConfig,
    mut reporter: Reporter<W>,
) -> io::Result<bool> {
    let strict = config.mode == ErrorMode::Strict;
    let mut clean = true;
    for item in Decoder::new(input, config) {
        match item {
            Ok(message) => reporter.report(&message)?,
            Err(e) if strict => {
                error!("{e}");
                clean = false;
            }
            // Already logged by the decoder.
            Err(_) => {}
        }
    }
    reporter.finish()?;
    Ok(clean)
}

/// Decode a live feed until Ctrl-C or a strict-mode failure.
fn run_feed<W: Write>(
    feed_config: FeedConfig,
    config: DecoderConfig,
    mut reporter: Reporter<W>,
) -> io::Result<bool> {
    let runtime = tokio::runtime::Runtime::new()?;
    let clean = runtime.block_on(decode_feed(feed_config, config, &mut reporter));
    reporter.finish()?;
    clean
}

async fn decode_feed<W: Write>(
    feed_config: FeedConfig,
    config: DecoderConfig,
    reporter: &mut Reporter<W>,
) -> io::Result<bool> {
    let mut feed = Feed::spawn(feed_config);
    let mut decoder = MessageDecoder::new(config);

    loop {
        let event = tokio::select! {
            event = feed.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down feed");
                feed.shutdown();
                return Ok(true);
            }
        };
        match event {
            Some(FeedEvent::Line(bytes)) => {
                match decoder.push_bytes(&bytes) {
                    Some(Ok(message)) => reporter.report(&message)?,
                    Some(Err(e)) if decoder.is_finished() => {
                        error!("{e}");
                        feed.shutdown();
                        return Ok(false);
                    }
                    Some(Err(_)) | None => {}
                }
            }
            Some(FeedEvent::StateChanged(FeedState::Error(e))) => warn!("Feed error: {e}"),
            Some(FeedEvent::StateChanged(state)) => info!("Feed state: {state:?}"),
            None => return Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPE1: &str = "!AIVDM,1,1,,A,15RTgt0PAso;90TKcjM8h6g208CQ,0*4A\n";

    #[test]
    fn test_default_format_is_dump() {
        let args = Args::parse_from(["aisdecode"]);
        assert_eq!(args.format(&AppConfig::default()), Some(OutputFormat::Dump));
    }

    #[test]
    fn test_malformed_alone_suppresses_dump() {
        let args = Args::parse_from(["aisdecode", "-m"]);
        assert_eq!(args.format(&AppConfig::default()), None);
        let args = Args::parse_from(["aisdecode", "-m", "-j"]);
        assert_eq!(args.format(&AppConfig::default()), Some(OutputFormat::Json));
    }

    #[test]
    fn test_type_list_and_tcp_flag() {
        let args = Args::parse_from(["aisdecode", "-t", "1,5,24", "--tcp"]);
        assert_eq!(args.types, vec![1, 5, 24]);
        assert_eq!(args.tcp, Some(None));
        let args = Args::parse_from(["aisdecode", "--tcp", "ais.local:5631"]);
        assert_eq!(args.tcp, Some(Some("ais.local:5631".to_string())));
    }

    #[test]
    fn test_run_stream_strict_failure() {
        let input = format!("!AIVDM,1,1,,A,15RTgt0PAso;90TKcjM8h6g208CQ,0*4B\n{TYPE1}");
        let options = ReportOptions {
            format: Some(OutputFormat::Dsv),
            ..ReportOptions::default()
        };
        let config = DecoderConfig {
            mode: ErrorMode::Strict,
            ..DecoderConfig::default()
        };
        let reporter = Reporter::new(Vec::new(), options.clone());
        assert!(!run_stream(input.as_bytes(), config, reporter).unwrap());

        let reporter = Reporter::new(Vec::new(), options);
        assert!(run_stream(input.as_bytes(), DecoderConfig::default(), reporter).unwrap());
    }
}
