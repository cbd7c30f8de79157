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

//! Report rendering for decoded messages.

use std::collections::BTreeMap;
use std::io::{self, Write};

use ais_decoder::DecodeResult;
use csv::WriterBuilder;

use crate::config::OutputFormat;

/// What to print and how.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// `None` prints nothing for well-formed messages.
    pub format: Option<OutputFormat>,
    pub scaled: bool,
    /// Print the raw text of messages with a bad payload length.
    pub malformed: bool,
    /// Echo the raw text of every selected message before its report.
    pub echo_raw: bool,
    /// Only report these message types. Empty selects all.
    pub types: Vec<u64>,
}

/// Writes reports for a stream of decoded messages.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    options: ReportOptions,
    frequencies: BTreeMap<u64, usize>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, options: ReportOptions) -> Self {
        Self {
            out,
            options,
            frequencies: BTreeMap::new(),
        }
    }

    /// Report one message.
    pub fn report(&mut self, message: &DecodeResult) -> io::Result<()> {
        let msgtype = message.msgtype().unwrap_or_default();
        if !self.options.types.is_empty() && !self.options.types.contains(&msgtype) {
            return Ok(());
        }
        if self.options.echo_raw {
            write!(self.out, "{}", message.raw)?;
        }

        if message.is_malformed {
            if self.options.malformed {
                write!(self.out, "{}", message.raw)?;
            }
        } else {
            match self.options.format {
                Some(OutputFormat::Dump) => self.dump(message)?,
                Some(OutputFormat::Dsv) => self.dsv(message)?,
                Some(OutputFormat::Json) => self.json(message)?,
                Some(OutputFormat::Histogram) => {
                    *self.frequencies.entry(msgtype).or_default() += 1;
                }
                None => {}
            }
        }
        self.out.flush()
    }

    /// Print end-of-input summaries and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.options.format == Some(OutputFormat::Histogram) {
            for (msgtype, count) in &self.frequencies {
                writeln!(self.out, "{msgtype}\t{count}")?;
            }
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn dump(&mut self, message: &DecodeResult) -> io::Result<()> {
        for field in &message.fields {
            writeln!(
                self.out,
                "{:<25}: {}",
                field.legend,
                field.render(self.options.scaled)
            )?;
        }
        writeln!(self.out, "%%")
    }

    fn dsv(&mut self, message: &DecodeResult) -> io::Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .from_writer(&mut self.out);
        writer.write_record(
            message
                .fields
                .iter()
                .map(|f| f.render(self.options.scaled)),
        )?;
        writer.flush()
    }

    fn json(&mut self, message: &DecodeResult) -> io::Result<()> {
        let mut object = serde_json::Map::new();
        for field in &message.fields {
            let value = if self.options.scaled {
                serde_json::Value::String(field.render(true))
            } else {
                serde_json::to_value(&field.value)?
            };
            object.insert(field.name.to_string(), value);
        }
        serde_json::to_writer(&mut self.out, &object)?;
        writeln!(self.out)
    }
}
