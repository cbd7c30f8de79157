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

//! Decode driver.
//!
//! [`MessageDecoder`] takes lines one at a time and is what push-style
//! callers (such as a network feed) use. [`Decoder`] wraps it in an
//! iterator over any [`BufRead`].

use std::io::BufRead;

use log::warn;
use serde::Serialize;

use crate::catalog::{expected_length, AIVDM};
use crate::interpreter::{interpret, DecodedField};
use crate::postprocess::postprocess;
use crate::protocol::{AivdmParser, AssembledPayload, DecodeError, Protocol};
use crate::value::{DecodedValues, Value};
use crate::{DecoderConfig, ErrorMode};

/// One decoded AIS message.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeResult {
    /// Line number of the sentence that completed the message.
    pub line: usize,
    /// Input text that made up the message.
    pub raw: String,
    pub fields: Vec<DecodedField>,
    /// Payload length in bits, before zero extension.
    pub bitlen: usize,
    /// The payload length is outside the range allowed for its type.
    pub is_malformed: bool,
}

impl DecodeResult {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&DecodedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.field(name).map(|f| &f.value)
    }

    #[must_use]
    pub fn msgtype(&self) -> Option<u64> {
        self.value("msgtype").and_then(Value::as_u64)
    }
}

/// Line-at-a-time decoder.
#[derive(Debug, Default)]
pub struct MessageDecoder {
    parser: AivdmParser,
    config: DecoderConfig,
    failed: bool,
}

impl MessageDecoder {
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            parser: AivdmParser::new(),
            config,
            failed: false,
        }
    }

    /// Whether a strict-mode error has ended decoding.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.failed
    }

    /// Feed one input line.
    ///
    /// Returns `None` while more fragments are needed, for comments, and
    /// for every line after a strict-mode failure.
    pub fn push_line(&mut self, line: &str) -> Option<Result<DecodeResult, DecodeError>> {
        self.push_bytes(line.as_bytes())
    }

    /// Feed one input line as raw bytes.
    ///
    /// A line that is not valid UTF-8 still counts towards line numbering
    /// and is reported as a malformed sentence.
    pub fn push_bytes(&mut self, line: &[u8]) -> Option<Result<DecodeResult, DecodeError>> {
        if self.failed {
            return None;
        }
        let decoded = match self.parser.parse(line) {
            Ok(None) => return None,
            Ok(Some(payload)) => decode_payload(payload, self.config.min_bits),
            Err(e) => Err(e),
        };
        Some(decoded.map_err(|e| self.report(e)))
    }

    /// Log an error and apply the error mode to it.
    fn report(&mut self, error: DecodeError) -> DecodeError {
        match self.config.mode {
            ErrorMode::Lenient => warn!("{error}"),
            ErrorMode::Strict => self.failed = true,
        }
        error
    }
}

/// Interpret one assembled payload.
///
/// The payload is zero-extended to `min_bits` before interpretation; the
/// length check is made against the original length.
pub fn decode_payload(payload: AssembledPayload, min_bits: usize) -> Result<DecodeResult, DecodeError> {
    let AssembledPayload { line, raw, mut bits } = payload;
    let bitlen = bits.len();
    bits.extend_to(min_bits);

    let mut values = DecodedValues::new();
    let fields = postprocess(interpret(AIVDM, &bits, 0, &mut values, line)?);

    let msgtype = values.get("msgtype").and_then(Value::as_u64).unwrap_or_default();
    let is_malformed = !expected_length(msgtype).is_some_and(|range| range.contains(&bitlen));
    if is_malformed {
        warn!("line {line}: type {msgtype} message has bad length {bitlen}");
    }

    Ok(DecodeResult {
        line,
        raw,
        fields,
        bitlen,
        is_malformed,
    })
}

/// Iterator of decoded messages over a line source.
///
/// In strict mode the first error is yielded and iteration then ends.
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    buf: Vec<u8>,
    inner: MessageDecoder,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R, config: DecoderConfig) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            inner: MessageDecoder::new(config),
        }
    }
}

impl<R: BufRead> Iterator for Decoder<R> {
    type Item = Result<DecodeResult, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.inner.is_finished() {
                return None;
            }
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    if let Some(item) = self.inner.push_bytes(&self.buf) {
                        return Some(item);
                    }
                }
                Err(e) => {
                    self.inner.failed = true;
                    return Some(Err(self.inner.report(DecodeError::Io(e))));
                }
            }
        }
    }
}
