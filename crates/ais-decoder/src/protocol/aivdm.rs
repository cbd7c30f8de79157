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

//! AIVDM/AIVDO sentence parser and fragment assembler.
//!
//! Sentence format:
//! ```text
//! !AIVDM,<count>,<number>,<seqid>,<channel>,<payload>,<pad>*<checksum>
//! ```
//!
//! Messages longer than one sentence are split into fragments sharing a
//! channel. Fragments are collected per channel until the last one arrives,
//! then the joined payload is de-armored into a [`BitVector`].

use std::collections::HashMap;

use log::debug;

use super::{checksum, DecodeError, Protocol};
use crate::bits::{is_armor_char, BitVector};

/// A complete message payload, ready for interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPayload {
    /// Line number of the final fragment.
    pub line: usize,
    /// Input text seen since the previous payload or diagnostic.
    pub raw: String,
    /// Payload bits with the pad removed.
    pub bits: BitVector,
}

/// Parsed fields of one sentence.
#[derive(Debug)]
struct Sentence<'a> {
    count: usize,
    number: usize,
    channel: char,
    payload: &'a str,
    pad: &'a str,
    computed: u8,
    transmitted: u8,
}

/// In-flight reassembly for one radio channel.
#[derive(Debug, Default)]
struct Assembly {
    payload: String,
    /// Next fragment number expected; 0 when idle.
    next: usize,
    count: usize,
    /// Continuation fragments of a message that already failed are dropped.
    discarding: bool,
}

impl Assembly {
    fn reset(&mut self) {
        self.payload.clear();
        self.next = 0;
        self.count = 0;
        self.discarding = false;
    }
}

/// Parser for AIVDM/AIVDO sentences with per-channel fragment reassembly.
#[derive(Debug, Default)]
pub struct AivdmParser {
    line: usize,
    raw: String,
    channels: HashMap<char, Assembly>,
}

impl AivdmParser {
    /// Create a parser with no fragments in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn malformed(&self, reason: impl Into<String>) -> DecodeError {
        DecodeError::MalformedSentence {
            line: self.line,
            reason: reason.into(),
        }
    }

    fn assemble(&mut self, text: &str) -> Result<Option<AssembledPayload>, DecodeError> {
        let sentence = self.split(text)?;
        let line = self.line;

        // Payload contents are only inspected once the checksum matches.
        if sentence.computed != sentence.transmitted {
            let state = self.channels.entry(sentence.channel).or_default();
            state.reset();
            state.discarding = sentence.number < sentence.count;
            return Err(DecodeError::Checksum {
                line,
                computed: sentence.computed,
                transmitted: sentence.transmitted,
            });
        }
        let pad = self.check_contents(&sentence)?;
        let state = self.channels.entry(sentence.channel).or_default();

        if sentence.number == 1 {
            state.reset();
            state.count = sentence.count;
        } else if state.discarding {
            debug!(
                "line {line}: dropping fragment {}/{} on channel {}",
                sentence.number, sentence.count, sentence.channel
            );
            if sentence.number >= sentence.count {
                state.reset();
            }
            self.raw.clear();
            return Ok(None);
        } else if sentence.number != state.next || sentence.count != state.count {
            let expected = state.next.max(1);
            state.reset();
            return Err(DecodeError::FragmentOrder {
                line,
                channel: sentence.channel,
                expected,
                received: sentence.number,
            });
        }

        state.payload.push_str(sentence.payload);
        if sentence.number < sentence.count {
            state.next = sentence.number + 1;
            debug!(
                "line {line}: holding fragment {}/{} on channel {}",
                sentence.number, sentence.count, sentence.channel
            );
            return Ok(None);
        }

        let mut bits = BitVector::from_sixbit(&state.payload);
        bits.trim_pad(pad);
        state.reset();
        Ok(Some(AssembledPayload {
            line,
            raw: std::mem::take(&mut self.raw),
            bits,
        }))
    }

    /// Check the framing of one sentence and pull out its fields.
    fn split<'a>(&self, text: &'a str) -> Result<Sentence<'a>, DecodeError> {
        let Some(body) = text.strip_prefix('!') else {
            return Err(self.malformed("sentence does not start with '!'"));
        };
        let Some((body, trailer)) = body.split_once('*') else {
            return Err(self.malformed("missing checksum delimiter"));
        };
        // Anything after the two checksum digits is receiver metadata.
        let transmitted = trailer
            .get(..2)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .ok_or_else(|| self.malformed("checksum is not two hex digits"))?;

        let fields: Vec<&str> = body.split(',').collect();
        let &[id, count, number, _seqid, channel, payload, pad] = fields.as_slice() else {
            return Err(self.malformed(format!("expected 7 fields, found {}", fields.len())));
        };

        let own_ship = match id.as_bytes() {
            [t1, t2, b'V', b'D', kind @ (b'M' | b'O')]
                if t1.is_ascii_uppercase() && t2.is_ascii_uppercase() =>
            {
                *kind == b'O'
            }
            _ => return Err(self.malformed(format!("unexpected sentence id '{id}'"))),
        };

        let count: usize = count
            .parse()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| self.malformed(format!("bad fragment count '{count}'")))?;
        let number: usize = number
            .parse()
            .ok()
            .filter(|&n| (1..=count).contains(&n))
            .ok_or_else(|| self.malformed(format!("bad fragment number '{number}'")))?;

        let channel = match channel {
            "1" => 'A',
            "2" => 'B',
            "" if own_ship => 'A',
            "" => return Err(self.malformed("missing channel")),
            c if c.len() == 1 && c.as_bytes()[0].is_ascii_uppercase() => char::from(c.as_bytes()[0]),
            c => return Err(self.malformed(format!("unknown channel '{c}'"))),
        };

        Ok(Sentence {
            count,
            number,
            channel,
            payload,
            pad,
            computed: checksum(body),
            transmitted,
        })
    }

    /// Validate the payload armor and pad count, returning the pad.
    fn check_contents(&self, sentence: &Sentence<'_>) -> Result<usize, DecodeError> {
        if let Some(bad) = sentence.payload.bytes().find(|&b| !is_armor_char(b)) {
            return Err(self.malformed(format!(
                "invalid armor character '{}'",
                char::from(bad)
            )));
        }
        sentence
            .pad
            .parse()
            .ok()
            .filter(|&p| p <= 5)
            .ok_or_else(|| self.malformed(format!("bad pad count '{}'", sentence.pad)))
    }
}

impl Protocol for AivdmParser {
    type Message = AssembledPayload;
    type Error = DecodeError;

    fn parse(&mut self, input: &[u8]) -> Result<Option<AssembledPayload>, DecodeError> {
        self.line += 1;
        let Ok(text) = std::str::from_utf8(input) else {
            self.raw.clear();
            return Err(self.malformed("invalid UTF-8"));
        };
        let text = text.trim_end_matches(['\r', '\n']);
        self.raw.push_str(text);
        self.raw.push('\n');

        if text.trim().is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let result = self.assemble(text);
        if result.is_err() {
            self.raw.clear();
        }
        result
    }
}
