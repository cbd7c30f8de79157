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

//! Sentence layer: NMEA 0183 framing and AIS fragment reassembly.
//!
//! The [`Protocol`] trait is the seam between line-oriented input and the
//! decoder. [`AivdmParser`] is the implementation for `!AIVDM`/`!AIVDO`
//! sentences.

mod aivdm;

pub use aivdm::{AivdmParser, AssembledPayload};

use thiserror::Error;

/// Errors raised while turning input lines into decoded messages.
///
/// Every variant except [`DecodeError::Io`] carries the 1-based input line
/// on which the problem was detected.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("line {line}: malformed sentence: {reason}")]
    MalformedSentence { line: usize, reason: String },

    #[error("line {line}: checksum mismatch, computed {computed:02X} but sentence carries {transmitted:02X}")]
    Checksum {
        line: usize,
        computed: u8,
        transmitted: u8,
    },

    #[error("line {line}: channel {channel} expected fragment {expected}, received {received}")]
    FragmentOrder {
        line: usize,
        channel: char,
        expected: usize,
        received: usize,
    },

    #[error("line {line}: invalid value for field '{field}': {value}")]
    FieldValidation {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: message type {msgtype} is not supported")]
    UnsupportedMessageType { line: usize, msgtype: u64 },

    #[error("line {line}: field '{field}' at bit {start} width {width} runs past the {available}-bit payload")]
    FieldOverrun {
        line: usize,
        field: &'static str,
        start: usize,
        width: usize,
        available: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Input line the error refers to, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedSentence { line, .. }
            | Self::Checksum { line, .. }
            | Self::FragmentOrder { line, .. }
            | Self::FieldValidation { line, .. }
            | Self::UnsupportedMessageType { line, .. }
            | Self::FieldOverrun { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }
}

/// Trait for line-oriented sentence parsers.
pub trait Protocol {
    /// The unit produced once enough input has been seen.
    type Message;
    /// The error type for parsing failures.
    type Error;

    /// Feed one line of input.
    ///
    /// Returns `Ok(Some(message))` when the line completes a message,
    /// `Ok(None)` if the line is valid but more input is needed (or the
    /// line carries nothing of interest), or `Err(error)` if parsing failed.
    fn parse(&mut self, input: &[u8]) -> Result<Option<Self::Message>, Self::Error>;
}

/// NMEA checksum: XOR of every byte between `!` and `*`.
#[must_use]
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |sum, b| sum ^ b)
}
