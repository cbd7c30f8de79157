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

//! Table-driven decoder for AIS messages carried in AIVDM/AIVDO sentences.
//!
//! The crate is organised in layers that can be used on their own:
//!
//! - **Bits**: [`BitVector`], six-bit armor and MSB-first field extraction
//! - **Catalog**: per-message-type layouts expressed as constant tables of
//!   [`FieldSpec`] instructions
//! - **Interpreter**: one generic walker that turns a payload into
//!   [`DecodedField`]s by following a template
//! - **Protocol**: NMEA framing, checksums and fragment reassembly
//! - **Decoder**: ties the layers together over a line source
//!
//! # Quick Start
//!
//! ```
//! use ais_decoder::{Decoder, DecoderConfig};
//!
//! let input = "!AIVDM,1,1,,A,15RTgt0PAso;90TKcjM8h6g208CQ,0*4A\n";
//! for message in Decoder::new(input.as_bytes(), DecoderConfig::default()) {
//!     let message = message.expect("valid sentence");
//!     for field in &message.fields {
//!         println!("{}: {}", field.legend, field.render(true));
//!     }
//! }
//! ```
//!
//! # Push API
//!
//! Callers that receive lines one at a time (from a socket, say) use
//! [`MessageDecoder`] instead:
//!
//! ```
//! use ais_decoder::MessageDecoder;
//!
//! let mut decoder = MessageDecoder::default();
//! let first = "!AIVDM,2,1,1,A,55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp8,0*1C";
//! assert!(decoder.push_line(first).is_none());
//! let message = decoder.push_line("!AIVDM,2,2,1,A,88888888880,2*25").unwrap().unwrap();
//! assert_eq!(message.value("shipname").unwrap().as_str(), Some("EVER DIADEM"));
//! ```

pub mod bits;
pub mod catalog;
pub mod decoder;
pub mod interpreter;
pub mod postprocess;
pub mod protocol;
pub mod value;

pub use bits::BitVector;
pub use catalog::{FieldKind, FieldSpec, Formatter};
pub use decoder::{decode_payload, DecodeResult, Decoder, MessageDecoder};
pub use interpreter::DecodedField;
pub use protocol::{AivdmParser, DecodeError, Protocol};
pub use value::{DecodedValues, Value};

/// How decoding errors affect the rest of the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Report each error and carry on with the next sentence.
    #[default]
    Lenient,
    /// Stop at the first error.
    Strict,
}

/// Decoder configuration.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    pub mode: ErrorMode,
    /// Payloads are zero-extended to this many bits before interpretation.
    pub min_bits: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            mode: ErrorMode::Lenient,
            min_bits: 168,
        }
    }
}
