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

//! Decoded field values.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::bits::BitVector;

/// A single decoded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Text(String),
    /// Opaque application payload, realigned to bit 0.
    Bits(BitVector),
}

impl Value {
    /// The value as an unsigned integer, if it is a non-negative integer.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Unsigned(v) => Some(*v),
            Self::Signed(v) => u64::try_from(*v).ok(),
            Self::Text(_) | Self::Bits(_) => None,
        }
    }

    /// The value as a signed integer, if it is an integer that fits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Unsigned(v) => i64::try_from(*v).ok(),
            Self::Signed(v) => Some(*v),
            Self::Text(_) | Self::Bits(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Bits(bits) => write!(f, "{bits}"),
        }
    }
}

/// Values decoded so far in one message, keyed by field name.
///
/// Dispatch and conditional instructions consult this map to look back at
/// fields decoded earlier in the same message.
pub type DecodedValues = HashMap<&'static str, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversions() {
        assert_eq!(Value::Unsigned(5).as_i64(), Some(5));
        assert_eq!(Value::Signed(-5).as_u64(), None);
        assert_eq!(Value::Signed(7).as_u64(), Some(7));
        assert_eq!(Value::Text("X".to_string()).as_u64(), None);
        assert_eq!(Value::Unsigned(u64::MAX).as_i64(), None);
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(Value::Signed(-128).to_string(), "-128");
        assert_eq!(Value::Text("NEW YORK".to_string()).to_string(), "NEW YORK");
        let bits = BitVector::from_sixbit("1w");
        assert_eq!(
            serde_json::to_string(&Value::Bits(bits)).unwrap(),
            "\"12:07f0\""
        );
        assert_eq!(serde_json::to_string(&Value::Unsigned(3)).unwrap(), "3");
    }
}
