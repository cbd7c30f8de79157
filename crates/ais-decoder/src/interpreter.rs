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

//! Generic walker over catalog templates.
//!
//! [`interpret`] turns a payload [`BitVector`] into an ordered list of
//! [`DecodedField`]s by following the instructions of a [`Template`]. Values
//! are recorded by name as they are decoded so that later dispatch and
//! conditional instructions can refer back to them.

use std::borrow::Cow;

use serde::Serialize;

use crate::bits::{BitError, BitVector};
use crate::catalog::{Dispatch, Field, FieldKind, FieldSpec, Formatter, Template};
use crate::protocol::DecodeError;
use crate::value::{DecodedValues, Value};

/// One surfaced field of a decoded message.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedField {
    pub name: &'static str,
    pub value: Value,
    pub kind: FieldKind,
    pub legend: &'static str,
    #[serde(skip)]
    pub oob: Option<i64>,
    #[serde(skip)]
    pub formatter: Option<Formatter>,
}

impl DecodedField {
    /// Pair a decoded value with the static metadata of its field.
    #[must_use]
    pub fn new(field: &Field, value: Value) -> Self {
        Self {
            name: field.name,
            value,
            kind: field.kind,
            legend: field.legend,
            oob: field.oob,
            formatter: field.formatter,
        }
    }

    /// Whether the value equals the field's "not available" sentinel.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.oob
            .is_some_and(|sentinel| self.value.as_i64() == Some(sentinel))
    }

    /// Render the value, raw or scaled through the field's formatter.
    #[must_use]
    pub fn render(&self, scaled: bool) -> String {
        if !scaled {
            return self.value.to_string();
        }
        if self.is_unavailable() {
            return "n/a".to_string();
        }
        match &self.formatter {
            Some(formatter) => formatter.apply(&self.value),
            None => self.value.to_string(),
        }
    }
}

/// Interpret `template` over `data` starting at bit `offset`.
///
/// `line` is the input line reported in any error.
pub fn interpret(
    template: Template,
    data: &BitVector,
    offset: usize,
    values: &mut DecodedValues,
    line: usize,
) -> Result<Vec<DecodedField>, DecodeError> {
    let mut walker = Walker {
        data,
        line,
        values,
        fields: Vec::new(),
    };
    walker.walk(template, offset)?;
    Ok(walker.fields)
}

struct Walker<'a> {
    data: &'a BitVector,
    line: usize,
    values: &'a mut DecodedValues,
    fields: Vec<DecodedField>,
}

impl Walker<'_> {
    /// Returns the offset reached after the template.
    fn walk(&mut self, template: Template, mut offset: usize) -> Result<usize, DecodeError> {
        for spec in template {
            // Senders may leave trailing optional fields out entirely.
            if offset >= self.data.len() {
                break;
            }
            if let Some(condition) = spec.condition() {
                if !condition(self.values) {
                    continue;
                }
            }
            match spec {
                FieldSpec::Spare { width, .. } => offset += width,
                FieldSpec::Dispatch(dispatch) => offset = self.dispatch(dispatch, offset)?,
                FieldSpec::Fixed(field) => offset = self.fixed(field, offset)?,
            }
        }
        Ok(offset)
    }

    fn dispatch(&mut self, dispatch: &Dispatch, offset: usize) -> Result<usize, DecodeError> {
        let Some(value) = self.values.get(dispatch.on) else {
            return Err(DecodeError::FieldValidation {
                line: self.line,
                field: dispatch.on,
                value: "absent".to_string(),
            });
        };
        let branch = (dispatch.select)(value).and_then(|index| dispatch.branches.get(index));
        match branch {
            Some(Some(template)) => self.walk(template, offset),
            Some(None) => Err(DecodeError::UnsupportedMessageType {
                line: self.line,
                msgtype: value.as_u64().unwrap_or_default(),
            }),
            None => Err(DecodeError::FieldValidation {
                line: self.line,
                field: dispatch.on,
                value: value.to_string(),
            }),
        }
    }

    fn fixed(&mut self, field: &Field, offset: usize) -> Result<usize, DecodeError> {
        let value = match field.kind {
            FieldKind::Unsigned => Value::Unsigned(
                self.integer_bits(offset, field.width)
                    .extract_unsigned(offset, field.width)
                    .map_err(|e| self.overrun(field, e))?,
            ),
            FieldKind::Signed => Value::Signed(
                self.integer_bits(offset, field.width)
                    .extract_signed(offset, field.width)
                    .map_err(|e| self.overrun(field, e))?,
            ),
            FieldKind::String => Value::Text(self.data.extract_text(offset, field.width)),
            FieldKind::Raw => Value::Bits(self.data.sub_vector_from(offset)),
        };
        self.values.insert(field.name, value.clone());
        if let Some(validator) = field.validator {
            if !validator(&value) {
                return Err(DecodeError::FieldValidation {
                    line: self.line,
                    field: field.name,
                    value: value.to_string(),
                });
            }
        }
        self.fields.push(DecodedField::new(field, value));
        Ok(offset + field.width)
    }

    /// Bits to read an integer field from.
    ///
    /// A truncated payload may end partway through an integer field. The
    /// missing bits read as zero; the length check flags the message.
    fn integer_bits(&self, offset: usize, width: usize) -> Cow<'_, BitVector> {
        let end = offset + width;
        if end > self.data.len() {
            let mut extended = self.data.clone();
            extended.extend_to(end);
            Cow::Owned(extended)
        } else {
            Cow::Borrowed(self.data)
        }
    }

    fn overrun(&self, field: &Field, error: BitError) -> DecodeError {
        let (start, width) = match error {
            BitError::OutOfRange { start, width, .. } => (start, width),
            BitError::TooWide(width) => (0, width),
        };
        DecodeError::FieldOverrun {
            line: self.line,
            field: field.name,
            start,
            width,
            available: self.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{dispatch, spare};

    fn odd(value: &Value) -> bool {
        value.as_u64().is_some_and(|v| v % 2 == 1)
    }

    fn flagged(values: &DecodedValues) -> bool {
        values.get("flag").and_then(Value::as_u64) == Some(1)
    }

    const SMALL: Template = &[Field::unsigned("small", 4, "Small").spec()];
    const WIDE: Template = &[Field::signed("wide", 8, "Wide").oob(-128).spec()];
    const BRANCHES: &[Option<Template>] = &[Some(SMALL), Some(WIDE), None];

    const TEMPLATE: Template = &[
        Field::unsigned("kind", 2, "Kind").spec(),
        Field::unsigned("flag", 1, "Flag").spec(),
        Field::unsigned("maybe", 3, "Maybe").when(flagged).spec(),
        spare(2),
        dispatch("kind", BRANCHES),
        Field::unsigned("tail", 4, "Tail").spec(),
    ];

    fn vector(parts: &[(u64, usize)]) -> BitVector {
        let mut bits = BitVector::new();
        for &(value, width) in parts {
            bits.push_unsigned(value, width);
        }
        bits
    }

    fn names(fields: &[DecodedField]) -> Vec<&'static str> {
        fields.iter().map(|f| f.name).collect()
    }

    #[test]
    fn test_dispatch_selects_branch_and_continues() {
        let data = vector(&[(1, 2), (1, 1), (5, 3), (0, 2), (0x80, 8), (9, 4)]);
        let mut values = DecodedValues::new();
        let fields = interpret(TEMPLATE, &data, 0, &mut values, 1).unwrap();
        assert_eq!(names(&fields), ["kind", "flag", "maybe", "wide", "tail"]);
        assert_eq!(fields[3].value, Value::Signed(-128));
        assert!(fields[3].is_unavailable());
        assert_eq!(fields[4].value, Value::Unsigned(9));
    }

    #[test]
    fn test_condition_skips_without_consuming_bits() {
        let data = vector(&[(0, 2), (0, 1), (0, 2), (7, 4), (3, 4)]);
        let mut values = DecodedValues::new();
        let fields = interpret(TEMPLATE, &data, 0, &mut values, 1).unwrap();
        assert_eq!(names(&fields), ["kind", "flag", "small", "tail"]);
        assert_eq!(values["small"], Value::Unsigned(7));
        assert_eq!(values["tail"], Value::Unsigned(3));
    }

    #[test]
    fn test_stops_quietly_at_end_of_data() {
        let data = vector(&[(0, 2), (0, 1), (0, 2), (7, 4)]);
        let mut values = DecodedValues::new();
        let fields = interpret(TEMPLATE, &data, 0, &mut values, 1).unwrap();
        assert_eq!(names(&fields), ["kind", "flag", "small"]);
    }

    #[test]
    fn test_unsupported_branch() {
        let data = vector(&[(2, 2), (0, 1), (0, 2), (0, 8)]);
        let mut values = DecodedValues::new();
        let err = interpret(TEMPLATE, &data, 0, &mut values, 7).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnsupportedMessageType { line: 7, msgtype: 2 }
        ));
    }

    #[test]
    fn test_dispatch_index_out_of_range_is_validation_error() {
        let data = vector(&[(3, 2), (0, 1), (0, 2), (0, 8)]);
        let mut values = DecodedValues::new();
        let err = interpret(TEMPLATE, &data, 0, &mut values, 3).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::FieldValidation { line: 3, field: "kind", ref value } if value == "3"
        ));
    }

    #[test]
    fn test_validator_rejects_value() {
        const CHECKED: Template = &[Field::unsigned("odd", 4, "Odd").validate(odd).spec()];
        let data = vector(&[(4, 4)]);
        let mut values = DecodedValues::new();
        let err = interpret(CHECKED, &data, 0, &mut values, 2).unwrap_err();
        assert!(matches!(err, DecodeError::FieldValidation { field: "odd", .. }));
    }

    #[test]
    fn test_field_straddling_end_reads_zero_bits() {
        const LONG: Template = &[
            Field::unsigned("head", 4, "Head").spec(),
            Field::unsigned("body", 8, "Body").spec(),
            Field::unsigned("after", 4, "After").spec(),
        ];
        let data = vector(&[(1, 4), (3, 2)]);
        let mut values = DecodedValues::new();
        let fields = interpret(LONG, &data, 0, &mut values, 1).unwrap();
        assert_eq!(names(&fields), ["head", "body"]);
        assert_eq!(fields[1].value, Value::Unsigned(0b1100_0000));
        assert_eq!(data.len(), 6);
    }

    #[test]
    fn test_too_wide_field_is_overrun() {
        const HUGE: Template = &[Field::unsigned("huge", 72, "Huge").spec()];
        let data = vector(&[(0, 64), (0, 8)]);
        let mut values = DecodedValues::new();
        let err = interpret(HUGE, &data, 0, &mut values, 4).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::FieldOverrun { line: 4, field: "huge", width: 72, available: 72, .. }
        ));
    }

    #[test]
    fn test_raw_field_takes_remaining_bits() {
        const RAW: Template = &[
            Field::unsigned("head", 4, "Head").spec(),
            Field::raw("data", 64, "Data").spec(),
        ];
        let data = vector(&[(1, 4), (0xABC, 12)]);
        let mut values = DecodedValues::new();
        let fields = interpret(RAW, &data, 0, &mut values, 1).unwrap();
        assert_eq!(fields[1].value.to_string(), "12:abc0");
        assert_eq!(fields[1].kind, FieldKind::Raw);
    }

    #[test]
    fn test_render_scaled_and_raw() {
        let field = Field::unsigned("speed", 10, "Speed")
            .oob(1023)
            .format(crate::catalog::legends::speed);
        let available = DecodedField::new(&field, Value::Unsigned(123));
        let missing = DecodedField::new(&field, Value::Unsigned(1023));
        assert_eq!(available.render(false), "123");
        assert_eq!(available.render(true), "12.3");
        assert_eq!(missing.render(true), "n/a");
        assert_eq!(missing.render(false), "1023");
    }
}
