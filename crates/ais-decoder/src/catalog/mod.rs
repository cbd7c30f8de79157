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

//! Declarative field-instruction model and the AIS message catalog.
//!
//! Every message layout is a [`Template`]: a constant slice of
//! [`FieldSpec`] instructions interpreted by one generic walker (see
//! [`crate::interpreter`]). There are three kinds of instruction:
//!
//! - [`FieldSpec::Fixed`]: decode a field and surface it.
//! - [`FieldSpec::Spare`]: skip bits.
//! - [`FieldSpec::Dispatch`]: pick a sub-template using the value of a field
//!   decoded earlier, and continue there.
//!
//! Each instruction may carry a [`Condition`] that gates whether it is
//! interpreted at all, which is how optional mid-message fields (type 25's
//! destination MMSI, for instance) are expressed.

pub mod legends;
mod messages;

use std::fmt;

use serde::Serialize;

use crate::value::{DecodedValues, Value};

pub use messages::{expected_length, AIVDM};

/// An instruction table describing one message layout.
pub type Template = &'static [FieldSpec];

/// Guard deciding whether an instruction applies to this message.
pub type Condition = fn(&DecodedValues) -> bool;

/// Predicate accepting or rejecting a decoded value.
pub type Validator = fn(&Value) -> bool;

/// How the bits of a fixed field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Unsigned,
    Signed,
    /// Six-bit text; the width is a multiple of 6.
    String,
    /// Opaque remainder of the payload.
    Raw,
}

/// Hook turning a raw value into its human-readable form.
#[derive(Clone, Copy)]
pub enum Formatter {
    /// Index into a legend table; codes past the end use entry 0.
    Legend(&'static [&'static str]),
    /// Arbitrary rendering function.
    Custom(fn(&Value) -> String),
}

impl Formatter {
    /// Render `value` through this formatter.
    #[must_use]
    pub fn apply(&self, value: &Value) -> String {
        match self {
            Self::Legend(table) => {
                let entry = value
                    .as_u64()
                    .and_then(|code| usize::try_from(code).ok())
                    .and_then(|index| table.get(index))
                    .or_else(|| table.first());
                entry.map_or_else(|| value.to_string(), |s| (*s).to_string())
            }
            Self::Custom(format) => format(value),
        }
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legend(table) => write!(f, "Legend({} entries)", table.len()),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// A field that is decoded and surfaced in the output.
#[derive(Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub width: usize,
    pub kind: FieldKind,
    /// Out-of-band sentinel meaning "not available".
    pub oob: Option<i64>,
    pub legend: &'static str,
    pub validator: Option<Validator>,
    pub formatter: Option<Formatter>,
    pub when: Option<Condition>,
}

impl Field {
    const fn new(name: &'static str, width: usize, kind: FieldKind, legend: &'static str) -> Self {
        Self {
            name,
            width,
            kind,
            oob: None,
            legend,
            validator: None,
            formatter: None,
            when: None,
        }
    }

    #[must_use]
    pub const fn unsigned(name: &'static str, width: usize, legend: &'static str) -> Self {
        Self::new(name, width, FieldKind::Unsigned, legend)
    }

    #[must_use]
    pub const fn signed(name: &'static str, width: usize, legend: &'static str) -> Self {
        Self::new(name, width, FieldKind::Signed, legend)
    }

    #[must_use]
    pub const fn text(name: &'static str, width: usize, legend: &'static str) -> Self {
        Self::new(name, width, FieldKind::String, legend)
    }

    /// Raw field; `width` is the largest payload the message allows.
    #[must_use]
    pub const fn raw(name: &'static str, width: usize, legend: &'static str) -> Self {
        Self::new(name, width, FieldKind::Raw, legend)
    }

    #[must_use]
    pub const fn oob(mut self, sentinel: i64) -> Self {
        self.oob = Some(sentinel);
        self
    }

    #[must_use]
    pub const fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub const fn legends(mut self, table: &'static [&'static str]) -> Self {
        self.formatter = Some(Formatter::Legend(table));
        self
    }

    #[must_use]
    pub const fn format(mut self, format: fn(&Value) -> String) -> Self {
        self.formatter = Some(Formatter::Custom(format));
        self
    }

    #[must_use]
    pub const fn when(mut self, condition: Condition) -> Self {
        self.when = Some(condition);
        self
    }

    /// Wrap the field into an instruction.
    #[must_use]
    pub const fn spec(self) -> FieldSpec {
        FieldSpec::Fixed(self)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("kind", &self.kind)
            .field("oob", &self.oob)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

/// A fork on the value of an already decoded field.
#[derive(Clone, Copy)]
pub struct Dispatch {
    /// Name of the discriminant field.
    pub on: &'static str,
    /// Sub-templates by index; `None` marks a layout that is known but not
    /// supported.
    pub branches: &'static [Option<Template>],
    /// Maps the discriminant value onto a branch index.
    pub select: fn(&Value) -> Option<usize>,
    pub when: Option<Condition>,
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("on", &self.on)
            .field("branches", &self.branches.len())
            .finish_non_exhaustive()
    }
}

/// One instruction in a message template.
#[derive(Debug, Clone, Copy)]
pub enum FieldSpec {
    Fixed(Field),
    Spare {
        width: usize,
        when: Option<Condition>,
    },
    Dispatch(Dispatch),
}

impl FieldSpec {
    /// The guard attached to this instruction, if any.
    #[must_use]
    pub fn condition(&self) -> Option<Condition> {
        match self {
            Self::Fixed(field) => field.when,
            Self::Spare { when, .. } => *when,
            Self::Dispatch(dispatch) => dispatch.when,
        }
    }
}

/// Skip `width` bits.
#[must_use]
pub const fn spare(width: usize) -> FieldSpec {
    FieldSpec::Spare { width, when: None }
}

/// Branch on the integer value of `on`.
#[must_use]
pub const fn dispatch(on: &'static str, branches: &'static [Option<Template>]) -> FieldSpec {
    dispatch_with(on, branches, by_value)
}

/// Branch on `on` after passing its value through `select`.
#[must_use]
pub const fn dispatch_with(
    on: &'static str,
    branches: &'static [Option<Template>],
    select: fn(&Value) -> Option<usize>,
) -> FieldSpec {
    FieldSpec::Dispatch(Dispatch {
        on,
        branches,
        select,
        when: None,
    })
}

fn by_value(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|v| usize::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_formatter_falls_back_to_first_entry() {
        const TABLE: &[&str] = &["Undefined", "GPS", "GLONASS"];
        let formatter = Formatter::Legend(TABLE);
        assert_eq!(formatter.apply(&Value::Unsigned(1)), "GPS");
        assert_eq!(formatter.apply(&Value::Unsigned(15)), "Undefined");
        assert_eq!(formatter.apply(&Value::Signed(-1)), "Undefined");
    }

    #[test]
    fn test_field_builder() {
        let field = Field::signed("lon", 28, "Longitude").oob(0x679_1AC0);
        assert_eq!(field.kind, FieldKind::Signed);
        assert_eq!(field.oob, Some(0x679_1AC0));
        assert!(field.when.is_none());
        assert!(matches!(field.spec(), FieldSpec::Fixed(f) if f.name == "lon"));
    }

    #[test]
    fn test_dispatch_by_value() {
        assert_eq!(by_value(&Value::Unsigned(3)), Some(3));
        assert_eq!(by_value(&Value::Text("x".to_string())), None);
    }
}
