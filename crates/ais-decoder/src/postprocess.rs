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

//! Cleanup passes run over interpreter output.
//!
//! Date and time components are collapsed into one composite field, and the
//! type 21 name extension is folded back into the name.

use chrono::NaiveDate;

use crate::catalog::{FieldKind, Formatter};
use crate::interpreter::DecodedField;
use crate::value::Value;

/// A run of consecutive fields replaced by one synthesized field.
struct FieldGroup {
    start: usize,
    names: &'static [&'static str],
    name: &'static str,
    legend: &'static str,
    combine: fn(&[u64]) -> String,
    scale: fn(&Value) -> String,
}

const FIELD_GROUPS: &[FieldGroup] = &[
    // Types 4 and 11.
    FieldGroup {
        start: 3,
        names: &["year", "month", "day", "hour", "minute", "second"],
        name: "time",
        legend: "Time",
        combine: timestamp,
        scale: scaled_timestamp,
    },
    // Type 5.
    FieldGroup {
        start: 13,
        names: &["month", "day", "hour", "minute"],
        name: "eta",
        legend: "Estimated Time of Arrival",
        combine: eta,
        scale: scaled_eta,
    },
];

fn timestamp(parts: &[u64]) -> String {
    match parts {
        [year, month, day, hour, minute, second] => {
            format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z")
        }
        _ => String::new(),
    }
}

fn eta(parts: &[u64]) -> String {
    match parts {
        [month, day, hour, minute] => format!("{month:02}-{day:02}T{hour:02}:{minute:02}Z"),
        _ => String::new(),
    }
}

/// Numeric components of a composite field, in order.
fn components(value: &Value) -> Vec<u32> {
    value
        .as_str()
        .unwrap_or_default()
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|part| part.parse().ok())
        .collect()
}

fn scaled_timestamp(value: &Value) -> String {
    let &[year, month, day, hour, minute, second] = components(value).as_slice() else {
        return value.to_string();
    };
    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map_or_else(
            || "n/a".to_string(),
            |time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}

fn scaled_eta(value: &Value) -> String {
    let &[month, day, hour, minute] = components(value).as_slice() else {
        return value.to_string();
    };
    let part = |n: u32, unavailable: u32| {
        if n == unavailable {
            "--".to_string()
        } else {
            format!("{n:02}")
        }
    };
    format!(
        "{}-{}T{}:{}Z",
        part(month, 0),
        part(day, 0),
        part(hour, 24),
        part(minute, 60)
    )
}

/// Apply every group whose names line up at its starting index.
fn collapse_groups(fields: &mut Vec<DecodedField>) {
    for group in FIELD_GROUPS {
        let end = group.start + group.names.len();
        let Some(span) = fields.get(group.start..end) else {
            continue;
        };
        if !span.iter().map(|f| f.name).eq(group.names.iter().copied()) {
            continue;
        }
        let parts: Vec<u64> = span.iter().filter_map(|f| f.value.as_u64()).collect();
        let composite = DecodedField {
            name: group.name,
            value: Value::Text((group.combine)(&parts)),
            kind: FieldKind::String,
            legend: group.legend,
            oob: None,
            formatter: Some(Formatter::Custom(group.scale)),
        };
        fields[group.start] = composite;
        fields.drain(group.start + 1..end);
    }
}

/// Fold the type 21 name extension onto the name.
fn stitch_names(fields: &mut Vec<DecodedField>) {
    if fields.first().and_then(|f| f.value.as_u64()) != Some(21) {
        return;
    }
    let Some(ext) = fields.iter().position(|f| f.name == "name_ext") else {
        return;
    };
    let extension = fields.remove(ext);
    if let (Some(name), Value::Text(tail)) = (
        fields.iter_mut().find(|f| f.name == "name"),
        extension.value,
    ) {
        if let Value::Text(head) = &mut name.value {
            head.push_str(&tail);
        }
    }
}

/// Run all passes over one message's fields.
#[must_use]
pub fn postprocess(mut fields: Vec<DecodedField>) -> Vec<DecodedField> {
    collapse_groups(&mut fields);
    stitch_names(&mut fields);
    fields
}
