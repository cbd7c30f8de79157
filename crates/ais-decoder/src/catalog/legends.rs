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

//! Vocabulary tables and scaling formatters used by the catalog.

use crate::value::Value;

pub const NAV_STATUS: &[&str] = &[
    "Under way using engine",
    "At anchor",
    "Not under command",
    "Restricted manoeuverability",
    "Constrained by her draught",
    "Moored",
    "Aground",
    "Engaged in fishing",
    "Under way sailing",
    "Reserved for HSC",
    "Reserved for WIG",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Not defined",
];

pub const EPFD_TYPE: &[&str] = &[
    "Undefined",
    "GPS",
    "GLONASS",
    "Combined GPS/GLONASS",
    "Loran-C",
    "Chayka",
    "Integrated navigation system",
    "Surveyed",
    "Galileo",
];

const FUTURE: &str = "Reserved for future use";

pub const SHIP_TYPE: &[&str] = &[
    "Not available",
    FUTURE, FUTURE, FUTURE, FUTURE, FUTURE, FUTURE, FUTURE, FUTURE, FUTURE,
    FUTURE, FUTURE, FUTURE, FUTURE, FUTURE, FUTURE, FUTURE, FUTURE, FUTURE, FUTURE,
    "Wing in ground (WIG) - all ships of this type",
    "Wing in ground (WIG) - Hazardous category A",
    "Wing in ground (WIG) - Hazardous category B",
    "Wing in ground (WIG) - Hazardous category C",
    "Wing in ground (WIG) - Hazardous category D",
    "Wing in ground (WIG) - Reserved for future use",
    "Wing in ground (WIG) - Reserved for future use",
    "Wing in ground (WIG) - Reserved for future use",
    "Wing in ground (WIG) - Reserved for future use",
    "Wing in ground (WIG) - Reserved for future use",
    "Fishing",
    "Towing",
    "Towing: length exceeds 200m or breadth exceeds 25m",
    "Dredging or underwater ops",
    "Diving ops",
    "Military ops",
    "Sailing",
    "Pleasure Craft",
    "Reserved",
    "Reserved",
    "High speed craft (HSC) - all ships of this type",
    "High speed craft (HSC) - Hazardous category A",
    "High speed craft (HSC) - Hazardous category B",
    "High speed craft (HSC) - Hazardous category C",
    "High speed craft (HSC) - Hazardous category D",
    "High speed craft (HSC) - Reserved for future use",
    "High speed craft (HSC) - Reserved for future use",
    "High speed craft (HSC) - Reserved for future use",
    "High speed craft (HSC) - Reserved for future use",
    "High speed craft (HSC) - No additional information",
    "Pilot Vessel",
    "Search and Rescue vessel",
    "Tug",
    "Port Tender",
    "Anti-pollution equipment",
    "Law Enforcement",
    "Spare - Local Vessel",
    "Spare - Local Vessel",
    "Medical Transport",
    "Ship according to RR Resolution No. 18",
    "Passenger - all ships of this type",
    "Passenger - Hazardous category A",
    "Passenger - Hazardous category B",
    "Passenger - Hazardous category C",
    "Passenger - Hazardous category D",
    "Passenger - Reserved for future use",
    "Passenger - Reserved for future use",
    "Passenger - Reserved for future use",
    "Passenger - Reserved for future use",
    "Passenger - No additional information",
    "Cargo - all ships of this type",
    "Cargo - Hazardous category A",
    "Cargo - Hazardous category B",
    "Cargo - Hazardous category C",
    "Cargo - Hazardous category D",
    "Cargo - Reserved for future use",
    "Cargo - Reserved for future use",
    "Cargo - Reserved for future use",
    "Cargo - Reserved for future use",
    "Cargo - No additional information",
    "Tanker - all ships of this type",
    "Tanker - Hazardous category A",
    "Tanker - Hazardous category B",
    "Tanker - Hazardous category C",
    "Tanker - Hazardous category D",
    "Tanker - Reserved for future use",
    "Tanker - Reserved for future use",
    "Tanker - Reserved for future use",
    "Tanker - Reserved for future use",
    "Tanker - No additional information",
    "Other Type - all ships of this type",
    "Other Type - Hazardous category A",
    "Other Type - Hazardous category B",
    "Other Type - Hazardous category C",
    "Other Type - Hazardous category D",
    "Other Type - Reserved for future use",
    "Other Type - Reserved for future use",
    "Other Type - Reserved for future use",
    "Other Type - Reserved for future use",
    "Other Type - no additional information",
];

pub const AID_TYPE: &[&str] = &[
    "Unspecified",
    "Reference point",
    "RACON",
    "Fixed offshore structure",
    "Spare, Reserved for future use",
    "Light, without sectors",
    "Light, with sectors",
    "Leading Light Front",
    "Leading Light Rear",
    "Beacon, Cardinal N",
    "Beacon, Cardinal E",
    "Beacon, Cardinal S",
    "Beacon, Cardinal W",
    "Beacon, Port hand",
    "Beacon, Starboard hand",
    "Beacon, Preferred Channel port hand",
    "Beacon, Preferred Channel starboard hand",
    "Beacon, Isolated danger",
    "Beacon, Safe water",
    "Beacon, Special mark",
    "Cardinal Mark N",
    "Cardinal Mark E",
    "Cardinal Mark S",
    "Cardinal Mark W",
    "Port hand Mark",
    "Starboard hand Mark",
    "Preferred Channel Port hand",
    "Preferred Channel Starboard hand",
    "Isolated danger",
    "Safe Water",
    "Special Mark",
    "Light Vessel / LANBY / Rigs",
];

pub const STATION_TYPE: &[&str] = &[
    "All types of mobiles",
    "Reserved for future use",
    "All types of Class B mobile stations",
    "SAR airborne mobile station",
    "Aid to Navigation station",
    "Class B shipborne mobile station (IEC62287 only)",
    "Regional use and inland waterways",
    "Regional use and inland waterways",
    "Regional use and inland waterways",
    "Regional use and inland waterways",
    "Reserved for future use",
    "Reserved for future use",
    "Reserved for future use",
    "Reserved for future use",
    "Reserved for future use",
    "Reserved for future use",
];

fn integer(value: &Value) -> Option<i64> {
    value.as_i64()
}

/// Rate of turn: the transmitted value is `4.733 * sqrt(rot)` with sign.
pub fn rate_of_turn(value: &Value) -> String {
    match integer(value) {
        Some(-128) => "n/a".to_string(),
        Some(-127) => "fastleft".to_string(),
        Some(127) => "fastright".to_string(),
        Some(n) => {
            let rot = (n as f64 / 4.733).powi(2);
            format!("{:.1}", if n < 0 { -rot } else { rot })
        }
        None => value.to_string(),
    }
}

/// Position in 1/10000 minute.
pub fn latlon(value: &Value) -> String {
    integer(value).map_or_else(|| value.to_string(), |n| format!("{:.6}", n as f64 / 600_000.0))
}

/// Position in 1/10 minute, as carried by the shorter area fields.
pub fn short_latlon(value: &Value) -> String {
    integer(value).map_or_else(|| value.to_string(), |n| format!("{:.4}", n as f64 / 600.0))
}

/// Speed over ground in tenths of a knot.
pub fn speed(value: &Value) -> String {
    match integer(value) {
        Some(1023) => "n/a".to_string(),
        Some(1022) => "fast".to_string(),
        Some(n) => format!("{:.1}", n as f64 / 10.0),
        None => value.to_string(),
    }
}

/// Course over ground in tenths of a degree.
pub fn course(value: &Value) -> String {
    tenths(value)
}

/// Draught in tenths of a metre.
pub fn draught(value: &Value) -> String {
    tenths(value)
}

fn tenths(value: &Value) -> String {
    integer(value).map_or_else(|| value.to_string(), |n| format!("{:.1}", n as f64 / 10.0))
}

/// UTC second of the position report, with the reserved codes spelled out.
pub fn second(value: &Value) -> String {
    match integer(value) {
        Some(60) => "n/a".to_string(),
        Some(61) => "manual input".to_string(),
        Some(62) => "dead reckoning".to_string(),
        Some(63) => "inoperative".to_string(),
        _ => value.to_string(),
    }
}

/// SAR aircraft altitude in metres.
pub fn altitude(value: &Value) -> String {
    match integer(value) {
        Some(4095) => "n/a".to_string(),
        Some(4094) => ">=4094".to_string(),
        _ => value.to_string(),
    }
}
