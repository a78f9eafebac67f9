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

//! Flight rows and the per-fetch flight table.
//!
//! Records are mapped leniently from the API's JSON: a missing or mistyped
//! field becomes an empty string, `None`, or a NaN position instead of
//! failing the whole fetch.

use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;

use crate::geo::GeoPoint;

/// One observed aircraft, created fresh on every fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    /// Airline code the aircraft is painted as (ICAO, e.g. "UAL").
    pub airline: String,
    /// Flight number (IATA, e.g. "UA123").
    pub flight: String,
    /// Aircraft type designator (e.g. "B738").
    pub aircraft_type: String,
    /// Origin airport IATA code.
    pub origin: String,
    /// Destination airport IATA code.
    pub destination: String,
    /// Barometric altitude in feet.
    pub altitude_ft: Option<i32>,
    /// Last reported position, [`GeoPoint::MISSING`] when absent.
    pub position: GeoPoint,
    /// Track angle in degrees (0-360, north = 0).
    pub heading: Option<f64>,
    /// Time of the position report.
    pub timestamp: Option<DateTime<Utc>>,
    /// Estimated arrival time.
    pub eta: Option<DateTime<Utc>>,
    /// Distance from the observer in statute miles. NaN without a position.
    pub distance_miles: f64,
}

impl FlightRecord {
    /// Map one element of the API's `data` array.
    ///
    /// `distance_miles` is left as NaN; the feed fills it in once the
    /// observer is known.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let position = match (number_field(value, "lat"), number_field(value, "lon")) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
            _ => GeoPoint::MISSING,
        };

        Self {
            airline: string_field(value, "painted_as"),
            flight: string_field(value, "flight"),
            aircraft_type: string_field(value, "type"),
            origin: string_field(value, "orig_iata"),
            destination: string_field(value, "dest_iata"),
            altitude_ft: number_field(value, "alt").and_then(feet),
            position,
            heading: number_field(value, "track"),
            timestamp: time_field(value, "timestamp"),
            eta: time_field(value, "eta"),
            distance_miles: f64::NAN,
        }
    }

    /// Rows without an airline, flight number, or origin are not shown.
    #[must_use]
    pub fn is_displayable(&self) -> bool {
        !self.airline.is_empty() && !self.flight.is_empty() && !self.origin.is_empty()
    }
}

fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            debug!("Ignoring non-string field {key}: {other}");
            String::new()
        }
    }
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    let parsed = match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        debug!("Ignoring non-numeric field {key}: {:?}", value.get(key));
    }
    parsed.filter(|n| n.is_finite())
}

fn time_field(value: &Value, key: &str) -> Option<DateTime<Utc>> {
    match value.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, reason = "altitudes are far inside i32")]
fn feet(value: f64) -> Option<i32> {
    (value.abs() < f64::from(i32::MAX)).then(|| value.round() as i32)
}

/// Flights from one fetch: displayable rows only, nearest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightTable {
    records: Vec<FlightRecord>,
}

impl FlightTable {
    /// Build a table, dropping rows that are not displayable and sorting the
    /// rest by ascending distance. Rows with a NaN distance sort last.
    #[must_use]
    pub fn new(records: Vec<FlightRecord>) -> Self {
        let mut records: Vec<FlightRecord> = records
            .into_iter()
            .filter(FlightRecord::is_displayable)
            .collect();
        records.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FlightRecord> {
        self.records.get(index)
    }

    /// The closest flight, if any.
    #[must_use]
    pub fn nearest(&self) -> Option<&FlightRecord> {
        self.records.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlightRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<FlightRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a FlightTable {
    type Item = &'a FlightRecord;
    type IntoIter = std::slice::Iter<'a, FlightRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
