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

//! Text for the flight card.
//!
//! Turns a [`FlightRecord`] into the strings the card shows. Kept free of UI
//! types so the terminal listing can reuse it.

use chrono::{DateTime, FixedOffset, Local, Utc};
use flight_feed::FlightRecord;

const ETA_FORMAT: &str = "%-I:%M %p";
const PLACEHOLDER: &str = "---";

/// Display strings for one flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub origin: String,
    pub destination: String,
    pub flight: String,
    pub airline: String,
    pub aircraft_type: String,
    pub altitude: String,
    pub eta: String,
    pub distance: String,
    /// Two-letter airline prefix of the flight number, for the logo lookup
    pub logo_code: Option<String>,
}

impl CardView {
    /// ETAs are shown at `eta_offset`, or in the local time zone when `None`
    pub fn from_record(record: &FlightRecord, eta_offset: Option<FixedOffset>) -> Self {
        Self {
            origin: or_placeholder(&record.origin),
            destination: or_placeholder(&record.destination),
            flight: record.flight.clone(),
            airline: record.airline.clone(),
            aircraft_type: or_placeholder(&record.aircraft_type),
            altitude: format_altitude(record.altitude_ft),
            eta: format_eta(record.eta, eta_offset),
            distance: format_distance(record.distance_miles),
            logo_code: logo_code(&record.flight),
        }
    }

    /// "EWR ▶ SFO"
    pub fn route(&self) -> String {
        format!("{} ▶ {}", self.origin, self.destination)
    }
}

fn or_placeholder(value: &str) -> String {
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

/// Group digits in threes: 35000 -> "35,000"
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn format_altitude(altitude_ft: Option<i32>) -> String {
    match altitude_ft {
        Some(feet) => format!("{}ft", format_thousands(i64::from(feet))),
        None => format!("{PLACEHOLDER}ft"),
    }
}

pub fn format_distance(miles: f64) -> String {
    if miles.is_finite() {
        format!("{miles:.2}mi")
    } else {
        format!("{PLACEHOLDER}mi")
    }
}

/// "ETA: 3:45 PM", hour without a leading zero
pub fn format_eta(eta: Option<DateTime<Utc>>, offset: Option<FixedOffset>) -> String {
    let Some(eta) = eta else {
        return "ETA: --:--".to_string();
    };

    let clock = match offset {
        Some(offset) => eta.with_timezone(&offset).format(ETA_FORMAT).to_string(),
        None => eta.with_timezone(&Local).format(ETA_FORMAT).to_string(),
    };
    format!("ETA: {clock}")
}

/// Airline prefix of a flight number ("UA123" -> "UA")
pub fn logo_code(flight: &str) -> Option<String> {
    let code: String = flight.chars().take(2).collect();
    (code.chars().count() == 2 && code.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| code.to_ascii_uppercase())
}

/// Fill the `%%` slot of a logo URL template
pub fn logo_url(template: &str, code: &str) -> String {
    template.replace("%%", code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flight_feed::GeoPoint;

    fn record() -> FlightRecord {
        FlightRecord {
            airline: "UAL".to_string(),
            flight: "UA1549".to_string(),
            aircraft_type: "A320".to_string(),
            origin: "LGA".to_string(),
            destination: "CLT".to_string(),
            altitude_ft: Some(2818),
            position: GeoPoint::new(40.77, -73.87),
            heading: Some(310.0),
            timestamp: None,
            eta: Some(Utc.with_ymd_and_hms(2025, 1, 15, 20, 5, 0).unwrap()),
            distance_miles: 3.14159,
        }
    }

    #[test]
    fn test_card_view_from_record() {
        let eastern = FixedOffset::west_opt(5 * 3600);
        let view = CardView::from_record(&record(), eastern);

        assert_eq!(view.route(), "LGA ▶ CLT");
        assert_eq!(view.flight, "UA1549");
        assert_eq!(view.aircraft_type, "A320");
        assert_eq!(view.altitude, "2,818ft");
        assert_eq!(view.eta, "ETA: 3:05 PM");
        assert_eq!(view.distance, "3.14mi");
        assert_eq!(view.logo_code.as_deref(), Some("UA"));
    }

    #[test]
    fn test_card_view_placeholders() {
        let mut record = record();
        record.destination.clear();
        record.aircraft_type.clear();
        record.altitude_ft = None;
        record.eta = None;
        record.distance_miles = f64::NAN;

        let view = CardView::from_record(&record, None);

        assert_eq!(view.route(), "LGA ▶ ---");
        assert_eq!(view.aircraft_type, "---");
        assert_eq!(view.altitude, "---ft");
        assert_eq!(view.eta, "ETA: --:--");
        assert_eq!(view.distance, "---mi");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(35000), "35,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-1200), "-1,200");
    }

    #[test]
    fn test_format_eta_morning_and_midnight() {
        let utc = FixedOffset::east_opt(0);
        let morning = Utc.with_ymd_and_hms(2025, 3, 1, 9, 7, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2025, 3, 1, 0, 30, 0).unwrap();

        assert_eq!(format_eta(Some(morning), utc), "ETA: 9:07 AM");
        assert_eq!(format_eta(Some(midnight), utc), "ETA: 12:30 AM");
    }

    #[test]
    fn test_logo_code_and_url() {
        assert_eq!(logo_code("dl42").as_deref(), Some("DL"));
        assert_eq!(logo_code("B6101").as_deref(), Some("B6"));
        assert_eq!(logo_code("U"), None);
        assert_eq!(logo_code(""), None);
        assert_eq!(logo_code("-1"), None);

        assert_eq!(
            logo_url(crate::config::DEFAULT_LOGO_URL_TEMPLATE, "B6"),
            "https://content.airhex.com/content/logos/airlines_B6_130_130_s.png"
        );
    }
}
