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

//! Blocking client for the live flight-positions API.
//!
//! [`FlightFeed`] turns an observer position and search radius into one GET
//! request, maps the response into [`FlightRecord`]s, and returns them as a
//! [`FlightTable`]. It holds no state between calls. The HTTP layer sits
//! behind [`HttpTransport`] so tests can answer with canned responses.

use std::fmt;
use std::time::Duration;

use log::{debug, info};
use serde_json::Value;

use crate::error::{FeedError, NetworkError};
use crate::geo::{compute_bounding_box, distances_miles, BoundingBox, GeoPoint};
use crate::location::Locator;
use crate::record::{FlightRecord, FlightTable};

/// Default endpoint for full flight-position records.
pub const DEFAULT_BASE_URL: &str =
    "https://fr24api.flightradar24.com/api/live/flight-positions/full";

/// Default `Accept-Version` header value.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Altitude filter in feet, `min-max`.
pub const DEFAULT_ALTITUDE_RANGES: &str = "50-60000";

/// Passenger, cargo, military, business jet and turboprop categories.
pub const DEFAULT_CATEGORIES: &str = "P,C,M,J,T";

/// Settings for a [`FlightFeed`], passed explicitly at construction.
#[derive(Clone)]
pub struct FeedConfig {
    /// Endpoint URL without query string.
    pub base_url: String,
    /// Bearer token for the `Authorization` header.
    pub api_token: String,
    /// Value of the `Accept-Version` header.
    pub api_version: String,
    /// `altitude_ranges` query parameter.
    pub altitude_ranges: String,
    /// `categories` query parameter.
    pub categories: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl FeedConfig {
    /// Default settings with the given API token.
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            ..Default::default()
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            altitude_ranges: DEFAULT_ALTITUDE_RANGES.to_string(),
            categories: DEFAULT_CATEGORIES.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

// Keep the token out of logs
impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("altitude_ranges", &self.altitude_ranges)
            .field("categories", &self.categories)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A GET request as the transport sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Request with no query parameters and an `Accept: application/json` header.
    #[must_use]
    pub fn json(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
        }
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Header lookup, case-insensitive on the name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single blocking GET.
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status, and `Err` only when no response was received.
pub trait HttpTransport {
    fn get(&self, request: &ApiRequest) -> Result<ApiResponse, NetworkError>;
}

/// [`HttpTransport`] backed by `reqwest`'s blocking client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, request: &ApiRequest) -> Result<ApiResponse, NetworkError> {
        let mut builder = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(ApiResponse { status, body })
    }
}

/// Stateless fetcher for flights around an observer.
#[derive(Debug)]
pub struct FlightFeed<T = ReqwestTransport> {
    config: FeedConfig,
    transport: T,
}

impl FlightFeed<ReqwestTransport> {
    /// Create a feed that talks HTTP with the configured timeout.
    pub fn new(config: FeedConfig) -> Result<Self, NetworkError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self { config, transport })
    }
}

impl<T: HttpTransport> FlightFeed<T> {
    /// Create a feed over a caller-supplied transport.
    pub fn with_transport(config: FeedConfig, transport: T) -> Self {
        Self { config, transport }
    }

    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Build the API request for a bounding box.
    #[must_use]
    pub fn request_for(&self, bounds: &BoundingBox) -> ApiRequest {
        ApiRequest {
            url: self.config.base_url.clone(),
            query: vec![
                ("bounds".to_string(), bounds.to_query_value()),
                ("altitude_ranges".to_string(), self.config.altitude_ranges.clone()),
                ("categories".to_string(), self.config.categories.clone()),
            ],
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Accept-Version".to_string(), self.config.api_version.clone()),
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.config.api_token),
                ),
            ],
        }
    }

    /// Fetch flights within `radius_miles` of `observer`, nearest first.
    ///
    /// A non-2xx status, a transport failure, or a body without a `data`
    /// array fails the whole fetch. Individual malformed fields never do.
    pub fn fetch(&self, observer: GeoPoint, radius_miles: f64) -> Result<FlightTable, FeedError> {
        let bounds = compute_bounding_box(observer, radius_miles);
        let request = self.request_for(&bounds);
        debug!("Requesting flights in bounds {}", bounds.to_query_value());

        let response = self.transport.get(&request)?;
        if !response.is_success() {
            return Err(NetworkError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let mut records = parse_records(&response.body)?;
        let received = records.len();

        let positions: Vec<GeoPoint> = records.iter().map(|r| r.position).collect();
        for (record, distance) in records.iter_mut().zip(distances_miles(observer, &positions)) {
            record.distance_miles = distance;
        }

        let table = FlightTable::new(records);
        info!(
            "Fetched {} flights within {:.1} mi ({} shown)",
            received,
            radius_miles,
            table.len()
        );

        Ok(table)
    }

    /// Resolve the observer through `locator`, then [`Self::fetch`].
    ///
    /// Returns the observer position alongside the table.
    pub fn fetch_nearby<L: Locator + ?Sized>(
        &self,
        locator: &L,
        radius_miles: f64,
    ) -> Result<(GeoPoint, FlightTable), FeedError> {
        let observer = locator.locate()?;
        let table = self.fetch(observer, radius_miles)?;
        Ok((observer, table))
    }
}

/// Map a response body's `data` array into records.
pub fn parse_records(body: &str) -> Result<Vec<FlightRecord>, NetworkError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| NetworkError::InvalidBody(e.to_string()))?;

    let data = value
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| NetworkError::InvalidBody("missing `data` array".to_string()))?;

    Ok(data.iter().map(FlightRecord::from_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocationError;
    use crate::location::FixedLocator;
    use std::cell::RefCell;

    /// Degrees of latitude per statute mile on the haversine sphere.
    const DEG_PER_MILE: f64 = 0.014_473_2;

    const OBSERVER: GeoPoint = GeoPoint {
        latitude: 40.0,
        longitude: -74.0,
    };

    struct CannedTransport {
        response: Result<ApiResponse, NetworkError>,
        requests: RefCell<Vec<ApiRequest>>,
    }

    impl CannedTransport {
        fn ok(body: &str) -> Self {
            Self::status(200, body)
        }

        fn status(status: u16, body: &str) -> Self {
            Self {
                response: Ok(ApiResponse {
                    status,
                    body: body.to_string(),
                }),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                response: Err(NetworkError::Transport(reason.to_string())),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for CannedTransport {
        fn get(&self, request: &ApiRequest) -> Result<ApiResponse, NetworkError> {
            self.requests.borrow_mut().push(request.clone());
            match &self.response {
                Ok(response) => Ok(response.clone()),
                Err(NetworkError::Transport(reason)) => {
                    Err(NetworkError::Transport(reason.clone()))
                }
                Err(other) => Err(NetworkError::Transport(other.to_string())),
            }
        }
    }

    struct NoLocation;

    impl Locator for NoLocation {
        fn locate(&self) -> Result<GeoPoint, LocationError> {
            Err(LocationError::Unavailable(vec!["offline".to_string()]))
        }
    }

    fn flight(flight: &str, origin: &str, miles_north: f64) -> Value {
        serde_json::json!({
            "painted_as": "JBU",
            "flight": flight,
            "type": "A320",
            "orig_iata": origin,
            "dest_iata": "BOS",
            "alt": 8000,
            "lat": OBSERVER.latitude + miles_north * DEG_PER_MILE,
            "lon": OBSERVER.longitude,
            "track": 45
        })
    }

    fn body(rows: &[Value]) -> String {
        serde_json::json!({ "data": rows }).to_string()
    }

    fn feed(transport: CannedTransport) -> FlightFeed<CannedTransport> {
        FlightFeed::with_transport(FeedConfig::new("test-token"), transport)
    }

    #[test]
    fn test_fetch_excludes_record_missing_origin() {
        let feed = feed(CannedTransport::ok(&body(&[
            flight("B6101", "JFK", 2.0),
            flight("B6202", "", 1.0),
        ])));

        let table = feed.fetch(OBSERVER, 20.0).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.nearest().unwrap().flight, "B6101");
    }

    #[test]
    fn test_fetch_sorts_by_distance() {
        let feed = feed(CannedTransport::ok(&body(&[
            flight("B6FAR", "JFK", 3.2),
            flight("B6NEAR", "LGA", 1.1),
        ])));

        let table = feed.fetch(OBSERVER, 20.0).unwrap();
        let distances: Vec<f64> = table.iter().map(|r| r.distance_miles).collect();

        assert_eq!(distances.len(), 2);
        assert!((distances[0] - 1.1).abs() < 0.01, "{distances:?}");
        assert!((distances[1] - 3.2).abs() < 0.01, "{distances:?}");
        assert_eq!(table.get(0).unwrap().flight, "B6NEAR");
    }

    #[test]
    fn test_fetch_sends_bounds_filters_and_headers() {
        let feed = feed(CannedTransport::ok(&body(&[])));
        feed.fetch(OBSERVER, 20.0).unwrap();

        let requests = feed.transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];

        let expected_bounds = compute_bounding_box(OBSERVER, 20.0).to_query_value();
        assert_eq!(request.url, DEFAULT_BASE_URL);
        assert_eq!(request.query_value("bounds"), Some(expected_bounds.as_str()));
        assert_eq!(request.query_value("altitude_ranges"), Some("50-60000"));
        assert_eq!(request.query_value("categories"), Some("P,C,M,J,T"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("Accept-Version"), Some("v1"));
        assert_eq!(request.header("Authorization"), Some("Bearer test-token"));

        // north,south,west,east
        let edges: Vec<f64> = expected_bounds
            .split(',')
            .map(|s| s.parse().unwrap())
            .collect();
        assert!(edges[0] > edges[1]);
        assert!(edges[2] < -74.0 && edges[3] > -74.0);
    }

    #[test]
    fn test_fetch_http_500_is_an_error() {
        let feed = feed(CannedTransport::status(500, "internal error"));

        let err = feed.fetch(OBSERVER, 20.0).unwrap_err();

        assert_eq!(err.status(), Some(500));
        match err {
            FeedError::Network(NetworkError::Status { body, .. }) => {
                assert_eq!(body, "internal error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_transport_failure_is_an_error() {
        let feed = feed(CannedTransport::failing("connection refused"));

        let err = feed.fetch(OBSERVER, 20.0).unwrap_err();

        assert!(matches!(err, FeedError::Network(NetworkError::Transport(_))));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_fetch_body_without_data_is_an_error() {
        for bad in ["{\"message\": \"quota\"}", "not json", "{\"data\": 5}"] {
            let feed = feed(CannedTransport::ok(bad));
            let err = feed.fetch(OBSERVER, 20.0).unwrap_err();
            assert!(
                matches!(err, FeedError::Network(NetworkError::InvalidBody(_))),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn test_fetch_keeps_record_with_malformed_fields() {
        let mut row = flight("B6303", "JFK", 0.5);
        row["alt"] = Value::String("unknown".to_string());
        row["eta"] = Value::Bool(true);
        let feed = feed(CannedTransport::ok(&body(&[row])));

        let table = feed.fetch(OBSERVER, 20.0).unwrap();

        assert_eq!(table.len(), 1);
        let record = table.nearest().unwrap();
        assert_eq!(record.altitude_ft, None);
        assert_eq!(record.eta, None);
        assert!((record.distance_miles - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_fetch_nearby_uses_locator() {
        let feed = feed(CannedTransport::ok(&body(&[flight("B6404", "JFK", 1.0)])));
        let locator = FixedLocator::new(OBSERVER.latitude, OBSERVER.longitude).unwrap();

        let (observer, table) = feed.fetch_nearby(&locator, 20.0).unwrap();

        assert_eq!(observer, OBSERVER);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_fetch_nearby_location_failure_skips_request() {
        let feed = feed(CannedTransport::ok(&body(&[])));

        let err = feed.fetch_nearby(&NoLocation, 20.0).unwrap_err();

        assert!(matches!(err, FeedError::Location(_)));
        assert!(feed.transport.requests.borrow().is_empty());
    }

    #[test]
    fn test_feed_config_debug_redacts_token() {
        let rendered = format!("{:?}", FeedConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
