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

//! Flight feed library for a nearest-flight dashboard.
//!
//! This library finds the aircraft around an observer and hands them back as
//! a table sorted by distance. It is organised in layers that can be used on
//! their own:
//!
//! - **Geo layer**: search-area bounding box and haversine distance
//! - **Record layer**: lenient mapping of API rows into [`FlightRecord`]s and
//!   the filtered, sorted [`FlightTable`]
//! - **Feed layer**: one blocking request per fetch, behind a swappable
//!   [`HttpTransport`]
//! - **Location layer**: IP geolocation or a fixed observer position
//!
//! # Quick Start
//!
//! ```no_run
//! use flight_feed::{FeedConfig, FlightFeed, IpLocator};
//! use std::time::Duration;
//!
//! let feed = FlightFeed::new(FeedConfig::new("my-api-token")).unwrap();
//! let locator = IpLocator::new(Duration::from_secs(5)).unwrap();
//!
//! match feed.fetch_nearby(&locator, 20.0) {
//!     Ok((_, table)) => {
//!         for flight in &table {
//!             println!("{} {:.2} mi", flight.flight, flight.distance_miles);
//!         }
//!     }
//!     Err(e) => eprintln!("fetch failed: {e}"),
//! }
//! ```
//!
//! # Geo Layer Only
//!
//! ```
//! use flight_feed::geo::{compute_bounding_box, distance_miles, GeoPoint};
//!
//! let home = GeoPoint::new(40.6892, -74.0445);
//! let bbox = compute_bounding_box(home, 20.0);
//! assert!(bbox.north > bbox.south);
//!
//! let miles = distance_miles(home, GeoPoint::new(40.7484, -73.9857));
//! assert!((miles - 5.0).abs() < 0.2);
//! ```

pub mod error;
pub mod feed;
pub mod geo;
pub mod location;
pub mod record;

pub use error::{FeedError, LocationError, NetworkError};
pub use feed::{ApiRequest, ApiResponse, FeedConfig, FlightFeed, HttpTransport, ReqwestTransport};
pub use geo::{compute_bounding_box, distance_miles, distances_miles, BoundingBox, GeoPoint};
pub use location::{FixedLocator, GeoProvider, IpLocator, Locator};
pub use record::{FlightRecord, FlightTable};
