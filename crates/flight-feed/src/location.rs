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

//! Observer location lookup.
//!
//! [`IpLocator`] resolves the network-visible position through public IP
//! geolocation services, trying each provider in turn. [`FixedLocator`]
//! stands in when the user has configured coordinates.

use std::time::Duration;

use log::{info, warn};
use serde_json::Value;

use crate::error::{LocationError, NetworkError};
use crate::feed::{ApiRequest, HttpTransport, ReqwestTransport};
use crate::geo::GeoPoint;

/// Source of the observer's position.
pub trait Locator {
    fn locate(&self) -> Result<GeoPoint, LocationError>;
}

/// Check that a coordinate pair is usable as an observer position.
pub fn validate_point(latitude: f64, longitude: f64) -> Result<GeoPoint, LocationError> {
    let point = GeoPoint::new(latitude, longitude);
    if point.is_valid() {
        Ok(point)
    } else {
        Err(LocationError::OutOfRange {
            latitude,
            longitude,
        })
    }
}

/// Always answers with the same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocator {
    point: GeoPoint,
}

impl FixedLocator {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        Ok(Self {
            point: validate_point(latitude, longitude)?,
        })
    }
}

impl Locator for FixedLocator {
    fn locate(&self) -> Result<GeoPoint, LocationError> {
        Ok(self.point)
    }
}

/// An IP geolocation endpoint and the JSON keys holding its coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoProvider {
    pub name: String,
    pub url: String,
    pub latitude_key: String,
    pub longitude_key: String,
}

impl GeoProvider {
    /// ipapi.co, HTTPS, no key required for light use.
    #[must_use]
    pub fn ipapi() -> Self {
        Self {
            name: "ipapi.co".to_string(),
            url: "https://ipapi.co/json/".to_string(),
            latitude_key: "latitude".to_string(),
            longitude_key: "longitude".to_string(),
        }
    }

    /// ip-api.com, plain HTTP only on the free tier.
    #[must_use]
    pub fn ip_api() -> Self {
        Self {
            name: "ip-api.com".to_string(),
            url: "http://ip-api.com/json/".to_string(),
            latitude_key: "lat".to_string(),
            longitude_key: "lon".to_string(),
        }
    }
}

/// Locates the observer from its public IP address.
#[derive(Debug)]
pub struct IpLocator<T = ReqwestTransport> {
    transport: T,
    providers: Vec<GeoProvider>,
}

impl IpLocator<ReqwestTransport> {
    /// Locator over HTTP with the default providers.
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        Ok(Self::with_transport(ReqwestTransport::new(timeout)?))
    }
}

impl<T: HttpTransport> IpLocator<T> {
    pub fn with_transport(transport: T) -> Self {
        Self::with_providers(transport, vec![GeoProvider::ipapi(), GeoProvider::ip_api()])
    }

    pub fn with_providers(transport: T, providers: Vec<GeoProvider>) -> Self {
        Self {
            transport,
            providers,
        }
    }

    fn query(&self, provider: &GeoProvider) -> Result<GeoPoint, String> {
        let response = self
            .transport
            .get(&ApiRequest::json(provider.url.as_str()))
            .map_err(|e| e.to_string())?;

        if !response.is_success() {
            return Err(format!("HTTP {}", response.status));
        }

        let value: Value = serde_json::from_str(&response.body).map_err(|e| e.to_string())?;
        let coordinate = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_f64)
                .ok_or_else(|| format!("missing `{key}`"))
        };

        let latitude = coordinate(provider.latitude_key.as_str())?;
        let longitude = coordinate(provider.longitude_key.as_str())?;

        validate_point(latitude, longitude).map_err(|e| e.to_string())
    }
}

impl<T: HttpTransport> Locator for IpLocator<T> {
    fn locate(&self) -> Result<GeoPoint, LocationError> {
        let mut failures = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match self.query(provider) {
                Ok(point) => {
                    info!(
                        "Location found via {}: {}, {}",
                        provider.name, point.latitude, point.longitude
                    );
                    return Ok(point);
                }
                Err(reason) => {
                    warn!("Geolocation via {} failed: {}", provider.name, reason);
                    failures.push(format!("{}: {}", provider.name, reason));
                }
            }
        }

        Err(LocationError::Unavailable(failures))
    }
}
