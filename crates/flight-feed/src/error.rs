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

//! Error types for fetching flights and resolving the observer location.

use thiserror::Error;

/// Failure talking to the flight-position API.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The API answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response was not a JSON object with a `data` array.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        NetworkError::Transport(err.to_string())
    }
}

/// Failure resolving the observer's position.
#[derive(Debug, Error)]
pub enum LocationError {
    /// Every geolocation provider failed. One entry per provider.
    #[error("location unavailable: {}", .0.join("; "))]
    Unavailable(Vec<String>),

    #[error("coordinates out of range: {latitude}, {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Any failure that aborts a fetch cycle.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Location(#[from] LocationError),
}

impl FeedError {
    /// HTTP status of the failed request, when the API answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            FeedError::Network(NetworkError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
