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

//! Cycling through the flights of the current table.
//!
//! The window shows one flight at a time. [`DisplayCycle`] owns the table
//! from the last successful fetch and the index of the card on screen; once
//! every flight has been shown it asks for a fresh table. The feed itself
//! stays stateless.

use flight_feed::{FlightRecord, FlightTable};

/// Where the cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No table yet, or the last fetch returned no flights.
    Empty,
    /// Showing the flight at this index.
    Showing(usize),
    /// Every flight has been shown; the last one stays up until a new
    /// table arrives.
    Exhausted,
}

#[derive(Debug, Default)]
pub struct DisplayCycle {
    table: FlightTable,
    index: usize,
}

impl DisplayCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly fetched table and start from its nearest flight.
    pub fn replace(&mut self, table: FlightTable) {
        self.table = table;
        self.index = 0;
    }

    pub fn state(&self) -> CycleState {
        if self.table.is_empty() {
            CycleState::Empty
        } else if self.index < self.table.len() {
            CycleState::Showing(self.index)
        } else {
            CycleState::Exhausted
        }
    }

    /// Move to the next flight.
    pub fn advance(&mut self) -> CycleState {
        if self.index < self.table.len() {
            self.index += 1;
        }
        self.state()
    }

    /// Flight to put on the card.
    pub fn current(&self) -> Option<&FlightRecord> {
        match self.state() {
            CycleState::Empty => None,
            CycleState::Showing(index) => self.table.get(index),
            CycleState::Exhausted => self.table.records().last(),
        }
    }

    pub fn needs_refresh(&self) -> bool {
        !matches!(self.state(), CycleState::Showing(_))
    }

    /// One-based position and table length, for a "3 / 8" label.
    pub fn position(&self) -> Option<(usize, usize)> {
        let len = self.table.len();
        (len > 0).then(|| ((self.index + 1).min(len), len))
    }
}
