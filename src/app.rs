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

//! The card window.
//!
//! Shows one flight at a time in an LED-matrix styled card and advances to
//! the next flight every refresh interval. When the table runs out a worker
//! thread fetches a new one; the UI thread never blocks on the network.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::FixedOffset;
use eframe::egui;
use flight_feed::{FeedError, FlightFeed, FlightTable, Locator};
use log::{error, info, warn};

use crate::card::{logo_url, CardView};
use crate::display::DisplayCycle;
use crate::logo::{LogoState, LogoStore, LogoTextures, LOGO_SIZE};

// LED matrix palette
const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(24, 24, 37);
const CARD_BORDER: egui::Color32 = egui::Color32::from_rgb(34, 34, 34);
const LOGO_BOX: egui::Color32 = egui::Color32::from_rgb(17, 17, 17);
const ROUTE: egui::Color32 = egui::Color32::from_rgb(255, 250, 114);
const ROUTE_ARROW: egui::Color32 = egui::Color32::from_rgb(255, 59, 40);
const FLIGHT_NO: egui::Color32 = egui::Color32::from_rgb(56, 189, 248);
const AIRCRAFT_TYPE: egui::Color32 = egui::Color32::from_rgb(167, 139, 250);
const ALTITUDE: egui::Color32 = egui::Color32::from_rgb(56, 189, 248);
const ETA: egui::Color32 = egui::Color32::from_rgb(251, 191, 36);
const DISTANCE: egui::Color32 = egui::Color32::from_rgb(244, 114, 182);
const MUTED: egui::Color32 = egui::Color32::from_rgb(120, 120, 140);

const ROUTE_SIZE: f32 = 64.0;
const ROW_SIZE: f32 = 44.0;

/// Everything the window needs from startup
pub struct CardSettings {
    pub feed: FlightFeed,
    pub locator: Arc<dyn Locator + Send + Sync>,
    pub radius_miles: f64,
    pub refresh_interval: Duration,
    pub eta_offset: Option<FixedOffset>,
    pub logo_url_template: String,
}

type FetchResult = Result<FlightTable, FeedError>;

pub struct CardApp {
    feed: Arc<FlightFeed>,
    locator: Arc<dyn Locator + Send + Sync>,
    radius_miles: f64,
    refresh_interval: Duration,
    eta_offset: Option<FixedOffset>,
    logo_url_template: String,
    cycle: DisplayCycle,
    logos: Option<LogoTextures>,
    pending: Option<Receiver<FetchResult>>,
    last_advance: Instant,
    last_fetch_started: Option<Instant>,
    status: Option<String>,
}

impl CardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: CardSettings) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let logos = match LogoStore::new() {
            Ok(store) => Some(LogoTextures::new(store)),
            Err(e) => {
                warn!("Airline logos disabled: {}", e);
                None
            }
        };

        Self {
            feed: Arc::new(settings.feed),
            locator: settings.locator,
            radius_miles: settings.radius_miles,
            refresh_interval: settings.refresh_interval,
            eta_offset: settings.eta_offset,
            logo_url_template: settings.logo_url_template,
            cycle: DisplayCycle::new(),
            logos,
            pending: None,
            last_advance: Instant::now(),
            last_fetch_started: None,
            status: Some("Looking for flights…".to_string()),
        }
    }

    /// Start a fetch on a worker thread unless one is already running
    fn start_fetch(&mut self, ctx: &egui::Context) {
        if self.pending.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let feed = Arc::clone(&self.feed);
        let locator = Arc::clone(&self.locator);
        let radius_miles = self.radius_miles;
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let result = feed
                .fetch_nearby(locator.as_ref(), radius_miles)
                .map(|(_, table)| table);
            // The window may have closed while we were fetching
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        self.pending = Some(rx);
        self.last_fetch_started = Some(Instant::now());
    }

    /// Pick up a finished fetch, if any
    fn poll_fetch(&mut self) {
        let result = match &self.pending {
            Some(rx) => rx.try_recv(),
            None => return,
        };

        match result {
            Ok(Ok(table)) => {
                info!("Showing {} flights", table.len());
                self.status = table
                    .is_empty()
                    .then(|| "No flights overhead right now".to_string());
                self.cycle.replace(table);
                self.last_advance = Instant::now();
                self.pending = None;
            }
            Ok(Err(e)) => {
                error!("Flight fetch failed: {}", e);
                self.status = Some(format!("Fetch failed: {e}"));
                self.pending = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                error!("Flight fetch worker exited without a result");
                self.status = Some("Fetch failed: worker exited".to_string());
                self.pending = None;
            }
        }
    }

    /// Advance the card on the timer and refetch when the table runs out
    fn tick(&mut self, ctx: &egui::Context) {
        if self.last_advance.elapsed() >= self.refresh_interval {
            self.cycle.advance();
            self.last_advance = Instant::now();
        }

        let retry_due = self
            .last_fetch_started
            .map_or(true, |started| started.elapsed() >= self.refresh_interval);

        if self.cycle.needs_refresh() && self.pending.is_none() && retry_due {
            self.start_fetch(ctx);
        }
    }

    fn render_card(&self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let Some(record) = self.cycle.current() else {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 3.0);
                ui.label(egui::RichText::new("✈").size(ROUTE_SIZE).color(MUTED));
                if let Some(status) = &self.status {
                    ui.label(egui::RichText::new(status).size(18.0).color(MUTED));
                }
            });
            return;
        };

        let view = CardView::from_record(record, self.eta_offset);
        let logo = match (&self.logos, &view.logo_code) {
            (Some(logos), Some(code)) => logos.get_or_load(ctx, &logo_url(&self.logo_url_template, code)),
            _ => LogoState::Unavailable,
        };

        egui::Frame::window(&ctx.style())
            .fill(egui::Color32::BLACK)
            .stroke(egui::Stroke::new(4.0, CARD_BORDER))
            .corner_radius(20.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.add_space(16.0);

                ui.horizontal(|ui| {
                    ui.add_space(16.0);
                    render_logo(ui, &logo);
                    ui.add_space(24.0);

                    ui.vertical(|ui| {
                        ui.horizontal(|ui| {
                            ui.label(matrix_text(&view.origin, ROUTE_SIZE, ROUTE).strong());
                            ui.label(matrix_text("▶", ROUTE_SIZE, ROUTE_ARROW));
                            ui.label(matrix_text(&view.destination, ROUTE_SIZE, ROUTE).strong());
                        });
                        ui.add_space(12.0);
                        ui.horizontal(|ui| {
                            ui.label(matrix_text(&view.flight, ROW_SIZE, FLIGHT_NO));
                            ui.add_space(12.0);
                            ui.label(matrix_text(&view.aircraft_type, ROW_SIZE, AIRCRAFT_TYPE));
                        });
                    });
                });

                ui.add_space(28.0);

                ui.horizontal(|ui| {
                    ui.add_space(16.0);
                    ui.label(matrix_text(&view.altitude, ROW_SIZE, ALTITUDE));
                    ui.add_space(40.0);
                    ui.label(matrix_text(&view.eta, ROW_SIZE, ETA));
                    ui.add_space(40.0);
                    ui.label(matrix_text(&view.distance, ROW_SIZE, DISTANCE));
                });

                ui.add_space(16.0);
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if let Some((position, total)) = self.cycle.position() {
                ui.label(egui::RichText::new(format!("{position} / {total}")).size(12.0).color(MUTED));
            }
            if let Some(status) = &self.status {
                ui.label(egui::RichText::new(status).size(12.0).color(MUTED));
            }
        });
    }
}

fn matrix_text(text: &str, size: f32, color: egui::Color32) -> egui::RichText {
    egui::RichText::new(text).monospace().size(size).color(color)
}

fn render_logo(ui: &mut egui::Ui, logo: &LogoState) {
    #[allow(clippy::cast_precision_loss, reason = "logo box is a small constant")]
    let side = LOGO_SIZE as f32;

    egui::Frame::default()
        .fill(LOGO_BOX)
        .corner_radius(12.0)
        .show(ui, |ui| {
            ui.set_min_size(egui::vec2(side, side));
            ui.set_max_size(egui::vec2(side, side));
            ui.centered_and_justified(|ui| match logo {
                LogoState::Ready(texture) => {
                    let sized = egui::load::SizedTexture::new(texture.id(), egui::vec2(side, side));
                    ui.add(egui::Image::new(sized).fit_to_exact_size(egui::vec2(side, side)));
                }
                LogoState::Loading | LogoState::Unavailable => {
                    ui.label(egui::RichText::new("✈").size(72.0).color(ROUTE));
                }
            });
        });
}

impl eframe::App for CardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Repaint periodically so the timer keeps running without input
        ctx.request_repaint_after(Duration::from_millis(250));

        self.poll_fetch();
        self.tick(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(BACKGROUND))
            .show(ctx, |ui| {
                ui.add_space(12.0);
                self.render_card(ctx, ui);
            });
    }
}
