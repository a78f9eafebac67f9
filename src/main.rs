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

mod app;
mod card;
mod config;
mod display;
mod logo;

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eframe::egui;
use flight_feed::{FixedLocator, FlightFeed, IpLocator, Locator};
use log::{error, info};

use app::{CardApp, CardSettings};
use card::CardView;
use config::{AppConfig, API_TOKEN_ENV};

#[derive(Debug, Parser)]
#[command(name = "flights-overhead", version, about = "Shows the nearest flight overhead")]
struct Cli {
    /// Search radius in statute miles (overrides config)
    #[arg(long, global = true)]
    radius: Option<f64>,

    /// Observer latitude (skips IP geolocation)
    #[arg(long, global = true, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Observer longitude (skips IP geolocation)
    #[arg(long, global = true, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Open the flight card window (default)
    Card,
    /// Fetch once and print the flight table
    List,
    /// Print the configuration file path
    ConfigPath,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let command = cli.command.unwrap_or(Command::Card);

    if let Command::ConfigPath = command {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let config = AppConfig::load()?;
    let token = config.resolve_api_token().ok_or_else(|| {
        let path = AppConfig::get_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "the config file".to_string());
        format!("No flight API token: set {API_TOKEN_ENV} or api_token in {path}")
    })?;
    if let Some(source) = config.api_token_source() {
        info!("Using flight API token from {}", source);
    }

    let radius_miles = cli.radius.unwrap_or(config.radius_miles);
    if !(radius_miles.is_finite() && radius_miles > 0.0) {
        return Err(format!("Search radius must be positive, got {radius_miles}").into());
    }

    let feed = FlightFeed::new(config.feed_config(token))?;
    let locator = build_locator(cli, &config)?;

    match command {
        Command::List => list(&feed, locator.as_ref(), radius_miles, &config),
        Command::Card => run_card(CardSettings {
            feed,
            locator,
            radius_miles,
            refresh_interval: config.refresh_interval(),
            eta_offset: config.eta_offset(),
            logo_url_template: config.logo_url_template.clone(),
        }),
        Command::ConfigPath => Ok(()),
    }
}

/// Command-line coordinates win over the config override, then IP lookup
fn build_locator(cli: &Cli, config: &AppConfig) -> Result<Arc<dyn Locator + Send + Sync>, Box<dyn Error>> {
    if let Some((lat, lon)) = cli.lat.zip(cli.lon).or_else(|| config.observer_override()) {
        info!("Using fixed observer location: {}, {}", lat, lon);
        return Ok(Arc::new(FixedLocator::new(lat, lon)?));
    }

    info!("Using IP-based geolocation");
    Ok(Arc::new(IpLocator::new(config.request_timeout())?))
}

fn list(
    feed: &FlightFeed,
    locator: &(dyn Locator + Send + Sync),
    radius_miles: f64,
    config: &AppConfig,
) -> Result<(), Box<dyn Error>> {
    let (observer, table) = feed.fetch_nearby(locator, radius_miles)?;

    println!(
        "{} flights within {:.1} mi of {:.4}, {:.4}",
        table.len(),
        radius_miles,
        observer.latitude,
        observer.longitude
    );
    if table.is_empty() {
        return Ok(());
    }

    println!(
        "{:<8} {:<5} {:<5} {:<11} {:>9} {:>9} {:>14}",
        "FLIGHT", "AIRLN", "TYPE", "ROUTE", "ALT", "DIST", "ETA"
    );
    for record in &table {
        let view = CardView::from_record(record, config.eta_offset());
        println!(
            "{:<8} {:<5} {:<5} {:<11} {:>9} {:>9} {:>14}",
            view.flight,
            view.airline,
            view.aircraft_type,
            format!("{}-{}", view.origin, view.destination),
            view.altitude,
            view.distance,
            view.eta
        );
    }

    Ok(())
}

fn run_card(settings: CardSettings) -> Result<(), Box<dyn Error>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 420.0])
            .with_title("Flights Overhead"),
        ..Default::default()
    };

    info!("Opening flight card window");
    eframe::run_native(
        "Flights Overhead",
        options,
        Box::new(|cc| Ok(Box::new(CardApp::new(cc, settings)))),
    )?;

    Ok(())
}
