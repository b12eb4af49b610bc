//! ridestats - yearly cycling stats from the Strava API.
//!
//! Three commands over one authenticated session:
//! - `recent`: print the most recent activities
//! - `yearly`: aggregate every ride into a per-year table
//! - `site`:   refresh the current year and publish data.json + index.html

mod api;
mod auth;
mod config;
mod models;
mod report;
mod stats;
mod utils;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, TimeZone, Utc};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use auth::{get_authenticated_session, AuthorizedSession};
use config::Config;
use stats::{aggregate_by_year, TimeField};
use utils::format_hms;

/// Number of activities shown by the `recent` command
const RECENT_LIMIT: usize = 10;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let command = std::env::args().nth(1);
    let command = match command.as_deref() {
        Some(c @ ("recent" | "yearly" | "site")) => c.to_string(),
        _ => {
            eprintln!("Usage: ridestats <recent|yearly|site>");
            eprintln!("  recent  - list the {} most recent activities", RECENT_LIMIT);
            eprintln!("  yearly  - print per-year ride totals");
            eprintln!("  site    - update data.json and index.html for the current year");
            std::process::exit(2);
        }
    };

    let config = Config::from_env()?;
    info!(command, "ridestats starting");

    let session = get_authenticated_session(&config).await?;
    info!(expires_at = session.credential.expires_at, "Session ready");

    match command.as_str() {
        "recent" => recent(&session).await,
        "yearly" => yearly(&session).await,
        _ => site(&session).await,
    }
}

/// Print the athlete name and their most recent activities.
async fn recent(session: &AuthorizedSession) -> Result<()> {
    let athlete = session.client.get_athlete().await?;
    println!("Authenticated as {}\n", athlete.display_name());

    let activities = session.client.list_activities(None, Some(RECENT_LIMIT)).await?;
    for activity in &activities {
        println!(
            "  {}  {:<15} {:>6.1} km  {:>9}  {}",
            activity.start_date_local.format("%Y-%m-%d"),
            activity.activity_type.as_deref().unwrap_or("Unknown"),
            activity.distance_km(),
            format_hms(activity.elapsed_time),
            activity.name
        );
    }
    Ok(())
}

/// Fetch the full activity history and print per-year ride totals.
async fn yearly(session: &AuthorizedSession) -> Result<()> {
    println!("Fetching all activities...");
    let activities = session.client.list_activities(None, None).await?;
    let years = aggregate_by_year(&activities, TimeField::Elapsed);

    let header = format!(
        "{:>6}  {:>7}  {:>12}  {:>12}  {:>12}",
        "Year", "Rides", "Time", "Distance", "Elevation"
    );
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));

    for (year, totals) in &years {
        println!(
            "{:>6}  {:>7}  {:>12}   {:>9.1} km  {:>9.0} m",
            year,
            totals.count,
            format_hms(totals.time),
            totals.distance,
            totals.elevation
        );
    }
    Ok(())
}

/// Re-fetch the current year's rides, fold them into the saved data, and
/// write out the static report.
async fn site(session: &AuthorizedSession) -> Result<()> {
    let current_year = Local::now().year();
    let after = Local
        .with_ymd_and_hms(current_year, 1, 1, 0, 0, 0)
        .single()
        .context("Failed to construct the start of the current year")?
        .with_timezone(&Utc);

    let mut saved = report::load_data(Path::new(report::DATA_FILE))?;

    println!("Fetching {} activities...", current_year);
    let activities = session.client.list_activities(Some(after), None).await?;

    let year_totals = aggregate_by_year(&activities, TimeField::Moving)
        .remove(&current_year)
        .unwrap_or_default();
    saved.insert(current_year, year_totals);

    report::save_data(Path::new(report::DATA_FILE), &saved)?;
    println!("Saved data to {}", report::DATA_FILE);

    std::fs::write(report::OUTPUT_FILE, report::render_html(&saved))
        .with_context(|| format!("Failed to write {}", report::OUTPUT_FILE))?;
    println!("Wrote {}", report::OUTPUT_FILE);
    Ok(())
}
