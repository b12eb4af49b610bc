//! REST API client module for Strava.
//!
//! This module provides the `StravaClient` for the OAuth token endpoint and
//! for fetching athlete and activity data with bearer token authentication.

pub mod client;
pub mod error;

pub use client::StravaClient;
pub use error::ApiError;
