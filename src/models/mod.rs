//! Data models for Strava entities.
//!
//! This module contains the structures used to represent data returned by
//! the Strava API:
//!
//! - `Athlete`: the authenticated athlete's profile
//! - `Activity`: a summary activity from the athlete's feed

pub mod activity;
pub mod athlete;

pub use activity::{Activity, RIDE_TYPES};
pub use athlete::Athlete;
