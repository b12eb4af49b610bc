//! Per-year aggregation of the activity feed.
//!
//! Rides (see `RIDE_TYPES`) are folded into one `YearTotals` bucket per
//! calendar year of their local start date. Non-ride activities are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Activity;

/// Which duration field of an activity is summed into the totals.
/// The yearly table reports elapsed time; the published site uses moving time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Elapsed,
    Moving,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearTotals {
    pub count: u32,
    /// Total ride time in seconds
    pub time: i64,
    /// Total distance in kilometers
    pub distance: f64,
    /// Total elevation gain in meters
    pub elevation: f64,
}

impl YearTotals {
    fn add(&mut self, activity: &Activity, time_field: TimeField) {
        self.count += 1;
        self.time += match time_field {
            TimeField::Elapsed => activity.elapsed_time,
            TimeField::Moving => activity.moving_time,
        };
        self.distance += activity.distance_km();
        self.elevation += activity.total_elevation_gain;
    }
}

/// Fold ride activities into per-year totals, keyed by calendar year in
/// ascending order.
pub fn aggregate_by_year(
    activities: &[Activity],
    time_field: TimeField,
) -> BTreeMap<i32, YearTotals> {
    let mut years: BTreeMap<i32, YearTotals> = BTreeMap::new();
    for activity in activities {
        if activity.is_ride() {
            years.entry(activity.year()).or_default().add(activity, time_field);
        }
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(activity_type: &str, date: &str, distance_m: f64, moving: i64, elapsed: i64, gain: f64) -> Activity {
        serde_json::from_str(&format!(
            r#"{{
                "name": "test",
                "type": "{}",
                "distance": {},
                "moving_time": {},
                "elapsed_time": {},
                "total_elevation_gain": {},
                "start_date_local": "{}"
            }}"#,
            activity_type, distance_m, moving, elapsed, gain, date
        ))
        .unwrap()
    }

    #[test]
    fn test_aggregate_splits_by_year_and_skips_non_rides() {
        let activities = vec![
            activity("Ride", "2023-04-01T10:00:00Z", 30000.0, 3600, 4000, 250.0),
            activity("VirtualRide", "2023-11-20T18:00:00Z", 20000.0, 2400, 2400, 0.0),
            activity("Run", "2023-05-05T07:00:00Z", 10000.0, 3000, 3100, 80.0),
            activity("EBikeRide", "2024-02-10T09:00:00Z", 40000.0, 5400, 6000, 500.0),
        ];

        let years = aggregate_by_year(&activities, TimeField::Elapsed);
        assert_eq!(years.len(), 2);

        let y2023 = years[&2023];
        assert_eq!(y2023.count, 2);
        assert_eq!(y2023.time, 4000 + 2400);
        assert!((y2023.distance - 50.0).abs() < 1e-9);
        assert!((y2023.elevation - 250.0).abs() < 1e-9);

        let y2024 = years[&2024];
        assert_eq!(y2024.count, 1);
        assert_eq!(y2024.time, 6000);
    }

    #[test]
    fn test_time_field_selects_moving_or_elapsed() {
        let activities = vec![activity("Ride", "2024-06-01T08:00:00Z", 1000.0, 100, 200, 0.0)];

        let moving = aggregate_by_year(&activities, TimeField::Moving);
        let elapsed = aggregate_by_year(&activities, TimeField::Elapsed);
        assert_eq!(moving[&2024].time, 100);
        assert_eq!(elapsed[&2024].time, 200);
    }

    #[test]
    fn test_years_iterate_in_ascending_order() {
        let activities = vec![
            activity("Ride", "2024-01-01T00:00:00Z", 1.0, 1, 1, 0.0),
            activity("Ride", "2021-01-01T00:00:00Z", 1.0, 1, 1, 0.0),
            activity("Ride", "2023-01-01T00:00:00Z", 1.0, 1, 1, 0.0),
        ];
        let years: Vec<i32> = aggregate_by_year(&activities, TimeField::Elapsed)
            .keys()
            .copied()
            .collect();
        assert_eq!(years, vec![2021, 2023, 2024]);
    }

    #[test]
    fn test_empty_feed_yields_empty_map() {
        assert!(aggregate_by_year(&[], TimeField::Elapsed).is_empty());
    }
}
