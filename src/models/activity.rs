use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Activity types counted as rides in the yearly aggregates
pub const RIDE_TYPES: [&str; 3] = ["Ride", "VirtualRide", "EBikeRide"];

/// A summary activity from `GET /athlete/activities`.
///
/// Distances are meters, times are seconds, elevation is meters - unit
/// conversion happens at aggregation/display time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub distance: f64,
    #[serde(rename = "moving_time", default)]
    pub moving_time: i64,
    #[serde(rename = "elapsed_time", default)]
    pub elapsed_time: i64,
    #[serde(rename = "total_elevation_gain", default)]
    pub total_elevation_gain: f64,
    /// Wall-clock start time at the activity's location. The API serves this
    /// with a Z suffix; the offset is not meaningful and only the local date
    /// components are used.
    #[serde(rename = "start_date_local")]
    pub start_date_local: DateTime<Utc>,
}

impl Activity {
    pub fn is_ride(&self) -> bool {
        self.activity_type
            .as_deref()
            .is_some_and(|t| RIDE_TYPES.contains(&t))
    }

    pub fn year(&self) -> i32 {
        self.start_date_local.year()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity_json(activity_type: &str) -> String {
        format!(
            r#"{{
                "id": 1,
                "name": "Morning Ride",
                "type": "{}",
                "distance": 25400.5,
                "moving_time": 3600,
                "elapsed_time": 3720,
                "total_elevation_gain": 310.0,
                "start_date_local": "2024-06-15T08:30:00Z"
            }}"#,
            activity_type
        )
    }

    #[test]
    fn test_parse_summary_activity() {
        let activity: Activity = serde_json::from_str(&activity_json("Ride")).unwrap();
        assert_eq!(activity.name, "Morning Ride");
        assert_eq!(activity.year(), 2024);
        assert!((activity.distance_km() - 25.4005).abs() < 1e-9);
        assert_eq!(activity.elapsed_time, 3720);
    }

    #[test]
    fn test_is_ride_covers_all_ride_types() {
        for t in RIDE_TYPES {
            let activity: Activity = serde_json::from_str(&activity_json(t)).unwrap();
            assert!(activity.is_ride(), "{} should count as a ride", t);
        }

        let run: Activity = serde_json::from_str(&activity_json("Run")).unwrap();
        assert!(!run.is_ride());
    }

    #[test]
    fn test_missing_type_is_not_a_ride() {
        let json = r#"{
            "name": "Unknown",
            "start_date_local": "2024-01-01T00:00:00Z"
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert!(!activity.is_ride());
        assert_eq!(activity.distance, 0.0);
        assert_eq!(activity.moving_time, 0);
    }
}
