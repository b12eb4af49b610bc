use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    #[serde(default)]
    pub id: i64,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

impl Athlete {
    pub fn display_name(&self) -> String {
        match (&self.firstname, &self.lastname) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => format!("athlete {}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let athlete: Athlete =
            serde_json::from_str(r#"{"id": 42, "firstname": "Jo", "lastname": "Rider"}"#).unwrap();
        assert_eq!(athlete.display_name(), "Jo Rider");

        let anonymous: Athlete = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(anonymous.display_name(), "athlete 42");
    }
}
