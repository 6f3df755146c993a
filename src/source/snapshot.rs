//! Shared types for telemetry snapshots.
//!
//! These types match the JSON tree pushed by the greenhouse backend: a
//! flat map of sensor/actuator keys to scalar values. Each delivery is a
//! full replacement of the current state, not a diff.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A complete snapshot of greenhouse state, keyed by sensor/actuator name.
pub type TelemetrySnapshot = BTreeMap<String, RawReading>;

/// A raw scalar as delivered by the feed.
///
/// Sensor channels publish numbers, digital channels publish the
/// `"LOW"`/`"HIGH"` sentinels (or booleans on some firmware), and a sensor
/// that has not reported yet may publish placeholder text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawReading {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl RawReading {
    /// Uppercased display form, matching how the feed's text sentinels
    /// are shown on gauges.
    pub fn display(&self) -> String {
        match self {
            RawReading::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", n)
                } else {
                    format!("{:.1}", n)
                }
            }
            RawReading::Flag(true) => "HIGH".to_string(),
            RawReading::Flag(false) => "LOW".to_string(),
            RawReading::Text(s) => s.to_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{
            "temperature": 24.5,
            "humidity": 65,
            "soilMoisture": "Loading...",
            "gasLevel": "LOW",
            "pir": true
        }"#;

        let snapshot: TelemetrySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.len(), 5);

        assert_eq!(
            snapshot.get("temperature"),
            Some(&RawReading::Number(24.5))
        );
        assert_eq!(snapshot.get("humidity"), Some(&RawReading::Number(65.0)));
        assert_eq!(
            snapshot.get("gasLevel"),
            Some(&RawReading::Text("LOW".to_string()))
        );
        assert_eq!(snapshot.get("pir"), Some(&RawReading::Flag(true)));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(RawReading::Number(65.0).display(), "65");
        assert_eq!(RawReading::Number(24.53).display(), "24.5");
        assert_eq!(RawReading::Flag(true).display(), "HIGH");
        assert_eq!(RawReading::Flag(false).display(), "LOW");
        assert_eq!(
            RawReading::Text("Loading...".to_string()).display(),
            "LOADING..."
        );
    }
}
