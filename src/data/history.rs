//! Historical data tracking for sparklines and rate calculations.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use super::telemetry::TelemetryData;

/// Maximum number of historical samples to keep per metric.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks recent numeric readings for trending and sparklines.
///
/// Records each snapshot's numeric values to enable rate-of-change
/// calculations and visual trend indicators in the UI.
#[derive(Debug, Clone)]
pub struct History {
    /// Recent readings per metric key.
    pub metric_values: HashMap<String, VecDeque<f64>>,
    /// Timestamps of snapshots for rate calculations.
    pub timestamps: VecDeque<Instant>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            metric_values: HashMap::new(),
            timestamps: VecDeque::new(),
        }
    }

    /// Record a new snapshot's numeric readings.
    ///
    /// Non-numeric readings (sentinels, placeholders) are not recorded;
    /// a gap simply shortens that metric's sparkline.
    pub fn record(&mut self, data: &TelemetryData) {
        for metric in &data.metrics {
            let Some(value) = metric.value.as_numeric() else {
                continue;
            };
            let values = self.metric_values.entry(metric.key.clone()).or_default();
            values.push_back(value);
            if values.len() > MAX_HISTORY_SIZE {
                values.pop_front();
            }
        }

        self.timestamps.push_back(data.last_updated);
        if self.timestamps.len() > MAX_HISTORY_SIZE {
            self.timestamps.pop_front();
        }
    }

    /// Get sparkline data for a metric (normalized to 0-7 for 8 bar levels).
    ///
    /// Sensor readings are levels rather than counters, so the window is
    /// normalized over the values themselves, not their deltas. Returns an
    /// empty Vec if there's not enough history.
    pub fn get_sparkline(&self, key: &str) -> Vec<u8> {
        let Some(values) = self.metric_values.get(key) else {
            return Vec::new();
        };

        if values.len() < 2 {
            return Vec::new();
        }

        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        let range = (max - min).max(f64::EPSILON);

        values
            .iter()
            .map(|&v| {
                let normalized = ((v - min) / range * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }

    /// Get the rate of change (units per second) for a metric.
    ///
    /// Returns None if there's not enough history to calculate a rate.
    pub fn get_rate(&self, key: &str) -> Option<f64> {
        let values = self.metric_values.get(key)?;
        if values.len() < 2 || self.timestamps.len() < 2 {
            return None;
        }

        let current = *values.back()?;
        let previous = *values.get(values.len() - 2)?;

        let current_time = self.timestamps.back()?;
        let previous_time = self.timestamps.get(self.timestamps.len() - 2)?;
        let elapsed = current_time.duration_since(*previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some((current - previous) / elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TelemetrySnapshot;

    fn data_with_temperature(value: f64) -> TelemetryData {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot.insert(
            "temperature".to_string(),
            crate::source::RawReading::Number(value),
        );
        TelemetryData::from_snapshot(snapshot)
    }

    #[test]
    fn test_record_and_sparkline() {
        let mut history = History::new();
        for v in [10.0, 20.0, 30.0, 40.0] {
            history.record(&data_with_temperature(v));
        }

        let sparkline = history.get_sparkline("temperature");
        assert_eq!(sparkline.len(), 4);
        assert_eq!(sparkline[0], 0);
        assert_eq!(sparkline[3], 7);
    }

    #[test]
    fn test_sparkline_needs_two_samples() {
        let mut history = History::new();
        history.record(&data_with_temperature(20.0));
        assert!(history.get_sparkline("temperature").is_empty());
        assert!(history.get_sparkline("humidity").is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        for i in 0..100 {
            history.record(&data_with_temperature(i as f64));
        }
        assert_eq!(history.metric_values["temperature"].len(), MAX_HISTORY_SIZE);
        assert_eq!(history.timestamps.len(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_non_numeric_not_recorded() {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot.insert(
            "gasLevel".to_string(),
            crate::source::RawReading::Text("LOW".to_string()),
        );
        let mut history = History::new();
        history.record(&TelemetryData::from_snapshot(snapshot));
        assert!(history.metric_values.get("gasLevel").is_none());
    }

    #[test]
    fn test_rate_sign() {
        let mut history = History::new();
        history.record(&data_with_temperature(20.0));
        std::thread::sleep(std::time::Duration::from_millis(5));
        history.record(&data_with_temperature(25.0));

        let rate = history.get_rate("temperature").unwrap();
        assert!(rate > 0.0);
    }
}
