//! Telemetry snapshot processing.
//!
//! This module transforms raw telemetry snapshots into display-ready data:
//! each known sensor key is parsed, classified into a severity tier, and
//! the care assessment is derived from the numeric care readings.

use std::time::Instant;

use super::care::{self, CareAssessment, CareReadings};
use super::classify::{classify, Classification, SensorCategory, SensorValue, SeverityTier};
use crate::source::{RawReading, TelemetrySnapshot};

/// Key the feed uses for the automatic/manual actuator mode flag.
const AUTO_MODE_KEY: &str = "autoMode";

/// The known sensor channels: feed key, display label, threshold category.
///
/// Keys not listed here are actuator state or record subtrees, not gauges,
/// and are skipped during processing.
const METRICS: &[(&str, &str, SensorCategory)] = &[
    ("temperature", "Temperature", SensorCategory::Percentage),
    ("humidity", "Humidity", SensorCategory::Percentage),
    ("soilMoisture", "Soil Moisture", SensorCategory::Percentage),
    ("gasLevel", "Gas Level", SensorCategory::Percentage),
    ("brightness", "Brightness", SensorCategory::Percentage),
    ("current", "Current", SensorCategory::Percentage),
    ("fanSpeed", "Fan Speed", SensorCategory::Percentage),
    ("speed", "Speed", SensorCategory::Percentage),
    ("solarPower", "Solar Power", SensorCategory::Energy),
    ("energyConsumption", "Energy Use", SensorCategory::Energy),
    ("costSavings", "Cost Savings", SensorCategory::Energy),
    ("ldr", "Light Sensor", SensorCategory::Binary),
    ("pir", "Motion", SensorCategory::Binary),
    ("rain", "Rain", SensorCategory::Binary),
];

/// Look up the threshold category for a feed key.
pub fn category_for(key: &str) -> Option<SensorCategory> {
    METRICS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, _, c)| *c)
}

/// A single processed metric ready for display.
#[derive(Debug, Clone)]
pub struct MetricData {
    /// The feed key (e.g. "soilMoisture").
    pub key: String,
    /// Human-readable label (e.g. "Soil Moisture").
    pub label: String,
    /// The parsed value.
    pub value: SensorValue,
    /// Raw display text, uppercased like the gauge captions.
    pub display: String,
    pub category: SensorCategory,
    pub classification: Classification,
}

/// Complete processed telemetry ready for display.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub metrics: Vec<MetricData>,
    pub care: CareAssessment,
    /// Actuator auto/manual mode, when the feed reports it.
    pub auto_mode: Option<bool>,
    pub last_updated: Instant,
}

impl TelemetryData {
    /// Convert a raw snapshot into processed telemetry.
    ///
    /// Each delivery replaces the prior reading set wholesale. Known keys
    /// are parsed and classified; sensors absent from the snapshot simply
    /// produce no metric row.
    pub fn from_snapshot(snapshot: TelemetrySnapshot) -> Self {
        let mut metrics: Vec<MetricData> = METRICS
            .iter()
            .filter_map(|(key, label, category)| {
                let raw = snapshot.get(*key)?;
                let value = parse_reading(raw);
                Some(MetricData {
                    key: (*key).to_string(),
                    label: (*label).to_string(),
                    value,
                    display: raw.display(),
                    category: *category,
                    classification: classify(value, *category),
                })
            })
            .collect();

        // Sort by tier (critical first), then by label
        metrics.sort_by(|a, b| {
            b.classification
                .tier
                .cmp(&a.classification.tier)
                .then_with(|| a.label.cmp(&b.label))
        });

        let care = care::evaluate(&CareReadings {
            temperature: numeric_reading(&snapshot, "temperature"),
            humidity: numeric_reading(&snapshot, "humidity"),
            soil_moisture: numeric_reading(&snapshot, "soilMoisture"),
        });

        let auto_mode = match snapshot.get(AUTO_MODE_KEY) {
            Some(RawReading::Flag(b)) => Some(*b),
            _ => None,
        };

        Self {
            metrics,
            care,
            auto_mode,
            last_updated: Instant::now(),
        }
    }

    /// Parse processed telemetry from a JSON string.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let snapshot: TelemetrySnapshot = serde_json::from_str(content)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Metrics in warning or critical state, worst first.
    pub fn attention_metrics(&self) -> Vec<&MetricData> {
        let mut result: Vec<&MetricData> = self
            .metrics
            .iter()
            .filter(|m| {
                matches!(
                    m.classification.tier,
                    SeverityTier::Warning | SeverityTier::Critical
                )
            })
            .collect();
        result.sort_by(|a, b| b.classification.tier.cmp(&a.classification.tier));
        result
    }

    /// Count metrics in each display tier: (good, warning, critical).
    ///
    /// Info and Unknown rows are neither healthy nor alarming and are left
    /// out of the headline counts.
    pub fn tier_counts(&self) -> (usize, usize, usize) {
        let mut good = 0;
        let mut warning = 0;
        let mut critical = 0;
        for m in &self.metrics {
            match m.classification.tier {
                SeverityTier::Good => good += 1,
                SeverityTier::Warning => warning += 1,
                SeverityTier::Critical => critical += 1,
                SeverityTier::Info | SeverityTier::Unknown => {}
            }
        }
        (good, warning, critical)
    }
}

fn parse_reading(raw: &RawReading) -> SensorValue {
    match raw {
        RawReading::Number(n) => SensorValue::from(*n),
        RawReading::Flag(b) => SensorValue::from(*b),
        RawReading::Text(s) => SensorValue::parse(s),
    }
}

fn numeric_reading(snapshot: &TelemetrySnapshot, key: &str) -> Option<f64> {
    snapshot.get(key).and_then(|raw| parse_reading(raw).as_numeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::care::CareVerdict;

    fn snapshot(json: &str) -> TelemetrySnapshot {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_snapshot_classifies_and_sorts() {
        let data = TelemetryData::from_snapshot(snapshot(
            r#"{
                "temperature": 80,
                "humidity": 20,
                "soilMoisture": 50,
                "gasLevel": "LOW"
            }"#,
        ));

        assert_eq!(data.metrics.len(), 4);
        // Critical humidity sorts first
        assert_eq!(data.metrics[0].key, "humidity");
        assert_eq!(data.metrics[0].classification.tier, SeverityTier::Critical);
        // Good temperature sorts last
        assert_eq!(data.metrics[3].key, "temperature");
        assert_eq!(data.metrics[3].classification.tier, SeverityTier::Good);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let data = TelemetryData::from_snapshot(snapshot(
            r#"{ "temperature": 22, "someFutureSensor": 5 }"#,
        ));
        assert_eq!(data.metrics.len(), 1);
        assert_eq!(data.metrics[0].key, "temperature");
    }

    #[test]
    fn test_care_assessment_uses_numeric_subset() {
        let data = TelemetryData::from_snapshot(snapshot(
            r#"{
                "temperature": 20,
                "humidity": "Loading...",
                "soilMoisture": 10
            }"#,
        ));
        // Humidity is non-numeric, excluded; soil moisture drives the callout
        assert_eq!(
            data.care.verdict,
            CareVerdict::NeedsAttention(vec![crate::data::CareParameter::SoilMoisture])
        );
    }

    #[test]
    fn test_auto_mode_flag() {
        let data =
            TelemetryData::from_snapshot(snapshot(r#"{ "temperature": 22, "autoMode": true }"#));
        assert_eq!(data.auto_mode, Some(true));

        let data = TelemetryData::from_snapshot(snapshot(r#"{ "temperature": 22 }"#));
        assert_eq!(data.auto_mode, None);
    }

    #[test]
    fn test_attention_metrics() {
        let data = TelemetryData::from_snapshot(snapshot(
            r#"{
                "temperature": 80,
                "humidity": 20,
                "soilMoisture": 55,
                "pir": true
            }"#,
        ));
        let attention = data.attention_metrics();
        assert_eq!(attention.len(), 2);
        assert_eq!(attention[0].key, "humidity");
        assert_eq!(attention[1].key, "soilMoisture");
    }

    #[test]
    fn test_tier_counts_skip_info_and_unknown() {
        let data = TelemetryData::from_snapshot(snapshot(
            r#"{
                "temperature": 80,
                "humidity": 20,
                "soilMoisture": "Loading...",
                "pir": true
            }"#,
        ));
        assert_eq!(data.tier_counts(), (1, 0, 1));
    }

    #[test]
    fn test_energy_metric_uses_energy_table() {
        let data = TelemetryData::from_snapshot(snapshot(r#"{ "costSavings": 45 }"#));
        // 45 is Warning on the energy table but would be Warning on the
        // percentage table too; 55 distinguishes them
        assert_eq!(data.metrics[0].classification.tier, SeverityTier::Warning);

        let data = TelemetryData::from_snapshot(snapshot(r#"{ "costSavings": 55 }"#));
        assert_eq!(data.metrics[0].classification.tier, SeverityTier::Good);
    }

    #[test]
    fn test_category_for() {
        assert_eq!(category_for("humidity"), Some(SensorCategory::Percentage));
        assert_eq!(category_for("costSavings"), Some(SensorCategory::Energy));
        assert_eq!(category_for("pir"), Some(SensorCategory::Binary));
        assert_eq!(category_for("harvests"), None);
    }
}
