//! Data models and processing.
//!
//! Converts raw telemetry snapshots into classified, display-ready data
//! and tracks history for sparklines.

pub mod care;
pub mod classify;
pub mod history;
pub mod telemetry;

pub use care::{
    evaluate, CareAssessment, CareParameter, CareReadings, CareVerdict, IdealRange,
    ParameterStatus,
};
pub use classify::{classify, Classification, SensorCategory, SensorValue, SeverityTier};
pub use history::History;
pub use telemetry::{category_for, MetricData, TelemetryData};
