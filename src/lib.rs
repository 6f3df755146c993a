//! # greenwatch
//!
//! A terminal dashboard and library for greenhouse telemetry.
//!
//! This crate receives whole-tree snapshots of sensor and actuator state
//! from a push-based feed, classifies each reading into a color-coded
//! severity tier, grades plant-care parameters against their ideal
//! ranges, and keeps a harvest log with photos.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐   │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│   │
//! │  │ (state) │    │(classify)│    │(render) │    │         │   │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘   │
//! │       │                                                      │
//! │       ├──▶ ┌─────────┐                                       │
//! │       │    │ source  │◀── FileSource | StreamSource |        │
//! │       │    │ (input) │    ChannelSource                      │
//! │       │    └─────────┘                                       │
//! │       └──▶ ┌─────────┐                                       │
//! │            │ store   │◀── RecordStore | IdentityProvider |   │
//! │            │ (output)│    BlobStore | ControlSink            │
//! │            └─────────┘                                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Telemetry source abstraction ([`TelemetrySource`] trait)
//!   with implementations for file polling, TCP streams, and channel input
//! - **[`data`]**: Pure classification and processing - maps raw readings to
//!   severity tiers, evaluates care parameters, tracks history for sparklines
//! - **[`store`]**: Injected collaborators - harvest records, identity,
//!   photo storage, actuator control
//! - **[`ui`]**: Terminal rendering using ratatui - gauge tables, care view,
//!   harvest log, and theme support
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Monitor a JSON file (mirrored from the live feed)
//! greenwatch --file telemetry.json
//!
//! # Monitor via TCP connection
//! greenwatch --connect localhost:9090
//! ```
//!
//! ### The classifier as a library
//!
//! ```
//! use greenwatch::data::{classify, SensorCategory, SensorValue, SeverityTier};
//!
//! let result = classify(SensorValue::Numeric(25.0), SensorCategory::Percentage);
//! assert_eq!(result.tier, SeverityTier::Critical);
//! assert_eq!(result.display_magnitude, 25.0);
//! ```
//!
//! ### The care evaluator as a library
//!
//! ```
//! use greenwatch::data::{evaluate, CareReadings, CareVerdict};
//!
//! let assessment = evaluate(&CareReadings {
//!     temperature: Some(20.0),
//!     humidity: Some(65.0),
//!     soil_moisture: Some(50.0),
//! });
//! assert_eq!(assessment.verdict, CareVerdict::FullySatisfied);
//! ```
//!
//! ### With a channel source (for push-based integration)
//!
//! ```
//! use greenwatch::ChannelSource;
//!
//! // Create a channel for receiving snapshots
//! let (tx, source) = ChannelSource::create("mqtt://broker.local");
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod source;
pub mod store;
pub mod ui;

// MQTT integration module (requires "subscribe" feature)
#[cfg(feature = "subscribe")]
pub mod subscribe;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    classify, evaluate, CareAssessment, CareParameter, CareReadings, CareVerdict, Classification,
    History, MetricData, SensorCategory, SensorValue, SeverityTier, TelemetryData,
};
pub use source::{ChannelSource, FileSource, RawReading, StreamSource, TelemetrySnapshot, TelemetrySource};
pub use store::{
    BlobStore, ControlSink, DirBlobStore, EnvIdentity, FileControlSink, HarvestRecord,
    IdentityProvider, JsonRecordStore, MemoryRecordStore, NewHarvest, NoopControlSink,
    RecordStore, StaticIdentity,
};
