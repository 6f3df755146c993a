//! Telemetry source abstraction.
//!
//! This module provides a trait-based abstraction for receiving telemetry
//! snapshots from various backends (files, push channels, network streams).

mod channel;
mod file;
mod snapshot;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use snapshot::{RawReading, TelemetrySnapshot};
pub use stream::StreamSource;

use std::fmt::Debug;

/// Trait for receiving telemetry snapshots from various sources.
///
/// Implementations provide snapshots from different backends: file
/// polling, network streams, or in-memory channels fed by a subscriber.
///
/// # Example
///
/// ```
/// use greenwatch::{FileSource, TelemetrySource};
///
/// let mut source = FileSource::new("telemetry.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} readings", snapshot.len());
/// }
/// ```
pub trait TelemetrySource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<TelemetrySnapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if an error occurred during the last poll.
    fn error(&self) -> Option<&str>;
}
