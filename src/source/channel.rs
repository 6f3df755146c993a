//! Channel-based telemetry source.
//!
//! Receives telemetry snapshots via a tokio watch channel. This is the
//! integration point for push-based feeds: a subscriber task sends each
//! snapshot through the channel and the TUI polls this source.

use tokio::sync::watch;

use super::{TelemetrySnapshot, TelemetrySource};

/// A telemetry source that receives snapshots via a channel.
///
/// The producer (an MQTT subscriber, a test, a bridge process) sends full
/// snapshots through the channel; each send replaces the previous value.
///
/// # Example
///
/// ```
/// use greenwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("mqtt://broker.local");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<TelemetrySnapshot>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - A description of where snapshots come from
    ///   (e.g., "mqtt://broker.local:1883")
    pub fn new(receiver: watch::Receiver<TelemetrySnapshot>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            initial_returned: false,
        }
    }

    /// Create a channel pair for sending snapshots to a ChannelSource.
    ///
    /// Returns (sender, source) where the sender pushes snapshots and the
    /// source plugs into the TUI.
    pub fn create(source_description: &str) -> (watch::Sender<TelemetrySnapshot>, Self) {
        let (tx, rx) = watch::channel(TelemetrySnapshot::default());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl TelemetrySource for ChannelSource {
    fn poll(&mut self) -> Option<TelemetrySnapshot> {
        // Return the initial value on first poll
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        // Check if there's a new value without blocking
        if self.receiver.has_changed().unwrap_or(false) {
            let snapshot = self.receiver.borrow_and_update().clone();
            Some(snapshot)
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        // Connection errors are handled by the subscriber feeding the channel
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawReading;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // Initially returns the default (empty) snapshot
        let snapshot = source.poll();
        assert!(snapshot.is_some());
        assert!(snapshot.unwrap().is_empty());

        // No change, so poll returns None
        assert!(source.poll().is_none());

        // Send a new snapshot
        let mut new_snapshot = TelemetrySnapshot::new();
        new_snapshot.insert("temperature".to_string(), RawReading::Number(22.0));
        tx.send(new_snapshot).unwrap();

        // Now poll returns the new snapshot
        let snapshot = source.poll();
        assert!(snapshot.is_some());
        assert_eq!(snapshot.unwrap().len(), 1);
    }

    #[test]
    fn test_channel_source_description() {
        let (_tx, source) = ChannelSource::create("mqtt://broker.local");
        assert_eq!(source.description(), "channel: mqtt://broker.local");
    }
}
