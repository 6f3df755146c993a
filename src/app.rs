//! Application state and navigation logic.

use anyhow::Result;

use crate::data::{History, SeverityTier, TelemetryData};
use crate::source::TelemetrySource;
use crate::store::{
    BlobStore, ControlSink, HarvestRecord, IdentityProvider, NewHarvest, RecordStore,
};
use crate::ui::dashboard::SortColumn;
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Metric detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Gauge overview of all sensors.
    Dashboard,
    /// Care parameters against their ideal ranges.
    Care,
    /// Harvest log and entry form.
    Harvest,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Care,
            View::Care => View::Harvest,
            View::Harvest => View::Dashboard,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Dashboard => View::Harvest,
            View::Care => View::Dashboard,
            View::Harvest => View::Care,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Care => "Care",
            View::Harvest => "Harvest",
        }
    }
}

/// Fields of the harvest entry form, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Quantity,
    Quality,
    Notes,
    Photo,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Date => FormField::Quantity,
            FormField::Quantity => FormField::Quality,
            FormField::Quality => FormField::Notes,
            FormField::Notes => FormField::Photo,
            FormField::Photo => FormField::Date,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Date => FormField::Photo,
            FormField::Quantity => FormField::Date,
            FormField::Quality => FormField::Quantity,
            FormField::Notes => FormField::Quality,
            FormField::Photo => FormField::Notes,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Date => "Date (YYYY-MM-DD)",
            FormField::Quantity => "Quantity",
            FormField::Quality => "Quality",
            FormField::Notes => "Notes",
            FormField::Photo => "Photo path",
        }
    }
}

/// In-progress harvest entry.
#[derive(Debug, Clone)]
pub struct HarvestForm {
    pub date: String,
    pub quantity: String,
    pub quality: String,
    pub notes: String,
    pub photo: String,
    pub focused: FormField,
}

impl HarvestForm {
    /// A fresh form with today's date prefilled.
    pub fn new() -> Self {
        Self {
            date: chrono::Utc::now().date_naive().to_string(),
            quantity: String::new(),
            quality: String::new(),
            notes: String::new(),
            photo: String::new(),
            focused: FormField::Date,
        }
    }

    /// Mutable access to the focused field's text.
    pub fn focused_text(&mut self) -> &mut String {
        match self.focused {
            FormField::Date => &mut self.date,
            FormField::Quantity => &mut self.quantity,
            FormField::Quality => &mut self.quality,
            FormField::Notes => &mut self.notes,
            FormField::Photo => &mut self.photo,
        }
    }

    /// Read access to a field's text.
    pub fn text(&self, field: FormField) -> &str {
        match field {
            FormField::Date => &self.date,
            FormField::Quantity => &self.quantity,
            FormField::Quality => &self.quality,
            FormField::Notes => &self.notes,
            FormField::Photo => &self.photo,
        }
    }
}

impl Default for HarvestForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Telemetry
    source: Box<dyn TelemetrySource>,
    pub data: Option<TelemetryData>,
    pub history: History,
    pub load_error: Option<String>,

    // Collaborators
    records: Box<dyn RecordStore>,
    identity: Box<dyn IdentityProvider>,
    photos: Box<dyn BlobStore>,
    control: Box<dyn ControlSink>,

    // Harvest state
    pub harvest_records: Vec<HarvestRecord>,
    pub harvest_form: Option<HarvestForm>,

    // Navigation state
    pub selected_metric_index: usize,
    pub selected_record_index: usize,

    // Sorting (Dashboard view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App with the given source and collaborators.
    pub fn new(
        source: Box<dyn TelemetrySource>,
        records: Box<dyn RecordStore>,
        identity: Box<dyn IdentityProvider>,
        photos: Box<dyn BlobStore>,
        control: Box<dyn ControlSink>,
    ) -> Self {
        let mut app = Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            show_detail_overlay: false,
            source,
            data: None,
            history: History::new(),
            load_error: None,
            records,
            identity,
            photos,
            control,
            harvest_records: Vec::new(),
            harvest_form: None,
            selected_metric_index: 0,
            selected_record_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            status_message: None,
        };
        app.reload_records();
        app
    }

    /// Returns a description of the current telemetry source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The identity that will own newly logged records.
    pub fn current_user(&self) -> &str {
        self.identity.current_user()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the telemetry source for new data.
    ///
    /// Returns Ok(true) if new data was received, Ok(false) if no new data,
    /// or Err if there was an error.
    pub fn reload_data(&mut self) -> Result<bool> {
        // Check for errors from the source
        if let Some(err) = self.source.error() {
            self.load_error = Some(err.to_string());
            return Ok(false);
        }

        // Poll for new data
        if let Some(snapshot) = self.source.poll() {
            let data = TelemetryData::from_snapshot(snapshot);

            // Record history before updating
            self.history.record(&data);
            self.data = Some(data);
            self.load_error = None;

            // Clamp selection indices
            if let Some(ref data) = self.data {
                if self.selected_metric_index >= data.metrics.len() {
                    self.selected_metric_index = data.metrics.len().saturating_sub(1);
                }
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Refresh the cached harvest record list from the store.
    pub fn reload_records(&mut self) {
        match self.records.list() {
            Ok(records) => {
                self.harvest_records = records;
                if self.selected_record_index >= self.harvest_records.len() {
                    self.selected_record_index = self.harvest_records.len().saturating_sub(1);
                }
            }
            Err(e) => self.set_status_message(format!("Record store error: {}", e)),
        }
    }

    /// Open the harvest entry form.
    pub fn open_harvest_form(&mut self) {
        self.harvest_form = Some(HarvestForm::new());
    }

    /// Discard the harvest entry form.
    pub fn cancel_harvest_form(&mut self) {
        self.harvest_form = None;
    }

    /// Validate and store the current harvest form.
    ///
    /// On validation failure the form stays open and the error is shown
    /// in the status bar.
    pub fn submit_harvest(&mut self) {
        let Some(form) = self.harvest_form.clone() else {
            return;
        };

        // Store the photo first so the record carries its reference
        let photo = if form.photo.trim().is_empty() {
            None
        } else {
            match self.photos.store(std::path::Path::new(form.photo.trim())) {
                Ok(url) => Some(url),
                Err(e) => {
                    self.set_status_message(format!("Photo upload failed: {}", e));
                    return;
                }
            }
        };

        let submission = NewHarvest {
            date: form.date,
            quantity: form.quantity,
            quality: form.quality,
            notes: form.notes,
            photo,
        };

        let user = self.identity.current_user().to_string();
        match self.records.add(submission, &user) {
            Ok(record) => {
                self.harvest_form = None;
                self.reload_records();
                self.set_status_message(format!("Logged harvest for {}", record.date));
            }
            Err(e) => self.set_status_message(format!("Invalid harvest entry: {}", e)),
        }
    }

    /// Delete the selected harvest record.
    pub fn delete_selected_record(&mut self) {
        let Some(record) = self.harvest_records.get(self.selected_record_index) else {
            return;
        };
        let id = record.id;
        match self.records.delete(id) {
            Ok(true) => {
                self.reload_records();
                self.set_status_message("Deleted harvest record".to_string());
            }
            Ok(false) => self.set_status_message("Record already gone".to_string()),
            Err(e) => self.set_status_message(format!("Delete failed: {}", e)),
        }
    }

    /// Toggle the actuator auto/manual mode through the control sink.
    ///
    /// Fire-and-forget: a failed write is reported but never retried.
    pub fn toggle_auto_mode(&mut self) {
        let current = self.data.as_ref().and_then(|d| d.auto_mode).unwrap_or(false);
        let requested = !current;
        match self.control.set_auto_mode(requested) {
            Ok(()) => self.set_status_message(format!(
                "Requested {} mode",
                if requested { "automatic" } else { "manual" }
            )),
            Err(e) => self.set_status_message(format!("Mode change failed: {}", e)),
        }
    }

    /// Switch to the next view (cycles Dashboard → Care → Harvest).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::Dashboard => {
                if let Some(ref data) = self.data {
                    let max = self.filtered_metric_count(data).saturating_sub(1);
                    self.selected_metric_index = (self.selected_metric_index + n).min(max);
                }
            }
            View::Harvest => {
                let max = self.harvest_records.len().saturating_sub(1);
                self.selected_record_index = (self.selected_record_index + n).min(max);
            }
            View::Care => {}
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Dashboard => {
                self.selected_metric_index = self.selected_metric_index.saturating_sub(n);
            }
            View::Harvest => {
                self.selected_record_index = self.selected_record_index.saturating_sub(n);
            }
            View::Care => {}
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        match self.current_view {
            View::Dashboard => self.selected_metric_index = 0,
            View::Harvest => self.selected_record_index = 0,
            View::Care => {}
        }
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        match self.current_view {
            View::Dashboard => {
                if let Some(ref data) = self.data {
                    self.selected_metric_index =
                        self.filtered_metric_count(data).saturating_sub(1);
                }
            }
            View::Harvest => {
                self.selected_record_index = self.harvest_records.len().saturating_sub(1);
            }
            View::Care => {}
        }
    }

    /// Get count of metrics after applying filter.
    fn filtered_metric_count(&self, data: &TelemetryData) -> usize {
        if self.filter_text.is_empty() {
            return data.metrics.len();
        }
        data.metrics.iter().filter(|m| self.matches_filter(&m.label)).count()
    }

    /// Get the actual metric index from the visual index (after sorting/filtering).
    ///
    /// The Dashboard view applies sorting and filtering, so the visual row
    /// index differs from the underlying data index.
    pub fn get_selected_metric_raw_index(&self) -> Option<usize> {
        let data = self.data.as_ref()?;

        match self.current_view {
            View::Dashboard => {
                let mut metrics: Vec<(usize, &crate::data::MetricData)> = data
                    .metrics
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| self.matches_filter(&m.label))
                    .collect();
                crate::ui::dashboard::sort_metrics_by(
                    &mut metrics,
                    self.sort_column,
                    self.sort_ascending,
                );

                metrics.get(self.selected_metric_index).map(|(idx, _)| *idx)
            }
            View::Care | View::Harvest => None,
        }
    }

    /// Open the detail overlay for the currently selected metric.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Dashboard {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlays first, then return to the Dashboard.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        if self.harvest_form.is_some() {
            self.harvest_form = None;
            return;
        }
        if self.current_view != View::Dashboard {
            self.current_view = View::Dashboard;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column (Dashboard view).
    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Dashboard {
            self.sort_column = self.sort_column.next();
        }
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        if self.current_view == View::Dashboard {
            self.sort_ascending = !self.sort_ascending;
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a metric label matches the current filter.
    pub fn matches_filter(&self, label: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        label.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        use std::io::Write;

        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };

        let mut export = serde_json::Map::new();

        // Summary
        let (good, warning, critical) = data.tier_counts();
        let mut summary = serde_json::Map::new();
        summary.insert(
            "total_metrics".to_string(),
            serde_json::json!(data.metrics.len()),
        );
        summary.insert("good".to_string(), serde_json::json!(good));
        summary.insert("warning".to_string(), serde_json::json!(warning));
        summary.insert("critical".to_string(), serde_json::json!(critical));
        export.insert("summary".to_string(), serde_json::Value::Object(summary));

        // Metrics
        let metrics: Vec<serde_json::Value> = data
            .metrics
            .iter()
            .map(|m| {
                serde_json::json!({
                    "key": m.key,
                    "value": m.display,
                    "numeric": m.classification.is_numeric,
                    "magnitude": m.classification.display_magnitude,
                    "tier": format!("{:?}", m.classification.tier)
                })
            })
            .collect();
        export.insert("metrics".to_string(), serde_json::Value::Array(metrics));

        // Care
        let care: Vec<serde_json::Value> = data
            .care
            .statuses
            .iter()
            .map(|s| {
                serde_json::json!({
                    "parameter": s.parameter.label(),
                    "reading": s.reading,
                    "good": s.good
                })
            })
            .collect();
        export.insert("care".to_string(), serde_json::Value::Array(care));
        export.insert(
            "care_verdict".to_string(),
            serde_json::json!(data.care.verdict.caption()),
        );

        // Attention list
        let attention: Vec<serde_json::Value> = data
            .attention_metrics()
            .iter()
            .map(|m| {
                serde_json::json!({
                    "key": m.key,
                    "value": m.display,
                    "tier": format!("{:?}", m.classification.tier)
                })
            })
            .collect();
        export.insert("attention".to_string(), serde_json::Value::Array(attention));

        let json = serde_json::to_string_pretty(&serde_json::Value::Object(export))?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    /// True when any metric is in a critical state.
    pub fn has_critical(&self) -> bool {
        self.data.as_ref().is_some_and(|d| {
            d.metrics
                .iter()
                .any(|m| m.classification.tier == SeverityTier::Critical)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ChannelSource, RawReading, TelemetrySnapshot};
    use crate::store::{MemoryRecordStore, StaticIdentity};

    struct NoPhotos;
    impl BlobStore for NoPhotos {
        fn store(&mut self, _source: &std::path::Path) -> Result<String> {
            anyhow::bail!("no photo store in tests")
        }
    }

    fn test_app() -> (tokio::sync::watch::Sender<TelemetrySnapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        let app = App::new(
            Box::new(source),
            Box::new(MemoryRecordStore::new()),
            Box::new(StaticIdentity::new("tester")),
            Box::new(NoPhotos),
            Box::new(crate::store::NoopControlSink),
        );
        (tx, app)
    }

    fn snapshot(json: &str) -> TelemetrySnapshot {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_reload_data_processes_snapshot() {
        let (tx, mut app) = test_app();

        // Initial empty snapshot
        assert!(app.reload_data().unwrap());
        assert!(app.data.as_ref().unwrap().metrics.is_empty());

        tx.send(snapshot(r#"{ "temperature": 22, "humidity": 10 }"#)).unwrap();
        assert!(app.reload_data().unwrap());

        let data = app.data.as_ref().unwrap();
        assert_eq!(data.metrics.len(), 2);
        assert!(app.has_critical());
    }

    #[test]
    fn test_view_cycling() {
        let (_tx, mut app) = test_app();
        assert_eq!(app.current_view, View::Dashboard);
        app.next_view();
        assert_eq!(app.current_view, View::Care);
        app.next_view();
        assert_eq!(app.current_view, View::Harvest);
        app.next_view();
        assert_eq!(app.current_view, View::Dashboard);
        app.prev_view();
        assert_eq!(app.current_view, View::Harvest);
    }

    #[test]
    fn test_harvest_submission_and_delete() {
        let (_tx, mut app) = test_app();

        app.open_harvest_form();
        {
            let form = app.harvest_form.as_mut().unwrap();
            form.date = "2025-07-14".to_string();
            form.quantity = "4.5".to_string();
            form.quality = "ripe".to_string();
        }
        app.submit_harvest();

        assert!(app.harvest_form.is_none());
        assert_eq!(app.harvest_records.len(), 1);
        assert_eq!(app.harvest_records[0].recorded_by, "tester");

        app.current_view = View::Harvest;
        app.delete_selected_record();
        assert!(app.harvest_records.is_empty());
    }

    #[test]
    fn test_invalid_harvest_keeps_form_open() {
        let (_tx, mut app) = test_app();

        app.open_harvest_form();
        app.harvest_form.as_mut().unwrap().quantity = "minus five".to_string();
        app.submit_harvest();

        assert!(app.harvest_form.is_some());
        assert!(app.harvest_records.is_empty());
        assert!(app.get_status_message().unwrap().contains("Invalid harvest entry"));
    }

    #[test]
    fn test_go_back_closes_form_before_switching_view() {
        let (_tx, mut app) = test_app();
        app.set_view(View::Harvest);
        app.open_harvest_form();

        app.go_back();
        assert!(app.harvest_form.is_none());
        assert_eq!(app.current_view, View::Harvest);

        app.go_back();
        assert_eq!(app.current_view, View::Dashboard);
    }

    #[test]
    fn test_filter_matches() {
        let (_tx, mut app) = test_app();
        app.filter_text = "soil".to_string();
        assert!(app.matches_filter("Soil Moisture"));
        assert!(!app.matches_filter("Temperature"));
    }

    #[test]
    fn test_form_field_cycle() {
        let mut field = FormField::Date;
        for _ in 0..5 {
            field = field.next();
        }
        assert_eq!(field, FormField::Date);
        assert_eq!(FormField::Date.prev(), FormField::Photo);
    }
}
