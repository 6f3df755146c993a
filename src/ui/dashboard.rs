//! Dashboard view rendering.
//!
//! Displays a table of all sensor gauges with severity tier, fill bar,
//! rates, and sparkline trends.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::MetricData;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Width of the gauge fill bar in cells.
const GAUGE_WIDTH: usize = 16;

/// Column to sort by in the Dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by sensor label alphabetically.
    #[default]
    Name,
    /// Sort by gauge magnitude.
    Value,
    /// Sort by severity tier.
    Status,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Value,
            SortColumn::Value => SortColumn::Status,
            SortColumn::Status => SortColumn::Name,
        }
    }
}

/// Render the Dashboard view showing all metrics in a sortable table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    // Get filtered and sorted metric indices
    let mut metrics: Vec<(usize, &MetricData)> =
        data.metrics.iter().enumerate().filter(|(_, m)| app.matches_filter(&m.label)).collect();
    sort_metrics_by(&mut metrics, app.sort_column, app.sort_ascending);

    let header = Row::new(vec![
        Cell::from(format_header("Sensor", SortColumn::Name, app)),
        Cell::from(format_header("Value", SortColumn::Value, app)),
        Cell::from(format_header("Gauge", SortColumn::Value, app)),
        Cell::from("Rate"),
        Cell::from("Trend"),
        Cell::from(format_header("Status", SortColumn::Status, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = metrics
        .iter()
        .map(|(_, m)| {
            let tier_style = app.theme.tier_style(m.classification.tier);

            // Get sparkline for this metric
            let sparkline = render_sparkline(&app.history.get_sparkline(&m.key));

            // Get rate of change
            let rate = app
                .history
                .get_rate(&m.key)
                .map(|r| format!("{:+.1}/s", r))
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(m.label.clone()),
                Cell::from(m.display.clone()).style(tier_style),
                Cell::from(render_gauge(m.classification.display_magnitude)).style(tier_style),
                Cell::from(rate),
                Cell::from(sparkline),
                Cell::from(m.classification.tier.symbol()).style(tier_style),
            ])
        })
        .collect();

    // Use Fill to distribute space evenly while respecting minimum widths
    let widths = [
        Constraint::Fill(2),                    // Sensor - gets the largest share
        Constraint::Fill(1),                    // Value
        Constraint::Min(GAUGE_WIDTH as u16),    // Gauge - fixed bar width
        Constraint::Fill(1),                    // Rate
        Constraint::Min(8),                     // Trend - fixed for sparkline chars
        Constraint::Min(6),                     // Status - fixed minimum
    ];

    // selected_metric_index is treated as visual index; clamp to valid range
    let selected_visual_index = app.selected_metric_index.min(metrics.len().saturating_sub(1));

    let sort_indicator = match app.sort_column {
        SortColumn::Name => "name",
        SortColumn::Value => "value",
        SortColumn::Status => "status",
    };
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    // Build title with filter info
    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !metrics.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, metrics.len())
    } else {
        String::new()
    };

    let title = format!(
        " Sensors ({}/{}) [s:sort {}{}]{}{} ",
        metrics.len(),
        data.metrics.len(),
        sort_indicator,
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort metrics by the given column and direction (public for use in app.rs)
pub fn sort_metrics_by(metrics: &mut [(usize, &MetricData)], column: SortColumn, ascending: bool) {
    metrics.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.1.label.cmp(&b.1.label),
            SortColumn::Value => a
                .1
                .classification
                .display_magnitude
                .total_cmp(&b.1.classification.display_magnitude),
            SortColumn::Status => a.1.classification.tier.cmp(&b.1.classification.tier),
        };

        // Apply direction to primary comparison
        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Use secondary sort by label for stability when primary values are equal
        if primary == std::cmp::Ordering::Equal {
            a.1.label.cmp(&b.1.label)
        } else {
            primary
        }
    });
}

/// Render the gauge fill bar for a magnitude in [0, 100].
///
/// Non-numeric readings arrive with magnitude 100, so an unknown state
/// shows a full placeholder bar rather than an empty one.
fn render_gauge(magnitude: f64) -> String {
    let filled = ((magnitude / 100.0) * GAUGE_WIDTH as f64).round() as usize;
    let filled = filled.min(GAUGE_WIDTH);
    let mut bar = String::with_capacity(GAUGE_WIDTH * 3);
    for _ in 0..filled {
        bar.push('█');
    }
    for _ in filled..GAUGE_WIDTH {
        bar.push('░');
    }
    bar
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_fill_levels() {
        assert_eq!(render_gauge(0.0), "░".repeat(GAUGE_WIDTH));
        assert_eq!(render_gauge(100.0), "█".repeat(GAUGE_WIDTH));

        let half = render_gauge(50.0);
        assert_eq!(half.chars().filter(|&c| c == '█').count(), GAUGE_WIDTH / 2);
    }

    #[test]
    fn test_sparkline_rendering() {
        assert_eq!(render_sparkline(&[]), "        ");
        assert_eq!(render_sparkline(&[0, 7]), "▁█");

        // Only the last 8 values are drawn
        let long: Vec<u8> = (0..12).map(|v| (v % 8) as u8).collect();
        assert_eq!(render_sparkline(&long).chars().count(), 8);
    }
}
