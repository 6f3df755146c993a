//! Detail overlay rendering.
//!
//! Displays a modal overlay with detailed information about a selected
//! metric: raw value, tier, gauge magnitude, and recent trend.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::SensorCategory;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 46;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 12;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the metric detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref data) = app.data else {
        return;
    };

    // Get the actual metric from the visual index
    let Some(raw_index) = app.get_selected_metric_raw_index() else {
        return;
    };
    let Some(metric) = data.metrics.get(raw_index) else {
        return;
    };

    let overlay_width = (area.width * 70 / 100).clamp(MIN_OVERLAY_WIDTH, 80);
    let overlay_height = (area.height * 60 / 100).clamp(MIN_OVERLAY_HEIGHT, 20);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Min(6),    // Metric info
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    let tier_style = app.theme.tier_style(metric.classification.tier);

    let category = match metric.category {
        SensorCategory::Percentage => "percentage",
        SensorCategory::Energy => "energy",
        SensorCategory::Binary => "binary",
    };

    let sparkline = render_sparkline(&app.history.get_sparkline(&metric.key));
    let rate = app
        .history
        .get_rate(&metric.key)
        .map(|r| format!("{:+.2}/s", r))
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", metric.label),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Value: "),
            Span::styled(metric.display.clone(), tier_style.add_modifier(Modifier::BOLD)),
            Span::raw("    Status: "),
            Span::styled(metric.classification.tier.symbol(), tier_style),
        ]),
        Line::from(vec![
            Span::raw(" Gauge: "),
            Span::raw(format!("{:.1}%", metric.classification.display_magnitude)),
            Span::raw("    Numeric: "),
            Span::raw(if metric.classification.is_numeric { "yes" } else { "no" }),
            Span::raw("    Category: "),
            Span::raw(category),
        ]),
        Line::from(vec![
            Span::raw(" Rate: "),
            Span::raw(rate),
            Span::raw("    Trend: "),
            Span::raw(sparkline),
        ]),
    ];

    let block = Block::default()
        .title(format!(" {} ", metric.key))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    let footer = Paragraph::new(" Esc/Enter: close  ↑/↓: other sensors ")
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(footer, chunks[1]);
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "-".to_string();
    }

    // The overlay has room for a wider trend than the table cells
    let values: Vec<u8> = data.iter().rev().take(24).rev().copied().collect();
    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}
