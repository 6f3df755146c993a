//! Care view rendering.
//!
//! Shows temperature, humidity, and soil moisture against their ideal
//! ranges, with the aggregate verdict.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{CareVerdict, SeverityTier};

/// Render the Care view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3), // Verdict banner
        Constraint::Min(5),    // Parameter table
    ])
    .split(area);

    // ===== VERDICT BANNER =====
    let verdict_style = match &data.care.verdict {
        CareVerdict::FullySatisfied => app.theme.tier_style(SeverityTier::Good),
        CareVerdict::FullyUnsatisfied => app.theme.tier_style(SeverityTier::Critical),
        CareVerdict::NeedsAttention(callouts) if callouts.is_empty() => {
            app.theme.tier_style(SeverityTier::Unknown)
        }
        CareVerdict::NeedsAttention(_) => app.theme.tier_style(SeverityTier::Warning),
    };

    let banner = Paragraph::new(Line::from(vec![Span::styled(
        format!(" {} ", data.care.verdict.caption()),
        verdict_style.add_modifier(Modifier::BOLD),
    )]))
    .block(
        Block::default()
            .title(" Plant Care ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(banner, chunks[0]);

    // ===== PARAMETER TABLE =====
    let header = Row::new(vec![
        Cell::from("Parameter"),
        Cell::from("Reading"),
        Cell::from("Ideal Range"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = data
        .care
        .statuses
        .iter()
        .map(|status| {
            let range = status.parameter.ideal_range();
            let reading = status
                .reading
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string());

            let (label, style) = if status.good {
                ("OK", app.theme.tier_style(SeverityTier::Good))
            } else if status.reading.is_some() {
                ("OUT OF RANGE", app.theme.tier_style(SeverityTier::Critical))
            } else {
                ("NO DATA", app.theme.tier_style(SeverityTier::Unknown))
            };

            Row::new(vec![
                Cell::from(status.parameter.label()),
                Cell::from(reading).style(style),
                Cell::from(format!("{:.0} – {:.0}", range.min, range.max)),
                Cell::from(label).style(style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(14),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(" Parameters ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, chunks[1]);
}
