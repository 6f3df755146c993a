//! Harvest view rendering.
//!
//! Shows the harvest log as a table and, when active, the entry form as
//! a modal overlay.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, FormField, HarvestForm};

/// Render the Harvest view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Date"),
        Cell::from("Quantity"),
        Cell::from("Quality"),
        Cell::from("Notes"),
        Cell::from("By"),
        Cell::from("Photo"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = app
        .harvest_records
        .iter()
        .map(|record| {
            Row::new(vec![
                Cell::from(record.date.to_string()),
                Cell::from(format!("{}", record.quantity)),
                Cell::from(record.quality.clone()),
                Cell::from(record.notes.clone()),
                Cell::from(record.recorded_by.clone()),
                Cell::from(if record.photo.is_some() { "yes" } else { "-" }),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(12),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Min(6),
    ];

    let title = format!(
        " Harvest log ({}) [n:new d:delete] | logging as {} ",
        app.harvest_records.len(),
        app.current_user(),
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

    let selected = app
        .selected_record_index
        .min(app.harvest_records.len().saturating_sub(1));
    let mut state = TableState::default();
    if !app.harvest_records.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);

    // Entry form goes on top of the log
    if let Some(form) = app.harvest_form.clone() {
        render_form(frame, app, &form, area);
    }
}

/// Render the harvest entry form as a centered modal.
fn render_form(frame: &mut Frame, app: &App, form: &HarvestForm, area: Rect) {
    const FIELDS: [FormField; 5] = [
        FormField::Date,
        FormField::Quantity,
        FormField::Quality,
        FormField::Notes,
        FormField::Photo,
    ];

    let mut lines = vec![
        Line::from(vec![Span::styled(
            "Log a harvest",
            app.theme.header,
        )]),
        Line::from(""),
    ];

    for field in FIELDS {
        let focused = form.focused == field;
        let marker = if focused { "▶ " } else { "  " };
        let cursor = if focused { "_" } else { "" };
        let style = if focused {
            Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{:<18}", marker, field.label()), style),
            Span::raw(format!("{}{}", form.text(field), cursor)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::styled(
        "Enter:save  Tab:next  Esc:cancel",
        Style::default().add_modifier(Modifier::DIM),
    )]));

    let block = Block::default()
        .title(" New Harvest ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(lines).block(block);

    let form_width = 56u16.min(area.width.saturating_sub(4));
    let form_height = 12u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(form_width)) / 2;
    let y = area.y + (area.height.saturating_sub(form_height)) / 2;
    let form_area = Rect::new(x, y, form_width, form_height);

    frame.render_widget(Clear, form_area);
    frame.render_widget(paragraph, form_area);
}
