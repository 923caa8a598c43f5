//! TUI rendering.

use portwatch_core::PortStatus;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::app::App;

/// Ports per grid row.
const COLUMNS: usize = 7;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Grid
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_grid(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!("Ports Monitor | {}", app.host()))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(header, area);
}

fn draw_grid(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Ports ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let entries = app.entries();
    if entries.is_empty() {
        let empty = Paragraph::new("No ports configured.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, inner);
        return;
    }

    let rows = grid_rows(entries.len());
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(inner);

    for (row, chunk) in entries.chunks(COLUMNS).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, COLUMNS as u32); COLUMNS])
            .split(row_areas[row]);

        for (entry, cell) in chunk.iter().zip(cells.iter()) {
            let label = Paragraph::new(entry.port.to_string())
                .alignment(Alignment::Center)
                .style(Style::default().fg(status_color(entry.status)).bold());
            f.render_widget(label, middle_line(*cell));
        }
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer = Paragraph::new(format!("{} | q: quit", app.status_line()))
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(footer, area);
}

fn grid_rows(count: usize) -> usize {
    count.div_ceil(COLUMNS)
}

fn status_color(status: PortStatus) -> Color {
    match status {
        PortStatus::Unknown => Color::Gray,
        PortStatus::Unreachable => Color::Red,
        PortStatus::Reachable => Color::Green,
    }
}

/// The single text line at the vertical centre of `area`.
fn middle_line(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    }
}
