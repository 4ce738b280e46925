use chrono::{DateTime, Local};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Widget};

use crate::ui::common::*;

pub fn render(area: Rect, buf: &mut Buffer, project: &str, now: DateTime<Local>) {
    let separator = || Span::styled("  \u{2502}  ", Style::default().fg(COLOR_DIM));

    let line = Line::from(vec![
        bold(format!("DEVDASH v{}", env!("CARGO_PKG_VERSION")), COLOR_ACCENT),
        separator(),
        colored(now.format("%H:%M:%S").to_string(), COLOR_TEXT),
        separator(),
        dim("Project: "),
        bold(project.to_string(), COLOR_GOOD),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(COLOR_ACCENT));

    Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
}
