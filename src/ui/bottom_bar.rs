use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::ui::common::*;

/// Static key hints, followed by the refresh interval when running live
pub fn render(area: Rect, buf: &mut Buffer, refresh: Option<Duration>) {
    let mut spans = vec![
        bold("[Q]", COLOR_ACCENT),
        dim(" Quit   "),
        bold("[R]", COLOR_ACCENT),
        dim(" Refresh"),
    ];
    if let Some(interval) = refresh {
        spans.push(dim(format!("   Auto-refresh every {}", format_interval(interval))));
    }

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(COLOR_DIM));

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
}
