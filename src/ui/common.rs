use std::time::Duration;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders};

use crate::types::{PanelCategory, Severity};

// -- Color Palette --

pub const COLOR_GOOD: Color = Color::Green;
pub const COLOR_WARN: Color = Color::Yellow;
pub const COLOR_CRIT: Color = Color::Red;
pub const COLOR_INFO: Color = Color::Cyan;
pub const COLOR_ACCENT: Color = Color::Cyan;
pub const COLOR_DIM: Color = Color::DarkGray;
pub const COLOR_TEXT: Color = Color::White;

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Good => COLOR_GOOD,
        Severity::Warning => COLOR_WARN,
        Severity::Critical => COLOR_CRIT,
    }
}

pub fn category_color(category: PanelCategory) -> Color {
    match category {
        PanelCategory::Info => Color::Cyan,
        PanelCategory::Success => Color::Green,
        PanelCategory::Warning => Color::Yellow,
        PanelCategory::Caution => Color::Magenta,
        PanelCategory::Activity => Color::Blue,
    }
}

/// Rounded, titled block in the panel's category color
pub fn panel_block(title: &str, category: PanelCategory) -> Block<'static> {
    let color = category_color(category);
    Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

// -- Span helpers --

pub fn plain(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(COLOR_TEXT))
}

pub fn dim(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(COLOR_DIM))
}

pub fn colored(text: impl Into<String>, color: Color) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(color))
}

pub fn bold(text: impl Into<String>, color: Color) -> Span<'static> {
    Span::styled(
        text.into(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Percentage span colored by its severity
pub fn severity_span(text: impl Into<String>, severity: Severity) -> Span<'static> {
    colored(text, severity_color(severity))
}

// -- Formatters --

/// Refresh interval as shown to the user
pub fn format_interval(interval: Duration) -> String {
    format!("{:.1}s", interval.as_secs_f64())
}

pub fn truncate_str(s: &str, max: usize) -> String {
    if max < 3 {
        return s.chars().take(max).collect();
    }
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 2).collect();
        format!("{}..", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation() {
        assert_eq!(truncate_str("postgres", 15), "postgres");
        assert_eq!(truncate_str("com.docker.backend", 10), "com.dock..");
        assert_eq!(truncate_str("abc", 2), "ab");
    }

    #[test]
    fn interval_format() {
        assert_eq!(format_interval(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_interval(Duration::from_secs(2)), "2.0s");
    }

    #[test]
    fn category_colors() {
        assert_eq!(category_color(PanelCategory::Info), Color::Cyan);
        assert_eq!(category_color(PanelCategory::Success), Color::Green);
        assert_eq!(category_color(PanelCategory::Warning), Color::Yellow);
        assert_eq!(category_color(PanelCategory::Caution), Color::Magenta);
    }
}
