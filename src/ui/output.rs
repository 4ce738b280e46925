//! Off-screen rendering for one-shot output.
//!
//! The same widgets as live mode are drawn into a [`Buffer`] which is then
//! printed, with ANSI styling when stdout is a terminal.

use std::io::IsTerminal;

use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier};
use ratatui::text::Span;
use ratatui::widgets::Widget;

use crate::collectors::host::HostSnapshot;
use crate::collectors::ports::PortSnapshot;
use crate::collectors::DashboardFrame;
use crate::ui::layout::DashboardLayout;
use crate::ui::panel::Panel;
use crate::ui::DashboardView;

/// Canvas size when stdout is not a terminal
pub const DEFAULT_SIZE: (u16, u16) = (120, 40);

/// How printed output is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Ansi,
    Plain,
}

impl ColorMode {
    pub fn detect() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Ansi
        } else {
            Self::Plain
        }
    }
}

/// Current terminal size, or [`DEFAULT_SIZE`] when there is none
pub fn canvas_size() -> (u16, u16) {
    if !std::io::stdout().is_terminal() {
        return DEFAULT_SIZE;
    }
    crossterm::terminal::size().unwrap_or(DEFAULT_SIZE)
}

pub fn render_dashboard(layout: &DashboardLayout, frame: &DashboardFrame, width: u16, height: u16) -> Buffer {
    let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
    DashboardView {
        layout,
        frame,
        refresh: None,
    }
    .render(buf.area, &mut buf);
    buf
}

/// A single panel, exactly as tall as its content
pub fn render_panel(panel: &Panel, width: u16) -> Buffer {
    let mut buf = Buffer::empty(Rect::new(0, 0, width, panel.height()));
    panel.render(buf.area, &mut buf);
    buf
}

pub fn buffer_to_string(buf: &Buffer, mode: ColorMode) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        let mut style: Option<(Color, Color, Modifier)> = None;
        let mut skip = 0;
        for x in area.left()..area.right() {
            // Cells hidden behind a wide symbol
            if skip > 0 {
                skip -= 1;
                continue;
            }
            let cell = &buf[(x, y)];
            if mode == ColorMode::Ansi {
                let current = (cell.fg, cell.bg, cell.modifier);
                if style != Some(current) {
                    line.push_str(&sgr(cell));
                    style = Some(current);
                }
            }
            let symbol = cell.symbol();
            line.push_str(symbol);
            skip = Span::raw(symbol).width().saturating_sub(1);
        }
        match mode {
            ColorMode::Ansi => {
                line.push_str("\x1b[0m");
                out.push_str(&line);
            }
            ColorMode::Plain => out.push_str(line.trim_end()),
        }
        out.push('\n');
    }
    out
}

/// SGR sequence selecting a cell's full style, starting from a reset
fn sgr(cell: &Cell) -> String {
    let mut codes = vec!["0".to_string()];
    for (flag, code) in [
        (Modifier::BOLD, "1"),
        (Modifier::DIM, "2"),
        (Modifier::ITALIC, "3"),
        (Modifier::UNDERLINED, "4"),
        (Modifier::REVERSED, "7"),
    ] {
        if cell.modifier.contains(flag) {
            codes.push(code.to_string());
        }
    }
    if let Some(fg) = color_code(cell.fg, false) {
        codes.push(fg);
    }
    if let Some(bg) = color_code(cell.bg, true) {
        codes.push(bg);
    }
    format!("\x1b[{}m", codes.join(";"))
}

fn color_code(color: Color, background: bool) -> Option<String> {
    let base = match color {
        Color::Reset => return None,
        Color::Black => 30,
        Color::Red => 31,
        Color::Green => 32,
        Color::Yellow => 33,
        Color::Blue => 34,
        Color::Magenta => 35,
        Color::Cyan => 36,
        Color::Gray => 37,
        Color::DarkGray => 90,
        Color::LightRed => 91,
        Color::LightGreen => 92,
        Color::LightYellow => 93,
        Color::LightBlue => 94,
        Color::LightMagenta => 95,
        Color::LightCyan => 96,
        Color::White => 97,
        Color::Rgb(r, g, b) => {
            let lead = if background { 48 } else { 38 };
            return Some(format!("{};2;{};{};{}", lead, r, g, b));
        }
        Color::Indexed(i) => {
            let lead = if background { 48 } else { 38 };
            return Some(format!("{};5;{}", lead, i));
        }
    };
    Some((if background { base + 10 } else { base }).to_string())
}

/// One-line host summary printed by `devdash info`
pub fn info_line(host: &HostSnapshot, ports: &PortSnapshot) -> String {
    format!(
        "{} {} | CPU {:.1}% | RAM {:.1}% | {} listening ports | {}",
        host.os.system_name,
        host.os.release,
        host.cpu_percent,
        host.memory.percent,
        ports.len(),
        host.os.runtime_version,
    )
}
