use ratatui::layout::{Constraint, Layout, Rect};

use crate::types::Slot;

pub const HEADER_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 3;

/// The fixed dashboard grid. Built once at startup; every cycle only
/// resolves it against the current terminal area.
#[derive(Debug, Clone)]
pub struct DashboardLayout {
    outer: Layout,
    columns: Layout,
    left: Layout,
    right: Layout,
    bottom_right: Layout,
}

/// Rectangles for every slot of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAreas {
    pub header: Rect,
    pub repository: Rect,
    pub activity: Rect,
    pub host: Rect,
    pub ports: Rect,
    pub packages: Rect,
    pub footer: Rect,
}

impl SlotAreas {
    pub fn get(&self, slot: Slot) -> Rect {
        match slot {
            Slot::Header => self.header,
            Slot::Repository => self.repository,
            Slot::Activity => self.activity,
            Slot::Host => self.host,
            Slot::Ports => self.ports,
            Slot::Packages => self.packages,
            Slot::Footer => self.footer,
        }
    }
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardLayout {
    pub fn new() -> Self {
        Self {
            outer: Layout::vertical([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ]),
            columns: Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]),
            // Repository details need more room than today's counters
            left: Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]),
            right: Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]),
            bottom_right: Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]),
        }
    }

    pub fn split(&self, area: Rect) -> SlotAreas {
        let [header, body, footer] = self.outer.areas(area);
        let [left, right] = self.columns.areas(body);
        let [repository, activity] = self.left.areas(left);
        let [host, lower] = self.right.areas(right);
        let [ports, packages] = self.bottom_right.areas(lower);
        SlotAreas {
            header,
            repository,
            activity,
            host,
            ports,
            packages,
            footer,
        }
    }
}
