pub mod bottom_bar;
pub mod common;
pub mod header_bar;
pub mod layout;
pub mod output;
pub mod panel;
pub mod panels;

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use crate::collectors::DashboardFrame;
use crate::types::Slot;
use layout::DashboardLayout;

/// The whole dashboard for one frame
pub struct DashboardView<'a> {
    pub layout: &'a DashboardLayout,
    pub frame: &'a DashboardFrame,
    /// Live refresh interval shown in the footer
    pub refresh: Option<Duration>,
}

impl Widget for DashboardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let areas = self.layout.split(area);
        let data = self.frame;
        for slot in Slot::ALL {
            let rect = areas.get(slot);
            if rect.is_empty() {
                continue;
            }
            match slot {
                Slot::Header => header_bar::render(
                    rect,
                    buf,
                    &data.repository.repo_name,
                    data.captured_at,
                ),
                Slot::Repository => panels::repository::build(&data.repository).render(rect, buf),
                Slot::Activity => panels::activity::build(&data.repository).render(rect, buf),
                Slot::Host => panels::host::build(&data.host).render(rect, buf),
                Slot::Ports => panels::ports::build(&data.ports).render(rect, buf),
                Slot::Packages => panels::packages::build(&data.packages).render(rect, buf),
                Slot::Footer => bottom_bar::render(rect, buf, self.refresh),
            }
        }
    }
}
