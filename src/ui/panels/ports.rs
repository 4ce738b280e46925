use ratatui::layout::Constraint;

use crate::collectors::ports::PortSnapshot;
use crate::types::PanelCategory;
use crate::ui::common::*;
use crate::ui::panel::Panel;

/// Rows shown in the dashboard slot
pub const MAX_ROWS: usize = 8;

pub fn build(ports: &PortSnapshot) -> Panel {
    build_with_limit(ports, MAX_ROWS)
}

pub fn build_with_limit(ports: &PortSnapshot, limit: usize) -> Panel {
    let summary = ports.summary();
    let title = format!(
        "PORTS ({} listening, {} dev, {} db)",
        summary.total, summary.dev_ports, summary.db_ports
    );
    let mut panel = Panel::table(
        title,
        PanelCategory::Warning,
        vec!["Port", "Service", "Process"],
        vec![Constraint::Length(6), Constraint::Min(10), Constraint::Length(15)],
    );

    if ports.is_empty() {
        panel.push_row(vec![dim("-"), plain("No active ports"), dim("")]);
        return panel;
    }

    for entry in ports.entries.iter().take(limit) {
        panel.push_row(vec![
            colored(format!("{:>5}", entry.port), COLOR_INFO),
            plain(entry.service_label.clone()),
            dim(truncate_str(&entry.process_name, 15)),
        ]);
    }
    panel
}
