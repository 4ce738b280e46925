use crate::collectors::host::{format_uptime, HostSnapshot};
use crate::types::{PanelCategory, Severity};
use crate::ui::common::*;
use crate::ui::panel::Panel;

pub fn build(host: &HostSnapshot) -> Panel {
    let mut panel = Panel::key_value("SYSTEM", PanelCategory::Success);

    let os = &host.os;
    panel.push_kv(
        "Host",
        vec![colored(os.user.clone(), COLOR_INFO), dim("@"), plain(os.hostname.clone())],
    );
    panel.push_kv("OS", vec![plain(format!("{} {}", os.system_name, os.release))]);
    panel.push_kv("Runtime", vec![plain(os.runtime_version.clone())]);
    panel.push_kv("Uptime", vec![plain(format_uptime(host.uptime))]);
    panel.push_kv("", Vec::new());

    panel.push_kv(
        "CPU",
        vec![
            severity_span(
                format!("{:.1}%", host.cpu_percent),
                Severity::from_percent(host.cpu_percent),
            ),
            dim(format!(" ({} cores)", host.cores.logical)),
        ],
    );
    panel.push_kv(
        "RAM",
        vec![
            severity_span(
                format!("{:.1}%", host.memory.percent),
                Severity::from_percent(host.memory.percent),
            ),
            plain(format!(
                " ({:.1}GB / {:.1}GB)",
                host.memory.used_gb, host.memory.total_gb
            )),
        ],
    );
    panel.push_kv(
        "Disk",
        vec![
            severity_span(
                format!("{:.1}%", host.disk.percent),
                Severity::from_disk_percent(host.disk.percent),
            ),
            plain(format!(" ({:.0}GB free)", host.disk.free_gb)),
        ],
    );
    panel.push_kv("Processes", vec![plain(host.process_count.to_string())]);

    let load = host.load_average;
    panel.push_kv(
        "Load",
        vec![plain(format!("{:.2} {:.2} {:.2}", load.one, load.five, load.fifteen))],
    );
    panel.push_kv(
        "Network",
        vec![dim(format!(
            "\u{2191} {:.0}MB  \u{2193} {:.0}MB",
            host.network.sent_mb, host.network.received_mb
        ))],
    );

    if let Some(battery) = host.battery {
        let key = if battery.is_plugged { "Battery (AC)" } else { "Battery" };
        panel.push_kv(
            key,
            vec![severity_span(
                format!("{:.0}%", battery.percent),
                Severity::from_battery_percent(battery.percent),
            )],
        );
    }

    panel
}
