use ratatui::layout::Constraint;

use crate::collectors::packages::PackageSnapshot;
use crate::types::PanelCategory;
use crate::ui::common::*;
use crate::ui::panel::Panel;

pub const MAX_ROWS: usize = 5;

pub fn build(packages: &PackageSnapshot) -> Panel {
    build_with_limit(packages, MAX_ROWS)
}

pub fn build_with_limit(packages: &PackageSnapshot, limit: usize) -> Panel {
    let title = match packages.project_type {
        Some(kind) => {
            let counts = packages.dependency_counts;
            if counts.dependencies + counts.dev_dependencies > 0 {
                format!(
                    "PACKAGES: {} ({} deps, {} dev)",
                    kind.label(),
                    counts.dependencies,
                    counts.dev_dependencies
                )
            } else {
                format!("PACKAGES: {}", kind.label())
            }
        }
        None => "PACKAGES".to_string(),
    };
    let mut panel = Panel::table(
        title,
        PanelCategory::Caution,
        vec!["Package", "Current", "Latest"],
        vec![Constraint::Min(12), Constraint::Length(10), Constraint::Length(10)],
    );

    if packages.project_type.is_none() {
        panel.push_row(vec![dim("-"), plain("No package"), plain("manager found")]);
        return panel;
    }
    if packages.outdated.is_empty() {
        panel.push_row(vec![colored("\u{2713}", COLOR_GOOD), plain("All packages"), plain("up to date")]);
        return panel;
    }

    for pkg in packages.outdated.iter().take(limit) {
        panel.push_row(vec![
            plain(truncate_str(&pkg.name, 20)),
            colored(pkg.current_version.clone(), COLOR_CRIT),
            colored(pkg.latest_version.clone(), COLOR_GOOD),
        ]);
    }
    panel
}

/// Manifest scripts, when the project declares any
pub fn build_scripts(packages: &PackageSnapshot) -> Option<Panel> {
    if packages.scripts.is_empty() {
        return None;
    }
    let mut panel = Panel::key_value("SCRIPTS", PanelCategory::Caution);
    for script in &packages.scripts {
        panel.push_kv(
            truncate_str(&script.name, 15),
            vec![dim(truncate_str(&script.command, 60))],
        );
    }
    Some(panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::packages::{DependencyCounts, OutdatedPackage, ProjectScript, ProjectType};

    fn outdated(n: usize) -> Vec<OutdatedPackage> {
        (0..n)
            .map(|i| OutdatedPackage {
                name: format!("pkg{}", i),
                current_version: "1.0.0".into(),
                wanted_version: "1.0.1".into(),
                latest_version: "2.0.0".into(),
            })
            .collect()
    }

    #[test]
    fn no_project_placeholder() {
        let panel = build(&PackageSnapshot::default());
        assert_eq!(panel.title, "PACKAGES");
        assert_eq!(panel.table_text()[0][1], "No package");
    }

    #[test]
    fn up_to_date_placeholder() {
        let snap = PackageSnapshot {
            project_type: Some(ProjectType::Rust),
            ..Default::default()
        };
        let panel = build(&snap);
        assert_eq!(panel.title, "PACKAGES: rust");
        assert_eq!(panel.table_text()[0][1], "All packages");
    }

    #[test]
    fn outdated_rows_capped_for_display() {
        let snap = PackageSnapshot {
            project_type: Some(ProjectType::Node),
            outdated: outdated(10),
            dependency_counts: DependencyCounts {
                dependencies: 12,
                dev_dependencies: 4,
            },
            scripts: Vec::new(),
        };
        let panel = build(&snap);
        assert!(panel.title.contains("12 deps, 4 dev"));
        let rows = panel.table_text();
        assert_eq!(rows.len(), MAX_ROWS);
        assert_eq!(rows[0], vec!["pkg0".to_string(), "1.0.0".into(), "2.0.0".into()]);
    }

    #[test]
    fn scripts_panel_only_when_declared() {
        assert!(build_scripts(&PackageSnapshot::default()).is_none());

        let snap = PackageSnapshot {
            project_type: Some(ProjectType::Node),
            scripts: vec![ProjectScript {
                name: "dev".into(),
                command: "vite".into(),
            }],
            ..Default::default()
        };
        let panel = build_scripts(&snap).unwrap();
        assert_eq!(panel.title, "SCRIPTS");
        assert_eq!(panel.value_text("dev").unwrap(), "vite");
    }
}
