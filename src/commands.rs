use std::io::Write;

use tracing::debug;

use crate::app;
use crate::cli::{Cli, Command};
use crate::collectors::git::GitCollector;
use crate::collectors::host::{self, HostCollector};
use crate::collectors::packages::{self, MAX_OUTDATED};
use crate::collectors::ports;
use crate::config::{self, DashboardConfig};
use crate::error::Result;
use crate::ui::output::{self, ColorMode};
use crate::ui::panels::{self, Panel};

/// Dispatch one parsed command line
pub async fn execute(cli: &Cli) -> Result<()> {
    let command = cli.command_or_default();
    debug!(?command, "dispatching");
    match command {
        Command::Dashboard(args) => {
            let config = DashboardConfig::from_args(&args, cli.disk_root.as_deref())?;
            app::run_dashboard(&config).await
        }
        Command::Git(args) => {
            let path = config::resolve_project_path(args.path.as_deref())?;
            let snapshot = GitCollector::open(&path).await.snapshot().await;
            print_panels(&[
                panels::repository::build(&snapshot),
                panels::activity::build(&snapshot),
            ])
        }
        Command::System => {
            let disk_root = config::resolve_disk_root(cli.disk_root.as_deref())?;
            let mut collector = HostCollector::new(host::detect_sampler(), disk_root);
            let snapshot = collector.snapshot().await;
            print_panels(&[panels::host::build(&snapshot)])
        }
        Command::Ports => {
            let snapshot = ports::listening_ports().await;
            print_panels(&[panels::ports::build_with_limit(&snapshot, usize::MAX)])
        }
        Command::Packages(args) => {
            let path = config::resolve_project_path(args.path.as_deref())?;
            let snapshot = packages::snapshot(&path).await;
            let mut shown = vec![panels::packages::build_with_limit(&snapshot, MAX_OUTDATED)];
            shown.extend(panels::packages::build_scripts(&snapshot));
            print_panels(&shown)
        }
        Command::Info => {
            let disk_root = config::resolve_disk_root(cli.disk_root.as_deref())?;
            let mut collector = HostCollector::new(host::detect_sampler(), disk_root);
            let (host_snapshot, port_snapshot) = tokio::join!(collector.snapshot(), ports::listening_ports());
            println!("{}", output::info_line(&host_snapshot, &port_snapshot));
            Ok(())
        }
        Command::Version => {
            println!("devdash {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn print_panels(panels: &[Panel]) -> Result<()> {
    let (width, _) = output::canvas_size();
    let mode = ColorMode::detect();
    let mut stdout = std::io::stdout().lock();
    for panel in panels {
        let buf = output::render_panel(panel, width);
        stdout.write_all(output::buffer_to_string(&buf, mode).as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}
