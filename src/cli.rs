use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// DevDash: live terminal dashboard for the project you are working in
#[derive(Parser, Debug)]
#[command(name = "devdash")]
#[command(author, version, about = "DevDash: git, host, port and dependency status at a glance")]
#[command(long_about = "DevDash shows the state of a project and the machine it runs on in \n\
    one terminal screen: repository status, today's commit activity, host \n\
    resources, listening ports and outdated dependencies.\n\n\
    Run without a subcommand to open the live dashboard.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Append diagnostic logs to this file (filter with DEVDASH_LOG)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Filesystem whose usage the host panel reports
    #[arg(long, global = true, value_name = "PATH")]
    pub disk_root: Option<PathBuf>,
}

impl Cli {
    /// The subcommand to run; no subcommand means the dashboard
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Dashboard(DashboardArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Live dashboard of every panel
    Dashboard(DashboardArgs),
    /// Repository status panel
    Git(PathArgs),
    /// Host resources panel
    System,
    /// Listening ports panel
    Ports,
    /// Outdated dependencies panel
    Packages(PathArgs),
    /// One-line host summary
    Info,
    /// Print the version
    Version,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct DashboardArgs {
    /// Project directory (defaults to the current directory)
    #[arg(short, long, value_name = "P")]
    pub path: Option<PathBuf>,

    /// Render a single frame and exit
    #[arg(long)]
    pub once: bool,

    /// Seconds between refreshes in live mode
    #[arg(short, long, value_name = "SECONDS")]
    pub refresh: Option<f64>,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct PathArgs {
    /// Project directory (defaults to the current directory)
    #[arg(short, long, value_name = "P")]
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("devdash").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        assert_eq!(parse(&[]).command_or_default(), Command::Dashboard(DashboardArgs::default()));
    }

    #[test]
    fn dashboard_flags() {
        let cli = parse(&["dashboard", "--path", "/tmp", "--once", "--refresh", "0.5"]);
        assert_eq!(
            cli.command_or_default(),
            Command::Dashboard(DashboardArgs {
                path: Some(PathBuf::from("/tmp")),
                once: true,
                refresh: Some(0.5),
            })
        );
        let short = parse(&["dashboard", "-p", "/tmp", "--once", "-r", "3"]);
        assert_eq!(
            short.command_or_default(),
            Command::Dashboard(DashboardArgs {
                path: Some(PathBuf::from("/tmp")),
                once: true,
                refresh: Some(3.0),
            })
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["ports", "--log-file", "/tmp/devdash.log", "--disk-root", "/home"]);
        assert_eq!(cli.command_or_default(), Command::Ports);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/devdash.log")));
        assert_eq!(cli.disk_root, Some(PathBuf::from("/home")));
    }

    #[test]
    fn single_panel_commands() {
        assert_eq!(
            parse(&["git", "-p", "repo"]).command_or_default(),
            Command::Git(PathArgs {
                path: Some(PathBuf::from("repo"))
            })
        );
        assert_eq!(parse(&["packages"]).command_or_default(), Command::Packages(PathArgs::default()));
        assert_eq!(parse(&["system"]).command_or_default(), Command::System);
        assert_eq!(parse(&["info"]).command_or_default(), Command::Info);
        assert_eq!(parse(&["version"]).command_or_default(), Command::Version);
    }

    #[test]
    fn bad_refresh_rejected_by_parser() {
        assert!(Cli::try_parse_from(["devdash", "dashboard", "--refresh", "soon"]).is_err());
        assert!(Cli::try_parse_from(["devdash", "bogus"]).is_err());
    }
}
