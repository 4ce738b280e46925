pub mod command;
pub mod git;
pub mod host;
pub mod packages;
pub mod ports;

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use git::{GitCollector, RepositorySnapshot};
use host::{HostCollector, HostSnapshot};
use packages::PackageSnapshot;
use ports::PortSnapshot;

/// Everything one render pass needs. Built fresh each cycle, never mutated.
#[derive(Debug, Clone)]
pub struct DashboardFrame {
    pub repository: RepositorySnapshot,
    pub host: HostSnapshot,
    pub ports: PortSnapshot,
    pub packages: PackageSnapshot,
    pub captured_at: DateTime<Local>,
}

impl Default for DashboardFrame {
    fn default() -> Self {
        Self {
            repository: RepositorySnapshot::default(),
            host: HostSnapshot::default(),
            ports: PortSnapshot::default(),
            packages: PackageSnapshot::default(),
            captured_at: Local::now(),
        }
    }
}

/// Anything that can produce a frame per refresh cycle
pub trait FrameSource {
    fn collect(&mut self) -> impl Future<Output = DashboardFrame> + Send;
}

/// The four collectors of the dashboard. Only the repository handle and the
/// chosen host backend outlive a cycle; every snapshot is taken fresh.
pub struct Collectors {
    project_path: PathBuf,
    git: GitCollector,
    host: HostCollector,
}

impl Collectors {
    pub async fn new(project_path: impl AsRef<Path>, disk_root: impl Into<PathBuf>) -> Self {
        let git = GitCollector::open(project_path.as_ref()).await;
        Self {
            project_path: git.path().to_path_buf(),
            git,
            host: HostCollector::new(host::detect_sampler(), disk_root),
        }
    }

    pub fn host_backend(&self) -> &'static str {
        self.host.backend()
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl FrameSource for Collectors {
    fn collect(&mut self) -> impl Future<Output = DashboardFrame> + Send {
        async move {
            let started = std::time::Instant::now();
            // Each collector degrades on its own, so none can hold up the others
            let (repository, host, ports, packages) = tokio::join!(
                self.git.snapshot(),
                self.host.snapshot(),
                ports::listening_ports(),
                packages::snapshot(&self.project_path),
            );
            debug!(elapsed_ms = started.elapsed().as_millis() as u64, "frame collected");
            DashboardFrame {
                repository,
                host,
                ports,
                packages,
                captured_at: Local::now(),
            }
        }
    }
}
