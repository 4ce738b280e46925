use std::path::{Path, PathBuf};
use std::time::Duration;

use sysinfo::{Disks, Networks, System};
use tracing::{debug, info};

/// CPU usage is the delta between two refreshes this far apart
pub const CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageStats {
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub percent: f64,
}

impl UsageStats {
    pub fn from_bytes(total: u64, used: u64, free: u64) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            (used as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
        };
        Self {
            total_gb: total as f64 / GIB,
            used_gb: used as f64 / GIB,
            free_gb: free as f64 / GIB,
            percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsInfo {
    pub hostname: String,
    pub user: String,
    pub system_name: String,
    pub release: String,
    pub version: String,
    pub arch: String,
    pub runtime_version: String,
}

impl Default for OsInfo {
    fn default() -> Self {
        Self {
            hostname: "Unknown".into(),
            user: current_user(),
            system_name: "Unknown".into(),
            release: "Unknown".into(),
            version: "Unknown".into(),
            arch: std::env::consts::ARCH.to_string(),
            runtime_version: runtime_version().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryStatus {
    pub percent: f64,
    pub is_plugged: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreCounts {
    pub physical: usize,
    pub logical: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetworkIo {
    pub sent_mb: f64,
    pub received_mb: f64,
}

/// Host resource snapshot for one refresh cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostSnapshot {
    pub cpu_percent: f64,
    pub memory: UsageStats,
    pub disk: UsageStats,
    pub os: OsInfo,
    pub uptime: Duration,
    pub process_count: usize,
    pub battery: Option<BatteryStatus>,
    pub cores: CoreCounts,
    pub load_average: LoadAverage,
    pub network: NetworkIo,
}

/// Source of host metrics. Implementations never fail: a metric the platform
/// cannot provide comes back as zero or `None`.
pub trait HostSampler: Send {
    /// Short backend name for logs
    fn name(&self) -> &'static str;
    /// Take one CPU reading; usage is derived from consecutive readings
    fn refresh_cpu(&mut self);
    fn cpu_percent(&self) -> f64;
    fn memory(&mut self) -> UsageStats;
    fn disk(&self, root: &Path) -> UsageStats;
    fn os_info(&self) -> OsInfo;
    fn uptime(&self) -> Duration;
    fn process_count(&mut self) -> usize;
    fn battery(&self) -> Option<BatteryStatus>;
    fn core_counts(&self) -> CoreCounts;
    fn load_average(&self) -> LoadAverage;
    fn network_io(&self) -> NetworkIo;
}

/// Full-featured backend over `sysinfo`
pub struct SysinfoSampler {
    sys: System,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSampler for SysinfoSampler {
    fn name(&self) -> &'static str {
        "sysinfo"
    }

    fn refresh_cpu(&mut self) {
        self.sys.refresh_cpu_usage();
    }

    fn cpu_percent(&self) -> f64 {
        (self.sys.global_cpu_usage() as f64).clamp(0.0, 100.0)
    }

    fn memory(&mut self) -> UsageStats {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        let available = self.sys.available_memory();
        UsageStats::from_bytes(total, total.saturating_sub(available), available)
    }

    fn disk(&self, root: &Path) -> UsageStats {
        let disks = Disks::new_with_refreshed_list();
        // The mount point that is the longest prefix of `root` holds it
        let disk = disks
            .iter()
            .filter(|d| root.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len());

        match disk {
            Some(d) => {
                let total = d.total_space();
                let available = d.available_space();
                UsageStats::from_bytes(total, total.saturating_sub(available), available)
            }
            None => {
                debug!(root = %root.display(), "no disk mounted at root");
                UsageStats::default()
            }
        }
    }

    fn os_info(&self) -> OsInfo {
        OsInfo {
            hostname: System::host_name().unwrap_or_else(|| "Unknown".into()),
            user: current_user(),
            system_name: System::name().unwrap_or_else(|| "Unknown".into()),
            release: System::kernel_version().unwrap_or_else(|| "Unknown".into()),
            version: System::os_version().unwrap_or_else(|| "Unknown".into()),
            arch: std::env::consts::ARCH.to_string(),
            runtime_version: runtime_version().to_string(),
        }
    }

    fn uptime(&self) -> Duration {
        Duration::from_secs(System::uptime())
    }

    fn process_count(&mut self) -> usize {
        self.sys.refresh_all();
        self.sys.processes().len()
    }

    fn battery(&self) -> Option<BatteryStatus> {
        read_battery()
    }

    fn core_counts(&self) -> CoreCounts {
        CoreCounts {
            physical: self.sys.physical_core_count().unwrap_or(0),
            logical: self.sys.cpus().len(),
        }
    }

    fn load_average(&self) -> LoadAverage {
        // Windows has no load average; sysinfo reports zeros there
        let load = System::load_average();
        LoadAverage {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        }
    }

    fn network_io(&self) -> NetworkIo {
        let networks = Networks::new_with_refreshed_list();
        let (sent, received) = networks.iter().fold((0u64, 0u64), |(tx, rx), (_, data)| {
            (tx + data.total_transmitted(), rx + data.total_received())
        });
        NetworkIo {
            sent_mb: sent as f64 / MIB,
            received_mb: received as f64 / MIB,
        }
    }
}

/// Degraded backend for platforms `sysinfo` does not support
#[derive(Debug, Default)]
pub struct FallbackSampler;

impl HostSampler for FallbackSampler {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn refresh_cpu(&mut self) {}

    fn cpu_percent(&self) -> f64 {
        0.0
    }

    fn memory(&mut self) -> UsageStats {
        UsageStats::default()
    }

    fn disk(&self, _root: &Path) -> UsageStats {
        UsageStats::default()
    }

    fn os_info(&self) -> OsInfo {
        OsInfo::default()
    }

    fn uptime(&self) -> Duration {
        Duration::ZERO
    }

    fn process_count(&mut self) -> usize {
        0
    }

    fn battery(&self) -> Option<BatteryStatus> {
        None
    }

    fn core_counts(&self) -> CoreCounts {
        CoreCounts::default()
    }

    fn load_average(&self) -> LoadAverage {
        LoadAverage::default()
    }

    fn network_io(&self) -> NetworkIo {
        NetworkIo::default()
    }
}

/// Pick the best sampler this platform supports. Called once at startup.
pub fn detect_sampler() -> Box<dyn HostSampler> {
    let sampler: Box<dyn HostSampler> = if sysinfo::IS_SUPPORTED_SYSTEM {
        Box::new(SysinfoSampler::new())
    } else {
        Box::new(FallbackSampler)
    };
    info!(backend = sampler.name(), "host metrics backend selected");
    sampler
}

/// Host collector: owns the sampler chosen at startup and the disk root to watch
pub struct HostCollector {
    sampler: Box<dyn HostSampler>,
    disk_root: PathBuf,
}

impl HostCollector {
    pub fn new(sampler: Box<dyn HostSampler>, disk_root: impl Into<PathBuf>) -> Self {
        Self {
            sampler,
            disk_root: disk_root.into(),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.sampler.name()
    }

    /// CPU utilization averaged over `CPU_SAMPLE_INTERVAL`
    pub async fn cpu_percent(&mut self) -> f64 {
        self.sampler.refresh_cpu();
        tokio::time::sleep(CPU_SAMPLE_INTERVAL).await;
        self.sampler.refresh_cpu();
        self.sampler.cpu_percent()
    }

    pub async fn snapshot(&mut self) -> HostSnapshot {
        let cpu_percent = self.cpu_percent().await;
        let s = &mut self.sampler;
        HostSnapshot {
            cpu_percent,
            memory: s.memory(),
            disk: s.disk(&self.disk_root),
            os: s.os_info(),
            uptime: s.uptime(),
            process_count: s.process_count(),
            battery: s.battery(),
            cores: s.core_counts(),
            load_average: s.load_average(),
            network: s.network_io(),
        }
    }
}

/// Login name of the user running the dashboard
pub fn current_user() -> String {
    user_from(|key| std::env::var(key).ok())
}

fn user_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "unknown".into())
}

/// Version of the toolchain this binary was built with
pub fn runtime_version() -> &'static str {
    env!("DEVDASH_RUSTC_VERSION")
}

/// Render uptime as "Xd Xh Xm", dropping leading zero units; minutes always shown
pub fn format_uptime(uptime: Duration) -> String {
    let seconds = uptime.as_secs();
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(target_os = "linux")]
fn read_battery() -> Option<BatteryStatus> {
    read_battery_from(Path::new("/sys/class/power_supply"))
}

#[cfg(not(target_os = "linux"))]
fn read_battery() -> Option<BatteryStatus> {
    None
}

/// Read the first `BAT*` supply under a sysfs power_supply directory
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn read_battery_from(dir: &Path) -> Option<BatteryStatus> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    let battery = entries.iter().find(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().starts_with("BAT"))
            .unwrap_or(false)
    })?;
    let percent: f64 = std::fs::read_to_string(battery.join("capacity"))
        .ok()?
        .trim()
        .parse()
        .ok()?;

    // Plugged if any mains adapter reports online, or the battery is charging
    let adapter_online = entries.iter().any(|p| {
        std::fs::read_to_string(p.join("type")).map(|t| t.trim() == "Mains").unwrap_or(false)
            && std::fs::read_to_string(p.join("online")).map(|o| o.trim() == "1").unwrap_or(false)
    });
    let charging = std::fs::read_to_string(battery.join("status"))
        .map(|s| matches!(s.trim(), "Charging" | "Full"))
        .unwrap_or(false);

    Some(BatteryStatus {
        percent: percent.clamp(0.0, 100.0),
        is_plugged: adapter_online || charging,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn uptime_drops_leading_zero_units() {
        assert_eq!(format_uptime(Duration::from_secs(59)), "0m");
        assert_eq!(format_uptime(Duration::from_secs(5 * 60)), "5m");
        assert_eq!(format_uptime(Duration::from_secs(3 * 3600 + 120)), "3h 2m");
        assert_eq!(format_uptime(Duration::from_secs(86400 + 300)), "1d 0h 5m");
    }

    #[test]
    fn user_from_environment() {
        let env = |key: &str| match key {
            "USER" => Some(String::new()),
            "USERNAME" => Some("sam".to_string()),
            _ => None,
        };
        assert_eq!(user_from(env), "sam");
        assert_eq!(user_from(|_| None), "unknown");
    }

    #[test]
    fn usage_percent_from_bytes() {
        let u = UsageStats::from_bytes(200, 50, 150);
        assert_eq!(u.percent, 25.0);
        assert_eq!(UsageStats::from_bytes(0, 0, 0).percent, 0.0);
    }

    #[tokio::test]
    async fn fallback_sampler_reports_zeros() {
        let mut collector = HostCollector::new(Box::new(FallbackSampler), "/");
        let snap = collector.snapshot().await;
        assert_eq!(collector.backend(), "fallback");
        assert_eq!(snap.cpu_percent, 0.0);
        assert_eq!(snap.memory, UsageStats::default());
        assert_eq!(snap.disk, UsageStats::default());
        assert_eq!(snap.process_count, 0);
        assert!(snap.battery.is_none());
        assert_eq!(snap.load_average, LoadAverage::default());
    }

    #[tokio::test]
    async fn sysinfo_snapshot_stays_in_range() {
        let mut collector = HostCollector::new(detect_sampler(), std::env::temp_dir());
        let snap = collector.snapshot().await;
        assert!((0.0..=100.0).contains(&snap.cpu_percent));
        assert!((0.0..=100.0).contains(&snap.memory.percent));
        assert!((0.0..=100.0).contains(&snap.disk.percent));
        assert!(!snap.os.arch.is_empty());
        assert!(!snap.os.hostname.is_empty());
        assert!(!snap.os.user.is_empty());
    }

    #[test]
    fn battery_read_from_sysfs_layout() {
        let dir = TempDir::new().unwrap();
        let bat = dir.path().join("BAT0");
        let ac = dir.path().join("AC");
        std::fs::create_dir_all(&bat).unwrap();
        std::fs::create_dir_all(&ac).unwrap();
        std::fs::write(bat.join("capacity"), "83\n").unwrap();
        std::fs::write(bat.join("status"), "Discharging\n").unwrap();
        std::fs::write(ac.join("type"), "Mains\n").unwrap();
        std::fs::write(ac.join("online"), "1\n").unwrap();

        let status = read_battery_from(dir.path()).unwrap();
        assert_eq!(status.percent, 83.0);
        assert!(status.is_plugged);
    }

    #[test]
    fn no_battery_on_desktops() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("AC")).unwrap();
        assert!(read_battery_from(dir.path()).is_none());
    }
}
