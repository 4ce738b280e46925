use std::collections::HashSet;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use super::command::ExternalCommand;
use crate::error::CollectError;

/// Bound for a single reachability check
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const LISTING_TIMEOUT: Duration = Duration::from_secs(5);

pub const UNKNOWN: &str = "Unknown";
pub const DEV_PORTS: [u16; 6] = [3000, 3001, 5000, 5173, 8000, 8080];
pub const DB_PORTS: [u16; 4] = [3306, 5432, 6379, 27017];

/// Human name for ports developers commonly run things on
pub fn well_known_service(port: u16) -> Option<&'static str> {
    let name = match port {
        22 => "SSH",
        80 => "HTTP",
        443 => "HTTPS",
        3000 => "Node/React",
        3001 => "Node Dev",
        3306 => "MySQL",
        5000 => "Flask/Python",
        5432 => "PostgreSQL",
        5173 => "Vite",
        6379 => "Redis",
        8000 => "Django/FastAPI",
        8080 => "HTTP Alt",
        8888 => "Jupyter",
        9000 => "PHP-FPM",
        27017 => "MongoDB",
        _ => return None,
    };
    Some(name)
}

fn service_label(port: u16, process_name: &str) -> String {
    match well_known_service(port) {
        Some(name) => name.to_string(),
        None if !process_name.is_empty() && process_name != UNKNOWN => process_name.to_string(),
        None => UNKNOWN.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    pub port: u16,
    pub process_name: String,
    pub pid: Option<u32>,
    pub service_label: String,
    pub address: String,
}

impl PortEntry {
    pub fn new(port: u16, address: impl Into<String>, pid: Option<u32>, process_name: Option<String>) -> Self {
        let process_name = process_name.unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            port,
            service_label: service_label(port, &process_name),
            process_name,
            pid,
            address: address.into(),
        }
    }
}

/// Listening ports, one entry per port, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSnapshot {
    pub entries: Vec<PortEntry>,
}

impl PortSnapshot {
    /// Deduplicate by port (first occurrence wins) and sort ascending
    pub fn from_entries(entries: impl IntoIterator<Item = PortEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut entries: Vec<PortEntry> = entries
            .into_iter()
            .filter(|e| e.port != 0 && seen.insert(e.port))
            .collect();
        entries.sort_by_key(|e| e.port);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> PortSummary {
        PortSummary {
            total: self.entries.len(),
            dev_ports: self.entries.iter().filter(|e| DEV_PORTS.contains(&e.port)).count(),
            db_ports: self.entries.iter().filter(|e| DB_PORTS.contains(&e.port)).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortSummary {
    pub total: usize,
    pub dev_ports: usize,
    pub db_ports: usize,
}

/// Enumerate listening TCP sockets. Uses the system socket table when it can
/// be read, otherwise the platform listing tool.
pub async fn listening_ports() -> PortSnapshot {
    let primary = tokio::task::spawn_blocking(enumerate_listeners).await;
    match primary {
        Ok(Ok(entries)) => PortSnapshot::from_entries(entries),
        Ok(Err(err)) => {
            debug!(error = %err, "socket table unavailable, using listing tool");
            listening_ports_fallback().await
        }
        Err(err) => {
            debug!(error = %err, "socket enumeration task failed");
            listening_ports_fallback().await
        }
    }
}

/// Shell out to `ss` / `lsof` / `netstat` and parse LISTEN lines
pub async fn listening_ports_fallback() -> PortSnapshot {
    let Some(cmd) = listing_command() else {
        return PortSnapshot::default();
    };
    match cmd.output().await {
        Ok(out) => PortSnapshot::from_entries(parse_listing(&out.stdout)),
        Err(err) => {
            debug!(program = cmd.program(), error = %err, "port listing failed");
            PortSnapshot::default()
        }
    }
}

fn listing_command() -> Option<ExternalCommand> {
    let cmd = if cfg!(target_os = "linux") {
        ExternalCommand::new("ss").args(["-tlnp"])
    } else if cfg!(target_os = "macos") {
        ExternalCommand::new("lsof").args(["-iTCP", "-sTCP:LISTEN", "-n", "-P"])
    } else if cfg!(windows) {
        ExternalCommand::new("netstat").args(["-ano"])
    } else {
        return None;
    };
    Some(cmd.timeout(LISTING_TIMEOUT))
}

/// Parse listing-tool output. Only lines with a LISTEN marker count; the
/// first `addr:port` token on the line is the local endpoint.
pub fn parse_listing(output: &str) -> Vec<PortEntry> {
    output
        .lines()
        .filter(|line| line.contains("LISTEN"))
        .filter_map(|line| {
            line.split_whitespace()
                .filter(|token| token.contains(':'))
                .find_map(split_host_port)
        })
        .map(|(address, port)| PortEntry::new(port, address, None, None))
        .collect()
}

fn split_host_port(token: &str) -> Option<(String, u16)> {
    let (host, port) = token.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;
    if port == 0 {
        return None;
    }
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = if host.is_empty() { "*" } else { host };
    Some((host.to_string(), port))
}

#[cfg(target_os = "linux")]
fn enumerate_listeners() -> Result<Vec<PortEntry>, CollectError> {
    linux::enumerate()
}

#[cfg(not(target_os = "linux"))]
fn enumerate_listeners() -> Result<Vec<PortEntry>, CollectError> {
    Err(CollectError::Unsupported {
        what: "socket table",
    })
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
mod linux {
    use std::collections::HashMap;
    use std::fs;
    use std::io::ErrorKind;
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::PortEntry;
    use crate::error::CollectError;

    const TCP_LISTEN: &str = "0A";

    /// A row of /proc/net/tcp{,6} in LISTEN state
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RawListener {
        pub address: String,
        pub port: u16,
        pub inode: u64,
    }

    pub fn enumerate() -> Result<Vec<PortEntry>, CollectError> {
        let mut listeners = Vec::new();
        for (path, v6) in [("/proc/net/tcp", false), ("/proc/net/tcp6", true)] {
            match fs::read_to_string(path) {
                Ok(table) => listeners.extend(parse_socket_table(&table, v6)),
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    return Err(CollectError::PermissionDenied { what: path.into() })
                }
                // tcp6 is missing when IPv6 is disabled
                Err(_) if v6 => {}
                Err(e) => return Err(e.into()),
            }
        }

        let owners = socket_owners();
        Ok(listeners
            .into_iter()
            .map(|l| {
                let pid = owners.get(&l.inode).copied();
                let name = pid.and_then(process_name);
                PortEntry::new(l.port, l.address, pid, name)
            })
            .collect())
    }

    /// Parse the kernel socket table, keeping LISTEN rows
    pub fn parse_socket_table(table: &str, v6: bool) -> Vec<RawListener> {
        table
            .lines()
            .skip(1)
            .filter_map(|line| {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < 10 || fields[3] != TCP_LISTEN {
                    return None;
                }
                let (addr_hex, port_hex) = fields[1].split_once(':')?;
                let port = u16::from_str_radix(port_hex, 16).ok()?;
                let address = if v6 { decode_v6(addr_hex)? } else { decode_v4(addr_hex)? };
                let inode = fields[9].parse().ok()?;
                Some(RawListener { address, port, inode })
            })
            .collect()
    }

    // Addresses are printed as host-order u32 words
    fn decode_v4(hex: &str) -> Option<String> {
        let raw = u32::from_str_radix(hex, 16).ok()?;
        Some(Ipv4Addr::from(raw.to_le_bytes()).to_string())
    }

    fn decode_v6(hex: &str) -> Option<String> {
        if hex.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 16];
        for word in 0..4 {
            let raw = u32::from_str_radix(&hex[word * 8..word * 8 + 8], 16).ok()?;
            bytes[word * 4..word * 4 + 4].copy_from_slice(&raw.to_le_bytes());
        }
        Some(Ipv6Addr::from(bytes).to_string())
    }

    /// Map socket inode -> owning pid. Processes we may not inspect are skipped.
    fn socket_owners() -> HashMap<u64, u32> {
        let mut owners = HashMap::new();
        let Ok(procs) = fs::read_dir("/proc") else {
            return owners;
        };
        for entry in procs.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            let Ok(fds) = fs::read_dir(entry.path().join("fd")) else {
                continue;
            };
            for fd in fds.flatten() {
                if let Some(inode) = fs::read_link(fd.path())
                    .ok()
                    .and_then(|target| parse_socket_link(&target.to_string_lossy()))
                {
                    owners.entry(inode).or_insert(pid);
                }
            }
        }
        owners
    }

    /// "socket:[12345]" -> 12345
    pub fn parse_socket_link(target: &str) -> Option<u64> {
        target.strip_prefix("socket:[")?.strip_suffix(']')?.parse().ok()
    }

    fn process_name(pid: u32) -> Option<String> {
        fs::read_to_string(format!("/proc/{}/comm", pid))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Whether something accepts TCP connections on `host:port` within `timeout`
pub fn check_port_reachable(host: &str, port: u16, timeout: Duration) -> bool {
    let addrs: Vec<SocketAddr> = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs.collect(),
        Err(err) => {
            debug!(host, port, error = %err, "could not resolve host");
            return false;
        }
    };
    addrs
        .iter()
        .any(|addr| TcpStream::connect_timeout(addr, timeout).is_ok())
}

/// First port in `start..end` with nothing listening on localhost
pub fn find_free_port(start: u16, end: u16) -> Option<u16> {
    (start..end).find(|&port| !check_port_reachable("127.0.0.1", port, CONNECT_TIMEOUT))
}
