/// Severity of a single metric, derived from fixed thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Good,
    Warning,
    Critical,
}

impl Severity {
    /// CPU and memory: <50 good, <80 warning, else critical
    pub fn from_percent(pct: f64) -> Self {
        Self::from_thresholds(pct, 50.0, 80.0)
    }

    /// Disk fills up slower than RAM, so it gets wider bands: <70, <90
    pub fn from_disk_percent(pct: f64) -> Self {
        Self::from_thresholds(pct, 70.0, 90.0)
    }

    /// Battery charge is inverted: more is better
    pub fn from_battery_percent(pct: f64) -> Self {
        if pct > 50.0 {
            Self::Good
        } else if pct > 20.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    fn from_thresholds(pct: f64, warn_at: f64, crit_at: f64) -> Self {
        if pct < warn_at {
            Self::Good
        } else if pct < crit_at {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    #[cfg(test)]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Semantic category of a panel, which decides its border color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCategory {
    Info,
    Success,
    Warning,
    Caution,
    Activity,
}

/// Which dashboard slot a panel is drawn into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Header,
    Repository,
    Activity,
    Host,
    Ports,
    Packages,
    Footer,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Self::Header,
        Self::Repository,
        Self::Activity,
        Self::Host,
        Self::Ports,
        Self::Packages,
        Self::Footer,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_and_memory_thresholds() {
        assert_eq!(Severity::from_percent(49.0).label(), "good");
        assert_eq!(Severity::from_percent(50.0).label(), "warning");
        assert_eq!(Severity::from_percent(79.0).label(), "warning");
        assert_eq!(Severity::from_percent(80.0).label(), "critical");
    }

    #[test]
    fn disk_thresholds() {
        assert_eq!(Severity::from_disk_percent(69.0).label(), "good");
        assert_eq!(Severity::from_disk_percent(70.0).label(), "warning");
        assert_eq!(Severity::from_disk_percent(89.0).label(), "warning");
        assert_eq!(Severity::from_disk_percent(90.0).label(), "critical");
    }

    #[test]
    fn battery_thresholds() {
        assert_eq!(Severity::from_battery_percent(51.0), Severity::Good);
        assert_eq!(Severity::from_battery_percent(50.0), Severity::Warning);
        assert_eq!(Severity::from_battery_percent(20.0), Severity::Critical);
    }
}
