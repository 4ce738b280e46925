use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::DashboardArgs;
use crate::error::{AppError, Result};

pub const DEFAULT_REFRESH: Duration = Duration::from_secs(2);
/// Faster than this and the collectors would run back to back
pub const MIN_REFRESH: Duration = Duration::from_millis(250);

/// Settings for one dashboard run, resolved from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub project_path: PathBuf,
    pub refresh: Duration,
    pub once: bool,
    pub disk_root: PathBuf,
}

impl DashboardConfig {
    pub fn from_args(args: &DashboardArgs, disk_root: Option<&Path>) -> Result<Self> {
        Ok(Self {
            project_path: resolve_project_path(args.path.as_deref())?,
            refresh: refresh_interval(args.refresh)?,
            once: args.once,
            disk_root: resolve_disk_root(disk_root)?,
        })
    }
}

/// Canonical project directory; the current directory when none is given
pub fn resolve_project_path(path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let resolved = path
        .canonicalize()
        .map_err(|e| AppError::invalid_argument(format!("{}: {}", path.display(), e)))?;
    if !resolved.is_dir() {
        return Err(AppError::invalid_argument(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    Ok(resolved)
}

pub fn refresh_interval(seconds: Option<f64>) -> Result<Duration> {
    let Some(secs) = seconds else {
        return Ok(DEFAULT_REFRESH);
    };
    if !secs.is_finite() || secs <= 0.0 {
        return Err(AppError::invalid_argument(format!(
            "refresh interval must be a positive number of seconds, got {}",
            secs
        )));
    }
    Ok(Duration::from_secs_f64(secs).max(MIN_REFRESH))
}

/// Absolute disk root, so it can be matched against mount points
pub fn resolve_disk_root(root: Option<&Path>) -> Result<PathBuf> {
    let Some(root) = root else {
        return Ok(default_disk_root());
    };
    root.canonicalize()
        .map_err(|e| AppError::invalid_argument(format!("--disk-root {}: {}", root.display(), e)))
}

pub fn default_disk_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\")
    } else {
        PathBuf::from("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn refresh_defaults_and_clamps() {
        assert_eq!(refresh_interval(None).unwrap(), DEFAULT_REFRESH);
        assert_eq!(refresh_interval(Some(5.0)).unwrap(), Duration::from_secs(5));
        assert_eq!(refresh_interval(Some(0.01)).unwrap(), MIN_REFRESH);
        assert!(refresh_interval(Some(0.0)).is_err());
        assert!(refresh_interval(Some(-1.0)).is_err());
        assert!(refresh_interval(Some(f64::NAN)).is_err());
    }

    #[test]
    fn project_path_must_be_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        assert_eq!(
            resolve_project_path(Some(dir.path())).unwrap(),
            dir.path().canonicalize().unwrap()
        );
        assert!(resolve_project_path(Some(&file)).is_err());
        assert!(resolve_project_path(Some(&dir.path().join("missing"))).is_err());
    }

    #[test]
    fn config_from_args() {
        let dir = TempDir::new().unwrap();
        let args = DashboardArgs {
            path: Some(dir.path().to_path_buf()),
            once: true,
            refresh: Some(1.5),
        };
        let config = DashboardConfig::from_args(&args, None).unwrap();
        assert!(config.once);
        assert_eq!(config.refresh, Duration::from_millis(1500));
        assert_eq!(config.disk_root, default_disk_root());

        let config = DashboardConfig::from_args(&args, Some(dir.path())).unwrap();
        assert_eq!(config.disk_root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn relative_disk_root_becomes_absolute() {
        let root = resolve_disk_root(Some(Path::new("."))).unwrap();
        assert!(root.is_absolute());
        assert_eq!(root, std::env::current_dir().unwrap().canonicalize().unwrap());
        assert_eq!(resolve_disk_root(None).unwrap(), default_disk_root());
        assert!(resolve_disk_root(Some(Path::new("/definitely/not/here"))).is_err());
    }
}
