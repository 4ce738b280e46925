use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::command::ExternalCommand;
use crate::error::CollectError;

/// Package managers can hit the network; give them longer than other tools
const OUTDATED_TIMEOUT: Duration = Duration::from_secs(30);
/// Most entries a snapshot keeps
pub const MAX_OUTDATED: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Node,
    PythonPip,
    PythonPoetry,
    Rust,
    Go,
    Ruby,
    Php,
}

impl ProjectType {
    /// Detection order; the first marker present wins
    pub const PRECEDENCE: [ProjectType; 7] = [
        Self::Node,
        Self::PythonPip,
        Self::PythonPoetry,
        Self::Rust,
        Self::Go,
        Self::Ruby,
        Self::Php,
    ];

    pub fn marker_file(&self) -> &'static str {
        match self {
            Self::Node => "package.json",
            Self::PythonPip => "requirements.txt",
            Self::PythonPoetry => "pyproject.toml",
            Self::Rust => "Cargo.toml",
            Self::Go => "go.mod",
            Self::Ruby => "Gemfile",
            Self::Php => "composer.json",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::PythonPip => "python-pip",
            Self::PythonPoetry => "python-poetry",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Ruby => "ruby",
            Self::Php => "php",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedPackage {
    pub name: String,
    pub current_version: String,
    pub wanted_version: String,
    pub latest_version: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyCounts {
    pub dependencies: usize,
    pub dev_dependencies: usize,
}

/// A named script from the project manifest (`npm run <name>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectScript {
    pub name: String,
    pub command: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSnapshot {
    pub project_type: Option<ProjectType>,
    pub outdated: Vec<OutdatedPackage>,
    pub dependency_counts: DependencyCounts,
    pub scripts: Vec<ProjectScript>,
}

pub fn detect_project_type(path: &Path) -> Option<ProjectType> {
    ProjectType::PRECEDENCE
        .into_iter()
        .find(|t| path.join(t.marker_file()).is_file())
}

/// Detect the project and, where supported, ask its package manager what is
/// outdated. Failures leave the list empty.
pub async fn snapshot(path: &Path) -> PackageSnapshot {
    let project_type = detect_project_type(path);
    let outdated = match project_type {
        Some(ProjectType::Node) => node_outdated(path).await,
        Some(ProjectType::PythonPip | ProjectType::PythonPoetry) => python_outdated(path).await,
        _ => Vec::new(),
    };
    let (dependency_counts, scripts) = match project_type {
        Some(ProjectType::Node) => (node_dependency_counts(path), project_scripts(path)),
        _ => (DependencyCounts::default(), Vec::new()),
    };
    PackageSnapshot {
        project_type,
        outdated,
        dependency_counts,
        scripts,
    }
}

pub async fn node_outdated(path: &Path) -> Vec<OutdatedPackage> {
    let cmd = ExternalCommand::new("npm")
        .args(["outdated", "--json"])
        .current_dir(path)
        .timeout(OUTDATED_TIMEOUT);
    // npm exits 1 whenever something is outdated, so the status is ignored
    let result = match cmd.output().await {
        Ok(out) => parse_npm_outdated(&out.stdout),
        Err(err) => Err(err),
    };
    result.unwrap_or_else(|err| {
        debug!(error = %err, "npm outdated unavailable");
        Vec::new()
    })
}

pub async fn python_outdated(path: &Path) -> Vec<OutdatedPackage> {
    for program in ["pip", "pip3"] {
        let cmd = ExternalCommand::new(program)
            .args(["list", "--outdated", "--format=json"])
            .current_dir(path)
            .timeout(OUTDATED_TIMEOUT);
        match cmd.output().await {
            Ok(out) => {
                return parse_pip_outdated(&out.stdout).unwrap_or_else(|err| {
                    debug!(program, error = %err, "pip output unusable");
                    Vec::new()
                })
            }
            Err(CollectError::NotFound { .. }) => continue,
            Err(err) => {
                debug!(program, error = %err, "pip list failed");
                return Vec::new();
            }
        }
    }
    Vec::new()
}

#[derive(Debug, Deserialize)]
struct NpmEntry {
    current: Option<String>,
    wanted: Option<String>,
    latest: Option<String>,
}

/// Parse `npm outdated --json`: an object keyed by package name. Workspaces
/// report an array per package; the first element is used.
pub fn parse_npm_outdated(json: &str) -> Result<Vec<OutdatedPackage>, CollectError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(json).map_err(|e| CollectError::parse("npm outdated", e))?;

    let mut packages = Vec::new();
    for (name, value) in raw {
        let value = match value {
            serde_json::Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            other => other,
        };
        let Ok(entry) = serde_json::from_value::<NpmEntry>(value) else {
            continue;
        };
        packages.push(OutdatedPackage {
            name,
            current_version: entry.current.unwrap_or_else(|| "?".into()),
            wanted_version: entry.wanted.unwrap_or_else(|| "?".into()),
            latest_version: entry.latest.unwrap_or_else(|| "?".into()),
        });
        if packages.len() == MAX_OUTDATED {
            break;
        }
    }
    Ok(packages)
}

#[derive(Debug, Deserialize)]
struct PipEntry {
    name: Option<String>,
    version: Option<String>,
    latest_version: Option<String>,
}

/// Parse `pip list --outdated --format=json`: an array of objects
pub fn parse_pip_outdated(json: &str) -> Result<Vec<OutdatedPackage>, CollectError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<PipEntry> =
        serde_json::from_str(json).map_err(|e| CollectError::parse("pip list", e))?;
    Ok(raw
        .into_iter()
        .take(MAX_OUTDATED)
        .map(|p| {
            let latest = p.latest_version.unwrap_or_else(|| "?".into());
            OutdatedPackage {
                name: p.name.unwrap_or_else(|| "?".into()),
                current_version: p.version.unwrap_or_else(|| "?".into()),
                wanted_version: latest.clone(),
                latest_version: latest,
            }
        })
        .collect())
}

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    scripts: BTreeMap<String, serde_json::Value>,
}

fn read_manifest(path: &Path) -> Option<PackageManifest> {
    let manifest = std::fs::read_to_string(path.join("package.json"))
        .map_err(CollectError::from)
        .and_then(|text| {
            serde_json::from_str::<PackageManifest>(&text).map_err(|e| CollectError::parse("package.json", e))
        });
    match manifest {
        Ok(m) => Some(m),
        Err(err) => {
            debug!(error = %err, "package.json unreadable");
            None
        }
    }
}

/// Count declared dependencies in `package.json`
pub fn node_dependency_counts(path: &Path) -> DependencyCounts {
    read_manifest(path)
        .map(|m| DependencyCounts {
            dependencies: m.dependencies.len(),
            dev_dependencies: m.dev_dependencies.len(),
        })
        .unwrap_or_default()
}

/// Scripts declared in `package.json`, by name. Non-string entries are skipped.
pub fn project_scripts(path: &Path) -> Vec<ProjectScript> {
    let Some(manifest) = read_manifest(path) else {
        return Vec::new();
    };
    manifest
        .scripts
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::String(command) => Some(ProjectScript { name, command }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str, contents: &str) {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn no_marker_means_no_project() {
        let dir = TempDir::new().unwrap();
        assert_eq!(detect_project_type(dir.path()), None);
    }

    #[test]
    fn node_wins_over_python() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "requirements.txt", "requests\n");
        touch(&dir, "package.json", "{}");
        assert_eq!(detect_project_type(dir.path()), Some(ProjectType::Node));
    }

    #[test]
    fn precedence_below_node() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "go.mod", "module x\n");
        touch(&dir, "Cargo.toml", "[package]\n");
        assert_eq!(detect_project_type(dir.path()), Some(ProjectType::Rust));

        let dir = TempDir::new().unwrap();
        touch(&dir, "pyproject.toml", "");
        touch(&dir, "requirements.txt", "");
        assert_eq!(detect_project_type(dir.path()), Some(ProjectType::PythonPip));
    }

    #[test]
    fn npm_json_parsed() {
        let json = r#"{
            "react": {"current": "17.0.2", "wanted": "17.0.2", "latest": "18.3.1", "location": "node_modules/react"},
            "lodash": {"current": "4.17.20", "wanted": "4.17.21", "latest": "4.17.21"}
        }"#;
        let pkgs = parse_npm_outdated(json).unwrap();
        assert_eq!(pkgs.len(), 2);
        // Keys come back sorted
        assert_eq!(pkgs[0].name, "lodash");
        assert_eq!(pkgs[0].wanted_version, "4.17.21");
        assert_eq!(pkgs[1].latest_version, "18.3.1");
    }

    #[test]
    fn npm_missing_current_and_workspace_arrays() {
        let json = r#"{"a": {"wanted": "1.0.0", "latest": "2.0.0"}, "b": [{"current": "1", "wanted": "1", "latest": "3"}]}"#;
        let pkgs = parse_npm_outdated(json).unwrap();
        assert_eq!(pkgs[0].current_version, "?");
        assert_eq!(pkgs[1].latest_version, "3");
    }

    #[test]
    fn npm_output_capped() {
        let body: Vec<String> = (0..25)
            .map(|i| format!(r#""pkg{:02}": {{"current": "1", "wanted": "1", "latest": "2"}}"#, i))
            .collect();
        let json = format!("{{{}}}", body.join(","));
        assert_eq!(parse_npm_outdated(&json).unwrap().len(), MAX_OUTDATED);
    }

    #[test]
    fn malformed_output_is_error() {
        assert!(parse_npm_outdated("npm ERR! something").is_err());
        assert!(parse_pip_outdated("{not json").is_err());
        assert!(parse_npm_outdated("").unwrap().is_empty());
    }

    #[test]
    fn pip_json_parsed() {
        let json = r#"[{"name": "requests", "version": "2.25.0", "latest_version": "2.32.3", "latest_filetype": "wheel"}]"#;
        let pkgs = parse_pip_outdated(json).unwrap();
        assert_eq!(
            pkgs,
            vec![OutdatedPackage {
                name: "requests".into(),
                current_version: "2.25.0".into(),
                wanted_version: "2.32.3".into(),
                latest_version: "2.32.3".into(),
            }]
        );
    }

    #[test]
    fn manifest_dependency_counts() {
        let dir = TempDir::new().unwrap();
        touch(
            &dir,
            "package.json",
            r#"{"dependencies": {"a": "1", "b": "2"}, "devDependencies": {"c": "3"}}"#,
        );
        assert_eq!(
            node_dependency_counts(dir.path()),
            DependencyCounts {
                dependencies: 2,
                dev_dependencies: 1
            }
        );
        touch(&dir, "package.json", "not json");
        assert_eq!(node_dependency_counts(dir.path()), DependencyCounts::default());
    }

    #[test]
    fn manifest_scripts() {
        let dir = TempDir::new().unwrap();
        touch(
            &dir,
            "package.json",
            r#"{"scripts": {"test": "jest", "build": "vite build", "odd": 3}}"#,
        );
        assert_eq!(
            project_scripts(dir.path()),
            vec![
                ProjectScript {
                    name: "build".into(),
                    command: "vite build".into()
                },
                ProjectScript {
                    name: "test".into(),
                    command: "jest".into()
                },
            ]
        );

        let empty = TempDir::new().unwrap();
        assert!(project_scripts(empty.path()).is_empty());
    }

    #[tokio::test]
    async fn unsupported_ecosystem_has_empty_list() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "go.mod", "module example.com/x\n");
        let snap = snapshot(dir.path()).await;
        assert_eq!(snap.project_type, Some(ProjectType::Go));
        assert!(snap.outdated.is_empty());
    }

    #[tokio::test]
    async fn empty_directory_snapshot() {
        let dir = TempDir::new().unwrap();
        assert_eq!(snapshot(dir.path()).await, PackageSnapshot::default());
    }
}
