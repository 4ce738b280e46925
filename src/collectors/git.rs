use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use tracing::debug;

use super::command::ExternalCommand;

/// Sentinel for text fields when no data is available
pub const NOT_AVAILABLE: &str = "N/A";
/// Branch name reported when HEAD is not on a branch
pub const DETACHED: &str = "detached";

const GIT_TIMEOUT: Duration = Duration::from_secs(5);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const SUBJECT_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkingTreeStatus {
    pub modified: u32,
    pub added: u32,
    pub deleted: u32,
    pub untracked: u32,
}

impl WorkingTreeStatus {
    pub fn total(&self) -> u32 {
        self.modified + self.added + self.deleted + self.untracked
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub relative_time: String,
}

impl CommitInfo {
    fn sentinel(message: &str) -> Self {
        Self {
            hash: NOT_AVAILABLE.into(),
            message: message.into(),
            author: NOT_AVAILABLE.into(),
            relative_time: NOT_AVAILABLE.into(),
        }
    }

    pub fn not_available() -> Self {
        Self::sentinel(NOT_AVAILABLE)
    }

    pub fn no_commits() -> Self {
        Self::sentinel("No commits")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub added: u64,
    pub removed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AheadBehind {
    pub ahead: u32,
    pub behind: u32,
}

/// Everything the dashboard shows about the working tree, gathered per cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
    pub is_repo: bool,
    pub repo_name: String,
    pub branch: String,
    pub ahead_behind: AheadBehind,
    pub status: WorkingTreeStatus,
    pub last_commit: CommitInfo,
    pub today_commit_count: u32,
    pub today_line_stats: LineStats,
    pub branches: Vec<String>,
    pub stash_count: u32,
}

impl RepositorySnapshot {
    /// Fully-populated sentinel snapshot for a directory that is not a repository
    pub fn not_a_repository(repo_name: impl Into<String>) -> Self {
        Self {
            is_repo: false,
            repo_name: repo_name.into(),
            branch: NOT_AVAILABLE.into(),
            ahead_behind: AheadBehind::default(),
            status: WorkingTreeStatus::default(),
            last_commit: CommitInfo::not_available(),
            today_commit_count: 0,
            today_line_stats: LineStats::default(),
            branches: Vec::new(),
            stash_count: 0,
        }
    }
}

impl Default for RepositorySnapshot {
    fn default() -> Self {
        Self::not_a_repository(NOT_AVAILABLE)
    }
}

/// Version-control collector for one directory.
///
/// Whether the directory is a repository is decided once in [`GitCollector::open`]
/// and never re-checked. Every accessor degrades to its sentinel on failure.
#[derive(Debug, Clone)]
pub struct GitCollector {
    path: PathBuf,
    is_repo: bool,
}

impl GitCollector {
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = absolute(path.as_ref());
        let is_repo = git(&path, ["rev-parse", "--git-dir"]).stdout().await.is_ok();
        debug!(path = %path.display(), is_repo, "resolved repository");
        Self { path, is_repo }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_repo(&self) -> bool {
        self.is_repo
    }

    async fn run<const N: usize>(&self, args: [&str; N]) -> Option<String> {
        match git(&self.path, args).stdout().await {
            Ok(out) => Some(out.trim_end().to_string()),
            Err(err) => {
                debug!(args = ?args, error = %err, "git query failed");
                None
            }
        }
    }

    pub async fn current_branch(&self) -> String {
        if !self.is_repo {
            return NOT_AVAILABLE.into();
        }
        match self.run(["branch", "--show-current"]).await {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => DETACHED.into(),
        }
    }

    pub async fn working_tree_status(&self) -> WorkingTreeStatus {
        if !self.is_repo {
            return WorkingTreeStatus::default();
        }
        self.run(["status", "--porcelain"])
            .await
            .map(|out| parse_status(&out))
            .unwrap_or_default()
    }

    pub async fn uncommitted_count(&self) -> u32 {
        self.working_tree_status().await.total()
    }

    pub async fn last_commit(&self) -> CommitInfo {
        if !self.is_repo {
            return CommitInfo::not_available();
        }
        match self.run(["log", "-1", "--format=%h|%s|%an|%ar"]).await {
            Some(out) if !out.trim().is_empty() => parse_last_commit(&out),
            _ => CommitInfo::no_commits(),
        }
    }

    /// Commits ahead of / behind the upstream. Fetches first, bounded by
    /// `FETCH_TIMEOUT`; a failed or slow fetch still compares against the
    /// last known remote state.
    pub async fn ahead_behind_upstream(&self) -> AheadBehind {
        if !self.is_repo {
            return AheadBehind::default();
        }
        if self
            .run(["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"])
            .await
            .is_none()
        {
            return AheadBehind::default();
        }

        if let Err(err) = fetch_command(&self.path).stdout().await {
            debug!(error = %err, "git fetch failed, using cached remote refs");
        }

        self.run(["rev-list", "--left-right", "--count", "@{upstream}...HEAD"])
            .await
            .map(|out| parse_ahead_behind(&out))
            .unwrap_or_default()
    }

    pub async fn today_commit_count(&self) -> u32 {
        if !self.is_repo {
            return 0;
        }
        let since = since_midnight();
        self.run(["log", "--oneline", since.as_str()])
            .await
            .map(|out| out.lines().filter(|l| !l.trim().is_empty()).count() as u32)
            .unwrap_or(0)
    }

    pub async fn today_line_stats(&self) -> LineStats {
        if !self.is_repo {
            return LineStats::default();
        }
        let since = since_midnight();
        self.run(["log", "--numstat", "--format=", since.as_str()])
            .await
            .map(|out| parse_numstat(&out))
            .unwrap_or_default()
    }

    pub async fn branch_names(&self) -> Vec<String> {
        if !self.is_repo {
            return Vec::new();
        }
        self.run(["branch", "--format=%(refname:short)"])
            .await
            .map(|out| {
                out.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn stash_count(&self) -> u32 {
        if !self.is_repo {
            return 0;
        }
        self.run(["stash", "list"])
            .await
            .map(|out| out.lines().filter(|l| !l.trim().is_empty()).count() as u32)
            .unwrap_or(0)
    }

    pub async fn repository_display_name(&self) -> String {
        let fallback = dir_name(&self.path);
        if !self.is_repo {
            return fallback;
        }
        self.run(["remote", "get-url", "origin"])
            .await
            .and_then(|url| repo_name_from_url(&url))
            .unwrap_or(fallback)
    }

    /// Gather every accessor into one snapshot. Queries run concurrently.
    pub async fn snapshot(&self) -> RepositorySnapshot {
        if !self.is_repo {
            return RepositorySnapshot::not_a_repository(dir_name(&self.path));
        }

        let (repo_name, branch, ahead_behind, status, last_commit) = tokio::join!(
            self.repository_display_name(),
            self.current_branch(),
            self.ahead_behind_upstream(),
            self.working_tree_status(),
            self.last_commit(),
        );
        let (today_commit_count, today_line_stats, branches, stash_count) = tokio::join!(
            self.today_commit_count(),
            self.today_line_stats(),
            self.branch_names(),
            self.stash_count(),
        );

        RepositorySnapshot {
            is_repo: true,
            repo_name,
            branch,
            ahead_behind,
            status,
            last_commit,
            today_commit_count,
            today_line_stats,
            branches,
            stash_count,
        }
    }
}

fn git<const N: usize>(dir: &Path, args: [&str; N]) -> ExternalCommand {
    ExternalCommand::new("git")
        .args(args)
        .current_dir(dir)
        .timeout(GIT_TIMEOUT)
}

/// `git fetch` that can never stop to ask for credentials
fn fetch_command(dir: &Path) -> ExternalCommand {
    git(dir, ["fetch", "--quiet"])
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("GIT_SSH_COMMAND", "ssh -o BatchMode=yes")
        .timeout(FETCH_TIMEOUT)
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn since_midnight() -> String {
    format!("--since={} 00:00:00", Local::now().format("%Y-%m-%d"))
}

/// Classify `git status --porcelain` lines. The first matching bucket wins:
/// modified, then added, then deleted, then untracked.
pub fn parse_status(output: &str) -> WorkingTreeStatus {
    let mut status = WorkingTreeStatus::default();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let code: String = line.chars().take(2).collect();
        if code.contains('M') {
            status.modified += 1;
        } else if code.contains('A') {
            status.added += 1;
        } else if code.contains('D') {
            status.deleted += 1;
        } else if code.contains('?') {
            status.untracked += 1;
        }
    }
    status
}

/// Parse `git log -1 --format=%h|%s|%an|%ar`
pub fn parse_last_commit(output: &str) -> CommitInfo {
    let line = output.lines().next().unwrap_or_default();
    // Subjects may contain '|', so peel the fixed fields off both ends
    let mut head = line.splitn(2, '|');
    let (Some(hash), Some(rest)) = (head.next(), head.next()) else {
        return CommitInfo::not_available();
    };
    let mut tail = rest.rsplitn(3, '|');
    let (Some(relative_time), Some(author), Some(subject)) = (tail.next(), tail.next(), tail.next())
    else {
        return CommitInfo::not_available();
    };

    CommitInfo {
        hash: hash.to_string(),
        message: truncate_subject(subject),
        author: author.to_string(),
        relative_time: relative_time.to_string(),
    }
}

/// Cut a subject line to 50 characters plus "..." when longer
pub fn truncate_subject(subject: &str) -> String {
    if subject.chars().count() > SUBJECT_MAX_CHARS {
        let cut: String = subject.chars().take(SUBJECT_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        subject.to_string()
    }
}

/// Parse `git rev-list --left-right --count @{upstream}...HEAD`: "behind ahead"
pub fn parse_ahead_behind(output: &str) -> AheadBehind {
    let mut parts = output.split_whitespace();
    match (
        parts.next().and_then(|p| p.parse().ok()),
        parts.next().and_then(|p| p.parse().ok()),
    ) {
        (Some(behind), Some(ahead)) => AheadBehind { ahead, behind },
        _ => AheadBehind::default(),
    }
}

/// Sum `git log --numstat` output. Binary files report "-" on a side, which
/// is left out of that side's total.
pub fn parse_numstat(output: &str) -> LineStats {
    let mut stats = LineStats::default();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(added), Some(removed)) = (parts.next(), parts.next()) else {
            continue;
        };
        if let Ok(n) = added.parse::<u64>() {
            stats.added += n;
        }
        if let Ok(n) = removed.parse::<u64>() {
            stats.removed += n;
        }
    }
    stats
}

/// Final path segment of a remote URL without its ".git" suffix
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let last = url.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
