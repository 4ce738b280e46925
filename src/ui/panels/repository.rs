use crate::collectors::git::RepositorySnapshot;
use crate::types::PanelCategory;
use crate::ui::common::*;
use crate::ui::panel::Panel;

pub fn build(repo: &RepositorySnapshot) -> Panel {
    let mut panel = Panel::key_value("GIT STATUS", PanelCategory::Info);

    if !repo.is_repo {
        panel.push_kv("Project", vec![bold(repo.repo_name.clone(), COLOR_TEXT)]);
        panel.push_kv("Status", vec![colored("Not a git repository", COLOR_WARN)]);
        return panel;
    }

    let changes = repo.status.total();
    let mut branch = vec![colored(repo.branch.clone(), COLOR_INFO)];
    if changes > 0 {
        branch.push(colored(format!(" ({} changes)", changes), COLOR_WARN));
    }

    panel.push_kv("Project", vec![bold(repo.repo_name.clone(), COLOR_TEXT)]);
    panel.push_kv("Branch", branch);

    let ab = repo.ahead_behind;
    if ab.ahead > 0 || ab.behind > 0 {
        panel.push_kv(
            "Upstream",
            vec![
                colored(format!("\u{2191}{}", ab.ahead), COLOR_GOOD),
                plain(" "),
                colored(format!("\u{2193}{}", ab.behind), COLOR_WARN),
            ],
        );
    }

    panel.push_kv("Last Commit", vec![dim(repo.last_commit.message.clone())]);
    panel.push_kv("Committed", vec![colored(repo.last_commit.relative_time.clone(), COLOR_GOOD)]);
    panel.push_kv("Author", vec![plain(repo.last_commit.author.clone())]);
    panel.push_kv(
        "Today",
        vec![colored(repo.today_commit_count.to_string(), COLOR_INFO), plain(" commits")],
    );

    let status = repo.status;
    if status.modified > 0 {
        panel.push_kv("Modified", vec![colored(status.modified.to_string(), COLOR_WARN), plain(" files")]);
    }
    if status.added > 0 {
        panel.push_kv("Added", vec![colored(status.added.to_string(), COLOR_GOOD), plain(" files")]);
    }
    if status.deleted > 0 {
        panel.push_kv("Deleted", vec![colored(status.deleted.to_string(), COLOR_CRIT), plain(" files")]);
    }
    if status.untracked > 0 {
        panel.push_kv("Untracked", vec![colored(status.untracked.to_string(), COLOR_CRIT), plain(" files")]);
    }
    if repo.stash_count > 0 {
        panel.push_kv(
            "Stashed",
            vec![colored(repo.stash_count.to_string(), ratatui::style::Color::Magenta)],
        );
    }

    panel
}
