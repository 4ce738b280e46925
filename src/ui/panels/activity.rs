use crate::collectors::git::RepositorySnapshot;
use crate::types::PanelCategory;
use crate::ui::common::*;
use crate::ui::panel::Panel;

/// Today's coding activity in the current repository
pub fn build(repo: &RepositorySnapshot) -> Panel {
    let mut panel = Panel::key_value("TODAY", PanelCategory::Activity);

    if !repo.is_repo {
        panel.push_kv("Stats", vec![dim("No git repo")]);
        return panel;
    }

    panel.push_kv("Commits Today", vec![bold(repo.today_commit_count.to_string(), COLOR_INFO)]);
    panel.push_kv(
        "Lines Added",
        vec![colored(format!("+{}", repo.today_line_stats.added), COLOR_GOOD)],
    );
    panel.push_kv(
        "Lines Removed",
        vec![colored(format!("-{}", repo.today_line_stats.removed), COLOR_CRIT)],
    );
    panel.push_kv("Branches", vec![plain(repo.branches.len().to_string())]);
    panel
}
