// src/ranking.rs

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{CriticError, Result};
use crate::history::History;
use crate::model::{AuthorRank, AuthorRanking, RecencyMap, ReportTable};

/// Counts report rows per author and orders authors by that count, ascending.
///
/// With `top = Some(k)` only the `k` authors owning the most files are kept,
/// still in ascending order. Authors with equal counts keep the order in
/// which they first appear in `table`.
pub fn rank(table: &ReportTable, top: Option<usize>) -> AuthorRanking {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranking = AuthorRanking::new();
    for record in table {
        let slot = *index.entry(record.author.as_str()).or_insert_with(|| {
            ranking.push(AuthorRank { author: record.author.clone(), file_count: 0 });
            ranking.len() - 1
        });
        ranking[slot].file_count += 1;
    }

    ranking.sort_by_key(|r| r.file_count);

    match top {
        Some(k) => ranking.split_off(ranking.len().saturating_sub(k)),
        None => ranking,
    }
}

/// Whole days between `today` and the author's most recent commit anywhere
/// in the repository. Negative when that commit is dated after `today`.
pub fn last_active_days(author: &str, history: &dyn History, today: NaiveDate) -> Result<i64> {
    let canonical = history.aliases().normalize(author);
    let commits = history.commits_by_author(&canonical, true)?;
    let latest = commits
        .iter()
        .max_by_key(|c| c.authored_at)
        .ok_or_else(|| CriticError::NoCommitFound { author: author.to_string() })?;

    let days = (today - latest.authored_at.date_naive()).num_days();
    debug!("{author} (as {canonical}) last committed {days} days ago");
    Ok(days)
}

/// Looks up recency for every ranked author. Any author without commits
/// fails the whole lookup.
pub fn recency_map(ranking: &AuthorRanking, history: &dyn History, today: NaiveDate) -> Result<RecencyMap> {
    ranking
        .iter()
        .map(|r| -> Result<(String, i64)> { Ok((r.author.clone(), last_active_days(&r.author, history, today)?)) })
        .collect()
}
