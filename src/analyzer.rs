// src/analyzer.rs

use crate::error::Result;
use crate::history::History;
use crate::model::*;
use indicatif::ProgressBar;
use std::collections::HashSet;
use tracing::{debug, info};

/// Decides whether one file's history has a single author.
///
/// `commits` may come in any order; the first commit date is taken from the
/// chronologically oldest entry.
pub fn classify(path: &str, commits: &[Commit]) -> Classification {
    let Some(first) = commits.first() else {
        return Classification::Excluded(Exclusion::EmptyHistory);
    };

    let mut authors = HashSet::new();
    for commit in commits {
        authors.insert(commit.author.as_str());
        if authors.len() > 1 {
            return Classification::Excluded(Exclusion::MultiAuthor);
        }
    }

    let oldest = commits.iter().min_by_key(|c| c.authored_at).unwrap_or(first);

    Classification::Single(FileRecord {
        path: path.to_string(),
        author: first.author.clone(),
        commit_count: commits.len(),
        first_commit_date: oldest.authored_at.date_naive(),
    })
}

/// True when the last `/`-separated segment of `path` is on the deny-list.
pub fn is_denied(path: &str, deny: &[String]) -> bool {
    let base = path.rsplit('/').next().unwrap_or(path);
    deny.iter().any(|d| d == base)
}

/// Classifies every path and returns the single-author ones sorted by
/// (first commit date, path). Denied base names are dropped before any
/// history lookup; duplicate paths are analyzed once.
pub fn build_table(paths: &[String], deny: &[String], history: &dyn History) -> Result<ReportTable> {
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_message("Analyzing files");

    let mut seen = HashSet::new();
    let mut table = ReportTable::new();
    for path in paths {
        bar.inc(1);
        if is_denied(path, deny) {
            debug!("Skipping denied file {path}");
            continue;
        }
        if !seen.insert(path.as_str()) {
            continue;
        }
        let commits = history.commits_touching(path)?;
        match classify(path, &commits) {
            Classification::Single(record) => table.push(record),
            Classification::Excluded(reason) => debug!("Excluding {path}: {reason:?}"),
        }
    }
    bar.finish_with_message("Analysis complete");

    sort_table(&mut table);
    info!("{} of {} files have a single author", table.len(), paths.len());
    Ok(table)
}

pub fn sort_table(table: &mut ReportTable) {
    table.sort_by(|a, b| {
        a.first_commit_date
            .cmp(&b.first_commit_date)
            .then_with(|| a.path.cmp(&b.path))
    });
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::alias::AliasTable;
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
    use std::collections::HashMap;

    pub(crate) fn at(date: &str) -> DateTime<FixedOffset> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        FixedOffset::east_opt(0)
            .unwrap()
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .unwrap()
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    /// In-memory history keyed by path
    #[derive(Default)]
    pub(crate) struct FakeHistory {
        pub files: HashMap<String, Vec<Commit>>,
        pub aliases: AliasTable,
    }

    impl FakeHistory {
        pub(crate) fn with(mut self, path: &str, commits: &[(&str, &str)]) -> Self {
            let mut list: Vec<Commit> = commits.iter().map(|(a, d)| Commit::new(*a, at(d))).collect();
            list.sort_by(|a, b| b.authored_at.cmp(&a.authored_at));
            self.files.insert(path.to_string(), list);
            self
        }
    }

    impl History for FakeHistory {
        fn commits_touching(&self, path: &str) -> Result<Vec<Commit>> {
            Ok(self.files.get(path).cloned().unwrap_or_default())
        }

        fn commits_by_author(&self, author: &str, use_aliases: bool) -> Result<Vec<Commit>> {
            let mut all: Vec<Commit> = self
                .files
                .values()
                .flatten()
                .filter(|c| {
                    if use_aliases {
                        self.aliases.normalize(&c.author) == author
                    } else {
                        c.author == author
                    }
                })
                .cloned()
                .collect();
            all.sort_by(|a, b| b.authored_at.cmp(&a.authored_at));
            Ok(all)
        }

        fn aliases(&self) -> &AliasTable {
            &self.aliases
        }
    }

    #[test]
    fn empty_history_is_excluded() {
        assert_eq!(classify("a.py", &[]), Classification::Excluded(Exclusion::EmptyHistory));
    }

    #[test]
    fn two_authors_are_excluded_in_any_order() {
        let mut commits = vec![
            Commit::new("Alice", at("2020-01-01")),
            Commit::new("Alice", at("2020-02-01")),
            Commit::new("Bob", at("2020-03-01")),
        ];
        assert_eq!(classify("c.py", &commits), Classification::Excluded(Exclusion::MultiAuthor));
        commits.reverse();
        assert_eq!(classify("c.py", &commits), Classification::Excluded(Exclusion::MultiAuthor));
    }

    #[test]
    fn single_author_takes_oldest_date_from_newest_first_input() {
        let commits = vec![
            Commit::new("Alice", at("2020-06-01")),
            Commit::new("Alice", at("2020-03-15")),
            Commit::new("Alice", at("2020-01-01")),
        ];
        let Classification::Single(record) = classify("a.py", &commits) else {
            panic!("expected a single-author record");
        };
        assert_eq!(record.author, "Alice");
        assert_eq!(record.commit_count, 3);
        assert_eq!(record.first_commit_date, day("2020-01-01"));
    }

    #[test]
    fn oldest_date_does_not_depend_on_position() {
        let commits = vec![
            Commit::new("Alice", at("2020-03-15")),
            Commit::new("Alice", at("2019-11-30")),
            Commit::new("Alice", at("2020-06-01")),
        ];
        let Classification::Single(record) = classify("a.py", &commits) else {
            panic!("expected a single-author record");
        };
        assert_eq!(record.first_commit_date, day("2019-11-30"));
    }

    #[test]
    fn date_uses_the_authors_timezone() {
        // 23:30 on Jan 1st in UTC-5 is already Jan 2nd in UTC
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let when = tz.with_ymd_and_hms(2020, 1, 1, 23, 30, 0).unwrap();
        let Classification::Single(record) = classify("a.py", &[Commit::new("Alice", when)]) else {
            panic!("expected a single-author record");
        };
        assert_eq!(record.first_commit_date, day("2020-01-01"));
    }

    #[test]
    fn table_matches_three_file_scenario() -> Result<()> {
        let history = FakeHistory::default()
            .with("A", &[("Alice", "2020-01-01"), ("Alice", "2020-06-01")])
            .with("B", &[("Alice", "2021-01-01")])
            .with("C", &[("Alice", "2020-02-01"), ("Bob", "2020-03-01")]);
        let paths = vec!["C".to_string(), "B".to_string(), "A".to_string()];

        let table = build_table(&paths, &[], &history)?;
        assert_eq!(
            table,
            vec![
                FileRecord {
                    path: "A".into(),
                    author: "Alice".into(),
                    commit_count: 2,
                    first_commit_date: day("2020-01-01"),
                },
                FileRecord {
                    path: "B".into(),
                    author: "Alice".into(),
                    commit_count: 1,
                    first_commit_date: day("2021-01-01"),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn same_date_sorts_by_path() -> Result<()> {
        let history = FakeHistory::default()
            .with("src/z.c", &[("Alice", "2020-01-01")])
            .with("src/a.c", &[("Bob", "2020-01-01")]);
        let paths = vec!["src/z.c".to_string(), "src/a.c".to_string(), "src/z.c".to_string()];

        let table = build_table(&paths, &[], &history)?;
        let order: Vec<_> = table.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(order, vec!["src/a.c", "src/z.c"]);
        Ok(())
    }

    #[test]
    fn sorting_a_sorted_table_is_a_no_op() -> Result<()> {
        let history = FakeHistory::default()
            .with("b", &[("Alice", "2020-01-01")])
            .with("a", &[("Bob", "2021-01-01")])
            .with("c", &[("Carol", "2020-01-01")]);
        let paths = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let table = build_table(&paths, &[], &history)?;

        let mut again = table.clone();
        sort_table(&mut again);
        assert_eq!(again, table);
        Ok(())
    }

    #[test]
    fn denied_base_names_are_skipped() -> Result<()> {
        let history = FakeHistory::default()
            .with("pkg/__init__.py", &[("Alice", "2020-01-01")])
            .with("pkg/core.py", &[("Alice", "2020-01-01")])
            .with("setup.py", &[("Alice", "2020-01-01")]);
        let paths = vec!["pkg/__init__.py".to_string(), "pkg/core.py".to_string(), "setup.py".to_string()];
        let deny = vec!["__init__.py".to_string(), "setup.py".to_string()];

        let table = build_table(&paths, &deny, &history)?;
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].path, "pkg/core.py");
        assert!(!is_denied("pkg/my_setup.py", &deny));
        Ok(())
    }
}
