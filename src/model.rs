// src/model.rs

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::collections::HashMap;

/// A single commit as seen by the analysis: who wrote it and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub author: String,
    /// Authoring time, kept in the author's own timezone
    pub authored_at: DateTime<FixedOffset>,
}

impl Commit {
    pub fn new(author: impl Into<String>, authored_at: DateTime<FixedOffset>) -> Self {
        Self { author: author.into(), authored_at }
    }
}

/// A file that only ever had one author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub author: String,
    pub commit_count: usize,
    pub first_commit_date: NaiveDate,
}

/// Why a candidate file did not make it into the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// No commit ever touched the path
    EmptyHistory,
    /// At least two distinct authors touched the path
    MultiAuthor,
}

/// Outcome of running one file's history through the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Single(FileRecord),
    Excluded(Exclusion),
}

/// Single-author files ordered by (first_commit_date, path)
pub type ReportTable = Vec<FileRecord>;

/// How many report rows belong to one author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRank {
    pub author: String,
    pub file_count: usize,
}

/// Ranked authors, ascending by file_count
pub type AuthorRanking = Vec<AuthorRank>;

/// Maps an author, as spelled in the report, to days since their last commit
pub type RecencyMap = HashMap<String, i64>;

/// Everything the analysis produced for one root
#[derive(Debug)]
pub struct AnalysisResult {
    pub project: String,
    /// Number of candidate files that were classified
    pub total_files: usize,
    pub table: ReportTable,
    pub ranking: AuthorRanking,
    pub recency: RecencyMap,
}
