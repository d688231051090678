// src/history.rs

//! Commit history access.
//!
//! The analysis only ever needs two questions answered: which commits touched
//! a path, and which commits a given person authored. [`History`] is that
//! seam; [`GitHistory`] answers it from a libgit2 repository.

use chrono::{DateTime, FixedOffset, TimeZone};
use git2::{ErrorCode, Oid, Repository, Sort, Tree};
use std::collections::{BinaryHeap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::alias::AliasTable;
use crate::error::{CriticError, Result};
use crate::model::Commit;

/// Read-only view of a repository's history, passed explicitly to every step
/// of the analysis. Sequences are newest first.
pub trait History {
    /// Commits that changed `path` (repository-relative, `/`-separated).
    fn commits_touching(&self, path: &str) -> Result<Vec<Commit>>;

    /// Commits authored by `author` anywhere in the repository. With
    /// `use_aliases`, commit authors are normalized through [`History::aliases`]
    /// before comparing.
    fn commits_by_author(&self, author: &str, use_aliases: bool) -> Result<Vec<Commit>>;

    fn aliases(&self) -> &AliasTable;
}

pub struct GitHistory {
    repo: Repository,
    workdir: PathBuf,
    head: Option<Oid>,
    /// Every commit reachable from HEAD, newest first
    commits: Vec<Oid>,
    aliases: AliasTable,
}

impl GitHistory {
    /// Opens the repository containing `path` and walks its history once.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => CriticError::NotARepository { path: path.to_path_buf() },
            _ => e.into(),
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| CriticError::NotARepository { path: path.to_path_buf() })?;
        let workdir = workdir.canonicalize()?;
        info!("Analyzing repository at: {}", workdir.display());

        let head = head_commit(&repo)?;
        let commits = match head {
            Some(head) => walk_from(&repo, head)?,
            None => Vec::new(),
        };
        debug!("{} commits reachable from HEAD", commits.len());

        let aliases = AliasTable::load(&workdir.join(".mailmap"))?;

        Ok(Self { repo, workdir, head, commits, aliases })
    }

    /// Turns a path under the working tree into the form git stores it in.
    /// Returns `None` for paths outside the working tree.
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let absolute = path.canonicalize().ok()?;
        let relative = absolute.strip_prefix(&self.workdir).ok()?;
        let parts: Vec<_> = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    fn to_commit(&self, commit: &git2::Commit) -> Result<Commit> {
        let signature = commit.author();
        let author = String::from_utf8_lossy(signature.name_bytes()).into_owned();
        Ok(Commit { author, authored_at: signature_time(signature.when())? })
    }
}

impl History for GitHistory {
    /// Follows git's default history simplification for a path: a commit
    /// whose tree at `path` matches one of its parents is skipped and only
    /// that parent is followed, so side branches a merge threw away never
    /// show up. Everything else is reported and all its parents are followed.
    fn commits_touching(&self, path: &str) -> Result<Vec<Commit>> {
        let Some(head) = self.head else {
            return Ok(Vec::new());
        };
        let path = Path::new(path);

        let mut queue = BinaryHeap::new();
        let mut seen = HashSet::new();
        let first = self.repo.find_commit(head)?;
        queue.push((first.time().seconds(), head));
        seen.insert(head);

        let mut found = Vec::new();
        while let Some((_, oid)) = queue.pop() {
            let commit = self.repo.find_commit(oid)?;
            let here = blob_at(&commit.tree()?, path);

            let mut parents: Vec<git2::Commit> = commit.parents().collect();
            let mut same_as = None;
            for (i, parent) in parents.iter().enumerate() {
                if blob_at(&parent.tree()?, path) == here {
                    same_as = Some(i);
                    break;
                }
            }

            let follow = match same_as {
                Some(i) => vec![parents.swap_remove(i)],
                None => {
                    if !parents.is_empty() || here.is_some() {
                        found.push(self.to_commit(&commit)?);
                    }
                    parents
                }
            };
            for parent in follow {
                if seen.insert(parent.id()) {
                    queue.push((parent.time().seconds(), parent.id()));
                }
            }
        }
        Ok(found)
    }

    fn commits_by_author(&self, author: &str, use_aliases: bool) -> Result<Vec<Commit>> {
        let mut found = Vec::new();
        for oid in &self.commits {
            let commit = self.to_commit(&self.repo.find_commit(*oid)?)?;
            let matches = if use_aliases {
                self.aliases.normalize(&commit.author) == author
            } else {
                commit.author == author
            };
            if matches {
                found.push(commit);
            }
        }
        Ok(found)
    }

    fn aliases(&self) -> &AliasTable {
        &self.aliases
    }
}

/// The commit HEAD points at, or `None` before the first commit.
fn head_commit(repo: &Repository) -> Result<Option<Oid>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn walk_from(repo: &Repository, head: Oid) -> Result<Vec<Oid>> {
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME)?;
    revwalk.push(head)?;

    let mut commits = Vec::new();
    for oid in revwalk {
        commits.push(oid?);
    }
    Ok(commits)
}

fn blob_at(tree: &Tree, path: &Path) -> Option<Oid> {
    tree.get_path(path).ok().map(|entry| entry.id())
}

fn signature_time(time: git2::Time) -> Result<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)
        .ok_or_else(|| git2::Error::from_str("commit timezone offset out of range"))?;
    offset
        .timestamp_opt(time.seconds(), 0)
        .single()
        .ok_or_else(|| git2::Error::from_str("commit timestamp out of range").into())
}
