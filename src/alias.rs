// src/alias.rs

//! Author alias table.
//!
//! Reads a mailmap-style file where each line maps a name seen in commits to
//! the name a person should be known by:
//!
//! ```text
//! Alice Smith <alice@example.com> Alice S. <alice@old-host.org>
//! ```
//!
//! The commit-side name ("Alice S.") is the lookup key and matches any author
//! name that contains it.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AliasError {
    #[error("malformed alias entry on line {line}: {reason}")]
    MalformedAliasEntry { line: usize, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// Name fragment as it appears in commits
    pub key: String,
    /// Name it resolves to; may be blank in a broken table
    pub canonical: String,
}

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    /// Loads the table from `path`. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            debug!("No alias table at {}", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let table = Self::parse(&text);
        debug!("Loaded {} alias entries from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parses table text, skipping (and warning about) unusable lines.
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            match parse_line(idx + 1, raw) {
                Ok(Some(entry)) => {
                    if entry.canonical.trim().is_empty() {
                        warn!(
                            "Alias for '{}' on line {} has a blank name; the original author will be kept",
                            entry.key,
                            idx + 1
                        );
                    }
                    entries.push(entry);
                }
                Ok(None) => {}
                Err(err) => warn!("{err}"),
            }
        }
        Self { entries }
    }

    pub fn from_entries(entries: Vec<AliasEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves `author` to its canonical name. Never returns a blank name:
    /// unknown authors and blank targets come back unchanged.
    pub fn normalize(&self, author: &str) -> String {
        match self.entries.iter().find(|e| author.contains(e.key.as_str())) {
            Some(entry) if !entry.canonical.trim().is_empty() => entry.canonical.clone(),
            _ => author.to_string(),
        }
    }
}

/// `Ok(None)` for lines that carry no name mapping (comments, blank lines,
/// email-only forms).
fn parse_line(line: usize, raw: &str) -> std::result::Result<Option<AliasEntry>, AliasError> {
    let text = raw.split('#').next().unwrap_or("").trim();
    if text.is_empty() {
        return Ok(None);
    }
    let malformed = |reason| AliasError::MalformedAliasEntry { line, reason };

    let open = text.find('<').ok_or_else(|| malformed("missing <email>"))?;
    let canonical = text[..open].trim();
    let close = text[open..]
        .find('>')
        .map(|i| open + i)
        .ok_or_else(|| malformed("unterminated <email>"))?;

    let rest = &text[close + 1..];
    let Some(second_open) = rest.find('<') else {
        if rest.trim().is_empty() {
            return Ok(None);
        }
        return Err(malformed("commit name without <email>"));
    };
    if !rest[second_open..].contains('>') {
        return Err(malformed("unterminated commit <email>"));
    }
    let key = rest[..second_open].trim();
    if key.is_empty() {
        return Ok(None);
    }

    Ok(Some(AliasEntry { key: key.to_string(), canonical: canonical.to_string() }))
}
