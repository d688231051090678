// src/report.rs

//! Fixed-width text report.
//!
//! ```text
//! | filename   | author | commits | last date  |
//! | src/a.py   | Alice  |       2 | 2020-01-01 |
//! ```
//!
//! Cells are padded to the widest entry of their column. Text columns are
//! left-aligned, the commit count right-aligned. Leading and trailing blanks
//! inside a cell do not survive a round trip.

use chrono::NaiveDate;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{CriticError, Result};
use crate::model::{FileRecord, ReportTable};

pub const HEADER: [&str; 4] = ["filename", "author", "commits", "last date"];
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn report_path(output_dir: &Path, project: &str) -> PathBuf {
    output_dir.join(format!("{project}_critic.txt"))
}

/// Renders the table. Fails if a cell cannot be represented in the format.
pub fn render(table: &ReportTable) -> std::result::Result<String, String> {
    let rows: Vec<[String; 4]> = table
        .iter()
        .map(|r| {
            [
                r.path.clone(),
                r.author.clone(),
                r.commit_count.to_string(),
                r.first_commit_date.format(DATE_FORMAT).to_string(),
            ]
        })
        .collect();

    for row in &rows {
        if let Some(cell) = row[..2].iter().find(|c| c.contains(['|', '\n', '\r'])) {
            return Err(format!("'{cell}' contains a column separator or line break"));
        }
    }

    let mut widths = HEADER.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADER.map(String::from), &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    Ok(out)
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let _ = writeln!(
        out,
        "| {:<w0$} | {:<w1$} | {:>w2$} | {:<w3$} |",
        cells[0],
        cells[1],
        cells[2],
        cells[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3],
    );
}

/// Writes the report to `path`, replacing any earlier report.
pub fn write(table: &ReportTable, path: &Path) -> Result<()> {
    let text = render(table).map_err(|reason| CriticError::WriteReport {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, reason),
    })?;
    fs::write(path, text).map_err(|source| CriticError::WriteReport { path: path.to_path_buf(), source })
}

pub fn read(path: &Path) -> Result<ReportTable> {
    let text =
        fs::read_to_string(path).map_err(|source| CriticError::ReadReport { path: path.to_path_buf(), source })?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<ReportTable> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let Some((idx, header)) = lines.next() else {
        return Err(malformed(1, "missing header"));
    };
    if split_cells(header).as_deref() != Some(&HEADER[..]) {
        return Err(malformed(idx + 1, "unexpected header"));
    }

    let mut table = ReportTable::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let cells = split_cells(line).ok_or_else(|| malformed(line_no, "expected 4 columns"))?;
        let commit_count = cells[2].parse().map_err(|_| malformed(line_no, "commit count is not a number"))?;
        let first_commit_date = NaiveDate::parse_from_str(cells[3], DATE_FORMAT)
            .map_err(|_| malformed(line_no, "date is not YYYY-MM-DD"))?;
        table.push(FileRecord {
            path: cells[0].to_string(),
            author: cells[1].to_string(),
            commit_count,
            first_commit_date,
        });
    }
    Ok(table)
}

fn split_cells(line: &str) -> Option<Vec<&str>> {
    let inner = line.trim().strip_prefix('|')?.strip_suffix('|')?;
    let cells: Vec<&str> = inner.split('|').map(str::trim).collect();
    (cells.len() == 4).then_some(cells)
}

fn malformed(line: usize, reason: &str) -> CriticError {
    CriticError::MalformedReport { line, reason: reason.to_string() }
}
