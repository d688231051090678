//! Single-author file detection for git repositories.
//!
//! Walks a source tree, keeps the files whose whole history was written by
//! one person, and reports them as a fixed-width table plus two charts: the
//! share of single-author files, and the authors owning them coloured by how
//! long ago they last committed.

pub mod alias;
pub mod analyzer;
pub mod cli;
pub mod error;
pub mod glyphs;
pub mod history;
pub mod model;
pub mod ranking;
pub mod renderer;
pub mod report;
pub mod walk;

use chrono::Utc;
use std::fs;
use tracing::info;

use crate::cli::Args;
use crate::error::{CriticError, Result};
use crate::history::GitHistory;
use crate::model::AnalysisResult;
use crate::renderer::ChartSize;

/// Runs the whole analysis for `args.root` and writes the report and charts
/// into `args.output`.
pub fn run(args: &Args) -> Result<AnalysisResult> {
    let root = args.root.canonicalize()?;
    let project = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());

    let history = GitHistory::open(&root)?;

    let files = walk::candidate_files(&root, &args.extensions)?;
    let paths: Vec<String> = files.iter().filter_map(|f| history.relative_path(f)).collect();
    let total_files = paths.iter().filter(|p| !analyzer::is_denied(p, &args.deny)).count();
    info!("Found {} candidate files under {}", total_files, root.display());

    let table = analyzer::build_table(&paths, &args.deny, &history)?;

    let report_path = report::report_path(&args.output, &project);
    fs::create_dir_all(&args.output)
        .map_err(|source| CriticError::WriteReport { path: report_path.clone(), source })?;
    report::write(&table, &report_path)?;
    info!("Wrote {}", report_path.display());

    let ranking = ranking::rank(&table, args.top.map(|k| k as usize));
    let today = args.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let recency = ranking::recency_map(&ranking, &history, today)?;

    let size = ChartSize { width: args.width, height: args.height };
    renderer::render_pie(
        total_files,
        table.len(),
        &project,
        size,
        &renderer::total_chart_path(&args.output, &project),
    )?;
    renderer::render_ranking(
        &ranking,
        &recency,
        &project,
        size,
        &renderer::authors_chart_path(&args.output, &project),
    )?;

    Ok(AnalysisResult { project, total_files, table, ranking, recency })
}
