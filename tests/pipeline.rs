use anyhow::Result;
use busfactor::cli::Args;
use busfactor::error::CriticError;
use busfactor::model::{AuthorRank, FileRecord};
use busfactor::{renderer, report};
use chrono::NaiveDate;
use git2::{Repository, Signature, Time};
use std::path::Path;
use tempfile::tempdir;

// Noon UTC on each day
const JAN_2020: i64 = 1_577_880_000;
const FEB_2020: i64 = 1_580_558_400;
const MAR_2020: i64 = 1_583_064_000;
const JUN_2020: i64 = 1_591_012_800;
const JAN_2021: i64 = 1_609_502_400;

fn commit_file(repo: &Repository, file: &str, content: &str, author: &str, seconds: i64) -> Result<()> {
    let workdir = repo.workdir().expect("test repositories have a working tree");
    let full = workdir.join(file);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&full, content)?;

    let mut index = repo.index()?;
    index.add_path(Path::new(file))?;
    index.write()?;
    let tree = repo.find_tree(index.write_tree()?)?;

    let email = format!("{}@example.com", author.to_lowercase());
    let sig = Signature::new(author, &email, &Time::new(seconds, 0))?;
    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(_) => None,
    };
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "change", &tree, &parents)?;
    Ok(())
}

/// A.py: Alice twice; B.py: Alice once; C.py: Alice and Bob
fn scenario_repo(dir: &Path) -> Result<Repository> {
    let repo = Repository::init(dir)?;
    commit_file(&repo, "src/A.py", "a = 1", "Alice", JAN_2020)?;
    commit_file(&repo, "src/C.py", "c = 1", "Alice", FEB_2020)?;
    commit_file(&repo, "src/C.py", "c = 2", "Bob", MAR_2020)?;
    commit_file(&repo, "src/A.py", "a = 2", "Alice", JUN_2020)?;
    commit_file(&repo, "src/__init__.py", "", "Alice", JUN_2020)?;
    commit_file(&repo, "README.md", "docs", "Bob", JUN_2020)?;
    commit_file(&repo, "src/B.py", "b = 1", "Alice", JAN_2021)?;
    Ok(repo)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn args_for(root: &Path, output: &Path) -> Args {
    let mut args = Args::for_root(root);
    args.output = output.to_path_buf();
    args.as_of = Some(date("2021-01-11"));
    args.width = 500;
    args.height = 300;
    args
}

#[test]
fn three_file_scenario_end_to_end() -> Result<()> {
    let repo_dir = tempdir()?;
    let out_dir = tempdir()?;
    scenario_repo(repo_dir.path())?;

    let result = busfactor::run(&args_for(repo_dir.path(), out_dir.path()))?;

    let expected = vec![
        FileRecord {
            path: "src/A.py".into(),
            author: "Alice".into(),
            commit_count: 2,
            first_commit_date: date("2020-01-01"),
        },
        FileRecord {
            path: "src/B.py".into(),
            author: "Alice".into(),
            commit_count: 1,
            first_commit_date: date("2021-01-01"),
        },
    ];
    assert_eq!(result.table, expected);
    assert_eq!(result.total_files, 3);
    assert_eq!(result.ranking, vec![AuthorRank { author: "Alice".into(), file_count: 2 }]);
    assert_eq!(result.recency.get("Alice"), Some(&10));

    let project = repo_dir.path().canonicalize()?.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(result.project, project);

    let report_path = report::report_path(out_dir.path(), &project);
    assert_eq!(report::read(&report_path)?, expected);

    for chart in [
        renderer::total_chart_path(out_dir.path(), &project),
        renderer::authors_chart_path(out_dir.path(), &project),
    ] {
        let image = image::open(&chart)?;
        assert_eq!((image.width(), image.height()), (500, 300));
    }
    Ok(())
}

#[test]
fn top_keeps_the_largest_owner() -> Result<()> {
    let repo_dir = tempdir()?;
    let out_dir = tempdir()?;
    let repo = scenario_repo(repo_dir.path())?;
    commit_file(&repo, "lib/solo.c", "int x;", "Bob", JAN_2021)?;

    let mut args = args_for(repo_dir.path(), out_dir.path());
    args.top = Some(1);
    let result = busfactor::run(&args)?;

    assert_eq!(result.table.len(), 3);
    assert_eq!(result.ranking, vec![AuthorRank { author: "Alice".into(), file_count: 2 }]);
    assert_eq!(result.recency.len(), 1);
    Ok(())
}

#[test]
fn rerun_overwrites_previous_outputs() -> Result<()> {
    let repo_dir = tempdir()?;
    let out_dir = tempdir()?;
    let repo = scenario_repo(repo_dir.path())?;
    let args = args_for(repo_dir.path(), out_dir.path());

    let first = busfactor::run(&args)?;
    commit_file(&repo, "src/B.py", "b = 2", "Bob", JAN_2021 + 60)?;
    let second = busfactor::run(&args)?;

    assert_eq!(first.table.len(), 2);
    assert_eq!(second.table.len(), 1);
    let report_path = report::report_path(out_dir.path(), &second.project);
    assert_eq!(report::read(&report_path)?, second.table);
    Ok(())
}

#[test]
fn directory_outside_a_repository_fails() -> Result<()> {
    let plain = tempdir()?;
    let out_dir = tempdir()?;
    std::fs::write(plain.path().join("a.py"), "")?;
    let result = busfactor::run(&args_for(plain.path(), out_dir.path()));
    assert!(matches!(result, Err(CriticError::NotARepository { .. })));
    Ok(())
}
