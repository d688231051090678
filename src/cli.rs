// src/cli.rs

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to analyze; must be inside a git working tree
    pub root: PathBuf,

    /// Only chart the K authors owning the most single-author files
    #[arg(short, long, env = "BUSFACTOR_TOP", value_parser = clap::value_parser!(u32).range(1..))]
    pub top: Option<u32>,

    /// Directory to write the report and the charts to
    #[arg(short, long, env = "BUSFACTOR_OUTPUT", default_value = ".")]
    pub output: PathBuf,

    /// File extensions to analyze, without the dot
    #[arg(long = "ext", env = "BUSFACTOR_EXT", value_delimiter = ',', default_values_t = default_extensions())]
    pub extensions: Vec<String>,

    /// File names that are never analyzed
    #[arg(long, env = "BUSFACTOR_DENY", value_delimiter = ',', default_values_t = default_deny())]
    pub deny: Vec<String>,

    /// Width of the output images in pixels
    #[arg(long, env = "BUSFACTOR_WIDTH", default_value_t = 1000)]
    pub width: u32,

    /// Height of the output images in pixels
    #[arg(long, env = "BUSFACTOR_HEIGHT", default_value_t = 600)]
    pub height: u32,

    /// Date to measure author inactivity from (YYYY-MM-DD); defaults to today
    #[arg(long, env = "BUSFACTOR_AS_OF")]
    pub as_of: Option<NaiveDate>,
}

impl Args {
    /// Arguments for analyzing `root` with every default in place.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            top: None,
            output: PathBuf::from("."),
            extensions: default_extensions(),
            deny: default_deny(),
            width: 1000,
            height: 600,
            as_of: None,
        }
    }
}

pub fn default_extensions() -> Vec<String> {
    ["py", "f", "c", "h", "pyx"].map(String::from).to_vec()
}

pub fn default_deny() -> Vec<String> {
    ["__init__.py", "setup.py"].map(String::from).to_vec()
}
