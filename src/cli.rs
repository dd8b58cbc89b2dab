// src/cli.rs
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "job-hunter")]
#[command(about = "Search job postings, extract what matters and export the matches")]
pub struct Cli {
    /// Preferences file (.yaml, .yml or .toml); prompts interactively when omitted
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Saved upstream response to use when no API key is set
    #[arg(long, value_name = "PATH")]
    pub mock_file: Option<PathBuf>,

    /// Never open exported files, even for *_LAUNCH outputs
    #[arg(long)]
    pub no_launch: bool,
}
