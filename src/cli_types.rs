use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments. One positional path; everything else is
/// tuning.
#[derive(Debug, Parser)]
#[command(
    name = "redline",
    version,
    about = "LLM-backed bug and optimization review for source files"
)]
pub struct Cli {
    /// File or directory to review
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "REDLINE_CONFIG",
        default_value = "redline.toml"
    )]
    pub config: PathBuf,

    /// Print extra detail while reviewing
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
