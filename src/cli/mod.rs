use clap::Parser;
use std::path::PathBuf;

/// Compares two tar archives and prints the list of differences on stderr.
/// If an output file is provided, a delta archive containing the changed
/// entries is created as well.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The baseline archive (e.g. previous-release.tar.gz). If omitted, every
    /// entry of the new archive is reported as added/modified.
    #[arg(short, long)]
    pub prev: Option<PathBuf>,

    /// The new archive to compare against the baseline.
    #[arg(short, long)]
    pub new: PathBuf,

    /// Write a delta archive with the added/modified entries to this path.
    /// Compression is chosen from the extension (.gz/.tgz, .xz/.txz,
    /// .zst/.zstd); anything else produces a plain tar.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Parses command-line arguments using `clap`.
///
/// Missing required arguments print usage and exit with the usage code;
/// `--help` prints usage and exits zero.
pub fn run() -> Result<Args, Box<dyn std::error::Error>> {
    Ok(Args::parse())
}
