//! Main entry point for the tardelta CLI app

use tardelta::{cli, diff, report, writer};

fn main() -> std::process::ExitCode {
    if let Err(e) = run_app() {
        if e.downcast_ref::<clap::Error>().is_none() {
            eprintln!("Error: {}", e);
        }
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::run()?;

    let shown = |p: Option<&std::path::PathBuf>| {
        p.map(|p| p.display().to_string()).unwrap_or_default()
    };
    println!("  Previous file: {}", shown(args.prev.as_ref()));
    println!("  New file:      {}", args.new.display());
    println!("  Output file:   {}", shown(args.output.as_ref()));

    // Sequential: new archive first, then the baseline, then the diff. All
    // fingerprints are computed while enumerating.
    println!("  opening {}...", args.new.display());
    let new = tardelta::reader::read_snapshot(&args.new)?;
    println!("  done ({} entries)", new.len());

    let baseline = match &args.prev {
        Some(prev) => {
            println!("  opening {}...", prev.display());
            let snapshot = tardelta::reader::read_snapshot(prev)?;
            println!("  done ({} entries)", snapshot.len());
            snapshot
        }
        None => Vec::new(),
    };

    let mut result = diff::diff_snapshots(baseline, new);
    println!(
        "  {} added/modified, {} removed",
        result.added_or_modified.len(),
        result.removed.len()
    );

    // The report goes out before any output archive is attempted, so the
    // comparison survives an output failure.
    report::print_report(&result)?;

    if let Some(output) = &args.output {
        println!("  creating output archive {}", output.display());
        writer::write_delta_archive(output, &mut result.added_or_modified)?;
    }

    Ok(())
}
