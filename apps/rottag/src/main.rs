#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! rottag binary: argument handling, tree walking, console output

mod cli;
mod report;

use crate::cli::Cli;
use crate::report::Reporter;
use clap::Parser;
use rottag_types::RunStats;
use rottag_verify::{Pipeline, Verifier};
use std::path::Path;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    ExitCode::from(run(cli).await)
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Errors hit while resolving arguments and walking directories. These
/// happen before a file ever reaches the pipeline, so they are folded
/// into the run statistics afterwards.
#[derive(Debug, Default)]
struct WalkCounters {
    open_failed: u64,
    not_regular: u64,
}

async fn run(cli: Cli) -> u8 {
    let verifier = Verifier::new(cli.verify_options());
    let reporter = Reporter::new(&cli);

    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            reporter.print(&report);
        }
    });

    let mut pipeline = verifier.pipeline(Some(report_tx));
    let mut walk = WalkCounters::default();
    for path in &cli.paths {
        submit_arg(path, &cli, &mut pipeline, &mut walk).await;
    }
    let mut stats = pipeline.finish().await;
    if let Err(e) = printer.await {
        debug!(error = %e, "report printer task failed");
    }

    stats.open_failed += walk.open_failed;
    stats.not_regular += walk.not_regular;

    if cli.json {
        match serde_json::to_string(&stats) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Error: could not serialize statistics: {e}"),
        }
    } else if !cli.quiet2 {
        println!(
            "Stats: total: {} ok: {} errors: {} corrupt: {}",
            stats.total,
            stats.ok,
            stats.errors(),
            stats.corrupt
        );
    }
    exit_code(&stats)
}

/// Resolve one command line argument. Regular files go straight to the
/// pipeline; directories require `--recursive`. Symbolic links are not
/// followed.
async fn submit_arg(path: &Path, cli: &Cli, pipeline: &mut Pipeline, walk: &mut WalkCounters) {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            eprintln!("Error: \"{}\": {e}", path.display());
            walk.open_failed += 1;
            return;
        }
    };
    if meta.is_file() {
        pipeline.submit(path.to_path_buf()).await;
    } else if meta.is_dir() {
        if cli.recursive {
            walk_tree(path, cli.quiet2, pipeline, walk).await;
        } else {
            eprintln!(
                "Error: \"{}\" is a directory, did you mean to pass --recursive?",
                path.display()
            );
            walk.not_regular += 1;
        }
    } else {
        eprintln!("Error: \"{}\" is not a regular file", path.display());
        walk.not_regular += 1;
    }
}

/// Depth-first walk in sorted order so output is stable across runs.
/// Non-regular entries inside a tree are reported but not treated as
/// errors; unreadable directories are.
async fn walk_tree(dir: &Path, quiet2: bool, pipeline: &mut Pipeline, walk: &mut WalkCounters) {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error: \"{}\": {e}", dir.display());
            walk.open_failed += 1;
            return;
        }
    };

    let mut children = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => children.push(entry.path()),
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: \"{}\": {e}", dir.display());
                walk.open_failed += 1;
                break;
            }
        }
    }
    children.sort();

    for path in children {
        let meta = match tokio::fs::symlink_metadata(&path).await {
            Ok(meta) => meta,
            Err(e) => {
                eprintln!("Error: \"{}\": {e}", path.display());
                walk.open_failed += 1;
                continue;
            }
        };
        if meta.is_dir() {
            Box::pin(walk_tree(&path, quiet2, pipeline, walk)).await;
        } else if meta.is_file() {
            pipeline.submit(path).await;
        } else if !quiet2 {
            println!("<nonregular> {}", path.display());
        }
    }
}

/// Map final statistics to the process exit status:
///
/// - 5: at least one corrupt file, regardless of anything else
/// - 2/3/4: all errors were open failures / non-regular arguments /
///   write failures respectively
/// - 6: mixed errors, or a non-benign outcome such as an interrupted
///   digest
/// - 0: every file was ok, outdated, timechanged or new
fn exit_code(stats: &RunStats) -> u8 {
    if stats.corrupt > 0 {
        return 5;
    }
    let errors = stats.errors();
    if errors > 0 {
        if stats.open_failed == errors {
            return 2;
        }
        if stats.not_regular == errors {
            return 3;
        }
        if stats.write_failed == errors {
            return 4;
        }
        return 6;
    }
    if stats.all_benign() {
        0
    } else {
        6
    }
}
