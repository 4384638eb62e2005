//! Command line interface definition

use clap::Parser;
use rottag_verify::VerifyOptions;
use std::path::PathBuf;

/// rottag - detect silent file corruption ("bitrot") by tagging files
/// with a content digest stored in extended attributes and re-verifying
/// the tag on later runs.
#[derive(Debug, Parser)]
#[command(name = "rottag")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detect silent file corruption using extended-attribute digest tags")]
#[command(long_about = None)]
pub struct Cli {
    /// Files or directories to verify
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Remove any previously stored attributes instead of verifying
    #[arg(long)]
    pub remove: bool,

    /// Recursively descend into subdirectories; symbolic links are not followed
    #[arg(short, long)]
    pub recursive: bool,

    /// Quiet: don't print <ok> files
    #[arg(short, long)]
    pub quiet: bool,

    /// Quiet twice over: only print <corrupt> files and errors
    #[arg(short = 'Q', long = "qq")]
    pub quiet2: bool,

    /// Don't make any changes on disk
    #[arg(long)]
    pub dry_run: bool,

    /// Overwrite the stored digest on corrupt files
    #[arg(long)]
    pub fix: bool,

    /// Migrate legacy attribute entries to the combined encoding
    #[arg(long)]
    pub migrate: bool,

    /// Read and write the legacy two-entry text encoding
    #[arg(long)]
    pub plaintext: bool,

    /// Print digest and path for <ok> files
    #[arg(long)]
    pub print_ok: bool,

    /// Number of verification workers; 0 or 1 preserves input ordering
    /// (careful going higher than 1 on spinning rust)
    #[arg(short, long, default_value_t = 0, value_name = "N")]
    pub jobs: usize,

    /// Print final statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// The engine-facing slice of this invocation.
    pub fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            remove: self.remove,
            dry_run: self.dry_run,
            fix: self.fix,
            migrate: self.migrate,
            plaintext: self.plaintext,
            jobs: self.jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::parse_from([
            "rottag",
            "--fix",
            "--migrate",
            "--dry-run",
            "--jobs",
            "8",
            "some-file",
        ]);
        let opts = cli.verify_options();
        assert!(opts.fix);
        assert!(opts.migrate);
        assert!(opts.dry_run);
        assert!(!opts.plaintext);
        assert_eq!(opts.jobs, 8);
        assert!(opts.legacy_compat());
    }

    #[test]
    fn test_quiet_flags() {
        let cli = Cli::parse_from(["rottag", "-Q", "file"]);
        assert!(cli.quiet2);
        assert!(!cli.quiet);
    }
}
