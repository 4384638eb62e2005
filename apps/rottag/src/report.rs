//! Console rendering of per-file reports

use crate::cli::Cli;
use rottag_types::Outcome;
use rottag_verify::FileReport;

/// Which stream a rendered line is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Out,
    Err,
}

/// Renders reports according to the run's verbosity flags.
///
/// Classification tags go to stdout, errors to stderr. `-q` drops
/// `<ok>` lines, `-Q` additionally drops everything that is neither
/// corruption nor an error.
pub struct Reporter {
    quiet: bool,
    quiet2: bool,
    print_ok: bool,
    fix: bool,
}

impl Reporter {
    pub fn new(cli: &Cli) -> Self {
        Self {
            quiet: cli.quiet || cli.quiet2,
            quiet2: cli.quiet2,
            print_ok: cli.print_ok,
            fix: cli.fix,
        }
    }

    pub fn print(&self, report: &FileReport) {
        for (stream, line) in self.render(report) {
            match stream {
                Stream::Out => println!("{line}"),
                Stream::Err => eprintln!("{line}"),
            }
        }
    }

    fn render(&self, report: &FileReport) -> Vec<(Stream, String)> {
        let path = report.path.display();
        let mut lines = Vec::new();
        match report.outcome {
            Outcome::Ok if report.removed => {
                if !self.quiet {
                    lines.push((Stream::Out, format!("<removed xattr> {path}")));
                }
            }
            Outcome::Ok => {
                if self.quiet {
                    return lines;
                }
                if self.print_ok {
                    if let Some(actual) = &report.actual {
                        lines.push((Stream::Out, format!("{}  {path}", actual.digest)));
                    }
                } else {
                    lines.push((Stream::Out, format!("<ok> {path}")));
                }
            }
            Outcome::Corrupt => {
                let hint = if self.fix {
                    "Overwriting stored digest (--fix was passed)."
                } else {
                    "Keeping stored digest as-is (use --fix to overwrite)."
                };
                lines.push((Stream::Err, format!("Error: corrupt file \"{path}\". {hint}")));
                lines.push((Stream::Out, format!("<corrupt> {path}")));
                if !self.quiet2 {
                    if let Some(cmp) = report.comparison() {
                        lines.push((Stream::Out, cmp));
                    }
                }
            }
            Outcome::TimeChanged | Outcome::Outdated | Outcome::New => {
                if !self.quiet2 {
                    lines.push((Stream::Out, format!("{} {path}", report.outcome.label())));
                    if let Some(cmp) = report.comparison() {
                        lines.push((Stream::Out, cmp));
                    }
                }
            }
            Outcome::InProgress => {
                if !self.quiet2 {
                    lines.push((Stream::Out, format!("{} {path}", report.outcome.label())));
                }
            }
            Outcome::OpenFailed | Outcome::WriteFailed | Outcome::OtherFailed => {
                lines.push((Stream::Err, format!("Error: {} {path}", report.outcome.label())));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rottag_attrs::StoredAttr;
    use rottag_hash::{ActualAttr, Digest};
    use rottag_types::Timestamp;
    use std::path::{Path, PathBuf};

    fn reporter(args: &[&str]) -> Reporter {
        let mut argv = vec!["rottag"];
        argv.extend_from_slice(args);
        argv.push("some-path");
        Reporter::new(&Cli::parse_from(argv))
    }

    fn report(outcome: Outcome) -> FileReport {
        FileReport {
            path: PathBuf::from("a.txt"),
            outcome,
            removed: false,
            stored: None,
            actual: None,
        }
    }

    #[test]
    fn test_default_prints_ok_tag() {
        let lines = reporter(&[]).render(&report(Outcome::Ok));
        assert_eq!(lines, vec![(Stream::Out, "<ok> a.txt".to_string())]);
    }

    #[test]
    fn test_quiet_drops_ok_but_keeps_new() {
        let r = reporter(&["-q"]);
        assert!(r.render(&report(Outcome::Ok)).is_empty());
        assert_eq!(r.render(&report(Outcome::New)).len(), 1);
    }

    #[test]
    fn test_qq_keeps_only_corrupt_and_errors() {
        let r = reporter(&["-Q"]);
        assert!(r.render(&report(Outcome::Ok)).is_empty());
        assert!(r.render(&report(Outcome::New)).is_empty());
        assert!(r.render(&report(Outcome::TimeChanged)).is_empty());
        assert!(r.render(&report(Outcome::InProgress)).is_empty());

        let corrupt = r.render(&report(Outcome::Corrupt));
        assert_eq!(corrupt.len(), 2);
        assert_eq!(corrupt[0].0, Stream::Err);
        assert_eq!(corrupt[1], (Stream::Out, "<corrupt> a.txt".to_string()));

        let failed = r.render(&report(Outcome::OpenFailed));
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, Stream::Err);
    }

    #[test]
    fn test_corrupt_includes_comparison_when_available() {
        let mut rep = report(Outcome::Corrupt);
        rep.stored = Some(StoredAttr::absent());
        rep.actual = Some(ActualAttr {
            digest: Digest::from_data(b"x"),
            timestamp: Timestamp::new(1, 2),
        });
        let lines = reporter(&[]).render(&rep);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].1.contains(" stored: "));
        assert!(lines[2].1.contains(" actual: "));
    }

    #[test]
    fn test_corrupt_hint_follows_fix_flag() {
        let keeping = reporter(&[]).render(&report(Outcome::Corrupt));
        assert!(keeping[0].1.contains("use --fix to overwrite"));

        let fixing = reporter(&["--fix"]).render(&report(Outcome::Corrupt));
        assert!(fixing[0].1.contains("--fix was passed"));
        assert_eq!(fixing[0].0, Stream::Err);
    }

    #[test]
    fn test_new_includes_comparison_when_available() {
        let mut rep = report(Outcome::New);
        rep.stored = Some(StoredAttr::absent());
        rep.actual = Some(ActualAttr {
            digest: Digest::from_data(b"x"),
            timestamp: Timestamp::new(1, 2),
        });
        let lines = reporter(&[]).render(&rep);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].1, "<new> a.txt");
        // An untagged file compares against the all-zero stored digest.
        assert!(lines[1].1.starts_with(" stored: 0000"));
    }

    #[test]
    fn test_print_ok_replaces_tag_with_digest() {
        let digest = Digest::from_data(b"x");
        let mut rep = report(Outcome::Ok);
        rep.actual = Some(ActualAttr {
            digest: digest.clone(),
            timestamp: Timestamp::new(1, 2),
        });
        let lines = reporter(&["--print-ok"]).render(&rep);
        assert_eq!(lines, vec![(Stream::Out, format!("{digest}  a.txt"))]);
    }

    #[test]
    fn test_removed_tag() {
        let mut rep = report(Outcome::Ok);
        rep.removed = true;
        let lines = reporter(&[]).render(&rep);
        assert_eq!(lines, vec![(Stream::Out, "<removed xattr> a.txt".to_string())]);
        assert!(reporter(&["-q"]).render(&rep).is_empty());
    }

    #[test]
    fn test_report_path_is_printed_verbatim() {
        let mut rep = report(Outcome::New);
        rep.path = Path::new("dir/with spaces/f.bin").to_path_buf();
        let lines = reporter(&[]).render(&rep);
        assert_eq!(lines[0].1, "<new> dir/with spaces/f.bin");
    }
}
