//! Pure formatting functions for UI output.
//!
//! Everything the user sees about a run goes through here. The `format_*`
//! functions build plain strings and are tested; the `display_*` functions
//! add styling and print.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::{PackageOutcome, ReleaseState, RunSummary};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One-line description of a package outcome.
///
/// Released and planned packages show their tag; failures show the reason.
pub fn format_outcome(outcome: &PackageOutcome) -> String {
    match (&outcome.state, &outcome.decision) {
        (ReleaseState::Released, Some(decision)) => {
            format!("{}: released {} ({})", outcome.package, decision.tag, decision.severity)
        }
        (ReleaseState::Planned, Some(decision)) => format!(
            "{}: would release {} ({})",
            outcome.package, decision.tag, decision.severity
        ),
        (ReleaseState::Failed(reason), _) => format!("{}: failed: {}", outcome.package, reason),
        (state, _) => format!("{}: {}", outcome.package, state.as_str()),
    }
}

pub fn display_package_outcome(outcome: &PackageOutcome) {
    let line = format_outcome(outcome);
    match outcome.state {
        ReleaseState::Released | ReleaseState::Planned => display_success(&line),
        ReleaseState::Failed(_) => display_error(&line),
        _ => println!("  {}", style(line).dim()),
    }
}

/// Print release notes under a header, indented.
pub fn display_release_notes(tag: &str, notes: &str) {
    println!("\n{}", style(format!("Release notes for {}:", tag)).bold());
    for line in notes.lines() {
        println!("  {}", line);
    }
    println!();
}

/// Totals line for a run.
pub fn format_run_totals(summary: &RunSummary, dry_run: bool) -> String {
    let verb = if dry_run { "planned" } else { "released" };
    format!(
        "{} {}, {} skipped, {} failed",
        summary.released(),
        verb,
        summary.skipped(),
        summary.failed()
    )
}

/// Print warnings, every package outcome, notes for planned releases and
/// the totals.
pub fn display_run_summary(summary: &RunSummary, dry_run: bool) {
    for warning in &summary.warnings {
        display_boundary_warning(warning);
    }

    println!("\n{}", style("Packages:").bold());
    for outcome in &summary.outcomes {
        display_package_outcome(outcome);
        if let (ReleaseState::Planned, Some(decision)) = (&outcome.state, &outcome.decision) {
            display_release_notes(&decision.tag, &decision.notes);
        }
    }

    let totals = format_run_totals(summary, dry_run);
    if summary.has_failures() {
        display_error(&totals);
    } else {
        display_status(&totals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReleaseDecision;
    use crate::domain::ReleaseType;
    use std::path::PathBuf;

    fn outcome(state: ReleaseState, decision: Option<ReleaseDecision>) -> PackageOutcome {
        PackageOutcome {
            package: "foo".to_string(),
            directory: PathBuf::from("packages/foo"),
            state,
            decision,
        }
    }

    fn decision() -> ReleaseDecision {
        ReleaseDecision {
            package: "foo".to_string(),
            severity: ReleaseType::Minor,
            next_version: semver::Version::new(1, 1, 0),
            tag: "foo-v1.1.0".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_format_released_outcome() {
        let line = format_outcome(&outcome(ReleaseState::Released, Some(decision())));
        assert_eq!(line, "foo: released foo-v1.1.0 (minor)");
    }

    #[test]
    fn test_format_planned_outcome() {
        let line = format_outcome(&outcome(ReleaseState::Planned, Some(decision())));
        assert_eq!(line, "foo: would release foo-v1.1.0 (minor)");
    }

    #[test]
    fn test_format_failed_and_skipped_outcomes() {
        let failed = outcome(ReleaseState::Failed("push rejected".to_string()), None);
        assert_eq!(format_outcome(&failed), "foo: failed: push rejected");

        let skipped = outcome(ReleaseState::NoFileChange, None);
        assert_eq!(format_outcome(&skipped), "foo: no-file-change");
    }

    #[test]
    fn test_format_run_totals() {
        let summary = RunSummary {
            outcomes: vec![
                outcome(ReleaseState::Planned, Some(decision())),
                outcome(ReleaseState::SkippedPrivate, None),
            ],
            warnings: Vec::new(),
        };
        assert_eq!(
            format_run_totals(&summary, true),
            "1 planned, 1 skipped, 0 failed"
        );
    }

    #[test]
    fn test_display_error() {
        // Visual verification test - output is printed to stderr
        display_error("test error");
    }
}
