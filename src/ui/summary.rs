//! End-of-run summary rendering.

use crate::runner::Summary;

use super::progress::format_duration;
use super::table::Table;
use super::theme::RigupTheme;

/// Render `summary` for the terminal.
///
/// Counts and total time first, then a table of failed steps with their
/// reasons, the disabled categories, and where the run log was written.
pub fn render_summary(summary: &Summary, theme: &RigupTheme) -> String {
    let mut out = Vec::new();

    out.push(String::new());
    out.push(theme.format_header(if summary.dry_run {
        "Dry run summary"
    } else {
        "Summary"
    }));

    let counts = format!(
        "{} {}",
        summary.counts_line(),
        theme
            .duration
            .apply_to(format!("in {}", format_duration(summary.duration)))
    );
    out.push(format!("  {}", counts));

    if summary.has_failures() {
        let mut table = Table::new(vec!["Step", "Category", "Reason"]);
        for failure in summary.failures() {
            table.add_row(vec![
                theme.error.apply_to(&failure.step).to_string(),
                failure.category.clone(),
                failure.detail.clone().unwrap_or_default(),
            ]);
        }
        out.push(String::new());
        out.push(format!(
            "  {}",
            theme.format_error(&format!(
                "{} step{} failed",
                summary.failed,
                if summary.failed == 1 { "" } else { "s" }
            ))
        ));
        out.push(table.render(2));
    } else if summary.total_steps > 0 {
        let done = if summary.dry_run {
            "Nothing was changed"
        } else {
            "Workstation is ready"
        };
        out.push(format!("  {}", theme.format_success(done)));
    }

    if !summary.skipped_categories.is_empty() {
        out.push(format!(
            "  {}",
            theme.format_skipped(&format!(
                "Disabled: {}",
                summary.skipped_categories.join(", ")
            ))
        ));
    }

    out.push(format!(
        "  {} {}",
        theme.dim.apply_to("Log:"),
        summary.log_location.display()
    ));

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::RunResult;
    use std::path::PathBuf;
    use std::time::Duration;

    fn summary(results: Vec<RunResult>, skipped: Vec<String>, dry_run: bool) -> Summary {
        Summary::new(
            results,
            skipped,
            Duration::from_secs(90),
            PathBuf::from("/home/dev/.rigup/logs/rigup-20261019.log"),
            dry_run,
        )
    }

    #[test]
    fn lists_failures_with_reasons() {
        let s = summary(
            vec![
                RunResult::succeeded("git", "system", Duration::from_secs(2)),
                RunResult::failed(
                    "docker",
                    "containers",
                    Duration::from_secs(1),
                    "installer exited with status 1".into(),
                ),
            ],
            vec![],
            false,
        );

        let out = render_summary(&s, &RigupTheme::plain());

        assert!(out.contains("2 steps: 1 installed, 0 already present, 1 failed"));
        assert!(out.contains("in 1.5m"));
        assert!(out.contains("1 step failed"));
        assert!(out.contains("docker"));
        assert!(out.contains("installer exited with status 1"));
        assert!(!out.contains("Workstation is ready"));
    }

    #[test]
    fn clean_run_reports_ready_and_log_path() {
        let s = summary(vec![RunResult::skipped("git", "system")], vec![], false);

        let out = render_summary(&s, &RigupTheme::plain());

        assert!(out.contains("✓ Workstation is ready"));
        assert!(out.contains("Log: /home/dev/.rigup/logs/rigup-20261019.log"));
    }

    #[test]
    fn shows_disabled_categories() {
        let s = summary(vec![], vec!["cloud".into(), "databases".into()], false);

        let out = render_summary(&s, &RigupTheme::plain());

        assert!(out.contains("Disabled: cloud, databases"));
    }

    #[test]
    fn dry_run_is_labelled() {
        let s = summary(
            vec![RunResult::succeeded("jq", "system", Duration::ZERO).with_detail("would run: x")],
            vec![],
            true,
        );

        let out = render_summary(&s, &RigupTheme::plain());

        assert!(out.contains("Dry run summary"));
        assert!(out.contains("1 would install"));
        assert!(out.contains("Nothing was changed"));
    }
}
