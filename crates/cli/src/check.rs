use crate::view::diagnostic_line;
use crumbtrail_core::{Report, Severity};
use nu_ansi_term::Color;
use std::process::ExitCode;

pub fn run(report: &Report, strict: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    for diagnostic in report.diagnostics() {
        if quiet && diagnostic.severity == Severity::Info {
            continue;
        }
        println!("{}", diagnostic_line(diagnostic));
    }

    let stats = report.statistics();
    let summary = format!(
        "{} records in {} files: {} errors, {} warnings, {} infos",
        stats.total_records, stats.files_scanned, stats.errors, stats.warnings, stats.infos
    );
    let failed = stats.errors > 0 || (strict && stats.warnings > 0);
    if failed {
        println!("{}", Color::Red.bold().paint(summary));
    } else {
        println!("{}", Color::Green.paint(summary));
    }
    if report.is_cancelled() {
        println!("{}", Color::Yellow.paint("scan was cancelled; results are partial"));
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        crate::scan::exit_code(report)
    })
}
