use crumbtrail_core::Report;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

pub fn run(
    report: &Report,
    output: Option<&Path>,
    compact: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let json = if compact {
        serde_json::to_string(report)?
    } else {
        serde_json::to_string_pretty(report)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            let stats = report.statistics();
            info!(
                "Report written to {} ({} records, {} files)",
                path.display(),
                stats.total_records,
                stats.files_scanned
            );
        }
        None => println!("{}", json),
    }

    Ok(exit_code(report))
}

/// 130 mirrors the shell convention for an interrupted command.
pub fn exit_code(report: &Report) -> ExitCode {
    if report.is_cancelled() {
        ExitCode::from(130)
    } else {
        ExitCode::SUCCESS
    }
}
