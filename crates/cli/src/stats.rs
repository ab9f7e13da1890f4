use crate::scan::exit_code;
use crate::view::{CountRow, RecordRow};
use crumbtrail_core::Report;
use std::process::ExitCode;
use tabled::settings::Style;
use tabled::Table;

const TOP_PRIORITIES: usize = 10;

pub fn run(report: &Report) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let stats = report.statistics();

    let summary = vec![
        CountRow::new("files scanned", stats.files_scanned),
        CountRow::new("files with breadcrumbs", stats.files_with_breadcrumbs),
        CountRow::new("records", stats.total_records),
        CountRow::new("valid records", stats.valid_records),
        CountRow::new("invalid records", stats.invalid_records()),
        CountRow::new("without AI_PHASE", stats.unindexed),
        CountRow::new("errors", stats.errors),
        CountRow::new("warnings", stats.warnings),
        CountRow::new("infos", stats.infos),
    ];
    println!("{}", Table::new(&summary).with(Style::psql()));

    if !stats.phases.is_empty() {
        let phases: Vec<_> = stats
            .phases
            .iter()
            .map(|(name, count)| CountRow::new(name.as_str(), *count))
            .collect();
        println!("\nPhases\n{}", Table::new(&phases).with(Style::psql()));
    }

    if !stats.statuses.is_empty() {
        let statuses: Vec<_> = stats
            .statuses
            .iter()
            .map(|(name, count)| CountRow::new(name.as_str(), *count))
            .collect();
        println!("\nStatuses\n{}", Table::new(&statuses).with(Style::psql()));
    }

    let top: Vec<_> = report
        .by_priority()
        .into_iter()
        .take(TOP_PRIORITIES)
        .map(RecordRow::from_entry)
        .collect();
    if !top.is_empty() {
        println!("\nTop priorities\n{}", Table::new(&top).with(Style::psql()));
    }

    if report.is_cancelled() {
        eprintln!("(scan was cancelled; statistics are partial)");
    }
    Ok(exit_code(report))
}
