use crate::scan::exit_code;
use crate::view::RecordRow;
use crumbtrail_core::{BreadcrumbQuery, Report};
use std::process::ExitCode;
use tabled::settings::Style;
use tabled::Table;

pub fn parse(raw: &str) -> Result<BreadcrumbQuery, Box<dyn std::error::Error>> {
    serde_json::from_str(raw)
        .map_err(|e| format!("invalid query {}: {} (see `crumbtrail schema --query`)", raw, e).into())
}

pub fn run(
    report: &Report,
    query: &BreadcrumbQuery,
    table: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let result = report.execute(query);

    if table {
        if !result.records.is_empty() {
            let rows: Vec<_> = result.records.iter().map(RecordRow::from_entry).collect();
            println!("{}", Table::new(&rows).with(Style::psql()));
        }
        for diagnostic in &result.diagnostics {
            println!("{}", crate::view::diagnostic_line(diagnostic));
        }
        if result.is_empty() {
            println!("No results found.");
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(exit_code(report))
}
