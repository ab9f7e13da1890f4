use crumbtrail_core::{BreadcrumbQuery, Report};
use std::process::ExitCode;

pub fn run(query: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let schema = if query {
        schemars::schema_for!(BreadcrumbQuery)
    } else {
        schemars::schema_for!(Report)
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(ExitCode::SUCCESS)
}
