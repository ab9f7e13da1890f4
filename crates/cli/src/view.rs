use crumbtrail_core::{Diagnostic, RecordEntry, Severity};
use nu_ansi_term::Color;
use tabled::Tabled;

/// One record, as a row of `stats` / `query --table` output.
#[derive(Tabled)]
pub struct RecordRow {
    pub id: String,
    pub phase: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
    pub declaration: String,
    pub location: String,
}

impl RecordRow {
    pub fn from_entry(entry: &RecordEntry) -> Self {
        let r = &entry.record;
        let dash = || "-".to_string();
        let mut id = entry.id.to_string();
        if !entry.valid {
            id.push('!');
        }
        Self {
            id,
            phase: r.phase.clone().unwrap_or_else(dash),
            status: r.status.map(|s| s.to_string()).unwrap_or_else(dash),
            priority: r.priority.map(|p| p.to_string()).unwrap_or_else(dash),
            assignee: r.assigned_to.clone().unwrap_or_else(dash),
            declaration: r.declaration.clone().unwrap_or_else(dash),
            location: short_location(entry),
        }
    }
}

fn short_location(entry: &RecordEntry) -> String {
    let loc = &entry.record.location;
    let file = loc
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("-");
    format!("{}:{}", file, loc.start_line)
}

#[derive(Tabled)]
pub struct CountRow {
    pub name: String,
    pub count: usize,
}

impl CountRow {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

pub fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Error => Color::Red.bold().paint("error").to_string(),
        Severity::Warning => Color::Yellow.bold().paint("warning").to_string(),
        Severity::Info => Color::Cyan.paint("info").to_string(),
    }
}

pub fn diagnostic_line(diagnostic: &Diagnostic) -> String {
    let location = diagnostic
        .location
        .as_ref()
        .map(|l| Color::LightGray.paint(l.to_string()).to_string())
        .unwrap_or_else(|| "<corpus>".to_string());
    format!(
        "{}: {}: {} [{}]",
        location,
        severity_label(diagnostic.severity),
        diagnostic.message,
        kind_code(diagnostic)
    )
}

fn kind_code(diagnostic: &Diagnostic) -> String {
    serde_json::to_value(diagnostic.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
