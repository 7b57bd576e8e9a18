//! Everything the user sees on stdout.

use dlren_library::{CandidateEntry, EntryStatus, NameTemplate, Placeholder, Summary};
use std::fmt::Write;

/// One line of the preview shown before renaming.
pub fn preview_line(entry: &CandidateEntry) -> String {
    let new_name = match entry.status() {
        EntryStatus::Ready => entry.destination_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
        EntryStatus::Failed => format!("({})", entry.failure().unwrap_or("lookup failed")),
        EntryStatus::Unnamed => "(empty name)".to_string(),
        EntryStatus::Pending => "(not looked up)".to_string(),
    };
    let kind = entry.kind().to_string();
    let identifier = entry.identifier().to_string();
    format!("{kind:<6} {identifier:<10} {} -> {new_name}", entry.original_name())
}

/// Every placeholder, with the ones `template` uses marked `*`.
pub fn placeholder_table(template: &NameTemplate) -> String {
    let used: Vec<_> = template.placeholders().collect();
    let mut table = String::new();
    // Infallible: writing to a String.
    for placeholder in Placeholder::ALL {
        let [long, short] = placeholder.tokens();
        let mark = if used.contains(&placeholder) { '*' } else { ' ' };
        let _ = writeln!(table, "{mark} {long:<16} {short:<12} {placeholder}");
    }
    let _ = writeln!(table, "\n* used by the template: {}", template.as_str());
    table
}

pub fn summary_line(summary: &Summary) -> String {
    let mut line = format!("renamed {}, skipped {}, failed {}", summary.renamed, summary.skipped, summary.failed);
    if summary.cancelled {
        line.push_str(" (cancelled)");
    }
    line
}

/// 2 when any entry failed, 0 otherwise.
pub fn exit_status(summary: &Summary) -> u8 {
    if summary.failed > 0 { 2 } else { 0 }
}
