//! Naming of ticket directories and the files inside them.

use crate::issue::Issue;

pub const METADATA_FILENAME: &str = "metadata.json";
pub const TICKET_FILENAME: &str = "ticket.md";
/// Bucket for tickets whose parent is not part of the export.
pub const UNASSIGNED_DIR: &str = "0-UNASSIGNED";

/// Summaries longer than this are cut down to [`TRUNCATED_SUMMARY_CHARS`] plus an ellipsis.
pub const MAX_SUMMARY_CHARS: usize = 50;
pub const TRUNCATED_SUMMARY_CHARS: usize = 47;

const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make text usable as a single path segment.
/// Replaces each reserved character with `_`, then strips leading/trailing spaces and dots.
pub fn sanitize(text: &str) -> String {
	let replaced: String = text.chars().map(|c| if RESERVED.contains(&c) { '_' } else { c }).collect();
	replaced.trim_matches(|c| c == ' ' || c == '.').to_string()
}

/// Split a summary into the part kept in a directory name and whether it was cut.
/// Counts characters, not bytes.
fn short_summary(summary: &str) -> (&str, bool) {
	if summary.chars().count() <= MAX_SUMMARY_CHARS {
		return (summary, false);
	}
	let end = summary.char_indices().nth(TRUNCATED_SUMMARY_CHARS).map(|(i, _)| i).unwrap_or(summary.len());
	(&summary[..end], true)
}

/// Directory leaf for an issue: `{prefix}-{key}-{summary}`.
///
/// The ellipsis marking a truncated summary is appended after sanitizing, otherwise the
/// trailing-dot strip would eat it. A cut ending in spaces or dots loses them before the ellipsis.
pub fn ticket_dir_name(issue: &Issue) -> String {
	let (summary, truncated) = short_summary(&issue.summary);
	let name = sanitize(&format!("{}-{}-{summary}", issue.type_label(), issue.key));
	if truncated { format!("{name}...") } else { name }
}
