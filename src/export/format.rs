//! Rendering of the human-readable `ticket.md`.

use url::Url;

use super::relationship::Relationships;
use crate::issue::{Comment, Issue};

pub const NO_DESCRIPTION: &str = "_No description provided_";

/// Link to an issue in the tracker's web UI.
pub fn browse_url(base_url: &Url, key: &str) -> String {
	format!("{}/browse/{key}", base_url.as_str().trim_end_matches('/'))
}

pub fn format_ticket(issue: &Issue, relationships: &Relationships, comments: &[Comment], base_url: &Url) -> String {
	let mut content = String::new();

	content.push_str(&format!("# {}: {}\n\n", issue.key, issue.summary));

	content.push_str("# Metadata\n\n");
	content.push_str(&format!("- Type: {}\n", issue.issue_type));
	content.push_str(&format!("- Status: {}\n", issue.status));
	content.push_str(&format!("- Reporter: {}\n", issue.reporter));
	content.push_str(&format!("- Assignee: {}\n", issue.assignee.as_deref().unwrap_or("Unassigned")));
	content.push_str(&format!("- Updated: {}\n", issue.updated));
	content.push_str(&format!("- URL: {}\n", browse_url(base_url, &issue.key)));
	if let Some(parent) = &relationships.parent {
		content.push_str(&format!("- Parent: [{}]({})", parent.key, browse_url(base_url, &parent.key)));
		if let Some(summary) = &parent.summary {
			content.push_str(&format!(" - {summary}"));
		}
		content.push('\n');
	}
	content.push('\n');

	content.push_str("# Description\n\n");
	let description = issue.description.as_deref().filter(|d| !d.is_empty()).unwrap_or(NO_DESCRIPTION);
	content.push_str(&format!("{description}\n\n"));

	if !comments.is_empty() {
		content.push_str("# Comments\n\n");
		for comment in comments {
			content.push_str(&format!("## {} - {}\n\n", comment.author, comment.updated));
			content.push_str(&format!("{}\n\n", comment.body));
		}
	}
	content.push('\n');

	content
}
