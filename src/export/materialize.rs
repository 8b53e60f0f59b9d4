//! Writing one ticket's directory.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use url::Url;

use super::{
	files::{METADATA_FILENAME, TICKET_FILENAME, ticket_dir_name},
	format::format_ticket,
	meta::TicketMetadata,
	relationship::Relationships,
};
use crate::{issue::Issue, jira::JiraClient};

pub struct Materializer<'a> {
	client: &'a dyn JiraClient,
	base_url: &'a Url,
}

impl<'a> Materializer<'a> {
	pub fn new(client: &'a dyn JiraClient, base_url: &'a Url) -> Self {
		Self { client, base_url }
	}

	/// Create `base_dir/{prefix}-{key}-{summary}/` with `metadata.json` and `ticket.md`, returning the directory.
	///
	/// Re-running on the same input overwrites both files in place.
	/// Both documents are rendered before anything is written, so a failed comment fetch leaves no directory behind.
	pub fn materialize(&self, issue: &Issue, relationships: &Relationships, base_dir: &Path) -> Result<PathBuf> {
		let comments = self.client.fetch_comments(&issue.key)?;
		let metadata = TicketMetadata::new(issue, relationships, self.base_url).to_json()?;
		let ticket = format_ticket(issue, relationships, &comments, self.base_url);

		let issue_dir = base_dir.join(ticket_dir_name(issue));
		std::fs::create_dir_all(&issue_dir).wrap_err_with(|| format!("Failed to create {}", issue_dir.display()))?;

		let metadata_path = issue_dir.join(METADATA_FILENAME);
		std::fs::write(&metadata_path, metadata).wrap_err_with(|| format!("Failed to write {}", metadata_path.display()))?;

		let ticket_path = issue_dir.join(TICKET_FILENAME);
		std::fs::write(&ticket_path, ticket).wrap_err_with(|| format!("Failed to write {}", ticket_path.display()))?;

		tracing::debug!(issue = %issue.key, dir = %issue_dir.display(), "materialized");
		Ok(issue_dir)
	}
}
