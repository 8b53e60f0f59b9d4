//! The `metadata.json` document written next to each `ticket.md`.

use serde::Serialize;
use url::Url;

use super::{format::browse_url, relationship::Relationships};
use crate::issue::Issue;

/// Parent as recorded in metadata: key and type only.
#[derive(Debug, Serialize)]
pub struct ParentMeta<'a> {
	pub key: &'a str,
	#[serde(rename = "type")]
	pub issue_type: &'a str,
}

/// Field order here is the order in the written document.
#[derive(Debug, Serialize)]
pub struct TicketMetadata<'a> {
	pub key: &'a str,
	pub id: &'a str,
	pub url: String,
	#[serde(rename = "type")]
	pub issue_type: &'a str,
	pub status: &'a str,
	pub summary: &'a str,
	pub reporter: &'a str,
	pub assignee: Option<&'a str>,
	pub updated: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub parent: Option<ParentMeta<'a>>,
}

impl<'a> TicketMetadata<'a> {
	pub fn new(issue: &'a Issue, relationships: &'a Relationships, base_url: &Url) -> Self {
		Self {
			key: &issue.key,
			id: &issue.id,
			url: browse_url(base_url, &issue.key),
			issue_type: &issue.issue_type,
			status: &issue.status,
			summary: &issue.summary,
			reporter: &issue.reporter,
			assignee: issue.assignee.as_deref(),
			updated: &issue.updated,
			parent: relationships.parent.as_ref().map(|p| ParentMeta {
				key: &p.key,
				issue_type: &p.issue_type,
			}),
		}
	}

	/// Pretty JSON with a trailing newline.
	pub fn to_json(&self) -> serde_json::Result<String> {
		let mut json = serde_json::to_string_pretty(self)?;
		json.push('\n');
		Ok(json)
	}
}
