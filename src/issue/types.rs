//! Core ticket data structures as read from the tracker.
//!
//! These are the domain shapes, decoupled from the REST payloads in [`crate::jira`].

use serde::{Deserialize, Serialize};

/// A reference to another issue, as exposed by the tracker on a child.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IssueRef {
	pub key: String,
	#[serde(rename = "type")]
	pub issue_type: String,
	/// Only known when the tracker embeds it (direct parents) or after a lookup.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub summary: Option<String>,
}

impl IssueRef {
	pub fn new(key: impl Into<String>, issue_type: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			issue_type: issue_type.into(),
			summary: None,
		}
	}

	pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
		self.summary = Some(summary.into());
		self
	}
}

/// A single tracker issue (initiative, epic, story, task, ...).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Issue {
	/// Stable identifier, e.g. `PROJ-123`
	pub key: String,
	pub id: String,
	/// Free-text type name, e.g. "Technical Initiative"
	#[serde(rename = "type")]
	pub issue_type: String,
	pub status: String,
	pub summary: String,
	pub reporter: String,
	#[serde(default)]
	pub assignee: Option<String>,
	pub updated: String,
	#[serde(default)]
	pub description: Option<String>,
	/// Structured parent reference
	#[serde(default)]
	pub parent: Option<IssueRef>,
	/// Raw key from the legacy "Epic Link" custom field
	#[serde(default)]
	pub epic_link: Option<String>,
}

impl Issue {
	pub fn type_label(&self) -> TypeLabel {
		classify(&self.issue_type)
	}
}

/// A comment on an issue, in tracker order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Comment {
	pub author: String,
	pub updated: String,
	pub body: String,
}

/// Display label of an issue type. Renders as the directory name prefix.
#[derive(Clone, Copy, Debug, derive_more::Display, Eq, Hash, PartialEq)]
pub enum TypeLabel {
	#[display("INI")]
	Initiative,
	#[display("EPIC")]
	Epic,
	#[display("STORY")]
	Story,
	#[display("TASK")]
	Task,
}

impl TypeLabel {
	pub fn tier(&self) -> Tier {
		match self {
			TypeLabel::Initiative => Tier::Initiative,
			TypeLabel::Epic => Tier::Epic,
			TypeLabel::Story | TypeLabel::Task => Tier::Other,
		}
	}
}

/// Processing tier. Ordered: parents of a tier always live in an earlier or the same tier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Tier {
	Initiative,
	Epic,
	Other,
}

/// Classify a free-text type name. Case-insensitive substring match, falls back to [`TypeLabel::Task`].
pub fn classify(type_name: &str) -> TypeLabel {
	let lower = type_name.to_lowercase();
	if lower.contains("initiative") {
		TypeLabel::Initiative
	} else if lower.contains("epic") {
		TypeLabel::Epic
	} else if lower.contains("story") {
		TypeLabel::Story
	} else {
		TypeLabel::Task
	}
}
