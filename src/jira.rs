use std::{collections::HashMap, sync::Arc};

use color_eyre::eyre::{Result, WrapErr, bail};
use reqwest::{StatusCode, blocking::Client};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::{
	config::Settings,
	issue::{Comment, Issue, IssueRef},
};

/// Which issues a search should return.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SearchQuery {
	/// Everything worth exporting from a project: all initiatives and epics, everything attached to a parent,
	/// and still-open loose work. Sub-tasks are never included.
	Board { project: String },
	/// Direct children of an issue, through either parent mechanism.
	ChildrenOf { key: String },
}

impl SearchQuery {
	pub fn jql(&self) -> String {
		match self {
			SearchQuery::Board { project } => format!(
				r#"project = "{project}" AND type != Sub-task AND (issuetype in (Initiative, Epic) OR parent is not empty OR "Epic Link" is not empty OR (issuetype not in (Initiative, Epic) AND statusCategory != Done AND status != Cancelled))"#
			),
			SearchQuery::ChildrenOf { key } => format!(r#"parent = "{key}" OR "Epic Link" = "{key}""#),
		}
	}
}

//==============================================================================
// Jira Client Trait
//==============================================================================

/// Read-only operations the exporter needs from the tracker.
/// Implemented by the real REST client and by [`crate::mock_jira::MockJiraClient`].
pub trait JiraClient: Send + Sync {
	/// One page of issues matching `query`, starting at offset `start_at`
	fn search(&self, query: &SearchQuery, start_at: usize, max_results: usize) -> Result<Vec<Issue>>;

	/// All comments on an issue, oldest first
	fn fetch_comments(&self, key: &str) -> Result<Vec<Comment>>;

	/// Look up a single issue. `None` if the tracker does not know the key.
	fn fetch_issue(&self, key: &str) -> Result<Option<Issue>>;
}

pub type BoxedJiraClient = Arc<dyn JiraClient>;

//==============================================================================
// Real Jira Client Implementation
//==============================================================================

/// Jira Cloud REST v2 client, authenticating with username + API token.
pub struct RealJiraClient {
	http_client: Client,
	base_url: Url,
	username: String,
	api_token: String,
	epic_link_field: String,
}

impl RealJiraClient {
	pub fn new(settings: &Settings) -> Result<Self> {
		let http_client = Client::builder()
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()
			.wrap_err("Failed to build HTTP client")?;
		Ok(Self {
			http_client,
			base_url: settings.base_url.clone(),
			username: settings.username.clone(),
			api_token: settings.api_token.clone(),
			epic_link_field: settings.epic_link_field.clone(),
		})
	}

	fn api_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
		let mut url = Url::parse(&format!("{}/rest/api/2/{path}", self.base_url.as_str().trim_end_matches('/')))?;
		url.query_pairs_mut().extend_pairs(params);
		Ok(url)
	}

	fn fields(&self) -> String {
		format!("summary,issuetype,status,reporter,assignee,updated,description,parent,{}", self.epic_link_field)
	}

	fn get(&self, url: Url) -> Result<reqwest::blocking::Response> {
		let res = self.http_client.get(url).basic_auth(&self.username, Some(&self.api_token)).header("Accept", "application/json").send()?;
		Ok(res)
	}
}

impl JiraClient for RealJiraClient {
	#[instrument(skip(self))]
	fn search(&self, query: &SearchQuery, start_at: usize, max_results: usize) -> Result<Vec<Issue>> {
		let jql = query.jql();
		let fields = self.fields();
		let (start_at, max_results) = (start_at.to_string(), max_results.to_string());
		let url = self.api_url("search", &[("jql", &jql), ("startAt", &start_at), ("maxResults", &max_results), ("fields", &fields)])?;

		let res = self.get(url)?;
		if !res.status().is_success() {
			let status = res.status();
			let body = res.text().unwrap_or_default();
			bail!("Failed to search issues: {status} - {body}");
		}

		let page = res.json::<SearchResponse>().wrap_err("Failed to decode search response")?;
		Ok(page.issues.into_iter().map(|raw| raw.into_issue(&self.epic_link_field)).collect())
	}

	#[instrument(skip(self))]
	fn fetch_comments(&self, key: &str) -> Result<Vec<Comment>> {
		let mut comments = Vec::new();
		loop {
			let start_at = comments.len().to_string();
			let url = self.api_url(&format!("issue/{key}/comment"), &[("startAt", &start_at)])?;

			let res = self.get(url)?;
			if !res.status().is_success() {
				let status = res.status();
				let body = res.text().unwrap_or_default();
				bail!("Failed to fetch comments for {key}: {status} - {body}");
			}

			let page = res.json::<CommentsResponse>().wrap_err("Failed to decode comments response")?;
			let fetched = page.comments.len();
			comments.extend(page.comments.into_iter().map(Comment::from));
			if fetched == 0 || comments.len() >= page.total {
				break;
			}
		}
		Ok(comments)
	}

	#[instrument(skip(self))]
	fn fetch_issue(&self, key: &str) -> Result<Option<Issue>> {
		let fields = self.fields();
		let url = self.api_url(&format!("issue/{key}"), &[("fields", &fields)])?;

		let res = self.get(url)?;
		if res.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		if !res.status().is_success() {
			let status = res.status();
			let body = res.text().unwrap_or_default();
			bail!("Failed to fetch issue {key}: {status} - {body}");
		}

		let raw = res.json::<RawIssue>().wrap_err("Failed to decode issue response")?;
		Ok(Some(raw.into_issue(&self.epic_link_field)))
	}
}

//==============================================================================
// Wire types
//==============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
	#[serde(default)]
	issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct CommentsResponse {
	#[serde(default)]
	comments: Vec<RawComment>,
	#[serde(default)]
	total: usize,
}

#[derive(Debug, Deserialize)]
struct RawComment {
	author: Option<JiraUser>,
	#[serde(default)]
	updated: String,
	#[serde(default)]
	body: String,
}

impl From<RawComment> for Comment {
	fn from(c: RawComment) -> Self {
		Self {
			author: display_name(c.author),
			updated: c.updated,
			body: c.body,
		}
	}
}

#[derive(Debug, Deserialize)]
struct Named {
	name: String,
}

#[derive(Debug, Deserialize)]
struct JiraUser {
	#[serde(rename = "displayName")]
	display_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssue {
	id: String,
	key: String,
	fields: RawFields,
}

#[derive(Debug, Deserialize)]
struct RawFields {
	summary: Option<String>,
	issuetype: Option<Named>,
	status: Option<Named>,
	reporter: Option<JiraUser>,
	assignee: Option<JiraUser>,
	updated: Option<String>,
	description: Option<String>,
	parent: Option<RawParent>,
	/// Custom fields, among them the epic link
	#[serde(flatten)]
	extra: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawParent {
	key: String,
	fields: Option<RawParentFields>,
}

#[derive(Debug, Deserialize)]
struct RawParentFields {
	issuetype: Option<Named>,
	summary: Option<String>,
}

fn display_name(user: Option<JiraUser>) -> String {
	user.map(|u| u.display_name).unwrap_or_else(|| "Unknown".to_string())
}

impl RawIssue {
	pub(crate) fn into_issue(self, epic_link_field: &str) -> Issue {
		let RawIssue { id, key, fields } = self;

		let parent = fields.parent.map(|p| {
			let (issue_type, summary) = match p.fields {
				Some(f) => (f.issuetype.map(|t| t.name).unwrap_or_default(), f.summary),
				None => (String::new(), None),
			};
			IssueRef { key: p.key, issue_type, summary }
		});

		// Only a plain non-empty key counts; anything else is treated as absent.
		let epic_link = match fields.extra.get(epic_link_field) {
			Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
			_ => None,
		};

		Issue {
			key,
			id,
			issue_type: fields.issuetype.map(|t| t.name).unwrap_or_default(),
			status: fields.status.map(|s| s.name).unwrap_or_default(),
			summary: fields.summary.unwrap_or_default(),
			reporter: display_name(fields.reporter),
			assignee: fields.assignee.map(|a| a.display_name),
			updated: fields.updated.unwrap_or_default(),
			description: fields.description,
			parent,
			epic_link,
		}
	}
}
