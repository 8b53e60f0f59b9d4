//! Mock Jira client for testing purposes.
//!
//! Stores all issues and comments in memory and evaluates [`SearchQuery`] itself,
//! so exports can be exercised end to end without hitting the real API.

use std::{
	collections::{HashMap, HashSet},
	path::Path,
	sync::Mutex,
};

use color_eyre::eyre::{Result, WrapErr, bail};
use serde::Deserialize;
use tracing::instrument;

use crate::{
	issue::{Comment, Issue, Tier},
	jira::{JiraClient, SearchQuery},
};

/// Serialized form of the mock state, as read from `GROUND_CONTROL_MOCK_STATE`.
#[derive(Debug, Default, Deserialize)]
struct MockState {
	#[serde(default)]
	issues: Vec<Issue>,
	/// issue key -> comments
	#[serde(default)]
	comments: HashMap<String, Vec<Comment>>,
	/// Keys whose comment fetch fails
	#[serde(default)]
	failing_comments: HashSet<String>,
}

/// Mock Jira client that stores all state in memory.
#[derive(Default)]
pub struct MockJiraClient {
	/// Issues in insertion order, which is also search result order
	issues: Mutex<Vec<Issue>>,

	comments: Mutex<HashMap<String, Vec<Comment>>>,

	/// Keys whose comment fetch fails, standing in for a network error
	failing_comments: Mutex<HashSet<String>>,

	/// Call log for assertions
	call_log: Mutex<Vec<String>>,
}

impl MockJiraClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// Load issues and comments from a JSON state file.
	pub fn from_state_file(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read mock state at {}", path.display()))?;
		let state: MockState = serde_json::from_str(&content).wrap_err("Mock state is not valid JSON")?;
		tracing::debug!(target: "mock_jira", issues = state.issues.len(), "loaded mock state");
		Ok(Self {
			issues: Mutex::new(state.issues),
			comments: Mutex::new(state.comments),
			failing_comments: Mutex::new(state.failing_comments),
			call_log: Mutex::new(Vec::new()),
		})
	}

	pub fn add_issue(&self, issue: Issue) {
		self.issues.lock().unwrap().push(issue);
	}

	pub fn add_comment(&self, key: &str, comment: Comment) {
		self.comments.lock().unwrap().entry(key.to_string()).or_default().push(comment);
	}

	/// Make `fetch_comments` for `key` return an error.
	pub fn fail_comments_for(&self, key: &str) {
		self.failing_comments.lock().unwrap().insert(key.to_string());
	}

	/// Get the call log
	pub fn get_call_log(&self) -> Vec<String> {
		self.call_log.lock().unwrap().clone()
	}

	fn log_call(&self, call: String) {
		self.call_log.lock().unwrap().push(call);
	}
}

/// In-memory rendition of the JQL each query stands for.
/// `statusCategory` is approximated by the status name.
fn matches(query: &SearchQuery, issue: &Issue) -> bool {
	match query {
		SearchQuery::Board { .. } => {
			if issue.issue_type.eq_ignore_ascii_case("sub-task") {
				return false;
			}
			let top_tier = issue.type_label().tier() != Tier::Other;
			let closed = ["done", "closed", "resolved", "cancelled"].iter().any(|s| issue.status.eq_ignore_ascii_case(s));
			top_tier || issue.parent.is_some() || issue.epic_link.is_some() || !closed
		}
		SearchQuery::ChildrenOf { key } => issue.parent.as_ref().is_some_and(|p| &p.key == key) || issue.epic_link.as_deref() == Some(key.as_str()),
	}
}

impl JiraClient for MockJiraClient {
	#[instrument(skip(self), name = "MockJiraClient::search")]
	fn search(&self, query: &SearchQuery, start_at: usize, max_results: usize) -> Result<Vec<Issue>> {
		tracing::info!(target: "mock_jira", jql = %query.jql(), start_at, max_results, "search");
		self.log_call(format!("search({}, {start_at}, {max_results})", query.jql()));

		let issues = self.issues.lock().unwrap();
		Ok(issues.iter().filter(|i| matches(query, i)).skip(start_at).take(max_results).cloned().collect())
	}

	#[instrument(skip(self), name = "MockJiraClient::fetch_comments")]
	fn fetch_comments(&self, key: &str) -> Result<Vec<Comment>> {
		tracing::info!(target: "mock_jira", key, "fetch_comments");
		self.log_call(format!("fetch_comments({key})"));

		if self.failing_comments.lock().unwrap().contains(key) {
			bail!("Failed to fetch comments for {key}: 503 Service Unavailable");
		}

		Ok(self.comments.lock().unwrap().get(key).cloned().unwrap_or_default())
	}

	#[instrument(skip(self), name = "MockJiraClient::fetch_issue")]
	fn fetch_issue(&self, key: &str) -> Result<Option<Issue>> {
		tracing::info!(target: "mock_jira", key, "fetch_issue");
		self.log_call(format!("fetch_issue({key})"));

		Ok(self.issues.lock().unwrap().iter().find(|i| i.key == key).cloned())
	}
}
