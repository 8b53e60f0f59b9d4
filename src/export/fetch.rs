//! Collecting the issues to export.

use std::collections::{HashSet, VecDeque};

use color_eyre::eyre::{Result, eyre};

use crate::{
	issue::Issue,
	jira::{JiraClient, SearchQuery},
};

/// Page through `query` until the tracker runs out of results or `limit` issues are collected.
pub fn fetch_all(client: &dyn JiraClient, query: &SearchQuery, page_size: usize, limit: Option<usize>) -> Result<Vec<Issue>> {
	let page_size = page_size.max(1);
	let mut issues = Vec::new();
	let mut start_at = 0;

	loop {
		let batch = client.search(query, start_at, page_size)?;
		let fetched = batch.len();
		issues.extend(batch);
		start_at += page_size;
		tracing::debug!(fetched, total = issues.len(), "fetched page");

		if let Some(limit) = limit
			&& issues.len() >= limit
		{
			issues.truncate(limit);
			break;
		}
		if fetched < page_size {
			break;
		}
	}
	Ok(issues)
}

/// A single ticket and, if `recursive`, all of its descendants (breadth-first, each issue once).
pub fn fetch_ticket_tree(client: &dyn JiraClient, key: &str, recursive: bool, page_size: usize, limit: Option<usize>) -> Result<Vec<Issue>> {
	let root = client.fetch_issue(key)?.ok_or_else(|| eyre!("Issue {key} not found"))?;
	let mut seen = HashSet::from([root.key.clone()]);
	let mut queue = VecDeque::from([root.key.clone()]);
	let mut issues = vec![root];
	if !recursive {
		return Ok(issues);
	}

	while let Some(parent_key) = queue.pop_front() {
		let query = SearchQuery::ChildrenOf { key: parent_key };
		for child in fetch_all(client, &query, page_size, None)? {
			if limit.is_some_and(|limit| issues.len() >= limit) {
				return Ok(issues);
			}
			if seen.insert(child.key.clone()) {
				queue.push_back(child.key.clone());
				issues.push(child);
			}
		}
	}
	Ok(issues)
}
