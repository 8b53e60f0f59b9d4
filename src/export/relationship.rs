//! Parent resolution.
//!
//! A parent can be declared two ways: the structured `parent` field, or the legacy "Epic Link"
//! custom field carrying only a key. Each way is a [`ParentStrategy`]; the [`Resolver`] tries them
//! in order and the first hit wins.

use std::{cell::RefCell, collections::HashMap};

use color_eyre::eyre::Result;

use crate::{
	issue::{Issue, IssueRef},
	jira::JiraClient,
};

/// Relationships of one issue, computed fresh on every run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Relationships {
	pub parent: Option<IssueRef>,
	/// Reserved. Never populated, no reverse index is built.
	pub children: Vec<IssueRef>,
}

pub trait ParentStrategy {
	fn name(&self) -> &'static str;

	/// `Ok(None)` means this strategy has nothing to say, and the next one is tried.
	fn resolve(&self, issue: &Issue) -> Result<Option<IssueRef>>;
}

/// The structured parent reference, with the type the tracker reports for it.
pub struct DirectParent;

impl ParentStrategy for DirectParent {
	fn name(&self) -> &'static str {
		"parent"
	}

	fn resolve(&self, issue: &Issue) -> Result<Option<IssueRef>> {
		Ok(issue.parent.clone())
	}
}

/// The legacy epic link. The field only holds a key, so the type is assumed to be "Epic".
pub struct EpicLink;

impl ParentStrategy for EpicLink {
	fn name(&self) -> &'static str {
		"epic link"
	}

	fn resolve(&self, issue: &Issue) -> Result<Option<IssueRef>> {
		Ok(issue.epic_link.as_deref().map(str::trim).filter(|k| !k.is_empty()).map(|k| IssueRef::new(k, "Epic")))
	}
}

/// The legacy epic link, looked up by key to learn the linked issue's real type and summary.
/// Yields nothing when the key is unknown to the tracker, leaving it to [`EpicLink`].
pub struct EpicLinkLookup<'a> {
	client: &'a dyn JiraClient,
	cache: RefCell<HashMap<String, Option<IssueRef>>>,
}

impl<'a> EpicLinkLookup<'a> {
	pub fn new(client: &'a dyn JiraClient) -> Self {
		Self { client, cache: RefCell::default() }
	}
}

impl ParentStrategy for EpicLinkLookup<'_> {
	fn name(&self) -> &'static str {
		"epic link lookup"
	}

	fn resolve(&self, issue: &Issue) -> Result<Option<IssueRef>> {
		let Some(key) = issue.epic_link.as_deref().map(str::trim).filter(|k| !k.is_empty()) else {
			return Ok(None);
		};
		if let Some(cached) = self.cache.borrow().get(key) {
			return Ok(cached.clone());
		}

		let found = self.client.fetch_issue(key)?.map(|linked| IssueRef::new(linked.key, linked.issue_type).with_summary(linked.summary));
		if found.is_none() {
			tracing::warn!(issue = %issue.key, epic_link = key, "epic link points at an unknown issue");
		}
		self.cache.borrow_mut().insert(key.to_string(), found.clone());
		Ok(found)
	}
}

/// Ordered list of strategies. Append to extend.
pub struct Resolver<'a> {
	strategies: Vec<Box<dyn ParentStrategy + 'a>>,
}

impl<'a> Resolver<'a> {
	pub fn new(strategies: Vec<Box<dyn ParentStrategy + 'a>>) -> Self {
		Self { strategies }
	}

	/// Direct parent, then plain epic link.
	pub fn standard() -> Self {
		Self::new(vec![Box::new(DirectParent), Box::new(EpicLink)])
	}

	/// Direct parent, then epic link resolved through the tracker, then plain epic link.
	pub fn with_lookup(client: &'a dyn JiraClient) -> Self {
		Self::new(vec![Box::new(DirectParent), Box::new(EpicLinkLookup::new(client)), Box::new(EpicLink)])
	}

	pub fn push(&mut self, strategy: impl ParentStrategy + 'a) {
		self.strategies.push(Box::new(strategy));
	}

	pub fn resolve(&self, issue: &Issue) -> Result<Relationships> {
		for strategy in &self.strategies {
			if let Some(parent) = strategy.resolve(issue)? {
				tracing::debug!(issue = %issue.key, parent = %parent.key, parent_type = %parent.issue_type, via = strategy.name(), "resolved parent");
				return Ok(Relationships { parent: Some(parent), children: Vec::new() });
			}
		}
		tracing::debug!(issue = %issue.key, "no parent");
		Ok(Relationships::default())
	}
}
