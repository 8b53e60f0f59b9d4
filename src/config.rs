//! Settings, read once at startup from `JIRA_*` environment variables.

use std::collections::HashMap;

use config::{Config, Environment};
use serde::Deserialize;
use url::Url;

use crate::issue::ConfigError;

pub const DEFAULT_EPIC_LINK_FIELD: &str = "customfield_10014";
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Clone, Debug)]
pub struct Settings {
	/// Tracker base, e.g. `https://your-org.atlassian.net`
	pub base_url: Url,
	/// Project key the board export is scoped to. Not needed for single-ticket exports.
	pub project: Option<String>,
	pub username: String,
	pub api_token: String,
	/// Custom field carrying the legacy epic link
	pub epic_link_field: String,
	pub page_size: usize,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
	url: Option<String>,
	project: Option<String>,
	username: Option<String>,
	api_token: Option<String>,
	epic_link_field: Option<String>,
	page_size: Option<usize>,
}

impl Settings {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::load(None)
	}

	/// Same as [`Settings::from_env`], but reads the given variables instead of the process environment.
	pub fn from_vars<K: Into<String>, V: Into<String>>(vars: impl IntoIterator<Item = (K, V)>) -> Result<Self, ConfigError> {
		Self::load(Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()))
	}

	fn load(source: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
		let raw: RawSettings = Config::builder().add_source(Environment::with_prefix("JIRA").source(source)).build()?.try_deserialize()?;

		// credentials first: they are what users forget
		let username = required(raw.username, "JIRA_USERNAME")?;
		let api_token = required(raw.api_token, "JIRA_API_TOKEN")?;
		let url = required(raw.url, "JIRA_URL")?;
		let base_url = Url::parse(&url).map_err(|source| ConfigError::InvalidUrl { value: url.clone(), source })?;

		Ok(Self {
			base_url,
			project: raw.project.filter(|p| !is_unset(p)),
			username,
			api_token,
			epic_link_field: raw.epic_link_field.filter(|f| !is_unset(f)).unwrap_or_else(|| DEFAULT_EPIC_LINK_FIELD.to_string()),
			page_size: raw.page_size.filter(|&n| n > 0).unwrap_or(DEFAULT_PAGE_SIZE),
		})
	}

	/// Project key, required for board exports.
	pub fn project(&self) -> Result<&str, ConfigError> {
		self.project.as_deref().ok_or(ConfigError::Missing { var: "JIRA_PROJECT" })
	}
}

fn required(value: Option<String>, var: &'static str) -> Result<String, ConfigError> {
	match value {
		Some(v) if !is_unset(&v) => Ok(v),
		_ => Err(ConfigError::Missing { var }),
	}
}

/// Empty values and `<placeholder>` sentinels count as unset.
fn is_unset(value: &str) -> bool {
	let value = value.trim();
	value.is_empty() || (value.starts_with('<') && value.ends_with('>'))
}
