//! Error types for configuration and output-tree validation.
//!
//! Uses miette for diagnostics with codes and help text.

#![allow(unused_assignments)] // Fields are read by miette's derive macro via attributes

use std::path::PathBuf;

use miette::Diagnostic;

/// Missing or unusable settings. Always detected before any network call.
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum ConfigError {
	#[error("{var} is not set")]
	#[diagnostic(
		code(ground_control::config::missing),
		help("set it in the environment; API tokens can be created at https://support.atlassian.com/atlassian-account/docs/manage-api-tokens-for-your-atlassian-account/")
	)]
	Missing { var: &'static str },

	#[error("JIRA_URL is not a valid URL: {value}")]
	#[diagnostic(code(ground_control::config::invalid_url), help("expected something like https://your-org.atlassian.net"))]
	InvalidUrl {
		value: String,
		#[source]
		source: url::ParseError,
	},

	#[error("failed to read settings from the environment")]
	#[diagnostic(code(ground_control::config::load))]
	Load(#[from] config::ConfigError),
}

/// The output directory is in a state that a fresh export cannot start from.
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum ValidationError {
	#[error("output path {} exists but is not a directory", path.display())]
	#[diagnostic(code(ground_control::output::not_a_directory))]
	NotADirectory { path: PathBuf },

	#[error("output directory {} is not empty", path.display())]
	#[diagnostic(code(ground_control::output::not_empty), help("pass --clean to clear it, or choose another --output"))]
	NotEmpty { path: PathBuf },
}
