//! Entry point for an export run.

use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::Result;

use super::{
	fetch::{fetch_all, fetch_ticket_tree},
	hierarchy::{ExportSummary, HierarchyBuilder},
	lifecycle::cleanup_directory,
	materialize::Materializer,
	relationship::Resolver,
};
use crate::{
	config::Settings,
	jira::{JiraClient, SearchQuery},
};

/// Export tickets into a directory tree mirroring initiative > epic > story/task.
#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
	/// Export only this ticket (e.g. PROJ-123) instead of the whole project
	pub key: Option<String>,

	/// Output directory
	#[arg(short, long, default_value = "tickets")]
	pub output: PathBuf,

	/// With KEY: also export every descendant of the ticket
	#[arg(short, long, requires = "key")]
	pub recursive: bool,

	/// Clear the output directory before exporting. Without this, a non-empty output directory aborts the run.
	#[arg(long)]
	pub clean: bool,

	/// Stop after this many tickets
	#[arg(long)]
	pub limit: Option<usize>,

	/// Look up epic-link targets to record their real type and summary, instead of assuming "Epic"
	#[arg(long)]
	pub resolve_epic_links: bool,
}

impl Default for ExportArgs {
	fn default() -> Self {
		Self {
			key: None,
			output: PathBuf::from("tickets"),
			recursive: false,
			clean: false,
			limit: None,
			resolve_epic_links: false,
		}
	}
}

/// What a run exports.
enum Selection<'a> {
	Ticket(&'a str),
	Board(SearchQuery),
}

pub fn export_command(settings: &Settings, client: &dyn JiraClient, args: &ExportArgs) -> Result<ExportSummary> {
	// fail on settings before touching the tree or the network
	let selection = match &args.key {
		Some(key) => Selection::Ticket(key),
		None => Selection::Board(SearchQuery::Board {
			project: settings.project()?.to_string(),
		}),
	};

	if args.clean {
		cleanup_directory(&args.output)?;
	}

	let issues = match selection {
		Selection::Ticket(key) => fetch_ticket_tree(client, key, args.recursive, settings.page_size, args.limit)?,
		Selection::Board(query) => fetch_all(client, &query, settings.page_size, args.limit)?,
	};
	tracing::info!(count = issues.len(), "fetched issues");

	let resolver = if args.resolve_epic_links { Resolver::with_lookup(client) } else { Resolver::standard() };
	let builder = HierarchyBuilder::new(Materializer::new(client, &settings.base_url), resolver);
	let summary = builder.build(&issues, &args.output)?;

	tracing::info!(total = summary.total(), output = %args.output.display(), "export finished");
	Ok(summary)
}
