use std::{
	path::PathBuf,
	sync::{Arc, Mutex},
};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use ground_control::{
	config::Settings,
	export::{ExportArgs, export_command},
	issue::ConfigError,
	jira::{BoxedJiraClient, RealJiraClient},
	mock_jira::MockJiraClient,
};
use tracing_subscriber::EnvFilter;

/// Credentials or other settings unset
const EXIT_CONFIG: i32 = 1;
/// Anything else: invalid output directory, filesystem or network failure
const EXIT_FAILURE: i32 = 2;

#[derive(Parser)]
#[command(author, version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"), about, long_about = None)]
struct Cli {
	#[clap(flatten)]
	export: ExportArgs,
	/// Serve the tracker from the JSON state file named by `GROUND_CONTROL_MOCK_STATE`
	#[arg(long, hide = true)]
	mock: bool,
}

fn main() {
	color_eyre::config::HookBuilder::default().capture_span_trace_by_default(false).install().expect("color_eyre hook already set");
	miette::set_hook(Box::new(|_| Box::new(miette::MietteHandlerOpts::new().terminal_links(true).build()))).expect("miette hook already set");
	init_tracing();

	let cli = Cli::parse();

	// Nothing touches the network or the output tree before settings are known good.
	let settings = match Settings::from_env() {
		Ok(s) => s,
		Err(e) => {
			eprintln!("Error: {:?}", miette::Report::new(e));
			std::process::exit(EXIT_CONFIG);
		}
	};

	let client: BoxedJiraClient = match create_client(&settings, cli.mock) {
		Ok(client) => client,
		Err(e) => {
			eprintln!("Error: {e:?}");
			std::process::exit(EXIT_FAILURE);
		}
	};

	match export_command(&settings, client.as_ref(), &cli.export) {
		Ok(summary) => {
			println!("Synced {} issues into '{}/'", summary.total(), cli.export.output.display());
			println!("{summary}");
			println!("Tickets are organized in a hierarchy based on their relationships");
			std::process::exit(0);
		}
		Err(e) => {
			eprintln!("Error: {e:?}");
			let code = if e.downcast_ref::<ConfigError>().is_some() { EXIT_CONFIG } else { EXIT_FAILURE };
			std::process::exit(code);
		}
	}
}

fn create_client(settings: &Settings, mock: bool) -> Result<BoxedJiraClient> {
	if mock {
		let state = std::env::var("GROUND_CONTROL_MOCK_STATE").wrap_err("--mock requires GROUND_CONTROL_MOCK_STATE")?;
		return Ok(Arc::new(MockJiraClient::from_state_file(&PathBuf::from(state))?));
	}
	Ok(Arc::new(RealJiraClient::new(settings)?))
}

/// Logs go to stderr, or as JSON lines to `GROUND_CONTROL_TRACE_FILE` when set.
fn init_tracing() {
	let trace_file = std::env::var("GROUND_CONTROL_TRACE_FILE").ok();
	let default_directives = match (&trace_file, option_env!("LOG_DIRECTIVES")) {
		(_, Some(directives)) => directives,
		(Some(_), None) => "debug",
		(None, None) => "info",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

	if let Some(path) = trace_file {
		match std::fs::File::create(&path) {
			Ok(file) => {
				tracing_subscriber::fmt().json().with_env_filter(filter).with_writer(Mutex::new(file)).init();
				return;
			}
			Err(e) => eprintln!("Failed to open trace file {path}: {e}"),
		}
	}
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
