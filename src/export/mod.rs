//! Exporting tracker issues into a local directory tree.
//!
//! Issues are classified into tiers, their parents resolved, and each one written as a directory
//! holding `metadata.json` and `ticket.md`, nested under its parent's directory when the parent
//! is part of the same export.

mod command;
mod fetch;
pub mod files;
mod format;
pub mod hierarchy;
pub mod lifecycle;
mod materialize;
mod meta;
pub mod relationship;

pub use command::{ExportArgs, export_command};
pub use fetch::{fetch_all, fetch_ticket_tree};
pub use files::{UNASSIGNED_DIR, sanitize, ticket_dir_name};
pub use format::{browse_url, format_ticket};
pub use hierarchy::{ExportSummary, HierarchyBuilder, IssueDirs, Placement, partition};
pub use lifecycle::{check_directory, cleanup_directory, prepare_output_root};
pub use materialize::Materializer;
pub use meta::TicketMetadata;
pub use relationship::{DirectParent, EpicLink, EpicLinkLookup, ParentStrategy, Relationships, Resolver};
