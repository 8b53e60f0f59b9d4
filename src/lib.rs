//! Export Jira initiatives, epics and stories/tasks into a local directory tree that mirrors
//! their parent/child relationships.

pub mod config;
pub mod export;
pub mod issue;
pub mod jira;
pub mod mock_jira;

// Re-export the domain types at crate root for convenience
pub use issue::{Comment, ConfigError, Issue, IssueRef, Tier, TypeLabel, ValidationError, classify};
