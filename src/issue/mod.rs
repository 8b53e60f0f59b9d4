//! Ticket model shared by the tracker client and the exporter.

mod error;
pub use error::{ConfigError, ValidationError};

mod types;
pub use types::{Comment, Issue, IssueRef, Tier, TypeLabel, classify};
