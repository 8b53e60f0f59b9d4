//! Laying out the full directory tree.
//!
//! Issues are processed tier by tier (initiatives, then epics, then everything else), so by the
//! time an issue is placed, every parent from an earlier tier already has a directory.

use std::{
	collections::HashMap,
	fmt,
	path::{Path, PathBuf},
};

use color_eyre::eyre::Result;

use super::{lifecycle::prepare_output_root, materialize::Materializer, relationship::Resolver};
use crate::issue::{Issue, Tier};

/// Issue key -> directory already created for it.
pub type IssueDirs = HashMap<String, PathBuf>;

/// Issues split by processing tier, each keeping input order.
#[derive(Debug, Default)]
pub struct TierPartition<'a> {
	pub initiatives: Vec<&'a Issue>,
	pub epics: Vec<&'a Issue>,
	pub others: Vec<&'a Issue>,
}

pub fn partition(issues: &[Issue]) -> TierPartition<'_> {
	let mut tiers = TierPartition::default();
	for issue in issues {
		match issue.type_label().tier() {
			Tier::Initiative => tiers.initiatives.push(issue),
			Tier::Epic => tiers.epics.push(issue),
			Tier::Other => tiers.others.push(issue),
		}
	}
	tiers
}

/// How a tier's issues are placed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Placement {
	/// Always directly in the fallback directory
	Flat,
	/// Under the parent's directory when it exists, in the fallback directory otherwise
	UnderParent,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExportSummary {
	pub initiatives: usize,
	pub epics: usize,
	pub others: usize,
}

impl ExportSummary {
	pub fn total(&self) -> usize {
		self.initiatives + self.epics + self.others
	}
}

impl fmt::Display for ExportSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "- Initiatives: {}", self.initiatives)?;
		writeln!(f, "- Epics: {}", self.epics)?;
		write!(f, "- Stories/Tasks: {}", self.others)
	}
}

pub struct HierarchyBuilder<'a> {
	materializer: Materializer<'a>,
	resolver: Resolver<'a>,
}

impl<'a> HierarchyBuilder<'a> {
	pub fn new(materializer: Materializer<'a>, resolver: Resolver<'a>) -> Self {
		Self { materializer, resolver }
	}

	/// Export `issues` into `output_root`, which must be absent or empty.
	pub fn build(&self, issues: &[Issue], output_root: &Path) -> Result<ExportSummary> {
		let unassigned = prepare_output_root(output_root)?;
		let tiers = partition(issues);
		tracing::info!(
			initiatives = tiers.initiatives.len(),
			epics = tiers.epics.len(),
			others = tiers.others.len(),
			"building hierarchy"
		);

		let dirs = self.place_tier(&tiers.initiatives, Placement::Flat, output_root, IssueDirs::new())?;
		let dirs = self.place_tier(&tiers.epics, Placement::UnderParent, output_root, dirs)?;
		let dirs = self.place_tier(&tiers.others, Placement::UnderParent, &unassigned, dirs)?;
		tracing::debug!(materialized = dirs.len(), "hierarchy complete");

		Ok(ExportSummary {
			initiatives: tiers.initiatives.len(),
			epics: tiers.epics.len(),
			others: tiers.others.len(),
		})
	}

	/// Materialize one tier on top of the directories created so far, returning the extended map.
	pub fn place_tier(&self, issues: &[&Issue], placement: Placement, fallback: &Path, mut dirs: IssueDirs) -> Result<IssueDirs> {
		for &issue in issues {
			let relationships = self.resolver.resolve(issue)?;
			let parent_dir = match (placement, &relationships.parent) {
				(Placement::UnderParent, Some(parent)) => {
					let found = dirs.get(&parent.key).cloned();
					if found.is_none() {
						tracing::warn!(issue = %issue.key, parent = %parent.key, "parent not part of this export, placing in {}", fallback.display());
					}
					found
				}
				_ => None,
			};
			let base_dir = parent_dir.as_deref().unwrap_or(fallback);

			let dir = self.materializer.materialize(issue, &relationships, base_dir)?;
			dirs.insert(issue.key.clone(), dir);
		}
		Ok(dirs)
	}
}
