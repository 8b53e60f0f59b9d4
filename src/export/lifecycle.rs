//! Preparing and clearing the output tree.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};

use super::files::UNASSIGNED_DIR;
use crate::issue::ValidationError;

/// Ensure `path` can receive a fresh export: creates it if absent,
/// fails if it exists as a file or as a non-empty directory.
pub fn check_directory(path: &Path) -> Result<()> {
	if !path.exists() {
		std::fs::create_dir_all(path).wrap_err_with(|| format!("Failed to create {}", path.display()))?;
		return Ok(());
	}
	if !path.is_dir() {
		return Err(ValidationError::NotADirectory { path: path.to_path_buf() }.into());
	}
	let mut entries = std::fs::read_dir(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
	if entries.next().is_some() {
		return Err(ValidationError::NotEmpty { path: path.to_path_buf() }.into());
	}
	Ok(())
}

/// Remove everything under `path`, keeping `path` itself. No-op if it does not exist.
pub fn cleanup_directory(path: &Path) -> Result<()> {
	if !path.exists() {
		return Ok(());
	}
	for entry in std::fs::read_dir(path).wrap_err_with(|| format!("Failed to read {}", path.display()))? {
		let entry_path = entry?.path();
		// symlinks are removed, never followed
		let removed = if std::fs::symlink_metadata(&entry_path)?.is_dir() {
			std::fs::remove_dir_all(&entry_path)
		} else {
			std::fs::remove_file(&entry_path)
		};
		removed.wrap_err_with(|| format!("Failed to remove {}", entry_path.display()))?;
	}
	tracing::debug!(path = %path.display(), "cleared output directory");
	Ok(())
}

/// Validate the output root and create the unassigned bucket inside it.
/// Returns the bucket's path.
pub fn prepare_output_root(output_root: &Path) -> Result<PathBuf> {
	check_directory(output_root)?;
	let unassigned = output_root.join(UNASSIGNED_DIR);
	std::fs::create_dir_all(&unassigned).wrap_err_with(|| format!("Failed to create {}", unassigned.display()))?;
	Ok(unassigned)
}
