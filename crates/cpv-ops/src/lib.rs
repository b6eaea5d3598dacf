pub mod ops_centralize;
pub mod ops_scan;

use std::path::{Path, PathBuf};

use cpv_util::errors::CpvError;

/// Check that `input` names an existing directory and return it.
pub fn validate_root(input: &str) -> Result<PathBuf, CpvError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CpvError::InvalidRootPath {
            path: input.to_string(),
            reason: "please provide a directory path".to_string(),
        });
    }
    let path = Path::new(trimmed);
    if !path.exists() {
        return Err(CpvError::InvalidRootPath {
            path: trimmed.to_string(),
            reason: "the provided directory does not exist".to_string(),
        });
    }
    if !path.is_dir() {
        return Err(CpvError::InvalidRootPath {
            path: trimmed.to_string(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(path.to_path_buf())
}
