use std::path::{Path, PathBuf};

use globset::GlobSet;

use crate::errors::CpvError;

/// Recursively collect files under `root` whose extension is one of
/// `extensions` (compared case-insensitively, without the leading dot).
///
/// Paths whose location relative to `root` matches `exclude` are skipped.
/// Symlinked directories are not followed. The result is sorted so that
/// callers see the same traversal order on every run.
pub fn collect_files_with_extensions(
    root: &Path,
    extensions: &[String],
    exclude: &GlobSet,
) -> Result<Vec<PathBuf>, CpvError> {
    let mut files = Vec::new();
    collect_recursive(root, root, extensions, exclude, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_recursive(
    root: &Path,
    dir: &Path,
    extensions: &[String],
    exclude: &GlobSet,
    out: &mut Vec<PathBuf>,
) -> Result<(), CpvError> {
    let entries = std::fs::read_dir(dir).map_err(|source| CpvError::Discovery {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| CpvError::Discovery {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type().map_err(|source| CpvError::Discovery {
            path: entry.path(),
            source,
        })?;
        let path = entry.path();
        if file_type.is_dir() {
            collect_recursive(root, &path, extensions, exclude, out)?;
        } else if file_type.is_file() && has_extension(&path, extensions) {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            if exclude.is_match(relative) {
                tracing::debug!("Excluded {}", relative.display());
                continue;
            }
            out.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

/// Display `path` relative to `root` when possible.
pub fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
