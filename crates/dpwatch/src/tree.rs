//! Directory listing written to the log after a run.

use std::path::Path;
use walkdir::WalkDir;

pub const IGNORED_DIRS: &[&str] = &[".git", "target", "__pycache__"];

/// One line per directory (`+--name/`) and file (`+--name`), indented four
/// spaces per level, skipping [`IGNORED_DIRS`].
pub fn render_tree(root: &Path) -> Vec<String> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !IGNORED_DIRS
                    .iter()
                    .any(|ignored| entry.file_name() == *ignored)
        });

    let mut lines = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let indent = " ".repeat(4 * entry.depth());
        let name = if entry.depth() == 0 {
            root.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| root.display().to_string())
        } else {
            entry.file_name().to_string_lossy().to_string()
        };

        if entry.file_type().is_dir() {
            lines.push(format!("{indent}+--{name}/"));
        } else {
            lines.push(format!("{indent}+--{name}"));
        }
    }
    lines
}

pub fn log_tree(root: &Path) {
    tracing::info!("Printing tree of files/dirs at {}", root.display());
    for line in render_tree(root) {
        tracing::info!("{}", line);
    }
}
