use anyhow::{bail, Context, Result};
use ir_core::DocumentStore;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

/// Regular, non-hidden files under `dir`, sorted by path so document ids are
/// stable between runs.
pub fn collect_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("{} does not exist or is not a directory", dir.display());
    }
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Read every file into a fresh store. Unreadable or non-UTF-8 files abort
/// the load.
pub fn load_documents(dir: &Path, recursive: bool) -> Result<DocumentStore> {
    let mut store = DocumentStore::new();
    for path in collect_files(dir, recursive)? {
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        let id = store.push(name, content);
        tracing::debug!(id, path = %path.display(), "loaded document");
    }
    Ok(store)
}
