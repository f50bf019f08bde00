use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const CORPUS_EXTENSION: &str = "sql";

/// `*.sql` files directly inside `directory`, sorted, without the names
/// listed in `excluded`.
pub fn discover_corpora(directory: &Path, excluded: &[String]) -> Result<Vec<PathBuf>> {
    let mut corpora = Vec::new();

    for entry in WalkDir::new(directory)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_sql = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(CORPUS_EXTENSION))
            .unwrap_or(false);
        if !is_sql {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if excluded.iter().any(|e| e.as_str() == name) {
            continue;
        }

        corpora.push(path.to_path_buf());
    }

    // Sort by path for consistent ordering
    corpora.sort();

    Ok(corpora)
}
