//! Source directory discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PipelineResult;

/// Extension (including the dot) a source file name must end with.
pub const CSV_SUFFIX: &str = ".csv";

/// List the `*.csv` regular files directly inside `directory`, sorted by file name.
///
/// Subdirectories are not descended into; directories and other non-file entries are skipped.
/// Symlinks are followed, so a link to a CSV file counts as a file and a dangling link is
/// skipped, as are names that are not valid UTF-8. Only a failure to read `directory` itself
/// is an error.
pub fn scan(directory: impl AsRef<Path>) -> PipelineResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(std::io::Error::from(err).into()),
            Err(_) => continue,
        };
        if entry.file_type().is_file() && table_name_for(entry.path()).is_some() {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

/// Table name for a source file: its file name without the `.csv` suffix.
///
/// Returns `None` unless the file name is valid UTF-8, ends in `.csv` and has a non-empty stem.
pub fn table_name_for(path: &Path) -> Option<String> {
    let table = path.file_name()?.to_str()?.strip_suffix(CSV_SUFFIX)?;
    (!table.is_empty()).then(|| table.to_owned())
}
