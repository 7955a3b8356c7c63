use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::InputFile;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn walk_dir(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut found: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_audio_file(p, settings))
        .collect();

    found.sort_by_key(|p| p.to_string_lossy().to_lowercase());
    found
}

/// Expand command-line arguments into audio file paths.
///
/// Files are kept as given, in argument order; decoding problems surface
/// later as play failures. Directories are walked and filtered by extension.
pub fn expand_paths(args: &[PathBuf], settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for arg in args {
        if arg.is_dir() {
            let found = walk_dir(arg, settings);
            debug!(dir = %arg.display(), files = found.len(), "expanded directory");
            out.extend(found);
        } else if arg.is_file() {
            out.push(arg.clone());
        } else {
            warn!(path = %arg.display(), "skipping missing path");
        }
    }
    out
}

/// Read every path, collecting failures instead of stopping at the first one.
pub fn read_inputs(paths: &[PathBuf]) -> (Vec<InputFile>, Vec<(PathBuf, io::Error)>) {
    let mut files = Vec::new();
    let mut failures = Vec::new();
    for path in paths {
        match InputFile::read(path) {
            Ok(f) => files.push(f),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read input");
                failures.push((path.clone(), e));
            }
        }
    }
    (files, failures)
}
