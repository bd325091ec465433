use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::CliConfig;

/// File-name suffixes the reviewer accepts, with the language each one
/// maps to. Matching is a case-sensitive suffix test on the file name,
/// so `a.PY` is skipped while `a.tar.py` is reviewed as Python.
const LANGUAGES: &[(&str, &str)] = &[
    (".py", "Python"),
    (".js", "JavaScript"),
    (".ts", "TypeScript"),
    (".java", "Java"),
    (".cpp", "C++"),
    (".c", "C"),
    (".go", "Go"),
    (".rb", "Ruby"),
    (".php", "PHP"),
];

pub fn is_source_file(name: &str) -> bool {
    LANGUAGES.iter().any(|(suffix, _)| name.ends_with(suffix))
}

/// Language name for a reviewable path, `None` for anything outside the
/// supported set.
pub fn detect_language(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    LANGUAGES
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(_, language)| *language)
}

/// Recursive source-file discovery rooted at a directory.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    follow_symlinks: bool,
}

impl SourceScanner {
    pub fn new() -> Self {
        Self {
            follow_symlinks: false,
        }
    }

    pub fn from_config(config: &CliConfig) -> Self {
        Self {
            follow_symlinks: config.review.follow_symlinks,
        }
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Walk `root` and collect every reviewable file. Unreadable entries
    /// are skipped rather than failing the walk, so a single permission
    /// error never hides the rest of the tree.
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(self.follow_symlinks) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("skipping unreadable entry under {}: {}", root.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_source_file(name) {
                    files.push(entry.into_path());
                }
            }
        }
        files
    }
}

impl Default for SourceScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan with default options. Symlinks are not followed.
pub fn scan_directory(root: &Path) -> Vec<PathBuf> {
    SourceScanner::new().scan(root)
}
