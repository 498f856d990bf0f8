//! Include/exclude wildcard filter for files below a base directory.
//!
//! Patterns are matched against the `/`-separated path relative to the
//! base directory:
//! - `*` matches any run of characters except `/`
//! - `?` matches exactly one character
//! - `**` as a whole segment matches any number of directories
//!
//! A pattern without a `/` is also tried against the file name alone, so
//! `*.exec` finds execution data at any depth.

use crate::utils::config::DEFAULT_DATA_FILE_INCLUDE;
use crate::utils::error::{ConfigError, DiscoveryError};
use glob::{MatchOptions, Pattern};
use log::{debug, info};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A single compiled wildcard pattern
#[derive(Debug, Clone)]
struct WildcardPattern {
    source: String,
    pattern: Pattern,
    file_name_only: bool,
}

impl WildcardPattern {
    fn compile(raw: &str) -> Result<Self, ConfigError> {
        let normalized = raw.trim().replace('\\', "/");
        let normalized = normalized.trim_start_matches("./").to_string();

        let pattern = Pattern::new(&normalized).map_err(|source| ConfigError::InvalidPattern {
            pattern: raw.to_string(),
            source,
        })?;

        Ok(Self {
            file_name_only: !normalized.contains('/'),
            source: normalized,
            pattern,
        })
    }

    fn matches(&self, relative: &str) -> bool {
        if self.pattern.matches_with(relative, MATCH_OPTIONS) {
            return true;
        }

        if self.file_name_only {
            let file_name = relative.rsplit('/').next().unwrap_or(relative);
            return self.pattern.matches_with(file_name, MATCH_OPTIONS);
        }

        false
    }
}

/// Include/exclude filter over files in a directory tree
///
/// **Public** - built once from configuration, reused for every base dir
#[derive(Debug, Clone)]
pub struct FileFilter {
    includes: Vec<WildcardPattern>,
    excludes: Vec<WildcardPattern>,
}

impl FileFilter {
    /// Compile a filter, falling back to `default_include` when no include
    /// patterns are given
    ///
    /// # Errors
    /// * `ConfigError::InvalidPattern` - a pattern is not a valid wildcard
    pub fn new<I, E, S, T>(includes: I, excludes: E, default_include: &str) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut compiled_includes = includes
            .into_iter()
            .map(|p| WildcardPattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if compiled_includes.is_empty() {
            compiled_includes.push(WildcardPattern::compile(default_include)?);
        }

        let compiled_excludes = excludes
            .into_iter()
            .map(|p| WildcardPattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            includes: compiled_includes,
            excludes: compiled_excludes,
        })
    }

    /// Filter for execution data files (default `target/*.exec`)
    pub fn for_data_files(includes: &[String], excludes: &[String]) -> Result<Self, ConfigError> {
        Self::new(includes, excludes, DEFAULT_DATA_FILE_INCLUDE)
    }

    /// Include patterns in effect, after defaulting
    pub fn include_patterns(&self) -> Vec<&str> {
        self.includes.iter().map(|p| p.source.as_str()).collect()
    }

    /// Exclude patterns in effect
    pub fn exclude_patterns(&self) -> Vec<&str> {
        self.excludes.iter().map(|p| p.source.as_str()).collect()
    }

    /// Check a `/`-separated relative path against the filter
    ///
    /// True when at least one include matches and no exclude matches.
    pub fn matches(&self, relative: &str) -> bool {
        self.includes.iter().any(|p| p.matches(relative))
            && !self.excludes.iter().any(|p| p.matches(relative))
    }

    /// Enumerate matching files below `base_dir`
    ///
    /// **Public** - the data file locator entry point
    ///
    /// # Returns
    /// Absolute paths sorted by their path relative to `base_dir`. A missing
    /// base directory yields an empty list.
    ///
    /// # Errors
    /// * `DiscoveryError::Walk` - a directory below an existing base dir
    ///   cannot be read, or symbolic links form a loop
    pub fn find_files(&self, base_dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        Ok(self
            .find_entries(base_dir)?
            .into_iter()
            .map(|(_, path)| path)
            .collect())
    }

    /// Like `find_files`, paired with each file's `/`-separated relative path
    ///
    /// Symbolic links are followed, so a linked file is reported under the
    /// link's own path.
    pub fn find_entries(&self, base_dir: &Path) -> Result<Vec<(String, PathBuf)>, DiscoveryError> {
        let base_dir = absolutize(base_dir);

        if !base_dir.is_dir() {
            info!("Directory {} does not exist, no files found", base_dir.display());
            return Ok(Vec::new());
        }

        let mut found: Vec<(String, PathBuf)> = Vec::new();
        let walker = WalkDir::new(&base_dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|source| DiscoveryError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| base_dir.clone()),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            let Some(relative) = relative_path(&base_dir, entry.path()) else {
                continue;
            };
            if self.matches(&relative) {
                found.push((relative, entry.into_path()));
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));

        debug!("{} file(s) matched in {}", found.len(), base_dir.display());

        Ok(found)
    }
}

/// Locate files in `base_dir` using one-off include/exclude patterns
///
/// **Public** - convenience over `FileFilter` for the `find` command and tests
///
/// # Errors
/// * `DiscoveryError::Pattern` - a pattern is malformed, checked before any I/O
/// * `DiscoveryError::Walk` - the directory tree cannot be read
pub fn find_files(
    base_dir: &Path,
    includes: &[String],
    excludes: &[String],
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let filter = FileFilter::for_data_files(includes, excludes)?;
    filter.find_files(base_dir)
}

/// Make a path absolute against the current directory
fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Relative path with `/` separators, or None if `path` is outside `base`
fn relative_path(base: &Path, path: &Path) -> Option<String> {
    let stripped = path.strip_prefix(base).ok()?;

    let segments: Vec<String> = stripped
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    Some(segments.join("/"))
}
