//! Module resolution strategies
//!
//! An element entry in the options names one or more component descriptor
//! files. How the entry maps to files is chosen at configuration time:
//! - `direct`: the entry is a path or a glob relative to the project root
//! - `base-url`: the entry is a module id resolved against a base directory,
//!   with prefix rewrites and a file suffix

use globset::{Glob, GlobMatcher};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{ResolverConfig, ResolverKind};

/// Errors for element resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Element not found: {0}")]
    NotFound(PathBuf),

    #[error("Pattern '{0}' matched no files")]
    NoMatch(String),
}

/// Maps an element entry to descriptor files
pub trait ModuleResolver {
    /// Resolve `entry` relative to the project `root`
    fn resolve(&self, root: &Path, entry: &str) -> Result<Vec<PathBuf>, ResolveError>;
}

/// Build the resolver selected by the options
pub fn resolver_for(config: &ResolverConfig) -> Box<dyn ModuleResolver> {
    match config.kind {
        ResolverKind::Direct => Box::new(DirectResolver),
        ResolverKind::BaseUrl => Box::new(BaseUrlResolver::new(
            config.base_url.clone().unwrap_or_default(),
            config.suffix.clone(),
            config.paths.clone(),
        )),
    }
}

/// Entries are file paths or glob patterns
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectResolver;

impl DirectResolver {
    fn is_glob(entry: &str) -> bool {
        entry.contains(['*', '?', '[', '{'])
    }

    /// Leading directories of a pattern that contain no glob syntax
    fn literal_dir(pattern: &str) -> &str {
        let first_glob = pattern
            .find(['*', '?', '[', '{'])
            .unwrap_or(pattern.len());
        match pattern[..first_glob].rfind('/') {
            Some(slash) => &pattern[..slash],
            None => "",
        }
    }

    fn expand_glob(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, ResolveError> {
        let matcher: GlobMatcher = Glob::new(pattern)?.compile_matcher();
        let mut matches = Vec::new();

        let base = root.join(Self::literal_dir(pattern));
        if !base.is_dir() {
            return Err(ResolveError::NoMatch(pattern.to_string()));
        }

        for entry in WalkDir::new(&base)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(rel_path) = entry.path().strip_prefix(root) else {
                continue;
            };
            if matcher.is_match(rel_path) {
                matches.push(entry.path().to_path_buf());
            }
        }

        if matches.is_empty() {
            return Err(ResolveError::NoMatch(pattern.to_string()));
        }
        matches.sort();
        Ok(matches)
    }
}

impl ModuleResolver for DirectResolver {
    fn resolve(&self, root: &Path, entry: &str) -> Result<Vec<PathBuf>, ResolveError> {
        if Self::is_glob(entry) {
            return Self::expand_glob(root, entry);
        }

        let path = root.join(entry);
        if path.is_file() {
            Ok(vec![path])
        } else {
            Err(ResolveError::NotFound(path))
        }
    }
}

/// Entries are module ids, e.g. `components/Greeting`
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
    base_url: String,
    suffix: String,
    paths: BTreeMap<String, String>,
}

impl BaseUrlResolver {
    pub fn new(base_url: String, suffix: String, paths: BTreeMap<String, String>) -> Self {
        Self {
            base_url,
            suffix,
            paths,
        }
    }

    /// Apply the longest matching `paths` prefix (whole segments only)
    fn rewrite(&self, id: &str) -> String {
        let best = self
            .paths
            .iter()
            .filter(|(prefix, _)| {
                id == prefix.as_str()
                    || id
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|(prefix, _)| prefix.len());

        match best {
            Some((prefix, target)) => format!("{}{}", target, &id[prefix.len()..]),
            None => id.to_string(),
        }
    }

    /// Path a module id maps to, without checking it exists
    pub fn module_path(&self, root: &Path, id: &str) -> PathBuf {
        let rewritten = self.rewrite(id);
        root.join(&self.base_url)
            .join(format!("{}{}", rewritten, self.suffix))
    }
}

impl ModuleResolver for BaseUrlResolver {
    fn resolve(&self, root: &Path, entry: &str) -> Result<Vec<PathBuf>, ResolveError> {
        let path = self.module_path(root, entry);
        if path.is_file() {
            Ok(vec![path])
        } else {
            Err(ResolveError::NotFound(path))
        }
    }
}
