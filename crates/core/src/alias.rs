//! The alias table and its resolution rules.
//!
//! Matching walks the entries in declaration order and the first match wins,
//! even when one symbolic name is a prefix of another. Changing this to
//! longest-prefix ranking would change observable behavior for real configs.

use crate::loader::RawBundlerConfig;
use crate::paths;
use std::path::{Path, PathBuf};

/// Normalized alias target forms
#[derive(Debug, Clone, PartialEq)]
pub enum AliasTarget {
    /// Bare package specifier; the matched rest is appended verbatim
    Package(String),
    /// Absolute filesystem path
    Absolute(PathBuf),
    /// Path relative to the config file's own directory
    Relative(String),
}

#[derive(Debug, Clone)]
pub struct AliasEntry {
    pub name: String,
    pub target: AliasTarget,
}

/// Ordered alias table built from one bundler config.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    config_dir: PathBuf,
    extensions: Vec<String>,
}

impl AliasTable {
    /// Build a table from a loaded config. `resolve.extensions` takes
    /// precedence over `default_extensions` when the config declares it.
    pub fn build(
        config: RawBundlerConfig,
        config_dir: &Path,
        default_extensions: &[String],
    ) -> Self {
        let extensions = config
            .extensions
            .unwrap_or_else(|| default_extensions.to_vec());
        let entries = config
            .alias
            .into_iter()
            .map(|(name, target)| AliasEntry {
                name,
                target: classify_target(target),
            })
            .collect();

        Self {
            entries,
            config_dir: config_dir.to_path_buf(),
            extensions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    /// First entry matching `request` in declaration order, with the
    /// remainder of the request after the matched name.
    fn matched<'t, 'r>(&'t self, request: &'r str) -> Option<(&'t AliasEntry, &'r str)> {
        for entry in &self.entries {
            if request == entry.name {
                return Some((entry, ""));
            }
            if let Some(rest) = request.strip_prefix(entry.name.as_str()) {
                if rest.starts_with('/') {
                    return Some((entry, rest));
                }
            }
        }
        None
    }

    /// Compute the rewritten reference for `request` as seen from `from_dir`
    /// (the absolute directory of the referencing file), or `None` when no
    /// alias matches.
    pub fn rewrite(&self, request: &str, from_dir: &Path) -> Option<String> {
        let (entry, rest) = self.matched(request)?;

        match &entry.target {
            AliasTarget::Package(name) => Some(format!("{}{}", name, rest)),
            AliasTarget::Absolute(base) => {
                let resolved = self.probe(join_rest(base, rest));
                Some(paths::module_string(&resolved))
            }
            AliasTarget::Relative(relative) => {
                let anchored = self.config_dir.join(relative);
                let resolved = self.probe(paths::normalize(&join_rest(&anchored, rest)));
                let rebased = paths::relative_from(&resolved, from_dir);
                Some(paths::relative_module_string(&rebased))
            }
        }
    }

    /// When the resolved path does not exist verbatim, append the first
    /// probe extension that names an existing file. An unmatched path is
    /// returned untouched; failure is deferred to downstream tooling.
    fn probe(&self, path: PathBuf) -> PathBuf {
        if path.exists() {
            return path;
        }
        let base = path.clone().into_os_string();
        for extension in &self.extensions {
            let mut candidate = base.clone();
            candidate.push(extension);
            let candidate = PathBuf::from(candidate);
            if candidate.is_file() {
                return candidate;
            }
        }
        path
    }
}

fn classify_target(target: String) -> AliasTarget {
    if target.starts_with('.') {
        AliasTarget::Relative(target)
    } else if Path::new(&target).is_absolute() {
        AliasTarget::Absolute(PathBuf::from(target))
    } else {
        AliasTarget::Package(target)
    }
}

fn join_rest(base: &Path, rest: &str) -> PathBuf {
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        base.to_path_buf()
    } else {
        base.join(rest)
    }
}
