//! Locates the bundler config file for a source file.
//!
//! The configured path expression may contain `${VAR}` placeholders, may be
//! relative to the working directory, or, with `find_config`, is searched for
//! upward from the source file's own directory.

use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("Bundler config not found: {0}")]
    ConfigNotFound(String),
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap())
}

/// Expand `${NAME}` placeholders from the given environment map.
///
/// Substitution is textual only. An unset variable expands to the empty
/// string rather than failing.
pub fn expand_placeholders(input: &str, env: &HashMap<String, String>) -> String {
    placeholder_pattern()
        .replace_all(input, |caps: &regex::Captures| {
            env.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Resolve the bundler config path for `source_path`.
///
/// An absolute expanded path is taken as-is; a relative one resolves against
/// `cwd`, or, when `find_config` is set, against each ancestor directory of
/// the source file in turn. The returned path always exists.
pub fn locate(
    source_path: &Path,
    config_expr: &str,
    find_config: bool,
    cwd: &Path,
    env: &HashMap<String, String>,
) -> Result<PathBuf, LocateError> {
    let expanded = expand_placeholders(config_expr, env);
    let candidate = Path::new(&expanded);

    if candidate.is_absolute() {
        if candidate.is_file() {
            return Ok(candidate.to_path_buf());
        }
        return Err(LocateError::ConfigNotFound(expanded));
    }

    if !find_config {
        let resolved = cwd.join(candidate);
        if resolved.is_file() {
            return Ok(resolved);
        }
        return Err(LocateError::ConfigNotFound(resolved.display().to_string()));
    }

    let start = source_path.parent().unwrap_or(source_path);
    let mut dir = Some(start);
    while let Some(current) = dir {
        let probe = current.join(candidate);
        if probe.is_file() {
            return Ok(probe);
        }
        dir = current.parent();
    }

    Err(LocateError::ConfigNotFound(expanded))
}
