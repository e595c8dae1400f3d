//! Loads bundler configuration files.
//!
//! The default loader parses the config source with tree-sitter and extracts
//! `resolve.alias` / `resolve.extensions` statically from the object literal;
//! the config is never executed. `path.join(__dirname, ...)`-style target
//! expressions are evaluated against the config file's own directory, which
//! covers both plain CommonJS and ESM/TypeScript config sources.

use crate::models::Language;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tree_sitter::{Node, Parser};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read bundler config {}: {}", path.display(), source)]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to initialize config grammar: {0}")]
    GrammarError(String),
    #[error("Failed to parse bundler config: {}", .0.display())]
    ParseError(PathBuf),
}

/// Bundler configuration reduced to the fields this tool consumes.
///
/// A config without a usable `resolve.alias` is represented as an empty
/// `alias` list, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBundlerConfig {
    /// `resolve.alias` entries in declaration order
    pub alias: Vec<(String, String)>,
    /// `resolve.extensions`, when declared
    pub extensions: Option<Vec<String>>,
}

/// Loads a bundler config object from a resolved file path.
pub trait ConfigLoader {
    fn load(&self, path: &Path) -> Result<RawBundlerConfig, LoadError>;
}

/// Default loader backed by tree-sitter static extraction
#[derive(Debug, Default)]
pub struct SourceConfigLoader;

impl ConfigLoader for SourceConfigLoader {
    fn load(&self, path: &Path) -> Result<RawBundlerConfig, LoadError> {
        let source = fs::read_to_string(path).map_err(|e| LoadError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let mut parser = Parser::new();
        let language = match Language::from_path(path) {
            Some(Language::TypeScript) => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            _ => tree_sitter_javascript::LANGUAGE.into(),
        };
        parser
            .set_language(&language)
            .map_err(|e| LoadError::GrammarError(e.to_string()))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| LoadError::ParseError(path.to_path_buf()))?;

        let mut config = RawBundlerConfig::default();
        extract_resolve(&tree.root_node(), &source, &config_dir, &mut config);
        Ok(config)
    }
}

/// Find the `resolve: { ... }` property anywhere in the config source and
/// pull its `alias` / `extensions` fields.
fn extract_resolve(node: &Node, source: &str, config_dir: &Path, out: &mut RawBundlerConfig) {
    if node.kind() == "pair" && key_name(node, source).as_deref() == Some("resolve") {
        if let Some(object) = object_value(node) {
            extract_resolve_fields(&object, source, config_dir, out);
            return;
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        extract_resolve(&child, source, config_dir, out);
    }
}

fn extract_resolve_fields(object: &Node, source: &str, config_dir: &Path, out: &mut RawBundlerConfig) {
    let mut cursor = object.walk();
    for child in object.children(&mut cursor) {
        if child.kind() != "pair" {
            continue;
        }
        match key_name(&child, source).as_deref() {
            Some("alias") => {
                if let Some(alias_object) = object_value(&child) {
                    extract_alias_entries(&alias_object, source, config_dir, &mut out.alias);
                }
            }
            Some("extensions") => {
                if let Some(value) = child.child_by_field_name("value") {
                    if value.kind() == "array" {
                        out.extensions = Some(extract_string_array(&value, source));
                    }
                }
            }
            _ => {}
        }
    }
}

fn extract_alias_entries(
    object: &Node,
    source: &str,
    config_dir: &Path,
    out: &mut Vec<(String, String)>,
) {
    let mut cursor = object.walk();
    for child in object.children(&mut cursor) {
        if child.kind() != "pair" {
            continue;
        }
        let Some(name) = key_name(&child, source) else {
            continue;
        };
        let Some(value) = child.child_by_field_name("value") else {
            continue;
        };
        // Targets we cannot evaluate statically are skipped, not fatal.
        let Some(target) = eval_target(&value, source, config_dir) else {
            continue;
        };
        // A later duplicate key overwrites the earlier value in place,
        // matching object-literal semantics.
        if let Some(existing) = out.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = target;
        } else {
            out.push((name, target));
        }
    }
}

fn eval_target(node: &Node, source: &str, config_dir: &Path) -> Option<String> {
    match node.kind() {
        "string" => Some(string_content(node, source)),
        "call_expression" => eval_path_call(node, source, config_dir),
        _ => None,
    }
}

/// Evaluate `path.join(__dirname, ...)` / `path.resolve(__dirname, ...)`
/// with string-literal arguments.
fn eval_path_call(node: &Node, source: &str, config_dir: &Path) -> Option<String> {
    let function = node.child_by_field_name("function")?;
    if function.kind() != "member_expression" {
        return None;
    }
    let object = function.child_by_field_name("object")?;
    let property = function.child_by_field_name("property")?;
    if text(&object, source) != "path" {
        return None;
    }
    let method = text(&property, source);
    if method != "join" && method != "resolve" {
        return None;
    }

    let arguments = node.child_by_field_name("arguments")?;
    let mut result = PathBuf::new();
    let mut cursor = arguments.walk();
    for argument in arguments.named_children(&mut cursor) {
        match argument.kind() {
            "identifier" if text(&argument, source) == "__dirname" => {
                result = config_dir.to_path_buf();
            }
            "string" => result.push(string_content(&argument, source)),
            "comment" => {}
            _ => return None,
        }
    }

    Some(paths::module_string(&paths::normalize(&result)))
}

fn extract_string_array(array: &Node, source: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut cursor = array.walk();
    for child in array.named_children(&mut cursor) {
        if child.kind() == "string" {
            values.push(string_content(&child, source));
        }
    }
    values
}

fn key_name(pair: &Node, source: &str) -> Option<String> {
    let key = pair.child_by_field_name("key")?;
    match key.kind() {
        "property_identifier" | "identifier" => Some(text(&key, source).to_string()),
        "string" => Some(string_content(&key, source)),
        _ => None,
    }
}

fn object_value<'a>(pair: &'a Node<'a>) -> Option<Node<'a>> {
    let value = pair.child_by_field_name("value")?;
    if value.kind() == "object" {
        Some(value)
    } else {
        None
    }
}

fn string_content(node: &Node, source: &str) -> String {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "string_fragment" {
            return text(&child, source).to_string();
        }
    }
    String::new()
}

fn text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn load_fixture(dir: &TempDir, name: &str, contents: &str) -> RawBundlerConfig {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        SourceConfigLoader.load(&path).unwrap()
    }

    #[test]
    fn test_commonjs_config() {
        let dir = TempDir::new().unwrap();
        let config = load_fixture(
            &dir,
            "webpack.config.js",
            r#"
var path = require('path');

module.exports = {
    resolve: {
        alias: {
            'my-absolute-test-lib': path.join(__dirname, 'assets/le-test-lib'),
            'my-relative-test-lib': './assets/le-test-lib/',
            'my-alternate-module-name': 'module-name',
            'my-scoped-module-name': '@scoped/module-name'
        }
    }
};
"#,
        );

        assert_eq!(config.alias.len(), 4);
        assert_eq!(config.alias[0].0, "my-absolute-test-lib");
        assert_eq!(
            config.alias[0].1,
            dir.path().join("assets/le-test-lib").to_string_lossy()
        );
        assert_eq!(
            config.alias[1],
            (
                "my-relative-test-lib".to_string(),
                "./assets/le-test-lib/".to_string()
            )
        );
        assert_eq!(
            config.alias[3],
            (
                "my-scoped-module-name".to_string(),
                "@scoped/module-name".to_string()
            )
        );
        assert!(config.extensions.is_none());
    }

    #[test]
    fn test_esm_typescript_config() {
        let dir = TempDir::new().unwrap();
        let config = load_fixture(
            &dir,
            "webpack.config.ts",
            r#"
import path from 'path';

export default {
    mode: 'development',
    resolve: {
        extensions: ['.ts', '.js'],
        alias: {
            lib: path.resolve(__dirname, 'src', 'lib'),
        },
    },
};
"#,
        );

        assert_eq!(config.alias.len(), 1);
        assert_eq!(config.alias[0].0, "lib");
        assert_eq!(
            config.alias[0].1,
            dir.path().join("src/lib").to_string_lossy()
        );
        assert_eq!(
            config.extensions,
            Some(vec![".ts".to_string(), ".js".to_string()])
        );
    }

    #[test]
    fn test_missing_resolve_yields_empty_config() {
        let dir = TempDir::new().unwrap();
        let config = load_fixture(
            &dir,
            "webpack.config.js",
            "module.exports = { entry: './src/index.js' };",
        );
        assert!(config.alias.is_empty());
        assert!(config.extensions.is_none());
    }

    #[test]
    fn test_malformed_resolve_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let config = load_fixture(
            &dir,
            "webpack.config.js",
            "module.exports = { resolve: 'not-an-object' };",
        );
        assert!(config.alias.is_empty());
    }

    #[test]
    fn test_unevaluable_target_is_skipped() {
        let dir = TempDir::new().unwrap();
        let config = load_fixture(
            &dir,
            "webpack.config.js",
            r#"
module.exports = {
    resolve: {
        alias: {
            dynamic: computeTarget(),
            stable: 'module-name',
        }
    }
};
"#,
        );
        assert_eq!(
            config.alias,
            vec![("stable".to_string(), "module-name".to_string())]
        );
    }

    #[test]
    fn test_duplicate_key_overwrites_in_place() {
        let dir = TempDir::new().unwrap();
        let config = load_fixture(
            &dir,
            "webpack.config.js",
            r#"
module.exports = {
    resolve: {
        alias: {
            lib: './first',
            other: './other',
            lib: './second',
        }
    }
};
"#,
        );
        assert_eq!(
            config.alias,
            vec![
                ("lib".to_string(), "./second".to_string()),
                ("other".to_string(), "./other".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SourceConfigLoader.load(Path::new("/does/not/exist.js"));
        assert!(matches!(result, Err(LoadError::IoError { .. })));
    }
}
