use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Language of a source file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            "ts" | "mts" | "cts" | "tsx" => Some(Language::TypeScript),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| Self::from_extension(&ext.to_string_lossy()))
    }
}

/// Syntactic site a module reference was found at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `require("x")`
    Require,
    /// `import("x")`
    DynamicImport,
    /// `import ... from "x"`
    Import,
    /// `export ... from "x"`
    Export,
}

/// A single module-reference string literal in a source file.
///
/// `span` is the byte range of the literal's content, excluding the quotes,
/// so a replacement can be spliced in without touching any other byte.
#[derive(Debug, Clone)]
pub struct ModuleReference {
    /// The literal value as written (quotes stripped, escapes untouched)
    pub value: String,
    /// Byte range of the content between the quotes
    pub span: Range<usize>,
    /// Line number in source file
    pub line: usize,
    /// Column position
    pub column: usize,
    /// Where the reference occurred
    pub kind: ReferenceKind,
}

/// One applied rewrite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteRecord {
    /// Line number in source file
    pub line: usize,
    /// Column position
    pub column: usize,
    /// Where the reference occurred
    pub kind: ReferenceKind,
    /// The reference as written
    pub from: String,
    /// The reference after alias resolution
    pub to: String,
}

/// Rewrite results for a single source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRewrite {
    /// Relative path from project root
    pub path: PathBuf,
    /// Absolute path
    pub absolute_path: PathBuf,
    /// Detected language
    pub language: Language,
    /// All rewrites applied to this file
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewrites: Vec<RewriteRecord>,
    /// Whether any reference changed
    pub changed: bool,
}

/// Aggregated rewrite results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteReport {
    /// Project root path
    pub root: PathBuf,
    /// All source files processed
    pub files: Vec<FileRewrite>,
    /// Rewrite statistics
    pub stats: RewriteStats,
    /// Run metadata
    pub metadata: RunMetadata,
}

impl RewriteReport {
    /// Filter to only the files that changed
    pub fn filter_to_changed(&self) -> Self {
        let files: Vec<FileRewrite> = self
            .files
            .iter()
            .filter(|f| f.changed)
            .cloned()
            .collect();

        RewriteReport {
            root: self.root.clone(),
            files,
            stats: self.stats.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Statistics about a rewrite run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewriteStats {
    pub total_files: usize,
    pub javascript_files: usize,
    pub typescript_files: usize,
    pub files_changed: usize,
    pub total_rewrites: usize,
}

/// Run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub duration_ms: u64,
    pub files_per_second: f64,
    pub timestamp: String,
    pub tool_version: String,
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self {
            duration_ms: 0,
            files_per_second: 0.0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
