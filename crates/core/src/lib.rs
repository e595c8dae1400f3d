//! Dealias Core Library
//!
//! This library rewrites bundler-alias module references in JavaScript and
//! TypeScript sources to the concrete paths the bundler's alias resolution
//! would have produced, so tooling that does not understand bundler aliases
//! (test runners, transpiler pipelines, plain Node execution) still resolves
//! modules correctly.
//!
//! # Features
//!
//! - Locate the bundler config via `${VAR}` path expressions, the working
//!   directory, or an upward search from each source file
//! - Extract `resolve.alias` / `resolve.extensions` statically from CommonJS
//!   or ESM/TypeScript config sources (the config is never executed)
//! - Rewrite `require()`, `import()`, `import ... from` and
//!   `export ... from` references by byte-span splicing, leaving every other
//!   source byte untouched
//! - Scan whole project trees in parallel and report rewrites as JSON, YAML,
//!   or a human-readable summary
//!
//! # Example
//!
//! ```no_run
//! use dealias_core::{format_report, OutputFormat, ProjectScanner, RewriteOptions, ScanConfig};
//! use std::path::PathBuf;
//!
//! let config = ScanConfig::new(PathBuf::from("."));
//! let options = RewriteOptions::new().with_config("./webpack.config.js");
//! let scanner = ProjectScanner::new(config, options).unwrap();
//! let report = scanner.scan().unwrap();
//!
//! let summary = format_report(&report, OutputFormat::Summary).unwrap();
//! println!("{}", summary);
//! ```

pub mod alias;
pub mod config;
pub mod loader;
pub mod locator;
pub mod models;
pub mod options;
pub mod output;
pub mod parsers;
pub mod paths;
pub mod rewriter;
pub mod scanner;

// Re-exports for convenience
pub use alias::{AliasEntry, AliasTable, AliasTarget};
pub use config::ScanConfig;
pub use loader::{ConfigLoader, LoadError, RawBundlerConfig, SourceConfigLoader};
pub use locator::LocateError;
pub use models::*;
pub use options::RewriteOptions;
pub use output::{format_report, format_summary, FormatError, OutputFormat};
pub use rewriter::{RewriteEngine, RewriteError};
pub use scanner::{ProjectScanner, ScanError};
