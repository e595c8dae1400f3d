use crate::config::{IgnoreFilter, ScanConfig};
use crate::models::{FileRewrite, Language, RewriteReport, RewriteStats, RunMetadata};
use crate::options::RewriteOptions;
use crate::rewriter::{RewriteEngine, RewriteError};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("{}: {}", path.display(), source)]
    FileError {
        path: PathBuf,
        #[source]
        source: RewriteError,
    },
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

/// Rewrites aliased imports across a project tree
pub struct ProjectScanner {
    config: ScanConfig,
    options: RewriteOptions,
    ignore_filter: IgnoreFilter,
}

impl ProjectScanner {
    pub fn new(config: ScanConfig, options: RewriteOptions) -> Result<Self, ScanError> {
        let ignore_filter = IgnoreFilter::new(&config)?;
        Ok(Self {
            config,
            options,
            ignore_filter,
        })
    }

    /// Rewrite the project and return the report. With `write` set in the
    /// scan config, changed files are updated in place; otherwise this is a
    /// dry run.
    pub fn scan(&self) -> Result<RewriteReport, ScanError> {
        let start = Instant::now();

        let source_files = self.find_source_files()?;

        // Each worker owns its own engine, so alias-table caches are never
        // shared across threads.
        let files: Vec<FileRewrite> = if self.config.threads == 1 {
            let mut engine = RewriteEngine::new(self.options.clone());
            let mut files = Vec::with_capacity(source_files.len());
            for (path, language) in &source_files {
                files.push(self.process_file(&mut engine, path, language)?);
            }
            files
        } else {
            let pool = if self.config.threads > 0 {
                Some(
                    rayon::ThreadPoolBuilder::new()
                        .num_threads(self.config.threads)
                        .build()
                        .map_err(|e| ScanError::ThreadPoolError(e.to_string()))?,
                )
            } else {
                None
            };

            let run = || {
                source_files
                    .par_iter()
                    .map_init(
                        || RewriteEngine::new(self.options.clone()),
                        |engine, (path, language)| self.process_file(engine, path, language),
                    )
                    .collect::<Result<Vec<FileRewrite>, ScanError>>()
            };

            match pool {
                Some(pool) => pool.install(run)?,
                None => run()?,
            }
        };

        let stats = self.calculate_stats(&files);

        let duration = start.elapsed();
        let metadata = RunMetadata {
            duration_ms: duration.as_millis() as u64,
            files_per_second: if duration.as_secs_f64() > 0.0 {
                files.len() as f64 / duration.as_secs_f64()
            } else {
                files.len() as f64
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Ok(RewriteReport {
            root: self.config.root.clone(),
            files,
            stats,
            metadata,
        })
    }

    /// Find all JS/TS source files under the root
    fn find_source_files(&self) -> Result<Vec<(PathBuf, Language)>, ScanError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.config.root)
            .into_iter()
            .filter_entry(|entry| {
                if entry.file_type().is_dir() {
                    return !self.ignore_filter.should_ignore(entry.path(), true);
                }
                true
            });

        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();

            if entry.file_type().is_dir() {
                continue;
            }
            if self.ignore_filter.should_ignore(path, false) {
                continue;
            }
            if let Some(language) = Language::from_path(path) {
                files.push((path.to_path_buf(), language));
            }
        }

        Ok(files)
    }

    /// Rewrite a single source file
    fn process_file(
        &self,
        engine: &mut RewriteEngine,
        path: &Path,
        language: &Language,
    ) -> Result<FileRewrite, ScanError> {
        let source = fs::read_to_string(path)?;
        let (output, rewrites) =
            engine
                .rewrite_source(&source, path)
                .map_err(|e| ScanError::FileError {
                    path: path.to_path_buf(),
                    source: e,
                })?;

        let changed = !rewrites.is_empty();
        if changed && self.config.write {
            fs::write(path, &output)?;
        }

        // When the root is a single file, the stripped path would be empty
        let relative_path = match path.strip_prefix(&self.config.root) {
            Ok(stripped) if !stripped.as_os_str().is_empty() => stripped.to_path_buf(),
            _ => path.to_path_buf(),
        };

        Ok(FileRewrite {
            path: relative_path,
            absolute_path: path.to_path_buf(),
            language: language.clone(),
            rewrites,
            changed,
        })
    }

    fn calculate_stats(&self, files: &[FileRewrite]) -> RewriteStats {
        let mut stats = RewriteStats::default();

        stats.total_files = files.len();
        for file in files {
            match file.language {
                Language::JavaScript => stats.javascript_files += 1,
                Language::TypeScript => stats.typescript_files += 1,
            }
            if file.changed {
                stats.files_changed += 1;
            }
            stats.total_rewrites += file.rewrites.len();
        }

        stats
    }
}
