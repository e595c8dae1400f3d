//! The per-file rewrite engine.
//!
//! For each source file the engine locates the bundler config once, builds
//! the alias table, caches it under the canonicalized file path, and splices
//! rewritten module references back into the source text by byte span. Every
//! byte outside a rewritten literal survives verbatim.

use crate::alias::AliasTable;
use crate::loader::{ConfigLoader, LoadError, SourceConfigLoader};
use crate::locator::{locate, LocateError};
use crate::models::{Language, ModuleReference, RewriteRecord};
use crate::options::RewriteOptions;
use crate::parsers::{create_parser, ParserError};
use crate::paths;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] LocateError),
    #[error("Config load error: {0}")]
    LoadError(#[from] LoadError),
    #[error("Parser error: {0}")]
    ParserError(#[from] ParserError),
}

/// Rewrites aliased module references in source files.
///
/// One engine instance owns one alias-table cache; callers that process
/// files in parallel use one engine per worker.
pub struct RewriteEngine {
    options: RewriteOptions,
    loader: Box<dyn ConfigLoader>,
    env: HashMap<String, String>,
    cwd: PathBuf,
    cache: HashMap<PathBuf, Rc<AliasTable>>,
}

impl RewriteEngine {
    pub fn new(options: RewriteOptions) -> Self {
        Self {
            options,
            loader: Box::new(SourceConfigLoader),
            env: std::env::vars().collect(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            cache: HashMap::new(),
        }
    }

    /// Substitute the config loader, e.g. with a fixture loader in tests
    pub fn with_loader(mut self, loader: Box<dyn ConfigLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Substitute the environment map used for `${VAR}` expansion
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Substitute the working directory used for relative config paths
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    /// Drop all cached alias tables
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Rewrite every aliased module reference in `source`, which lives at
    /// `source_path`. Returns the rewritten text plus one record per changed
    /// reference; non-matching references incur no change.
    pub fn rewrite_source(
        &mut self,
        source: &str,
        source_path: &Path,
    ) -> Result<(String, Vec<RewriteRecord>), RewriteError> {
        let table = self.table_for(source_path)?;
        if table.is_empty() {
            return Ok((source.to_string(), Vec::new()));
        }

        let absolute = self.absolutize(source_path);
        let from_dir = absolute.parent().unwrap_or(Path::new("/")).to_path_buf();

        let language = Language::from_path(source_path).unwrap_or(Language::JavaScript);
        let mut parser = create_parser(&language)?;
        let references = parser.parse(source);

        Ok(splice(source, &references, &table, &from_dir))
    }

    /// Read and rewrite one file. The file is not written back.
    pub fn rewrite_file(
        &mut self,
        path: &Path,
    ) -> Result<(String, Vec<RewriteRecord>), RewriteError> {
        let source = fs::read_to_string(path)?;
        self.rewrite_source(&source, path)
    }

    /// Alias table for the file, locating and loading the config only on a
    /// cache miss.
    fn table_for(&mut self, source_path: &Path) -> Result<Rc<AliasTable>, RewriteError> {
        let key = self.absolutize(source_path);
        if let Some(table) = self.cache.get(&key) {
            return Ok(Rc::clone(table));
        }

        let config_path = locate(
            &key,
            &self.options.config,
            self.options.find_config,
            &self.cwd,
            &self.env,
        )?;
        let config_path = self.absolutize(&config_path);
        let raw = self.loader.load(&config_path)?;
        let config_dir = config_path.parent().unwrap_or(Path::new("/"));
        let table = Rc::new(AliasTable::build(raw, config_dir, &self.options.extensions));

        self.cache.insert(key, Rc::clone(&table));
        Ok(table)
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        match fs::canonicalize(path) {
            Ok(resolved) => resolved,
            Err(_) => {
                let joined = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.cwd.join(path)
                };
                paths::normalize(&joined)
            }
        }
    }
}

fn splice(
    source: &str,
    references: &[ModuleReference],
    table: &AliasTable,
    from_dir: &Path,
) -> (String, Vec<RewriteRecord>) {
    let mut output = String::with_capacity(source.len());
    let mut records = Vec::new();
    let mut copied_up_to = 0;

    for reference in references {
        let Some(replacement) = table.rewrite(&reference.value, from_dir) else {
            continue;
        };
        if replacement == reference.value {
            continue;
        }

        output.push_str(&source[copied_up_to..reference.span.start]);
        output.push_str(&replacement);
        copied_up_to = reference.span.end;

        records.push(RewriteRecord {
            line: reference.line,
            column: reference.column,
            kind: reference.kind,
            from: reference.value.clone(),
            to: replacement,
        });
    }
    output.push_str(&source[copied_up_to..]);

    (output, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::RawBundlerConfig;
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    const RUNTIME_CONFIG: &str = r#"
var path = require('path');

module.exports = {
    resolve: {
        alias: {
            'my-absolute-test-lib': path.join(__dirname, 'assets/le-test-lib'),
            'my-relative-test-lib': './assets/le-test-lib/',
            'my-root-folder-lib': './fixtures/',
            'my-alternate-module-name': 'module-name',
            'my-scoped-module-name': '@scoped/module-name'
        }
    }
};
"#;

    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("runtime.webpack.config.js"), RUNTIME_CONFIG).unwrap();
            fs::create_dir_all(dir.path().join("assets/le-test-lib")).unwrap();
            fs::create_dir_all(dir.path().join("fixtures")).unwrap();
            fs::write(dir.path().join("fixtures/foo.js"), "").unwrap();
            Self { dir }
        }

        fn engine(&self) -> RewriteEngine {
            let options = RewriteOptions::new().with_config("./runtime.webpack.config.js");
            RewriteEngine::new(options).with_cwd(self.dir.path().to_path_buf())
        }

        fn root(&self) -> PathBuf {
            fs::canonicalize(self.dir.path()).unwrap()
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.root().join(relative)
        }
    }

    #[test]
    fn test_absolute_alias_rewrites_verbatim() {
        let project = Project::new();
        let source_path = project.path("fixtures/basic.absolute.js");
        let source = "var lib = require('my-absolute-test-lib');\n";

        let (output, records) = project
            .engine()
            .rewrite_source(source, &source_path)
            .unwrap();

        let expected_target = project.root().join("assets/le-test-lib");
        assert_eq!(
            output,
            format!("var lib = require('{}');\n", expected_target.display())
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].from, "my-absolute-test-lib");
    }

    #[test]
    fn test_relative_alias_rebases_per_file() {
        let project = Project::new();
        let source = "var lib = require('my-relative-test-lib');\n";

        let (from_fixtures, _) = project
            .engine()
            .rewrite_source(source, &project.path("fixtures/basic.relative.js"))
            .unwrap();
        assert_eq!(
            from_fixtures,
            "var lib = require('../assets/le-test-lib');\n"
        );

        let (from_root, _) = project
            .engine()
            .rewrite_source(source, &project.path("entry.js"))
            .unwrap();
        assert_eq!(from_root, "var lib = require('./assets/le-test-lib');\n");
    }

    #[test]
    fn test_root_folder_reference_probes_extension() {
        let project = Project::new();
        let source = "var foo = require('my-root-folder-lib/foo');\n";

        let (output, _) = project
            .engine()
            .rewrite_source(source, &project.path("fixtures/rootfolder.js"))
            .unwrap();
        assert_eq!(output, "var foo = require('./foo.js');\n");
    }

    #[test]
    fn test_alternate_and_scoped_module_names() {
        let project = Project::new();
        let source = "\
var alt = require('my-alternate-module-name');
var scoped = require('my-scoped-module-name/lib/util');
";

        let (output, records) = project
            .engine()
            .rewrite_source(source, &project.path("fixtures/module.js"))
            .unwrap();
        assert_eq!(
            output,
            "\
var alt = require('module-name');
var scoped = require('@scoped/module-name/lib/util');
"
        );
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_import_and_export_syntax() {
        let project = Project::new();
        let source = "\
import lib from 'my-alternate-module-name';
export { helper } from 'my-alternate-module-name';
";

        let (output, _) = project
            .engine()
            .rewrite_source(source, &project.path("fixtures/import.js"))
            .unwrap();
        assert_eq!(
            output,
            "\
import lib from 'module-name';
export { helper } from 'module-name';
"
        );
    }

    #[test]
    fn test_dynamic_import_rewritten() {
        let project = Project::new();
        let source = "import('my-alternate-module-name').then(m => m.default);\n";

        let (output, records) = project
            .engine()
            .rewrite_source(source, &project.path("fixtures/dynamic.js"))
            .unwrap();
        assert_eq!(output, "import('module-name').then(m => m.default);\n");
        assert_eq!(records[0].kind, crate::models::ReferenceKind::DynamicImport);
    }

    #[test]
    fn test_unmatched_references_untouched() {
        let project = Project::new();
        let source = "\
var fs = require('fs');
var rel = require('./sibling');
import other from 'some-package';
";

        let (output, records) = project
            .engine()
            .rewrite_source(source, &project.path("fixtures/plain.js"))
            .unwrap();
        assert_eq!(output, source);
        assert!(records.is_empty());
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let project = Project::new();
        let source_path = project.path("fixtures/basic.relative.js");
        let source = "var lib = require('my-relative-test-lib');\n";

        let mut engine = project.engine();
        let (first, _) = engine.rewrite_source(source, &source_path).unwrap();
        let (second, records) = engine.rewrite_source(&first, &source_path).unwrap();

        assert_eq!(first, second);
        assert!(records.is_empty());
    }

    #[test]
    fn test_quote_style_and_formatting_preserved() {
        let project = Project::new();
        let source = "const a = require(  \"my-alternate-module-name\"  );  // tail\n";

        let (output, _) = project
            .engine()
            .rewrite_source(source, &project.path("fixtures/style.js"))
            .unwrap();
        assert_eq!(output, "const a = require(  \"module-name\"  );  // tail\n");
    }

    #[test]
    fn test_env_placeholder_in_config_path() {
        let project = Project::new();
        let mut env = HashMap::new();
        env.insert(
            "PWD".to_string(),
            project.dir.path().to_string_lossy().into_owned(),
        );

        let options = RewriteOptions::new().with_config("${PWD}/runtime.webpack.config.js");
        let mut engine = RewriteEngine::new(options)
            .with_cwd(PathBuf::from("/"))
            .with_env(env);

        let (output, _) = engine
            .rewrite_source(
                "import lib from 'my-alternate-module-name';\n",
                &project.path("fixtures/import.js"),
            )
            .unwrap();
        assert_eq!(output, "import lib from 'module-name';\n");
    }

    #[test]
    fn test_env_placeholder_unset_fails() {
        let project = Project::new();
        let options = RewriteOptions::new().with_config("${PWD}/runtime.webpack.config.js");
        let mut engine = RewriteEngine::new(options)
            .with_cwd(PathBuf::from("/"))
            .with_env(HashMap::new());

        let result = engine.rewrite_source(
            "import lib from 'my-alternate-module-name';\n",
            &project.path("fixtures/import.js"),
        );
        assert!(matches!(result, Err(RewriteError::ConfigError(_))));
    }

    #[test]
    fn test_find_config_from_nested_source() {
        let project = Project::new();
        let nested = project.path("fixtures/deep/nested");
        fs::create_dir_all(&nested).unwrap();
        let source_path = nested.join("app.js");
        fs::write(&source_path, "").unwrap();

        let options = RewriteOptions::new()
            .with_config("runtime.webpack.config.js")
            .with_find_config(true);
        let mut engine =
            RewriteEngine::new(options).with_cwd(PathBuf::from("/"));

        let (output, _) = engine
            .rewrite_source("var lib = require('my-alternate-module-name');\n", &source_path)
            .unwrap();
        assert_eq!(output, "var lib = require('module-name');\n");
    }

    #[test]
    fn test_find_config_missing_throws() {
        let project = Project::new();
        let options = RewriteOptions::new()
            .with_config("DoesNotExist.js")
            .with_find_config(true);
        let mut engine = RewriteEngine::new(options).with_cwd(PathBuf::from("/"));

        let result = engine.rewrite_source(
            "var lib = require('my-alternate-module-name');\n",
            &project.path("fixtures/basic.absolute.js"),
        );
        assert!(matches!(result, Err(RewriteError::ConfigError(_))));
    }

    struct CountingLoader {
        loads: Rc<Cell<usize>>,
    }

    impl ConfigLoader for CountingLoader {
        fn load(&self, _path: &Path) -> Result<RawBundlerConfig, LoadError> {
            self.loads.set(self.loads.get() + 1);
            Ok(RawBundlerConfig {
                alias: vec![("lib".to_string(), "module-name".to_string())],
                extensions: None,
            })
        }
    }

    #[test]
    fn test_table_cached_per_file() {
        let project = Project::new();
        let loads = Rc::new(Cell::new(0));
        let mut engine = project.engine().with_loader(Box::new(CountingLoader {
            loads: Rc::clone(&loads),
        }));

        let source_path = project.path("fixtures/cached.js");
        let source = "var a = require('lib');\nvar b = require('lib/sub');\n";

        engine.rewrite_source(source, &source_path).unwrap();
        engine.rewrite_source(source, &source_path).unwrap();
        assert_eq!(loads.get(), 1);

        engine
            .rewrite_source(source, &project.path("fixtures/other.js"))
            .unwrap();
        assert_eq!(loads.get(), 2);

        engine.clear_cache();
        engine.rewrite_source(source, &source_path).unwrap();
        assert_eq!(loads.get(), 3);
    }
}
