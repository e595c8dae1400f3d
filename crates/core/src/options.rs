/// Default bundler config path expression
pub const DEFAULT_CONFIG: &str = "./webpack.config.js";

/// Default extension probe order for extensionless rewrite targets
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx"];

/// Options controlling alias resolution and rewriting
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Bundler config path expression; may contain `${VAR}` placeholders
    pub config: String,
    /// Search ancestor directories of each source file for the config
    pub find_config: bool,
    /// Extension probe order; overridden by `resolve.extensions` when the
    /// loaded config declares one
    pub extensions: Vec<String>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            config: DEFAULT_CONFIG.to_string(),
            find_config: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl RewriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = config.into();
        self
    }

    pub fn with_find_config(mut self, find_config: bool) -> Self {
        self.find_config = find_config;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }
}
