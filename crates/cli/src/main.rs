use clap::{Parser, ValueEnum};
use dealias_core::{format_report, OutputFormat, ProjectScanner, RewriteOptions, ScanConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dealias")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rewrite bundler alias imports in JS/TS sources to concrete paths")]
#[command(long_about = "Rewrites module references that go through bundler path aliases \
    (webpack `resolve.alias`) to the concrete paths the bundler would have resolved, so \
    test runners and other non-bundler tooling can load the sources directly. Supports \
    JavaScript (.js, .mjs, .cjs, .jsx) and TypeScript (.ts, .tsx) files.\n\n\
    By default this is a dry run that prints a report; use --write to update files in place.")]
pub struct Args {
    /// File or project root to rewrite
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Bundler config path expression; may contain ${VAR} placeholders
    #[arg(short, long, default_value = "./webpack.config.js")]
    pub config: String,

    /// Search ancestor directories of each source file for the config
    #[arg(long)]
    pub find_config: bool,

    /// Extension probe order for extensionless rewrite targets
    #[arg(long = "ext", value_name = "EXT", action = clap::ArgAction::Append)]
    pub extensions: Vec<String>,

    /// Apply rewrites in place instead of a dry run
    #[arg(short, long)]
    pub write: bool,

    /// Output format for the rewrite report
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Summary)]
    pub format: OutputFormatArg,

    /// Report file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only include changed files in the report
    #[arg(long)]
    pub changed_only: bool,

    /// Additional ignore patterns (gitignore style)
    #[arg(long, action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Ignore file path (defaults to .gitignore)
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,

    /// Include node_modules and build output in the scan
    #[arg(long)]
    pub include_deps: bool,

    /// Show verbose progress
    #[arg(short, long)]
    pub verbose: bool,

    /// Parallel threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Summary,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Summary => OutputFormat::Summary,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build rewrite options
    let mut options = RewriteOptions::new()
        .with_config(args.config.clone())
        .with_find_config(args.find_config);
    if !args.extensions.is_empty() {
        options = options.with_extensions(args.extensions.clone());
    }

    // Build scan config
    let mut config = ScanConfig::new(args.path.clone())
        .with_ignore_patterns(args.ignore.clone())
        .with_include_deps(args.include_deps)
        .with_write(args.write)
        .with_threads(args.threads);

    if let Some(ignore_file) = args.ignore_file {
        config = config.with_ignore_file(ignore_file);
    }

    // Show progress if verbose
    let spinner = if args.verbose {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Rewriting aliased imports...");
        Some(pb)
    } else {
        None
    };

    // Create scanner and run
    let scanner = ProjectScanner::new(config, options)?;
    let report = scanner.scan()?;

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Rewrote {} references across {} files in {}ms",
            report.stats.total_rewrites, report.stats.files_changed, report.metadata.duration_ms
        ));
    }

    // Apply filters
    let report = if args.changed_only {
        report.filter_to_changed()
    } else {
        report
    };

    // Format output
    let output = format_report(&report, args.format.into())?;

    // Write output
    if let Some(path) = args.output {
        fs::write(&path, &output)?;
        if args.verbose {
            eprintln!("Report written to: {}", path.display());
        }
    } else {
        println!("{}", output);
    }

    Ok(())
}
