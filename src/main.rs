//! globalize-tasks CLI
//!
//! Entry point for the `globalize-tasks` command-line tool.

use clap::{Args, Parser, Subcommand};
use globalize_merge::{canonical_serialize, content_digest, merge};
use globalize_tasks::config::DEFAULT_OPTIONS_FILE;
use globalize_tasks::{CliOverrides, EffectiveOptions, Pipeline, PipelineResult, TaskReport, WriteMode};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

/// Exit code when `--check` finds out-of-date files
const EXIT_STALE: i32 = 5;

#[derive(Parser)]
#[command(name = "globalize-tasks")]
#[command(about = "Extract component messages and build per-locale bundles", version)]
struct Cli {
    /// Path to the options file
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_OPTIONS_FILE)]
    config: PathBuf,

    /// Log debug output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TaskArgs {
    /// Report out-of-date files without writing anything
    #[arg(long)]
    check: bool,

    /// Print the task report as JSON
    #[arg(long)]
    json: bool,

    /// Override the default locale
    #[arg(long)]
    default_locale: Option<String>,

    /// Restrict to these locales (repeatable or comma-separated)
    #[arg(long = "locale", short = 'l', value_delimiter = ',')]
    locales: Vec<String>,
}

impl TaskArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            default_locale: self.default_locale.clone(),
            locales: if self.locales.is_empty() {
                None
            } else {
                Some(self.locales.clone())
            },
        }
    }

    fn mode(&self) -> WriteMode {
        if self.check {
            WriteMode::Check
        } else {
            WriteMode::Write
        }
    }
}

#[derive(Clone, Copy)]
enum Phase {
    All,
    Extract,
    Bundle,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate translation tables, then bundles
    Run(TaskArgs),

    /// Generate translation tables only
    Extract(TaskArgs),

    /// Generate bundles only
    Bundle(TaskArgs),

    /// Validate the options file
    Verify,

    /// Merge JSON files (later files win) and print the canonical result
    Merge {
        /// Files to merge, lowest precedence first; missing files count as {}
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the SHA-256 content digest instead of the merged tree
        #[arg(long)]
        digest: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Run(args) => run_task(&cli.config, &args, Phase::All),
        Commands::Extract(args) => run_task(&cli.config, &args, Phase::Extract),
        Commands::Bundle(args) => run_task(&cli.config, &args, Phase::Bundle),
        Commands::Verify => run_verify(&cli.config),
        Commands::Merge { files, digest } => run_merge(&files, digest),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(config: &Path, overrides: &CliOverrides) -> EffectiveOptions {
    match EffectiveOptions::build(config, overrides) {
        Ok(effective) => effective,
        Err(e) => {
            eprintln!("Error loading options from {}: {}", config.display(), e);
            process::exit(1);
        }
    }
}

fn run_task(config: &Path, args: &TaskArgs, phase: Phase) {
    let effective = load_options(config, &args.overrides());
    let mut pipeline = Pipeline::new(&effective, args.mode());

    let result: PipelineResult<TaskReport> = match phase {
        Phase::All => pipeline.run(),
        Phase::Extract => pipeline.generate_translation_table(),
        Phase::Bundle => pipeline.generate_bundles(),
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    if args.json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                process::exit(1);
            }
        }
    } else {
        for file in &report.files {
            println!("  {:<9} {}", file.status.as_str(), file.path);
        }
        println!("{}", report.human_summary());
    }

    if !report.is_clean() {
        process::exit(EXIT_STALE);
    }
}

fn run_verify(config: &Path) {
    let effective = load_options(config, &CliOverrides::default());
    let options = &effective.options;

    println!("Options valid: {}", config.display());
    println!();
    println!("  Default locale: {}", options.default_locale);
    println!("  Locales: {}", options.locales.join(", "));
    println!(
        "  Modules: {}",
        options.modules.keys().cloned().collect::<Vec<_>>().join(", ")
    );
    if !options.build.is_empty() {
        println!("  Bundles: {}", options.build.len());
    }

    println!();
    println!("  Sources (lowest precedence first):");
    for source in &effective.sources {
        match (&source.path, &source.digest) {
            (Some(path), Some(digest)) => {
                println!("    {:<8} {} (sha256 {})", source.origin.as_str(), path, digest)
            }
            (Some(path), None) => println!("    {:<8} {}", source.origin.as_str(), path),
            _ => println!("    {}", source.origin.as_str()),
        }
    }
}

fn run_merge(files: &[PathBuf], digest: bool) {
    let mut trees = Vec::with_capacity(files.len());
    for path in files {
        match read_tree_or_empty(path) {
            Ok(tree) => trees.push(tree),
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    let merged = merge(trees);
    if digest {
        match content_digest(&merged) {
            Ok(hex) => println!("{}", hex),
            Err(e) => {
                eprintln!("Error computing digest: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", canonical_serialize(&merged));
    }
}

fn read_tree_or_empty(path: &Path) -> Result<Value, String> {
    if !path.exists() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    let contents = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&contents).map_err(|e| e.to_string())
}
