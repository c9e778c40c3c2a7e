/*!
# PHP Modernity CLI

Command-line interface for the PHP modernity classifier.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::{style, Term};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use php_modernity::analyzer::{discover_packages, score_packages, Modernity};
use php_modernity::cache::LanguageLevelTupleStore;
use php_modernity::cli_common::{self, CommonArgs, OutputArgs};
use php_modernity::config::ModernityConfig;
use php_modernity::metrics::LanguageLevelTuple;
use php_modernity::reports::{self, ModernityReport, ReportFormat, ReportGenerator, TextReporter};

#[derive(Parser)]
#[command(
    name = "php-modernity",
    version = env!("CARGO_PKG_VERSION"),
    about = "Estimates how much of a PHP code base relies on the features of each PHP release"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single PHP file
    File {
        /// Path to PHP file
        path: PathBuf,

        /// Output format (text, json, csv, table)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Classify every PHP file of a directory (recursively)
    Dir {
        /// Path to directory
        path: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Classify a PHP snippet ("-" reads the snippet from stdin)
    Code {
        /// PHP code, including the opening tag
        snippet: String,

        /// Output format (text, json, csv, table)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Classify package versions laid out as ROOT/<package>/<version>/
    Packages {
        /// Root directory of the package set
        root: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Ignore the tuple store and do not update it
        #[arg(long)]
        no_cache: bool,
    },

    /// Tuple store management
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show stored tuples
    Show,
    /// Remove all stored tuples
    Clear,
    /// Print the tuple store location
    Path,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write the default configuration
    Init {
        /// Output file (TOML, or YAML for .yaml/.yml)
        #[arg(short, long, default_value = "php-modernity.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.common.quiet {
        cli_common::init_minimal_logging()?;
    } else {
        cli_common::init_logging(cli.common.verbose)?;
    }

    let config = cli.common.load_config()?;

    match cli.command {
        Commands::File { path, format } => file_command(&path, &format, config),
        Commands::Dir { path, output } => dir_command(&path, output, config, &cli.common),
        Commands::Code { snippet, format } => code_command(&snippet, &format, config),
        Commands::Packages {
            root,
            output,
            no_cache,
        } => packages_command(&root, output, no_cache, config, &cli.common),
        Commands::Cache { command } => cache_command(command, &config),
        Commands::Config { command } => config_command(command, &config),
    }
}

fn parse_format(format: &str) -> Result<ReportFormat> {
    format
        .parse::<ReportFormat>()
        .with_context(|| format!("Invalid --format value '{}'", format))
}

fn render(format: ReportFormat, report: &ModernityReport) -> Result<String> {
    match format {
        ReportFormat::Text => TextReporter::new()
            .with_colors(Term::stdout().is_term())
            .generate_report(report),
        other => reports::generate(other, report),
    }
}

fn print_tuple(label: &str, tuple: LanguageLevelTuple, format: &str) -> Result<()> {
    match parse_format(format)? {
        ReportFormat::Text => println!("{}", tuple),
        other => print!("{}", render(other, &ModernityReport::single(label, tuple))?),
    }
    Ok(())
}

fn file_command(path: &Path, format: &str, config: ModernityConfig) -> Result<()> {
    cli_common::validate_path(path, "File")?;

    let engine = Modernity::with_config(config)?;
    let tuple = engine
        .get_tuple_for_file(path)
        .with_context(|| format!("Failed to classify {}", path.display()))?;

    print_tuple(&path.display().to_string(), tuple, format)
}

fn code_command(snippet: &str, format: &str, config: ModernityConfig) -> Result<()> {
    let code = if snippet == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read PHP code from stdin")?;
        buffer
    } else {
        snippet.to_string()
    };

    let engine = Modernity::with_config(config)?;
    let tuple = engine
        .get_tuple_for_code(&code)
        .context("Failed to classify code snippet")?;

    print_tuple("<code>", tuple, format)
}

fn dir_command(
    path: &Path,
    output: OutputArgs,
    config: ModernityConfig,
    common: &CommonArgs,
) -> Result<()> {
    cli_common::validate_path(path, "Directory")?;
    let format = parse_format(output.format.as_deref().unwrap_or("csv"))?;

    let start_time = Instant::now();
    let pb = cli_common::spinner(
        format!("Analyzing {}...", path.display()),
        common.should_print() && Term::stderr().is_term(),
    )?;

    let engine = Modernity::with_config(config)?;
    let analysis = engine.analyze_directory(path);
    pb.finish_and_clear();
    let analysis =
        analysis.with_context(|| format!("Failed to classify directory {}", path.display()))?;

    let report = ModernityReport::from_directory(&analysis);
    let destination = cli_common::resolve_output(output.output, format.extension());
    cli_common::write_output(destination.as_deref(), &render(format, &report)?)?;

    if common.should_print() {
        let term = Term::stderr();
        term.write_line(&format!(
            "{} {} files ({}) in {}",
            style("Analyzed").bold().cyan(),
            analysis.analyzed().count(),
            cli_common::format_file_size(analysis.total_size),
            cli_common::format_duration(start_time.elapsed())
        ))?;

        let skipped = analysis.skipped().count();
        if skipped > 0 {
            cli_common::print_warning(&format!("{} file(s) skipped", skipped));
        }
    }

    Ok(())
}

fn packages_command(
    root: &Path,
    output: OutputArgs,
    no_cache: bool,
    config: ModernityConfig,
    common: &CommonArgs,
) -> Result<()> {
    cli_common::validate_path(root, "Package root")?;
    let format = parse_format(output.format.as_deref().unwrap_or("csv"))?;

    let packages = discover_packages(root)?;
    let mut store = if no_cache {
        None
    } else {
        Some(LanguageLevelTupleStore::open(config.store_path()))
    };

    let engine = Modernity::with_config(config)?;
    let pb = cli_common::package_bar(
        packages.len() as u64,
        common.should_print() && Term::stderr().is_term(),
    )?;

    let results = score_packages(&engine, &packages, store.as_mut(), |package, cached| {
        let suffix = if cached { " (cached)" } else { "" };
        pb.set_message(format!("{}{}", package.key(), suffix));
        pb.inc(1);
    });
    pb.finish_and_clear();
    let results = results?;

    let report = ModernityReport::from_packages(&results);
    let destination = cli_common::resolve_output(output.output, format.extension());
    cli_common::write_output(destination.as_deref(), &render(format, &report)?)?;

    if common.should_print() {
        let cached = results.iter().filter(|result| result.cached).count();
        cli_common::print_success(&format!(
            "{} package versions classified ({} from cache)",
            results.len(),
            cached
        ));
    }

    Ok(())
}

fn cache_command(command: CacheCommands, config: &ModernityConfig) -> Result<()> {
    let term = Term::stdout();
    let mut store = LanguageLevelTupleStore::open(config.store_path());

    match command {
        CacheCommands::Show => {
            term.write_line(&format!(
                "{} {} ({} entries)",
                style("Tuple store").bold().cyan(),
                store.path().display(),
                store.len()
            ))?;
            for (key, tuple) in store.iter() {
                term.write_line(&format!("   {}: {}", style(key).bold(), tuple))?;
            }
        }
        CacheCommands::Clear => {
            let removed = store.len();
            store.clear()?;
            cli_common::print_success(&format!("Removed {} stored tuples", removed));
        }
        CacheCommands::Path => {
            term.write_line(&store.path().display().to_string())?;
        }
    }

    Ok(())
}

fn config_command(command: ConfigCommands, config: &ModernityConfig) -> Result<()> {
    match command {
        ConfigCommands::Init { output } => {
            let defaults = ModernityConfig {
                cache_path: Some(config.store_path()),
                ..ModernityConfig::default()
            };
            defaults
                .export_to_file(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            cli_common::print_success(&format!(
                "Configuration created: {}",
                style(output.display()).green()
            ));
        }
    }

    Ok(())
}
