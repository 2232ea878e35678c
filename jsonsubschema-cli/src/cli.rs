use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jsonsubschema::{CheckerConfig, SubschemaChecker};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "jsonsubschema.config.json";

#[derive(Parser)]
#[command(name = "jsonsubschema")]
#[command(about = "Decide whether one JSON Schema is a subschema of another", long_about = None)]
pub struct Cli {
    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to optional checker config JSON to override defaults
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check containment in both directions
    Check {
        /// Schema file on the left-hand side
        #[arg(long)]
        lhs: String,
        /// Schema file on the right-hand side
        #[arg(long)]
        rhs: String,
    },
    /// Check whether two schemas accept exactly the same values
    Equivalent {
        #[arg(long)]
        lhs: String,
        #[arg(long)]
        rhs: String,
    },
}

/// Run the CLI application
///
/// # Errors
///
/// Returns an error if command execution fails
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Execute CLI commands with a parsed Cli struct
/// This function is separated from `run()` to allow for testing
///
/// # Errors
///
/// Returns an error if:
/// - Configuration loading fails
/// - A schema file cannot be read or is not JSON
/// - The check itself fails (malformed or unsupported schema)
pub fn run_with_cli(cli: Cli) -> Result<()> {
    // WARNING (no -v), INFO (-v), DEBUG (-vv)
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    // Only initialize logging if not already initialized (for testing)
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    run_command(cli)
}

fn run_command(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref().map(Path::new))?;
    let checker = SubschemaChecker::new(config);

    match cli.command {
        Commands::Check { lhs, rhs } => {
            let (lhs, rhs) = (read_schema(&lhs)?, read_schema(&rhs)?);
            let result = checker.check(&lhs, &rhs)?;
            print_result(&result)?;
        }
        Commands::Equivalent { lhs, rhs } => {
            let (lhs, rhs) = (read_schema(&lhs)?, read_schema(&rhs)?);
            let equivalent = checker.is_equivalent(&lhs, &rhs)?;
            print_result(&serde_json::json!({ "equivalent": equivalent }))?;
        }
    }

    Ok(())
}

/// Loads the checker configuration: the explicit path if given, else
/// `jsonsubschema.config.json` in the working directory if present, else
/// the defaults.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<CheckerConfig> {
    if let Some(path) = explicit {
        return CheckerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        tracing::info!("using config {}", default_path.display());
        return CheckerConfig::load(&default_path)
            .with_context(|| format!("loading config {}", default_path.display()));
    }
    Ok(CheckerConfig::default())
}

fn read_schema(path: &str) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading schema {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("parsing schema {path}"))
}

fn print_result<T: serde::Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_check() {
        let args = vec!["jsonsubschema", "check", "--lhs", "a.json", "--rhs", "b.json"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());

        match cli.command {
            Commands::Check { lhs, rhs } => {
                assert_eq!(lhs, "a.json");
                assert_eq!(rhs, "b.json");
            }
            Commands::Equivalent { .. } => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_parse_with_verbose_and_config() {
        let args = vec![
            "jsonsubschema",
            "-vv",
            "--config",
            "/path/to/config.json",
            "equivalent",
            "--lhs",
            "a.json",
            "--rhs",
            "b.json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some("/path/to/config.json".to_owned()));
        assert!(matches!(cli.command, Commands::Equivalent { .. }));
    }

    #[test]
    fn test_cli_requires_both_sides() {
        let args = vec!["jsonsubschema", "check", "--lhs", "a.json"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_print_result_json() {
        let result = print_result(&serde_json::json!({"equivalent": true}));
        assert!(result.is_ok());
    }
}
