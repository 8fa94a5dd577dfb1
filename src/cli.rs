use crate::check::Violation;
use crate::config::{Configuration, DecycleConfig};
use crate::ingest::DependencyListSource;
use crate::output::{create_writer, OutputFormat};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "decycle")]
#[command(about = "Detects cyclic dependencies and layering violations between class slices", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a dependency listing against the configured constraints
    Check {
        /// Dependency listing to scan (`from -> to` lines); falls back to
        /// the configured classpath
        input: Option<PathBuf>,

        /// Configuration file (defaults to a discovered decycle.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: FormatArg,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit successfully even when violations are found
        #[arg(long)]
        ignore_failures: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Run the parsed command, returning the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check {
            input,
            config,
            format,
            output,
            ignore_failures,
        } => handle_check(input, config, format, output, ignore_failures),
    }
}

fn handle_check(
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
    format: FormatArg,
    output: Option<PathBuf>,
    ignore_failures: bool,
) -> Result<i32> {
    let config = match &config_path {
        Some(path) => DecycleConfig::load(path)?,
        None => DecycleConfig::discover().unwrap_or_default(),
    };
    let configuration = Configuration::from_config(config)?;

    let violations = match input {
        Some(path) => {
            let mut source = DependencyListSource::new(path);
            configuration.check(&mut source)?
        }
        None => configuration
            .check_classpath()
            .context("no input given and no classpath configured")?,
    };

    write_report(&violations, format.into(), output)?;
    if violations.is_empty() {
        log::info!("no violations found");
        Ok(0)
    } else {
        log::warn!("{} violation(s) found", violations.len());
        Ok(if ignore_failures { 0 } else { 1 })
    }
}

fn write_report(
    violations: &[Violation],
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(&path)
                .with_context(|| format!("cannot write report to {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    create_writer(format, out).write_violations(violations)
}
