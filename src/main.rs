use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use loglint::config::{CONFIG_FILE, Settings};
use loglint::matcher::Whitelist;
use loglint::{LogLinter, logging};

#[derive(Parser)]
#[command(name = "loglint")]
#[command(about = "Development-time log integrity guard")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter loglint.toml
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Lint the current lines of a file once and exit
    Check {
        /// File to lint
        file: PathBuf,

        /// Extra whitelist patterns, appended after the config file's
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,
    },

    /// Watch a log file and halt on the first unexpected appended line
    Watch {
        /// File to watch (must exist)
        file: PathBuf,

        /// Extra whitelist patterns, appended after the config file's
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    match cli.command {
        Commands::Init { force } => {
            Settings::init_config_file(&config_path, force)?;
            println!("Created {}", config_path.display());
            Ok(())
        }

        Commands::Check { file, patterns } => {
            let settings = load_settings(&config_path, patterns)?;
            logging::init_with_config(&settings.logging);
            check(&file, &Whitelist::new(&settings.whitelist))
        }

        Commands::Watch { file, patterns } => {
            let settings = load_settings(&config_path, patterns)?;
            logging::init_with_config(&settings.logging);

            let linter = LogLinter::attach(file, &settings)?;
            println!("Watching {} (ctrl-c to stop)", linter.log_path().display());

            // A violation halts the process from the pipeline; this loop
            // only ends under a non-terminating abort collaborator.
            while !linter.pipeline().is_halted() {
                std::thread::sleep(Duration::from_millis(200));
            }
            Ok(())
        }
    }
}

fn load_settings(config_path: &Path, extra_patterns: Vec<String>) -> anyhow::Result<Settings> {
    let mut settings = Settings::load_from(config_path)?;
    settings.whitelist.extend(extra_patterns);
    Ok(settings)
}

/// One-shot lint of a file's current non-empty lines.
fn check(file: &Path, whitelist: &Whitelist) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;

    let violations = collect_violations(&content, whitelist);
    for line in &violations {
        println!("violation: {line}");
    }

    if !violations.is_empty() {
        println!(
            "{} violating line(s) in {}",
            violations.len(),
            file.display()
        );
        process::exit(1);
    }

    println!("All lines whitelisted in {}", file.display());
    Ok(())
}

/// Non-empty lines of `content` that no whitelist pattern allows, in order.
fn collect_violations<'a>(content: &'a str, whitelist: &Whitelist) -> Vec<&'a str> {
    content
        .split('\n')
        .filter(|line| !line.is_empty())
        .filter(|line| !whitelist.is_allowed(line))
        .collect()
}
