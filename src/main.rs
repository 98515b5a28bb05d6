use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod build;
mod config;
mod rules;

#[derive(Parser)]
#[command(name = "slidedeck", version, about = "Compile YAML slide decks into embeddable markup modules")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Enable info-level logging (otherwise RUST_LOG applies)
    #[arg(long, global = true)]
    verbose: bool,

    /// Path to the slidedeck.json config file
    #[arg(long, global = true, default_value = "slidedeck.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile deck files (or directories of decks) into .js modules
    Build {
        /// Deck files or directories (default: current directory)
        #[arg(default_value = ".")]
        paths: Vec<String>,

        /// Output directory (default: next to each source file)
        #[arg(long)]
        out: Option<String>,

        /// Rebuild whenever a deck changes
        #[arg(long)]
        watch: bool,
    },

    /// Print the compiled markup of a deck
    Render {
        /// Path to the deck file
        file: String,

        /// Print markup without template-literal escaping
        #[arg(long)]
        raw: bool,
    },

    /// Check deck file(s) for elements that render as nothing
    Validate {
        /// Path to the deck file(s)
        files: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Build { paths, out, watch } => {
            let result = build::handle_build(&paths, out.as_deref(), &config, cli.quiet);
            if watch {
                // Keep watching so a broken deck can be fixed in place.
                if let Err(e) = result {
                    eprintln!("{} {}", "Build error:".red().bold(), e);
                }
                build::watch_and_rebuild(&paths, out.as_deref(), &config, cli.quiet)?;
            } else {
                result?;
            }
        }
        Commands::Render { file, raw } => {
            handle_render(&file, raw, &config)?;
        }
        Commands::Validate { files } => {
            handle_validate(&files, &config)?;
        }
    }

    Ok(())
}

fn handle_render(file: &str, raw: bool, config: &config::DeckConfig) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", file, e))?;

    let deck = slidedeck_compile::parse(&content)
        .map_err(|e| anyhow::anyhow!("{}: {}", file, e))?;
    let registry = config.registry();

    let output = if raw {
        deck.to_html(&registry)
    } else {
        deck.compile(&registry)
    };

    println!("{output}");
    Ok(())
}

fn handle_validate(files: &[String], config: &config::DeckConfig) -> Result<()> {
    let registry = config.registry();
    let mut has_errors = false;

    for file in files {
        let content = std::fs::read_to_string(file)
            .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", file, e))?;

        let diagnostics = slidedeck_compile::validate::validate_str(&content, &registry);

        if diagnostics.is_empty() {
            println!("{}: {}", file, "OK".green());
            continue;
        }

        for diag in &diagnostics {
            let severity_str = match diag.severity {
                slidedeck_compile::Severity::Error => {
                    has_errors = true;
                    format!("{}", "error".red().bold())
                }
                slidedeck_compile::Severity::Warning => {
                    format!("{}", "warning".yellow().bold())
                }
                slidedeck_compile::Severity::Info => {
                    format!("{}", "info".cyan().bold())
                }
            };

            println!(
                "{}:{}: {severity_str}: [{}] {}",
                file, diag.section, diag.code, diag.message
            );
        }
    }

    if has_errors {
        std::process::exit(1);
    }

    Ok(())
}
