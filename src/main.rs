use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pkgsage::ProviderKind;
use pkgsage::ParseMode;
use pkgsage::cli::commands;

#[derive(Parser)]
#[command(name = "pkgsage")]
#[command(
    version,
    about = "AI-assisted upgrade-risk analysis for winget-managed packages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed packages
    List {
        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },

    /// List packages with an upgrade available
    Upgradable {
        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },

    /// Analyze upgrade risk and save per-package reports
    Research {
        #[arg(long = "id", value_name = "ID", help = "Package id to research (repeatable)")]
        ids: Vec<String>,
        #[arg(long, help = "Research every upgradable package")]
        all: bool,
        #[arg(long, help = "AI provider (anthropic, perplexity)")]
        provider: Option<ProviderKind>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, help = "Provider calls allowed in flight")]
        concurrency: Option<usize>,
    },

    /// Upgrade one package by id
    Upgrade {
        #[arg(help = "Package id")]
        id: String,
    },

    /// List saved reports
    Reports {
        #[arg(long, help = "Print JSON instead of a list")]
        json: bool,
    },

    /// Print the newest report for a package
    Report {
        #[arg(help = "Package name or id")]
        key: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mpkgsage encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "pkgsage=debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::List { json } => {
            Runtime::new()?.block_on(commands::scan::run(ParseMode::Inventory, json))?;
        }
        Commands::Upgradable { json } => {
            Runtime::new()?.block_on(commands::scan::run(ParseMode::Upgradable, json))?;
        }
        Commands::Research {
            ids,
            all,
            provider,
            model,
            concurrency,
        } => {
            Runtime::new()?.block_on(commands::research::run(
                commands::research::ResearchOptions {
                    ids,
                    all,
                    provider,
                    model,
                    concurrency,
                    quiet: cli.quiet,
                },
            ))?;
        }
        Commands::Upgrade { id } => {
            Runtime::new()?.block_on(commands::upgrade::run(&id))?;
        }
        Commands::Reports { json } => {
            commands::reports::list(json)?;
        }
        Commands::Report { key } => {
            Runtime::new()?.block_on(commands::reports::show(&key))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    commands::config::init_global(force)?;
                } else {
                    commands::config::init_project(force)?;
                }
            }
        },
    }

    Ok(())
}
