use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxsum::log::init_logging;
use fxsum::{ReportMode, SummaryRequest};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the exchange-rate summary for a date range
    Summary {
        /// Start of the date range (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End of the date range, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Skip the per-day table and show only the summary
        #[arg(long)]
        summary_only: bool,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Summary {
            start,
            end,
            summary_only,
            json,
        }) => {
            let request = SummaryRequest {
                start,
                end,
                mode: if summary_only {
                    ReportMode::SummaryOnly
                } else {
                    ReportMode::Full
                },
                json,
            };
            fxsum::run_summary(&request, cli.config_path.as_deref()).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fxsum::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
providers:
  frankfurter:
    base_url: "https://api.frankfurter.dev/v1"

cache_ttl_secs: 60
retry_attempts: 3
retry_backoff_secs: 0.5
fallback_file: "data/sample_rates.json"

base_currency: "EUR"
quote_currency: "USD"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
