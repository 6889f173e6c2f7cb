use anyhow::Result;
use clap::{Parser, Subcommand};
use fxstats::cli::summary::OutputFormat;
use fxstats::core::RateMetric;
use fxstats::core::log::init_logging;

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
    /// Display minimum, maximum and average rates per currency
    Summary {
        /// Number of days before today to cover
        #[arg(short, long)]
        days: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,

        /// Figure to summarize, overrides the configured metric
        #[arg(short, long, value_enum)]
        metric: Option<RateMetric>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxstats::cli::setup::setup(),
        Some(Commands::Summary {
            days,
            format,
            metric,
        }) => {
            let options = fxstats::SummaryOptions {
                days,
                format,
                metric,
            };
            fxstats::run_command(fxstats::AppCommand::Summary(options), cli.config_path.as_deref())
                .await
        }
        None => {
            fxstats::run_command(
                fxstats::AppCommand::Summary(fxstats::SummaryOptions::default()),
                cli.config_path.as_deref(),
            )
            .await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
