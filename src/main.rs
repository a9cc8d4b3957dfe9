mod commands;
mod gateway;

use clap::{Parser, Subcommand};
use courier_channels::discord::DiscordChannel;
use courier_core::{config, shellexpand};
use courier_memory::PaymentStore;
use courier_tracker::HttpStatusProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "courier",
    version,
    about = "Courier: order tracking, shop status, and payment info for Discord"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Check configuration and stored data.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    match cli.command {
        Commands::Start => {
            let _log_guard = init_logging(&cfg)?;

            let Some(token) = cfg.discord.resolved_token() else {
                anyhow::bail!(
                    "Discord bot token is empty. \
                     Set discord.bot_token in config.toml or the DISCORD_TOKEN env var."
                );
            };

            let store = PaymentStore::open(&cfg.payments.file).await?;
            let provider = Arc::new(HttpStatusProvider::from_config(&cfg.tracker));
            let discord = Arc::new(DiscordChannel::new(cfg.discord.clone(), token));

            println!("{}: starting...", cfg.courier.name);
            let gw = Arc::new(gateway::Gateway::new(
                discord.clone(),
                discord,
                provider,
                store,
                cfg,
            ));
            gw.run().await?;
        }
        Commands::Status => {
            println!("{}: status check\n", cfg.courier.name);
            println!("Config: {}", cli.config);
            println!(
                "  discord token: {}",
                if cfg.discord.resolved_token().is_some() {
                    "configured"
                } else {
                    "missing"
                }
            );
            println!(
                "  shop channel: {}",
                if cfg.shop.channel_id.is_empty() {
                    "not configured"
                } else {
                    cfg.shop.channel_id.as_str()
                }
            );
            println!("  owners: {}", cfg.discord.owners.len());
            println!(
                "  tracker: every {}s, {:?} mode",
                cfg.tracker.poll_interval_secs, cfg.tracker.destination
            );

            let store = PaymentStore::open(&cfg.payments.file).await?;
            println!(
                "  payments: {} record(s) in {}",
                store.len().await,
                shellexpand(&cfg.payments.file)
            );
        }
    }

    Ok(())
}

/// Log to stdout and to a daily file under `{data_dir}/logs`.
///
/// `RUST_LOG` overrides `courier.log_level`. Keep the returned guard alive
/// for as long as logs should be flushed.
fn init_logging(
    cfg: &config::Config,
) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = PathBuf::from(shellexpand(&cfg.courier.data_dir)).join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "courier.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.courier.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Ok(guard)
}
