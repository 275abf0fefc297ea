// src/main.rs — BOOOMERANGS entry point

use clap::Parser;

use booomerangs::cli::{self, Cli, Commands};
use booomerangs::infra::config::Config;
use booomerangs::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // BOOOMERANGS_LOG / RUST_LOG take precedence over --log-level
    logger::init_logging(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no booomerangs.toml)
    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(std::path::Path::new(path))?,
        None => Config::load()?,
    };

    match cli.command {
        None => cli::serve::run_serve(config, None, None).await,
        Some(Commands::Serve { host, port }) => cli::serve::run_serve(config, host, port).await,
        Some(Commands::Ask {
            message,
            provider,
            strict,
        }) => cli::ask::run_ask(&config, &message.join(" "), provider, strict).await,
        Some(Commands::Providers) => cli::providers::show_providers(&config),
        Some(Commands::Migrate { status, rollback }) => {
            cli::migrate::run_migrate(&config, status, rollback)
        }
    }
}
