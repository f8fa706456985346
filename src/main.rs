use account_migration::utils::{logger, validation::Validate};
use account_migration::{adapters, app, CliConfig, MigrationConfig, Processor};
use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!(process = %cli.process, "starting account-migration");

    let config = MigrationConfig::from_file(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "configuration validation failed");
        eprintln!("configuration error: {}", e);
        std::process::exit(1);
    }

    let definition = match app::definition_for(&cli.process) {
        Some(definition) => definition,
        None => {
            tracing::error!(process = %cli.process, "unknown process");
            eprintln!("unknown process: {}", cli.process);
            std::process::exit(1);
        }
    };

    let conns = adapters::connect(&config)?;
    let processor = Processor::new(definition, conns, config.channel_capacity());

    match processor.run().await {
        Ok(stats) => {
            println!("{}", stats);
        }
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            eprintln!("run aborted: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
