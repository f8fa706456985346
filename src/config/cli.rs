use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "account-migration")]
#[command(about = "Streams tabular extract files into the customer account system")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    /// Name of the migration process to run
    #[arg(long, default_value = "customer-accounts")]
    pub process: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
