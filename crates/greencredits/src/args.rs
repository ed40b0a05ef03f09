use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// The port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub(crate) port: u16,

    /// Path to the data directory
    #[arg(short, long, env = "DATA_PATH", visible_alias = "data")]
    pub(crate) data_path: PathBuf,

    /// JSON-RPC endpoints of the injected wallets, in discovery order
    #[arg(
        short,
        long = "wallet",
        env = "WALLET_URLS",
        value_delimiter = ','
    )]
    pub(crate) wallets: Vec<Url>,

    /// Endpoint to flag as the primary wallet implementation
    #[arg(long, env = "PRIMARY_WALLET")]
    pub(crate) primary_wallet: Option<Url>,

    /// Network descriptor to use instead of Moonbase Alpha
    #[arg(long, env = "NETWORK_FILE")]
    pub(crate) network_file: Option<PathBuf>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value_t = LevelFilter::INFO)]
    pub(crate) log_level: LevelFilter,
}
