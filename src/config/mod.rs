//! Command line configuration

use std::path::PathBuf;

use clap::Parser;

use crate::{cart::DeliveryOption, checkout::Eta, config::logging::LoggingConfig};

pub mod logging;

/// CopyGo cart configuration
#[derive(Debug, Parser)]
#[command(name = "copygo", about = "CopyGo cart summary", long_about = None)]
pub struct CartConfig {
    /// Directory containing the `carts/` fixture folder
    #[arg(long, env = "COPYGO_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Name of the cart fixture to load
    #[arg(short, long, env = "COPYGO_CART", default_value = "demo")]
    pub cart: String,

    /// Pickup in store or delivery, overrides the fixture
    #[arg(short, long, value_enum)]
    pub delivery: Option<DeliveryOption>,

    /// Delivery address
    #[arg(short, long)]
    pub address: Option<String>,

    /// When the order should be ready
    #[arg(long, value_enum, default_value_t = Eta::Asap)]
    pub eta: Eta,

    /// Pay in cash on receipt
    #[arg(long)]
    pub pay_on_delivery: bool,

    /// Print the checkout snapshot as YAML instead of the summary
    #[arg(long)]
    pub snapshot: bool,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CartConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
