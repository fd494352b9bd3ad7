//! CopyGo cart summary
//!
//! Loads a cart fixture, applies the fulfilment options and prints the summary panel,
//! or the checkout snapshot with `--snapshot`.

use std::{io, process};

use tracing::error;

use copygo::{config::CartConfig, observability, prelude::*};

/// CopyGo entry point
pub fn main() {
    let config = CartConfig::load().unwrap_or_else(|e| e.exit());

    if let Err(e) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("{e}");
        }

        process::exit(1);
    }

    if let Err(e) = run(&config) {
        error!(error = %e, "copygo failed");

        process::exit(1);
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Yaml(#[from] serde_norway::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn run(config: &CartConfig) -> Result<(), RunError> {
    let mut cart = Fixture::with_base_path(&config.fixtures_dir).load_cart(&config.cart)?;

    if let Some(delivery) = config.delivery {
        cart.set_delivery_option(delivery);
    }

    if let Some(address) = &config.address {
        cart.set_delivery_address(address);
    }

    cart.set_eta(config.eta);
    cart.set_pay_on_delivery(config.pay_on_delivery);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if config.snapshot {
        let snapshot = cart.checkout()?;

        io::Write::write_all(&mut handle, serde_norway::to_string(&snapshot)?.as_bytes())?;
    } else {
        write_summary(&mut handle, &cart)?;
    }

    Ok(())
}
