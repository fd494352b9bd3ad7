//! Fixtures
//!
//! Pre-seeded carts loaded from YAML, used for demos and tests.

use std::{fs, path::PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::{cart::Cart, fixtures::carts::CartFixture, items::InvalidLineItem};

pub mod carts;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A fixture item was rejected by the cart (item name, reason)
    #[error("Invalid item {0}: {1}")]
    InvalidItem(String, InvalidLineItem),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a fixture loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a cart from `carts/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price or currency is invalid,
    /// or an item is rejected by the cart.
    pub fn load_cart<'a>(&self, name: &str) -> Result<Cart<'a>, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        debug!(path = %file_path.display(), "loading cart fixture");

        Self::parse_cart(&contents)
    }

    /// Build a cart from YAML source
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed, a price or currency is invalid,
    /// or an item is rejected by the cart.
    pub fn parse_cart<'a>(contents: &str) -> Result<Cart<'a>, FixtureError> {
        let fixture: CartFixture = serde_norway::from_str(contents)?;

        fixture.try_into()
    }
}
