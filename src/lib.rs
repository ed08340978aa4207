//! TecBunny Custom Setup Configurator
//!
//! Prices a bundled CCTV kit (recorder, power, cameras, cabling, storage and
//! add-ons) from an admin blueprint layered over built-in price tables.
//!
//! ## Features
//! - Blueprint resolution with per-option fallback pricing
//! - Capacity-tier recommendations for recorders and power/switch units
//! - MRP/sale totals with whole-order discount validation
//! - Session state that survives system switches and catalog rebuilds

pub mod config;
pub mod domain;

use std::path::Path;
use thiserror::Error;

pub use domain::aggregates::{Configurator, OptionView, SelectionError};
pub use domain::blueprint::Blueprint;
pub use domain::catalog::{build_pricing_catalog, FallbackPrices, PricingCatalog};
pub use domain::pricing::resolve_price_pair;
pub use domain::selections::{reconcile_selections, Selections, SystemSelections};
pub use domain::totals::{compute_totals, Totals};
pub use domain::value_objects::{CameraCount, PricePair, Resolution, SystemKind};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Cannot read {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("Invalid blueprint JSON: {0}")]
    BlueprintFormat(#[from] serde_json::Error),

    #[error("Invalid fallback price table: {0}")]
    FallbackFormat(serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SetupError>;

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| SetupError::Io { path: path.display().to_string(), source })
}

/// Loads a blueprint document from disk.
pub fn load_blueprint_file(path: impl AsRef<Path>) -> Result<Blueprint> {
    Blueprint::from_json_str(&read_file(path.as_ref())?)
}

pub fn load_fallback_file(path: impl AsRef<Path>) -> Result<FallbackPrices> {
    FallbackPrices::from_json_str(&read_file(path.as_ref())?)
}
