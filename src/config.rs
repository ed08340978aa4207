//! Service configuration read from the environment.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::{build_pricing_catalog, load_blueprint_file, load_fallback_file, FallbackPrices, PricingCatalog, SetupError};

pub const DEFAULT_PORT: u16 = 8083;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    /// Admin blueprint JSON; absent means fallback prices only.
    pub blueprint_path: Option<PathBuf>,
    /// Replacement for the built-in fallback tables.
    pub fallback_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self { Self { port: DEFAULT_PORT, blueprint_path: None, fallback_path: None } }
}

impl ServiceConfig {
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let port = match non_empty("PORT") {
            Some(raw) => raw.parse().map_err(|_| SetupError::Config(format!("PORT is not a valid port: {raw}")))?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            port,
            blueprint_path: non_empty("SETUP_BLUEPRINT_PATH").map(PathBuf::from),
            fallback_path: non_empty("SETUP_FALLBACK_PRICES_PATH").map(PathBuf::from),
        })
    }

    /// Builds the session catalog. Unreadable sources are logged and replaced
    /// by the built-in tables; this never fails.
    pub fn load_catalog(&self) -> PricingCatalog {
        let fallback = match &self.fallback_path {
            Some(path) => load_fallback_file(path).unwrap_or_else(|e| {
                warn!(error = %e, "fallback price table unusable, using built-in prices");
                FallbackPrices::default()
            }),
            None => FallbackPrices::default(),
        };
        let blueprint = self.blueprint_path.as_ref().and_then(|path| match load_blueprint_file(path) {
            Ok(bp) => {
                info!(path = %path.display(), systems = bp.systems.len(), "loaded setup blueprint");
                Some(bp)
            }
            Err(e) => {
                warn!(error = %e, "setup blueprint unusable, using fallback prices");
                None
            }
        });
        build_pricing_catalog(blueprint.as_ref(), &fallback)
    }
}
