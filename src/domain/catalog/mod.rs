//! Pricing catalog
//!
//! The normalized price tables the configurator works against. A catalog is
//! built once per session by [`build_pricing_catalog`] and never mutated.

mod fallback;
mod resolver;

pub use fallback::{FallbackPrices, FallbackSystem};
pub use resolver::build_pricing_catalog;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::value_objects::{PricePair, Resolution, SystemKind};

/// A single priced option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub id: String,
    pub label: String,
    pub mrp: Option<Decimal>,
    pub sale: Decimal,
}

impl PriceEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>, pair: PricePair) -> Self {
        Self { id: id.into(), label: label.into(), mrp: Some(pair.mrp), sale: pair.sale }
    }

    pub fn mrp_or_zero(&self) -> Decimal { self.mrp.unwrap_or(Decimal::ZERO) }
}

/// A priced recorder or power/switch tier supporting `capacity` channels/ports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPriceEntry {
    #[serde(flatten)]
    pub entry: PriceEntry,
    pub capacity: u32,
}

impl CapacityPriceEntry {
    pub fn id(&self) -> &str { &self.entry.id }
}

/// Cable sold per physical unit (box/roll) that covers a fixed length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CablePriceEntry {
    pub id: String,
    pub label: String,
    pub coverage_meters: u32,
    pub mrp_per_unit: Decimal,
    pub sale_per_unit: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraPriceMatrix {
    pub standard: PriceEntry,
    pub dual_light: PriceEntry,
}

impl CameraPriceMatrix {
    pub fn variant(&self, dual_light: bool) -> &PriceEntry {
        if dual_light { &self.dual_light } else { &self.standard }
    }
}

/// Price tables for one recorder system. Capacity lists are ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCatalog {
    pub recorders: Vec<CapacityPriceEntry>,
    pub power: Vec<CapacityPriceEntry>,
    pub cameras: BTreeMap<Resolution, CameraPriceMatrix>,
    pub cables: Vec<CablePriceEntry>,
}

impl SystemCatalog {
    pub fn recorder(&self, id: &str) -> Option<&CapacityPriceEntry> {
        self.recorders.iter().find(|e| e.id() == id)
    }
    pub fn power_option(&self, id: &str) -> Option<&CapacityPriceEntry> {
        self.power.iter().find(|e| e.id() == id)
    }
    pub fn cable(&self, id: &str) -> Option<&CablePriceEntry> {
        self.cables.iter().find(|e| e.id == id)
    }
    pub fn camera(&self, resolution: Resolution) -> Option<&CameraPriceMatrix> {
        self.cameras.get(&resolution)
    }
    pub fn first_resolution(&self) -> Option<Resolution> {
        self.cameras.keys().next().copied()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingCatalog {
    pub analog: SystemCatalog,
    pub ip: SystemCatalog,
    pub storage: Vec<PriceEntry>,
    pub monitor: PriceEntry,
    pub installation: PriceEntry,
}

impl PricingCatalog {
    pub fn system(&self, kind: SystemKind) -> &SystemCatalog {
        match kind {
            SystemKind::Analog => &self.analog,
            SystemKind::Ip => &self.ip,
        }
    }

    pub fn storage_option(&self, id: &str) -> Option<&PriceEntry> {
        self.storage.iter().find(|e| e.id == id)
    }
}
