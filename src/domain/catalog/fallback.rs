//! Built-in price tables used wherever the blueprint is silent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{CablePriceEntry, CameraPriceMatrix, CapacityPriceEntry, PriceEntry, SystemCatalog};
use crate::domain::value_objects::Resolution;

pub type FallbackSystem = SystemCatalog;

/// Fallback configuration handed to [`super::build_pricing_catalog`].
///
/// `Default` carries the store's standard price list; deployments may load a
/// replacement with [`FallbackPrices::from_json_str`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPrices {
    pub analog: FallbackSystem,
    pub ip: FallbackSystem,
    pub storage: Vec<PriceEntry>,
    pub monitor: PriceEntry,
    pub installation: PriceEntry,
}

impl FallbackPrices {
    pub fn from_json_str(raw: &str) -> crate::Result<Self> {
        serde_json::from_str(raw).map_err(crate::SetupError::FallbackFormat)
    }
}

fn entry(id: &str, label: &str, mrp: Decimal, sale: Decimal) -> PriceEntry {
    PriceEntry { id: id.into(), label: label.into(), mrp: Some(mrp), sale }
}

fn tier(id: &str, label: &str, capacity: u32, mrp: Decimal, sale: Decimal) -> CapacityPriceEntry {
    CapacityPriceEntry { entry: entry(id, label, mrp, sale), capacity }
}

fn cable(id: &str, label: &str, coverage_meters: u32, mrp: Decimal, sale: Decimal) -> CablePriceEntry {
    CablePriceEntry { id: id.into(), label: label.into(), coverage_meters, mrp_per_unit: mrp, sale_per_unit: sale }
}

fn camera(prefix: &str, mp: u8, standard: (Decimal, Decimal), dual: (Decimal, Decimal)) -> Option<(Resolution, CameraPriceMatrix)> {
    let resolution = Resolution::megapixels(mp).ok()?;
    let matrix = CameraPriceMatrix {
        standard: entry(&format!("{prefix}-{mp}mp-ir"), &format!("{resolution} IR Camera"), standard.0, standard.1),
        dual_light: entry(&format!("{prefix}-{mp}mp-dual"), &format!("{resolution} Dual-Light Camera"), dual.0, dual.1),
    };
    Some((resolution, matrix))
}

impl Default for FallbackPrices {
    fn default() -> Self {
        let analog = SystemCatalog {
            recorders: vec![
                tier("dvr-4ch", "4 Channel DVR", 4, dec!(4500), dec!(3200)),
                tier("dvr-8ch", "8 Channel DVR", 8, dec!(6500), dec!(4800)),
                tier("dvr-16ch", "16 Channel DVR", 16, dec!(11000), dec!(8200)),
                tier("dvr-32ch", "32 Channel DVR", 32, dec!(19000), dec!(14500)),
            ],
            power: vec![
                tier("smps-4ch", "4 Channel SMPS", 4, dec!(1200), dec!(850)),
                tier("smps-8ch", "8 Channel SMPS", 8, dec!(1800), dec!(1300)),
                tier("smps-16ch", "16 Channel SMPS", 16, dec!(2800), dec!(2100)),
            ],
            cameras: [
                camera("analog", 2, (dec!(1800), dec!(1250)), (dec!(2400), dec!(1650))),
                camera("analog", 5, (dec!(2600), dec!(1850)), (dec!(3300), dec!(2350))),
            ]
            .into_iter()
            .flatten()
            .collect(),
            cables: vec![
                cable("coax-90m", "3+1 Coaxial Cable (90m)", 90, dec!(2200), dec!(1650)),
                cable("coax-180m", "3+1 Coaxial Cable (180m)", 180, dec!(4000), dec!(3000)),
            ],
        };
        let ip = SystemCatalog {
            recorders: vec![
                tier("nvr-8ch", "8 Channel NVR", 8, dec!(7500), dec!(5600)),
                tier("nvr-16ch", "16 Channel NVR", 16, dec!(12500), dec!(9500)),
                tier("nvr-32ch", "32 Channel NVR", 32, dec!(22000), dec!(17000)),
            ],
            power: vec![
                tier("poe-8port", "8 Port PoE Switch", 8, dec!(4500), dec!(3300)),
                tier("poe-16port", "16 Port PoE Switch", 16, dec!(8500), dec!(6400)),
            ],
            cameras: [
                camera("ip", 2, (dec!(2900), dec!(2100)), (dec!(3600), dec!(2650))),
                camera("ip", 4, (dec!(3900), dec!(2850)), (dec!(4700), dec!(3450))),
                camera("ip", 8, (dec!(6200), dec!(4600)), (dec!(7400), dec!(5500))),
            ]
            .into_iter()
            .flatten()
            .collect(),
            cables: vec![
                cable("cat6-100m", "CAT6 Cable (100m)", 100, dec!(3800), dec!(2900)),
                cable("cat6-305m", "CAT6 Cable Box (305m)", 305, dec!(9500), dec!(7200)),
            ],
        };
        Self {
            analog,
            ip,
            storage: vec![
                entry("hdd-1tb", "1TB Surveillance HDD", dec!(4200), dec!(3600)),
                entry("hdd-2tb", "2TB Surveillance HDD", dec!(5800), dec!(4900)),
                entry("hdd-4tb", "4TB Surveillance HDD", dec!(9200), dec!(7900)),
            ],
            monitor: entry("monitor-19in", "19\" LED Monitor", dec!(7500), dec!(5900)),
            // Installation is a service line with no list price.
            installation: entry("installation", "Professional Installation", Decimal::ZERO, dec!(4500)),
        }
    }
}
