//! User selections and their reconciliation against a catalog.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{PricingCatalog, SystemCatalog};
use crate::domain::value_objects::{Resolution, SystemKind};

/// Component choices for one system. Ids reference entries of the
/// corresponding [`SystemCatalog`]: a DVR and SMPS for analog, an NVR and
/// PoE switch for IP.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSelections {
    pub recorder_id: String,
    pub power_id: String,
    pub cable_id: String,
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub dual_light: bool,
}

pub type AnalogSelections = SystemSelections;
pub type IpSelections = SystemSelections;

impl SystemSelections {
    /// First entry of every list, standard camera variant.
    pub fn first_of(catalog: &SystemCatalog) -> Self {
        Self {
            recorder_id: catalog.recorders.first().map(|e| e.id().to_string()).unwrap_or_default(),
            power_id: catalog.power.first().map(|e| e.id().to_string()).unwrap_or_default(),
            cable_id: catalog.cables.first().map(|e| e.id.clone()).unwrap_or_default(),
            resolution: catalog.first_resolution(),
            dual_light: false,
        }
    }
}

/// Selections for both systems plus the shared storage choice. Both systems
/// are kept so switching back restores earlier choices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selections {
    pub analog: AnalogSelections,
    pub ip: IpSelections,
    pub hdd_id: String,
}

impl Selections {
    pub fn first_of(catalog: &PricingCatalog) -> Self {
        Self {
            analog: SystemSelections::first_of(&catalog.analog),
            ip: SystemSelections::first_of(&catalog.ip),
            hdd_id: catalog.storage.first().map(|e| e.id.clone()).unwrap_or_default(),
        }
    }

    pub fn system(&self, kind: SystemKind) -> &SystemSelections {
        match kind {
            SystemKind::Analog => &self.analog,
            SystemKind::Ip => &self.ip,
        }
    }

    pub fn system_mut(&mut self, kind: SystemKind) -> &mut SystemSelections {
        match kind {
            SystemKind::Analog => &mut self.analog,
            SystemKind::Ip => &mut self.ip,
        }
    }
}

fn keep_or_first<'a>(current: &str, ids: impl Iterator<Item = &'a str> + Clone) -> String {
    if ids.clone().any(|id| id == current) {
        current.to_string()
    } else {
        ids.into_iter().next().unwrap_or_default().to_string()
    }
}

fn reconcile_system(catalog: &SystemCatalog, previous: &SystemSelections) -> SystemSelections {
    let resolution = previous
        .resolution
        .filter(|r| catalog.cameras.contains_key(r))
        .or_else(|| catalog.first_resolution());
    SystemSelections {
        recorder_id: keep_or_first(&previous.recorder_id, catalog.recorders.iter().map(|e| e.id())),
        power_id: keep_or_first(&previous.power_id, catalog.power.iter().map(|e| e.id())),
        cable_id: keep_or_first(&previous.cable_id, catalog.cables.iter().map(|e| e.id.as_str())),
        resolution,
        dual_light: previous.dual_light,
    }
}

/// Re-validates `previous` against `catalog`: every id still present is
/// kept, every vanished id falls back to the first available entry.
pub fn reconcile_selections(catalog: &PricingCatalog, previous: &Selections) -> Selections {
    Selections {
        analog: reconcile_system(&catalog.analog, &previous.analog),
        ip: reconcile_system(&catalog.ip, &previous.ip),
        hdd_id: keep_or_first(&previous.hdd_id, catalog.storage.iter().map(|e| e.id.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{build_pricing_catalog, FallbackPrices};

    fn fallback_catalog() -> PricingCatalog { build_pricing_catalog(None, &FallbackPrices::default()) }

    #[test]
    fn test_first_of_defaults() {
        let s = Selections::first_of(&fallback_catalog());
        assert_eq!(s.analog.recorder_id, "dvr-4ch");
        assert_eq!(s.ip.power_id, "poe-8port");
        assert_eq!(s.analog.resolution.map(|r| r.value()), Some(2));
        assert_eq!(s.hdd_id, "hdd-1tb");
        assert!(!s.ip.dual_light);
    }

    #[test]
    fn test_reconcile_keeps_valid_ids() {
        let catalog = fallback_catalog();
        let mut s = Selections::first_of(&catalog);
        s.analog.recorder_id = "dvr-16ch".into();
        s.analog.dual_light = true;
        s.hdd_id = "hdd-4tb".into();
        assert_eq!(reconcile_selections(&catalog, &s), s);
    }

    #[test]
    fn test_reconcile_replaces_vanished_ids() {
        let catalog = fallback_catalog();
        let mut s = Selections::first_of(&catalog);
        s.ip.recorder_id = "nvr-64ch".into();
        s.ip.cable_id = "fiber".into();
        s.ip.resolution = Some("12MP".parse().unwrap());
        s.hdd_id = "ssd".into();
        let r = reconcile_selections(&catalog, &s);
        assert_eq!(r.ip.recorder_id, "nvr-8ch");
        assert_eq!(r.ip.cable_id, "cat6-100m");
        assert_eq!(r.ip.resolution.map(|r| r.value()), Some(2));
        assert_eq!(r.hdd_id, "hdd-1tb");
        assert_eq!(r.analog, s.analog);
    }

    #[test]
    fn test_selections_wire_format() {
        let s = Selections::first_of(&fallback_catalog());
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["analog"]["recorderId"], "dvr-4ch");
        assert_eq!(v["ip"]["resolution"], "2MP");
        assert_eq!(v["hddId"], "hdd-1tb");
    }
}
