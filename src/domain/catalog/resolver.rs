//! Merges an admin blueprint over the fallback price tables.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::{
    CablePriceEntry, CameraPriceMatrix, CapacityPriceEntry, FallbackPrices, PriceEntry, PricingCatalog, SystemCatalog,
};
use crate::domain::blueprint::{Blueprint, BlueprintComponent, BlueprintOption, BlueprintSystem};
use crate::domain::metadata::{first_boolean, first_numeric, first_string};
use crate::domain::pricing::resolve_price_pair;
use crate::domain::value_objects::{PricePair, Resolution, SystemKind};

const CAPACITY_KEYS: [&str; 5] = ["channels", "capacity", "ports", "channel_count", "channelCount"];
const COVERAGE_KEYS: [&str; 6] = ["coverage_meters", "coverageMeters", "length_meters", "lengthMeters", "meters", "length"];
const RESOLUTION_KEYS: [&str; 3] = ["resolution", "megapixels", "mp"];
const DUAL_LIGHT_KEYS: [&str; 3] = ["dual_light", "dualLight", "dual_light_enabled"];

const CAMERA_SLUGS: [&str; 2] = ["camera", "cameras"];
const CABLE_SLUGS: [&str; 2] = ["cable", "cabling"];
const STORAGE_SLUGS: [&str; 3] = ["hdd", "storage", "hard-disk"];
const MONITOR_SLUGS: [&str; 1] = ["monitor"];
const INSTALLATION_SLUGS: [&str; 1] = ["installation"];

fn recorder_slugs(kind: SystemKind) -> &'static [&'static str] {
    match kind {
        SystemKind::Analog => &["dvr", "recorder"],
        SystemKind::Ip => &["nvr", "recorder"],
    }
}

fn power_slugs(kind: SystemKind) -> &'static [&'static str] {
    match kind {
        SystemKind::Analog => &["smps", "power-supply"],
        SystemKind::Ip => &["poe-switch", "switch"],
    }
}

/// Builds the pricing catalog for both systems.
///
/// Every slot the blueprint fills is priced from it; every slot or option it
/// leaves out keeps the matching entry from `fallback`. With no blueprint the
/// result is the normalized fallback. Never fails.
pub fn build_pricing_catalog(blueprint: Option<&Blueprint>, fallback: &FallbackPrices) -> PricingCatalog {
    let systems: Vec<&BlueprintSystem> = SystemKind::ALL
        .iter()
        .filter_map(|kind| blueprint.and_then(|b| b.system(kind.blueprint_slug())))
        .collect();
    let shared = |slugs: &[&str]| systems.iter().find_map(|s| find_component(*s, slugs));

    PricingCatalog {
        analog: resolve_system(SystemKind::Analog, blueprint, &fallback.analog),
        ip: resolve_system(SystemKind::Ip, blueprint, &fallback.ip),
        storage: resolve_storage(shared(&STORAGE_SLUGS[..]), &fallback.storage),
        monitor: resolve_single(shared(&MONITOR_SLUGS[..]), &fallback.monitor),
        installation: resolve_single(shared(&INSTALLATION_SLUGS[..]), &fallback.installation),
    }
}

fn find_component<'a>(system: &'a BlueprintSystem, slugs: &[&str]) -> Option<&'a BlueprintComponent> {
    slugs.iter().find_map(|slug| system.component(slug))
}

fn resolve_system(kind: SystemKind, blueprint: Option<&Blueprint>, fallback: &SystemCatalog) -> SystemCatalog {
    let system = blueprint.and_then(|b| b.system(kind.blueprint_slug()));
    if blueprint.is_some() && system.is_none() {
        debug!(system = %kind, "blueprint has no matching system, using fallback prices");
    }
    let component = |slugs: &[&str]| {
        let found = system.and_then(|s| find_component(s, slugs));
        if system.is_some() && found.is_none() {
            debug!(system = %kind, slot = slugs[0], "blueprint component missing, using fallback prices");
        }
        found
    };

    let recorder_label = |cap: u32| format!("{cap} Channel {}", kind.recorder_name());
    let power_label = |cap: u32| match kind {
        SystemKind::Analog => format!("{cap} Channel SMPS"),
        SystemKind::Ip => format!("{cap} Port PoE Switch"),
    };

    SystemCatalog {
        recorders: resolve_capacity(component(recorder_slugs(kind)), &fallback.recorders, &recorder_label),
        power: resolve_capacity(component(power_slugs(kind)), &fallback.power, &power_label),
        cameras: resolve_cameras(kind, component(&CAMERA_SLUGS[..]), &fallback.cameras),
        cables: resolve_cables(component(&CABLE_SLUGS[..]), &fallback.cables),
    }
}

/// Pair for an option matched to a fallback entry, or for an unmatched one
/// whose own prices stand alone. An unmatched option with no price is absent.
fn price_option(
    option: &BlueprintOption,
    component: Option<&BlueprintComponent>,
    fallback: Option<(Decimal, Decimal)>,
) -> Option<PricePair> {
    match fallback {
        Some((mrp, sale)) => Some(resolve_price_pair(option, component, mrp, sale)),
        None => {
            let list = option
                .unit_price
                .or_else(|| component.and_then(|c| c.unit_price))
                .or_else(|| component.and_then(|c| c.base_price))
                .unwrap_or(Decimal::ZERO);
            let pair = resolve_price_pair(option, component, list, list);
            (pair.sale > Decimal::ZERO).then_some(pair)
        }
    }
}

fn normalized(entry: &PriceEntry) -> PriceEntry {
    let pair = resolve_price_pair(&BlueprintOption::default(), None, entry.mrp_or_zero(), entry.sale);
    PriceEntry::new(entry.id.clone(), entry.label.clone(), pair)
}

fn whole_number(value: Decimal) -> Option<u32> {
    if value.fract().is_zero() && value >= Decimal::ONE { value.to_u32() } else { None }
}

fn slugify(label: &str) -> String {
    label
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn resolve_capacity(
    component: Option<&BlueprintComponent>,
    fallback: &[CapacityPriceEntry],
    default_label: &dyn Fn(u32) -> String,
) -> Vec<CapacityPriceEntry> {
    let mut tiers: BTreeMap<u32, CapacityPriceEntry> = fallback
        .iter()
        .filter(|e| e.capacity >= 1)
        .map(|e| (e.capacity, CapacityPriceEntry { entry: normalized(&e.entry), capacity: e.capacity }))
        .collect();

    let Some(component) = component else {
        return tiers.into_values().collect();
    };

    let mut overridden = BTreeSet::new();
    for option in &component.options {
        let Some(capacity) = first_numeric(&option.metadata, &CAPACITY_KEYS).and_then(whole_number) else {
            debug!(option = ?option.id, "option carries no usable capacity, skipped");
            continue;
        };
        if !overridden.insert(capacity) {
            continue;
        }
        let base = tiers.get(&capacity).map(|t| t.entry.clone());
        let Some(pair) = price_option(option, Some(component), base.as_ref().map(|b| (b.mrp_or_zero(), b.sale))) else {
            continue;
        };
        let label = option
            .label
            .clone()
            .or_else(|| base.as_ref().map(|b| b.label.clone()))
            .unwrap_or_else(|| default_label(capacity));
        let id = option
            .id
            .clone()
            .or_else(|| base.as_ref().map(|b| b.id.clone()))
            .unwrap_or_else(|| slugify(&label));
        tiers.insert(capacity, CapacityPriceEntry { entry: PriceEntry::new(id, label, pair), capacity });
    }
    tiers.into_values().collect()
}

fn option_resolution(option: &BlueprintOption) -> Option<Resolution> {
    if let Some(raw) = first_string(&option.metadata, &RESOLUTION_KEYS) {
        if let Ok(res) = raw.parse() {
            return Some(res);
        }
    }
    first_numeric(&option.metadata, &RESOLUTION_KEYS)
        .and_then(whole_number)
        .and_then(|mp| u8::try_from(mp).ok())
        .and_then(|mp| Resolution::megapixels(mp).ok())
}

fn resolve_cameras(
    kind: SystemKind,
    component: Option<&BlueprintComponent>,
    fallback: &BTreeMap<Resolution, CameraPriceMatrix>,
) -> BTreeMap<Resolution, CameraPriceMatrix> {
    let mut slots: BTreeMap<(Resolution, bool), PriceEntry> = BTreeMap::new();
    for (res, matrix) in fallback {
        slots.insert((*res, false), normalized(&matrix.standard));
        slots.insert((*res, true), normalized(&matrix.dual_light));
    }

    if let Some(component) = component {
        let mut overridden = BTreeSet::new();
        for option in &component.options {
            let Some(resolution) = option_resolution(option) else {
                debug!(option = ?option.id, "camera option carries no usable resolution, skipped");
                continue;
            };
            let dual = first_boolean(&option.metadata, &DUAL_LIGHT_KEYS).unwrap_or(false);
            let key = (resolution, dual);
            if !overridden.insert(key) {
                continue;
            }
            let base = slots.get(&key).cloned();
            let Some(pair) = price_option(option, Some(component), base.as_ref().map(|b| (b.mrp_or_zero(), b.sale))) else {
                continue;
            };
            let variant = if dual { "Dual-Light" } else { "IR" };
            let label = option
                .label
                .clone()
                .or_else(|| base.as_ref().map(|b| b.label.clone()))
                .unwrap_or_else(|| format!("{resolution} {variant} Camera"));
            let id = option
                .id
                .clone()
                .or_else(|| base.as_ref().map(|b| b.id.clone()))
                .unwrap_or_else(|| format!("{kind}-{}", slugify(&label)));
            slots.insert(key, PriceEntry::new(id, label, pair));
        }
    }

    let resolutions: BTreeSet<Resolution> = slots.keys().map(|(res, _)| *res).collect();
    resolutions
        .into_iter()
        .filter_map(|res| {
            let standard = slots.get(&(res, false)).cloned();
            let dual_light = slots.get(&(res, true)).cloned();
            match (standard, dual_light) {
                (Some(standard), Some(dual_light)) => Some((res, CameraPriceMatrix { standard, dual_light })),
                _ => {
                    debug!(system = %kind, resolution = %res, "camera tier lacks a variant, skipped");
                    None
                }
            }
        })
        .collect()
}

fn resolve_cables(component: Option<&BlueprintComponent>, fallback: &[CablePriceEntry]) -> Vec<CablePriceEntry> {
    let normalize = |c: &CablePriceEntry| {
        let pair = resolve_price_pair(&BlueprintOption::default(), None, c.mrp_per_unit, c.sale_per_unit);
        CablePriceEntry { mrp_per_unit: pair.mrp, sale_per_unit: pair.sale, ..c.clone() }
    };
    let mut cables: Vec<CablePriceEntry> = fallback.iter().filter(|c| c.coverage_meters >= 1).map(normalize).collect();

    let Some(component) = component else {
        return cables;
    };

    let mut overridden = BTreeSet::new();
    for option in &component.options {
        let Some(coverage) = first_numeric(&option.metadata, &COVERAGE_KEYS).and_then(|v| v.round().to_u32()).filter(|v| *v >= 1) else {
            debug!(option = ?option.id, "cable option carries no usable coverage, skipped");
            continue;
        };
        if !overridden.insert(coverage) {
            continue;
        }
        let position = cables.iter().position(|c| c.coverage_meters == coverage);
        let base = position.map(|i| cables[i].clone());
        let Some(pair) = price_option(option, Some(component), base.as_ref().map(|b| (b.mrp_per_unit, b.sale_per_unit))) else {
            continue;
        };
        let label = option
            .label
            .clone()
            .or_else(|| base.as_ref().map(|b| b.label.clone()))
            .unwrap_or_else(|| format!("Cable ({coverage}m)"));
        let id = option
            .id
            .clone()
            .or_else(|| base.as_ref().map(|b| b.id.clone()))
            .unwrap_or_else(|| slugify(&label));
        let entry = CablePriceEntry { id, label, coverage_meters: coverage, mrp_per_unit: pair.mrp, sale_per_unit: pair.sale };
        match position {
            Some(i) => cables[i] = entry,
            None => cables.push(entry),
        }
    }
    cables.sort_by_key(|c| c.coverage_meters);
    cables
}

fn resolve_storage(component: Option<&BlueprintComponent>, fallback: &[PriceEntry]) -> Vec<PriceEntry> {
    let mut entries: Vec<PriceEntry> = fallback.iter().map(normalized).collect();
    let Some(component) = component else {
        return entries;
    };

    for option in &component.options {
        let Some(id) = option.id.clone().or_else(|| option.label.as_deref().map(slugify)) else {
            continue;
        };
        let position = entries.iter().position(|e| {
            e.id.eq_ignore_ascii_case(&id)
                || option.label.as_deref().is_some_and(|l| e.label.eq_ignore_ascii_case(l))
        });
        let base = position.map(|i| entries[i].clone());
        let Some(pair) = price_option(option, Some(component), base.as_ref().map(|b| (b.mrp_or_zero(), b.sale))) else {
            continue;
        };
        let label = option
            .label
            .clone()
            .or_else(|| base.as_ref().map(|b| b.label.clone()))
            .unwrap_or_else(|| id.clone());
        let id = base.as_ref().map(|b| b.id.clone()).unwrap_or(id);
        let entry = PriceEntry::new(id, label, pair);
        match position {
            Some(i) => entries[i] = entry,
            None => entries.push(entry),
        }
    }
    entries
}

/// Monitor and installation: the component's first option, else the
/// component's own price carried on the fallback's identity.
fn resolve_single(component: Option<&BlueprintComponent>, fallback: &PriceEntry) -> PriceEntry {
    let Some(component) = component else {
        return normalized(fallback);
    };
    let option = component.options.first().cloned().unwrap_or_default();
    let pair = resolve_price_pair(&option, Some(component), fallback.mrp_or_zero(), fallback.sale);
    let label = option
        .label
        .or_else(|| component.name.clone())
        .unwrap_or_else(|| fallback.label.clone());
    PriceEntry::new(option.id.unwrap_or_else(|| fallback.id.clone()), label, pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn catalog(bp: serde_json::Value) -> PricingCatalog {
        build_pricing_catalog(Some(&Blueprint::from_value(&bp)), &FallbackPrices::default())
    }

    fn all_entries(c: &PricingCatalog) -> Vec<PriceEntry> {
        let mut out = vec![c.monitor.clone(), c.installation.clone()];
        out.extend(c.storage.iter().cloned());
        for sys in [&c.analog, &c.ip] {
            out.extend(sys.recorders.iter().map(|e| e.entry.clone()));
            out.extend(sys.power.iter().map(|e| e.entry.clone()));
            for m in sys.cameras.values() {
                out.push(m.standard.clone());
                out.push(m.dual_light.clone());
            }
        }
        out
    }

    fn assert_floor_holds(c: &PricingCatalog) {
        for e in all_entries(c) {
            assert!(e.sale >= Decimal::ZERO, "{e:?}");
            if let Some(mrp) = e.mrp {
                assert!(mrp >= e.sale, "{e:?}");
            }
        }
        for cable in c.analog.cables.iter().chain(&c.ip.cables) {
            assert!(cable.mrp_per_unit >= cable.sale_per_unit);
        }
    }

    #[test]
    fn test_null_blueprint_is_fallback() {
        let a = build_pricing_catalog(None, &FallbackPrices::default());
        let b = build_pricing_catalog(None, &FallbackPrices::default());
        assert_eq!(a, b);
        assert_eq!(a.analog.recorders.len(), 4);
        assert_eq!(a.installation.mrp, Some(dec!(4500)));
        assert_eq!(a.installation.sale, dec!(4500));
        assert_floor_holds(&a);
    }

    #[test]
    fn test_blueprint_overrides_matching_tier() {
        let c = catalog(json!({"systems": [{"slug": "dvr-system", "components": [{
            "slug": "dvr",
            "options": [
                {"id": "bp-dvr-8", "name": "Hikvision 8CH", "unitPrice": 7000, "metadata": {"channels": "8", "sale_price": "5100"}},
                {"id": "no-cap", "unitPrice": 1000}
            ]
        }]}]}));
        let dvr8 = c.analog.recorders.iter().find(|e| e.capacity == 8).unwrap();
        assert_eq!(dvr8.id(), "bp-dvr-8");
        assert_eq!(dvr8.entry.label, "Hikvision 8CH");
        assert_eq!(dvr8.entry.mrp, Some(dec!(7000)));
        assert_eq!(dvr8.entry.sale, dec!(5100));
        assert_eq!(c.analog.recorders.len(), 4);
        assert!(c.analog.recorder("dvr-4ch").is_some());
        assert_eq!(c.ip, build_pricing_catalog(None, &FallbackPrices::default()).ip);
    }

    #[test]
    fn test_option_with_duplicate_key_spellings_is_priced() {
        let c = catalog(json!({"systems": [{"slug": "dvr-system", "components": [{
            "slug": "dvr",
            "options": [{
                "id": "bp-dvr-8",
                "label": "8 Channel DVR",
                "name": "8CH DVR",
                "unit_price": 6900,
                "unitPrice": 6900,
                "metadata": {"channels": 8, "sale_price": 5100}
            }]
        }]}]}));
        let dvr8 = c.analog.recorders.iter().find(|e| e.capacity == 8).unwrap();
        assert_eq!(dvr8.id(), "bp-dvr-8");
        assert_eq!(dvr8.entry.label, "8 Channel DVR");
        assert_eq!(dvr8.entry.mrp, Some(dec!(6900)));
        assert_eq!(dvr8.entry.sale, dec!(5100));
    }

    #[test]
    fn test_matched_option_without_sale_uses_fallback_sale() {
        let c = catalog(json!({"systems": [{"slug": "nvr-system", "components": [{
            "slug": "poe-switch",
            "options": [{"id": "sw16", "unitPrice": 9000, "metadata": {"ports": 16}}]
        }]}]}));
        let sw = c.ip.power_option("sw16").unwrap();
        assert_eq!(sw.entry.mrp, Some(dec!(9000)));
        assert_eq!(sw.entry.sale, dec!(6400));
    }

    #[test]
    fn test_new_tier_is_inserted_in_order() {
        let c = catalog(json!({"systems": [{"slug": "nvr-system", "components": [{
            "slug": "poe-switch",
            "unitPrice": 15000,
            "options": [{"metadata": {"ports": 24, "offer_price": 12000}}, {"metadata": {"ports": 4}}]
        }]}]}));
        let caps: Vec<u32> = c.ip.power.iter().map(|e| e.capacity).collect();
        assert_eq!(caps, vec![4, 8, 16, 24]);
        let sw24 = &c.ip.power[3];
        assert_eq!(sw24.entry.label, "24 Port PoE Switch");
        assert_eq!(sw24.id(), "24-port-poe-switch");
        assert_eq!(sw24.entry.mrp, Some(dec!(15000)));
        assert_eq!(sw24.entry.sale, dec!(12000));
        // Component price backs an option that has none of its own.
        assert_eq!(c.ip.power[0].entry.sale, dec!(15000));
    }

    #[test]
    fn test_unpriced_new_option_is_absent() {
        let c = catalog(json!({"systems": [{"slug": "dvr-system", "components": [{
            "slug": "smps",
            "options": [{"name": "Mystery", "metadata": {"channels": 12}}]
        }]}]}));
        assert!(c.analog.power.iter().all(|e| e.capacity != 12));
    }

    #[test]
    fn test_camera_matrix_overrides() {
        let c = catalog(json!({"systems": [{"slug": "nvr-system", "components": [{
            "slug": "camera",
            "options": [
                {"id": "cam-4-dual", "unitPrice": 5000, "metadata": {"resolution": "4MP", "dualLight": "yes", "salePrice": 3700}},
                {"id": "cam-12", "unitPrice": 9000, "metadata": {"megapixels": 12}},
                {"id": "bad", "unitPrice": 100, "metadata": {"resolution": "HD"}}
            ]
        }]}]}));
        let four = c.ip.camera("4MP".parse().unwrap()).unwrap();
        assert_eq!(four.dual_light.id, "cam-4-dual");
        assert_eq!(four.dual_light.sale, dec!(3700));
        assert_eq!(four.standard.id, "ip-4mp-ir");
        // A new tier with only one variant is not offered.
        assert!(c.ip.camera("12MP".parse().unwrap()).is_none());
        assert_eq!(c.ip.cameras.len(), 3);
    }

    #[test]
    fn test_cable_and_storage_overrides() {
        let c = catalog(json!({"systems": [{"slug": "dvr-system", "components": [
            {"slug": "cable", "options": [{"id": "coax-300", "name": "Coax 300m", "unitPrice": 6000, "metadata": {"coverage_meters": "300", "sale_price": 4800}}]},
            {"slug": "hdd", "options": [
                {"id": "hdd-2tb", "unitPrice": 6000, "metadata": {"sale_price": 5000}},
                {"id": "hdd-8tb", "name": "8TB Surveillance HDD", "unitPrice": 16000, "metadata": {"sale_price": 14000}}
            ]}
        ]}]}));
        let coverages: Vec<u32> = c.analog.cables.iter().map(|e| e.coverage_meters).collect();
        assert_eq!(coverages, vec![90, 180, 300]);
        assert_eq!(c.analog.cable("coax-300").unwrap().sale_per_unit, dec!(4800));
        assert_eq!(c.storage_option("hdd-2tb").unwrap().sale, dec!(5000));
        assert_eq!(c.storage_option("hdd-2tb").unwrap().label, "2TB Surveillance HDD");
        assert_eq!(c.storage.last().unwrap().id, "hdd-8tb");
        assert_eq!(c.storage.len(), 4);
    }

    #[test]
    fn test_shared_components_and_service_line() {
        let c = catalog(json!({"systems": [{"slug": "nvr-system", "components": [
            {"slug": "installation", "name": "Site Installation", "unitPrice": 0, "metadata": {}, "options": []},
            {"slug": "monitor", "options": [{"id": "mon-22", "name": "22\" Monitor", "unitPrice": 9000, "metadata": {"sale_price": 9900}}]}
        ]}]}));
        assert_eq!(c.installation.id, "installation");
        assert_eq!(c.installation.label, "Site Installation");
        assert_eq!(c.installation.mrp, Some(dec!(4500)));
        assert_eq!(c.installation.sale, dec!(4500));
        assert_eq!(c.monitor.id, "mon-22");
        assert_eq!(c.monitor.mrp, Some(dec!(9000)));
        assert_eq!(c.monitor.sale, dec!(9000));
    }

    #[test]
    fn test_inconsistent_fallback_is_floored() {
        let mut fallback = FallbackPrices::default();
        fallback.analog.recorders[0].entry.sale = dec!(99999);
        fallback.monitor.mrp = None;
        let c = build_pricing_catalog(None, &fallback);
        assert_eq!(c.analog.recorders[0].entry.sale, c.analog.recorders[0].entry.mrp.unwrap());
        assert_eq!(c.monitor.mrp, Some(dec!(5900)));
        assert_floor_holds(&c);
    }

    proptest! {
        #[test]
        fn prop_floor_holds_for_arbitrary_prices(
            unit in proptest::option::of(-1000i64..50_000),
            sale in proptest::option::of(-1000i64..50_000),
            channels in 1u32..=40,
        ) {
            let mut option = json!({"metadata": {"channels": channels}});
            if let Some(u) = unit { option["unitPrice"] = json!(u); }
            if let Some(s) = sale { option["metadata"]["sale_price"] = json!(s.to_string()); }
            let c = catalog(json!({"systems": [
                {"slug": "dvr-system", "components": [{"slug": "dvr", "options": [option.clone()]}, {"slug": "monitor", "options": [option.clone()]}]},
                {"slug": "nvr-system", "components": [{"slug": "camera", "options": [{"unitPrice": unit, "metadata": {"resolution": "2MP", "sale_price": sale}}]}]}
            ]}));
            for e in all_entries(&c) {
                prop_assert!(e.sale >= Decimal::ZERO);
                prop_assert!(e.mrp.map_or(true, |m| m >= e.sale));
            }
        }
    }
}
