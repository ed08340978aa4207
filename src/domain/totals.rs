//! Quote totals for the current selections.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{PriceEntry, PricingCatalog};
use crate::domain::recommendation::{cable_quantity, power_unit_quantity};
use crate::domain::selections::SystemSelections;
use crate::domain::value_objects::{CameraCount, PricePair, SystemKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Recorder,
    Power,
    Camera,
    Cable,
    Storage,
    Monitor,
    Installation,
}

/// One priced component family. `mrp` and `sale` are `unit * quantity`,
/// saturating at `Decimal::MAX`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentTotal {
    pub kind: ComponentKind,
    pub id: String,
    pub label: String,
    pub quantity: u32,
    pub unit_mrp: Decimal,
    pub unit_sale: Decimal,
    pub mrp: Decimal,
    pub sale: Decimal,
}

impl ComponentTotal {
    fn new(kind: ComponentKind, id: &str, label: &str, quantity: u32, unit_mrp: Decimal, unit_sale: Decimal) -> Self {
        let qty = Decimal::from(quantity);
        Self {
            kind,
            id: id.to_string(),
            label: label.to_string(),
            quantity,
            unit_mrp,
            unit_sale,
            mrp: unit_mrp.saturating_mul(qty),
            sale: unit_sale.saturating_mul(qty),
        }
    }

    fn from_entry(kind: ComponentKind, entry: &PriceEntry, quantity: u32) -> Self {
        Self::new(kind, &entry.id, &entry.label, quantity, entry.mrp_or_zero(), entry.sale)
    }

    pub fn breakdown_line(&self) -> String {
        format!("{} × {}: {}", self.quantity, self.label, format_inr(self.sale))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub mrp: Decimal,
    pub sale: Decimal,
    pub discount_amount: Decimal,
    pub discount_percent: Decimal,
}

impl Summary {
    /// Re-applies the MRP floor to whole-order sums and derives the discount.
    pub fn from_sums(mrp: Decimal, sale: Decimal) -> Self {
        let validated = PricePair::lifted(mrp, sale);
        let discount_amount = validated.discount().round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let discount_percent = if validated.mrp.is_zero() {
            Decimal::ZERO
        } else {
            (discount_amount / validated.mrp * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };
        Self { mrp: validated.mrp, sale: validated.sale, discount_amount, discount_percent }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub system: SystemKind,
    pub camera_count: CameraCount,
    pub components: Vec<ComponentTotal>,
    /// Recorder, power, cameras and cable only.
    pub system_mrp: Decimal,
    pub system_sale: Decimal,
    pub breakdown: Vec<String>,
    pub summary: Summary,
}

impl Totals {
    pub fn component(&self, kind: ComponentKind) -> Option<&ComponentTotal> {
        self.components.iter().find(|c| c.kind == kind)
    }
}

/// Prices the active system's selections plus storage and add-ons.
///
/// Ids that do not resolve contribute nothing; callers reconcile selections
/// against the catalog first. Pure and infallible.
#[allow(clippy::too_many_arguments)]
pub fn compute_totals(
    system: SystemKind,
    camera_count: CameraCount,
    selections: &SystemSelections,
    catalog: &PricingCatalog,
    hdd_id: &str,
    monitor_included: bool,
    installation_included: bool,
) -> Totals {
    let tables = catalog.system(system);
    let cameras = camera_count.value();
    let mut components = Vec::new();

    if let Some(recorder) = tables.recorder(&selections.recorder_id) {
        components.push(ComponentTotal::from_entry(ComponentKind::Recorder, &recorder.entry, 1));
    }
    if let Some(power) = tables.power_option(&selections.power_id) {
        let qty = power_unit_quantity(camera_count, power.capacity);
        components.push(ComponentTotal::from_entry(ComponentKind::Power, &power.entry, qty));
    }
    if let Some(matrix) = selections.resolution.and_then(|r| tables.camera(r)) {
        components.push(ComponentTotal::from_entry(ComponentKind::Camera, matrix.variant(selections.dual_light), cameras));
    }
    if let Some(cable) = tables.cable(&selections.cable_id) {
        let qty = cable_quantity(camera_count, cable);
        components.push(ComponentTotal::new(
            ComponentKind::Cable,
            &cable.id,
            &cable.label,
            qty,
            cable.mrp_per_unit,
            cable.sale_per_unit,
        ));
    }

    let system_mrp = saturating_sum(components.iter().map(|c| c.mrp));
    let system_sale = saturating_sum(components.iter().map(|c| c.sale));

    if let Some(hdd) = catalog.storage_option(hdd_id) {
        components.push(ComponentTotal::from_entry(ComponentKind::Storage, hdd, 1));
    }
    if monitor_included {
        components.push(ComponentTotal::from_entry(ComponentKind::Monitor, &catalog.monitor, 1));
    }
    if installation_included {
        components.push(ComponentTotal::from_entry(ComponentKind::Installation, &catalog.installation, 1));
    }

    let overall_mrp = saturating_sum(components.iter().map(|c| c.mrp));
    let overall_sale = saturating_sum(components.iter().map(|c| c.sale));

    Totals {
        system,
        camera_count,
        breakdown: components.iter().map(ComponentTotal::breakdown_line).collect(),
        components,
        system_mrp,
        system_sale,
        summary: Summary::from_sums(overall_mrp, overall_sale),
    }
}

fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Rupee amount with Indian digit grouping, e.g. `₹1,23,456`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();
    let whole = abs.trunc();
    let fraction = abs - whole;

    let digits = whole.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let sign = if negative { "-" } else { "" };
    if fraction.is_zero() {
        format!("{sign}₹{grouped}")
    } else {
        let cents = (fraction * Decimal::ONE_HUNDRED).trunc().to_u32().unwrap_or(0);
        format!("{sign}₹{grouped}.{cents:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{build_pricing_catalog, FallbackPrices};
    use crate::domain::selections::Selections;
    use rust_decimal_macros::dec;

    fn fallback_catalog() -> PricingCatalog { build_pricing_catalog(None, &FallbackPrices::default()) }

    #[test]
    fn test_default_analog_quote() {
        let catalog = fallback_catalog();
        let s = Selections::first_of(&catalog);
        let t = compute_totals(SystemKind::Analog, CameraCount::clamped(4), &s.analog, &catalog, &s.hdd_id, false, true);
        // DVR 3200 + SMPS 850 + 4 × 1250 + 2 × 1650 cable
        assert_eq!(t.system_sale, dec!(12350));
        assert_eq!(t.system_mrp, dec!(4500) + dec!(1200) + dec!(7200) + dec!(4400));
        // + HDD 3600 + installation 4500
        assert_eq!(t.summary.sale, dec!(20450));
        assert_eq!(t.summary.mrp, dec!(17300) + dec!(4200) + dec!(4500));
        assert_eq!(t.summary.discount_amount, dec!(5550));
        assert_eq!(t.summary.discount_percent, dec!(21.35));
        assert!(t.component(ComponentKind::Monitor).is_none());
        assert_eq!(t.breakdown.len(), 6);
        assert_eq!(t.breakdown[2], "4 × 2MP IR Camera: ₹5,000");
    }

    #[test]
    fn test_power_and_cable_quantities_scale() {
        let catalog = fallback_catalog();
        let mut s = Selections::first_of(&catalog);
        s.ip.recorder_id = "nvr-32ch".into();
        s.ip.power_id = "poe-16port".into();
        s.ip.dual_light = true;
        let t = compute_totals(SystemKind::Ip, CameraCount::clamped(20), &s.ip, &catalog, &s.hdd_id, true, false);
        let power = t.component(ComponentKind::Power).unwrap();
        assert_eq!(power.quantity, 2);
        assert_eq!(power.sale, dec!(12800));
        let cable = t.component(ComponentKind::Cable).unwrap();
        assert_eq!(cable.quantity, 5);
        let camera = t.component(ComponentKind::Camera).unwrap();
        assert_eq!(camera.id, "ip-2mp-dual");
        assert_eq!(camera.sale, dec!(2650) * dec!(20));
        assert!(t.component(ComponentKind::Monitor).is_some());
        assert!(t.component(ComponentKind::Installation).is_none());
    }

    #[test]
    fn test_zero_mrp_addon_lifts_summary_mrp() {
        let s = Summary::from_sums(dec!(8000), dec!(9000));
        assert_eq!(s.mrp, dec!(9000));
        assert_eq!(s.sale, dec!(9000));
        assert_eq!(s.discount_amount, Decimal::ZERO);
        assert_eq!(s.discount_percent, Decimal::ZERO);
    }

    #[test]
    fn test_summary_rounding_and_zero_mrp() {
        let s = Summary::from_sums(dec!(1000.5), dec!(700));
        assert_eq!(s.discount_amount, dec!(301));
        assert_eq!(Summary::from_sums(Decimal::ZERO, Decimal::ZERO), Summary::default());
    }

    #[test]
    fn test_missing_mrp_counts_as_zero() {
        let mut catalog = fallback_catalog();
        catalog.analog.recorders[0].entry.mrp = None;
        let s = Selections::first_of(&catalog);
        let t = compute_totals(SystemKind::Analog, CameraCount::clamped(1), &s.analog, &catalog, &s.hdd_id, false, false);
        let recorder = t.component(ComponentKind::Recorder).unwrap();
        assert_eq!(recorder.mrp, Decimal::ZERO);
        assert!(t.summary.mrp >= t.summary.sale);
    }

    #[test]
    fn test_unknown_ids_contribute_nothing() {
        let catalog = fallback_catalog();
        let mut s = Selections::first_of(&catalog);
        s.analog.recorder_id = "gone".into();
        let t = compute_totals(SystemKind::Analog, CameraCount::clamped(4), &s.analog, &catalog, "gone", false, false);
        assert!(t.component(ComponentKind::Recorder).is_none());
        assert!(t.component(ComponentKind::Storage).is_none());
        assert_eq!(t.components.len(), 3);
    }

    #[test]
    fn test_absurd_blueprint_price_saturates() {
        let blueprint = crate::domain::blueprint::Blueprint::from_value(&serde_json::json!({"systems": [{
            "slug": "dvr-system",
            "components": [{"slug": "camera", "options": [
                {"unitPrice": "70000000000000000000000000000", "metadata": {"resolution": "2MP"}}
            ]}]
        }]}));
        let catalog = build_pricing_catalog(Some(&blueprint), &FallbackPrices::default());
        let s = Selections::first_of(&catalog);
        let t = compute_totals(SystemKind::Analog, CameraCount::clamped(4), &s.analog, &catalog, &s.hdd_id, false, true);
        let camera = t.component(ComponentKind::Camera).unwrap();
        assert_eq!(camera.mrp, Decimal::MAX);
        assert_eq!(camera.sale, dec!(5000));
        assert_eq!(t.system_mrp, Decimal::MAX);
        assert_eq!(t.summary.mrp, Decimal::MAX);
        assert_eq!(t.summary.sale, dec!(20450));
        assert!(t.summary.discount_percent <= Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(dec!(0)), "₹0");
        assert_eq!(format_inr(dec!(950)), "₹950");
        assert_eq!(format_inr(dec!(4800)), "₹4,800");
        assert_eq!(format_inr(dec!(123456)), "₹1,23,456");
        assert_eq!(format_inr(dec!(12345678)), "₹1,23,45,678");
        assert_eq!(format_inr(dec!(1499.5)), "₹1,499.50");
        assert_eq!(format_inr(dec!(-2500)), "-₹2,500");
    }
}
