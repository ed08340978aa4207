//! Capacity recommendations and unit quantities.

use crate::domain::catalog::{CablePriceEntry, CapacityPriceEntry};
use crate::domain::value_objects::{CameraCount, SystemKind};

/// Assumed average cable run per camera.
pub const CABLE_RUN_METERS_PER_CAMERA: u32 = 25;

/// Minimum recorder channel count for `cameras`.
pub fn recommended_recorder_capacity(system: SystemKind, cameras: CameraCount) -> u32 {
    let n = cameras.value();
    match system {
        SystemKind::Analog => match n {
            0..=4 => 4,
            5..=8 => 8,
            9..=16 => 16,
            _ => 32,
        },
        SystemKind::Ip => ip_tier(n),
    }
}

/// Minimum SMPS channel / PoE switch port count for `cameras`.
pub fn recommended_power_capacity(system: SystemKind, cameras: CameraCount) -> u32 {
    let n = cameras.value();
    match system {
        SystemKind::Analog => match n {
            0..=4 => 4,
            5..=8 => 8,
            _ => 16,
        },
        SystemKind::Ip => ip_tier(n),
    }
}

fn ip_tier(n: u32) -> u32 {
    match n {
        0..=8 => 8,
        9..=16 => 16,
        _ => 32,
    }
}

/// First option with `capacity >= target`, or the largest tier when none is
/// big enough. `None` only for an empty list.
pub fn pick_capacity_option(options: &[CapacityPriceEntry], target: u32) -> Option<&CapacityPriceEntry> {
    options
        .iter()
        .find(|o| o.capacity >= target)
        .or_else(|| options.iter().max_by_key(|o| o.capacity))
}

/// Smallest capacity a user may choose. Capped at the largest tier so the
/// biggest option stays selectable when even it falls short of `target`.
pub fn minimum_selectable_capacity(options: &[CapacityPriceEntry], target: u32) -> u32 {
    let largest = options.iter().map(|o| o.capacity).max().unwrap_or(0);
    target.min(largest)
}

pub fn is_selectable(option: &CapacityPriceEntry, options: &[CapacityPriceEntry], target: u32) -> bool {
    option.capacity >= minimum_selectable_capacity(options, target)
}

/// Number of power/switch units needed at the chosen tier, at least 1.
pub fn power_unit_quantity(cameras: CameraCount, capacity: u32) -> u32 {
    if capacity == 0 {
        return 1;
    }
    cameras.value().div_ceil(capacity).max(1)
}

/// Number of cable units covering an average run per camera, at least 1.
pub fn cable_quantity(cameras: CameraCount, cable: &CablePriceEntry) -> u32 {
    if cable.coverage_meters == 0 {
        return 1;
    }
    (cameras.value() * CABLE_RUN_METERS_PER_CAMERA)
        .div_ceil(cable.coverage_meters)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::FallbackPrices;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn cams(n: i64) -> CameraCount { CameraCount::clamped(n) }

    fn cable(coverage_meters: u32) -> CablePriceEntry {
        CablePriceEntry {
            id: "c".into(),
            label: "Cable".into(),
            coverage_meters,
            mrp_per_unit: Decimal::ZERO,
            sale_per_unit: Decimal::ZERO,
        }
    }

    #[test]
    fn test_analog_tiers_for_ten_cameras() {
        assert_eq!(recommended_recorder_capacity(SystemKind::Analog, cams(10)), 16);
        assert_eq!(recommended_power_capacity(SystemKind::Analog, cams(10)), 16);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(recommended_recorder_capacity(SystemKind::Analog, cams(4)), 4);
        assert_eq!(recommended_recorder_capacity(SystemKind::Analog, cams(5)), 8);
        assert_eq!(recommended_recorder_capacity(SystemKind::Analog, cams(17)), 32);
        assert_eq!(recommended_power_capacity(SystemKind::Analog, cams(8)), 8);
        assert_eq!(recommended_power_capacity(SystemKind::Analog, cams(32)), 16);
        assert_eq!(recommended_recorder_capacity(SystemKind::Ip, cams(1)), 8);
        assert_eq!(recommended_power_capacity(SystemKind::Ip, cams(16)), 16);
        assert_eq!(recommended_power_capacity(SystemKind::Ip, cams(17)), 32);
    }

    #[test]
    fn test_pick_falls_back_to_largest() {
        let power = FallbackPrices::default().analog.power;
        assert_eq!(pick_capacity_option(&power, 8).map(|o| o.capacity), Some(8));
        assert_eq!(pick_capacity_option(&power, 6).map(|o| o.capacity), Some(8));
        assert_eq!(pick_capacity_option(&power, 32).map(|o| o.capacity), Some(16));
        assert!(pick_capacity_option(&[], 4).is_none());
    }

    #[test]
    fn test_selectable_caps_at_largest() {
        let power = FallbackPrices::default().ip.power;
        let selectable: Vec<u32> = power.iter().filter(|o| is_selectable(o, &power, 32)).map(|o| o.capacity).collect();
        assert_eq!(selectable, vec![16]);
        let selectable: Vec<u32> = power.iter().filter(|o| is_selectable(o, &power, 8)).map(|o| o.capacity).collect();
        assert_eq!(selectable, vec![8, 16]);
    }

    #[test]
    fn test_quantities() {
        assert_eq!(cable_quantity(cams(20), &cable(100)), 5);
        assert_eq!(cable_quantity(cams(1), &cable(305)), 1);
        assert_eq!(cable_quantity(cams(4), &cable(90)), 2);
        assert_eq!(cable_quantity(cams(4), &cable(0)), 1);
        assert_eq!(power_unit_quantity(cams(20), 16), 2);
        assert_eq!(power_unit_quantity(cams(16), 16), 1);
        assert_eq!(power_unit_quantity(cams(3), 0), 1);
    }

    proptest! {
        #[test]
        fn prop_recommended_tier_covers_cameras(n in 1i64..=32) {
            let fallback = FallbackPrices::default();
            for system in SystemKind::ALL {
                let catalog = match system { SystemKind::Analog => &fallback.analog, SystemKind::Ip => &fallback.ip };
                let target = recommended_recorder_capacity(system, cams(n));
                let picked = pick_capacity_option(&catalog.recorders, target).unwrap();
                prop_assert!(picked.capacity as i64 >= n);
                prop_assert!(target as i64 >= n);
                let power_target = recommended_power_capacity(system, cams(n));
                let picked = pick_capacity_option(&catalog.power, power_target).unwrap();
                prop_assert!(picked.capacity * power_unit_quantity(cams(n), picked.capacity) >= n as u32);
            }
        }

        #[test]
        fn prop_quantities_monotonic(n in 1i64..32, capacity in 1u32..=32, coverage in 1u32..=400) {
            prop_assert!(power_unit_quantity(cams(n + 1), capacity) >= power_unit_quantity(cams(n), capacity));
            prop_assert!(cable_quantity(cams(n + 1), &cable(coverage)) >= cable_quantity(cams(n), &cable(coverage)));
        }
    }
}
