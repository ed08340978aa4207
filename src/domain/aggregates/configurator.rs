//! Configurator Aggregate

use serde::Serialize;
use tracing::debug;

use crate::domain::catalog::{CapacityPriceEntry, PricingCatalog};
use crate::domain::events::ConfiguratorEvent;
use crate::domain::recommendation::{
    is_selectable, minimum_selectable_capacity, pick_capacity_option, recommended_power_capacity,
    recommended_recorder_capacity,
};
use crate::domain::selections::{reconcile_selections, Selections, SystemSelections};
use crate::domain::totals::{compute_totals, ComponentKind, Totals};
use crate::domain::value_objects::{CameraCount, Resolution, SystemKind};

/// Session state of the custom-setup configurator.
///
/// Lives for one configurator session and is never persisted. Every intent
/// takes the catalog it was built against; after a catalog rebuild call
/// [`Configurator::reconcile`].
#[derive(Clone, Debug)]
pub struct Configurator {
    system: SystemKind,
    camera_count: CameraCount,
    selections: Selections,
    monitor_included: bool,
    installation_included: bool,
    events: Vec<ConfiguratorEvent>,
}

/// One capacity option as shown in a selection list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionView<'a> {
    #[serde(flatten)]
    pub entry: &'a CapacityPriceEntry,
    pub selectable: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("unknown {component:?} option: {id}")]
    UnknownOption { component: ComponentKind, id: String },
    #[error("{id} supports {capacity} but {required} are required")]
    UnderProvisioned { id: String, capacity: u32, required: u32 },
}

#[derive(Clone, Copy)]
enum Tier {
    Recorder,
    Power,
}

impl Tier {
    fn component(self) -> ComponentKind {
        match self {
            Self::Recorder => ComponentKind::Recorder,
            Self::Power => ComponentKind::Power,
        }
    }

    fn options(self, catalog: &PricingCatalog, system: SystemKind) -> &[CapacityPriceEntry] {
        let tables = catalog.system(system);
        match self {
            Self::Recorder => &tables.recorders,
            Self::Power => &tables.power,
        }
    }

    fn target(self, system: SystemKind, cameras: CameraCount) -> u32 {
        match self {
            Self::Recorder => recommended_recorder_capacity(system, cameras),
            Self::Power => recommended_power_capacity(system, cameras),
        }
    }

    fn current(self, selections: &SystemSelections) -> &str {
        match self {
            Self::Recorder => &selections.recorder_id,
            Self::Power => &selections.power_id,
        }
    }

    fn selected(self, selections: &mut SystemSelections) -> &mut String {
        match self {
            Self::Recorder => &mut selections.recorder_id,
            Self::Power => &mut selections.power_id,
        }
    }
}

impl Configurator {
    /// Analog system, 4 cameras, first catalog entries, installation
    /// included and monitor excluded.
    pub fn new(catalog: &PricingCatalog) -> Self {
        let mut configurator = Self {
            system: SystemKind::Analog,
            camera_count: CameraCount::default(),
            selections: Selections::first_of(catalog),
            monitor_included: false,
            installation_included: true,
            events: vec![],
        };
        configurator.apply_recommendations(catalog);
        configurator.events.clear();
        configurator
    }

    /// Rebuilds a session from externally held state, then reconciles it.
    pub fn restore(
        catalog: &PricingCatalog,
        system: SystemKind,
        camera_count: CameraCount,
        selections: Selections,
        monitor_included: bool,
        installation_included: bool,
    ) -> Self {
        let mut configurator =
            Self { system, camera_count, selections, monitor_included, installation_included, events: vec![] };
        configurator.reconcile(catalog);
        configurator
    }

    pub fn system(&self) -> SystemKind { self.system }
    pub fn camera_count(&self) -> CameraCount { self.camera_count }
    pub fn selections(&self) -> &Selections { &self.selections }
    pub fn active_selections(&self) -> &SystemSelections { self.selections.system(self.system) }
    pub fn monitor_included(&self) -> bool { self.monitor_included }
    pub fn installation_included(&self) -> bool { self.installation_included }

    pub fn set_system(&mut self, system: SystemKind) {
        if system == self.system { return; }
        self.raise_event(ConfiguratorEvent::SystemSwitched { from: self.system, to: system });
        self.system = system;
    }

    /// Clamps `count` to the supported range and upgrades any recorder or
    /// power selection that no longer covers it.
    pub fn set_camera_count(&mut self, count: i64, catalog: &PricingCatalog) {
        let next = CameraCount::clamped(count);
        if next != self.camera_count {
            self.raise_event(ConfiguratorEvent::CameraCountChanged { from: self.camera_count, to: next });
            self.camera_count = next;
        }
        self.apply_recommendations(catalog);
    }

    pub fn select_recorder(&mut self, id: &str, catalog: &PricingCatalog) -> Result<(), SelectionError> {
        self.select_tier(Tier::Recorder, id, catalog)
    }

    pub fn select_power(&mut self, id: &str, catalog: &PricingCatalog) -> Result<(), SelectionError> {
        self.select_tier(Tier::Power, id, catalog)
    }

    pub fn select_cable(&mut self, id: &str, catalog: &PricingCatalog) -> Result<(), SelectionError> {
        if catalog.system(self.system).cable(id).is_none() {
            return Err(SelectionError::UnknownOption { component: ComponentKind::Cable, id: id.to_string() });
        }
        self.selections.system_mut(self.system).cable_id = id.to_string();
        Ok(())
    }

    pub fn select_resolution(&mut self, resolution: Resolution, catalog: &PricingCatalog) -> Result<(), SelectionError> {
        if catalog.system(self.system).camera(resolution).is_none() {
            return Err(SelectionError::UnknownOption { component: ComponentKind::Camera, id: resolution.to_string() });
        }
        self.selections.system_mut(self.system).resolution = Some(resolution);
        Ok(())
    }

    pub fn set_dual_light(&mut self, dual_light: bool) {
        self.selections.system_mut(self.system).dual_light = dual_light;
    }

    pub fn select_storage(&mut self, id: &str, catalog: &PricingCatalog) -> Result<(), SelectionError> {
        if catalog.storage_option(id).is_none() {
            return Err(SelectionError::UnknownOption { component: ComponentKind::Storage, id: id.to_string() });
        }
        self.selections.hdd_id = id.to_string();
        Ok(())
    }

    pub fn set_monitor_included(&mut self, included: bool) { self.monitor_included = included; }
    pub fn set_installation_included(&mut self, included: bool) { self.installation_included = included; }

    /// Re-validates selections after the catalog changed, then re-applies
    /// capacity recommendations.
    pub fn reconcile(&mut self, catalog: &PricingCatalog) {
        let before = self.selections.clone();
        let after = reconcile_selections(catalog, &before);
        for system in SystemKind::ALL {
            let (old, new) = (before.system(system), after.system(system));
            for (component, from, to) in [
                (ComponentKind::Recorder, &old.recorder_id, &new.recorder_id),
                (ComponentKind::Power, &old.power_id, &new.power_id),
                (ComponentKind::Cable, &old.cable_id, &new.cable_id),
            ] {
                if from != to {
                    self.raise_event(ConfiguratorEvent::SelectionReconciled { component, from: from.clone(), to: to.clone() });
                }
            }
        }
        if before.hdd_id != after.hdd_id {
            self.raise_event(ConfiguratorEvent::SelectionReconciled {
                component: ComponentKind::Storage,
                from: before.hdd_id.clone(),
                to: after.hdd_id.clone(),
            });
        }
        self.selections = after;
        self.apply_recommendations(catalog);
    }

    pub fn totals(&self, catalog: &PricingCatalog) -> Totals {
        compute_totals(
            self.system,
            self.camera_count,
            self.active_selections(),
            catalog,
            &self.selections.hdd_id,
            self.monitor_included,
            self.installation_included,
        )
    }

    pub fn recorder_options<'a>(&self, catalog: &'a PricingCatalog) -> Vec<OptionView<'a>> {
        self.option_views(Tier::Recorder, catalog)
    }

    pub fn power_options<'a>(&self, catalog: &'a PricingCatalog) -> Vec<OptionView<'a>> {
        self.option_views(Tier::Power, catalog)
    }

    pub fn take_events(&mut self) -> Vec<ConfiguratorEvent> { std::mem::take(&mut self.events) }

    fn option_views<'a>(&self, tier: Tier, catalog: &'a PricingCatalog) -> Vec<OptionView<'a>> {
        let options = tier.options(catalog, self.system);
        let target = tier.target(self.system, self.camera_count);
        let selected = tier.current(self.active_selections());
        options
            .iter()
            .map(|entry| OptionView { entry, selectable: is_selectable(entry, options, target), selected: entry.id() == selected })
            .collect()
    }

    fn select_tier(&mut self, tier: Tier, id: &str, catalog: &PricingCatalog) -> Result<(), SelectionError> {
        let options = tier.options(catalog, self.system);
        let entry = options
            .iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| SelectionError::UnknownOption { component: tier.component(), id: id.to_string() })?;
        let target = tier.target(self.system, self.camera_count);
        if !is_selectable(entry, options, target) {
            return Err(SelectionError::UnderProvisioned {
                id: id.to_string(),
                capacity: entry.capacity,
                required: minimum_selectable_capacity(options, target),
            });
        }
        *tier.selected(self.selections.system_mut(self.system)) = id.to_string();
        Ok(())
    }

    /// Both systems are checked so an inactive one is valid when switched to.
    fn apply_recommendations(&mut self, catalog: &PricingCatalog) {
        for system in SystemKind::ALL {
            for tier in [Tier::Recorder, Tier::Power] {
                let options = tier.options(catalog, system);
                let target = tier.target(system, self.camera_count);
                let floor = minimum_selectable_capacity(options, target);
                let slot = tier.selected(self.selections.system_mut(system));
                let current = options.iter().find(|e| e.id() == slot.as_str()).map_or(0, |e| e.capacity);
                if current >= floor {
                    continue;
                }
                let Some(recommended) = pick_capacity_option(options, target) else { continue };
                debug!(%system, from = %slot, to = recommended.id(), target, "upgrading under-provisioned selection");
                let from = std::mem::replace(slot, recommended.id().to_string());
                self.raise_event(ConfiguratorEvent::SelectionUpgraded {
                    system,
                    component: tier.component(),
                    from,
                    to: recommended.id().to_string(),
                    required_capacity: target,
                });
            }
        }
    }

    fn raise_event(&mut self, e: ConfiguratorEvent) { self.events.push(e); }
}
