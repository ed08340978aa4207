//! Configurator events
use crate::domain::totals::ComponentKind;
use crate::domain::value_objects::{CameraCount, SystemKind};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfiguratorEvent {
    /// An under-provisioned tier was replaced by the recommended one.
    SelectionUpgraded { system: SystemKind, component: ComponentKind, from: String, to: String, required_capacity: u32 },
    /// A selected id vanished from a rebuilt catalog.
    SelectionReconciled { component: ComponentKind, from: String, to: String },
    CameraCountChanged { from: CameraCount, to: CameraCount },
    SystemSwitched { from: SystemKind, to: SystemKind },
}
