//! Configurator domain: catalog resolution, recommendations and totals.
pub mod aggregates;
pub mod blueprint;
pub mod catalog;
pub mod events;
pub mod metadata;
pub mod pricing;
pub mod recommendation;
pub mod selections;
pub mod totals;
pub mod value_objects;
