//! Aggregates module
pub mod configurator;

pub use configurator::{Configurator, OptionView, SelectionError};
