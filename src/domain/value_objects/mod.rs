//! Value Objects for the setup configurator

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Recorder system family. `Analog` is the DVR kit, `Ip` the NVR kit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemKind {
    #[default]
    Analog,
    Ip,
}

impl SystemKind {
    pub const ALL: [SystemKind; 2] = [SystemKind::Analog, SystemKind::Ip];

    /// Slug of the matching system in an admin blueprint.
    pub fn blueprint_slug(&self) -> &'static str {
        match self {
            Self::Analog => "dvr-system",
            Self::Ip => "nvr-system",
        }
    }

    pub fn recorder_name(&self) -> &'static str {
        match self {
            Self::Analog => "DVR",
            Self::Ip => "NVR",
        }
    }

    pub fn power_name(&self) -> &'static str {
        match self {
            Self::Analog => "SMPS",
            Self::Ip => "PoE switch",
        }
    }
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analog => write!(f, "analog"),
            Self::Ip => write!(f, "ip"),
        }
    }
}

/// Number of cameras in the setup, always within `MIN..=MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CameraCount(u32);

impl CameraCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 32;

    /// Out-of-range input is clamped, never rejected.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }
    pub fn value(&self) -> u32 { self.0 }
}

impl Default for CameraCount { fn default() -> Self { Self(4) } }

impl<'de> Deserialize<'de> for CameraCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        let whole = if raw.is_finite() { raw.round() as i64 } else { Self::MIN as i64 };
        Ok(Self::clamped(whole))
    }
}

/// Camera megapixel tier, displayed and serialized as e.g. `"2MP"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resolution(u8);

impl Resolution {
    pub fn megapixels(mp: u8) -> Result<Self, ResolutionError> {
        if mp == 0 { return Err(ResolutionError::Zero); }
        Ok(Self(mp))
    }
    pub fn value(&self) -> u8 { self.0 }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}MP", self.0) }
}

impl FromStr for Resolution {
    type Err = ResolutionError;

    /// Accepts `"2MP"`, `"2mp"`, `"2 MP"` and bare `"2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let digits = trimmed.strip_suffix("mp").unwrap_or(&trimmed).trim();
        let mp: u8 = digits.parse().map_err(|_| ResolutionError::Unrecognized(s.to_string()))?;
        Self::megapixels(mp)
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("resolution must be at least 1MP")]
    Zero,
    #[error("unrecognized resolution: {0}")]
    Unrecognized(String),
}

/// A validated MRP/sale pair. Construction always enforces `0 <= sale <= mrp`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePair {
    pub mrp: Decimal,
    pub sale: Decimal,
}

impl PricePair {
    /// Applies the floor/cap rule to a raw pair.
    ///
    /// A zero MRP with a positive sale means the sale price is the retail
    /// price (service lines have no list price). Otherwise the sale is capped
    /// at the MRP.
    pub fn floored(raw_mrp: Decimal, raw_sale: Decimal) -> Self {
        let mrp = raw_mrp.max(Decimal::ZERO);
        let sale = raw_sale.max(Decimal::ZERO);
        if mrp.is_zero() && sale > Decimal::ZERO {
            Self { mrp: sale, sale }
        } else {
            Self { mrp, sale: sale.min(mrp) }
        }
    }

    /// Aggregate variant used on whole-order sums: the MRP is lifted to the
    /// sale when it falls short, rather than the sale being cut down.
    pub fn lifted(raw_mrp: Decimal, raw_sale: Decimal) -> Self {
        let mrp = raw_mrp.max(raw_sale);
        Self { mrp, sale: raw_sale.min(mrp) }
    }

    pub fn discount(&self) -> Decimal { self.mrp - self.sale }
}
