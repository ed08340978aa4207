//! Admin-supplied setup blueprint
//!
//! Shape: systems → components → options. Nothing in it is trusted: every
//! field goes through a lenient decoder and a malformed entry is dropped
//! instead of failing the whole document.

use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::metadata::{first_numeric, first_string, string_value, Metadata};

const LABEL_KEYS: [&str; 2] = ["label", "name"];
const UNIT_PRICE_KEYS: [&str; 2] = ["unit_price", "unitPrice"];
const BASE_PRICE_KEYS: [&str; 2] = ["base_price", "basePrice"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    #[serde(default, deserialize_with = "lenient_list")]
    pub systems: Vec<BlueprintSystem>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintSystem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub components: Vec<BlueprintComponent>,
}

/// Accepts both `unit_price` and `unitPrice` spellings; the snake_case key
/// wins when both carry a usable value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlueprintComponent {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub base_price: Option<Decimal>,
    pub options: Vec<BlueprintOption>,
}

/// `label` falls back to `name`, `unit_price` to `unitPrice`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlueprintOption {
    pub id: Option<String>,
    pub label: Option<String>,
    pub unit_price: Option<Decimal>,
    pub metadata: Metadata,
}

impl<'de> Deserialize<'de> for BlueprintComponent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = object_fields(deserializer)?;
        Ok(Self {
            slug: first_string(&fields, &["slug"]),
            name: first_string(&fields, &["name"]),
            unit_price: first_numeric(&fields, &UNIT_PRICE_KEYS),
            base_price: first_numeric(&fields, &BASE_PRICE_KEYS),
            options: lenient_items(fields.get("options")),
        })
    }
}

impl<'de> Deserialize<'de> for BlueprintOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = object_fields(deserializer)?;
        let metadata = match fields.get("metadata") {
            Some(Value::Object(map)) => map.clone(),
            _ => Metadata::new(),
        };
        Ok(Self {
            id: first_string(&fields, &["id"]),
            label: first_string(&fields, &LABEL_KEYS),
            unit_price: first_numeric(&fields, &UNIT_PRICE_KEYS),
            metadata,
        })
    }
}

impl Blueprint {
    pub fn from_json_str(raw: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(&value))
    }

    /// Decodes any JSON value; a non-object yields an empty blueprint.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    pub fn system(&self, slug: &str) -> Option<&BlueprintSystem> {
        self.systems.iter().find(|s| slug_matches(s.slug.as_deref(), slug))
    }
}

impl BlueprintSystem {
    pub fn component(&self, slug: &str) -> Option<&BlueprintComponent> {
        self.components.iter().find(|c| slug_matches(c.slug.as_deref(), slug))
    }
}

fn slug_matches(candidate: Option<&str>, wanted: &str) -> bool {
    candidate.is_some_and(|c| c.trim().eq_ignore_ascii_case(wanted))
}

/// Non-objects are rejected so the enclosing list drops them.
fn object_fields<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Metadata, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        other => Err(de::Error::custom(format!("expected an object, found {other}"))),
    }
}

fn lenient_items<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| T::deserialize(v).ok()).collect(),
        _ => Vec::new(),
    }
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_items(Some(&value)))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(string_value(&Value::deserialize(deserializer)?))
}
