//! Listing Types
//!
//! The car listing shape shared by comparison, session state and export,
//! and the narrow trait the comparator reads entities through.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Attribute, FieldValue};

// == Comparable Entity ==
/// Anything that exposes the policy-covered numeric attributes.
pub trait ComparableEntity {
    fn field(&self, attribute: Attribute) -> FieldValue;
}

impl ComparableEntity for Value {
    /// Reads the attribute from the first of its keys that holds a non-null
    /// value. Non-objects and missing keys read as null.
    fn field(&self, attribute: Attribute) -> FieldValue {
        attribute
            .json_keys()
            .iter()
            .find_map(|key| self.get(*key).filter(|value| !value.is_null()))
            .map(FieldValue::from)
            .unwrap_or_default()
    }
}

impl<E: ComparableEntity + ?Sized> ComparableEntity for &E {
    fn field(&self, attribute: Attribute) -> FieldValue {
        (**self).field(attribute)
    }
}

// == Listing Id ==
/// Listing identifier: the backend uses numeric ids, scraped listings carry
/// string external ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingId::Int(id) => write!(f, "{id}"),
            ListingId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ListingId {
    fn from(id: i64) -> Self {
        ListingId::Int(id)
    }
}

impl From<&str> for ListingId {
    fn from(id: &str) -> Self {
        ListingId::Text(id.to_string())
    }
}

// == Car Listing ==
/// One used-car listing. Fields the dashboard does not interpret are kept
/// in `extra` so they survive persistence untouched.
///
/// Engine volume is read from `engine_volume` or `engineVolume`, and the
/// link from `listing_url` or `url`. When a payload carries both spellings
/// the first non-null one in that order wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawListing")]
pub struct CarListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ListingId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub year: FieldValue,
    #[serde(default)]
    pub price: FieldValue,
    #[serde(default)]
    pub mileage: FieldValue,
    #[serde(default)]
    pub engine_volume: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape with both spellings of the aliased fields kept apart, since
/// serde rejects a payload that carries a field and its alias together.
#[derive(Deserialize)]
struct RawListing {
    #[serde(default)]
    id: Option<ListingId>,
    #[serde(default)]
    external_id: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    year: FieldValue,
    #[serde(default)]
    price: FieldValue,
    #[serde(default)]
    mileage: FieldValue,
    #[serde(default)]
    engine_volume: Option<FieldValue>,
    #[serde(default, rename = "engineVolume")]
    engine_volume_camel: Option<FieldValue>,
    #[serde(default)]
    engine_type: Option<String>,
    #[serde(default)]
    transmission: Option<String>,
    #[serde(default)]
    body_type: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    listing_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawListing> for CarListing {
    fn from(raw: RawListing) -> Self {
        Self {
            id: raw.id,
            external_id: raw.external_id,
            brand: raw.brand,
            model: raw.model,
            year: raw.year,
            price: raw.price,
            mileage: raw.mileage,
            engine_volume: raw.engine_volume.or(raw.engine_volume_camel).unwrap_or_default(),
            engine_type: raw.engine_type,
            transmission: raw.transmission,
            body_type: raw.body_type,
            color: raw.color,
            region: raw.region,
            listing_url: raw.listing_url.or(raw.url),
            extra: raw.extra,
        }
    }
}

impl CarListing {
    /// "Brand Model" for log lines and notification text.
    pub fn title(&self) -> String {
        let brand = self.brand.as_deref().unwrap_or_default();
        let model = self.model.as_deref().unwrap_or_default();
        format!("{brand} {model}").trim().to_string()
    }

    /// Whether this listing is the one identified by `id`, matching on the
    /// textual form so path parameters compare equal to numeric ids.
    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_ref().is_some_and(|own| own.to_string() == id)
    }
}

impl ComparableEntity for CarListing {
    fn field(&self, attribute: Attribute) -> FieldValue {
        match attribute {
            Attribute::Price => self.price.clone(),
            Attribute::Year => self.year.clone(),
            Attribute::Mileage => self.mileage.clone(),
            Attribute::EngineVolume => self.engine_volume.clone(),
        }
    }
}
