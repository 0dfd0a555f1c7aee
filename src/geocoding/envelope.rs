//! Backend result envelope.
//!
//! Typed view of the body a search backend returns: an optional `geocoding`
//! block carrying error entries, and a list of GeoJSON-like place features.
//! Only the fields the translator reads are modeled; everything else the
//! backend sends is ignored on decode.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geocoding::errors::UpstreamError;

/// Failure to read a backend body as an [`Envelope`].
#[derive(Debug, Error)]
#[error("malformed backend envelope: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// The whole backend body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub geocoding: GeocodingBlock,

    /// `None` when the backend sent no `features` key (or `null`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
}

impl Envelope {
    /// Decode a parsed JSON body.
    pub fn decode(value: &serde_json::Value) -> Result<Self, DecodeError> {
        Ok(Self::deserialize(value)?)
    }

    /// Envelope carrying a single error and no places, used when the backend
    /// could not be reached at all.
    pub fn failed(error: UpstreamError) -> Self {
        Self {
            geocoding: GeocodingBlock {
                errors: Some(vec![error]),
            },
            features: Some(Vec::new()),
        }
    }

    pub fn errors(&self) -> &[UpstreamError] {
        self.geocoding.errors.as_deref().unwrap_or_default()
    }
}

/// The `geocoding` metadata block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodingBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<UpstreamError>>,
}

/// One place record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub properties: Properties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<String>,

    /// Formatted address label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addendum: Option<Addendum>,
}

impl Properties {
    /// `addendum.pelias.addressComponents`, if the backend sent it.
    pub fn address_components(&self) -> Option<&[AddressComponent]> {
        self.addendum
            .as_ref()?
            .pelias
            .as_ref()?
            .address_components
            .as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Addendum {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pelias: Option<PeliasAddendum>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeliasAddendum {
    #[serde(
        rename = "addressComponents",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub address_components: Option<Vec<AddressComponent>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub name: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub coordinates: Position,
}

/// A `[longitude, latitude]` pair. Trailing elements (altitude) are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Error)]
#[error("coordinates need longitude and latitude, got {0} value(s)")]
pub struct ShortCoordinates(usize);

impl TryFrom<Vec<f64>> for Position {
    type Error = ShortCoordinates;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [lng, lat, ..] => Ok(Self { lng: *lng, lat: *lat }),
            _ => Err(ShortCoordinates(values.len())),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.lng, p.lat]
    }
}
