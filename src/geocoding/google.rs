//! Client-facing response schema, shaped like the Google Geocoding API.
//!
//! Several fields have no equivalent in the search backend and are always
//! emitted as empty placeholders so existing clients keep parsing.

use serde::{Deserialize, Serialize};

use crate::geocoding::envelope::{self, Feature};

/// Top-level response body. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub plus_code: PlusCode,
    pub results: Vec<PlaceResult>,
    /// Always `"OK"`, whatever HTTP status accompanies the body.
    pub status: String,
}

impl GeocodeResponse {
    pub const STATUS: &'static str = "OK";

    pub fn new(plus_code: PlusCode, results: Vec<PlaceResult>) -> Self {
        Self {
            plus_code,
            results,
            status: Self::STATUS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlusCode {
    pub compound_code: String,
    pub global_code: String,
}

impl PlusCode {
    /// Envelope-level plus code emitted when none is configured.
    pub fn fallback() -> Self {
        Self {
            compound_code: "QM8M+C8W District 1, Ho Chi Minh City, Vietnam".to_string(),
            global_code: "7P28QM8M+C8W".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_components: Option<Vec<AddressComponent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub plus_code: PlusCode,
    pub types: Vec<String>,
}

impl From<&Feature> for PlaceResult {
    fn from(feature: &Feature) -> Self {
        let properties = &feature.properties;
        Self {
            address_components: properties
                .address_components()
                .map(|components| components.iter().map(AddressComponent::from).collect()),
            formatted_address: properties.name.clone(),
            geometry: Geometry::at(feature.geometry.coordinates),
            place_id: properties.gid.clone(),
            plus_code: PlusCode::default(),
            types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    pub types: Vec<String>,
}

impl From<&envelope::AddressComponent> for AddressComponent {
    // The backend has a single name form, so both names carry it.
    fn from(component: &envelope::AddressComponent) -> Self {
        Self {
            long_name: component.name.clone(),
            short_name: component.name.clone(),
            types: component.types.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    pub location_type: String,
    pub viewport: Viewport,
}

impl Geometry {
    fn at(position: envelope::Position) -> Self {
        Self {
            location: LatLng {
                lat: position.lat,
                lng: position.lng,
            },
            location_type: String::new(),
            viewport: Viewport::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Viewport placeholder; corners are empty strings, never numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub northeast: EmptyCorner,
    pub southwest: EmptyCorner,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyCorner {
    pub lat: String,
    pub lng: String,
}
