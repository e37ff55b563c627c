use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Latitude / longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A place the traveller may visit, in its persisted shape.
///
/// `name` identifies the place within one planning context; every other field
/// is optional metadata that must survive itinerary merges untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    /// Short description, usually the recommendation text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Photo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Planned visit time, free-form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Coordinates>,
}

impl Place {
    /// Bare `{name}` record with no metadata.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: None,
            image: None,
            time: None,
            geometry: None,
        }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_geometry(mut self, lat: f64, lng: f64) -> Self {
        self.geometry = Some(Coordinates::new(lat, lng));
        self
    }

    /// `"lat,lng"` when coordinates are known, `"unknown"` otherwise.
    pub fn location_label(&self) -> String {
        match self.geometry {
            Some(Coordinates { lat, lng }) => format!("{},{}", lat, lng),
            None => "unknown".to_string(),
        }
    }
}

/// One suggestion returned by the recommendation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaceRecommendation {
    /// Name of the recommended place
    pub name: String,
    /// Why the place is worth visiting
    #[serde(rename = "desc", default)]
    pub description: String,
}

impl PlaceRecommendation {
    pub fn into_place(self) -> Place {
        let place = Place::named(self.name);
        if self.description.is_empty() {
            place
        } else {
            place.with_desc(self.description)
        }
    }
}
