//! Day-by-day distribution of places.
//!
//! The chat backend proposes which place goes on which day; the merge step
//! below is deterministic and is the only code that touches the itinerary.
//! It appends, never reorders or rewrites existing entries, and re-attaches
//! each place's full record by name instead of trusting the model's echo.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    error::{PlannerError, Result},
    services::openai_client::{
        ChatBackend, ChatCompletionRequest, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    },
    types::{decode_reply, DateKey, Distribution, Itinerary, Place},
};

const DISTRIBUTION_SYSTEM_PROMPT: &str = "You are a helpful travel itinerary planner.";

/// Reduced place form embedded in the distribution prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceLocation<'a> {
    pub name: &'a str,
    pub location: String,
}

pub fn serialize_places(places: &[Place]) -> Vec<PlaceLocation<'_>> {
    places
        .iter()
        .map(|place| PlaceLocation {
            name: &place.name,
            location: place.location_label(),
        })
        .collect()
}

/// Build the user prompt asking the model to group `places` over `dates`.
pub fn build_distribution_prompt(
    places: &[Place],
    dates: &[DateKey],
    destination: &str,
) -> Result<String> {
    let places_json = serde_json::to_string(&serialize_places(places))?;
    let dates_list = dates
        .iter()
        .map(DateKey::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "You are a travel planner helping to distribute {place_count} places across {day_count} days in {destination}.
Here are the places with their coordinates: {places_json}.
The available dates are: {dates_list}.

Please distribute these places into a daily itinerary following these rules:
1. Group places that are geographically close to each other on the same day to minimize travel time
2. Consider a realistic number of places per day (typically 2-4 places)
3. If there are more days than needed, it's okay to leave some days empty
4. Return the result as a JSON object where:
   - Keys are dates in DD-MM-YYYY format
   - Values are objects with a 'placesPlanned' array containing the place names (just the names as strings)
   - Each place should be assigned to exactly one day

The response should be ONLY the JSON object, nothing else.",
        place_count = places.len(),
        day_count = dates.len(),
    ))
}

/// Decode the model's distribution reply.
pub fn parse_distribution(text: &str) -> Result<Distribution> {
    decode_reply::<Distribution>(text)
}

/// Merge a model distribution into `existing`.
///
/// Existing days keep their places, in order, untouched. For each date the
/// model returned (in the model's order) the assigned names are resolved
/// against `places` by exact name and appended after the day's existing
/// places; a name that matches no requested place becomes a bare `{name}`
/// record. Dates the model invented are created, dates it skipped are left
/// as they were.
///
/// The whole requested record is re-attached, `time` included, so a place
/// keeps any visit time the caller already set. A name the model repeats is
/// appended each time it appears; see [`Distribution::duplicated_names`].
pub fn merge_distribution(
    existing: &Itinerary,
    distribution: &Distribution,
    places: &[Place],
) -> Itinerary {
    let mut result = existing.clone();

    for (date, names) in distribution.iter() {
        let day = result.day_mut_or_default(date);
        day.places_planned
            .extend(names.iter().map(|name| resolve_place(name, places)));
    }

    result
}

fn resolve_place(name: &str, places: &[Place]) -> Place {
    places
        .iter()
        .find(|place| place.name == name)
        .cloned()
        .unwrap_or_else(|| Place::named(name))
}

/// Spreads places over trip days with the help of a chat backend.
#[derive(Debug, Clone)]
pub struct Distributor {
    backend: Arc<dyn ChatBackend>,
    model: String,
    temperature: f64,
}

impl Distributor {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask for a grouping of `places` over `dates` and merge it into `existing`.
    ///
    /// With no places the existing itinerary is returned as-is and no request
    /// is made. A missing or malformed reply aborts before anything is merged.
    pub async fn distribute(
        &self,
        places: &[Place],
        dates: &[DateKey],
        destination: &str,
        existing: &Itinerary,
    ) -> Result<Itinerary> {
        if places.is_empty() {
            debug!(target: "trip_planner::distribute", "no places to distribute");
            return Ok(existing.clone());
        }

        let prompt = build_distribution_prompt(places, dates, destination)?;
        debug!(
            target: "trip_planner::distribute",
            destination,
            places = places.len(),
            days = dates.len(),
            %prompt
        );

        let request = ChatCompletionRequest::new(self.model.as_str())
            .with_system(DISTRIBUTION_SYSTEM_PROMPT)
            .with_user(prompt)
            .with_temperature(self.temperature)
            .json_object();

        let content = self.backend.complete(request).await?.ok_or_else(|| {
            PlannerError::MalformedResponse("no itinerary received".to_string())
        })?;

        let distribution = parse_distribution(&content)?;

        let unassigned = distribution.unassigned(places);
        if !unassigned.is_empty() {
            warn!(
                target: "trip_planner::distribute",
                ?unassigned,
                "model left places without a day"
            );
        }
        let unknown = distribution.unknown_names(places);
        if !unknown.is_empty() {
            warn!(
                target: "trip_planner::distribute",
                ?unknown,
                "model assigned unknown place names"
            );
        }

        let duplicated = distribution.duplicated_names();
        if !duplicated.is_empty() {
            warn!(
                target: "trip_planner::distribute",
                ?duplicated,
                "model assigned places more than once"
            );
        }

        Ok(merge_distribution(existing, &distribution, places))
    }
}
