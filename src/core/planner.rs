use std::sync::Arc;

use crate::{
    config::PlannerConfig,
    core::{
        distribute::Distributor,
        recommend::{RecommendationMode, Recommender},
    },
    error::Result,
    services::{ChatBackend, OpenAIClient, PhotoLookup},
    types::{DateKey, Itinerary, Place, PlaceRecommendation, Trip},
};

/// Entry point bundling the recommendation, distribution and photo components
/// around one shared chat backend.
#[derive(Debug, Clone)]
pub struct TripPlanner {
    recommender: Recommender,
    distributor: Distributor,
    photos: Option<PhotoLookup>,
}

impl TripPlanner {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            recommender: Recommender::new(Arc::clone(&backend)),
            distributor: Distributor::new(backend),
            photos: None,
        }
    }

    /// Build every component from `config`.
    ///
    /// Fails with `MissingCredential` before any request when the chat key is
    /// absent. Photo lookup is enabled only when an access key is configured.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        config.validate()?;

        let client = OpenAIClient::new(config.require_openai_key()?)?
            .with_base_url(config.openai_base_url.as_str())
            .with_timeout(config.timeout)?;

        let photos = match config.unsplash_access_key {
            Some(_) => Some(PhotoLookup::from_config(config)?),
            None => None,
        };

        let planner = Self::new(Arc::new(client))
            .with_model(config.model.as_str())
            .with_temperature(config.temperature);

        Ok(match photos {
            Some(photos) => planner.with_photo_lookup(photos),
            None => planner,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&PlannerConfig::from_env()?)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.recommender = self.recommender.with_model(model.as_str());
        self.distributor = self.distributor.with_model(model);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.recommender = self.recommender.with_temperature(temperature);
        self.distributor = self.distributor.with_temperature(temperature);
        self
    }

    pub fn with_photo_lookup(mut self, photos: PhotoLookup) -> Self {
        self.photos = Some(photos);
        self
    }

    pub async fn get_recommendations(
        &self,
        destination: &str,
        current_places: &[String],
        past_places: &[String],
        mode: RecommendationMode,
    ) -> Result<Vec<PlaceRecommendation>> {
        self.recommender
            .get_recommendations(destination, current_places, past_places, mode)
            .await
    }

    pub async fn distribute(
        &self,
        places: &[Place],
        dates: &[DateKey],
        destination: &str,
        existing: &Itinerary,
    ) -> Result<Itinerary> {
        self.distributor
            .distribute(places, dates, destination, existing)
            .await
    }

    /// Distribute over every day of `trip`, seeding missing days as empty plans.
    pub async fn distribute_for_trip(
        &self,
        trip: &Trip,
        places: &[Place],
        existing: &Itinerary,
    ) -> Result<Itinerary> {
        let dates = trip.date_keys();
        let mut seeded = existing.clone();
        for date in &dates {
            seeded.day_mut_or_default(date.clone());
        }
        self.distribute(places, &dates, &trip.destination.name, &seeded)
            .await
    }

    /// `None` when no photo lookup is configured.
    pub async fn lookup_photo(&self, query: &str) -> Option<String> {
        match &self.photos {
            Some(photos) => photos.lookup_photo(query).await,
            None => None,
        }
    }

    pub async fn decorate_places(&self, places: Vec<Place>) -> Vec<Place> {
        match &self.photos {
            Some(photos) => photos.decorate_places(places).await,
            None => places,
        }
    }

    /// Fill the trip card image when a photo lookup is configured.
    pub async fn decorate_trip(&self, trip: Trip) -> Trip {
        match &self.photos {
            Some(photos) => photos.decorate_trip(trip).await,
            None => trip,
        }
    }
}
