//! trip-planner-rs: typed building blocks for LLM-assisted trip planning
//!
//! Three independent, stateless components share one explicitly constructed
//! chat backend:
//!
//! - [`Recommender`] asks for place recommendations for a destination,
//! - [`Distributor`] asks the model to spread places over trip days and merges
//!   the answer into an existing [`Itinerary`] without losing planned places,
//! - [`PhotoLookup`] finds a representative photo, best effort.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trip_planner_rs::{RecommendationMode, TripPlanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let planner = TripPlanner::from_env()?;
//!
//!     let picks = planner
//!         .get_recommendations("Lisbon", &[], &[], RecommendationMode::New)
//!         .await?;
//!     for pick in picks {
//!         println!("{}: {}", pick.name, pick.description);
//!     }
//!     Ok(())
//! }
//! ```

extern crate self as trip_planner_rs;

pub mod config;
pub mod core;
pub mod error;
pub mod schemas;
pub mod services;
pub mod types;

pub use config::PlannerConfig;
pub use crate::core::{
    merge_distribution, Distributor, RecommendationMode, Recommender, TripPlanner,
};
pub use error::{PlannerError, Result};
pub use services::{ChatBackend, ChatCompletionRequest, OpenAIClient, PhotoLookup};
pub use schemas::ReplySchema;
pub use types::{
    Coordinates, DateKey, DayPlan, Distribution, Itinerary, Place, PlaceRecommendation, Trip,
};

#[cfg(feature = "cli")]
pub mod cli;
