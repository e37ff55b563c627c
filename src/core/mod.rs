pub mod distribute;
pub mod planner;
pub mod recommend;

pub use distribute::{
    build_distribution_prompt, merge_distribution, parse_distribution, serialize_places,
    Distributor, PlaceLocation,
};
pub use planner::TripPlanner;
pub use recommend::{
    build_recommendation_prompt, parse_recommendations, RecommendationMode, Recommender,
};
