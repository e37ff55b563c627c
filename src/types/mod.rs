pub mod itinerary;
pub mod place;
pub mod response;
pub mod trip;

pub use itinerary::{DateKey, DayPlan, Itinerary};
pub use place::{Coordinates, Place, PlaceRecommendation};
pub use response::{decode_reply, DayAssignment, Distribution, RecommendationReply};
pub use trip::{date_range, Destination, Trip};
