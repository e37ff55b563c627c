pub mod schema;
pub mod validation;

pub use schema::{ReplySchema, SchemaHandle};
pub use trip_planner_macros::ReplySchema;
