pub mod openai_client;
pub mod photo_lookup;

pub use openai_client::{ChatBackend, ChatCompletionRequest, OpenAIClient};
pub use photo_lookup::PhotoLookup;
