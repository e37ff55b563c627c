use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{PlannerError, Result},
    services::openai_client::{
        ChatBackend, ChatCompletionRequest, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    },
    types::{decode_reply, PlaceRecommendation, RecommendationReply},
};

const RECOMMENDATION_SYSTEM_PROMPT: &str =
    "You are a knowledgeable travel expert providing place recommendations in JSON format.";

const REPLY_FORMAT_INSTRUCTIONS: &str = r#"

Please return your answer as a JSON object with a key "recommendations", containing an array of 5 objects. Each object should have two keys: "name" and "desc".

Example format:
{
  "recommendations": [
    {
      "name": "Place Name 1",
      "desc": "Brief description of why to visit Place Name 1"
    },
    {
      "name": "Place Name 2",
      "desc": "Brief description of why to visit Place Name 2"
    }
  ]
}
"#;

/// Which pool of places a recommendation should favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationMode {
    /// Places not visited on a previous trip
    #[default]
    New,
    /// Places worth revisiting from a previous trip
    Old,
    /// A blend of both
    Mix,
}

impl RecommendationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationMode::New => "new",
            RecommendationMode::Old => "old",
            RecommendationMode::Mix => "mix",
        }
    }

    fn guidance(&self) -> &'static str {
        match self {
            RecommendationMode::New => "Please recommend 5 new places I haven't visited before.",
            RecommendationMode::Old => "Please recommend 5 places from my previous visits that are worth revisiting. If there are less than 5 places, recommend all of them.",
            RecommendationMode::Mix => "Please recommend a mix of 5 places, including both new locations and some worth revisiting from my previous trip.",
        }
    }
}

impl fmt::Display for RecommendationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationMode {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(RecommendationMode::New),
            "old" => Ok(RecommendationMode::Old),
            "mix" => Ok(RecommendationMode::Mix),
            other => Err(PlannerError::Config(format!(
                "unknown recommendation mode `{other}` (expected new, old or mix)"
            ))),
        }
    }
}

/// Build the user prompt for a recommendation request.
pub fn build_recommendation_prompt(
    destination: &str,
    current_places: &[String],
    past_places: &[String],
    mode: RecommendationMode,
) -> String {
    let mut prompt = format!(
        "You are a travel planner expert. I need recommendations for places to visit in {}.\n\nCurrent itinerary includes: {}\n",
        destination,
        current_places.join(", ")
    );

    if past_places.is_empty() {
        prompt.push_str(&format!(
            "This is my first time going to {}. Please recommend 5 places I should visit.",
            destination
        ));
    } else {
        prompt.push_str(&format!(
            "From my previous trip, I visited: {}\n",
            past_places.join(", ")
        ));
        prompt.push_str(mode.guidance());
    }

    prompt.push_str(REPLY_FORMAT_INSTRUCTIONS);
    prompt
}

/// Decode the model's recommendation reply.
pub fn parse_recommendations(text: &str) -> Result<Vec<PlaceRecommendation>> {
    decode_reply::<RecommendationReply>(text).map(|reply| reply.recommendations)
}

/// Requests place recommendations from a chat backend.
#[derive(Debug, Clone)]
pub struct Recommender {
    backend: Arc<dyn ChatBackend>,
    model: String,
    temperature: f64,
}

impl Recommender {
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

    /// Request up to five recommendations for `destination`.
    ///
    /// A reply without text, or text that is not the expected JSON shape,
    /// fails with `MalformedResponse`.
    pub async fn get_recommendations(
        &self,
        destination: &str,
        current_places: &[String],
        past_places: &[String],
        mode: RecommendationMode,
    ) -> Result<Vec<PlaceRecommendation>> {
        let prompt = build_recommendation_prompt(destination, current_places, past_places, mode);
        debug!(target: "trip_planner::recommend", destination, %mode, %prompt);

        let request = ChatCompletionRequest::new(self.model.as_str())
            .with_system(RECOMMENDATION_SYSTEM_PROMPT)
            .with_user(prompt)
            .with_temperature(self.temperature)
            .json_object();

        let content = self.backend.complete(request).await?.ok_or_else(|| {
            PlannerError::MalformedResponse("no recommendations received".to_string())
        })?;

        let recommendations = parse_recommendations(&content)?;
        debug!(
            target: "trip_planner::recommend",
            count = recommendations.len(),
            "received recommendations"
        );
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_visit_prompt() {
        let prompt = build_recommendation_prompt(
            "Lisbon",
            &names(&["Alfama", "Belem Tower"]),
            &[],
            RecommendationMode::Mix,
        );

        assert!(prompt.contains("places to visit in Lisbon."));
        assert!(prompt.contains("Current itinerary includes: Alfama, Belem Tower"));
        assert!(prompt.contains("This is my first time going to Lisbon."));
        assert!(!prompt.contains("From my previous trip"));
        assert!(prompt.contains(r#""recommendations""#));
        assert!(prompt.contains("Example format:"));
    }

    #[test]
    fn test_old_mode_requests_all_of_them() {
        let prompt = build_recommendation_prompt(
            "Kyoto",
            &[],
            &names(&["Fushimi Inari", "Kinkaku-ji", "Gion"]),
            RecommendationMode::Old,
        );

        assert!(prompt.contains("From my previous trip, I visited: Fushimi Inari, Kinkaku-ji, Gion"));
        assert!(prompt.contains("recommend all of them"));
        assert!(!prompt.contains("first time"));
    }

    #[test]
    fn test_new_and_mix_guidance() {
        let past = names(&["Louvre"]);
        let new_prompt = build_recommendation_prompt("Paris", &[], &past, RecommendationMode::New);
        assert!(new_prompt.contains("5 new places I haven't visited before"));

        let mix_prompt = build_recommendation_prompt("Paris", &[], &past, RecommendationMode::Mix);
        assert!(mix_prompt.contains("a mix of 5 places"));
        assert!(!mix_prompt.contains("all of them"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let current = names(&["A"]);
        let past = names(&["B", "C"]);
        assert_eq!(
            build_recommendation_prompt("Rome", &current, &past, RecommendationMode::New),
            build_recommendation_prompt("Rome", &current, &past, RecommendationMode::New)
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("old".parse::<RecommendationMode>().unwrap(), RecommendationMode::Old);
        assert_eq!(" MIX ".parse::<RecommendationMode>().unwrap(), RecommendationMode::Mix);
        assert!("newest".parse::<RecommendationMode>().is_err());
        assert_eq!(RecommendationMode::New.to_string(), "new");
    }

    #[test]
    fn test_parse_recommendations_rejects_prose() {
        let err = parse_recommendations("Sure! Here are five places...").unwrap_err();
        assert!(matches!(err, PlannerError::MalformedResponse(_)));
    }
}
