use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;

use super::{
    itinerary::DateKey,
    place::{Place, PlaceRecommendation},
};
use crate::{
    error::{PlannerError, Result},
    schemas::ReplySchema,
};

/// Reply expected from the recommendation prompt.
#[derive(Debug, Clone, Deserialize, JsonSchema, ReplySchema)]
pub struct RecommendationReply {
    /// Absent or `null` both mean no recommendations.
    #[serde(default, deserialize_with = "null_as_empty")]
    #[schemars(with = "Option<Vec<PlaceRecommendation>>")]
    pub recommendations: Vec<PlaceRecommendation>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Names the model assigned to one day.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct DayAssignment {
    #[serde(rename = "placesPlanned")]
    pub places_planned: Vec<String>,
}

/// Model-proposed grouping of place names by date, in the order the model listed the dates.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema, ReplySchema)]
pub struct Distribution(IndexMap<String, DayAssignment>);

impl Distribution {
    pub fn iter(&self) -> impl Iterator<Item = (DateKey, &[String])> {
        self.0
            .iter()
            .map(|(date, day)| (DateKey::new(date.as_str()), day.places_planned.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Requested place names the model put on no day.
    pub fn unassigned<'a>(&self, places: &'a [Place]) -> Vec<&'a str> {
        places
            .iter()
            .map(|place| place.name.as_str())
            .filter(|name| !self.assigns(name))
            .collect()
    }

    /// Assigned names that match none of the requested places.
    pub fn unknown_names(&self, places: &[Place]) -> Vec<&str> {
        self.assigned_names()
            .filter(|name| !places.iter().any(|place| place.name == *name))
            .collect()
    }

    /// Names the model put on more than one day, or twice on one day.
    pub fn duplicated_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicated = Vec::new();
        for name in self.assigned_names() {
            if !seen.insert(name) && !duplicated.contains(&name) {
                duplicated.push(name);
            }
        }
        duplicated
    }

    fn assigned_names(&self) -> impl Iterator<Item = &str> {
        self.0
            .values()
            .flat_map(|day| day.places_planned.iter())
            .map(String::as_str)
    }

    fn assigns(&self, name: &str) -> bool {
        self.assigned_names().any(|planned| planned == name)
    }
}

impl FromIterator<(String, Vec<String>)> for Distribution {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(date, places_planned)| (date, DayAssignment { places_planned }))
                .collect(),
        )
    }
}

/// Decode raw model text into a typed reply.
///
/// The text must be JSON, must satisfy the reply schema, and must then
/// deserialize into `T`; any failure is a `MalformedResponse`.
pub fn decode_reply<T: ReplySchema>(text: &str) -> Result<T> {
    let schema = T::schema();

    let value: Value = serde_json::from_str(text).map_err(|err| {
        PlannerError::MalformedResponse(format!(
            "`{}` reply is not valid JSON: {}",
            schema.name(),
            err
        ))
    })?;

    schema.validate(&value)?;

    // Decode from the text itself so object key order survives.
    let mut deserializer = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        PlannerError::MalformedResponse(format!(
            "failed to decode `{}` at {}: {}",
            schema.name(),
            location,
            err.inner()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_recommendations() {
        let reply: RecommendationReply = decode_reply(
            r#"{"recommendations":[{"name":"Alfama","desc":"Old quarter"},{"name":"Belem","desc":"Tower"}]}"#,
        )
        .unwrap();

        assert_eq!(reply.recommendations.len(), 2);
        assert_eq!(reply.recommendations[0].name, "Alfama");
        assert_eq!(reply.recommendations[1].description, "Tower");
    }

    #[test]
    fn test_missing_recommendations_defaults_to_empty() {
        let reply: RecommendationReply = decode_reply(r#"{"places": []}"#).unwrap();
        assert!(reply.recommendations.is_empty());
    }

    #[test]
    fn test_null_recommendations_is_empty() {
        let reply: RecommendationReply = decode_reply(r#"{"recommendations": null}"#).unwrap();
        assert!(reply.recommendations.is_empty());

        let err = decode_reply::<RecommendationReply>(r#"{"recommendations": "Alfama"}"#)
            .unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_RESPONSE");
    }

    #[test]
    fn test_recommendation_without_name_is_rejected() {
        let err = decode_reply::<RecommendationReply>(r#"{"recommendations":[{"desc":"x"}]}"#)
            .unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_RESPONSE");
    }

    #[test]
    fn test_distribution_keeps_model_date_order() {
        let distribution: Distribution = decode_reply(
            r#"{"03-06-2024":{"placesPlanned":["C"]},"01-06-2024":{"placesPlanned":["A","B"]}}"#,
        )
        .unwrap();

        let days: Vec<(String, Vec<String>)> = distribution
            .iter()
            .map(|(date, names)| (date.to_string(), names.to_vec()))
            .collect();
        assert_eq!(
            days,
            vec![
                ("03-06-2024".to_string(), vec!["C".to_string()]),
                (
                    "01-06-2024".to_string(),
                    vec!["A".to_string(), "B".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_distribution_shape_mismatch() {
        for text in [
            r#"{"01-06-2024":{"placesPlanned":"Museum"}}"#,
            r#"{"01-06-2024":{"places":["Museum"]}}"#,
            r#"{"01-06-2024":["Museum"]}"#,
            r#"["Museum"]"#,
            r#"{"01-06-2024":{"placesPlanned":[1, 2]}}"#,
        ] {
            let err = decode_reply::<Distribution>(text).unwrap_err();
            assert!(
                matches!(err, PlannerError::MalformedResponse(_)),
                "expected malformed response for {text}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_non_json_text() {
        let err = decode_reply::<Distribution>("Here is your itinerary!").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_unassigned_and_unknown_names() {
        let places = vec![Place::named("A"), Place::named("B"), Place::named("C")];
        let distribution: Distribution = [
            ("01-06-2024".to_string(), vec!["A".to_string()]),
            ("02-06-2024".to_string(), vec!["Z".to_string(), "C".to_string()]),
        ]
        .into_iter()
        .collect();

        assert_eq!(distribution.unassigned(&places), vec!["B"]);
        assert_eq!(distribution.unknown_names(&places), vec!["Z"]);
    }

    #[test]
    fn test_duplicated_names() {
        let distribution: Distribution = [
            ("01-06-2024".to_string(), vec!["A".to_string(), "B".to_string()]),
            ("02-06-2024".to_string(), vec!["B".to_string(), "C".to_string(), "C".to_string()]),
            ("03-06-2024".to_string(), vec!["B".to_string()]),
        ]
        .into_iter()
        .collect();

        assert_eq!(distribution.duplicated_names(), vec!["B", "C"]);

        let clean: Distribution = [("01-06-2024".to_string(), vec!["A".to_string()])]
            .into_iter()
            .collect();
        assert!(clean.duplicated_names().is_empty());
    }
}
