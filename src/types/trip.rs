use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{itinerary::DateKey, place::Coordinates};

/// Destination of a trip as persisted alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub photo: String,
    pub formatted_address: String,
    pub location: Coordinates,
}

/// Persisted trip record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub tid: String,
    pub destination: Destination,
    #[serde(
        rename = "_cardImage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub card_image: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub tripmates: Vec<String>,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Every day of the trip, start and end inclusive.
    pub fn date_keys(&self) -> Vec<DateKey> {
        date_range(self.start_date, self.end_date)
    }

    pub fn day_count(&self) -> usize {
        self.date_keys().len()
    }
}

/// Day keys from `start` to `end` inclusive; empty when `end` precedes `start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<DateKey> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(DateKey::from_date)
        .collect()
}
