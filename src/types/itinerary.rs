use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::place::Place;

const DATE_KEY_FORMAT: &str = "%d-%m-%Y";

/// Calendar day key in `DD-MM-YYYY` form.
///
/// Keys produced by the model are kept verbatim even when they do not parse as
/// a date, so construction from a string never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DATE_KEY_FORMAT).to_string())
    }

    /// Parse back into a date; `None` for keys not in `DD-MM-YYYY` form.
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, DATE_KEY_FORMAT).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DateKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DateKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(value: NaiveDate) -> Self {
        Self::from_date(value)
    }
}

/// Places planned for a single day, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(rename = "placesPlanned", default)]
    pub places_planned: Vec<Place>,
}

impl DayPlan {
    pub fn new(places_planned: Vec<Place>) -> Self {
        Self { places_planned }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.places_planned.iter().any(|place| place.name == name)
    }
}

/// Day-keyed trip itinerary that iterates in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Itinerary {
    days: IndexMap<DateKey, DayPlan>,
}

impl Itinerary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Itinerary with an empty day plan for each date, in the given order.
    pub fn with_dates<I, K>(dates: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<DateKey>,
    {
        let mut itinerary = Self::new();
        for date in dates {
            itinerary.day_mut_or_default(date.into());
        }
        itinerary
    }

    pub fn day(&self, key: &DateKey) -> Option<&DayPlan> {
        self.days.get(key)
    }

    /// Day plan for `key`, appended as an empty plan if it was missing.
    pub fn day_mut_or_default(&mut self, key: DateKey) -> &mut DayPlan {
        self.days.entry(key).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &DayPlan)> {
        self.days.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = &DateKey> {
        self.days.keys()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of planned places across every day.
    pub fn place_count(&self) -> usize {
        self.days
            .values()
            .map(|plan| plan.places_planned.len())
            .sum()
    }
}

impl FromIterator<(DateKey, DayPlan)> for Itinerary {
    fn from_iter<T: IntoIterator<Item = (DateKey, DayPlan)>>(iter: T) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}
