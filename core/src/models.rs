use anyhow::{Result, bail};
use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ratio::calculate_ratio;

/// Key under which the whole entry list is stored.
pub const STORAGE_KEY: &str = "metabolic-tracker-data";

/// Ratios below this value are considered in the therapeutic zone.
pub const THERAPEUTIC_ZONE_LIMIT: f64 = 80.0;

pub const USERS: &[&str] = &["TC", "Theresa", "Guest"];

pub const DEFAULT_USER: &str = "TC";

/// One logged measurement.
///
/// Field names serialize in camelCase so the stored blob keeps the shape
/// `[{"id": .., "timestamp": .., "userId": .., ...}]`. Unknown fields are
/// rejected so a mismatched blob falls back to seed data instead of loading
/// half-populated entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Entry {
    pub id: String,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub is_fasted: bool,
    /// mg/dL
    pub glucose: f64,
    /// mmol/L
    pub ketones: f64,
    pub ratio: f64,
    /// lbs
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
}

impl Entry {
    /// Build a stored entry from user input: assigns a fresh id and derives the
    /// ratio once. The timestamp is truncated to milliseconds, the precision
    /// the store keeps.
    #[must_use]
    pub fn create(new: NewEntry) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: new.timestamp.trunc_subsecs(3),
            ratio: calculate_ratio(new.glucose, new.ketones),
            user_id: new.user_id,
            is_fasted: new.is_fasted,
            glucose: new.glucose,
            ketones: new.ketones,
            weight: new.weight,
            body_fat_percentage: new.body_fat_percentage,
            blood_pressure: new.blood_pressure,
        }
    }

    #[must_use]
    pub fn state_label(&self) -> &'static str {
        if self.is_fasted { "Fasted" } else { "Fed" }
    }
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub is_fasted: bool,
    pub glucose: f64,
    pub ketones: f64,
    pub weight: f64,
    pub body_fat_percentage: Option<f64>,
    pub blood_pressure: Option<String>,
}

/// Dashboard summary derived from a (user-filtered) entry list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub current_weight: f64,
    pub weight_change: f64,
    pub last_ratio: f64,
    pub avg_ratio: f64,
    pub entries_count: usize,
}

/// One point of the weight / metabolic trend, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub timestamp: DateTime<Utc>,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    pub glucose: f64,
    pub ketones: f64,
    pub ratio: f64,
}

/// The fixture used when nothing usable is stored.
#[must_use]
pub fn seed_entries() -> Vec<Entry> {
    vec![Entry {
        id: "seed-1".to_string(),
        timestamp: Utc
            .with_ymd_and_hms(2025, 12, 10, 8, 0, 0)
            .single()
            .unwrap_or_default(),
        user_id: "TC".to_string(),
        is_fasted: true,
        glucose: 93.0,
        ketones: 1.2,
        ratio: 77.5,
        weight: 197.0,
        body_fat_percentage: Some(15.6),
        blood_pressure: None,
    }]
}

/// Match a user against the roster, case-insensitively, returning its canonical spelling.
pub fn validate_user(user: &str) -> Result<String> {
    match USERS.iter().find(|u| u.eq_ignore_ascii_case(user.trim())) {
        Some(u) => Ok((*u).to_string()),
        None => bail!("Unknown user '{user}'. Must be one of: {}", USERS.join(", ")),
    }
}

/// Validate measurement input before an entry is created.
pub fn validate_new_entry(entry: &NewEntry) -> Result<()> {
    if entry.user_id.trim().is_empty() {
        bail!("User must not be empty");
    }
    if !entry.glucose.is_finite() || entry.glucose <= 0.0 {
        bail!("Glucose must be greater than 0");
    }
    if !entry.ketones.is_finite() || entry.ketones < 0.0 {
        bail!("Ketones must not be negative");
    }
    if !entry.weight.is_finite() || entry.weight <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    if entry
        .body_fat_percentage
        .is_some_and(|v| !v.is_finite() || !(0.0..=100.0).contains(&v))
    {
        bail!("Body fat percentage must be between 0 and 100");
    }
    Ok(())
}

/// Check a deserialized entry list before it is trusted: ids must be present
/// and unique and every number finite.
pub fn validate_stored_entries(entries: &[Entry]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for e in entries {
        if e.id.is_empty() {
            bail!("Stored entry has an empty id");
        }
        if !seen.insert(e.id.as_str()) {
            bail!("Duplicate entry id '{}'", e.id);
        }
        let numbers = [e.glucose, e.ketones, e.ratio, e.weight];
        if numbers.iter().any(|v| !v.is_finite())
            || e.body_fat_percentage.is_some_and(|v| !v.is_finite())
        {
            bail!("Entry '{}' has a non-finite measurement", e.id);
        }
    }
    Ok(())
}

/// ISO-8601 with millisecond precision and a `Z` suffix, e.g. `2025-12-10T08:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
