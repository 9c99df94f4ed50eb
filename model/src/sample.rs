use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Field;

/// A sensor record exactly as it arrives on the wire.
///
/// Nothing is validated here; use [`Sample::try_from`] to get a record that is
/// safe to put into a [`crate::Window`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorRecord {
    #[serde(rename = "thingId", alias = "sourceId", default)]
    pub thing_id: String,

    #[serde(alias = "timestamp", default)]
    pub ts: Option<String>,

    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub humidity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
}

/// Why a [`SensorRecord`] could not be turned into a [`Sample`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("record has no timestamp")]
    MissingTimestamp,
    #[error("unparseable timestamp `{0}`")]
    InvalidTimestamp(String),
    #[error("record has an empty source id")]
    EmptySourceId,
}

/// One validated sensor observation.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub source_id: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub sent_at: Option<String>,
    pub received_at: Option<String>,
}

impl Sample {
    pub fn new(source_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            source_id: source_id.into(),
            timestamp,
            temperature: None,
            humidity: None,
            sent_at: None,
            received_at: None,
        }
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(celsius);
        self
    }

    pub fn with_humidity(mut self, percent: f64) -> Self {
        self.humidity = Some(percent);
        self
    }

    /// Milliseconds since the unix epoch, the unit the charts use on the x axis.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// The reading for `field`, if this sample carries one.
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Temperature => self.temperature,
            Field::Humidity => self.humidity,
        }
    }
}

impl TryFrom<SensorRecord> for Sample {
    type Error = SampleError;

    fn try_from(record: SensorRecord) -> Result<Self, Self::Error> {
        let ts = record.ts.as_deref().map(str::trim).unwrap_or_default();
        if ts.is_empty() {
            return Err(SampleError::MissingTimestamp);
        }
        let timestamp = parse_timestamp(ts)?;

        if record.thing_id.trim().is_empty() {
            return Err(SampleError::EmptySourceId);
        }

        Ok(Self {
            source_id: record.thing_id,
            timestamp,
            temperature: record.temperature,
            humidity: record.humidity,
            sent_at: record.sent_at,
            received_at: record.received_at,
        })
    }
}

impl From<&Sample> for SensorRecord {
    fn from(sample: &Sample) -> Self {
        Self {
            thing_id: sample.source_id.clone(),
            ts: Some(sample.timestamp.to_rfc3339()),
            temperature: sample.temperature,
            humidity: sample.humidity,
            sent_at: sample.sent_at.clone(),
            received_at: sample.received_at.clone(),
        }
    }
}

/// Parses an ISO-8601 timestamp into an absolute instant.
///
/// RFC 3339 strings (with offset or `Z`) are taken as-is. Date-times without
/// an offset are interpreted as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, SampleError> {
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    let input = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SampleError::InvalidTimestamp(input.to_string()))
}
