//! Date and timestamp generators.

use crate::error::BoxError;
use crate::generator::Generator;
use crate::random::Random;
use chrono::{DateTime, Days, NaiveDate, Utc};
use fixture_core::{Settings, SettingsError, Value};

/// Generate a random timestamp in the given range.
///
/// The start and end are RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
pub fn generate_timestamp_range(
    random: &mut Random,
    start: &str,
    end: &str,
) -> Result<Value, BoxError> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    Ok(Value::DateTime(timestamp_between(random, start, end)))
}

/// Generate a random date in the given range.
pub fn generate_date_range(random: &mut Random, start: &str, end: &str) -> Result<Value, BoxError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    Ok(Value::Date(date_between(random, start, end)))
}

fn timestamp_between(random: &mut Random, start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
    let (start_ts, end_ts) = (start.timestamp(), end.timestamp());
    if start_ts >= end_ts {
        return start;
    }
    let ts = random.int_range(start_ts, end_ts);
    DateTime::from_timestamp(ts, 0).unwrap_or(start)
}

fn date_between(random: &mut Random, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days();
    if span <= 0 {
        return start;
    }
    let offset = random.int_range(0, span) as u64;
    start.checked_add_days(Days::new(offset)).unwrap_or(start)
}

/// Parse a timestamp string in RFC 3339 or date-only form.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, BoxError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = parse_date(s)?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

fn parse_date(s: &str) -> Result<NaiveDate, BoxError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date or timestamp '{s}': {e}").into())
}

/// Default `Date` generator over the settings' temporal range.
#[derive(Debug, Clone)]
pub struct DateGenerator {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateGenerator {
    pub fn new(settings: &Settings) -> Result<Self, SettingsError> {
        let (start, end) = settings.temporal_range()?;
        Ok(Self { start, end })
    }
}

impl Generator for DateGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        Ok(Value::Date(date_between(random, self.start, self.end)))
    }
}

/// Default `DateTime` generator over the settings' temporal range.
#[derive(Debug, Clone)]
pub struct DateTimeGenerator {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateTimeGenerator {
    pub fn new(settings: &Settings) -> Result<Self, SettingsError> {
        let (start, end) = settings.temporal_range()?;
        Ok(Self {
            start: start.and_time(chrono::NaiveTime::MIN).and_utc(),
            end: end.and_time(chrono::NaiveTime::MIN).and_utc(),
        })
    }
}

impl Generator for DateTimeGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        Ok(Value::DateTime(timestamp_between(random, self.start, self.end)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_generate_timestamp_range() {
        let mut random = Random::new(42);

        let value =
            generate_timestamp_range(&mut random, "2020-01-01T00:00:00Z", "2024-12-31T23:59:59Z")
                .unwrap();

        if let Value::DateTime(dt) = value {
            assert!(dt.year() >= 2020 && dt.year() <= 2024);
        } else {
            panic!("Expected DateTime value");
        }
    }

    #[test]
    fn test_generate_timestamp_with_dates_only() {
        let mut random = Random::new(42);
        let value = generate_timestamp_range(&mut random, "2020-01-01", "2024-12-31").unwrap();
        assert!(matches!(value, Value::DateTime(dt) if (2020..=2024).contains(&dt.year())));
    }

    #[test]
    fn test_generate_date_range() {
        let mut random = Random::new(11);
        for _ in 0..50 {
            let value = generate_date_range(&mut random, "2021-03-01", "2021-03-31").unwrap();
            match value {
                Value::Date(d) => {
                    assert_eq!(d.year(), 2021);
                    assert_eq!(d.month(), 3);
                }
                other => panic!("Expected Date, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_range_is_an_error() {
        let mut random = Random::new(1);
        assert!(generate_date_range(&mut random, "yesterday", "2021-01-01").is_err());
    }

    #[test]
    fn test_deterministic_generation() {
        let generator = DateTimeGenerator::new(&Settings::default()).unwrap();
        let a = generator.generate(&mut Random::new(42)).unwrap();
        let b = generator.generate(&mut Random::new(42)).unwrap();
        assert_eq!(a, b);
    }
}
