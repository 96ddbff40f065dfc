// Transfer schedules: CRON-like field sets and expiration dates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// Fields left unset match every value. Only the set ones are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dow: Option<u8>,
}

const FIELDS: [(&str, u8, u8); 5] = [
    ("minute", 0, 59),
    ("hour", 0, 23),
    ("dom", 1, 31),
    ("month", 1, 12),
    ("dow", 0, 6),
];

impl Schedule {
    fn values(&self) -> [Option<u8>; 5] {
        [self.minute, self.hour, self.dom, self.month, self.dow]
    }

    pub fn validate(&self) -> Result<()> {
        for ((name, min, max), value) in FIELDS.iter().zip(self.values()) {
            if let Some(v) = value {
                if v < *min || v > *max {
                    return Err(Error::InvalidArgument(format!(
                        "schedule {name} must be between {min} and {max}, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(Option::is_none)
    }
}

/// Parses `"minute hour dom month dow"`, `*` marking an unset field.
impl FromStr for Schedule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != FIELDS.len() {
            return Err(Error::InvalidArgument(format!(
                "schedule needs 5 fields (minute hour dom month dow), got {s:?}"
            )));
        }
        let mut values = [None; 5];
        for (i, part) in parts.iter().enumerate() {
            if *part == "*" {
                continue;
            }
            values[i] = Some(part.parse::<u8>().map_err(|_| {
                Error::InvalidArgument(format!("invalid schedule {}: {part:?}", FIELDS[i].0))
            })?);
        }
        let schedule = Schedule {
            minute: values[0],
            hour: values[1],
            dom: values[2],
            month: values[3],
            dow: values[4],
        };
        schedule.validate()?;
        Ok(schedule)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields: Vec<String> = self
            .values()
            .iter()
            .map(|v| v.map_or_else(|| "*".to_owned(), |v| v.to_string()))
            .collect();
        f.write_str(&fields.join(" "))
    }
}

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 expiration date. Inputs without an offset are taken
/// as UTC.
pub fn parse_expiration_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(Error::InvalidArgument(format!(
        "invalid expiration date {s:?}, expected ISO-8601"
    )))
}

/// ISO-8601 with a literal `Z` suffix, as the API requires strict RFC-3339.
pub fn format_expiration_date(dt: &DateTime<Utc>) -> String {
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = dt.nanosecond() / 1_000;
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out.push('Z');
    out
}

pub fn ensure_in_future(dt: &DateTime<Utc>, now: &DateTime<Utc>) -> Result<()> {
    if dt <= now {
        return Err(Error::InvalidArgument(format!(
            "expiration date {} is in the past",
            format_expiration_date(dt)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_validate_ranges() {
        let good = Schedule {
            minute: Some(59),
            hour: Some(0),
            dom: Some(31),
            month: Some(1),
            dow: Some(6),
        };
        good.validate().unwrap();

        for bad in [
            Schedule { minute: Some(60), ..Default::default() },
            Schedule { hour: Some(24), ..Default::default() },
            Schedule { dom: Some(0), ..Default::default() },
            Schedule { month: Some(13), ..Default::default() },
            Schedule { dow: Some(7), ..Default::default() },
        ] {
            assert!(matches!(bad.validate(), Err(Error::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_only_set_fields_serialized() {
        let schedule = Schedule {
            minute: Some(0),
            hour: Some(5),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(schedule).unwrap(),
            json!({"minute": 0, "hour": 5})
        );
        assert_eq!(serde_json::to_value(Schedule::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_from_str() {
        let schedule: Schedule = "30 2 * * 0".parse().unwrap();
        assert_eq!(schedule.minute, Some(30));
        assert_eq!(schedule.hour, Some(2));
        assert_eq!(schedule.dom, None);
        assert_eq!(schedule.dow, Some(0));
        assert_eq!(schedule.to_string(), "30 2 * * 0");

        "* * *".parse::<Schedule>().unwrap_err();
        "x * * * *".parse::<Schedule>().unwrap_err();
        "* * 32 * *".parse::<Schedule>().unwrap_err();
        assert!("* * * * *".parse::<Schedule>().unwrap().is_empty());
    }

    #[test]
    fn test_parse_expiration_date() {
        let expected = Utc.with_ymd_and_hms(2026, 12, 31, 10, 30, 0).unwrap();
        for input in [
            "2026-12-31T10:30:00",
            "2026-12-31T10:30",
            "2026-12-31 10:30:00",
            "2026-12-31T10:30:00Z",
            "2026-12-31T12:30:00+02:00",
        ] {
            assert_eq!(parse_expiration_date(input).unwrap(), expected, "{input}");
        }
        assert_eq!(
            parse_expiration_date("2026-12-31").unwrap(),
            Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap()
        );
        parse_expiration_date("next tuesday").unwrap_err();
    }

    #[test]
    fn test_format_expiration_date() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_expiration_date(&dt), "2026-01-02T03:04:05Z");

        let frac = parse_expiration_date("2026-01-02T03:04:05.250").unwrap();
        assert_eq!(format_expiration_date(&frac), "2026-01-02T03:04:05.250000Z");
    }

    #[test]
    fn test_ensure_in_future() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 6, 2, 0, 0, 0).unwrap();
        ensure_in_future(&later, &now).unwrap();
        ensure_in_future(&now, &now).unwrap_err();
        ensure_in_future(&now, &later).unwrap_err();
    }
}
