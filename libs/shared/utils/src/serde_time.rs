//! `HH:MM` wire format for times of day. Postgres `time` columns come back
//! as `HH:MM:SS`, so both shapes are accepted on input.

use chrono::NaiveTime;
use serde::{de, Deserialize, Deserializer, Serializer};

pub const HHMM: &str = "%H:%M";

pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, HHMM)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

pub fn format_hhmm(time: &NaiveTime) -> String {
    time.format(HHMM).to_string()
}

pub mod hhmm {
    use super::*;

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_hhmm(time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_hhmm(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct Window {
        #[serde(with = "hhmm")]
        opens: NaiveTime,
    }

    #[test]
    fn accepts_both_shapes() {
        assert_eq!(parse_hhmm("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_hhmm("18:00:00"), NaiveTime::from_hms_opt(18, 0, 0));
        assert_eq!(parse_hhmm("25:00"), None);
    }

    #[test]
    fn serializes_without_seconds() {
        let window: Window = serde_json::from_str(r#"{"opens":"08:15:00"}"#).unwrap();
        assert_eq!(serde_json::to_string(&window).unwrap(), r#"{"opens":"08:15"}"#);
    }
}
