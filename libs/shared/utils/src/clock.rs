use std::sync::Arc;

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};

/// Source of the current instant. Injected so booking rules can be tested
/// against a frozen "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub type SharedClock = Arc<dyn Clock>;

/// The shop's wall-clock zone. Dates in requests and `HH:MM` slots are
/// always read in this zone, never in the caller's.
#[derive(Debug, Clone, Copy)]
pub struct BusinessTimezone {
    offset: FixedOffset,
}

impl BusinessTimezone {
    /// Out-of-range offsets collapse to UTC.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::from_offset_minutes(0)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self.offset.from_local_datetime(&local) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            // A fixed offset has no gaps.
            LocalResult::None => local.and_utc(),
        }
    }

    pub fn now_local(&self, clock: &dyn Clock) -> NaiveDateTime {
        self.to_local(clock.now())
    }

    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        self.now_local(clock).date()
    }

    /// UTC bounds `[midnight, next midnight)` of a local calendar date.
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.to_utc(date.and_time(chrono::NaiveTime::MIN));
        (start, start + Duration::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn converts_between_local_and_utc() {
        let tz = BusinessTimezone::from_offset_minutes(-180);
        let local = NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let utc = tz.to_utc(local);
        assert_eq!(utc.naive_utc().time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(tz.to_local(utc), local);
    }

    #[test]
    fn today_follows_business_zone() {
        let tz = BusinessTimezone::from_offset_minutes(-180);
        // 01:30 UTC on the 11th is still the 10th in the shop.
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 11, 1, 30, 0).unwrap());

        assert_eq!(tz.today(&clock), NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    }

    #[test]
    fn day_bounds_span_one_local_day() {
        let tz = BusinessTimezone::from_offset_minutes(120);
        let (start, end) = tz.day_bounds(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 5, 31, 22, 0, 0).unwrap());
        assert_eq!(end - start, Duration::days(1));
    }
}
