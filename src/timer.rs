use chrono::{DateTime, Datelike, Local, TimeDelta};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::duration;

/// Session-local identity handed out by the store. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Paused,
    Done,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Done => "done",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Active => "●",
            Self::Paused => "‖",
            Self::Done => "✓",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Timer {
    #[serde(skip)]
    pub id: TimerId,
    pub name: String,
    pub end: DateTime<Local>,
    pub paused: bool,
    #[serde(with = "nanos")]
    pub remaining: Duration,
    #[serde(with = "nanos")]
    pub duration: Duration,
}

impl Timer {
    pub fn status(&self, now: DateTime<Local>) -> Status {
        if self.paused {
            Status::Paused
        } else if now < self.end {
            Status::Active
        } else {
            Status::Done
        }
    }

    /// Time left on the clock: frozen while paused, zero once done.
    pub fn remaining_at(&self, now: DateTime<Local>) -> Duration {
        if self.paused {
            self.remaining
        } else {
            until(now, self.end)
        }
    }

    pub fn status_text(&self, now: DateTime<Local>) -> String {
        match self.status(now) {
            Status::Done => "Done".into(),
            _ => duration::format(self.remaining_at(now)),
        }
    }

    pub fn end_time_text(&self, now: DateTime<Local>) -> String {
        match self.status(now) {
            Status::Paused => "(paused)".into(),
            Status::Done => format!("+{}", duration::format(until(self.end, now))),
            Status::Active => format_end_time(self.end, now),
        }
    }
}

/// `now + span`, saturating at `now` for spans chrono cannot represent.
pub fn deadline(now: DateTime<Local>, span: Duration) -> DateTime<Local> {
    TimeDelta::from_std(span)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(now)
}

/// Non-negative distance from `from` to `to`.
pub fn until(from: DateTime<Local>, to: DateTime<Local>) -> Duration {
    (to - from).to_std().unwrap_or(Duration::ZERO)
}

pub fn format_end_time(end: DateTime<Local>, now: DateTime<Local>) -> String {
    let same_year = end.year() == now.year();
    let same_month = same_year && end.month() == now.month();
    let same_day = same_month && end.day() == now.day();

    let fmt = if same_day {
        "%H:%M:%S"
    } else if same_month {
        "%-d %H:%M"
    } else if same_year {
        "%-d/%m %H:%M"
    } else {
        "%-d/%m/%y %H:%M"
    };
    end.format(fmt).to_string()
}

// Durations are stored as signed nanoseconds; negatives read back as zero.
mod nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let n = i64::deserialize(d)?;
        Ok(Duration::from_nanos(u64::try_from(n).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, h, m, s).unwrap()
    }

    fn timer(end: DateTime<Local>, paused: bool, remaining: u64) -> Timer {
        Timer {
            id: TimerId::default(),
            name: "tea".into(),
            end,
            paused,
            remaining: Duration::from_secs(remaining),
            duration: Duration::from_secs(600),
        }
    }

    #[test]
    fn exactly_one_bucket_at_every_instant() {
        let now = at(12, 0, 0);
        let cases = [
            (timer(at(12, 5, 0), false, 0), Status::Active),
            (timer(at(12, 0, 0), false, 0), Status::Done),
            (timer(at(11, 0, 0), false, 0), Status::Done),
            (timer(at(11, 0, 0), true, 30), Status::Paused),
            (timer(at(13, 0, 0), true, 0), Status::Paused),
        ];
        for (t, expected) in cases {
            assert_eq!(t.status(now), expected);
        }
    }

    #[test]
    fn display_text_per_status() {
        let now = at(12, 0, 0);

        let active = timer(at(12, 30, 0), false, 0);
        assert_eq!(active.status_text(now), "30m");
        assert_eq!(active.end_time_text(now), "12:30:00");

        let paused = timer(at(9, 0, 0), true, 90);
        assert_eq!(paused.status_text(now), "1m 30s");
        assert_eq!(paused.end_time_text(now), "(paused)");

        let done = timer(at(11, 55, 0), false, 0);
        assert_eq!(done.status_text(now), "Done");
        assert_eq!(done.end_time_text(now), "+5m");
    }

    #[test]
    fn end_time_gets_coarser_with_distance() {
        let now = at(12, 0, 0);
        let next_day = Local.with_ymd_and_hms(2026, 3, 15, 8, 5, 0).unwrap();
        let next_month = Local.with_ymd_and_hms(2026, 4, 2, 8, 5, 0).unwrap();
        let next_year = Local.with_ymd_and_hms(2027, 1, 2, 8, 5, 0).unwrap();

        assert_eq!(format_end_time(next_day, now), "15 08:05");
        assert_eq!(format_end_time(next_month, now), "2/04 08:05");
        assert_eq!(format_end_time(next_year, now), "2/01/27 08:05");
    }

    #[test]
    fn persisted_shape() {
        let t = timer(at(12, 0, 0), true, 90);
        let json = serde_json::to_value(&t).unwrap();

        assert_eq!(json["name"], "tea");
        assert_eq!(json["paused"], true);
        assert_eq!(json["remaining"], 90_000_000_000i64);
        assert_eq!(json["duration"], 600_000_000_000i64);
        assert!(json.get("id").is_none());

        let back: Timer = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn negative_stored_durations_read_as_zero() {
        let json = r#"{"name":"x","end":"2026-03-14T12:00:00Z","paused":false,"remaining":-5,"duration":60000000000}"#;
        let t: Timer = serde_json::from_str(json).unwrap();
        assert_eq!(t.remaining, Duration::ZERO);
        assert_eq!(t.duration, Duration::from_secs(60));
    }
}
