use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Units & Constants
// ============================================================================

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const MONTH_DAYS: u64 = 30;
const YEAR_DAYS: u64 = 365;

/// Largest span the persisted nanosecond format can hold.
pub const MAX_SECONDS: u64 = i64::MAX as u64 / 1_000_000_000;

/// Spans shown in coarse (two unit) form once they exceed this many days.
const COARSE_AFTER_DAYS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl Unit {
    pub fn seconds(self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => MINUTE,
            Self::Hour => HOUR,
            Self::Day => DAY,
            Self::Month => MONTH_DAYS * DAY,
            Self::Year => YEAR_DAYS * DAY,
        }
    }

    pub fn span(self) -> Duration {
        Duration::from_secs(self.seconds())
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Second => "s",
            Self::Minute => "m",
            Self::Hour => "h",
            Self::Day => "d",
            Self::Month => "mo",
            Self::Year => "y",
        }
    }

    /// Reads the unit at the head of `rest`, returning it with the number of
    /// characters it occupies.
    fn read(rest: &[char]) -> Result<(Self, usize), ParseError> {
        match rest {
            ['m', 'o', ..] => Ok((Self::Month, 2)),
            ['s', ..] => Ok((Self::Second, 1)),
            ['m', ..] => Ok((Self::Minute, 1)),
            ['h', ..] => Ok((Self::Hour, 1)),
            ['d', ..] => Ok((Self::Day, 1)),
            ['y', ..] => Ok((Self::Year, 1)),
            [other, ..] => Err(ParseError::InvalidUnit(*other)),
            [] => Ok((Self::Second, 0)),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty duration")]
    Empty,
    #[error("expected number at position {position}")]
    ExpectedNumber { position: usize },
    #[error("invalid unit '{0}' (use s, m, h, d, y)")]
    InvalidUnit(char),
    #[error("duration must be positive")]
    NonPositive,
    #[error("duration too large")]
    TooLarge,
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses the compound duration language: `30s`, `5m`, `1h30m`, `2d 4h`, `1y`.
/// A trailing bare number counts as seconds.
pub fn parse(input: &str) -> Result<Duration, ParseError> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    let chars: Vec<char> = input.chars().collect();
    let mut total: u64 = 0;
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == ' ' {
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return Err(ParseError::ExpectedNumber { position: start });
        }

        let digits: String = chars[start..i].iter().collect();
        let value: u64 = digits.parse().map_err(|_| ParseError::TooLarge)?;
        if value == 0 {
            return Err(ParseError::NonPositive);
        }

        let (unit, width) = Unit::read(&chars[i..])?;
        i += width;

        total = value
            .checked_mul(unit.seconds())
            .and_then(|secs| total.checked_add(secs))
            .filter(|secs| *secs <= MAX_SECONDS)
            .ok_or(ParseError::TooLarge)?;
    }

    if total == 0 {
        return Err(ParseError::NonPositive);
    }
    Ok(Duration::from_secs(total))
}

// ============================================================================
// Formatting
// ============================================================================

pub(crate) fn round_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() >= 500_000_000)
}

/// Calendar-ish breakdown used by both the display and the input formatters.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Parts {
    pub days: u64,
    pub years: u64,
    pub months: u64,
    pub rem_days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Parts {
    pub fn of(d: Duration) -> Self {
        let total = round_secs(d);
        let days = total / DAY;
        let after_years = days % YEAR_DAYS;
        Self {
            days,
            years: days / YEAR_DAYS,
            months: after_years / MONTH_DAYS,
            rem_days: after_years % MONTH_DAYS,
            hours: total % DAY / HOUR,
            minutes: total % HOUR / MINUTE,
            seconds: total % MINUTE,
        }
    }
}

fn push(parts: &mut Vec<String>, value: u64, unit: Unit) {
    if value > 0 {
        parts.push(format!("{}{}", value, unit.suffix()));
    }
}

/// Formats a span for display, e.g. `1h 30m`. Spans longer than sixty days
/// show only their two leading calendar units.
pub fn format(d: Duration) -> String {
    let p = Parts::of(d);
    let mut parts = Vec::new();

    push(&mut parts, p.years, Unit::Year);
    push(&mut parts, p.months, Unit::Month);
    push(&mut parts, p.rem_days, Unit::Day);

    if p.days > COARSE_AFTER_DAYS {
        parts.truncate(2);
        return parts.join(" ");
    }

    push(&mut parts, p.hours, Unit::Hour);
    push(&mut parts, p.minutes, Unit::Minute);
    if p.seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", p.seconds));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn parses_single_components() {
        assert_eq!(parse("30s"), Ok(secs(30)));
        assert_eq!(parse("5m"), Ok(secs(300)));
        assert_eq!(parse("1h"), Ok(secs(3600)));
        assert_eq!(parse("2d"), Ok(secs(2 * DAY)));
        assert_eq!(parse("1y"), Ok(secs(365 * DAY)));
        assert_eq!(parse("1mo"), Ok(secs(30 * DAY)));
    }

    #[test]
    fn parses_compound_and_bare_seconds() {
        assert_eq!(parse("1h30m"), Ok(secs(5400)));
        assert_eq!(parse("30d30m"), Ok(secs(30 * DAY + 1800)));
        assert_eq!(parse(" 1h 30m "), Ok(secs(5400)));
        assert_eq!(parse("45"), Ok(secs(45)));
        assert_eq!(parse("1m30"), Ok(secs(90)));
        assert_eq!(parse("2H"), Ok(secs(7200)));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("h"), Err(ParseError::ExpectedNumber { position: 0 }));
        assert_eq!(parse("5x"), Err(ParseError::InvalidUnit('x')));
        assert_eq!(parse("30 m"), Err(ParseError::InvalidUnit(' ')));
        assert_eq!(parse("0m"), Err(ParseError::NonPositive));
        assert_eq!(parse("1h0m"), Err(ParseError::NonPositive));
        assert_eq!(parse("99999999999999999999s"), Err(ParseError::TooLarge));
        assert_eq!(parse("400y"), Err(ParseError::TooLarge));
    }

    #[test]
    fn formats_short_spans_in_full() {
        assert_eq!(format(secs(5400)), "1h 30m");
        assert_eq!(format(secs(0)), "0s");
        assert_eq!(format(secs(59)), "59s");
        assert_eq!(format(secs(DAY + HOUR + 61)), "1d 1h 1m 1s");
        assert_eq!(format(secs(45 * DAY + 5)), "1mo 15d 5s");
        assert_eq!(format(Duration::from_millis(1500)), "2s");
        assert_eq!(format(Duration::from_millis(400)), "0s");
    }

    #[test]
    fn formats_long_spans_coarsely() {
        assert_eq!(format(secs(61 * DAY + HOUR)), "2mo 1d");
        assert_eq!(format(secs(400 * DAY + 7 * HOUR)), "1y 1mo");
        assert_eq!(format(secs(365 * DAY + 5 * DAY)), "1y 5d");
        assert_eq!(format(secs(2 * 365 * DAY)), "2y");
    }

    #[test]
    fn long_format_has_no_extra_separators() {
        let text = format(secs(DAY + 2 * HOUR + 3 * MINUTE + 4));
        assert_eq!(text, "1d 2h 3m 4s");
        assert!(!text.contains("  "));
    }

    proptest! {
        #[test]
        fn format_then_parse_round_trips(n in 1u64..=COARSE_AFTER_DAYS * DAY + DAY - 1) {
            let parsed = parse(&format(secs(n))).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(parsed, secs(n));
        }
    }
}
