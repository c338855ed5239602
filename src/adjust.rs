use std::time::Duration;

use crate::config::{AdjustConfig, AdjustUnit};
use crate::duration::{self, Parts, Unit, MAX_SECONDS};

/// Returns `current` moved by `steps` units, formatted for the input field.
/// Unparseable input counts as zero; the result never drops below one second.
pub fn adjust(current: &str, steps: i64, config: &AdjustConfig) -> String {
    let base = duration::parse(current).map(|d| d.as_secs()).unwrap_or(0);
    let unit = resolve_unit(config.unit, current);

    let moved = i128::from(base) + i128::from(steps) * i128::from(unit.seconds());
    let clamped = moved.clamp(1, i128::from(MAX_SECONDS)) as u64;

    format_compact(Duration::from_secs(clamped))
}

pub fn resolve_unit(unit: AdjustUnit, current: &str) -> Unit {
    match unit {
        AdjustUnit::Seconds => Unit::Second,
        AdjustUnit::Minutes => Unit::Minute,
        AdjustUnit::Hours => Unit::Hour,
        AdjustUnit::Smart => largest_unit(current).unwrap_or(Unit::Minute),
    }
}

/// Largest unit suffix in `input` that directly follows a digit.
pub fn largest_unit(input: &str) -> Option<Unit> {
    let chars: Vec<char> = input.to_lowercase().chars().collect();

    (1..chars.len())
        .filter(|&i| chars[i - 1].is_ascii_digit())
        .filter_map(|i| match chars[i] {
            'y' => Some(Unit::Year),
            'm' if chars.get(i + 1) == Some(&'o') => Some(Unit::Month),
            'd' => Some(Unit::Day),
            'h' => Some(Unit::Hour),
            'm' => Some(Unit::Minute),
            's' => Some(Unit::Second),
            _ => None,
        })
        .max()
}

/// Short form for in-form editing: at most the two most significant units.
pub fn format_compact(d: Duration) -> String {
    let p = Parts::of(d);
    let mut parts: Vec<String> = Vec::new();

    if p.days > 0 {
        if p.years > 0 {
            parts.push(format!("{}y", p.years));
        }
        if p.months > 0 {
            parts.push(format!("{}mo", p.months));
        }
        if p.rem_days > 0 && parts.len() < 2 {
            parts.push(format!("{}d", p.rem_days));
        }
    } else if p.hours > 0 {
        parts.push(format!("{}h", p.hours));
        if p.minutes > 0 {
            parts.push(format!("{}m", p.minutes));
        }
    } else if p.minutes > 0 {
        parts.push(format!("{}m", p.minutes));
        if p.seconds > 0 {
            parts.push(format!("{}s", p.seconds));
        }
    } else {
        parts.push(format!("{}s", p.seconds));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn smart() -> AdjustConfig {
        AdjustConfig::default()
    }

    fn fixed(unit: AdjustUnit) -> AdjustConfig {
        AdjustConfig { unit, ..AdjustConfig::default() }
    }

    #[test]
    fn smart_unit_follows_largest_suffix() {
        assert_eq!(adjust("", 1, &smart()), "1m");
        assert_eq!(adjust("5m", 1, &smart()), "6m");
        assert_eq!(adjust("1h30m", 1, &smart()), "2h 30m");
        assert_eq!(adjust("2d", 1, &smart()), "3d");
        assert_eq!(adjust("1mo", 1, &smart()), "2mo");
        assert_eq!(adjust("45s", 5, &smart()), "50s");
    }

    #[test]
    fn invalid_text_counts_as_zero() {
        assert_eq!(adjust("abc", 1, &smart()), "1m");
        assert_eq!(adjust("5x", 2, &fixed(AdjustUnit::Seconds)), "2s");
    }

    #[test]
    fn fixed_units_ignore_the_text() {
        assert_eq!(adjust("1m", 5, &fixed(AdjustUnit::Seconds)), "1m 5s");
        assert_eq!(adjust("10s", 1, &fixed(AdjustUnit::Minutes)), "1m 10s");
        assert_eq!(adjust("1d", 1, &fixed(AdjustUnit::Hours)), "1d");
        assert_eq!(adjust("30m", 1, &fixed(AdjustUnit::Hours)), "1h 30m");
    }

    #[test]
    fn steps_below_the_compact_tier_do_not_move_the_text() {
        let hours = fixed(AdjustUnit::Hours);
        let mut text = "1d".to_string();
        for _ in 0..5 {
            text = adjust(&text, 1, &hours);
        }
        assert_eq!(text, "1d");

        assert_eq!(adjust("1h", 1, &fixed(AdjustUnit::Seconds)), "1h");
        assert_eq!(adjust("1d", 1, &smart()), "2d");
    }

    #[test]
    fn clamps_to_one_second() {
        assert_eq!(adjust("1h", -1, &smart()), "1s");
        assert_eq!(adjust("", -5, &smart()), "1s");
        assert_eq!(adjust("3m", -1, &smart()), "2m");
    }

    #[test]
    fn suffix_must_follow_a_digit() {
        assert_eq!(largest_unit("h"), None);
        assert_eq!(largest_unit("1h 5m"), Some(Unit::Hour));
        assert_eq!(largest_unit("3d h"), Some(Unit::Day));
        assert_eq!(largest_unit("1y 2mo"), Some(Unit::Year));
        assert_eq!(largest_unit("2mo 3d"), Some(Unit::Month));
    }

    #[test]
    fn compact_shows_two_units_at_most() {
        assert_eq!(format_compact(Duration::from_secs(90_061)), "1d");
        assert_eq!(format_compact(Duration::from_secs(3_700)), "1h 1m");
        assert_eq!(format_compact(Duration::from_secs(61)), "1m 1s");
        assert_eq!(format_compact(Duration::from_secs(45)), "45s");
        assert_eq!(format_compact(Duration::from_secs(400 * 86_400)), "1y 1mo");
        assert_eq!(format_compact(Duration::from_secs(37 * 86_400)), "1mo 7d");
    }

    proptest! {
        #[test]
        fn never_yields_less_than_a_second(n in 0u64..200_000, steps in -50i64..50) {
            let text = format_compact(Duration::from_secs(n));
            let out = adjust(&text, steps, &smart());
            let parsed = duration::parse(&out).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert!(parsed >= Duration::from_secs(1));
        }
    }
}
