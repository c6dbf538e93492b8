//! Picking the run distance out of recognised screenshot text.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::codec::parse_decimal;

lazy_static! {
    static ref NUMBER_BEFORE_KM: Regex = Regex::new(r"(\d+\.?\d*)\s*km").unwrap();
}

/// First number directly followed by `km` in `text`.
pub fn number_before_km(text: &str) -> Option<&str> {
    NUMBER_BEFORE_KM
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Distance shown on a screenshot, from its text lines in reading order.
///
/// Pace units (`/km`, `km/`) are ignored and a line holding only `km` is read
/// together with the line before it. Zero unless exactly one distance is found.
pub fn distance_from_lines<S: AsRef<str>>(lines: &[S]) -> Decimal {
    let mut distances = Vec::new();
    let mut previous = String::new();

    for line in lines {
        let mut text = line
            .as_ref()
            .trim()
            .to_lowercase()
            .replace("/km", "")
            .replace("km/", "");

        if text == "km" {
            text = format!("{}{}", previous, text);
        }

        if text.contains("km")
            && let Some(distance) = number_before_km(&text).and_then(parse_decimal)
        {
            distances.push(distance);
        }

        previous = text;
    }

    match distances.as_slice() {
        [distance] => *distance,
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_number_before_km() {
        assert_eq!(number_before_km("14.06 km"), Some("14.06"));
        assert_eq!(number_before_km("14.06km"), Some("14.06"));
        assert_eq!(number_before_km("a14.06 km"), Some("14.06"));
        assert_eq!(number_before_km("14.06 /km"), None);
    }

    #[test]
    fn test_single_distance() {
        let lines = ["Morning Run", "5.01 km", "5:32 /km", "Time 27:44"];
        assert_eq!(distance_from_lines(&lines), dec("5.01"));
    }

    #[test]
    fn test_unit_on_its_own_line() {
        let lines = ["Distance", "18.54", "KM", "Pace 6:01/km"];
        assert_eq!(distance_from_lines(&lines), dec("18.54"));
    }

    #[test]
    fn test_keeps_written_precision() {
        assert_eq!(distance_from_lines(&["21.20 km"]).to_string(), "21.20");
        assert_eq!(distance_from_lines(&["24.0km"]).to_string(), "24.0");
    }

    #[test]
    fn test_no_distance() {
        let lines = ["Yoga", "45 min", "320 kcal"];
        assert_eq!(distance_from_lines(&lines), Decimal::ZERO);
    }

    #[test]
    fn test_ambiguous_distances() {
        let lines = ["Run 5.2 km", "Walk 3.1 km"];
        assert_eq!(distance_from_lines(&lines), Decimal::ZERO);
    }
}
