use std::time::Duration;

/// Parses a Go-style duration string such as `"2h30m15s"` into a
/// [`Duration`], per the Status service's `Uptime` field (§4.E). Supports
/// the `h`/`m`/`s` units the daemon actually emits; an empty or `"-"`
/// string (the daemon's placeholder for "unknown") parses to zero.
pub fn parse_go_duration(raw: &str) -> Duration {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        return Duration::ZERO;
    }

    let mut total = Duration::ZERO;
    let mut number = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            number.push(ch);
            continue;
        }
        let Ok(value) = number.parse::<f64>() else {
            number.clear();
            continue;
        };
        number.clear();
        let unit_seconds = match ch {
            'h' => 3600.0,
            'm' => 60.0,
            's' => 1.0,
            _ => continue,
        };
        total += Duration::from_secs_f64(value * unit_seconds);
    }
    total
}

/// Parses a count field that may arrive as a normal integer string, an
/// empty string, or the daemon's `"-"` placeholder — both of the latter
/// mean zero (§4.E).
pub fn parse_count(raw: &str) -> u64 {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        0
    } else {
        raw.parse().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(
            parse_go_duration("2h30m15s"),
            Duration::from_secs(2 * 3600 + 30 * 60 + 15)
        );
    }

    #[test]
    fn parses_seconds_only() {
        assert_eq!(parse_go_duration("45s"), Duration::from_secs(45));
    }

    #[test]
    fn empty_and_dash_are_zero() {
        assert_eq!(parse_go_duration(""), Duration::ZERO);
        assert_eq!(parse_go_duration("-"), Duration::ZERO);
    }

    #[test]
    fn count_handles_placeholders() {
        assert_eq!(parse_count("-"), 0);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("7"), 7);
    }
}
