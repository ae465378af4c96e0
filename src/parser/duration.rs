use std::sync::LazyLock;

use regex::Regex;

static ISO_DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").unwrap());

/// Total seconds of an ISO-8601 time period such as `PT1H2M3S`.
/// Missing or unparseable input is 0, and so is a total that overflows `u64`.
pub fn parse_iso_duration(iso: &str) -> u64 {
    let Some(caps) = ISO_DURATION_RE.captures(iso) else {
        return 0;
    };
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let total = || -> Option<u64> {
        part(1)?
            .checked_mul(3600)?
            .checked_add(part(2)?.checked_mul(60)?)?
            .checked_add(part(3)?)
    };
    total().unwrap_or(0)
}

/// Long-form check: 0 means unknown and is kept, anything at or under
/// `max_short_seconds` is a short.
pub fn is_long_form(seconds: u64, max_short_seconds: u64) -> bool {
    seconds == 0 || seconds > max_short_seconds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_durations() {
        assert_eq!(parse_iso_duration("PT1M35S"), 95);
        assert_eq!(parse_iso_duration("PT59S"), 59);
        assert_eq!(parse_iso_duration("PT2H"), 7200);
        assert_eq!(parse_iso_duration("PT1H0M1S"), 3601);
        assert_eq!(parse_iso_duration("PT10M"), 600);
    }

    #[test]
    fn composition_holds() {
        for h in [0u64, 1, 3] {
            for m in [0u64, 7, 59] {
                for s in [0u64, 1, 42] {
                    let iso = format!("PT{h}H{m}M{s}S");
                    assert_eq!(parse_iso_duration(&iso), h * 3600 + m * 60 + s, "{iso}");
                }
            }
        }
    }

    #[test]
    fn unparseable_is_zero() {
        assert_eq!(parse_iso_duration(""), 0);
        assert_eq!(parse_iso_duration("P0D"), 0);
        assert_eq!(parse_iso_duration("ninety seconds"), 0);
        assert_eq!(parse_iso_duration("PT"), 0);
    }

    #[test]
    fn oversized_values_are_unknown() {
        assert_eq!(parse_iso_duration("PT5124095576030432H"), 0);
        assert_eq!(parse_iso_duration("PT99999999999999999999S"), 0);
        assert_eq!(parse_iso_duration("PT5124095576030431H"), 18_446_744_073_709_551_600);
        assert!(is_long_form(parse_iso_duration("PT5124095576030432H"), 60));
    }

    #[test]
    fn short_form_threshold() {
        assert!(!is_long_form(60, 60));
        assert!(is_long_form(61, 60));
        assert!(is_long_form(0, 60));
        assert!(!is_long_form(1, 60));
    }
}
