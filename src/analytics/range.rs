//! Symbolic date-range resolution for reporting queries
//!
//! Range tokens map to a lower-bound timestamp aligned to the start of a UTC
//! day, so bucket boundaries match calendar days no matter when a report is
//! requested. `all` resolves to no bound at all; queries must omit the filter
//! for it rather than substitute a sentinel date.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Date window selector accepted by the reporting endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Days7,
    #[default]
    Days30,
    Days90,
    All,
}

impl TimeRange {
    /// Parse a range token. Unknown tokens are rejected, never defaulted.
    pub fn parse(token: &str) -> Option<TimeRange> {
        match token {
            "7d" => Some(TimeRange::Days7),
            "30d" => Some(TimeRange::Days30),
            "90d" => Some(TimeRange::Days90),
            "all" => Some(TimeRange::All),
            _ => None,
        }
    }

    /// Lower bound of the window as unix seconds, truncated to 00:00:00 UTC.
    /// `All` has no lower bound.
    pub fn since(self, now: DateTime<Utc>) -> Option<i64> {
        let days = match self {
            TimeRange::Days7 => 7,
            TimeRange::Days30 => 30,
            TimeRange::Days90 => 90,
            TimeRange::All => return None,
        };
        let start_day = now.date_naive() - Duration::days(days);
        Some(start_day.and_time(NaiveTime::MIN).and_utc().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_accepts_known_tokens() {
        assert_eq!(TimeRange::parse("7d"), Some(TimeRange::Days7));
        assert_eq!(TimeRange::parse("30d"), Some(TimeRange::Days30));
        assert_eq!(TimeRange::parse("90d"), Some(TimeRange::Days90));
        assert_eq!(TimeRange::parse("all"), Some(TimeRange::All));
    }

    #[test]
    fn test_parse_rejects_unknown_tokens() {
        assert_eq!(TimeRange::parse("14d"), None);
        assert_eq!(TimeRange::parse("7D"), None);
        assert_eq!(TimeRange::parse(""), None);
        assert_eq!(TimeRange::parse("forever"), None);
    }

    #[test]
    fn test_since_truncates_to_start_of_day() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap().timestamp();
        assert_eq!(TimeRange::Days7.since(now), Some(expected));
    }

    #[test]
    fn test_since_at_midnight_exactly() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap().timestamp();
        assert_eq!(TimeRange::Days30.since(now), Some(expected));
    }

    #[test]
    fn test_all_has_no_lower_bound() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap();
        assert_eq!(TimeRange::All.since(now), None);
        let epoch = Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(TimeRange::All.since(epoch), None);
    }

    #[test]
    fn test_default_is_30_days() {
        assert_eq!(TimeRange::default(), TimeRange::Days30);
    }
}
