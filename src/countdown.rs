use chrono::{DateTime, Utc};
use serde::Serialize;

const MS_PER_DAY: u64 = 86_400_000;
const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Whole days/hours/minutes/seconds left until a deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub label: String,
}

/// Milliseconds from `now` until `end`, zero once `end` has passed.
pub fn remaining_ms(end: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let diff = end.timestamp_millis().saturating_sub(now.timestamp_millis());
    diff.max(0) as u64
}

pub fn utc_countdown(end: DateTime<Utc>, now: DateTime<Utc>) -> Countdown {
    let mut ms = remaining_ms(end, now);

    let days = ms / MS_PER_DAY;
    ms -= days * MS_PER_DAY;
    let hours = ms / MS_PER_HOUR;
    ms -= hours * MS_PER_HOUR;
    let minutes = ms / MS_PER_MINUTE;
    ms -= minutes * MS_PER_MINUTE;
    let seconds = ms / MS_PER_SECOND;

    Countdown {
        days,
        hours,
        minutes,
        seconds,
        label: format!("Payout in {}d {}h {}m {}s", days, hours, minutes, seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 30, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_decomposition() {
        let now = end()
            - Duration::days(3)
            - Duration::hours(4)
            - Duration::minutes(5)
            - Duration::seconds(6)
            - Duration::milliseconds(999);
        let c = utc_countdown(end(), now);
        assert_eq!((c.days, c.hours, c.minutes, c.seconds), (3, 4, 5, 6));
        assert_eq!(c.label, "Payout in 3d 4h 5m 6s");
    }

    #[test]
    fn test_sub_second_floors_to_zero() {
        let now = end() - Duration::milliseconds(999);
        let c = utc_countdown(end(), now);
        assert_eq!(c.label, "Payout in 0d 0h 0m 0s");
    }

    #[test]
    fn test_clamped_after_deadline() {
        for offset in [0, 1, 86_400_000 * 30] {
            let c = utc_countdown(end(), end() + Duration::milliseconds(offset));
            assert_eq!((c.days, c.hours, c.minutes, c.seconds), (0, 0, 0, 0));
            assert_eq!(c.label, "Payout in 0d 0h 0m 0s");
        }
    }

    #[test]
    fn test_remaining_is_monotone() {
        let mut prev = u64::MAX;
        let mut now = end() - Duration::days(10);
        while now < end() {
            let r = remaining_ms(end(), now);
            assert!(r <= prev);
            prev = r;
            now += Duration::minutes(97);
        }
    }

    #[test]
    fn test_serializes_field_names() {
        let c = utc_countdown(end(), end() - Duration::seconds(61));
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["minutes"], 1);
        assert_eq!(v["seconds"], 1);
        assert_eq!(v["label"], "Payout in 0d 0h 1m 1s");
    }
}
