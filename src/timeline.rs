use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};

/// Per-bucket funnel counters for the execution timelines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    pub approval_sent: usize,
    pub validation_sent: usize,
    pub implemented: usize,
}

pub fn month_key(ts: DateTime<Utc>) -> String {
    format!("{}-{:02}", ts.year(), ts.month())
}

/// ISO week-year, not calendar year, so late-December and early-January
/// events land in the week they actually belong to.
pub fn week_key(ts: DateTime<Utc>) -> String {
    let iso = ts.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Exactly 12 zeroed buckets for the target year, keyed ascending.
pub fn monthly_buckets<T: Default>(target_year: i32) -> BTreeMap<String, T> {
    (1..=12)
        .map(|month| (format!("{target_year}-{month:02}"), T::default()))
        .collect()
}

/// Exactly `window_weeks` zeroed buckets covering the most recent ISO
/// weeks, current week included. `now` must be the same instant used for
/// the window cutoff.
pub fn weekly_buckets<T: Default>(window_weeks: i64, now: DateTime<Utc>) -> BTreeMap<String, T> {
    (0..window_weeks)
        .map(|i| (week_key(now - Duration::weeks(i)), T::default()))
        .collect()
}

pub fn window_cutoff(window_weeks: i64, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::weeks(window_weeks)
}

/// Routes one event into the monthly and weekly bucket maps. The two axes
/// are independent: the monthly bucket takes the event only when its year
/// equals the target year, the weekly bucket only when the event falls
/// inside the rolling window, whatever its calendar year. Timestamps
/// matching neither axis are silently ignored.
pub fn allocate<T>(
    timestamp: DateTime<Utc>,
    target_year: i32,
    cutoff: DateTime<Utc>,
    monthly: &mut BTreeMap<String, T>,
    weekly: &mut BTreeMap<String, T>,
    bump: impl Fn(&mut T),
) {
    if timestamp.year() == target_year {
        if let Some(bucket) = monthly.get_mut(&month_key(timestamp)) {
            bump(bucket);
        }
    }
    if timestamp >= cutoff {
        if let Some(bucket) = weekly.get_mut(&week_key(timestamp)) {
            bump(bucket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn monthly_buckets_cover_the_whole_year() {
        let buckets = monthly_buckets::<usize>(2025);
        assert_eq!(buckets.len(), 12);
        let keys: Vec<&String> = buckets.keys().collect();
        assert_eq!(keys[0], "2025-01");
        assert_eq!(keys[11], "2025-12");
    }

    #[test]
    fn weekly_buckets_have_fixed_size_and_iso_keys() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let buckets = weekly_buckets::<usize>(10, now);
        assert_eq!(buckets.len(), 10);
        // 2025-03-10 is ISO week 11 of 2025; ten weeks back is week 2.
        assert!(buckets.contains_key("2025-W11"));
        assert!(buckets.contains_key("2025-W02"));
    }

    #[test]
    fn weekly_buckets_roll_over_year_boundaries() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let buckets = weekly_buckets::<usize>(10, now);
        assert_eq!(buckets.len(), 10);
        assert!(buckets.keys().any(|k| k.starts_with("2024-")));
        assert!(buckets.keys().any(|k| k.starts_with("2025-")));
    }

    #[test]
    fn week_key_uses_iso_week_year() {
        // 2024-12-30 belongs to ISO week 1 of 2025.
        let ts = Utc.with_ymd_and_hms(2024, 12, 30, 8, 0, 0).unwrap();
        assert_eq!(week_key(ts), "2025-W01");
    }

    #[test]
    fn allocate_respects_both_axes_independently() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let cutoff = window_cutoff(10, now);
        let mut monthly = monthly_buckets::<usize>(2025);
        let mut weekly = weekly_buckets::<usize>(10, now);

        // December 2024: inside the window, outside the target year.
        let december = Utc.with_ymd_and_hms(2024, 12, 20, 9, 0, 0).unwrap();
        allocate(december, 2025, cutoff, &mut monthly, &mut weekly, |c| *c += 1);
        assert_eq!(monthly.values().sum::<usize>(), 0);
        assert_eq!(weekly.values().sum::<usize>(), 1);

        // June 2025: inside the target year, outside the window.
        let june = Utc.with_ymd_and_hms(2025, 6, 20, 9, 0, 0).unwrap();
        allocate(june, 2025, cutoff, &mut monthly, &mut weekly, |c| *c += 1);
        assert_eq!(monthly["2025-06"], 1);
        assert_eq!(weekly.values().sum::<usize>(), 1);
    }

    #[test]
    fn allocate_ignores_out_of_range_timestamps() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let cutoff = window_cutoff(10, now);
        let mut monthly = monthly_buckets::<usize>(2025);
        let mut weekly = weekly_buckets::<usize>(10, now);

        let ancient = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        allocate(ancient, 2025, cutoff, &mut monthly, &mut weekly, |c| *c += 1);
        assert_eq!(monthly.values().sum::<usize>(), 0);
        assert_eq!(weekly.values().sum::<usize>(), 0);
    }

    #[test]
    fn phase_counts_accumulate_per_field() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let cutoff = window_cutoff(10, now);
        let mut monthly = monthly_buckets::<PhaseCounts>(2025);
        let mut weekly = weekly_buckets::<PhaseCounts>(10, now);

        let ts = Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap();
        allocate(ts, 2025, cutoff, &mut monthly, &mut weekly, |c| {
            c.approval_sent += 1
        });
        allocate(ts, 2025, cutoff, &mut monthly, &mut weekly, |c| {
            c.implemented += 1
        });

        let bucket = monthly["2025-03"];
        assert_eq!(bucket.approval_sent, 1);
        assert_eq!(bucket.validation_sent, 0);
        assert_eq!(bucket.implemented, 1);
    }
}
