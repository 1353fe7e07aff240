//! Splits a requested date range into sub-ranges the load API accepts in a
//! single call.

use crate::types::date_range::DateRange;
use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Span used when neither the caller nor the series configuration sets one.
pub const DEFAULT_DAYS_LIMIT: u32 = 90;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("Start date {from} is after end date {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },

    #[error("Reaching back {days_limit} days from {to} leaves the supported calendar")]
    SpanOutOfRange { to: NaiveDate, days_limit: u32 },
}

/// Picks the batch span: an explicit value wins over the configured one, and
/// [`DEFAULT_DAYS_LIMIT`] applies when neither is set.
pub fn resolve_days_limit(explicit: Option<u32>, configured: Option<u32>) -> u32 {
    explicit.or(configured).unwrap_or(DEFAULT_DAYS_LIMIT)
}

/// Plans the sequence of date ranges to request.
///
/// Without `date_from` a single range ending at `date_to` and reaching back
/// `days_limit` days is returned. Otherwise the ranges walk forward from
/// `date_from`: each one ends at most `days_limit` days after it starts, the
/// next one starts the day after, and the last one ends exactly on `date_to`.
///
/// # Errors
///
/// Returns [`BatchError::InvertedRange`] when `date_from` is after `date_to`,
/// and [`BatchError::SpanOutOfRange`] when, without `date_from`, the range
/// would start before the earliest representable date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ons_carga::{plan_batches, DateRange};
///
/// let d = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
///
/// let batches = plan_batches(Some(d(1, 1)), d(2, 15), 31).unwrap();
/// assert_eq!(
///     batches,
///     vec![
///         DateRange::new(d(1, 1), d(2, 1)),
///         DateRange::new(d(2, 2), d(2, 15)),
///     ]
/// );
/// ```
pub fn plan_batches(
    date_from: Option<NaiveDate>,
    date_to: NaiveDate,
    days_limit: u32,
) -> Result<Vec<DateRange>, BatchError> {
    let span = i64::from(days_limit);

    let Some(date_from) = date_from else {
        let start = date_to
            .checked_sub_signed(Duration::days(span))
            .ok_or(BatchError::SpanOutOfRange { to: date_to, days_limit })?;
        return Ok(vec![DateRange::new(start, date_to)]);
    };

    if date_from > date_to {
        return Err(BatchError::InvertedRange {
            from: date_from,
            to: date_to,
        });
    }

    let mut remaining = (date_to - date_from).num_days();
    let mut batches = Vec::with_capacity((remaining / (span + 1) + 1) as usize);
    let mut current_start = date_from;

    loop {
        let current_end = current_start + Duration::days(span.min(remaining));
        batches.push(DateRange::new(current_start, current_end));
        if remaining <= span {
            break;
        }
        current_start = current_end + Duration::days(1);
        remaining -= span + 1;
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn assert_covers(batches: &[DateRange], from: NaiveDate, to: NaiveDate, limit: u32) {
        assert!(!batches.is_empty());
        assert_eq!(batches.first().unwrap().start, from);
        assert_eq!(batches.last().unwrap().end, to);
        for range in batches {
            assert!(range.start <= range.end, "{range} is inverted");
            assert!(range.span_days() <= i64::from(limit), "{range} exceeds {limit} days");
        }
        for pair in batches.windows(2) {
            assert_eq!(pair[1].start, pair[0].end + Duration::days(1));
        }
    }

    #[test]
    fn test_without_start_returns_single_trailing_range() {
        let to = date(2024, 3, 31);
        let batches = plan_batches(None, to, 31).unwrap();
        assert_eq!(batches, vec![DateRange::new(date(2024, 2, 29), to)]);
    }

    #[test]
    fn test_same_day_yields_one_range() {
        let day = date(2024, 1, 1);
        let batches = plan_batches(Some(day), day, 31).unwrap();
        assert_eq!(batches, vec![DateRange::new(day, day)]);
    }

    #[test]
    fn test_quarter_with_month_limit() {
        let from = date(2024, 1, 1);
        let to = date(2024, 3, 31);
        let batches = plan_batches(Some(from), to, 31).unwrap();

        assert_eq!(
            batches,
            vec![
                DateRange::new(date(2024, 1, 1), date(2024, 2, 1)),
                DateRange::new(date(2024, 2, 2), date(2024, 3, 4)),
                DateRange::new(date(2024, 3, 5), date(2024, 3, 31)),
            ]
        );
        assert_covers(&batches, from, to, 31);
    }

    #[test]
    fn test_exact_multiple_does_not_overshoot() {
        // 64 days = two full 32-day batches minus one day
        let from = date(2023, 1, 1);
        let to = from + Duration::days(63);
        let batches = plan_batches(Some(from), to, 31).unwrap();
        assert_eq!(batches.len(), 2);
        assert_covers(&batches, from, to, 31);

        let to = from + Duration::days(64);
        let batches = plan_batches(Some(from), to, 31).unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2], DateRange::new(to, to));
        assert_covers(&batches, from, to, 31);
    }

    #[test]
    fn test_coverage_over_many_inputs() {
        let from = date(2020, 2, 27);
        for limit in [0, 1, 6, 30, 31, 90] {
            for length in [0, 1, 2, 30, 31, 32, 33, 90, 91, 365, 1000] {
                let to = from + Duration::days(length);
                let batches = plan_batches(Some(from), to, limit).unwrap();
                assert_covers(&batches, from, to, limit);
                let expected = length / (i64::from(limit) + 1) + 1;
                assert_eq!(batches.len() as i64, expected, "limit {limit}, length {length}");
            }
        }
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = plan_batches(Some(date(2024, 2, 1)), date(2024, 1, 1), 31).unwrap_err();
        assert_eq!(
            err,
            BatchError::InvertedRange {
                from: date(2024, 2, 1),
                to: date(2024, 1, 1)
            }
        );
    }

    #[test]
    fn test_huge_limit_without_start_is_an_error() {
        let to = date(2024, 1, 1);
        assert_eq!(
            plan_batches(None, to, 200_000_000),
            Err(BatchError::SpanOutOfRange {
                to,
                days_limit: 200_000_000
            })
        );

        // a start date keeps the walk inside [from, to] whatever the limit
        let batches = plan_batches(Some(date(2023, 12, 1)), to, u32::MAX).unwrap();
        assert_eq!(batches, vec![DateRange::new(date(2023, 12, 1), to)]);
    }

    #[test]
    fn test_resolve_days_limit_precedence() {
        assert_eq!(resolve_days_limit(Some(7), Some(31)), 7);
        assert_eq!(resolve_days_limit(None, Some(31)), 31);
        assert_eq!(resolve_days_limit(None, None), DEFAULT_DAYS_LIMIT);
    }
}
