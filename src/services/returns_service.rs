use chrono::Datelike;

use crate::models::{BenchmarkPricePoint, CalendarReturn, ReturnPoint, ReturnsCalendar, ValuePoint};

pub fn to_value_points(points: &[BenchmarkPricePoint]) -> Vec<ValuePoint> {
    points
        .iter()
        .map(|p| ValuePoint { date: p.date, value: p.close })
        .collect()
}

fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() || !to.is_finite() {
        return None;
    }
    Some((to - from) / from * 100.0)
}

/// Rebase a series to percent return relative to its first value.
///
/// Empty input, or a first value of zero (or NaN), yields an empty series.
pub fn normalize_to_return_pct(points: &[ValuePoint]) -> Vec<ReturnPoint> {
    let Some(base) = points.first().map(|p| p.value) else {
        return Vec::new();
    };
    if base == 0.0 || !base.is_finite() {
        return Vec::new();
    }

    points
        .iter()
        .map(|p| ReturnPoint {
            date: p.date,
            return_pct: (p.value - base) / base * 100.0,
        })
        .collect()
}

/// Return over the whole series (last vs. first value).
pub fn total_return_pct(points: &[ValuePoint]) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    pct_change(first.value, last.value)
}

/// Monthly and yearly returns from an ascending series.
///
/// Each period compares its last value with the previous period's last
/// value; the first period compares against the first value in the series.
pub fn returns_calendar(points: &[ValuePoint]) -> ReturnsCalendar {
    ReturnsCalendar {
        monthly: period_returns(points, |p| (p.date.year(), Some(p.date.month()))),
        yearly: period_returns(points, |p| (p.date.year(), None)),
    }
}

fn period_returns<F>(points: &[ValuePoint], period_of: F) -> Vec<CalendarReturn>
where
    F: Fn(&ValuePoint) -> (i32, Option<u32>),
{
    // (period, last value in period), in order of appearance
    let mut closes: Vec<((i32, Option<u32>), f64)> = Vec::new();
    for p in points {
        let period = period_of(p);
        match closes.last_mut() {
            Some((last_period, value)) if *last_period == period => *value = p.value,
            _ => closes.push((period, p.value)),
        }
    }

    let Some(first) = points.first() else {
        return Vec::new();
    };

    let mut reference = first.value;
    let mut out = Vec::with_capacity(closes.len());

    for ((year, month), close) in closes {
        if let Some(return_pct) = pct_change(reference, close) {
            out.push(CalendarReturn { year, month, return_pct });
        }
        reference = close;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn vp(date: &str, value: f64) -> ValuePoint {
        ValuePoint {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            value,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_to_return_pct(&[]).is_empty());
    }

    #[test]
    fn test_normalize_zero_base() {
        let points = vec![vp("2020-01-01", 0.0), vp("2020-01-02", 5.0)];
        assert!(normalize_to_return_pct(&points).is_empty());
    }

    #[test]
    fn test_normalize_rebases_to_first_value() {
        let points = vec![vp("2020-01-01", 100.0), vp("2020-01-02", 110.0)];
        let out = normalize_to_return_pct(&points);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date.to_string(), "2020-01-01");
        assert!(approx(out[0].return_pct, 0.0));
        assert_eq!(out[1].date.to_string(), "2020-01-02");
        assert!(approx(out[1].return_pct, 10.0));
    }

    #[test]
    fn test_total_return() {
        let points = vec![vp("2020-01-01", 200.0), vp("2020-06-01", 150.0)];
        assert!(approx(total_return_pct(&points).unwrap(), -25.0));
        assert!(total_return_pct(&[]).is_none());
    }

    #[test]
    fn test_calendar_months_chain_from_previous_close() {
        let points = vec![
            vp("2023-12-29", 100.0),
            vp("2024-01-02", 101.0),
            vp("2024-01-31", 110.0),
            vp("2024-02-29", 99.0),
        ];
        let calendar = returns_calendar(&points);

        let monthly: Vec<(i32, Option<u32>)> = calendar.monthly.iter().map(|r| (r.year, r.month)).collect();
        assert_eq!(monthly, vec![(2023, Some(12)), (2024, Some(1)), (2024, Some(2))]);
        assert!(approx(calendar.monthly[0].return_pct, 0.0));
        assert!(approx(calendar.monthly[1].return_pct, 10.0));
        assert!(approx(calendar.monthly[2].return_pct, -10.0));

        assert_eq!(calendar.yearly.len(), 2);
        assert_eq!(calendar.yearly[1].month, None);
        assert!(approx(calendar.yearly[1].return_pct, -1.0));
    }

    #[test]
    fn test_calendar_empty_series() {
        let calendar = returns_calendar(&[]);
        assert!(calendar.monthly.is_empty());
        assert!(calendar.yearly.is_empty());
    }
}
