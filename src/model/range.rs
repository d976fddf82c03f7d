use crate::model::date::from_local_millis;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The selected time window, as a pair of local epoch millisecond timestamps. Serialized as a
/// two element array `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct BrushRange {
    start: i64,
    end: i64,
}

impl BrushRange {
    /// Creates a range, swapping the bounds if they arrive reversed.
    pub fn new(start: i64, end: i64) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Inclusive on both ends.
    pub fn contains(&self, ms: i64) -> bool {
        self.start <= ms && ms <= self.end
    }

    pub fn start_date(&self) -> Option<NaiveDateTime> {
        from_local_millis(self.start)
    }

    pub fn end_date(&self) -> Option<NaiveDateTime> {
        from_local_millis(self.end)
    }

    /// Number of calendar months between the bounds, never less than one.
    pub fn month_span(&self) -> u32 {
        match (self.start_date(), self.end_date()) {
            (Some(s), Some(e)) => {
                let months = (e.year() - s.year()) * 12 + e.month() as i32 - s.month() as i32;
                months.max(1) as u32
            }
            _ => 1,
        }
    }
}

impl From<(i64, i64)> for BrushRange {
    fn from((start, end): (i64, i64)) -> Self {
        BrushRange::new(start, end)
    }
}

impl From<BrushRange> for (i64, i64) {
    fn from(value: BrushRange) -> Self {
        (value.start, value.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::date::{local_millis, parse_record_date};

    fn ms(s: &str) -> i64 {
        local_millis(parse_record_date(s).unwrap()).unwrap()
    }

    #[test]
    fn test_reversed_bounds_are_ordered() {
        let r = BrushRange::new(10, 2);
        assert_eq!((r.start(), r.end()), (2, 10));
        assert!(r.contains(2));
        assert!(r.contains(10));
        assert!(!r.contains(11));
    }

    #[test]
    fn test_serializes_as_pair() {
        let r: BrushRange = serde_json::from_str("[5, 1]").unwrap();
        assert_eq!(r, BrushRange::new(1, 5));
        assert_eq!(serde_json::to_string(&r).unwrap(), "[1,5]");
    }

    #[test]
    fn test_month_span() {
        let r = BrushRange::new(ms("2025-01-15"), ms("2025-04-02"));
        assert_eq!(r.month_span(), 3);
        let same = BrushRange::new(ms("2025-01-01"), ms("2025-01-31"));
        assert_eq!(same.month_span(), 1);
        let years = BrushRange::new(ms("2023-11-01"), ms("2025-02-01"));
        assert_eq!(years.month_span(), 15);
    }
}
