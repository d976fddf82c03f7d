use crate::model::Expense;
use chrono::{Datelike, Month};
use serde::Serialize;

/// One calendar month of a running total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    /// 1 for January through 12 for December.
    pub month: u32,
    /// `Jan` through `Dec`.
    pub label: String,
    /// Sum of every record from January through this month.
    pub total: f64,
}

pub fn month_label(month: u32) -> String {
    Month::try_from(u8::try_from(month).unwrap_or(0))
        .map(|m| m.name()[..3].to_string())
        .unwrap_or_default()
}

/// Cumulative totals of the records dated in `year`, one row per calendar month, January first.
/// Months without records carry the previous total forward.
pub fn monthly_running_totals(records: &[Expense], year: i32) -> Vec<MonthTotal> {
    let mut per_month = [0.0_f64; 12];
    for e in records {
        if let Some(d) = e.parsed_date() {
            if d.year() == year {
                per_month[d.month0() as usize] += e.amount();
            }
        }
    }
    let mut running = 0.0;
    per_month
        .iter()
        .enumerate()
        .map(|(i, sum)| {
            running += sum;
            let month = i as u32 + 1;
            MonthTotal {
                month,
                label: month_label(month),
                total: running,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: f64, date: &str) -> Expense {
        Expense::new("id", amount, vec![], date, "")
    }

    #[test]
    fn test_single_march_record() {
        let totals = monthly_running_totals(&[record(200.0, "2025-03-14T00:00:00")], 2025);
        assert_eq!(totals.len(), 12);
        assert_eq!(totals[0].total, 0.0);
        assert_eq!(totals[1].total, 0.0);
        assert!(totals[2..].iter().all(|t| t.total == 200.0));
        assert_eq!(totals[0].label, "Jan");
        assert_eq!(totals[11].label, "Dec");
    }

    #[test]
    fn test_other_years_are_ignored() {
        let records = vec![
            record(10.0, "2024-12-31"),
            record(5.0, "2025-01-01"),
            record(-2.0, "2025-06-30"),
            record(1.0, "whenever"),
        ];
        let totals = monthly_running_totals(&records, 2025);
        assert_eq!(totals[0].total, 5.0);
        assert_eq!(totals[4].total, 5.0);
        assert_eq!(totals[5].total, 3.0);
        assert_eq!(totals[11].total, 3.0);
    }

    #[test]
    fn test_empty_year() {
        let totals = monthly_running_totals(&[], 2025);
        assert!(totals.iter().all(|t| t.total == 0.0));
        assert_eq!(totals[8].label, "Sep");
    }
}
