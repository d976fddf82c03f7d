//! Seed data for `Mode::Test`, so the whole application can run without touching the disk.

use crate::model::{local_millis, parse_record_date, BrushRange, Expense, Tag};
use crate::Result;
use anyhow::Context;
use serde::Deserialize;

/// Loads the seeded expense records. Ids are derived from content.
pub(super) fn expenses() -> Result<Vec<Expense>> {
    let mut reader = csv::Reader::from_reader(EXPENSE_DATA.as_bytes());
    let mut expenses = Vec::new();
    for row in reader.deserialize() {
        let row: SeedRow = row.context("Bad seed row")?;
        let tags = row
            .tags
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Tag::from)
            .collect();
        expenses.push(Expense::with_derived_id(
            row.amount,
            tags,
            row.date,
            row.description,
        ));
    }
    Ok(expenses)
}

/// The seeded brush range: all of 2025.
pub(super) fn range() -> Option<BrushRange> {
    let start = local_millis(parse_record_date("2025-01-01T00:00:00")?)?;
    let end = local_millis(parse_record_date("2025-12-31T23:59:59")?)?;
    Some(BrushRange::new(start, end))
}

#[derive(Debug, Deserialize)]
struct SeedRow {
    date: String,
    description: String,
    amount: f64,
    tags: String,
}

const EXPENSE_DATA: &str = r#"date,description,amount,tags
2024-01-02T00:00:00,Payroll,-4200.00,Income
2024-01-02T00:00:00,401k Deduction,600.00,Retirement
2024-01-04T00:00:00,Apartment Rent,1800.00,Rent
2024-01-09T00:00:00,Corner Market,92.35,Groceries
2024-01-15T00:00:00,Brokerage Transfer,500.00,Savings
2024-02-01T00:00:00,Payroll,-4200.00,Income
2024-02-01T00:00:00,401k Deduction,600.00,Retirement
2024-02-05T00:00:00,Apartment Rent,1800.00,Rent
2024-02-12T00:00:00,Fuel Stop,41.10,Gas
2024-02-20T00:00:00,Stock Vest,-1500.00,RSU
2025-01-02T00:00:00,Payroll,-4500.00,Income
2025-01-02T00:00:00,401k Deduction,650.00,Retirement
2025-01-03T00:00:00,Apartment Rent,1900.00,Rent
2025-01-07T00:00:00,Noodle Bar,38.20,Food
2025-01-11T00:00:00,Corner Market,104.77,Groceries
2025-01-18T00:00:00,City Power,88.00,Utilities
2025-01-22T00:00:00,Movie Night,31.50,Entertainment
2025-01-28T00:00:00,Brokerage Transfer,700.00,Savings
2025-02-03T00:00:00,Payroll,-4500.00,Income
2025-02-03T00:00:00,401k Deduction,650.00,Retirement
2025-02-04T00:00:00,Apartment Rent,1900.00,Rent
2025-02-09T00:00:00,Fuel Stop,46.80,Gas
2025-02-14T00:00:00,Taco Truck,24.00,Food
2025-02-16T00:00:00,Summer Camp Deposit,250.00,Kids
2025-02-20T00:00:00,Stock Vest,-1800.00,RSU
2025-02-25T00:00:00,Music Stream,10.99,Subscriptions;Entertainment
2025-03-03T00:00:00,Payroll,-4500.00,Income
2025-03-03T00:00:00,401k Deduction,650.00,Retirement
2025-03-04T00:00:00,Apartment Rent,1900.00,Rent
2025-03-08T00:00:00,Pharmacy,22.40,Health
2025-03-12T00:00:00,Hardware Store,63.15,
2025-03-19T00:00:00,Train Pass,75.00,Transportation
2025-03-27T00:00:00,Airline,420.00,Travel
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NonExpenseTag;

    #[test]
    fn test_seed_loads() {
        let expenses = expenses().unwrap();
        assert_eq!(expenses.len(), 33);
        assert!(expenses.iter().any(|e| e.is_untagged()));
        assert!(expenses.iter().any(|e| e.is_custom_only()));
        assert!(expenses.iter().any(|e| e.has_tag(NonExpenseTag::Rsu)));
        assert!(expenses.iter().all(|e| e.parsed_date().is_some()));
    }

    #[test]
    fn test_seed_ids_are_unique() {
        let expenses = expenses().unwrap();
        let mut ids: Vec<_> = expenses.iter().map(|e| e.id().to_string()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), expenses.len());
    }

    #[test]
    fn test_seed_range() {
        let range = range().unwrap();
        assert!(range.start() < range.end());
    }
}
