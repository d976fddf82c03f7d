//! Bank export layouts that can be imported as expense records.
//!
//! A definition names the columns that carry the date, the description, the amount and, for some
//! banks, a category. A file matches a definition when every data row validates against it.

use crate::model::{format_record_date, Expense, Tag};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Identifies one of the supported bank export layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CsvDefinitionKey {
    WellsFargo,
    CapitalOne,
}

serde_plain::derive_display_from_serialize!(CsvDefinitionKey);
serde_plain::derive_fromstr_from_deserialize!(CsvDefinitionKey);

pub const ALL_CSV_DEFINITIONS: [CsvDefinitionKey; 2] =
    [CsvDefinitionKey::WellsFargo, CsvDefinitionKey::CapitalOne];

/// How the bank signs its amounts relative to ours, where spending is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Standard,
    Inversed,
}

#[derive(Debug, Clone, Copy)]
pub struct CsvDefinition {
    name: &'static str,
    has_headers: bool,
    date: usize,
    date_format: &'static str,
    description: usize,
    amount: usize,
    sign: Sign,
    tag: Option<usize>,
}

impl CsvDefinitionKey {
    pub fn definition(self) -> CsvDefinition {
        match self {
            CsvDefinitionKey::WellsFargo => CsvDefinition {
                name: "Wells Fargo Spending Report",
                has_headers: true,
                date: 0,
                date_format: "%m/%d/%Y",
                description: 1,
                amount: 2,
                sign: Sign::Inversed,
                tag: None,
            },
            CsvDefinitionKey::CapitalOne => CsvDefinition {
                name: "Capital One Spending Report",
                has_headers: true,
                date: 0,
                date_format: "%Y-%m-%d",
                description: 1,
                amount: 2,
                sign: Sign::Standard,
                tag: Some(3),
            },
        }
    }
}

impl CsvDefinition {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn has_headers(&self) -> bool {
        self.has_headers
    }

    fn validate(&self, record: &StringRecord) -> bool {
        let cell = |i: usize| record.get(i).map(str::trim).filter(|s| !s.is_empty());
        let Some(date) = cell(self.date) else {
            return false;
        };
        if cell(self.description).is_none() {
            return false;
        }
        let Some(amount) = cell(self.amount) else {
            return false;
        };
        NaiveDate::parse_from_str(date, self.date_format).is_ok() && parse_amount(amount).is_some()
    }

    fn to_expense(&self, record: &StringRecord) -> Result<Expense> {
        let get = |i: usize| record.get(i).map(str::trim).unwrap_or_default();
        let date = NaiveDate::parse_from_str(get(self.date), self.date_format)
            .with_context(|| format!("Bad date '{}' for {}", get(self.date), self.name))?;
        let Some(mut amount) = parse_amount(get(self.amount)) else {
            bail!("Bad amount '{}' for {}", get(self.amount), self.name);
        };
        if self.sign == Sign::Inversed {
            amount = -amount;
        }
        let tags = self
            .tag
            .map(get)
            .filter(|s| !s.is_empty())
            .map(|s| vec![Tag::from(s)])
            .unwrap_or_default();
        Ok(Expense::with_derived_id(
            amount,
            tags,
            format_record_date(date),
            get(self.description),
        ))
    }

    fn records(&self, data: &str) -> Result<Vec<StringRecord>> {
        csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .from_reader(data.as_bytes())
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Unable to read CSV records")
    }
}

/// Returns every definition that the data satisfies. A file with no data rows matches nothing.
pub fn matching_definitions(data: &str) -> Result<Vec<CsvDefinitionKey>> {
    let mut found = Vec::new();
    for key in ALL_CSV_DEFINITIONS {
        let definition = key.definition();
        let records = definition.records(data)?;
        if !records.is_empty() && records.iter().all(|r| definition.validate(r)) {
            found.push(key);
        }
    }
    Ok(found)
}

/// Converts every row into an expense record using the layout named by `key`.
pub fn parse_with_definition(data: &str, key: CsvDefinitionKey) -> Result<Vec<Expense>> {
    let definition = key.definition();
    definition
        .records(data)?
        .iter()
        .enumerate()
        .map(|(i, record)| {
            definition
                .to_expense(record)
                .with_context(|| format!("Row {} does not match {key}", i + 1))
        })
        .collect()
}

fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExpenseTag;

    const WELLS_FARGO: &str = "Date,Description,Amount
01/05/2025,COFFEE SHOP,-4.50
01/06/2025,PAYROLL,2500.00
";

    const CAPITAL_ONE: &str = "Transaction Date,Description,Debit,Category
2025-02-01,GROCERY MART,82.10,Groceries
2025-02-03,STREAMING,15.99,
";

    #[test]
    fn test_key_wire_names() {
        assert_eq!(CsvDefinitionKey::WellsFargo.to_string(), "WellsFargo");
        assert_eq!(
            "CapitalOne".parse::<CsvDefinitionKey>().unwrap(),
            CsvDefinitionKey::CapitalOne
        );
    }

    #[test]
    fn test_matching() {
        assert_eq!(
            matching_definitions(WELLS_FARGO).unwrap(),
            vec![CsvDefinitionKey::WellsFargo]
        );
        assert_eq!(
            matching_definitions(CAPITAL_ONE).unwrap(),
            vec![CsvDefinitionKey::CapitalOne]
        );
        assert!(matching_definitions("a,b,c\n").unwrap().is_empty());
    }

    #[test]
    fn test_wells_fargo_amounts_are_inverted() {
        let expenses = parse_with_definition(WELLS_FARGO, CsvDefinitionKey::WellsFargo).unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].amount(), 4.5);
        assert_eq!(expenses[0].date(), "2025-01-05T00:00:00");
        assert_eq!(expenses[1].amount(), -2500.0);
        assert!(expenses[0].is_untagged());
    }

    #[test]
    fn test_capital_one_reads_category() {
        let expenses = parse_with_definition(CAPITAL_ONE, CsvDefinitionKey::CapitalOne).unwrap();
        assert_eq!(expenses[0].tags(), &[Tag::from(ExpenseTag::Groceries)]);
        assert!(expenses[1].is_untagged());
        assert_eq!(expenses[1].amount(), 15.99);
    }

    #[test]
    fn test_wrong_layout_is_an_error() {
        assert!(parse_with_definition(WELLS_FARGO, CsvDefinitionKey::CapitalOne).is_err());
    }
}
