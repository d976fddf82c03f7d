use crate::model::date::{local_millis, parse_record_date};
use crate::model::{NonExpenseTag, Tag};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single financial record. A positive `amount` is money spent, a negative `amount` is money
/// received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    id: String,
    amount: f64,
    #[serde(default)]
    tags: Vec<Tag>,
    date: String,
    #[serde(default)]
    description: String,
}

impl Expense {
    pub fn new<S1, S2, S3>(id: S1, amount: f64, tags: Vec<Tag>, date: S2, description: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            id: id.into(),
            amount,
            tags,
            date: date.into(),
            description: description.into(),
        }
    }

    /// Creates a record whose id is derived from its description, date and amount. Two records
    /// with the same content always receive the same id.
    pub fn with_derived_id<S2, S3>(amount: f64, tags: Vec<Tag>, date: S2, description: S3) -> Self
    where
        S2: Into<String>,
        S3: Into<String>,
    {
        let date = date.into();
        let description = description.into();
        let id = content_id(&description, &date, amount);
        Self::new(id, amount, tags, date, description)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_tags(&mut self, tags: Vec<Tag>) {
        self.tags = tags;
    }

    pub fn has_tag(&self, tag: NonExpenseTag) -> bool {
        self.tags.iter().any(|t| t.is(tag))
    }

    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }

    /// True when no tag on the record is a known tag.
    pub fn is_custom_only(&self) -> bool {
        !self.tags.is_empty() && self.tags.iter().all(Tag::is_custom)
    }

    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        parse_record_date(&self.date)
    }

    /// Local-time epoch milliseconds of the record date, `None` if the date does not parse.
    pub fn timestamp_ms(&self) -> Option<i64> {
        self.parsed_date().and_then(local_millis)
    }

    /// The id this record would have if it were derived from its current content.
    pub fn content_id(&self) -> String {
        content_id(&self.description, &self.date, self.amount)
    }

    /// A copy of this record with the sign of `amount` flipped.
    pub fn inverted(&self) -> Self {
        let mut copy = self.clone();
        copy.amount = -copy.amount;
        copy
    }
}

/// Deterministic record id over `description:date:amount`.
pub fn content_id(description: &str, date: &str, amount: f64) -> String {
    let name = format!("{description}:{date}:{amount}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExpenseTag;

    #[test]
    fn test_derived_id_is_stable() {
        let a = Expense::with_derived_id(12.5, vec![], "2025-01-01T00:00:00", "Coffee");
        let b = Expense::with_derived_id(12.5, vec![ExpenseTag::Food.into()], "2025-01-01T00:00:00", "Coffee");
        assert_eq!(a.id(), b.id());
        let c = Expense::with_derived_id(12.0, vec![], "2025-01-01T00:00:00", "Coffee");
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id(), a.content_id());
    }

    #[test]
    fn test_custom_only() {
        let mut e = Expense::new("1", 5.0, vec![], "2025-01-01", "x");
        assert!(e.is_untagged());
        assert!(!e.is_custom_only());
        e.set_tags(vec!["Kids".into(), "Camp".into()]);
        assert!(e.is_custom_only());
        e.set_tags(vec!["Kids".into(), "Food".into()]);
        assert!(!e.is_custom_only());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"id":"a","amount":-3.5,"tags":["RSU","Kids"],"date":"2025-03-01T00:00:00","description":"vest"}"#;
        let e: Expense = serde_json::from_str(json).unwrap();
        assert!(e.has_tag(NonExpenseTag::Rsu));
        assert_eq!(e.inverted().amount(), 3.5);
        assert_eq!(serde_json::to_string(&e).unwrap(), json);
    }
}
