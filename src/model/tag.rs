//! Tags attached to expense records.
//!
//! A tag is either one of the known categories, which the aggregation code reasons about, or a
//! free-form string chosen by the user. Both render to, and parse from, a single string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The known spending categories.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ExpenseTag {
    Food,
    Gas,
    Groceries,
    Rent,
    Utilities,
    Entertainment,
    Shopping,
    Travel,
    Health,
    Transportation,
    Subscriptions,
    Other,
}

/// Every known spending category, in display order.
pub const ALL_EXPENSE_TAGS: [ExpenseTag; 12] = [
    ExpenseTag::Food,
    ExpenseTag::Gas,
    ExpenseTag::Groceries,
    ExpenseTag::Rent,
    ExpenseTag::Utilities,
    ExpenseTag::Entertainment,
    ExpenseTag::Shopping,
    ExpenseTag::Travel,
    ExpenseTag::Health,
    ExpenseTag::Transportation,
    ExpenseTag::Subscriptions,
    ExpenseTag::Other,
];

impl ExpenseTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ExpenseTag::Food => "Food",
            ExpenseTag::Gas => "Gas",
            ExpenseTag::Groceries => "Groceries",
            ExpenseTag::Rent => "Rent",
            ExpenseTag::Utilities => "Utilities",
            ExpenseTag::Entertainment => "Entertainment",
            ExpenseTag::Shopping => "Shopping",
            ExpenseTag::Travel => "Travel",
            ExpenseTag::Health => "Health",
            ExpenseTag::Transportation => "Transportation",
            ExpenseTag::Subscriptions => "Subscriptions",
            ExpenseTag::Other => "Other",
        }
    }
}

/// Categories that mark money which is not spending.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum NonExpenseTag {
    Income,
    Savings,
    /// Vested stock compensation. Recorded as an inflow but treated as a savings outflow.
    Rsu,
    /// Pre-tax retirement deductions.
    Retirement,
}

pub const ALL_NON_EXPENSE_TAGS: [NonExpenseTag; 4] = [
    NonExpenseTag::Income,
    NonExpenseTag::Savings,
    NonExpenseTag::Rsu,
    NonExpenseTag::Retirement,
];

impl NonExpenseTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NonExpenseTag::Income => "Income",
            NonExpenseTag::Savings => "Savings",
            NonExpenseTag::Rsu => "RSU",
            NonExpenseTag::Retirement => "Retirement",
        }
    }
}

/// A tag with special meaning to the application.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum KnownTag {
    Expense(ExpenseTag),
    NonExpense(NonExpenseTag),
}

impl KnownTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            KnownTag::Expense(t) => t.as_str(),
            KnownTag::NonExpense(t) => t.as_str(),
        }
    }

    fn parse(s: &str) -> Option<Self> {
        if let Some(t) = ALL_EXPENSE_TAGS.iter().find(|t| t.as_str() == s) {
            return Some(KnownTag::Expense(*t));
        }
        ALL_NON_EXPENSE_TAGS
            .iter()
            .find(|t| t.as_str() == s)
            .map(|t| KnownTag::NonExpense(*t))
    }
}

/// A label on an expense record. Serialized as a plain string.
///
/// ```
/// # use spendscope::model::{ExpenseTag, Tag};
/// let known: Tag = "Food".into();
/// assert_eq!(known, Tag::from(ExpenseTag::Food));
/// let custom: Tag = "Vacation 2025".into();
/// assert!(custom.is_custom());
/// assert_eq!(custom.to_string(), "Vacation 2025");
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Tag {
    Known(KnownTag),
    Custom(String),
}

impl Tag {
    pub fn as_str(&self) -> &str {
        match self {
            Tag::Known(known) => known.as_str(),
            Tag::Custom(s) => s.as_str(),
        }
    }

    pub fn known(&self) -> Option<KnownTag> {
        match self {
            Tag::Known(known) => Some(*known),
            Tag::Custom(_) => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Tag::Custom(_))
    }

    /// Returns the spending category if this is one of the known expense tags.
    pub fn expense_tag(&self) -> Option<ExpenseTag> {
        match self {
            Tag::Known(KnownTag::Expense(t)) => Some(*t),
            _ => None,
        }
    }

    pub fn is(&self, tag: NonExpenseTag) -> bool {
        matches!(self, Tag::Known(KnownTag::NonExpense(t)) if *t == tag)
    }
}

impl From<ExpenseTag> for Tag {
    fn from(value: ExpenseTag) -> Self {
        Tag::Known(KnownTag::Expense(value))
    }
}

impl From<NonExpenseTag> for Tag {
    fn from(value: NonExpenseTag) -> Self {
        Tag::Known(KnownTag::NonExpense(value))
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        match KnownTag::parse(value) {
            Some(known) => Tag::Known(known),
            None => Tag::Custom(value.to_string()),
        }
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        match KnownTag::parse(&value) {
            Some(known) => Tag::Known(known),
            None => Tag::Custom(value),
        }
    }
}

impl FromStr for Tag {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tag::from(s))
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Tag::from(String::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_round_trip_through_strings() {
        for t in ALL_EXPENSE_TAGS {
            assert_eq!(Tag::from(t.as_str()), Tag::from(t));
        }
        for t in ALL_NON_EXPENSE_TAGS {
            assert_eq!(Tag::from(t.as_str()), Tag::from(t));
        }
    }

    #[test]
    fn test_rsu_is_upper_case_on_the_wire() {
        let json = serde_json::to_string(&Tag::from(NonExpenseTag::Rsu)).unwrap();
        assert_eq!(json, r#""RSU""#);
        let tag: Tag = serde_json::from_str(r#""RSU""#).unwrap();
        assert!(tag.is(NonExpenseTag::Rsu));
    }

    #[test]
    fn test_unknown_strings_are_custom() {
        let tag: Tag = serde_json::from_str(r#""Kids""#).unwrap();
        assert_eq!(tag, Tag::Custom("Kids".to_string()));
        assert!(tag.known().is_none());
        assert!(tag.expense_tag().is_none());
    }

    #[test]
    fn test_tag_matching_is_case_sensitive() {
        assert!(Tag::from("food").is_custom());
        assert!(!Tag::from("Food").is_custom());
    }
}
