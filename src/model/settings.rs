use crate::model::{ExpenseTag, NonExpenseTag, Tag, ALL_EXPENSE_TAGS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User preferences shared by every window. Only ever replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    enabled_tags: BTreeSet<Tag>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut enabled_tags: BTreeSet<Tag> = ALL_EXPENSE_TAGS.iter().map(|t| Tag::from(*t)).collect();
        enabled_tags.insert(NonExpenseTag::Rsu.into());
        Self { enabled_tags }
    }
}

impl Settings {
    pub fn new<I>(enabled_tags: I) -> Self
    where
        I: IntoIterator<Item = Tag>,
    {
        Self {
            enabled_tags: enabled_tags.into_iter().collect(),
        }
    }

    pub fn enabled_tags(&self) -> &BTreeSet<Tag> {
        &self.enabled_tags
    }

    pub fn is_enabled(&self, tag: &Tag) -> bool {
        self.enabled_tags.contains(tag)
    }

    pub fn is_expense_enabled(&self, tag: ExpenseTag) -> bool {
        self.enabled_tags.contains(&Tag::from(tag))
    }

    pub fn rsu_enabled(&self) -> bool {
        self.enabled_tags.contains(&Tag::from(NonExpenseTag::Rsu))
    }

    /// Returns settings with `enabled_tags` replaced by the given set.
    pub fn replace<I>(&self, enabled_tags: I) -> Self
    where
        I: IntoIterator<Item = Tag>,
    {
        Self::new(enabled_tags)
    }
}

/// Ids of the records currently selected for a bulk edit.
pub type Selection = Vec<String>;
