//! Types that represent the core data model, such as `Expense`, `Tag` and `BrushRange`.
mod date;
mod expense;
mod range;
mod settings;
mod tag;

pub use date::{
    format_record_date, from_local_millis, local_millis, parse_record_date, RECORD_DATE_FORMAT,
};
pub use expense::{content_id, Expense};
pub use range::BrushRange;
pub use settings::{Selection, Settings};
pub use tag::{
    ExpenseTag, KnownTag, NonExpenseTag, Tag, ALL_EXPENSE_TAGS, ALL_NON_EXPENSE_TAGS,
};
