use crate::store::{DebouncedReader, InstantReader, Subject};
use std::time::Duration;

/// State that lives only in this process. Cloning shares the value.
#[derive(Debug)]
pub struct LocalStore<T> {
    subject: Subject<T>,
    debounce: Duration,
}

impl<T> Clone for LocalStore<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            debounce: self.debounce,
        }
    }
}

impl<T> LocalStore<T>
where
    T: Clone + PartialEq,
{
    pub fn new(initial: T, debounce: Duration) -> Self {
        Self {
            subject: Subject::with_value(initial),
            debounce,
        }
    }

    pub fn get(&self) -> T
    where
        T: Default,
    {
        self.subject.current().unwrap_or_default()
    }

    /// Replaces the whole value. Returns whether it changed.
    pub fn set(&self, value: T) -> bool {
        self.subject.publish(value)
    }

    /// Replaces the value with one computed from the current value.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool
    where
        T: Default,
    {
        let next = f(&self.get());
        self.set(next)
    }

    pub fn instant(&self) -> InstantReader<T> {
        self.subject.instant()
    }

    pub fn debounced(&self) -> DebouncedReader<T> {
        self.subject.debounced(self.debounce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpenseTag, Settings, Tag};

    #[tokio::test]
    async fn test_clones_share_state() {
        let a = LocalStore::new(Settings::default(), Duration::from_millis(500));
        let b = a.clone();
        let mut reader = b.instant();
        assert!(a.set(Settings::new([Tag::from(ExpenseTag::Rent)])));
        let seen = reader.changed().await.unwrap();
        assert!(seen.is_expense_enabled(ExpenseTag::Rent));
        assert_eq!(b.get(), seen);
    }

    #[test]
    fn test_update() {
        let store: LocalStore<Vec<String>> = LocalStore::new(vec![], Duration::ZERO);
        store.update(|ids| {
            let mut ids = ids.clone();
            ids.push("a".to_string());
            ids
        });
        assert_eq!(store.get(), vec!["a".to_string()]);
        assert!(!store.update(|ids| ids.clone()));
    }
}
