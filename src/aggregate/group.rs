use crate::aggregate::{GroupKey, KeyFn};
use std::collections::HashMap;
use std::hash::Hash;

/// A map that remembers the order in which keys were first inserted.
#[derive(Debug, Clone)]
pub struct Groups<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for Groups<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K, V> PartialEq for Groups<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K, V> Groups<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// The value under `key`, inserting `V::default()` first if the key is new.
    pub fn entry(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let i = match self.index.get(&key) {
            Some(i) => *i,
            None => {
                self.entries.push((key.clone(), V::default()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|i| &self.entries[*i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Replaces every value, keeping the key order.
    pub fn map_values<W>(self, mut f: impl FnMut(V) -> W) -> Groups<K, W> {
        Groups {
            entries: self.entries.into_iter().map(|(k, v)| (k, f(v))).collect(),
            index: self.index,
        }
    }
}

impl<K, V> IntoIterator for Groups<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Buckets `items` under every key `key_fn` returns for them. An item with several keys appears
/// in each of those groups; an item with none appears in no group. Within a group, items keep
/// their original relative order.
pub fn group_by<T>(items: &[T], key_fn: &KeyFn<T>) -> Groups<GroupKey, Vec<T>>
where
    T: Clone,
{
    let mut groups: Groups<GroupKey, Vec<T>> = Groups::new();
    for item in items {
        for key in key_fn(item) {
            groups.entry(key).push(item.clone());
        }
    }
    groups
}

/// The result of grouping by zero or more key functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Grouped<T> {
    /// The records of one innermost group.
    Leaf(Vec<T>),
    /// One level of grouping.
    Node(Groups<GroupKey, Grouped<T>>),
}

impl<T> From<Groups<GroupKey, Vec<T>>> for Grouped<T> {
    fn from(groups: Groups<GroupKey, Vec<T>>) -> Self {
        Grouped::Node(groups.map_values(Grouped::Leaf))
    }
}

/// Groups by the first key function, then each group by the next, and so on. With no key
/// functions the items come back unchanged as a single leaf.
pub fn group_by_multiple<T>(items: &[T], key_fns: &[&KeyFn<T>]) -> Grouped<T>
where
    T: Clone,
{
    match key_fns.split_first() {
        None => Grouped::Leaf(items.to_vec()),
        Some((first, rest)) => {
            let grouped = group_by(items, *first);
            Grouped::Node(grouped.map_values(|members| group_by_multiple(&members, rest)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{by_month, by_tag};
    use crate::model::{Expense, Tag};

    fn record(id: &str, tags: &[&str], date: &str) -> Expense {
        Expense::new(
            id,
            1.0,
            tags.iter().map(|t| Tag::from(*t)).collect(),
            date,
            "",
        )
    }

    fn labels<V>(groups: &Groups<GroupKey, V>) -> Vec<&str> {
        groups.keys().map(GroupKey::label).collect()
    }

    #[test]
    fn test_every_keyed_item_lands_in_its_groups() {
        let items = vec![
            record("a", &["Food"], "2025-01-01"),
            record("b", &["Food", "Travel"], "2025-01-02"),
            record("c", &[], "2025-01-03"),
            record("d", &["Travel"], "2025-01-04"),
        ];
        let groups = group_by(&items, &by_tag);
        assert_eq!(labels(&groups), vec!["Food", "Travel"]);
        let food: Vec<&str> = groups
            .get(&GroupKey::tag(&Tag::from("Food")))
            .unwrap()
            .iter()
            .map(Expense::id)
            .collect();
        assert_eq!(food, vec!["a", "b"]);
        let travel: Vec<&str> = groups
            .get(&GroupKey::tag(&Tag::from("Travel")))
            .unwrap()
            .iter()
            .map(Expense::id)
            .collect();
        assert_eq!(travel, vec!["b", "d"]);
        // Each record appears once per key it produced.
        let placed: usize = groups.iter().map(|(_, v)| v.len()).sum();
        let produced: usize = items.iter().map(|e| by_tag(e).len()).sum();
        assert_eq!(placed, produced);
    }

    #[test]
    fn test_no_key_functions_is_identity() {
        let items = vec![record("a", &[], "2025-01-01")];
        assert_eq!(group_by_multiple(&items, &[]), Grouped::Leaf(items.clone()));
    }

    #[test]
    fn test_nested_grouping() {
        let items = vec![
            record("a", &["Food"], "2025-01-10"),
            record("b", &["Food"], "2025-02-10"),
            record("c", &["Gas"], "2025-01-11"),
        ];
        let Grouped::Node(outer) = group_by_multiple(&items, &[&by_tag, &by_month]) else {
            panic!("expected a node");
        };
        assert_eq!(labels(&outer), vec!["Food", "Gas"]);
        let Some(Grouped::Node(food)) = outer.get(&GroupKey::tag(&Tag::from("Food"))) else {
            panic!("expected a node");
        };
        assert_eq!(labels(food), vec!["Jan 2025", "Feb 2025"]);
        assert!(food.iter().all(|(_, g)| matches!(g, Grouped::Leaf(v) if v.len() == 1)));
    }
}
