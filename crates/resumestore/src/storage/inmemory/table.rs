//! Insertion-ordered table keyed by id.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

/// Rows ordered by first insertion. Overwriting a row keeps its position.
#[derive(Debug, Clone)]
pub(super) struct Table<T> {
    next_seq: u64,
    rows: BTreeMap<u64, T>,
    index: HashMap<Uuid, u64>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            rows: BTreeMap::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    pub fn get(&self, id: &Uuid) -> Option<&T> {
        self.index.get(id).and_then(|seq| self.rows.get(seq))
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.index.contains_key(id)
    }

    /// Inserts a new row or overwrites an existing one in place.
    pub fn upsert(&mut self, id: Uuid, row: T) {
        let seq = match self.index.get(&id) {
            Some(seq) => *seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.index.insert(id, seq);
                seq
            }
        };
        self.rows.insert(seq, row);
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<T> {
        let seq = self.index.remove(id)?;
        self.rows.remove(&seq)
    }

    /// Rows in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    /// Removes every row matching the predicate and returns how many went.
    pub fn remove_where(
        &mut self,
        mut predicate: impl FnMut(&T) -> bool,
        id_of: impl Fn(&T) -> Uuid,
    ) -> usize {
        let doomed: Vec<Uuid> = self
            .rows
            .values()
            .filter(|row| predicate(*row))
            .map(&id_of)
            .collect();
        for id in &doomed {
            self.remove(id);
        }
        doomed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_keeps_original_position() {
        let mut table = Table::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        table.upsert(a, "a1");
        table.upsert(b, "b1");
        table.upsert(a, "a2");

        let rows: Vec<_> = table.values().copied().collect();
        assert_eq!(rows, vec!["a2", "b1"]);
    }

    #[test]
    fn test_remove_then_reinsert_appends() {
        let mut table = Table::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        table.upsert(a, "a");
        table.upsert(b, "b");
        assert_eq!(table.remove(&a), Some("a"));
        table.upsert(a, "a");

        let rows: Vec<_> = table.values().copied().collect();
        assert_eq!(rows, vec!["b", "a"]);
        assert!(table.contains(&a));
    }

    #[test]
    fn test_remove_where() {
        let mut table = Table::default();
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            table.upsert(*id, (*id, i));
        }

        let removed = table.remove_where(|(_, i)| i % 2 == 0, |(id, _)| *id);

        assert_eq!(removed, 2);
        assert!(table.get(&ids[0]).is_none());
        assert!(table.get(&ids[1]).is_some());
    }
}
