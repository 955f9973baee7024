//! Append-only interning tables.
//!
//! Every value handed to `add` gets a small integer id, issued in insertion
//! order starting at 0. Adding a value equal to one already stored hands back
//! the id it got the first time; ids never change and values are never
//! removed.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Clone, Debug)]
pub struct IndexedTable<T> {
    values: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T> Default for IndexedTable<T> {
    fn default() -> Self {
        IndexedTable { values: Vec::new(), index: HashMap::new() }
    }
}

impl<T: Clone + Eq + Hash> IndexedTable<T> {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, v: T) -> usize {
        if let Some(&id) = self.index.get(&v) {
            return id;
        }
        let id = self.values.len();
        self.index.insert(v.clone(), id);
        self.values.push(v);
        id
    }

    pub fn id_of(&self, v: &T) -> Option<usize> {
        self.index.get(v).copied()
    }
}

impl<T> IndexedTable<T> {
    pub fn get(&self, id: usize) -> Option<&T> {
        self.values.get(id)
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Values in insertion order; calling this again restarts from id 0.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }
}

impl<T> std::ops::Index<usize> for IndexedTable<T> {
    type Output = T;
    fn index(&self, id: usize) -> &T {
        &self.values[id]
    }
}

impl<'a, T> IntoIterator for &'a IndexedTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter { self.values.iter() }
}

impl<T: Clone + Eq + Hash> FromIterator<T> for IndexedTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = IndexedTable::new();
        for v in iter {
            table.add(v);
        }
        table
    }
}

// This is a trick: we have the source code for our tests under a single
// `src/tests/` subdirectory, but we declare it as a module *here*, under this
// module. That way, it has access to private state that a sibling module
// would not have access to.
#[cfg(test)]
#[path = "tests/table.rs"]
mod tests_for_table;
