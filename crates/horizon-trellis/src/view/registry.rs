//! Id-keyed child registries.

use horizon_trellis_core::{ChildKind, Error, Result};

/// An insertion-ordered id → child table that rejects duplicate ids.
#[derive(Debug)]
pub(crate) struct Registry<T> {
    kind: ChildKind,
    entries: Vec<(String, T)>,
}

impl<T: Clone> Registry<T> {
    pub(crate) fn new(kind: ChildKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Fail with `DuplicateChildId` if `id` is taken.
    pub(crate) fn check_vacant(&self, id: &str) -> Result<()> {
        if self.contains(id) {
            return Err(Error::duplicate_child(self.kind, id));
        }
        Ok(())
    }

    /// Register `value` under `id`. The existing entry is left untouched on
    /// collision.
    pub(crate) fn insert(&mut self, id: &str, value: T) -> Result<()> {
        self.check_vacant(id)?;
        self.entries.push((id.to_string(), value));
        Ok(())
    }

    pub(crate) fn get(&self, id: &str) -> Option<T> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, value)| value.clone())
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == id)
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.entries.iter().position(|(key, _)| key == id)?;
        Some(self.entries.remove(index).1)
    }

    /// Remove the first entry matching `predicate`.
    pub(crate) fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) -> Option<(String, T)> {
        let index = self.entries.iter().position(|(_, value)| predicate(value))?;
        Some(self.entries.remove(index))
    }

    pub(crate) fn drain(&mut self) -> Vec<(String, T)> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn entries(&self) -> Vec<(String, T)> {
        self.entries.clone()
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
