//! Records - an ordered collection of live records.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::warn;

use super::Record;
use crate::error::{ModelError, SaveFailure};
use crate::schema::Schema;

/// Ordered, indexable group of records. Order is insertion order and is never
/// changed by `save`.
pub struct Records<T> {
    items: Vec<Record<T>>,
}

impl<T> Records<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, record: Record<T>) {
        self.items.push(record);
    }

    pub fn into_vec(self) -> Vec<Record<T>> {
        self.items
    }
}

impl<T: Schema> Records<T> {
    /// Save every record in order.
    ///
    /// Not atomic: a failing record does not stop the ones after it, and
    /// records saved before a failure stay saved. All failures are reported
    /// together in [`ModelError::Batch`].
    pub fn save(&mut self) -> Result<(), ModelError> {
        let attempted = self.items.len();
        let mut failures = Vec::new();

        for (index, record) in self.items.iter_mut().enumerate() {
            if let Err(error) = record.save() {
                warn!(model = %record.model_name(), index, %error, "record failed to save");
                failures.push(SaveFailure { index, error });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Batch {
                attempted,
                failures,
            })
        }
    }
}

impl<T> Default for Records<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Records<T> {
    type Target = [Record<T>];

    fn deref(&self) -> &[Record<T>] {
        &self.items
    }
}

impl<T> DerefMut for Records<T> {
    fn deref_mut(&mut self) -> &mut [Record<T>] {
        &mut self.items
    }
}

impl<T> FromIterator<Record<T>> for Records<T> {
    fn from_iter<I: IntoIterator<Item = Record<T>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<Record<T>> for Records<T> {
    fn extend<I: IntoIterator<Item = Record<T>>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> From<Vec<Record<T>>> for Records<T> {
    fn from(items: Vec<Record<T>>) -> Self {
        Self { items }
    }
}

impl<T> IntoIterator for Records<T> {
    type Item = Record<T>;
    type IntoIter = std::vec::IntoIter<Record<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Records<T> {
    type Item = &'a Record<T>;
    type IntoIter = std::slice::Iter<'a, Record<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Records<T> {
    type Item = &'a mut Record<T>;
    type IntoIter = std::slice::IterMut<'a, Record<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

impl<T: Clone> Clone for Records<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Records<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}
