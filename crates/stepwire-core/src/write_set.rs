//! Deferred writes for one substep
//!
//! State updates never touch the state directly. Each `(field, value)` they
//! produce is collected into a [`WriteSet`], which rejects a second write to
//! the same field and is applied in one go once every update has run. A
//! failing update therefore leaves no partially written snapshot behind.

use crate::error::{Error, Result};
use crate::{State, Value};
use serde::{Deserialize, Serialize};

/// A pending write of one state field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWrite {
    /// The state field to replace
    pub field: String,
    /// The new value
    pub value: Value,
    /// Label of the state update that produced it
    pub writer: String,
}

/// Ordered, conflict-free collection of pending writes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteSet {
    writes: Vec<PendingWrite>,
}

impl WriteSet {
    /// Create a new empty WriteSet
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pending write, failing if its field is already written
    pub fn push(&mut self, write: PendingWrite) -> Result<()> {
        if let Some(first) = self.writes.iter().find(|w| w.field == write.field) {
            return Err(Error::DuplicateFieldWrite {
                field: write.field,
                first: first.writer.clone(),
                second: write.writer,
            });
        }
        self.writes.push(write);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingWrite> {
        self.writes.iter()
    }

    /// Fields written, in write order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|w| w.field.as_str())
    }

    /// Produce the next snapshot: `base` with every written field replaced.
    ///
    /// Untouched fields pass through in their original order; fields absent
    /// from `base` are appended.
    pub fn apply(self, base: &State) -> State {
        let mut next = base.clone();
        for write in self.writes {
            next.insert(write.field, write.value);
        }
        next
    }
}
