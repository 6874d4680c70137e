//! Local task storage and query engine for tickwise.
//!
//! This crate owns everything between the plain records in `tickwise_model`
//! and the command line:
//!
//! - [`Database`] and [`DatabaseFile`]: the in-memory task table and its JSON file.
//! - [`TaskStorage`] and [`LocalStorage`]: the storage contract and its local implementation.
//! - [`recurrence`]: next-occurrence calculation and pattern validation.
//! - [`TaskStore`]: task operations, including recurring instance edits.
//! - [`filter`]: the task query language.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tickwise_model::models::Task;

pub mod error;
pub mod filter;
pub mod recurrence;
mod storage;
mod store;
mod task_store;

pub use error::{Result, StoreError};
pub use recurrence::RecurrenceError;
pub use storage::{IndexedField, LocalStorage, TaskStorage, WriteOp};
pub use store::{DatabaseFile, DatabaseFileError};
pub use task_store::{CompletionResult, InstanceChange, TaskStore};

/// Current on-disk schema version.
pub const DATABASE_VERSION: u32 = 1;

/// The task table.
///
/// Tasks keep insertion order. Lookups by id go through an index that is
/// rebuilt after deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    /// Schema version of the file this was loaded from.
    #[serde(default = "default_version")]
    pub version: u32,

    /// All tasks, in insertion order.
    #[serde(default)]
    tasks: Vec<Task>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

fn default_version() -> u32 {
    DATABASE_VERSION
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Database {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.tasks == other.tasks
    }
}

impl Database {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self {
            version: DATABASE_VERSION,
            tasks: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Rebuilds the id index from the task list.
    ///
    /// Must be called after deserializing. Later duplicates of an id win.
    pub fn rebuild_indexes(&mut self) {
        self.index = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| (task.id.clone(), i))
            .collect();
    }

    /// Returns all tasks.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if there are no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns true if a task with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Looks up a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|&i| &self.tasks[i])
    }

    /// Looks up a task by id for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        match self.index.get(id) {
            Some(&i) => self.tasks.get_mut(i),
            None => None,
        }
    }

    /// Inserts a task, replacing any existing task with the same id.
    pub fn insert(&mut self, task: Task) {
        match self.index.get(&task.id) {
            Some(&i) => self.tasks[i] = task,
            None => {
                self.index.insert(task.id.clone(), self.tasks.len());
                self.tasks.push(task);
            }
        }
    }

    /// Removes a task by id, returning it.
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let i = self.index.remove(id)?;
        let task = self.tasks.remove(i);
        self.rebuild_indexes();
        Some(task)
    }
}
