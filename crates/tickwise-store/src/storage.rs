//! Storage contract and the local JSON-backed implementation.

use std::fmt;

use chrono::Utc;
use tickwise_model::models::{Task, TaskUpdate};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::store::DatabaseFile;
use crate::Database;

/// Task fields that support equality lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexedField {
    ProjectId,
    SectionId,
    ParentTaskId,
    CreatedBy,
    /// Matches when the value is one of the task's assignees.
    Assignee,
    /// Matches when the value is one of the task's labels.
    Label,
}

impl IndexedField {
    /// Returns the field name as used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexedField::ProjectId => "project_id",
            IndexedField::SectionId => "section_id",
            IndexedField::ParentTaskId => "parent_task_id",
            IndexedField::CreatedBy => "created_by",
            IndexedField::Assignee => "assignee",
            IndexedField::Label => "label",
        }
    }

    /// Returns true if `task` carries `value` in this field.
    pub fn matches(&self, task: &Task, value: &str) -> bool {
        match self {
            IndexedField::ProjectId => task.project_id.as_deref() == Some(value),
            IndexedField::SectionId => task.section_id.as_deref() == Some(value),
            IndexedField::ParentTaskId => task.parent_task_id.as_deref() == Some(value),
            IndexedField::CreatedBy => task.created_by.as_deref() == Some(value),
            IndexedField::Assignee => task.assignees.iter().any(|a| a == value),
            IndexedField::Label => task.labels.contains(value),
        }
    }
}

impl fmt::Display for IndexedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One write inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Adds a new task. Fails if the id is taken.
    Insert(Task),
    /// Applies a partial update to an existing task.
    Update { id: String, update: TaskUpdate },
    /// Removes an existing task.
    Delete(String),
}

impl WriteOp {
    /// Returns the id of the task this operation touches.
    pub fn task_id(&self) -> &str {
        match self {
            WriteOp::Insert(task) => &task.id,
            WriteOp::Update { id, .. } => id,
            WriteOp::Delete(id) => id,
        }
    }

    fn apply(self, db: &mut Database) -> Result<()> {
        match self {
            WriteOp::Insert(task) => {
                if db.contains(&task.id) {
                    return Err(StoreError::Duplicate { id: task.id });
                }
                db.insert(task);
            }
            WriteOp::Update { id, update } => {
                let task = db.get_mut(&id).ok_or_else(|| StoreError::not_found(&id))?;
                update.apply_to(task);
                task.updated_at = Utc::now();
            }
            WriteOp::Delete(id) => {
                db.remove(&id).ok_or_else(|| StoreError::not_found(&id))?;
            }
        }
        Ok(())
    }
}

/// The storage operations the task store needs.
///
/// Single-record writes have default implementations in terms of
/// [`apply_batch`](TaskStorage::apply_batch), which must apply all of its
/// operations or none.
#[allow(async_fn_in_trait)]
pub trait TaskStorage {
    /// Returns every task.
    async fn get_all(&self) -> Result<Vec<Task>>;

    /// Returns the task with `id`, if any.
    async fn get_by_id(&self, id: &str) -> Result<Option<Task>>;

    /// Returns tasks whose `field` equals (or contains) `value`.
    async fn query_by_field(&self, field: IndexedField, value: &str) -> Result<Vec<Task>>;

    /// Applies `ops` atomically, in order.
    async fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<()>;

    /// Adds a task.
    async fn insert(&self, task: Task) -> Result<()> {
        self.apply_batch(vec![WriteOp::Insert(task)]).await
    }

    /// Applies a partial update to a task.
    async fn update(&self, id: &str, update: TaskUpdate) -> Result<()> {
        self.apply_batch(vec![WriteOp::Update {
            id: id.to_string(),
            update,
        }])
        .await
    }

    /// Removes a task.
    async fn delete(&self, id: &str) -> Result<()> {
        self.apply_batch(vec![WriteOp::Delete(id.to_string())]).await
    }
}

/// Storage over an in-memory [`Database`], optionally persisted to a
/// [`DatabaseFile`].
///
/// A batch is applied to a copy of the table, written to disk, and only then
/// swapped in, so a failed write leaves memory and disk as they were.
#[derive(Debug, Default)]
pub struct LocalStorage {
    db: RwLock<Database>,
    file: Option<DatabaseFile>,
}

impl LocalStorage {
    /// Creates an empty storage that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Wraps an existing table without a backing file.
    pub fn from_database(db: Database) -> Self {
        Self {
            db: RwLock::new(db),
            file: None,
        }
    }

    /// Loads `file`, starting empty if it does not exist yet.
    pub async fn open(file: DatabaseFile) -> Result<Self> {
        let db = file.load_or_default_async().await?;
        tracing::debug!(path = %file.path().display(), tasks = db.len(), "opened database");
        Ok(Self {
            db: RwLock::new(db),
            file: Some(file),
        })
    }

    /// Returns the backing file, if any.
    pub fn file(&self) -> Option<&DatabaseFile> {
        self.file.as_ref()
    }

    /// Returns a copy of the current table.
    pub async fn snapshot(&self) -> Database {
        self.db.read().await.clone()
    }
}

impl TaskStorage for LocalStorage {
    async fn get_all(&self) -> Result<Vec<Task>> {
        Ok(self.db.read().await.tasks().to_vec())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.db.read().await.get(id).cloned())
    }

    async fn query_by_field(&self, field: IndexedField, value: &str) -> Result<Vec<Task>> {
        let db = self.db.read().await;
        Ok(db
            .tasks()
            .iter()
            .filter(|task| field.matches(task, value))
            .cloned()
            .collect())
    }

    async fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let mut guard = self.db.write().await;
        let mut next = guard.clone();
        let count = ops.len();
        for op in ops {
            op.apply(&mut next)?;
        }

        if let Some(file) = &self.file {
            file.save_async(&next).await?;
        }

        *guard = next;
        tracing::debug!(ops = count, "applied write batch");
        Ok(())
    }
}
