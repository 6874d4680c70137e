//! Task operations, including recurring-instance edits.
//!
//! [`TaskStore`] sits on top of any [`TaskStorage`] and serializes writes per
//! task id. Every operation that touches more than one record goes through a
//! single [`TaskStorage::apply_batch`] call.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use tickwise_model::models::{EditMode, NewTask, RecurrencePattern, Task, TaskUpdate};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::filter::{apply_advanced_filter, FilterContext};
use crate::recurrence;
use crate::storage::{IndexedField, TaskStorage, WriteOp};

/// Shortest id prefix accepted by [`TaskStore::resolve_id`].
pub const MIN_PREFIX_LEN: usize = 4;

/// Outcome of completing a task.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResult {
    /// A plain task (or a series with no further occurrence) was completed.
    Single(Task),
    /// A recurring task was completed and its successor created.
    Recurring {
        /// The record that was closed.
        completed: Task,
        /// The new open record due on the next occurrence.
        next: Task,
    },
    /// Nothing to do: the task was already completed, or is not recurring
    /// when a recurring completion was requested.
    Unchanged,
}

/// Outcome of editing or deleting one occurrence of a recurring task.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceChange {
    /// The task has no recurrence, or the date is not an occurrence.
    Unchanged,
    /// A standalone copy replaced the occurrence; the anchor skips that date.
    Materialized {
        /// The new standalone task.
        standalone: Task,
        /// The anchor after gaining the exception.
        anchor: Task,
    },
    /// The occurrence was skipped.
    ExceptionAdded(Task),
    /// The series now ends the day before the occurrence.
    Truncated(Task),
    /// The overrides were applied to the anchor.
    Updated(Task),
    /// The anchor was deleted.
    Deleted(String),
}

/// Task operations over a storage backend.
///
/// # Example
///
/// ```
/// use tickwise_model::models::NewTask;
/// use tickwise_store::{LocalStorage, TaskStore};
///
/// # tokio_test_block(async {
/// let store = TaskStore::new(LocalStorage::in_memory());
/// let task = store.add_task(NewTask::new("Water plants")).await?;
/// assert_eq!(store.get_task(&task.id).await?.content, "Water plants");
/// # Ok::<(), tickwise_store::StoreError>(())
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct TaskStore<S> {
    storage: S,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: TaskStorage> TaskStore<S> {
    /// Creates a store over `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ==================== Locking ====================

    async fn lock(&self, id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.locks.lock().await;
            Arc::clone(table.entry(id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    async fn forget_locks(&self, ids: &[String]) {
        let mut table = self.locks.lock().await;
        for id in ids {
            table.remove(id);
        }
    }

    async fn fetch(&self, id: &str) -> Result<Task> {
        self.storage
            .get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found(id))
    }

    // ==================== Plain Tasks ====================

    /// Adds a task.
    ///
    /// A recurring task without a due date is due on its first occurrence.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` for a malformed recurrence, `NotFound` for a missing
    /// parent.
    pub async fn add_task(&self, new_task: NewTask) -> Result<Task> {
        if let Some(pattern) = &new_task.recurrence {
            recurrence::validate_pattern(pattern)?;
        }
        if let Some(parent) = &new_task.parent_task_id {
            self.fetch(parent).await?;
        }

        let mut task = new_task.into_task(Uuid::new_v4().to_string(), Utc::now());
        if task.due_date.is_none() {
            if let Some(pattern) = &task.recurrence {
                task.due_date = recurrence::next_occurrence(pattern.start_date, pattern);
            }
        }

        self.storage.insert(task.clone()).await?;
        tracing::debug!(id = %task.id, "added task");
        Ok(task)
    }

    /// Returns a task by exact id.
    pub async fn get_task(&self, id: &str) -> Result<Task> {
        self.fetch(id).await
    }

    /// Returns every task.
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.storage.get_all().await
    }

    /// Applies a partial update and returns the updated task.
    pub async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        let _guard = self.lock(id).await;

        if let Some(Some(pattern)) = &update.recurrence {
            recurrence::validate_pattern(pattern)?;
        }
        if let Some(Some(parent)) = &update.parent_task_id {
            self.fetch(parent).await?;
        }
        if update.is_empty() {
            return self.fetch(id).await;
        }

        self.storage.update(id, update).await?;
        self.fetch(id).await
    }

    /// Deletes a task and its direct subtasks, returning the deleted ids.
    pub async fn delete_task(&self, id: &str) -> Result<Vec<String>> {
        let guard = self.lock(id).await;
        self.fetch(id).await?;
        let ids = self.delete_with_subtasks(id).await?;
        drop(guard);

        self.forget_locks(&ids).await;
        Ok(ids)
    }

    async fn delete_with_subtasks(&self, id: &str) -> Result<Vec<String>> {
        let mut ids = vec![id.to_string()];
        ids.extend(
            self.storage
                .query_by_field(IndexedField::ParentTaskId, id)
                .await?
                .into_iter()
                .map(|task| task.id),
        );

        let ops = ids.iter().cloned().map(WriteOp::Delete).collect();
        self.storage.apply_batch(ops).await?;
        tracing::debug!(id, deleted = ids.len(), "deleted task");
        Ok(ids)
    }

    /// Completes a task.
    ///
    /// Recurring tasks spawn their successor, see
    /// [`complete_recurring_task`](Self::complete_recurring_task).
    pub async fn complete_task(&self, id: &str) -> Result<CompletionResult> {
        let _guard = self.lock(id).await;
        let task = self.fetch(id).await?;

        if task.completed {
            tracing::debug!(id, "task already completed");
            return Ok(CompletionResult::Unchanged);
        }
        if task.is_recurring() {
            return self.complete_occurrence(task).await;
        }
        self.close(task).await.map(CompletionResult::Single)
    }

    /// Reopens a completed task.
    pub async fn reopen_task(&self, id: &str) -> Result<Task> {
        let _guard = self.lock(id).await;
        let task = self.fetch(id).await?;
        if !task.completed {
            return Ok(task);
        }

        let update = TaskUpdate {
            completed: Some(false),
            completed_at: Some(None),
            ..Default::default()
        };
        self.storage.update(id, update).await?;
        self.fetch(id).await
    }

    async fn close(&self, task: Task) -> Result<Task> {
        self.storage.apply_batch(vec![close_op(&task.id)]).await?;
        self.fetch(&task.id).await
    }

    // ==================== Recurring Tasks ====================

    /// Completes the current occurrence of a recurring task.
    ///
    /// The next occurrence is searched from the day after the due date (or
    /// from today when there is none). If one exists, a copy of the task due
    /// on that date is created in the same batch that closes this one. If the
    /// series has ended, the task is simply completed.
    pub async fn complete_recurring_task(&self, id: &str) -> Result<CompletionResult> {
        let _guard = self.lock(id).await;
        let task = self.fetch(id).await?;

        if task.completed || !task.is_recurring() {
            tracing::debug!(id, "nothing to complete in series");
            return Ok(CompletionResult::Unchanged);
        }
        self.complete_occurrence(task).await
    }

    async fn complete_occurrence(&self, task: Task) -> Result<CompletionResult> {
        let Some(pattern) = &task.recurrence else {
            return Ok(CompletionResult::Unchanged);
        };

        let from = match task.due_date {
            Some(due) => due.succ_opt(),
            None => Some(today()),
        };
        let Some(next_date) = from.and_then(|from| recurrence::next_occurrence(from, pattern))
        else {
            tracing::debug!(id = %task.id, "series has ended, completing without successor");
            return self.close(task).await.map(CompletionResult::Single);
        };

        let mut next = spawn_copy(&task);
        next.due_date = Some(next_date);

        self.storage
            .apply_batch(vec![close_op(&task.id), WriteOp::Insert(next.clone())])
            .await?;
        tracing::info!(
            id = %task.id,
            next_id = %next.id,
            due = %next_date,
            "spawned next occurrence"
        );

        let completed = self.fetch(&task.id).await?;
        Ok(CompletionResult::Recurring { completed, next })
    }

    /// Edits the occurrence of `id` on `instance_date`.
    ///
    /// - `Single`: a standalone copy due on `instance_date` (unless the
    ///   overrides set another date) carries the overrides, and the anchor
    ///   skips that date from now on.
    /// - `Future`: the series ends the day before `instance_date`; the
    ///   overrides are not applied. At or before the series start this is the
    ///   same as `All`.
    /// - `All`: the overrides are applied to the anchor.
    pub async fn edit_recurring_instance(
        &self,
        id: &str,
        instance_date: NaiveDate,
        mode: EditMode,
        overrides: TaskUpdate,
    ) -> Result<InstanceChange> {
        let _guard = self.lock(id).await;
        let anchor = self.fetch(id).await?;
        if anchor.completed {
            tracing::debug!(id, "edit skipped: series record is completed");
            return Ok(InstanceChange::Unchanged);
        }
        let Some(pattern) = anchor.recurrence.clone() else {
            tracing::debug!(id, "edit skipped: task is not recurring");
            return Ok(InstanceChange::Unchanged);
        };

        match mode {
            EditMode::Single => self.materialize(anchor, pattern, instance_date, overrides).await,
            EditMode::Future if instance_date > pattern.start_date => {
                self.truncate(&anchor, pattern, instance_date).await
            }
            EditMode::Future | EditMode::All => self.update_series(&anchor, overrides).await,
        }
    }

    /// Deletes the occurrence of `id` on `instance_date`.
    ///
    /// - `Single`: the anchor skips that date.
    /// - `Future`: the series ends the day before `instance_date`. At or
    ///   before the series start this is the same as `All`.
    /// - `All`: the anchor and its direct subtasks are deleted.
    pub async fn delete_recurring_instance(
        &self,
        id: &str,
        instance_date: NaiveDate,
        mode: EditMode,
    ) -> Result<InstanceChange> {
        let guard = self.lock(id).await;
        let anchor = self.fetch(id).await?;
        if anchor.completed {
            tracing::debug!(id, "delete skipped: series record is completed");
            return Ok(InstanceChange::Unchanged);
        }
        let Some(mut pattern) = anchor.recurrence.clone() else {
            tracing::debug!(id, "delete skipped: task is not recurring");
            return Ok(InstanceChange::Unchanged);
        };

        match mode {
            EditMode::Single => {
                if !is_open_occurrence(&pattern, instance_date) {
                    tracing::debug!(id, date = %instance_date, "not an open occurrence");
                    return Ok(InstanceChange::Unchanged);
                }
                pattern.add_exception(instance_date);
                let update = exception_update(&anchor, pattern, instance_date);
                self.storage.update(id, update).await?;
                tracing::debug!(id, date = %instance_date, "skipped occurrence");
                Ok(InstanceChange::ExceptionAdded(self.fetch(id).await?))
            }
            EditMode::Future if instance_date > pattern.start_date => {
                self.truncate(&anchor, pattern, instance_date).await
            }
            EditMode::Future | EditMode::All => {
                let ids = self.delete_with_subtasks(id).await?;
                drop(guard);
                self.forget_locks(&ids).await;
                Ok(InstanceChange::Deleted(id.to_string()))
            }
        }
    }

    async fn materialize(
        &self,
        anchor: Task,
        mut pattern: RecurrencePattern,
        instance_date: NaiveDate,
        overrides: TaskUpdate,
    ) -> Result<InstanceChange> {
        if !is_open_occurrence(&pattern, instance_date) {
            tracing::debug!(id = %anchor.id, date = %instance_date, "not an open occurrence");
            return Ok(InstanceChange::Unchanged);
        }

        let mut standalone = spawn_copy(&anchor);
        standalone.due_date = Some(instance_date);
        overrides.apply_to(&mut standalone);
        standalone.recurrence = None;

        pattern.add_exception(instance_date);
        let anchor_update = exception_update(&anchor, pattern, instance_date);

        self.storage
            .apply_batch(vec![
                WriteOp::Insert(standalone.clone()),
                WriteOp::Update {
                    id: anchor.id.clone(),
                    update: anchor_update,
                },
            ])
            .await?;
        tracing::info!(
            id = %anchor.id,
            standalone_id = %standalone.id,
            date = %instance_date,
            "materialized occurrence"
        );

        let anchor = self.fetch(&anchor.id).await?;
        Ok(InstanceChange::Materialized { standalone, anchor })
    }

    async fn truncate(
        &self,
        anchor: &Task,
        mut pattern: RecurrencePattern,
        instance_date: NaiveDate,
    ) -> Result<InstanceChange> {
        let Some(end) = instance_date.pred_opt() else {
            return Ok(InstanceChange::Unchanged);
        };
        if pattern.end_date.is_some_and(|current| current <= end) {
            tracing::debug!(id = %anchor.id, "series already ends before {instance_date}");
            return Ok(InstanceChange::Unchanged);
        }

        pattern.end_date = Some(end);
        let update = TaskUpdate {
            recurrence: Some(Some(pattern)),
            ..Default::default()
        };
        self.storage.update(&anchor.id, update).await?;
        tracing::debug!(id = %anchor.id, %end, "truncated series");
        Ok(InstanceChange::Truncated(self.fetch(&anchor.id).await?))
    }

    async fn update_series(&self, anchor: &Task, overrides: TaskUpdate) -> Result<InstanceChange> {
        if overrides.is_empty() {
            return Ok(InstanceChange::Unchanged);
        }
        if let Some(Some(pattern)) = &overrides.recurrence {
            recurrence::validate_pattern(pattern)?;
        }

        self.storage.update(&anchor.id, overrides).await?;
        Ok(InstanceChange::Updated(self.fetch(&anchor.id).await?))
    }

    /// Attaches a recurrence pattern to a task.
    ///
    /// Returns `Ok(false)` and leaves the task alone if the pattern is
    /// invalid. A task without a due date becomes due on the first
    /// occurrence.
    pub async fn add_recurrence(&self, id: &str, pattern: RecurrencePattern) -> Result<bool> {
        let _guard = self.lock(id).await;
        let task = self.fetch(id).await?;

        if let Err(e) = recurrence::validate_pattern(&pattern) {
            tracing::warn!(id, error = %e, "rejected recurrence pattern");
            return Ok(false);
        }

        let mut update = TaskUpdate::default();
        if task.due_date.is_none() {
            update.due_date = Some(recurrence::next_occurrence(pattern.start_date, &pattern));
        }
        update.recurrence = Some(Some(pattern));

        self.storage.update(id, update).await?;
        Ok(true)
    }

    /// Removes the recurrence pattern from a task, keeping its due date.
    pub async fn remove_recurrence(&self, id: &str) -> Result<Task> {
        let _guard = self.lock(id).await;
        let task = self.fetch(id).await?;
        if !task.is_recurring() {
            return Ok(task);
        }

        let update = TaskUpdate {
            recurrence: Some(None),
            ..Default::default()
        };
        self.storage.update(id, update).await?;
        self.fetch(id).await
    }

    /// Returns up to `limit` upcoming occurrence dates on or after `from`.
    ///
    /// Empty for tasks without recurrence.
    pub async fn upcoming_occurrences(
        &self,
        id: &str,
        from: NaiveDate,
        limit: usize,
    ) -> Result<Vec<NaiveDate>> {
        let task = self.fetch(id).await?;
        Ok(match &task.recurrence {
            Some(pattern) => recurrence::occurrences_between(pattern, from, NaiveDate::MAX, limit),
            None => Vec::new(),
        })
    }

    // ==================== Queries ====================

    /// Returns the tasks in a project.
    pub async fn tasks_by_project(&self, project_id: &str) -> Result<Vec<Task>> {
        self.storage
            .query_by_field(IndexedField::ProjectId, project_id)
            .await
    }

    /// Returns the direct subtasks of a task.
    pub async fn subtasks(&self, parent_id: &str) -> Result<Vec<Task>> {
        self.storage
            .query_by_field(IndexedField::ParentTaskId, parent_id)
            .await
    }

    /// Returns the tasks matching a filter query.
    ///
    /// A blank query matches everything; an unparsable one matches nothing.
    pub async fn filter_tasks(&self, query: &str, context: &FilterContext) -> Result<Vec<Task>> {
        let tasks = self.storage.get_all().await?;
        Ok(apply_advanced_filter(query, &tasks, context)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Resolves a full id or a unique id prefix.
    ///
    /// Prefixes shorter than [`MIN_PREFIX_LEN`] only match exactly.
    pub async fn resolve_id(&self, id_or_prefix: &str) -> Result<String> {
        let tasks = self.storage.get_all().await?;

        // First try exact match
        if tasks.iter().any(|task| task.id == id_or_prefix) {
            return Ok(id_or_prefix.to_string());
        }
        if id_or_prefix.len() < MIN_PREFIX_LEN {
            return Err(StoreError::not_found(id_or_prefix));
        }

        let mut matches: Vec<String> = tasks
            .into_iter()
            .filter(|task| task.id.starts_with(id_or_prefix))
            .map(|task| task.id)
            .collect();

        match matches.len() {
            0 => Err(StoreError::not_found(id_or_prefix)),
            1 => Ok(matches.remove(0)),
            _ => Err(StoreError::AmbiguousId {
                prefix: id_or_prefix.to_string(),
                matches,
            }),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Copies a task under a fresh id, open and newly created.
fn spawn_copy(task: &Task) -> Task {
    let now = Utc::now();
    Task {
        id: Uuid::new_v4().to_string(),
        completed: false,
        completed_at: None,
        created_at: now,
        updated_at: now,
        ..task.clone()
    }
}

fn close_op(id: &str) -> WriteOp {
    WriteOp::Update {
        id: id.to_string(),
        update: close_update(),
    }
}

fn close_update() -> TaskUpdate {
    TaskUpdate {
        completed: Some(true),
        completed_at: Some(Some(Utc::now())),
        ..Default::default()
    }
}

fn is_open_occurrence(pattern: &RecurrencePattern, date: NaiveDate) -> bool {
    !pattern.is_exception(date) && recurrence::generates(pattern, date)
}

/// Stores `pattern` on the anchor. An anchor due on the skipped date moves
/// to the next occurrence, or is closed when the series has none left.
fn exception_update(anchor: &Task, pattern: RecurrencePattern, skipped: NaiveDate) -> TaskUpdate {
    let mut update = TaskUpdate::default();
    if anchor.due_date == Some(skipped) {
        match skipped
            .succ_opt()
            .and_then(|from| recurrence::next_occurrence(from, &pattern))
        {
            Some(next) => update.due_date = Some(Some(next)),
            None => {
                tracing::debug!(id = %anchor.id, "skipped last occurrence, closing series");
                update = close_update();
            }
        }
    }
    update.recurrence = Some(Some(pattern));
    update
}

#[cfg(test)]
#[path = "task_store_tests.rs"]
mod tests;
