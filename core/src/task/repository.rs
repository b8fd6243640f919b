//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use crate::Result;

/// Repository interface for task CRUD operations
///
/// Implementations assign ids and timestamps, validate every write, and
/// leave stored state untouched when an operation fails.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Validate and store a new task
    async fn create(&self, new: NewTask) -> Result<Task>;

    /// Get a task by ID, or `Error::TaskNotFound`
    async fn get(&self, id: Uuid) -> Result<Task>;

    /// Get all tasks, newest first
    async fn list(&self) -> Result<Vec<Task>>;

    /// Apply a partial update and refresh `updated_at`
    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task>;

    /// Delete a task by ID, or `Error::TaskNotFound`
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Find tasks by status, newest first
    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>>;

    /// Find tasks by priority, newest first
    async fn find_by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>>;
}
