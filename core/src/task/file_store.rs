//! File-based task storage implementation
//!
//! Stores tasks as a JSON array in a file on disk.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use super::repository::TaskRepository;
use super::validation::validate_task;
use crate::{Error, Result};

/// File-based task store using JSON
///
/// Mutations hold the write lock across the disk write, so they are
/// serialized. A mutation only stays in the cache once the file is written.
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of tasks
    cache: RwLock<HashMap<Uuid, Task>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let tasks: Vec<Task> = serde_json::from_str(&content).map_err(|e| {
                Error::Storage(format!("Failed to parse tasks file {:?}: {}", path, e))
            })?;
            tasks.into_iter().map(|t| (t.id, t)).collect()
        } else {
            HashMap::new()
        };

        tracing::debug!("Loaded {} tasks from {:?}", cache.len(), path);

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the given tasks to disk, replacing the file atomically
    async fn persist(&self, tasks: &HashMap<Uuid, Task>) -> Result<()> {
        let mut ordered: Vec<&Task> = tasks.values().collect();
        ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let content = serde_json::to_string_pretty(&ordered)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn collect_newest_first(&self, filter: impl Fn(&Task) -> bool) -> Vec<Task> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<Task> = cache.values().filter(|t| filter(t)).cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tasks
    }
}

#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn create(&self, new: NewTask) -> Result<Task> {
        let task = Task::from_new(new);
        validate_task(&task)?;

        let mut cache = self.cache.write().await;
        cache.insert(task.id, task.clone());
        if let Err(e) = self.persist(&cache).await {
            cache.remove(&task.id);
            return Err(e);
        }

        tracing::info!("Created task {}: {}", task.id, task);
        Ok(task)
    }

    async fn get(&self, id: Uuid) -> Result<Task> {
        let cache = self.cache.read().await;
        cache.get(&id).cloned().ok_or(Error::TaskNotFound(id))
    }

    async fn list(&self) -> Result<Vec<Task>> {
        Ok(self.collect_newest_first(|_| true).await)
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let mut cache = self.cache.write().await;
        let previous = cache.get(&id).cloned().ok_or(Error::TaskNotFound(id))?;

        let mut task = previous.clone();
        patch.apply(&mut task);
        validate_task(&task)?;
        task.touch();

        cache.insert(id, task.clone());
        if let Err(e) = self.persist(&cache).await {
            cache.insert(id, previous);
            return Err(e);
        }

        tracing::info!("Updated task {}: {}", task.id, task);
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut cache = self.cache.write().await;
        let removed = cache.remove(&id).ok_or(Error::TaskNotFound(id))?;
        if let Err(e) = self.persist(&cache).await {
            cache.insert(id, removed);
            return Err(e);
        }

        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        Ok(self.collect_newest_first(|t| t.status == status).await)
    }

    async fn find_by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>> {
        Ok(self.collect_newest_first(|t| t.priority == priority).await)
    }
}
