//! Task and conversation persistence for the A2A server
//!
//! Currently in-memory; tasks and sessions are lost on restart.

use super::types::Task;
use crate::agent::Session;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for task persistence
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    async fn save_task(&self, task: &Task) -> Result<()>;
    async fn load_task(&self, task_id: &str) -> Result<Option<Task>>;
    async fn save_session(&self, context_id: &str, session: &Session) -> Result<()>;
    async fn load_session(&self, context_id: &str) -> Result<Option<Session>>;
}

/// In-memory task store
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
    sessions_by_context: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            sessions_by_context: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn save_task(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn load_task(&self, task_id: &str) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(task_id).cloned())
    }

    async fn save_session(&self, context_id: &str, session: &Session) -> Result<()> {
        let mut sessions = self.sessions_by_context.write().await;
        sessions.insert(context_id.to_string(), session.clone());
        Ok(())
    }

    async fn load_session(&self, context_id: &str) -> Result<Option<Session>> {
        let sessions = self.sessions_by_context.read().await;
        Ok(sessions.get(context_id).cloned())
    }
}
