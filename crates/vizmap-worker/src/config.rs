//! Worker configuration.

use serde::{Deserialize, Serialize};

/// Settings for the long-lived worker thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Requests buffered before `send` waits for the worker.
    pub queue_capacity: usize,
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            thread_name: "vizmap-worker".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Queue capacity clamped to at least one slot.
    pub fn effective_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }
}
