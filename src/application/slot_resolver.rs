use crate::domain::models::{CellCoord, DayOfWeek, Task, format_hour};
use crate::domain::registry::TaskRegistry;
use crate::domain::time_index::covers;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::task_store_client::TaskStoreClient;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Answers "what is in this cell" for a clicked grid cell.
pub struct SlotResolver<C: TaskStoreClient + ?Sized> {
    client: Arc<C>,
    registry: Arc<Mutex<TaskRegistry>>,
}

impl<C: TaskStoreClient + ?Sized> SlotResolver<C> {
    pub fn new(client: Arc<C>, registry: Arc<Mutex<TaskRegistry>>) -> Self {
        Self { client, registry }
    }

    pub fn local_tasks_at(&self, day: DayOfWeek, hour: u8) -> Result<Vec<Task>, InfraError> {
        ensure_hour(hour)?;
        let registry = self
            .registry
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("task registry lock poisoned: {error}")))?;
        Ok(registry.tasks_at(day, hour).into_iter().cloned().collect())
    }

    /// Local occupants ordered by id, then whatever else the store reports
    /// for the same cell. Remote tasks that do not cover the cell, or that
    /// are already listed, are dropped. A failed store query leaves the
    /// local answer.
    pub async fn tasks_at(&self, day: DayOfWeek, hour: u8) -> Result<Vec<Task>, InfraError> {
        let mut tasks = self.local_tasks_at(day, hour)?;
        let mut seen = tasks.iter().map(|task| task.id).collect::<BTreeSet<_>>();

        let remote = match self.client.list_tasks_at(day, &format_hour(hour)).await {
            Ok(remote) => remote,
            Err(error) => {
                tracing::warn!(%error, %day, hour, "slot query failed; using local occupancy");
                return Ok(tasks);
            }
        };

        let cell = CellCoord::new(day, hour);
        for task in remote {
            let Ok(start_hour) = task.start_hour() else {
                tracing::debug!(task_id = task.id, time = %task.time, "ignoring remote task with bad time");
                continue;
            };
            if covers(task.day, start_hour, task.duration, cell) && seen.insert(task.id) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }
}

fn ensure_hour(hour: u8) -> Result<(), InfraError> {
    if hour > 23 {
        return Err(InfraError::InvalidInput(format!("hour must be 0-23, got {hour}")));
    }
    Ok(())
}
