use crate::domain::models::{NewTaskRequest, Task, TaskId};
use crate::domain::projection::WeekSnapshot;
use crate::domain::registry::{RegistryError, TaskRegistry};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::notifications::{Notification, NotificationSink};
use crate::infrastructure::task_store_client::TaskStoreClient;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

pub const LOGIN_PROMPT: &str = "Please log in to access this page.";

/// A view that re-renders from a fresh snapshot after each completed mutation.
pub trait ScheduleObserver: Send + Sync {
    fn on_reconciled(&self, snapshot: &WeekSnapshot);
}

/// Drives the task store and folds every response into the registry.
///
/// The registry lock is only taken after a response has arrived and is never
/// held across an await, so mutations land in response-arrival order and each
/// `apply`/`retract`/`replace_all` is atomic with respect to other callers.
pub struct Synchronizer<C, N>
where
    C: TaskStoreClient + ?Sized,
    N: NotificationSink + ?Sized,
{
    client: Arc<C>,
    notifier: Arc<N>,
    registry: Arc<Mutex<TaskRegistry>>,
    observers: Mutex<Vec<Weak<dyn ScheduleObserver>>>,
}

impl<C, N> Synchronizer<C, N>
where
    C: TaskStoreClient + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub fn new(client: Arc<C>, notifier: Arc<N>) -> Self {
        Self {
            client,
            notifier,
            registry: Arc::new(Mutex::new(TaskRegistry::default())),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    pub fn registry(&self) -> Arc<Mutex<TaskRegistry>> {
        Arc::clone(&self.registry)
    }

    pub fn read_registry<R>(&self, read: impl FnOnce(&TaskRegistry) -> R) -> Result<R, InfraError> {
        let registry = self.lock_registry()?;
        Ok(read(&registry))
    }

    pub fn snapshot(&self) -> Result<WeekSnapshot, InfraError> {
        self.read_registry(WeekSnapshot::from_registry)
    }

    /// Observers are held weakly; a dropped view simply stops receiving
    /// snapshots while the registry keeps being updated.
    pub fn subscribe<O>(&self, observer: &Arc<O>) -> Result<(), InfraError>
    where
        O: ScheduleObserver + 'static,
    {
        let weak: Weak<O> = Arc::downgrade(observer);
        let weak: Weak<dyn ScheduleObserver> = weak;
        self.lock_observers()?.push(weak);
        Ok(())
    }

    pub async fn load_all(&self) -> Result<usize, InfraError> {
        match self.client.list_tasks().await {
            Ok(tasks) => {
                let (count, rejected) = {
                    let mut registry = self.lock_registry()?;
                    let rejected = registry.replace_all(tasks);
                    (registry.len(), rejected)
                };
                for error in &rejected {
                    tracing::error!(%error, "skipped task from store snapshot");
                }
                tracing::info!(count, "task registry resynchronized");
                self.publish()?;
                Ok(count)
            }
            Err(InfraError::NotAuthenticated) => {
                tracing::info!("task store requires login");
                self.lock_registry()?.replace_all(Vec::new());
                self.notifier.notify(Notification::info(LOGIN_PROMPT));
                self.publish()?;
                Err(InfraError::NotAuthenticated)
            }
            Err(error) => {
                tracing::warn!(%error, "task load failed; keeping previous state");
                let message = match &error {
                    InfraError::StoreRejected(_) => Notification::info("No tasks available."),
                    _ => Notification::error(format!("Failed to load tasks: {error}")),
                };
                self.notifier.notify(message);
                Err(error)
            }
        }
    }

    /// Sends the request and applies the store's echo. In auto mode the
    /// echoed day and time are the store's choice, not the request's.
    pub async fn create_task(&self, request: NewTaskRequest) -> Result<Task, InfraError> {
        if let Err(reason) = request.validate() {
            self.notifier
                .notify(Notification::error(format!("Failed to add task: {reason}")));
            return Err(InfraError::InvalidInput(reason));
        }

        let response = match self.client.add_task(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, title = %request.title, "add task failed");
                self.notify_failure(&error, "add", "adding");
                return Err(error);
            }
        };

        let task = Task {
            id: response.task_id,
            title: request.title,
            description: request.description,
            priority: request.priority,
            day: response.day,
            time: response.time,
            duration: request.duration,
        };

        let applied = self.lock_registry()?.apply(task.clone());
        if let Err(error) = applied {
            return Err(self.recover(error).await);
        }

        tracing::info!(task_id = task.id, day = %task.day, time = %task.time, "task added");
        self.notifier.notify(Notification::success(format!(
            "Task added successfully for {} at {}",
            task.day, task.time
        )));
        self.publish()?;
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: TaskId) -> Result<Task, InfraError> {
        if let Err(error) = self.client.delete_task(task_id).await {
            tracing::warn!(%error, task_id, "delete task failed");
            self.notify_failure(&error, "delete", "deleting");
            return Err(error);
        }

        let retracted = self.lock_registry()?.retract(task_id);
        match retracted {
            Ok(task) => {
                tracing::info!(task_id, "task deleted");
                self.notifier
                    .notify(Notification::success("Task deleted successfully!"));
                self.publish()?;
                Ok(task)
            }
            Err(error) => Err(self.recover(error).await),
        }
    }

    /// Pass-through import trigger followed by a full reload.
    pub async fn import_calendar_events(&self) -> Result<usize, InfraError> {
        match self.client.import_calendar_events().await {
            Ok(message) => {
                let message = if message.trim().is_empty() {
                    "Calendar events imported".to_string()
                } else {
                    message
                };
                tracing::info!(%message, "calendar import finished");
                self.notifier.notify(Notification::info(message));
                self.load_all().await
            }
            Err(error) => {
                tracing::warn!(%error, "calendar import failed");
                let detail = match &error {
                    InfraError::StoreRejected(message) => message.clone(),
                    other => other.to_string(),
                };
                self.notifier
                    .notify(Notification::error(format!("Error importing: {detail}")));
                Err(error)
            }
        }
    }

    async fn recover(&self, error: RegistryError) -> InfraError {
        tracing::error!(%error, "registry diverged from the task store; reloading");
        if let Err(reload_error) = self.load_all().await {
            tracing::warn!(error = %reload_error, "reload after registry error failed");
        }
        InfraError::Registry(error)
    }

    fn notify_failure(&self, error: &InfraError, verb: &str, gerund: &str) {
        let message = match error {
            InfraError::StoreRejected(message) => format!("Failed to {verb} task: {message}"),
            InfraError::NotAuthenticated => LOGIN_PROMPT.to_string(),
            _ => format!("An error occurred while {gerund} the task."),
        };
        self.notifier.notify(Notification::error(message));
    }

    fn publish(&self) -> Result<(), InfraError> {
        let live = {
            let mut observers = self.lock_observers()?;
            observers.retain(|observer| observer.strong_count() > 0);
            observers
                .iter()
                .filter_map(Weak::upgrade)
                .collect::<Vec<_>>()
        };
        if live.is_empty() {
            return Ok(());
        }

        let snapshot = self.snapshot()?;
        for observer in live {
            observer.on_reconciled(&snapshot);
        }
        Ok(())
    }

    fn lock_registry(&self) -> Result<MutexGuard<'_, TaskRegistry>, InfraError> {
        self.registry
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("task registry lock poisoned: {error}")))
    }

    fn lock_observers(&self) -> Result<MutexGuard<'_, Vec<Weak<dyn ScheduleObserver>>>, InfraError> {
        self.observers
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("observer list lock poisoned: {error}")))
    }
}
