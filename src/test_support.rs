//! Shared fakes for unit tests.

use crate::domain::models::{DayOfWeek, NewTaskRequest, Priority, Task, TaskId};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::task_store_client::{AddTaskResponse, TaskStoreClient};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

pub fn task(id: TaskId, priority: Priority, day: DayOfWeek, hour: u8, duration: u32) -> Task {
    Task {
        id,
        title: format!("task-{id}"),
        description: String::new(),
        priority,
        day,
        time: format!("{hour:02}:00"),
        duration,
    }
}

/// Task store scripted with queued responses per endpoint. An exhausted
/// queue answers with an empty success, except `add_task` which fails.
/// After `hold_adds`, each `add_task` waits for a `release_add` before it
/// answers.
#[derive(Debug, Default)]
pub struct FakeTaskStore {
    list_responses: Mutex<VecDeque<Result<Vec<Task>, InfraError>>>,
    slot_responses: Mutex<VecDeque<Result<Vec<Task>, InfraError>>>,
    add_responses: Mutex<VecDeque<Result<AddTaskResponse, InfraError>>>,
    delete_responses: Mutex<VecDeque<Result<(), InfraError>>>,
    import_responses: Mutex<VecDeque<Result<String, InfraError>>>,
    pub list_calls: AtomicUsize,
    pub slot_calls: AtomicUsize,
    pub add_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub added_requests: Mutex<Vec<NewTaskRequest>>,
    hold_adds: AtomicBool,
    add_gate: Notify,
}

impl FakeTaskStore {
    pub fn push_list(&self, response: Result<Vec<Task>, InfraError>) -> &Self {
        self.list_responses.lock().expect("list lock").push_back(response);
        self
    }

    pub fn push_slot(&self, response: Result<Vec<Task>, InfraError>) -> &Self {
        self.slot_responses.lock().expect("slot lock").push_back(response);
        self
    }

    pub fn push_add(&self, response: Result<AddTaskResponse, InfraError>) -> &Self {
        self.add_responses.lock().expect("add lock").push_back(response);
        self
    }

    pub fn push_delete(&self, response: Result<(), InfraError>) -> &Self {
        self.delete_responses.lock().expect("delete lock").push_back(response);
        self
    }

    pub fn push_import(&self, response: Result<String, InfraError>) -> &Self {
        self.import_responses.lock().expect("import lock").push_back(response);
        self
    }

    pub fn hold_adds(&self) -> &Self {
        self.hold_adds.store(true, Ordering::SeqCst);
        self
    }

    pub fn release_add(&self) {
        self.add_gate.notify_one();
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStoreClient for FakeTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, InfraError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_responses
            .lock()
            .expect("list lock")
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_tasks_at(&self, _day: DayOfWeek, _time: &str) -> Result<Vec<Task>, InfraError> {
        self.slot_calls.fetch_add(1, Ordering::SeqCst);
        self.slot_responses
            .lock()
            .expect("slot lock")
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn add_task(&self, request: &NewTaskRequest) -> Result<AddTaskResponse, InfraError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.added_requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        if self.hold_adds.load(Ordering::SeqCst) {
            self.add_gate.notified().await;
        }
        self.add_responses
            .lock()
            .expect("add lock")
            .pop_front()
            .unwrap_or_else(|| Err(InfraError::Network("no scripted add response".to_string())))
    }

    async fn delete_task(&self, _task_id: TaskId) -> Result<(), InfraError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.delete_responses
            .lock()
            .expect("delete lock")
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn import_calendar_events(&self) -> Result<String, InfraError> {
        self.import_responses
            .lock()
            .expect("import lock")
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}
