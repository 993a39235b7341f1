use crate::application::bootstrap::{BootstrapResult, bootstrap_workspace};
use crate::application::slot_resolver::SlotResolver;
use crate::application::synchronizer::Synchronizer;
use crate::domain::availability::suggest_slot;
use crate::domain::models::{
    DayOfWeek, NewTaskRequest, Priority, ScheduleMode, Task, TaskId, parse_hhmm,
};
use crate::domain::projection::WeekSnapshot;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::notifications::{InMemoryNotificationSink, Notification};
use crate::infrastructure::task_store_client::{ReqwestTaskStoreClient, TaskStoreClient};
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const NO_TASKS_AT_SLOT: &str = "No tasks found for this time.";

pub struct AppState {
    config_dir: PathBuf,
    logs_dir: PathBuf,
    synchronizer: Synchronizer<dyn TaskStoreClient, InMemoryNotificationSink>,
    slot_resolver: SlotResolver<dyn TaskStoreClient>,
    notifications: Arc<InMemoryNotificationSink>,
    log_guard: Mutex<()>,
}

impl AppState {
    pub fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let client = ReqwestTaskStoreClient::new(&bootstrap.client_config)?;
        Ok(Self::from_bootstrap(bootstrap, Arc::new(client)))
    }

    pub fn with_client(
        workspace_root: PathBuf,
        client: Arc<dyn TaskStoreClient>,
    ) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        Ok(Self::from_bootstrap(bootstrap, client))
    }

    fn from_bootstrap(bootstrap: BootstrapResult, client: Arc<dyn TaskStoreClient>) -> Self {
        let notifications = Arc::new(InMemoryNotificationSink::default());
        let synchronizer = Synchronizer::new(client, Arc::clone(&notifications));
        let slot_resolver = SlotResolver::new(synchronizer.client(), synchronizer.registry());

        Self {
            config_dir: bootstrap.config_dir,
            logs_dir: bootstrap.logs_dir,
            synchronizer,
            slot_resolver,
            notifications,
            log_guard: Mutex::new(()),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        self.log_error(command, &error.to_string());
        error.to_string()
    }

    pub fn log_info(&self, command: &str, message: &str) {
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        self.append_log("error", command, message);
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let path = self.logs_dir.join("commands.log");
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub duration: u32,
    pub mode: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub deadline_day: Option<String>,
    pub deadline_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SlotTasksResponse {
    pub day: DayOfWeek,
    pub time: String,
    pub tasks: Vec<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImportEventsResponse {
    pub task_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SuggestedSlotResponse {
    pub day: DayOfWeek,
    pub time: String,
}

pub async fn load_tasks_impl(state: &AppState) -> Result<WeekSnapshot, InfraError> {
    let count = state.synchronizer.load_all().await?;
    state.log_info("load_tasks", &format!("loaded {count} tasks"));
    state.synchronizer.snapshot()
}

pub fn week_snapshot_impl(state: &AppState, occupied_only: bool) -> Result<WeekSnapshot, InfraError> {
    let mut snapshot = state.synchronizer.snapshot()?;
    if occupied_only {
        snapshot.cells = snapshot.occupied_cells().cloned().collect();
    }
    Ok(snapshot)
}

pub async fn create_task_impl(state: &AppState, input: CreateTaskInput) -> Result<Task, InfraError> {
    let request = build_request(input)?;
    let task = state.synchronizer.create_task(request).await?;
    state.log_info(
        "create_task",
        &format!("created task_id={} at {} {}", task.id, task.day, task.time),
    );
    Ok(task)
}

pub async fn delete_task_impl(state: &AppState, task_id: TaskId) -> Result<Task, InfraError> {
    let task = state.synchronizer.delete_task(task_id).await?;
    state.log_info("delete_task", &format!("deleted task_id={task_id}"));
    Ok(task)
}

pub async fn tasks_at_impl(
    state: &AppState,
    day: String,
    time: String,
) -> Result<SlotTasksResponse, InfraError> {
    let day = parse_day(&day, "day")?;
    let (hour, _) = parse_hhmm(&time, "time").map_err(InfraError::InvalidInput)?;
    let tasks = state.slot_resolver.tasks_at(day, hour).await?;
    let message = tasks.is_empty().then(|| NO_TASKS_AT_SLOT.to_string());

    state.log_info(
        "tasks_at",
        &format!("{} tasks at {day} {time}", tasks.len()),
    );
    Ok(SlotTasksResponse {
        day,
        time,
        tasks,
        message,
    })
}

pub async fn import_events_impl(state: &AppState) -> Result<ImportEventsResponse, InfraError> {
    let task_count = state.synchronizer.import_calendar_events().await?;
    state.log_info("import_events", &format!("reloaded {task_count} tasks after import"));
    Ok(ImportEventsResponse { task_count })
}

/// Local preview of where auto mode would place a task. The store still makes
/// the real placement when the task is created.
pub fn suggest_slot_impl(
    state: &AppState,
    priority: String,
    duration: u32,
    deadline_day: String,
    deadline_time: String,
) -> Result<Option<SuggestedSlotResponse>, InfraError> {
    let priority = parse_priority(&priority)?;
    let deadline_day = parse_day(&deadline_day, "deadline_day")?;
    let (deadline_hour, _) =
        parse_hhmm(&deadline_time, "deadline_time").map_err(InfraError::InvalidInput)?;
    if duration == 0 {
        return Err(InfraError::InvalidInput("duration must be >= 1".to_string()));
    }

    let slot = state.synchronizer.read_registry(|registry| {
        suggest_slot(registry.occupancy(), duration, priority, deadline_day, deadline_hour)
    })?;
    let message = match slot {
        Some(cell) => format!("suggested {} {}", cell.day, cell.hour_label()),
        None => "no free slot before deadline".to_string(),
    };
    state.log_info("suggest_slot", &message);

    Ok(slot.map(|cell| SuggestedSlotResponse {
        day: cell.day,
        time: cell.hour_label(),
    }))
}

pub fn drain_notifications_impl(state: &AppState) -> Vec<Notification> {
    state.notifications.drain()
}

fn build_request(input: CreateTaskInput) -> Result<NewTaskRequest, InfraError> {
    let mode = match input.mode.as_deref().map(str::trim) {
        None | Some("") => ScheduleMode::Manual,
        Some(value) if value.eq_ignore_ascii_case("manual") => ScheduleMode::Manual,
        Some(value) if value.eq_ignore_ascii_case("auto") => ScheduleMode::Auto,
        Some(value) => {
            return Err(InfraError::InvalidInput(format!("unknown mode: {value}")));
        }
    };

    let request = NewTaskRequest {
        title: input.title.trim().to_string(),
        description: input
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        priority: parse_priority(&input.priority)?,
        duration: input.duration,
        mode,
        day: optional_day(input.day.as_deref(), "day")?,
        time: non_empty(input.time),
        deadline_day: optional_day(input.deadline_day.as_deref(), "deadline_day")?,
        deadline_time: non_empty(input.deadline_time),
    };
    request.validate().map_err(InfraError::InvalidInput)?;
    Ok(request)
}

fn parse_priority(value: &str) -> Result<Priority, InfraError> {
    value.parse::<Priority>().map_err(InfraError::InvalidInput)
}

fn parse_day(value: &str, field_name: &str) -> Result<DayOfWeek, InfraError> {
    value
        .parse::<DayOfWeek>()
        .map_err(|error| InfraError::InvalidInput(format!("{field_name}: {error}")))
}

fn optional_day(value: Option<&str>, field_name: &str) -> Result<Option<DayOfWeek>, InfraError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_day(value, field_name).map(Some),
        None => Ok(None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
