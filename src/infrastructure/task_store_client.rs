use crate::domain::models::{DayOfWeek, NewTaskRequest, Task, TaskId};
use crate::infrastructure::config::ClientConfig;
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

const UNKNOWN_STORE_ERROR: &str = "unknown error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskResponse {
    pub task_id: TaskId,
    pub day: DayOfWeek,
    pub time: String,
    pub message: Option<String>,
}

/// Remote task store. Implementations map transport and payload failures
/// onto `NotAuthenticated`, `StoreRejected` and `Network`.
#[async_trait]
pub trait TaskStoreClient: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, InfraError>;

    /// Tasks the store reports for one grid cell. `success:false` yields an
    /// empty list.
    async fn list_tasks_at(&self, day: DayOfWeek, time: &str) -> Result<Vec<Task>, InfraError>;

    async fn add_task(&self, request: &NewTaskRequest) -> Result<AddTaskResponse, InfraError>;

    async fn delete_task(&self, task_id: TaskId) -> Result<(), InfraError>;

    /// Asks the store to pull calendar events in as tasks; returns its message.
    async fn import_calendar_events(&self) -> Result<String, InfraError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTaskStoreClient {
    client: Client,
    base_url: Url,
    session_cookie: Option<String>,
}

impl ReqwestTaskStoreClient {
    pub fn new(config: &ClientConfig) -> Result<Self, InfraError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.store_base_url.clone(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, InfraError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                InfraError::InvalidConfig("store base URL cannot be a base".to_string())
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session_cookie.as_deref() {
            Some(cookie) => request.header(header::COOKIE, format!("session={cookie}")),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder, action: &str) -> Result<RawResponse, InfraError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|error| InfraError::Network(format!("network error while {action}: {error}")))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("application/json"))
            .unwrap_or(false);
        let body = response
            .text()
            .await
            .map_err(|error| InfraError::Network(format!("failed reading {action} response: {error}")))?;

        Ok(RawResponse {
            status,
            is_json,
            body,
        })
    }
}

#[derive(Debug)]
struct RawResponse {
    status: StatusCode,
    is_json: bool,
    body: String,
}

impl RawResponse {
    /// A login redirect lands on an HTML page, so anything that is not JSON
    /// means the session is missing.
    fn decode<T: DeserializeOwned>(&self, action: &str) -> Result<T, InfraError> {
        if !self.is_json
            || self.status == StatusCode::UNAUTHORIZED
            || self.status == StatusCode::FORBIDDEN
        {
            return Err(InfraError::NotAuthenticated);
        }
        serde_json::from_str(&self.body).map_err(|error| {
            InfraError::StoreRejected(format!(
                "invalid {action} payload (http {}): {error}",
                self.status.as_u16()
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct TaskListEnvelope {
    success: bool,
    #[serde(default)]
    tasks: Vec<Task>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddTaskEnvelope {
    success: bool,
    task_id: Option<TaskId>,
    day: Option<DayOfWeek>,
    time: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    success: bool,
    message: Option<String>,
    error: Option<String>,
}

fn rejection(message: Option<String>, error: Option<String>) -> InfraError {
    InfraError::StoreRejected(
        message
            .or(error)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| UNKNOWN_STORE_ERROR.to_string()),
    )
}

fn task_list_from(raw: &RawResponse) -> Result<Vec<Task>, InfraError> {
    if !raw.status.is_success() {
        return Err(InfraError::NotAuthenticated);
    }
    let envelope: TaskListEnvelope = raw.decode("task list")?;
    if !envelope.success {
        return Err(rejection(envelope.message, envelope.error));
    }
    Ok(envelope.tasks)
}

fn slot_tasks_from(raw: &RawResponse) -> Result<Vec<Task>, InfraError> {
    let envelope: TaskListEnvelope = raw.decode("slot task list")?;
    if !envelope.success {
        return Ok(Vec::new());
    }
    Ok(envelope.tasks)
}

fn added_task_from(raw: &RawResponse) -> Result<AddTaskResponse, InfraError> {
    let envelope: AddTaskEnvelope = raw.decode("add task")?;
    if !envelope.success {
        return Err(rejection(envelope.message, envelope.error));
    }
    match (envelope.task_id, envelope.day, envelope.time) {
        (Some(task_id), Some(day), Some(time)) => Ok(AddTaskResponse {
            task_id,
            day,
            time,
            message: envelope.message,
        }),
        _ => Err(InfraError::StoreRejected(
            "add task response did not include task_id, day and time".to_string(),
        )),
    }
}

fn status_from(raw: &RawResponse, action: &str) -> Result<Option<String>, InfraError> {
    let envelope: StatusEnvelope = raw.decode(action)?;
    if !envelope.success {
        return Err(rejection(envelope.message, envelope.error));
    }
    Ok(envelope.message)
}

#[async_trait]
impl TaskStoreClient for ReqwestTaskStoreClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, InfraError> {
        let endpoint = self.endpoint(&["api", "tasks"])?;
        let raw = self.execute(self.client.get(endpoint), "listing tasks").await?;
        task_list_from(&raw)
    }

    async fn list_tasks_at(&self, day: DayOfWeek, time: &str) -> Result<Vec<Task>, InfraError> {
        let endpoint = self.endpoint(&["api", "tasks"])?;
        let request = self
            .client
            .get(endpoint)
            .query(&[("day", day.name()), ("time", time)]);
        let raw = self.execute(request, "listing slot tasks").await?;
        slot_tasks_from(&raw)
    }

    async fn add_task(&self, request: &NewTaskRequest) -> Result<AddTaskResponse, InfraError> {
        let endpoint = self.endpoint(&["add_task"])?;
        let raw = self
            .execute(self.client.post(endpoint).json(request), "adding task")
            .await?;
        added_task_from(&raw)
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<(), InfraError> {
        let task_id = task_id.to_string();
        let endpoint = self.endpoint(&["delete_task", &task_id])?;
        let raw = self
            .execute(self.client.delete(endpoint), "deleting task")
            .await?;
        status_from(&raw, "delete task").map(|_| ())
    }

    async fn import_calendar_events(&self) -> Result<String, InfraError> {
        let endpoint = self.endpoint(&["import_google_events"])?;
        let raw = self
            .execute(self.client.get(endpoint), "importing calendar events")
            .await?;
        Ok(status_from(&raw, "import")?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, is_json: bool, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).expect("valid status"),
            is_json,
            body: body.to_string(),
        }
    }

    fn client(base: &str) -> ReqwestTaskStoreClient {
        ReqwestTaskStoreClient::new(&ClientConfig {
            store_base_url: Url::parse(base).expect("valid url"),
            session_cookie: None,
            request_timeout: None,
        })
        .expect("build client")
    }

    #[test]
    fn endpoints_are_built_from_segments() {
        let root = client("http://localhost:5000/");
        assert_eq!(
            root.endpoint(&["delete_task", "12"]).expect("endpoint").as_str(),
            "http://localhost:5000/delete_task/12"
        );

        let nested = client("https://tasks.example.test/app/");
        assert_eq!(
            nested.endpoint(&["api", "tasks"]).expect("endpoint").as_str(),
            "https://tasks.example.test/app/api/tasks"
        );
    }

    #[test]
    fn html_login_page_means_not_authenticated() {
        let response = raw(200, false, "<html>login</html>");
        assert!(matches!(task_list_from(&response), Err(InfraError::NotAuthenticated)));
        assert!(matches!(added_task_from(&response), Err(InfraError::NotAuthenticated)));
    }

    #[test]
    fn non_success_task_list_means_not_authenticated() {
        let response = raw(500, true, r#"{"success": false, "error": "boom"}"#);
        assert!(matches!(task_list_from(&response), Err(InfraError::NotAuthenticated)));
    }

    #[test]
    fn task_list_is_decoded() {
        let response = raw(
            200,
            true,
            r#"{"success": true, "tasks": [{"id": 1, "title": "Gym", "description": "", "priority": "Low", "day": "Friday", "time": "18:00", "duration": 1}]}"#,
        );
        let tasks = task_list_from(&response).expect("decode tasks");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].day, DayOfWeek::Friday);
    }

    #[test]
    fn slot_query_failure_is_an_empty_list() {
        let response = raw(200, true, r#"{"success": false}"#);
        assert!(slot_tasks_from(&response).expect("decode").is_empty());
    }

    #[test]
    fn add_task_rejection_carries_store_message() {
        let response = raw(400, true, r#"{"success": false, "message": "Missing required fields"}"#);
        match added_task_from(&response) {
            Err(InfraError::StoreRejected(message)) => assert_eq!(message, "Missing required fields"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn add_task_echo_is_decoded() {
        let response = raw(
            200,
            true,
            r#"{"success": true, "message": "Task created successfully", "task_id": 41, "day": "Wednesday", "time": "12:00"}"#,
        );
        let added = added_task_from(&response).expect("decode add");
        assert_eq!(added.task_id, 41);
        assert_eq!(added.day, DayOfWeek::Wednesday);
        assert_eq!(added.time, "12:00");
    }

    #[test]
    fn import_error_field_is_used_when_message_missing() {
        let response = raw(500, true, r#"{"success": false, "error": "no credentials"}"#);
        match status_from(&response, "import") {
            Err(InfraError::StoreRejected(message)) => assert_eq!(message, "no credentials"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
