use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TaskId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Cyclic: 7 maps back to Monday.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| format!("unknown day of week: {normalized}"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| format!("unknown priority: {normalized}"))
    }
}

/// One hour cell of the weekly grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    pub day: DayOfWeek,
    pub hour: u8,
}

impl CellCoord {
    pub fn new(day: DayOfWeek, hour: u8) -> Self {
        Self { day, hour }
    }

    pub fn hour_label(&self) -> String {
        format_hour(self.hour)
    }
}

/// A scheduled task as the store reports it. Any duration of at least one
/// hour is valid; a task lasting a week or more covers every cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub priority: Priority,
    pub day: DayOfWeek,
    pub time: String,
    pub duration: u32,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.title, "task.title")?;
        validate_hhmm(&self.time, "task.time")?;
        validate_duration(self.duration, "task.duration")
    }

    /// Minutes are ignored; occupancy granularity is whole hours.
    pub fn start_hour(&self) -> Result<u8, String> {
        parse_hhmm(&self.time, "task.time").map(|(hour, _)| hour)
    }

    /// Display range used by the bucket lists, e.g. `Tuesday 09:00 - 11:00`.
    pub fn schedule_label(&self) -> String {
        let end = match self.start_hour() {
            Ok(hour) => format_hour(((hour as u32 + self.duration) % 24) as u8),
            Err(_) => "??:??".to_string(),
        };
        format!("{} {} - {}", self.day, self.time, end)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    Manual,
    Auto,
}

/// Body of an add request. In auto mode the store picks the slot before the deadline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTaskRequest {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub duration: u32,
    pub mode: ScheduleMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<DayOfWeek>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_day: Option<DayOfWeek>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_time: Option<String>,
}

impl NewTaskRequest {
    pub fn manual(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        day: DayOfWeek,
        time: impl Into<String>,
        duration: u32,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            duration,
            mode: ScheduleMode::Manual,
            day: Some(day),
            time: Some(time.into()),
            deadline_day: None,
            deadline_time: None,
        }
    }

    pub fn auto(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        duration: u32,
        deadline_day: DayOfWeek,
        deadline_time: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            duration,
            mode: ScheduleMode::Auto,
            day: None,
            time: None,
            deadline_day: Some(deadline_day),
            deadline_time: Some(deadline_time.into()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.title, "title")?;
        validate_duration(self.duration, "duration")?;
        match self.mode {
            ScheduleMode::Manual => {
                if self.day.is_none() {
                    return Err("day is required in manual mode".to_string());
                }
                let time = self
                    .time
                    .as_deref()
                    .ok_or_else(|| "time is required in manual mode".to_string())?;
                validate_hhmm(time, "time")
            }
            ScheduleMode::Auto => {
                let deadline_day = self
                    .deadline_day
                    .ok_or_else(|| "deadline_day is required in auto mode".to_string())?;
                let deadline_time = self
                    .deadline_time
                    .as_deref()
                    .ok_or_else(|| "deadline_time is required in auto mode".to_string())?;
                let (hour, minute) = parse_hhmm(deadline_time, "deadline_time")?;
                if deadline_day == DayOfWeek::Monday && hour == 0 && minute == 0 {
                    return Err(
                        "Cannot set deadline to Monday 00:00 - schedule starts then".to_string(),
                    );
                }
                Ok(())
            }
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn format_hour(hour: u8) -> String {
    format!("{hour:02}:00")
}

pub fn parse_hhmm(value: &str, field_name: &str) -> Result<(u8, u8), String> {
    let mut split = value.trim().split(':');
    let (Some(hour_str), Some(minute_str), None) = (split.next(), split.next(), split.next())
    else {
        return Err(format!("{field_name} must be HH:MM"));
    };

    let hour = hour_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be HH:MM"))?;
    let minute = minute_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be HH:MM"))?;
    if hour > 23 || minute > 59 {
        return Err(format!("{field_name} must be HH:MM"));
    }
    Ok((hour, minute))
}

fn validate_hhmm(value: &str, field_name: &str) -> Result<(), String> {
    parse_hhmm(value, field_name).map(|_| ())
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

fn validate_duration(value: u32, field_name: &str) -> Result<(), String> {
    if value == 0 {
        return Err(format!("{field_name} must be >= 1"));
    }
    Ok(())
}
