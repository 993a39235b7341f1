use crate::domain::models::{DayOfWeek, Priority, TaskId, format_hour};
use crate::domain::registry::TaskRegistry;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CellView {
    pub day: DayOfWeek,
    pub hour: String,
    pub occupants: Vec<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub clickable: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub schedule: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct BucketsView {
    pub high: Vec<TaskRow>,
    pub medium: Vec<TaskRow>,
    pub low: Vec<TaskRow>,
}

/// Render-ready projection of the registry: every grid cell in week order and
/// the three bucket lists in display order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WeekSnapshot {
    pub task_count: usize,
    pub cells: Vec<CellView>,
    pub buckets: BucketsView,
}

impl WeekSnapshot {
    pub fn from_registry(registry: &TaskRegistry) -> Self {
        let cells = DayOfWeek::ALL
            .into_iter()
            .flat_map(|day| (0u8..24).map(move |hour| (day, hour)))
            .map(|(day, hour)| {
                let occupants = registry.occupancy().occupants_at(day, hour);
                CellView {
                    day,
                    hour: format_hour(hour),
                    clickable: !occupants.is_empty(),
                    label: registry.cell_label(day, hour).map(ToOwned::to_owned),
                    occupants,
                }
            })
            .collect();

        let rows = |priority: Priority| {
            registry
                .buckets()
                .snapshot(priority)
                .into_iter()
                .filter_map(|task_id| registry.get(task_id))
                .map(|task| TaskRow {
                    id: task.id,
                    title: task.title.clone(),
                    description: task.description.clone(),
                    schedule: task.schedule_label(),
                })
                .collect::<Vec<_>>()
        };

        Self {
            task_count: registry.len(),
            cells,
            buckets: BucketsView {
                high: rows(Priority::High),
                medium: rows(Priority::Medium),
                low: rows(Priority::Low),
            },
        }
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = &CellView> {
        self.cells.iter().filter(|cell| cell.clickable)
    }
}
