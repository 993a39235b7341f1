use crate::domain::models::{CellCoord, DayOfWeek, TaskId};
use crate::domain::time_index::{WEEK_HOURS, WeekIndex, distinct_cells_for};
use std::collections::BTreeSet;

/// 7x24 grid of occupant sets. A cell is occupied iff its set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    cells: Vec<BTreeSet<TaskId>>,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self {
            cells: vec![BTreeSet::new(); WEEK_HOURS],
        }
    }
}

impl Occupancy {
    pub fn add_occupancy(&mut self, task_id: TaskId, cells: &[CellCoord]) {
        for cell in cells {
            if let Some(occupants) = self.slot_mut(*cell) {
                occupants.insert(task_id);
            }
        }
    }

    /// Removes only `task_id`; cells still hosting other tasks stay occupied.
    pub fn remove_occupancy(&mut self, task_id: TaskId, cells: &[CellCoord]) {
        for cell in cells {
            if let Some(occupants) = self.slot_mut(*cell) {
                occupants.remove(&task_id);
            }
        }
    }

    pub fn occupants_at(&self, day: DayOfWeek, hour: u8) -> Vec<TaskId> {
        self.slot(day, hour)
            .map(|occupants| occupants.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_occupied(&self, day: DayOfWeek, hour: u8) -> bool {
        self.slot(day, hour)
            .map(|occupants| !occupants.is_empty())
            .unwrap_or(false)
    }

    /// Lowest occupant id; used to pick the cell's display label.
    pub fn representative(&self, day: DayOfWeek, hour: u8) -> Option<TaskId> {
        self.slot(day, hour)
            .and_then(|occupants| occupants.first().copied())
    }

    pub fn is_range_free(&self, day: DayOfWeek, start_hour: u8, duration: u32) -> bool {
        if start_hour >= 24 {
            return false;
        }
        distinct_cells_for(day, start_hour, duration)
            .into_iter()
            .all(|cell| !self.is_occupied(cell.day, cell.hour))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    fn slot(&self, day: DayOfWeek, hour: u8) -> Option<&BTreeSet<TaskId>> {
        if hour >= 24 {
            return None;
        }
        self.cells.get(WeekIndex::new(day, hour).value())
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Option<&mut BTreeSet<TaskId>> {
        if cell.hour >= 24 {
            return None;
        }
        self.cells.get_mut(WeekIndex::from(cell).value())
    }
}
