use crate::domain::buckets::PriorityBuckets;
use crate::domain::models::{CellCoord, DayOfWeek, Task, TaskId};
use crate::domain::occupancy::Occupancy;
use crate::domain::time_index::distinct_cells_for;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("task {0} is already registered")]
    DuplicateTask(TaskId),
    #[error("task {0} is not registered")]
    UnknownTask(TaskId),
    #[error("task {id} is invalid: {reason}")]
    InvalidTask { id: TaskId, reason: String },
}

/// A task plus the cells computed when it was applied. Retraction removes
/// exactly these cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub task: Task,
    pub cells: Vec<CellCoord>,
}

/// Client-side source of truth. The occupancy grid and the priority buckets
/// are owned here and only change through `apply`, `retract` and
/// `replace_all`, so all three stay consistent after every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRegistry {
    entries: HashMap<TaskId, RegistryEntry>,
    occupancy: Occupancy,
    buckets: PriorityBuckets,
}

impl TaskRegistry {
    pub fn apply(&mut self, task: Task) -> Result<(), RegistryError> {
        if self.entries.contains_key(&task.id) {
            return Err(RegistryError::DuplicateTask(task.id));
        }
        task.validate().map_err(|reason| RegistryError::InvalidTask {
            id: task.id,
            reason,
        })?;
        let start_hour = task.start_hour().map_err(|reason| RegistryError::InvalidTask {
            id: task.id,
            reason,
        })?;

        let cells = distinct_cells_for(task.day, start_hour, task.duration);
        self.occupancy.add_occupancy(task.id, &cells);
        self.buckets.insert(task.id, task.priority);
        self.entries.insert(task.id, RegistryEntry { task, cells });
        Ok(())
    }

    pub fn retract(&mut self, task_id: TaskId) -> Result<Task, RegistryError> {
        let entry = self
            .entries
            .remove(&task_id)
            .ok_or(RegistryError::UnknownTask(task_id))?;
        self.occupancy.remove_occupancy(task_id, &entry.cells);
        self.buckets.remove(task_id, entry.task.priority);
        Ok(entry.task)
    }

    /// Full resync. Tasks that cannot be applied are skipped and returned so
    /// the caller can report them; the rest are applied in order.
    pub fn replace_all<I>(&mut self, tasks: I) -> Vec<RegistryError>
    where
        I: IntoIterator<Item = Task>,
    {
        self.entries.clear();
        self.occupancy.clear();
        self.buckets.clear();

        tasks
            .into_iter()
            .filter_map(|task| self.apply(task).err())
            .collect()
    }

    pub fn get(&self, task_id: TaskId) -> Option<&Task> {
        self.entries.get(&task_id).map(|entry| &entry.task)
    }

    pub fn entry(&self, task_id: TaskId) -> Option<&RegistryEntry> {
        self.entries.get(&task_id)
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.entries.contains_key(&task_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<TaskId> {
        let mut ids = self.entries.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn buckets(&self) -> &PriorityBuckets {
        &self.buckets
    }

    /// Tasks occupying the cell, ordered by id.
    pub fn tasks_at(&self, day: DayOfWeek, hour: u8) -> Vec<&Task> {
        self.occupancy
            .occupants_at(day, hour)
            .into_iter()
            .filter_map(|task_id| self.get(task_id))
            .collect()
    }

    pub fn cell_label(&self, day: DayOfWeek, hour: u8) -> Option<&str> {
        self.occupancy
            .representative(day, hour)
            .and_then(|task_id| self.get(task_id))
            .map(|task| task.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Priority;
    use crate::test_support::task;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn multiplicity_survives_partial_retraction() {
        let mut registry = TaskRegistry::default();
        registry
            .apply(task(1, Priority::High, DayOfWeek::Monday, 10, 2))
            .expect("apply A");
        registry
            .apply(task(2, Priority::Low, DayOfWeek::Monday, 11, 1))
            .expect("apply B");

        assert_eq!(registry.occupancy().occupants_at(DayOfWeek::Monday, 11), vec![1, 2]);

        registry.retract(2).expect("retract B");
        assert_eq!(registry.occupancy().occupants_at(DayOfWeek::Monday, 11), vec![1]);
        assert!(registry.occupancy().is_occupied(DayOfWeek::Monday, 11));

        registry.retract(1).expect("retract A");
        assert!(registry.occupancy().occupants_at(DayOfWeek::Monday, 11).is_empty());
        assert!(!registry.occupancy().is_occupied(DayOfWeek::Monday, 11));
    }

    #[test]
    fn write_report_lifecycle() {
        let mut registry = TaskRegistry::default();
        let mut report = task(10, Priority::High, DayOfWeek::Tuesday, 9, 2);
        report.title = "Write report".to_string();
        registry.apply(report.clone()).expect("apply");

        assert!(registry.occupancy().is_occupied(DayOfWeek::Tuesday, 9));
        assert!(registry.occupancy().is_occupied(DayOfWeek::Tuesday, 10));
        assert!(!registry.occupancy().is_occupied(DayOfWeek::Tuesday, 11));
        assert_eq!(registry.buckets().snapshot(Priority::High), vec![10]);
        assert_eq!(registry.tasks_at(DayOfWeek::Tuesday, 10), vec![&report]);
        assert_eq!(registry.cell_label(DayOfWeek::Tuesday, 9), Some("Write report"));

        registry.retract(10).expect("retract");
        assert!(!registry.occupancy().is_occupied(DayOfWeek::Tuesday, 9));
        assert!(!registry.occupancy().is_occupied(DayOfWeek::Tuesday, 10));
        assert!(registry.buckets().snapshot(Priority::High).is_empty());
        assert_eq!(registry.retract(10), Err(RegistryError::UnknownTask(10)));
    }

    #[test]
    fn duplicate_apply_is_rejected_without_mutation() {
        let mut registry = TaskRegistry::default();
        registry
            .apply(task(3, Priority::Medium, DayOfWeek::Friday, 8, 1))
            .expect("apply");
        let before = registry.clone();

        let result = registry.apply(task(3, Priority::High, DayOfWeek::Saturday, 8, 4));
        assert_eq!(result, Err(RegistryError::DuplicateTask(3)));
        assert_eq!(registry, before);
    }

    #[test]
    fn invalid_task_is_rejected() {
        let mut registry = TaskRegistry::default();
        let mut broken = task(4, Priority::Low, DayOfWeek::Monday, 8, 1);
        broken.time = "8am".to_string();
        assert!(matches!(
            registry.apply(broken),
            Err(RegistryError::InvalidTask { id: 4, .. })
        ));
        assert!(registry.is_empty());
        assert_eq!(registry.occupancy().occupied_count(), 0);
    }

    #[test]
    fn week_long_store_task_fills_the_grid_once() {
        let mut registry = TaskRegistry::default();
        let rejected = registry.replace_all(vec![task(8, Priority::Low, DayOfWeek::Wednesday, 18, 24 * 7 * 60)]);

        assert!(rejected.is_empty());
        assert_eq!(registry.entry(8).map(|entry| entry.cells.len()), Some(168));
        assert_eq!(registry.occupancy().occupied_count(), 168);

        registry.retract(8).expect("retract");
        assert_eq!(registry.occupancy().occupied_count(), 0);
    }

    #[test]
    fn replace_all_discards_previous_state_and_reports_rejects() {
        let mut registry = TaskRegistry::default();
        registry
            .apply(task(1, Priority::High, DayOfWeek::Monday, 8, 3))
            .expect("apply");

        let rejected = registry.replace_all(vec![
            task(2, Priority::Low, DayOfWeek::Sunday, 23, 2),
            task(2, Priority::Low, DayOfWeek::Sunday, 23, 2),
        ]);

        assert_eq!(rejected, vec![RegistryError::DuplicateTask(2)]);
        assert_eq!(registry.ids(), vec![2]);
        assert!(!registry.occupancy().is_occupied(DayOfWeek::Monday, 8));
        assert!(registry.occupancy().is_occupied(DayOfWeek::Monday, 0));
        assert!(registry.buckets().snapshot(Priority::High).is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Apply(Task),
        Retract(TaskId),
    }

    fn priority_strategy() -> impl Strategy<Value = Priority> {
        prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1i64..12, priority_strategy(), 0usize..7, 0u8..24, 1u32..30).prop_map(
                |(id, priority, day, hour, duration)| {
                    Op::Apply(task(id, priority, DayOfWeek::from_index(day), hour, duration))
                }
            ),
            (1i64..12).prop_map(Op::Retract),
        ]
    }

    // Property 4: buckets partition the registry by priority, and every cell's
    // occupants are exactly the tasks whose stored cells include it.
    proptest! {
        #[test]
        fn property4_structures_stay_consistent(ops in proptest::collection::vec(op_strategy(), 0..60)) {
            let mut registry = TaskRegistry::default();
            for op in ops {
                match op {
                    Op::Apply(task) => { let _ = registry.apply(task); }
                    Op::Retract(id) => { let _ = registry.retract(id); }
                }
            }

            let mut bucketed = BTreeSet::new();
            for priority in Priority::ALL {
                for id in registry.buckets().snapshot(priority) {
                    prop_assert!(bucketed.insert(id), "task {} in two buckets", id);
                    prop_assert_eq!(registry.get(id).map(|task| task.priority), Some(priority));
                }
            }
            let registered = registry.ids().into_iter().collect::<BTreeSet<_>>();
            prop_assert_eq!(&bucketed, &registered);

            for day in DayOfWeek::ALL {
                for hour in 0u8..24 {
                    let cell = CellCoord::new(day, hour);
                    let expected = registered
                        .iter()
                        .copied()
                        .filter(|id| registry.entry(*id).map(|entry| entry.cells.contains(&cell)).unwrap_or(false))
                        .collect::<Vec<_>>();
                    prop_assert_eq!(registry.occupancy().occupants_at(day, hour), expected);
                }
            }
        }
    }
}
