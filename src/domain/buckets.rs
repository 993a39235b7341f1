use crate::domain::models::{Priority, TaskId};

/// High/Medium/Low task lists. Append order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityBuckets {
    high: Vec<TaskId>,
    medium: Vec<TaskId>,
    low: Vec<TaskId>,
}

impl PriorityBuckets {
    pub fn insert(&mut self, task_id: TaskId, priority: Priority) {
        let bucket = self.bucket_mut(priority);
        if !bucket.contains(&task_id) {
            bucket.push(task_id);
        }
    }

    /// Returns false when the id was not a member.
    pub fn remove(&mut self, task_id: TaskId, priority: Priority) -> bool {
        let bucket = self.bucket_mut(priority);
        let before = bucket.len();
        bucket.retain(|candidate| *candidate != task_id);
        bucket.len() != before
    }

    pub fn snapshot(&self, priority: Priority) -> Vec<TaskId> {
        self.bucket(priority).to_vec()
    }

    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.high.clear();
        self.medium.clear();
        self.low.clear();
    }

    fn bucket(&self, priority: Priority) -> &[TaskId] {
        match priority {
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }

    fn bucket_mut(&mut self, priority: Priority) -> &mut Vec<TaskId> {
        match priority {
            Priority::High => &mut self.high,
            Priority::Medium => &mut self.medium,
            Priority::Low => &mut self.low,
        }
    }
}
