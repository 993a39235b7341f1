use crate::domain::models::{CellCoord, DayOfWeek, Priority};
use crate::domain::occupancy::Occupancy;
use crate::domain::time_index::{HOURS_PER_DAY, WeekIndex};
use std::ops::Range;

/// Hours tried first for each priority before falling back to the whole day.
pub fn preferred_hours(priority: Priority) -> Range<u8> {
    match priority {
        Priority::High => 8..13,
        Priority::Medium => 12..17,
        Priority::Low => 16..23,
    }
}

/// Earliest free start that finishes by the deadline, scanning from Monday.
///
/// This is a local preview of what the store does in auto mode; the store's
/// answer is still the one that gets applied.
pub fn suggest_slot(
    occupancy: &Occupancy,
    duration: u32,
    priority: Priority,
    deadline_day: DayOfWeek,
    deadline_hour: u8,
) -> Option<CellCoord> {
    if duration == 0 {
        return None;
    }
    let deadline = WeekIndex::new(deadline_day, deadline_hour).value();
    let days = &DayOfWeek::ALL[..=deadline_day.index()];

    let fits = |day: DayOfWeek, hour: u8| {
        let start = WeekIndex::new(day, hour).value();
        start + duration as usize <= deadline && occupancy.is_range_free(day, hour, duration)
    };

    let preferred = days.iter().find_map(|day| {
        preferred_hours(priority)
            .find(|hour| fits(*day, *hour))
            .map(|hour| CellCoord::new(*day, hour))
    });
    preferred.or_else(|| {
        days.iter().find_map(|day| {
            (0..HOURS_PER_DAY as u8)
                .find(|hour| fits(*day, *hour))
                .map(|hour| CellCoord::new(*day, hour))
        })
    })
}
