use crate::domain::models::{CellCoord, DayOfWeek};

pub const HOURS_PER_DAY: usize = 24;
pub const WEEK_HOURS: usize = HOURS_PER_DAY * 7;

/// Linear hour of the week, `0..168`, Monday 00:00 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekIndex(usize);

impl WeekIndex {
    pub fn new(day: DayOfWeek, hour: u8) -> Self {
        Self((day.index() * HOURS_PER_DAY + hour as usize) % WEEK_HOURS)
    }

    pub fn value(self) -> usize {
        self.0
    }

    pub fn offset(self, hours: u64) -> Self {
        let step = (hours % WEEK_HOURS as u64) as usize;
        Self((self.0 + step) % WEEK_HOURS)
    }

    /// Hours from `self` forward to `other`, wrapping past Sunday 23:00.
    pub fn distance_to(self, other: WeekIndex) -> usize {
        (other.0 + WEEK_HOURS - self.0) % WEEK_HOURS
    }

    pub fn cell(self) -> CellCoord {
        CellCoord::new(
            DayOfWeek::from_index(self.0 / HOURS_PER_DAY),
            (self.0 % HOURS_PER_DAY) as u8,
        )
    }
}

impl From<CellCoord> for WeekIndex {
    fn from(cell: CellCoord) -> Self {
        Self::new(cell.day, cell.hour)
    }
}

/// Cells covered by a task, in order. Always exactly `duration` entries; a
/// duration past one week revisits cells.
pub fn cells_for(day: DayOfWeek, start_hour: u8, duration: u32) -> Vec<CellCoord> {
    let base = WeekIndex::new(day, start_hour);
    (0..duration as u64)
        .map(|offset| base.offset(offset).cell())
        .collect()
}

/// Like `cells_for`, but a duration of a week or more yields each of the 168
/// cells once instead of revisiting them.
pub fn distinct_cells_for(day: DayOfWeek, start_hour: u8, duration: u32) -> Vec<CellCoord> {
    cells_for(day, start_hour, duration.min(WEEK_HOURS as u32))
}

/// True when `cell` falls inside `[start, start + duration)` on the wrapped week.
pub fn covers(day: DayOfWeek, start_hour: u8, duration: u32, cell: CellCoord) -> bool {
    if duration as usize >= WEEK_HOURS {
        return true;
    }
    WeekIndex::new(day, start_hour).distance_to(WeekIndex::from(cell)) < duration as usize
}
