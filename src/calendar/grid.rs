use super::{DAYS_IN_WEEK, WEEKS_IN_MONTH};

/// A month laid out as six Sunday-first week rows.  `None` marks cells that
/// do not belong to the month.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid<T>([[Option<T>; DAYS_IN_WEEK]; WEEKS_IN_MONTH]);

impl<T: Copy> MonthGrid<T> {
    pub(crate) fn new() -> Self {
        MonthGrid([[None; DAYS_IN_WEEK]; WEEKS_IN_MONTH])
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> Option<T> {
        self.0.get(row).and_then(|week| week.get(col)).copied().flatten()
    }

    pub(super) fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(
            row < WEEKS_IN_MONTH,
            "a Sunday-first month should never span more than {WEEKS_IN_MONTH} weeks"
        );
        assert!(col < DAYS_IN_WEEK, "weekday column out of range");
        self.0[row][col] = Some(value);
    }

    /// Iterate over the filled cells in row-major order as `(row, col, value)`
    pub(crate) fn cells(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.0.iter().enumerate().flat_map(|(row, week)| {
            week.iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|v| (row, col, v)))
        })
    }
}

#[cfg(test)]
impl<T: Copy> MonthGrid<T> {
    /// Number of week rows containing at least one filled cell
    pub(crate) fn rows_used(&self) -> usize {
        self.0
            .iter()
            .rposition(|week| week.iter().any(Option::is_some))
            .map_or(0, |i| i + 1)
    }
}

impl<T: Copy> Default for MonthGrid<T> {
    fn default() -> Self {
        MonthGrid::new()
    }
}
