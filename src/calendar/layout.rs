use super::{MonthExt, MonthGrid, WeekdayExt, DAYS_IN_WEEK, MONTHS};
use crate::series::Series;
use std::iter::successors;
use time::{error::ComponentRange, Date, Month};

/// The day numbers and values of one month, laid out in matching grids
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MonthPanel {
    month: Month,
    days: MonthGrid<u8>,
    values: MonthGrid<f64>,
}

impl MonthPanel {
    fn new(month: Month) -> Self {
        MonthPanel {
            month,
            days: MonthGrid::new(),
            values: MonthGrid::new(),
        }
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    /// Iterate over the month's days as `(row, col, day, value)`
    pub(crate) fn cells(&self) -> impl Iterator<Item = (usize, usize, u8, f64)> + '_ {
        self.days.cells().map(|(row, col, day)| {
            let value = self
                .values
                .get(row, col)
                .expect("value grid should be filled wherever the day grid is");
            (row, col, day, value)
        })
    }

    fn place(&mut self, row: usize, col: usize, day: u8, value: f64) {
        self.days.set(row, col, day);
        self.values.set(row, col, value);
    }
}

#[cfg(test)]
impl MonthPanel {
    pub(crate) fn days(&self) -> &MonthGrid<u8> {
        &self.days
    }

    pub(crate) fn values(&self) -> &MonthGrid<f64> {
        &self.values
    }
}

/// A year of [`MonthPanel`]s, January first
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct YearLayout {
    year: i32,
    panels: [MonthPanel; 12],
}

impl YearLayout {
    /// Lay out every day of `year` in Sunday-first month grids, taking each
    /// day's value from `series`
    pub(crate) fn split_months(series: &Series, year: i32) -> Result<YearLayout, ComponentRange> {
        let start = Date::from_calendar_date(year, Month::January, 1)?;
        let mut panels = MONTHS.map(MonthPanel::new);
        let mut row = 0;
        for date in successors(Some(start), |d| d.next_day()).take_while(|d| d.year() == year) {
            let col = date.weekday().index0();
            if date.day() == 1 {
                row = 0;
            }
            panels[date.month().index0()].place(row, col, date.day(), series.value_on(date));
            if col == DAYS_IN_WEEK - 1 {
                row += 1;
            }
        }
        Ok(YearLayout { year, panels })
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn panels(&self) -> &[MonthPanel; 12] {
        &self.panels
    }
}

#[cfg(test)]
impl YearLayout {
    pub(crate) fn panel(&self, month: Month) -> &MonthPanel {
        &self.panels[month.index0()]
    }
}
