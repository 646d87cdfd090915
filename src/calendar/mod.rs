mod grid;
mod layout;
pub(crate) use self::grid::MonthGrid;
pub(crate) use self::layout::{MonthPanel, YearLayout};
use time::{Month, Month::*, Weekday};

/// Number of week rows in each month panel
pub(crate) const WEEKS_IN_MONTH: usize = 6;

pub(crate) const DAYS_IN_WEEK: usize = 7;

/// Column headers of a month panel, Sunday first
pub(crate) static DAY_LABELS: [&str; DAYS_IN_WEEK] = ["S", "M", "T", "W", "T", "F", "S"];

/// Months in the order their panels are laid out
pub(crate) static MONTHS: [Month; 12] = [
    January, February, March, April, May, June, July, August, September, October, November,
    December,
];

pub(crate) trait WeekdayExt {
    /// Column of the weekday in a Sunday-first week
    fn index0(&self) -> usize;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> usize {
        self.number_days_from_sunday().into()
    }
}

pub(crate) trait MonthExt {
    /// Zero-based position of the month within the year
    fn index0(&self) -> usize;
}

impl MonthExt for Month {
    fn index0(&self) -> usize {
        usize::from(u8::from(*self)) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Weekday::*;

    #[test]
    fn test_weekday_columns() {
        // (monday0 + 1) mod 7
        for wd in [Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday] {
            let monday0 = usize::from(wd.number_days_from_monday());
            assert_eq!(wd.index0(), (monday0 + 1) % DAYS_IN_WEEK);
        }
        assert_eq!(Sunday.index0(), 0);
        assert_eq!(Saturday.index0(), 6);
    }

    #[test]
    fn test_months_in_order() {
        for (i, month) in MONTHS.iter().enumerate() {
            assert_eq!(month.index0(), i);
        }
    }
}
