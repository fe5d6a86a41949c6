use crate::calendar::{MonthSlice, MONTHS_PER_YEAR};
use crate::layout::MonthsPerPage;
use crate::paper::PageLayoutMode;

/// Months printed together on one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageGroup<'a> {
    pub index: usize,
    pub months: &'a [MonthSlice],
}

impl PageGroup<'_> {
    pub fn first_month_index(&self) -> Option<usize> {
        self.months.first().map(|m| m.month_index)
    }
}

pub fn paginate(months: &[MonthSlice], mode: PageLayoutMode) -> Vec<PageGroup<'_>> {
    assert_eq!(months.len(), MONTHS_PER_YEAR, "pagination needs a full year");

    months
        .chunks(MonthsPerPage::from(mode).count())
        .enumerate()
        .map(|(index, months)| PageGroup { index, months })
        .collect()
}
