//! Page geometry for the printed calendar.
//!
//! Uses the fill-axis strategy: cell width and height are solved independently
//! so the grid spans the content box edge to edge on both axes. Cells are
//! rectangular in general. Label columns have a fixed width.

use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::calendar::SLOTS_PER_MONTH;
use crate::error::{Error, ErrorKind};
use crate::i18n::Language;
use crate::paper::{PageDimensions, PageLayoutMode, PageOrientation, PaperSize};

/// Uniform page margin in points.
pub const PAGE_MARGIN: f32 = 10.0;
/// Height reserved above the grid for the title.
pub const TITLE_BAND_HEIGHT: f32 = 25.0;

/// Header row height as a fraction of a data row.
pub const HORIZONTAL_HEADER_FRACTION: f32 = 0.75;
pub const VERTICAL_HEADER_FRACTION: f32 = 0.5;

pub const MIN_FONT_SIZE: f32 = 5.0;
pub const MAX_FONT_SIZE: f32 = 9.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub enum AxisOrientation {
    /// Months as rows, 31 day columns.
    Horizontal,
    /// Days as rows, month columns.
    Vertical,
}

impl Default for AxisOrientation {
    fn default() -> Self {
        AxisOrientation::Horizontal
    }
}

impl AxisOrientation {
    pub const ALL: [AxisOrientation; 2] = [AxisOrientation::Horizontal, AxisOrientation::Vertical];

    pub fn toggled(&self) -> Self {
        match self {
            AxisOrientation::Horizontal => AxisOrientation::Vertical,
            AxisOrientation::Vertical => AxisOrientation::Horizontal,
        }
    }
}

impl fmt::Display for AxisOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AxisOrientation::Horizontal => "horizontal",
            AxisOrientation::Vertical => "vertical",
        })
    }
}

impl FromStr for AxisOrientation {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "horizontal" | "h" => Ok(AxisOrientation::Horizontal),
            "vertical" | "v" => Ok(AxisOrientation::Vertical),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                &format!("Axis orientation '{}' not recognized", other),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonthsPerPage {
    Six,
    Twelve,
}

impl MonthsPerPage {
    pub fn count(&self) -> usize {
        match self {
            MonthsPerPage::Six => 6,
            MonthsPerPage::Twelve => 12,
        }
    }
}

impl TryFrom<usize> for MonthsPerPage {
    type Error = Error;
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            6 => Ok(MonthsPerPage::Six),
            12 => Ok(MonthsPerPage::Twelve),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                &format!("{} months per page not supported, expected 6 or 12", other),
            )),
        }
    }
}

impl From<PageLayoutMode> for MonthsPerPage {
    fn from(mode: PageLayoutMode) -> Self {
        match mode {
            PageLayoutMode::Single => MonthsPerPage::Twelve,
            PageLayoutMode::TwoPage => MonthsPerPage::Six,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelWidths {
    /// Month-name column in the horizontal axis.
    pub month_label: f32,
    /// Day-number column in the vertical axis.
    pub day_label: f32,
}

impl Default for LabelWidths {
    fn default() -> Self {
        LabelWidths::for_language(Language::En)
    }
}

impl LabelWidths {
    pub fn for_language(language: Language) -> Self {
        LabelWidths {
            month_label: match language {
                Language::Ko => 45.0,
                Language::En => 55.0,
            },
            day_label: 25.0,
        }
    }

    fn for_axis(&self, axis: AxisOrientation) -> f32 {
        match axis {
            AxisOrientation::Horizontal => self.month_label,
            AxisOrientation::Vertical => self.day_label,
        }
    }
}

/// Page area left after margins and the title band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentBox {
    pub left: f32,
    /// Distance of the top edge from the bottom of the page.
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ContentBox {
    pub fn for_page(page: PageDimensions) -> Self {
        ContentBox {
            left: PAGE_MARGIN,
            top: page.height - PAGE_MARGIN - TITLE_BAND_HEIGHT,
            width: page.width - 2.0 * PAGE_MARGIN,
            height: page.height - 2.0 * PAGE_MARGIN - TITLE_BAND_HEIGHT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutResult {
    pub cell_width: f32,
    pub cell_height: f32,
    pub label_column_width: f32,
    pub header_height: f32,
    pub font_size: f32,
    pub data_columns: usize,
    pub data_rows: usize,
    pub content: ContentBox,
}

impl LayoutResult {
    pub fn grid_width(&self) -> f32 {
        self.label_column_width + self.cell_width * self.data_columns as f32
    }

    pub fn grid_height(&self) -> f32 {
        self.header_height + self.cell_height * self.data_rows as f32
    }
}

pub fn solve(
    paper_size: PaperSize,
    page_orientation: PageOrientation,
    axis: AxisOrientation,
    months_per_page: MonthsPerPage,
) -> LayoutResult {
    solve_with_labels(
        paper_size,
        page_orientation,
        axis,
        months_per_page,
        LabelWidths::default(),
    )
}

pub fn solve_with_labels(
    paper_size: PaperSize,
    page_orientation: PageOrientation,
    axis: AxisOrientation,
    months_per_page: MonthsPerPage,
    labels: LabelWidths,
) -> LayoutResult {
    let content = ContentBox::for_page(paper_size.dimensions(page_orientation));

    let (data_columns, data_rows, header_fraction) = match axis {
        AxisOrientation::Horizontal => (
            SLOTS_PER_MONTH,
            months_per_page.count(),
            HORIZONTAL_HEADER_FRACTION,
        ),
        AxisOrientation::Vertical => (
            months_per_page.count(),
            SLOTS_PER_MONTH,
            VERTICAL_HEADER_FRACTION,
        ),
    };

    let label_column_width = labels.for_axis(axis);
    assert!(
        label_column_width > 0.0 && label_column_width < content.width,
        "label column must fit the content box"
    );

    let cell_width = (content.width - label_column_width) / data_columns as f32;
    let cell_height = content.height / (data_rows as f32 + header_fraction);
    let font_size = (cell_width.min(cell_height) / 6.0).max(MIN_FONT_SIZE).min(MAX_FONT_SIZE);

    LayoutResult {
        cell_width,
        cell_height,
        label_column_width,
        header_height: cell_height * header_fraction,
        font_size,
        data_columns,
        data_rows,
        content,
    }
}
