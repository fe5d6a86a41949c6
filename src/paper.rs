use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};
use crate::layout::AxisOrientation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub enum PaperSize {
    A4,
    A3,
    B4,
    Letter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub enum PageLayoutMode {
    /// All twelve months on one page.
    Single,
    /// January to June, then July to December.
    TwoPage,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaperSpec {
    pub paper_size: PaperSize,
    pub page_orientation: PageOrientation,
    pub page_layout_mode: PageLayoutMode,
}

impl Default for PaperSize {
    fn default() -> Self {
        PaperSize::A4
    }
}

impl Default for PageLayoutMode {
    fn default() -> Self {
        PageLayoutMode::Single
    }
}

impl PaperSize {
    pub const ALL: [PaperSize; 4] = [PaperSize::A4, PaperSize::A3, PaperSize::B4, PaperSize::Letter];

    /// Portrait dimensions in points (1/72 inch).
    pub fn base_dimensions(&self) -> PageDimensions {
        let (width, height) = match self {
            PaperSize::A4 => (595.0, 842.0),
            PaperSize::A3 => (842.0, 1191.0),
            PaperSize::B4 => (709.0, 1001.0),
            PaperSize::Letter => (612.0, 792.0),
        };
        PageDimensions { width, height }
    }

    pub fn dimensions(&self, orientation: PageOrientation) -> PageDimensions {
        let base = self.base_dimensions();
        match orientation {
            PageOrientation::Portrait => base,
            PageOrientation::Landscape => PageDimensions {
                width: base.height,
                height: base.width,
            },
        }
    }
}

impl PageOrientation {
    pub const ALL: [PageOrientation; 2] = [PageOrientation::Portrait, PageOrientation::Landscape];

    /// Default pairing: months-as-rows reads best on a wide page. Only a default,
    /// any combination is accepted.
    pub fn suggested_for(axis: AxisOrientation) -> Self {
        match axis {
            AxisOrientation::Horizontal => PageOrientation::Landscape,
            AxisOrientation::Vertical => PageOrientation::Portrait,
        }
    }
}

impl PageLayoutMode {
    pub const ALL: [PageLayoutMode; 2] = [PageLayoutMode::Single, PageLayoutMode::TwoPage];
}

impl Default for PaperSpec {
    fn default() -> Self {
        PaperSpec {
            paper_size: PaperSize::default(),
            page_orientation: PageOrientation::Landscape,
            page_layout_mode: PageLayoutMode::default(),
        }
    }
}

impl PaperSpec {
    pub fn dimensions(&self) -> PageDimensions {
        self.paper_size.dimensions(self.page_orientation)
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaperSize::A4 => "A4",
            PaperSize::A3 => "A3",
            PaperSize::B4 => "B4",
            PaperSize::Letter => "Letter",
        })
    }
}

impl FromStr for PaperSize {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "a3" => Ok(PaperSize::A3),
            "b4" => Ok(PaperSize::B4),
            "letter" => Ok(PaperSize::Letter),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                &format!("Paper size '{}' not supported, expected A4|A3|B4|Letter", other),
            )),
        }
    }
}

impl fmt::Display for PageOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageOrientation::Portrait => "portrait",
            PageOrientation::Landscape => "landscape",
        })
    }
}

impl FromStr for PageOrientation {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "portrait" => Ok(PageOrientation::Portrait),
            "landscape" => Ok(PageOrientation::Landscape),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                &format!("Page orientation '{}' not recognized", other),
            )),
        }
    }
}

impl fmt::Display for PageLayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageLayoutMode::Single => "single",
            PageLayoutMode::TwoPage => "two-page",
        })
    }
}

impl FromStr for PageLayoutMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(PageLayoutMode::Single),
            "two-page" | "twopage" | "two_page" => Ok(PageLayoutMode::TwoPage),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                &format!("Page layout '{}' not recognized, expected single|two-page", other),
            )),
        }
    }
}
