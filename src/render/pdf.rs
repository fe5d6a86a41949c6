use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::{fit_lines, page_title, project, CellVariant, CellView, RenderInput};
use crate::calendar::{DayCell, SLOTS_PER_MONTH};
use crate::error::{Error, ErrorKind, Result};
use crate::i18n::{self, Translations};
use crate::layout::{
    self, AxisOrientation, LabelWidths, LayoutResult, MonthsPerPage, PAGE_MARGIN,
};
use crate::pagination::{paginate, PageGroup};
use crate::paper::{PageDimensions, PaperSpec};

const EMPTY_FILL: u32 = 0xf9fafb;
const WEEKEND_FILL: u32 = 0xe0f2fe;
const HOLIDAY_FILL: u32 = 0xfce7f3;
const REGULAR_FILL: u32 = 0xffffff;
const BORDER: u32 = 0xd1d5db;
const HOLIDAY_LABEL: u32 = 0xec4899;
const TEXT: u32 = 0x111827;
const MUTED_TEXT: u32 = 0x6b7280;

const DAY_NUMBER_SCALE: f32 = 0.7;
const HOLIDAY_LABEL_SCALE: f32 = 0.5;
const NOTE_SCALE: f32 = 0.6;
const TITLE_SCALE: f32 = 1.8;

const BORDER_THICKNESS: f32 = 0.5;
const CELL_PADDING: f32 = 1.5;

fn pt(value: f32) -> Mm {
    Mm::from(Pt(value))
}

fn color(rgb: u32) -> Color {
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
    Color::Rgb(Rgb::new(channel(16), channel(8), channel(0), None))
}

fn fill_for(variant: CellVariant) -> u32 {
    match variant {
        CellVariant::Empty => EMPTY_FILL,
        CellVariant::Regular => REGULAR_FILL,
        CellVariant::Weekend => WEEKEND_FILL,
        CellVariant::Holiday => HOLIDAY_FILL,
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// File names of fonts known to carry Hangul glyphs.
const HANGUL_FONT_FILES: &[&str] = &[
    "NanumGothic.ttf",
    "NotoSansKR-Regular.ttf",
    "UnDotum.ttf",
    "AppleGothic.ttf",
];

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/nanum",
    "/usr/share/fonts/nanum-gothic",
    "/usr/share/fonts/naver-nanum",
    "/usr/share/fonts/truetype/noto",
    "/usr/share/fonts/truetype/unfonts-core",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
];

/// Installed fonts that can show Hangul, the user's font directory first.
pub fn hangul_font_candidates() -> Vec<PathBuf> {
    dirs::font_dir()
        .into_iter()
        .chain(SYSTEM_FONT_DIRS.iter().map(PathBuf::from))
        .flat_map(|dir| HANGUL_FONT_FILES.iter().map(move |file| dir.join(file)))
        .filter(|path| path.is_file())
        .collect()
}

/// Whether the WinAnsi encoding of the builtin fonts has a glyph for `c`.
fn builtin_glyph(c: char) -> bool {
    matches!(
        c,
        '\n' | '\u{20}'..='\u{7e}'
            | '\u{a0}'..='\u{ff}'
            | '\u{2013}'
            | '\u{2014}'
            | '\u{2018}'..='\u{201e}'
            | '\u{2022}'
            | '\u{2026}'
            | '\u{20ac}'
            | '\u{2122}'
    )
}

fn builtin_can_show(text: &str) -> bool {
    text.chars().all(builtin_glyph)
}

/// First piece of text in the document the builtin fonts cannot show.
fn text_beyond_builtin(input: &RenderInput, translations: &Translations) -> Option<String> {
    let ui = &translations.ui;
    let fixed = [
        ui.title,
        ui.first_half,
        ui.second_half,
        ui.month_header,
        ui.day_header,
    ];
    if let Some(text) = fixed.iter().find(|text| !builtin_can_show(text)) {
        return Some((*text).to_owned());
    }

    let days = input
        .grid
        .months
        .iter()
        .flat_map(|month| month.day_cells.iter())
        .filter_map(DayCell::day);
    for month in input.grid.months.iter() {
        if !builtin_can_show(&month.month_name) {
            return Some(month.month_name.to_string());
        }
    }
    for holiday in days.filter_map(|day| day.holiday.as_ref()) {
        let label = translations.holiday_name(&holiday.name);
        if !builtin_can_show(&label) {
            return Some(label.into_owned());
        }
    }
    input
        .notes
        .values()
        .find(|note| !builtin_can_show(note))
        .cloned()
}

fn external_font(doc: &PdfDocumentReference, path: &Path) -> Result<IndirectFontRef> {
    let file = File::open(path)?;
    Ok(doc.add_external_font(file)?)
}

impl Fonts {
    fn external(font: IndirectFontRef) -> Self {
        Fonts {
            regular: font.clone(),
            bold: font,
        }
    }

    /// The configured font wins. Without one, the builtin Helvetica is used
    /// unless some text needs glyphs it lacks, in which case an installed
    /// Hangul font is required.
    fn load(
        doc: &PdfDocumentReference,
        font_path: Option<&Path>,
        fallbacks: &[PathBuf],
        needs_glyphs: Option<&str>,
    ) -> Result<Self> {
        if let Some(path) = font_path {
            match external_font(doc, path) {
                Ok(font) => return Ok(Fonts::external(font)),
                Err(err) => log::warn!("Could not load font '{}': {}", path.display(), err),
            }
        }

        let text = match needs_glyphs {
            Some(text) => text,
            None => {
                return Ok(Fonts {
                    regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
                    bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
                })
            }
        };

        for path in fallbacks {
            match external_font(doc, path) {
                Ok(font) => {
                    log::info!("Using installed font '{}'", path.display());
                    return Ok(Fonts::external(font));
                }
                Err(err) => log::warn!("Could not load font '{}': {}", path.display(), err),
            }
        }

        Err(Error::new(
            ErrorKind::Render,
            &format!(
                "no font with Hangul glyphs found for '{}', set export.font to a TrueType font such as NanumGothic",
                text
            ),
        ))
    }
}

/// A rectangle in points, `top` measured from the bottom of the page.
#[derive(Clone, Copy, Debug)]
struct Frame {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl Frame {
    fn bottom(&self) -> f32 {
        self.top - self.height
    }
}

struct PageRenderer<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    layout: &'a LayoutResult,
    translations: &'static Translations,
    input: &'a RenderInput<'a>,
}

impl PageRenderer<'_> {
    fn rect(&self, frame: Frame, fill: u32) {
        let corners = vec![
            (Point::new(pt(frame.left), pt(frame.top)), false),
            (Point::new(pt(frame.left + frame.width), pt(frame.top)), false),
            (Point::new(pt(frame.left + frame.width), pt(frame.bottom())), false),
            (Point::new(pt(frame.left), pt(frame.bottom())), false),
        ];
        self.layer.set_fill_color(color(fill));
        self.layer.set_outline_color(color(BORDER));
        self.layer.set_outline_thickness(BORDER_THICKNESS);
        self.layer.add_polygon(Polygon {
            rings: vec![corners],
            mode: PaintMode::FillStroke,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef, rgb: u32) {
        self.layer.set_fill_color(color(rgb));
        self.layer.use_text(text, size, pt(x), pt(y), font);
    }

    fn title(&self, title: &str, page: PageDimensions) {
        let size = self.layout.font_size * TITLE_SCALE;
        let y = page.height - PAGE_MARGIN - size;
        self.text(title, size, self.layout.content.left, y, &self.fonts.bold, TEXT);
    }

    /// Label or header cell with one line of bold text.
    fn label(&self, frame: Frame, text: &str) {
        self.rect(frame, REGULAR_FILL);
        let size = self.layout.font_size;
        let lines = fit_lines(text, frame.width - 2.0 * CELL_PADDING, size, 1);
        if let Some(line) = lines.first() {
            let y = frame.top - (frame.height + size) / 2.0 + size * 0.2;
            self.text(line, size, frame.left + CELL_PADDING, y, &self.fonts.bold, TEXT);
        }
    }

    fn cell(&self, frame: Frame, view: &CellView) {
        self.rect(frame, fill_for(view.variant));

        let font_size = self.layout.font_size;
        let inner_width = frame.width - 2.0 * CELL_PADDING;
        let mut baseline = frame.top - CELL_PADDING;

        if let Some(day) = view.day_number {
            let size = font_size * DAY_NUMBER_SCALE;
            baseline -= size;
            let rgb = if view.variant == CellVariant::Holiday {
                HOLIDAY_LABEL
            } else {
                MUTED_TEXT
            };
            self.text(
                &day.to_string(),
                size,
                frame.left + CELL_PADDING,
                baseline,
                &self.fonts.regular,
                rgb,
            );
        }

        if let Some(label) = &view.holiday_label {
            let size = font_size * HOLIDAY_LABEL_SCALE;
            for line in fit_lines(label, inner_width, size, 1) {
                baseline -= size * 1.2;
                self.text(
                    &line,
                    size,
                    frame.left + CELL_PADDING,
                    baseline,
                    &self.fonts.regular,
                    HOLIDAY_LABEL,
                );
            }
        }

        if let Some(note) = view.note {
            let size = font_size * NOTE_SCALE;
            let line_height = size * 1.2;
            let room = baseline - frame.bottom() - CELL_PADDING;
            let max_lines = (room / line_height).floor().max(0.0) as usize;
            for line in fit_lines(note, inner_width, size, max_lines) {
                baseline -= line_height;
                self.text(
                    &line,
                    size,
                    frame.left + CELL_PADDING,
                    baseline,
                    &self.fonts.regular,
                    TEXT,
                );
            }
        }
    }

    fn draw_cell(&self, frame: Frame, cell: &DayCell) {
        let view = project(cell, self.input.axis, self.translations, self.input.notes);
        self.cell(frame, &view);
    }

    fn grid(&self, group: &PageGroup) {
        let l = self.layout;
        let content = l.content;
        let data_left = content.left + l.label_column_width;
        let data_top = content.top - l.header_height;

        let header = |left: f32, width: f32| Frame {
            left,
            top: content.top,
            width,
            height: l.header_height,
        };
        let data = |column: usize, row: usize| Frame {
            left: data_left + column as f32 * l.cell_width,
            top: data_top - row as f32 * l.cell_height,
            width: l.cell_width,
            height: l.cell_height,
        };
        let row_label = |row: usize| Frame {
            left: content.left,
            top: data_top - row as f32 * l.cell_height,
            width: l.label_column_width,
            height: l.cell_height,
        };

        let ui = &self.translations.ui;
        match self.input.axis {
            AxisOrientation::Horizontal => {
                self.label(header(content.left, l.label_column_width), ui.month_header);
                for slot in 0..SLOTS_PER_MONTH {
                    self.label(
                        header(data_left + slot as f32 * l.cell_width, l.cell_width),
                        &(slot + 1).to_string(),
                    );
                }
                for (row, month) in group.months.iter().enumerate() {
                    self.label(row_label(row), &month.month_name);
                    for (column, cell) in month.day_cells.iter().enumerate() {
                        self.draw_cell(data(column, row), cell);
                    }
                }
            }
            AxisOrientation::Vertical => {
                self.label(header(content.left, l.label_column_width), ui.day_header);
                for (column, month) in group.months.iter().enumerate() {
                    self.label(
                        header(data_left + column as f32 * l.cell_width, l.cell_width),
                        &month.month_name,
                    );
                }
                for row in 0..SLOTS_PER_MONTH {
                    self.label(row_label(row), &(row + 1).to_string());
                    for (column, month) in group.months.iter().enumerate() {
                        self.draw_cell(data(column, row), &month.day_cells[row]);
                    }
                }
            }
        }
    }
}

/// Renders the year onto one page per page group and returns the PDF bytes.
pub fn render(input: &RenderInput, paper: PaperSpec, font_path: Option<&Path>) -> Result<Vec<u8>> {
    render_with_fonts(input, paper, font_path, &hangul_font_candidates())
}

fn render_with_fonts(
    input: &RenderInput,
    paper: PaperSpec,
    font_path: Option<&Path>,
    fallbacks: &[PathBuf],
) -> Result<Vec<u8>> {
    let grid = input.grid;
    let pages = paginate(&grid.months, paper.page_layout_mode);
    let layout = layout::solve_with_labels(
        paper.paper_size,
        paper.page_orientation,
        input.axis,
        MonthsPerPage::from(paper.page_layout_mode),
        LabelWidths::for_language(input.language),
    );
    let dimensions = paper.dimensions();
    let translations = i18n::resolve(input.language);

    let document_title = format!("{} {}", grid.year, translations.ui.title);
    let (doc, first_page, first_layer) = PdfDocument::new(
        &document_title,
        pt(dimensions.width),
        pt(dimensions.height),
        "Layer 1",
    );
    let needs_glyphs = text_beyond_builtin(input, translations);
    let fonts = Fonts::load(&doc, font_path, fallbacks, needs_glyphs.as_deref())?;

    log::debug!(
        "Rendering {} page(s) for {} on {} {} ({:?})",
        pages.len(),
        grid.year,
        paper.paper_size,
        paper.page_orientation,
        layout
    );

    for group in pages.iter() {
        let layer = if group.index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) =
                doc.add_page(pt(dimensions.width), pt(dimensions.height), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        let renderer = PageRenderer {
            layer,
            fonts: &fonts,
            layout: &layout,
            translations,
            input,
        };
        renderer.title(
            &page_title(grid.year, input.language, paper.page_layout_mode, group),
            dimensions,
        );
        renderer.grid(group);
    }

    Ok(doc.save_to_bytes()?)
}
