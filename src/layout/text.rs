use crate::{
    assets::library::{AssetLibrary, fold_letter},
    foundation::core::{Canvas, Point},
    project::settings::{Alignment, ProjectSettings},
};

/// Left margin for non-centered lines and top margin for the first line.
pub const MARGIN_PX: i64 = 50;
/// Padding added around the content bounds when sizing the canvas.
pub const CANVAS_PADDING_PX: i64 = 100;
pub const MIN_CANVAS_WIDTH: u32 = 800;
pub const MIN_CANVAS_HEIGHT: u32 = 400;

/// Sparse pair kerning: `(left, right, adjustment)`. Unlisted pairs adjust by 0.
///
/// Pairs are matched literally against case-folded text.
pub const KERNING_PAIRS: &[(char, char, i32)] = &[
    ('A', 'V', -20),
    ('W', 'A', -15),
    ('T', 'o', -10),
    ('T', 'y', -8),
    ('Y', 'o', -8),
];

/// Horizontal adjustment between `left` immediately followed by `right`.
pub fn kerning_adjust(left: char, right: char) -> i32 {
    KERNING_PAIRS
        .iter()
        .find(|(l, r, _)| *l == left && *r == right)
        .map_or(0, |(_, _, adj)| *adj)
}

/// One drawable letter with its resolved top-left position.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlacedLetter {
    pub letter: char,
    /// Line index in the source text, counting empty lines.
    pub line: usize,
    /// Index among the drawable letters of the line.
    pub position: usize,
    /// Index among all characters of the line, drawable or not.
    pub column: usize,
    /// Top-left corner on the canvas.
    pub origin: Point,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct LaidOutLine {
    /// Drawable letters; empty when no character of the line has an asset.
    pub letters: Vec<PlacedLetter>,
    /// Sum of letter advances.
    pub width: i64,
    /// Tallest letter in the line.
    pub height: u32,
    /// Top edge of the line box.
    pub top: f64,
}

impl LaidOutLine {
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// Geometry for every line of the text plus the canvas that contains it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextLayout {
    /// One entry per source line, empty ones included so indices stay stable.
    pub lines: Vec<LaidOutLine>,
    pub canvas: Canvas,
}

impl TextLayout {
    /// Every drawable letter in reading order.
    pub fn letters(&self) -> impl Iterator<Item = &PlacedLetter> {
        self.lines.iter().flat_map(|l| l.letters.iter())
    }

    pub fn letter_count(&self) -> usize {
        self.lines.iter().map(|l| l.letters.len()).sum()
    }
}

/// Result of laying out text: either drawable geometry or nothing to show.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum LayoutOutcome {
    /// No line holds a drawable letter; callers show a placeholder instead of a canvas.
    Empty,
    Ready(TextLayout),
}

impl LayoutOutcome {
    pub fn layout(&self) -> Option<&TextLayout> {
        match self {
            Self::Empty => None,
            Self::Ready(layout) => Some(layout),
        }
    }

    pub fn into_layout(self) -> Option<TextLayout> {
        match self {
            Self::Empty => None,
            Self::Ready(layout) => Some(layout),
        }
    }
}

/// Case-fold `text`, split it into lines and keep only characters present in `library`.
///
/// Each kept character carries its column in the case-folded line.
pub fn drawable_lines(text: &str, library: &AssetLibrary) -> Vec<Vec<(usize, char)>> {
    text.split('\n')
        .map(|line| {
            line.chars()
                .map(fold_letter)
                .enumerate()
                .filter(|(_, c)| library.contains(*c))
                .collect()
        })
        .collect()
}

/// Resolve per-letter geometry and canvas bounds for `text`.
#[tracing::instrument(skip(text, library, settings), fields(chars = text.len()))]
pub fn layout_text(text: &str, library: &AssetLibrary, settings: &ProjectSettings) -> LayoutOutcome {
    let lines = drawable_lines(text, library);
    if lines.iter().all(|l| l.is_empty()) {
        return LayoutOutcome::Empty;
    }

    let gap = settings.letter_gap();
    let mut out = Vec::with_capacity(lines.len());
    let mut max_width = i64::MIN;
    let mut content_height = 0i64;
    let mut non_empty = 0usize;

    for line in &lines {
        let mut laid = LaidOutLine::default();
        if line.is_empty() {
            out.push(laid);
            continue;
        }
        let mut width = 0i64;
        let mut height = 0u32;
        for (i, &(_, c)) in line.iter().enumerate() {
            let Some(asset) = library.get(c) else {
                continue;
            };
            height = height.max(asset.height());
            width += i64::from(asset.width());
            if let Some(&(_, next)) = line.get(i + 1) {
                width += gap + i64::from(kerning_adjust(c, next));
            }
        }
        laid.width = width;
        laid.height = height;
        max_width = max_width.max(width);
        content_height += i64::from(height);
        non_empty += 1;
        out.push(laid);
    }
    content_height += i64::from(settings.line_spacing) * (non_empty as i64 - 1);

    let canvas = Canvas {
        width: clamp_dim(max_width + CANVAS_PADDING_PX, MIN_CANVAS_WIDTH),
        height: clamp_dim(content_height + CANVAS_PADDING_PX, MIN_CANVAS_HEIGHT),
    };

    let mut y_cursor = MARGIN_PX as f64;
    for (line_idx, (line, laid)) in lines.iter().zip(out.iter_mut()).enumerate() {
        if line.is_empty() {
            continue;
        }
        laid.top = y_cursor;
        let line_h = f64::from(laid.height);
        let mut x = match settings.alignment {
            Alignment::Center => (f64::from(canvas.width) - laid.width as f64) / 2.0,
            Alignment::Baseline | Alignment::Left => MARGIN_PX as f64,
        };
        for (position, &(column, c)) in line.iter().enumerate() {
            let Some(asset) = library.get(c) else {
                continue;
            };
            let h = f64::from(asset.height());
            let y = match settings.alignment {
                Alignment::Baseline => y_cursor + line_h - h,
                Alignment::Center | Alignment::Left => y_cursor + (line_h - h) / 2.0,
            };
            laid.letters.push(PlacedLetter {
                letter: c,
                line: line_idx,
                position,
                column,
                origin: Point::new(x, y),
                width: asset.width(),
                height: asset.height(),
            });
            let kern = line
                .get(position + 1)
                .map_or(0, |&(_, next)| kerning_adjust(c, next));
            x += f64::from(asset.width()) + (gap + i64::from(kern)) as f64;
        }
        y_cursor += line_h + f64::from(settings.line_spacing);
    }

    LayoutOutcome::Ready(TextLayout { lines: out, canvas })
}

fn clamp_dim(v: i64, min: u32) -> u32 {
    u32::try_from(v.max(i64::from(min))).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
