//! Static font-metric tables for the PDF standard fonts used by the structured renderer.
//!
//! Widths are in thousandths of an em, taken from the Adobe core-font AFM files.
//! Tables cover ASCII 0x20..=0x7E (95 printable characters); index = (char as usize) - 32.
//! Anything outside that range measures as `average_char_width`.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// PDF base-14 fonts the structured renderer can emit without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PdfFont {
    /// Fixed-pitch. Default for resume exports.
    Courier,
    /// Proportional sans-serif.
    Helvetica,
}

impl PdfFont {
    /// The `/BaseFont` name written into the PDF font dictionary.
    pub fn base_font(&self) -> &'static str {
        match self {
            PdfFont::Courier => "Courier",
            PdfFont::Helvetica => "Helvetica",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page layout
// ────────────────────────────────────────────────────────────────────────────

/// Geometry for a structured export. All lengths are in PostScript points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub width_pt: f32,
    pub height_pt: f32,
    /// Applied on all four sides.
    pub margin_pt: f32,
    pub line_height_pt: f32,
    pub font: PdfFont,
    pub font_size_pt: f32,
}

impl PageLayout {
    /// A4 portrait, 40pt margins, Courier 12pt on a 12pt line pitch.
    pub fn a4() -> Self {
        Self {
            width_pt: 595.28,
            height_pt: 841.89,
            margin_pt: 40.0,
            line_height_pt: 12.0,
            font: PdfFont::Courier,
            font_size_pt: 12.0,
        }
    }

    /// Usable line width between the left and right margins.
    pub fn text_width_pt(&self) -> f32 {
        self.width_pt - self.margin_pt * 2.0
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

pub struct FontMetricTable {
    pub font: PdfFont,
    widths: [u16; 95],
    pub average_char_width: u16,
}

impl FontMetricTable {
    /// Width of one character in points at `size_pt`.
    pub fn char_width(&self, c: char, size_pt: f32) -> f32 {
        let code = c as usize;
        let units = if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        };
        f32::from(units) * size_pt / 1000.0
    }

    /// Rendered width of a string in points at `size_pt`.
    pub fn measure_str(&self, s: &str, size_pt: f32) -> f32 {
        s.chars().map(|c| self.char_width(c, size_pt)).sum()
    }
}

static COURIER_TABLE: FontMetricTable = FontMetricTable {
    font: PdfFont::Courier,
    widths: [600; 95],
    average_char_width: 600,
};

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    font: PdfFont::Helvetica,
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    average_char_width: 556,
};

/// Returns the static metric table for a font.
pub fn get_metrics(font: PdfFont) -> &'static FontMetricTable {
    match font {
        PdfFont::Courier => &COURIER_TABLE,
        PdfFont::Helvetica => &HELVETICA_TABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_is_fixed_pitch() {
        let metrics = get_metrics(PdfFont::Courier);
        assert!((metrics.measure_str("iiii", 12.0) - metrics.measure_str("MMMM", 12.0)).abs() < 1e-4);
        assert!((metrics.char_width('x', 12.0) - 7.2).abs() < 1e-4);
    }

    #[test]
    fn test_helvetica_is_proportional() {
        let metrics = get_metrics(PdfFont::Helvetica);
        assert!(metrics.measure_str("iiii", 12.0) < metrics.measure_str("MMMM", 12.0));
        // "Rust" = R(722) + u(556) + s(500) + t(278) = 2056 units
        let width = metrics.measure_str("Rust", 10.0);
        assert!((width - 20.56).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let metrics = get_metrics(PdfFont::Helvetica);
        assert!((metrics.char_width('é', 10.0) - 5.56).abs() < 1e-4);
    }

    #[test]
    fn test_a4_layout_text_width() {
        let layout = PageLayout::a4();
        assert!((layout.text_width_pt() - 515.28).abs() < 1e-3);
        assert_eq!(layout.font, PdfFont::Courier);
        assert_eq!(layout.font_size_pt, 12.0);
    }
}
