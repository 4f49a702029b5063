//! Static Helvetica metrics and the page geometry used by the PDF exporter.
//!
//! Character widths are in em units (AFM width / 1000). Only ASCII 0x20..=0x7E
//! carries exact widths; the rest of WinAnsi falls back to `average_char_width`,
//! which is close enough for greedy wrapping at the configured margins.
//! Index = (char as usize) - 32.

/// Millimetres to PDF points.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Layout parameters for an exported page. All lengths are in points.
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_left_pt: f32,
    pub margin_right_pt: f32,
    pub margin_top_pt: f32,
    /// A line whose cell would cross this margin starts a new page.
    pub margin_bottom_pt: f32,
    /// Horizontal padding inside each paragraph cell.
    pub cell_padding_pt: f32,
    pub line_height_pt: f32,
    pub font_size_pt: f32,
}

/// A4 portrait, Helvetica 12pt, 10mm side/top margins, 15mm page-break margin,
/// 10mm line height.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        page_width_pt: 210.0 * PT_PER_MM,
        page_height_pt: 297.0 * PT_PER_MM,
        margin_left_pt: 10.0 * PT_PER_MM,
        margin_right_pt: 10.0 * PT_PER_MM,
        margin_top_pt: 10.0 * PT_PER_MM,
        margin_bottom_pt: 15.0 * PT_PER_MM,
        cell_padding_pt: 1.0 * PT_PER_MM,
        line_height_pt: 10.0 * PT_PER_MM,
        font_size_pt: 12.0,
    }
}

impl PageConfig {
    /// Usable text width in em units at the configured font size.
    pub fn text_width_em(&self) -> f32 {
        let width_pt = self.page_width_pt
            - self.margin_left_pt
            - self.margin_right_pt
            - 2.0 * self.cell_padding_pt;
        width_pt / self.font_size_pt
    }

    /// How many line cells fit between the top margin and the page-break margin.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height_pt - self.margin_top_pt - self.margin_bottom_pt;
        ((usable / self.line_height_pt).floor() as usize).max(1)
    }

    /// Left edge of the text inside a cell.
    pub fn text_x(&self) -> f32 {
        self.margin_left_pt + self.cell_padding_pt
    }

    /// PDF-space baseline (origin bottom-left) of the `slot`-th line on a page.
    ///
    /// The baseline sits half a cell down plus 0.3em, vertically centring the glyphs.
    pub fn baseline_y(&self, slot: usize) -> f32 {
        let cell_top = self.margin_top_pt + slot as f32 * self.line_height_pt;
        let from_top = cell_top + 0.5 * self.line_height_pt + 0.3 * self.font_size_pt;
        self.page_height_pt - from_top
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for the export font.
pub struct FontMetricTable {
    pub base_font: &'static str,
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.measure_char(c)).sum()
    }

    fn measure_char(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Greedy word-wrap of a single paragraph at `max_width_em`.
    ///
    /// Runs of whitespace collapse to one space. A word wider than the line is
    /// split at character boundaries, so text extracted back from the PDF shows
    /// that word (a long URL, say) with a space at each break. A blank paragraph
    /// yields one empty line so it still occupies a line cell.
    pub fn wrap(&self, paragraph: &str, max_width_em: f32) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_w = self.measure_str(word);
            let space_w = if current.is_empty() { 0.0 } else { self.space_width };

            if current_width + space_w + word_w <= max_width_em {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += space_w + word_w;
                continue;
            }

            // Word does not fit on the current line
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_w <= max_width_em {
                current.push_str(word);
                current_width = word_w;
            } else {
                for c in word.chars() {
                    let char_w = self.measure_char(c);
                    if !current.is_empty() && current_width + char_w > max_width_em {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(c);
                    current_width += char_w;
                }
            }
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width table  (95 ASCII printable characters)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica — one of the PDF standard 14 fonts, so nothing needs embedding.
pub static HELVETICA: FontMetricTable = FontMetricTable {
    base_font: "Helvetica",
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
