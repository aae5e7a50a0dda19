//! Page metrics, text wrapping and locale formatting for the previews.
//!
//! Text measurement is approximate: glyphs are assumed to be a fixed
//! fraction of the font size wide. That is enough to keep HTML and SVG
//! output aligned, since both are laid out from the same wrapped lines.

use chrono::{Datelike, NaiveDate};
use folio_core::PageSize;

/// Month names used in long dates.
const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Page geometry used by both previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    /// Page size in pixels.
    pub page: PageSize,
    /// Uniform page margin in pixels.
    pub margin: i32,
}

impl PageLayout {
    /// Default margin.
    pub const DEFAULT_MARGIN: i32 = 64;

    /// Layout for `page` with the default margin.
    #[must_use]
    pub const fn new(page: PageSize) -> Self {
        Self {
            page,
            margin: Self::DEFAULT_MARGIN,
        }
    }

    /// Width available between the margins.
    #[must_use]
    pub const fn content_width(&self) -> i32 {
        self.page.width - 2 * self.margin
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::new(PageSize::A4)
    }
}

/// Line height for a font size.
#[must_use]
pub fn line_height(font_size: u8) -> i32 {
    i32::from(font_size) * 3 / 2
}

/// Approximate advance width of one character.
#[must_use]
pub fn char_width(font_size: u8) -> i32 {
    (i32::from(font_size) * 11 / 20).max(1)
}

/// Approximate rendered width of `text`.
#[must_use]
pub fn text_width(text: &str, font_size: u8) -> i32 {
    i32::try_from(text.chars().count())
        .unwrap_or(i32::MAX)
        .saturating_mul(char_width(font_size))
}

/// Greedy word wrap into lines no wider than `max_width`.
///
/// Explicit newlines are kept. A word longer than a whole line is split
/// at the character boundary.
#[must_use]
pub fn wrap_text(text: &str, font_size: u8, max_width: i32) -> Vec<String> {
    let max_chars = usize::try_from((max_width / char_width(font_size)).max(1)).unwrap_or(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed > max_chars && line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line_len += word.len();
            line.extend(word);
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Height of `line_count` lines at `font_size`.
#[must_use]
pub fn block_height(line_count: usize, font_size: u8) -> i32 {
    i32::try_from(line_count)
        .unwrap_or(i32::MAX)
        .saturating_mul(line_height(font_size))
}

/// `2024-05-01` as `1 Mei 2024`. Unparseable input is returned verbatim.
#[must_use]
pub fn format_long_date(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_or_else(
        |_| date.to_string(),
        |d| format!("{} {} {}", d.day(), MONTHS[d.month0() as usize], d.year()),
    )
}

/// `2024-05-01` as `01/05/2024`. Unparseable input is returned verbatim.
#[must_use]
pub fn format_short_date(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_or_else(|_| date.to_string(), |d| d.format("%d/%m/%Y").to_string())
}

/// Parse an amount as entered in the form.
///
/// Accepts plain decimals from number inputs (`1500.50`, `11.5`) as well as
/// Indonesian grouping (`1.000.000`, `1.500,75`). A single dot followed by
/// exactly three digits is read as a thousands separator.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<f64> {
    let compact: String = raw
        .trim()
        .trim_start_matches("Rp")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let dots = compact.matches('.').count();
    let cleaned = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else if dots > 1 || (dots == 1 && groups_thousands(&compact)) {
        compact.replace('.', "")
    } else {
        compact
    };
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn groups_thousands(value: &str) -> bool {
    value.split_once('.').is_some_and(|(int, frac)| {
        let int = int.trim_start_matches('-');
        !int.is_empty() && int != "0" && frac.len() == 3 && frac.chars().all(|c| c.is_ascii_digit())
    })
}

/// Rupiah with dot thousands separators, rounded to whole units.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}
