//! Pure text layout: font-size selection, character-count word wrap, and
//! block planning.
//!
//! Nothing here touches fonts or pixels directly; line measurement is
//! injected as a closure so the planner stays deterministic and testable
//! without a rasterizer.

use crate::foundation::error::VerseResult;

/// Fixed vertical gap between wrapped lines, in pixels.
pub const LINE_GAP_PX: f64 = 20.0;

/// Choose the font size in points from the verse's character count.
///
/// Step function: longer verses get smaller type so the block still fits the
/// portrait canvas.
pub fn font_size_for(char_count: usize) -> u32 {
    if char_count > 300 {
        60
    } else if char_count > 200 {
        70
    } else if char_count > 100 {
        80
    } else {
        100
    }
}

/// Maximum characters per wrapped line for a font size.
///
/// `2000 / size` with floor division, clamped to `15..=25`.
pub fn chars_per_line(font_size: u32) -> usize {
    (2000 / font_size).clamp(15, 25) as usize
}

/// Greedy word-boundary wrap.
///
/// Words accumulate onto a line while the running length (joined with single
/// spaces) stays within `max_chars`; a word longer than the limit sits alone
/// on its own line. Whitespace runs, including newlines, collapse to single
/// separators. Width is approximate by design: the count is characters, not
/// measured glyph advance.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_chars = word_chars;
        } else if current_chars + 1 + word_chars <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_chars += 1 + word_chars;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_chars = word_chars;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// One wrapped line with its measured pixel extents.
#[derive(Clone, Debug, PartialEq)]
pub struct LineLayout {
    /// Line text after wrapping.
    pub text: String,
    /// Measured line width in pixels.
    pub width_px: f64,
    /// Measured line height in pixels.
    pub height_px: f64,
}

/// Planned text block: the chosen size, wrapped lines, and cumulative height.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Font size chosen from the character count.
    pub font_size: u32,
    /// Wrapped lines in top-to-bottom order.
    pub lines: Vec<LineLayout>,
    /// Sum over lines of `height_px + LINE_GAP_PX`.
    pub total_height: f64,
}

/// Plan a verse into a measured block.
///
/// `measure` maps `(line_text, font_size_px)` to `(width_px, height_px)` for
/// the font in use. The planner is pure with respect to its inputs: the same
/// text and measurer always yield the same block.
pub fn plan_block(
    text: &str,
    mut measure: impl FnMut(&str, f32) -> VerseResult<(f64, f64)>,
) -> VerseResult<TextBlock> {
    let font_size = font_size_for(text.chars().count());
    let max_chars = chars_per_line(font_size);

    let mut lines = Vec::new();
    let mut total_height = 0.0;
    for line in wrap_words(text, max_chars) {
        let (width_px, height_px) = measure(&line, font_size as f32)?;
        total_height += height_px + LINE_GAP_PX;
        lines.push(LineLayout {
            text: line,
            width_px,
            height_px,
        });
    }

    Ok(TextBlock {
        font_size,
        lines,
        total_height,
    })
}
