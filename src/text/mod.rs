//! # Text Layout
//!
//! Greedy line breaking and measurement with real font metrics.
//!
//! Break opportunities come from UAX#14 (`unicode-linebreak`), so text in
//! Portuguese with non-breaking spaces, dashes and quotation marks breaks in
//! the right places. Two rules differ from a general-purpose engine:
//!
//! - There is no hyphenation. A single token wider than the wrap width is
//!   placed on its own line and allowed to overhang, never split.
//! - Empty input still produces one (empty) line, so every block has a
//!   measurable height. Placeholder substitution for empty body text happens
//!   at the call site via [`or_placeholder`].

use crate::font::FontContext;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line breaking. Width is millimetres, with trailing
/// spaces excluded so centered and right-aligned drawing stays true.
#[derive(Debug, Clone)]
pub struct Line {
    pub text: String,
    pub width: f64,
}

/// Substitute `placeholder` when `text` has no visible content.
pub fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Entry `i` answers "may a line end before char `i`?". Index 0 is always
/// `None`; the end-of-text opportunity UAX#14 reports is dropped.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        let mut char_idx = 0;
        for (byte_idx, _) in text.char_indices() {
            map[byte_idx] = char_idx;
            char_idx += 1;
        }
        map[text.len()] = char_idx;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break a string into lines no wider than `max_width` millimetres,
    /// except for single unsplittable tokens wider than that.
    pub fn break_into_lines(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        family: &str,
        weight: u32,
        italic: bool,
        font_size: f64,
    ) -> Vec<Line> {
        if text.is_empty() {
            return vec![Line {
                text: String::new(),
                width: 0.0,
            }];
        }

        let chars: Vec<char> = text.chars().collect();
        let char_widths: Vec<f64> = chars
            .iter()
            .map(|&ch| font_context.char_width(ch, family, weight, italic, font_size))
            .collect();
        let break_opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        // Char index a line may end before, if any lies inside the current line.
        let mut break_point: Option<usize> = None;

        for (i, &ch) in chars.iter().enumerate() {
            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        // Flush up to (not including) the terminator; CRLF
                        // drops both characters.
                        let mut end = i;
                        while end > line_start && is_line_terminator(chars[end - 1]) {
                            end -= 1;
                        }
                        lines.push(make_line(&chars[line_start..end], &char_widths[line_start..end]));
                        line_start = i;
                        line_width = 0.0;
                        break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        break_point = Some(i);
                    }
                    None => {}
                }
            }

            if is_line_terminator(ch) {
                continue;
            }

            let char_width = char_widths[i];
            if line_width + char_width > max_width && line_start < i {
                if let Some(bp) = break_point.filter(|&bp| bp > line_start) {
                    lines.push(make_line(&chars[line_start..bp], &char_widths[line_start..bp]));
                    line_start = bp;
                    line_width = char_widths[bp..=i].iter().sum();
                    break_point = None;
                    continue;
                }
                // No opportunity inside the line: the token overhangs until
                // the next break, unsplit.
            }

            line_width += char_width;
        }

        if line_start < chars.len() {
            let mut end = chars.len();
            while end > line_start && is_line_terminator(chars[end - 1]) {
                end -= 1;
            }
            lines.push(make_line(&chars[line_start..end], &char_widths[line_start..end]));
        }
        if lines.is_empty() {
            lines.push(Line {
                text: String::new(),
                width: 0.0,
            });
        }

        lines
    }

    /// Width of a string on a single line, in millimetres.
    pub fn measure_width(
        &self,
        font_context: &FontContext,
        text: &str,
        family: &str,
        weight: u32,
        italic: bool,
        font_size: f64,
    ) -> f64 {
        font_context.measure(text, family, weight, italic, font_size)
    }
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Assemble a [`Line`], excluding trailing spaces from the width.
fn make_line(chars: &[char], widths: &[f64]) -> Line {
    let mut width: f64 = widths.iter().sum();
    let mut end = chars.len();
    while end > 0 && chars[end - 1] == ' ' {
        end -= 1;
        width -= widths[end];
    }

    Line {
        text: chars.iter().collect(),
        width,
    }
}
