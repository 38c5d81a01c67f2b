//! Terminal cell widths for grid text
//!
//! Column widths, padding and horizontal offsets are all measured in
//! terminal cells, so a CJK glyph counts twice and a combining mark not at
//! all.

use std::borrow::Cow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cells taken by a single character; control characters take none
#[inline]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Cells taken by `s` once drawn
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Single-line form of a cell value
///
/// Line breaks, tabs and other control characters become spaces, and runs of
/// spaces collapse to one. Values that need no change are borrowed.
pub fn single_line(value: &str) -> Cow<'_, str> {
    let needs_work = value.contains(char::is_control) || value.contains("  ");
    if !needs_work {
        return Cow::Borrowed(value);
    }

    let mut line = String::with_capacity(value.len());
    for ch in value.chars() {
        let ch = if ch.is_control() { ' ' } else { ch };
        if ch == ' ' && line.ends_with(' ') {
            continue;
        }
        line.push(ch);
    }
    Cow::Owned(line)
}

/// Longest prefix of `s` that fits in `max_width` cells
pub fn take_width(s: &str, max_width: usize) -> (&str, usize) {
    let mut used = 0;
    for (idx, ch) in s.char_indices() {
        let w = char_width(ch);
        if used + w > max_width {
            return (&s[..idx], used);
        }
        used += w;
    }
    (s, used)
}

/// The cells `offset..offset + width` of `s`
///
/// A wide glyph cut by either edge is replaced by spaces so the result is
/// never wider than `width` and later cells keep their columns.
pub fn clip_cells(s: &str, offset: usize, width: usize) -> String {
    let end = offset.saturating_add(width);
    let mut clipped = String::with_capacity(width);
    let mut col = 0;

    for ch in s.chars() {
        if col >= end {
            break;
        }
        let w = char_width(ch);
        if w == 0 {
            // Combining marks stay with a visible base character
            if col > offset {
                clipped.push(ch);
            }
            continue;
        }

        let next = col + w;
        if col >= offset && next <= end {
            clipped.push(ch);
        } else if next > offset {
            let visible = next.min(end) - col.max(offset);
            clipped.extend(std::iter::repeat(' ').take(visible));
        }
        col = next;
    }
    clipped
}
