//! Row layout and character-boundary helpers for the composer.
//!
//! The composer wraps by display column, not by word, so a byte offset
//! maps to exactly one (row, column) cell and back.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Borders (2) + padding (2) consumed horizontally by the composer block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Rows shown before the composer scrolls internally
pub(super) const MAX_VISIBLE_ROWS: u16 = 5;
/// Gap between the text column and the send button
pub(super) const BUTTON_GAP: u16 = 1;

/// One visual row of the buffer, as a byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Row {
    pub start: usize,
    pub end: usize,
}

/// Split `text` into visual rows no wider than `width` columns.
/// Always returns at least one row; a trailing newline opens an empty row.
pub(super) fn layout_rows(text: &str, width: u16) -> Vec<Row> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut line_start = 0;

    for line in text.split('\n') {
        let mut row_start = line_start;
        let mut row_width = 0;
        for (i, c) in line.char_indices() {
            let w = c.width().unwrap_or(0);
            if row_width > 0 && row_width + w > width {
                rows.push(Row {
                    start: row_start,
                    end: line_start + i,
                });
                row_start = line_start + i;
                row_width = 0;
            }
            row_width += w;
        }
        rows.push(Row {
            start: row_start,
            end: line_start + line.len(),
        });
        line_start += line.len() + 1;
    }

    rows
}

/// Row and column of the byte offset `pos`.
///
/// A position on a soft-wrap boundary belongs to the start of the next row;
/// a position at the end of a logical line stays on that line.
pub(super) fn locate(text: &str, rows: &[Row], pos: usize) -> (usize, u16) {
    for (idx, row) in rows.iter().enumerate() {
        let continues = rows.get(idx + 1).is_some_and(|next| next.start == row.end);
        if pos >= row.start && (pos < row.end || (pos == row.end && !continues)) {
            return (idx, text[row.start..pos].width() as u16);
        }
    }
    let last = rows.len().saturating_sub(1);
    let col = rows
        .last()
        .map(|row| text[row.start..row.end].width() as u16)
        .unwrap_or(0);
    (last, col)
}

/// Byte offset in `row` closest to display column `col`, never past the row end.
pub(super) fn offset_at_column(text: &str, row: Row, col: u16) -> usize {
    let mut acc = 0u16;
    for (i, c) in text[row.start..row.end].char_indices() {
        let w = c.width().unwrap_or(0) as u16;
        if acc + w > col {
            return row.start + i;
        }
        acc += w;
    }
    row.end
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_one_row() {
        assert_eq!(layout_rows("", 10), vec![Row { start: 0, end: 0 }]);
    }

    #[test]
    fn long_line_breaks_at_width() {
        let rows = layout_rows("abcdefgh", 3);
        assert_eq!(
            rows,
            vec![
                Row { start: 0, end: 3 },
                Row { start: 3, end: 6 },
                Row { start: 6, end: 8 },
            ]
        );
    }

    #[test]
    fn newlines_start_rows() {
        let rows = layout_rows("ab\n\ncd\n", 10);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], Row { start: 3, end: 3 });
        assert_eq!(rows[3], Row { start: 7, end: 7 });
    }

    #[test]
    fn wide_chars_count_double() {
        // each CJK char is two columns
        let rows = layout_rows("日本語", 4);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Row { start: 0, end: 6 });
    }

    #[test]
    fn soft_wrap_boundary_moves_to_next_row() {
        let text = "abcdef";
        let rows = layout_rows(text, 3);
        assert_eq!(locate(text, &rows, 3), (1, 0));
        assert_eq!(locate(text, &rows, 6), (1, 3));
    }

    #[test]
    fn hard_line_end_stays_on_line() {
        let text = "abc\nd";
        let rows = layout_rows(text, 3);
        assert_eq!(locate(text, &rows, 3), (0, 3));
        assert_eq!(locate(text, &rows, 4), (1, 0));
    }

    #[test]
    fn column_lookup_clamps_to_row() {
        let text = "abc\nd";
        let rows = layout_rows(text, 10);
        assert_eq!(offset_at_column(text, rows[1], 5), 5);
        assert_eq!(offset_at_column(text, rows[0], 1), 1);
    }

    #[test]
    fn char_boundaries_handle_multibyte() {
        let s = "a🔥b";
        assert_eq!(next_char_boundary(s, 1), 5);
        assert_eq!(prev_char_boundary(s, 5), 1);
        assert_eq!(next_char_boundary(s, 6), 6);
        assert_eq!(prev_char_boundary(s, 0), 0);
    }
}
