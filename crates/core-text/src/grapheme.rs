//! Grapheme cluster boundary helpers over plain `&str`.

use crate::egc_width;
use unicode_segmentation::UnicodeSegmentation;

/// Previous grapheme boundary (0 when already at or before the first one).
pub fn prev_boundary(s: &str, byte: usize) -> usize {
    if byte == 0 || byte > s.len() {
        return 0;
    }
    let mut last = 0;
    for (idx, _) in s.grapheme_indices(true) {
        if idx >= byte {
            break;
        }
        last = idx;
    }
    last
}

/// Next grapheme boundary (`s.len()` when at or beyond the end).
pub fn next_boundary(s: &str, byte: usize) -> usize {
    if byte >= s.len() {
        return s.len();
    }
    for (idx, _) in s.grapheme_indices(true) {
        if idx > byte {
            return idx;
        }
    }
    s.len()
}

/// Move `byte` forward to the nearest cluster boundary at or after it.
pub fn snap_to_boundary(s: &str, byte: usize) -> usize {
    if byte >= s.len() {
        return s.len();
    }
    for (idx, g) in s.grapheme_indices(true) {
        if idx == byte {
            return byte;
        }
        if idx < byte && byte < idx + g.len() {
            return idx + g.len();
        }
    }
    s.len()
}

/// Visual column (terminal cells) of `byte` within a single line.
pub fn visual_col(line: &str, byte: usize) -> usize {
    let mut col = 0;
    for (idx, g) in line.grapheme_indices(true) {
        if idx >= byte {
            break;
        }
        col += egc_width(g) as usize;
    }
    col
}

/// Byte offset of the last cluster starting at or before visual column `col`.
pub fn byte_at_col(line: &str, col: usize) -> usize {
    let mut acc = 0;
    for (idx, g) in line.grapheme_indices(true) {
        let w = egc_width(g) as usize;
        if acc + w > col {
            return idx;
        }
        acc += w;
    }
    line.len()
}

/// Longest prefix of `line` that fits in `cols` cells, with its width.
pub fn fit_width(line: &str, cols: usize) -> (&str, usize) {
    let mut acc = 0;
    for (idx, g) in line.grapheme_indices(true) {
        let w = egc_width(g) as usize;
        if acc + w > cols {
            return (&line[..idx], acc);
        }
        acc += w;
    }
    (line, acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_step_over_combining_marks() {
        let s = "e\u{0301}a";
        assert_eq!(next_boundary(s, 0), 3);
        assert_eq!(prev_boundary(s, 3), 0);
        assert_eq!(snap_to_boundary(s, 1), 3);
        assert_eq!(snap_to_boundary(s, 99), s.len());
    }

    #[test]
    fn columns_account_for_wide_clusters() {
        let line = "漢a";
        assert_eq!(visual_col(line, 3), 2);
        assert_eq!(byte_at_col(line, 1), 0);
        assert_eq!(byte_at_col(line, 2), 3);
        assert_eq!(byte_at_col(line, 9), line.len());
    }

    #[test]
    fn fit_width_never_splits_a_cluster() {
        assert_eq!(fit_width("漢漢", 3), ("漢", 2));
        assert_eq!(fit_width("abc", 5), ("abc", 3));
    }
}
