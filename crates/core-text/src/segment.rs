//! Normalization for text entering the surface from outside the keyboard
//! path (bracketed paste).
//!
//! Contract: returns NFC text with `\r\n` and lone `\r` folded to `\n`, plus
//! the number of grapheme clusters. Callers log sizes only, never content.

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

pub fn normalize_pasted(input: &str) -> (String, usize) {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    let normalized: String = unified.nfc().collect();
    let clusters = normalized.graphemes(true).count();
    (normalized, clusters)
}
