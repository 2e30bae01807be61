//! Display width of one grapheme cluster.
//!
//! All column math in the workspace goes through [`egc_width`]. Emoji
//! sequences (ZWJ, variation selector 16, regional indicator pairs) are
//! widened to 2 cells because `unicode-width` sums their code points.

use unicode_width::UnicodeWidthStr;

const ZWJ: char = '\u{200D}';
const VS16: char = '\u{FE0F}';

pub fn egc_width(cluster: &str) -> u16 {
    if cluster.is_empty() {
        return 0;
    }
    if cluster.contains(ZWJ) || is_flag(cluster) {
        return 2;
    }
    if cluster.contains(VS16) {
        return 2;
    }
    cluster.width().min(2) as u16
}

fn is_flag(cluster: &str) -> bool {
    let mut chars = cluster.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(a), Some(b), None) if is_regional(a) && is_regional(b)
    )
}

fn is_regional(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}
