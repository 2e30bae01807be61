//! File name and media type rules for Markdown documents.

use crate::LocationInfo;

const MARKDOWN_TYPES: [&str; 2] = ["text/markdown", "text/x-markdown"];
const GENERIC_TYPES: [&str; 2] = ["text/plain", "application/octet-stream"];

fn ends_with_ignore_ascii_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// `.md` or `.markdown`, ASCII case-insensitive.
pub fn has_markdown_extension(name: &str) -> bool {
    ends_with_ignore_ascii_case(name, ".md") || ends_with_ignore_ascii_case(name, ".markdown")
}

/// Save target name with `.md` appended unless it already carries a Markdown
/// suffix.
pub fn ensure_markdown_extension(name: &str) -> String {
    if has_markdown_extension(name) {
        name.to_string()
    } else {
        format!("{name}.md")
    }
}

/// Import acceptance: a Markdown media type; or a generic text/binary type
/// with a Markdown name; or, as a last resort, a Markdown name alone.
pub fn is_markdown(info: &LocationInfo) -> bool {
    let named = has_markdown_extension(&info.display_name);
    match info.media_type.as_deref() {
        Some(t) if MARKDOWN_TYPES.contains(&t) => true,
        Some(t) if GENERIC_TYPES.contains(&t) && named => true,
        _ => named,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(media_type: Option<&str>, name: &str) -> LocationInfo {
        LocationInfo {
            media_type: media_type.map(str::to_string),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn appends_md_when_missing() {
        assert_eq!(ensure_markdown_extension("note"), "note.md");
        assert_eq!(ensure_markdown_extension("note.txt"), "note.txt.md");
    }

    #[test]
    fn keeps_existing_suffix_any_case() {
        assert_eq!(ensure_markdown_extension("note.md"), "note.md");
        assert_eq!(ensure_markdown_extension("NOTE.MD"), "NOTE.MD");
        assert_eq!(ensure_markdown_extension("a.Markdown"), "a.Markdown");
    }

    #[test]
    fn suffix_check_is_char_boundary_safe() {
        assert!(!has_markdown_extension("ノート"));
        assert_eq!(ensure_markdown_extension("ノート"), "ノート.md");
    }

    #[test]
    fn markdown_media_type_accepted_regardless_of_name() {
        assert!(is_markdown(&info(Some("text/markdown"), "export")));
        assert!(is_markdown(&info(Some("text/x-markdown"), "export.bin")));
    }

    #[test]
    fn generic_types_need_markdown_name() {
        assert!(is_markdown(&info(Some("text/plain"), "a.md")));
        assert!(is_markdown(&info(Some("application/octet-stream"), "a.MARKDOWN")));
        assert!(!is_markdown(&info(Some("text/plain"), "a.txt")));
    }

    #[test]
    fn name_alone_is_last_resort() {
        assert!(is_markdown(&info(None, "readme.md")));
        assert!(is_markdown(&info(Some("image/png"), "odd.md")));
        assert!(!is_markdown(&info(None, "readme")));
    }
}
