/// Document shown when the session starts without content.
pub const SAMPLE_DOCUMENT: &str = "# Markdown Editor\n\n\
This is a **bold** text.\n\n\
This is an *italic* text.\n\n\
## List Example\n\
* Item 1\n\
* Item 2\n\
* Item 3\n\n\
[Link Example](https://example.com)";
