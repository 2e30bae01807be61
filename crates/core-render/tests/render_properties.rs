use core_render::{MarkdownRenderer, Renderer};
use proptest::prelude::*;

fn markdownish() -> impl Strategy<Value = String> {
    let pieces = prop::sample::select(vec![
        "# ", "## ", "* ", "1. ", "> ", "```", "`", "**", "*", "~~", "[a](b)", "| x |", "---",
        "\n", "\n\n", "\r\n", "word", " ", "é", "🙂", "<b>", "- [ ] ",
    ]);
    prop::collection::vec(pieces, 0..40).prop_map(|v| v.concat())
}

proptest! {
    #[test]
    fn spans_never_contain_newlines(input in markdownish()) {
        let text = MarkdownRenderer::new().render(&input);
        for line in &text.lines {
            for span in &line.spans {
                prop_assert!(!span.text.contains('\n'), "span {:?} from {:?}", span.text, input);
            }
        }
    }

    #[test]
    fn rendering_is_deterministic(input in markdownish()) {
        let r = MarkdownRenderer::new();
        prop_assert_eq!(r.render(&input), r.render(&input));
    }
}

#[test]
fn empty_input_renders_nothing() {
    assert!(MarkdownRenderer::new().render("").is_empty());
}
