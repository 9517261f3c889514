//! Markdown-to-HTML conversion for the prose between directives.
//!
//! The segmenter only ever hands a converter finished spans that contain no
//! open directive tag. Converters must be pure: the streaming diff compares
//! output across calls, so identical input has to give identical HTML.

use pulldown_cmark::{Event, Parser, html};

use crate::Options;

/// Converts a finished markdown span to HTML.
///
/// Any `Fn(&str) -> String` is a converter:
///
/// ```
/// use chatmark::parse_markdown_with_converter;
///
/// let out = parse_markdown_with_converter("a <prompt>b</prompt>", &|md: &str| {
///     format!("<span>{md}</span>")
/// });
/// assert_eq!(out.segments[0].html_content(), Some("<span>a </span>"));
/// ```
pub trait MarkdownConverter {
    fn to_html(&self, markdown: &str) -> String;
}

impl<F> MarkdownConverter for F
where
    F: Fn(&str) -> String,
{
    fn to_html(&self, markdown: &str) -> String {
        self(markdown)
    }
}

/// Default converter, backed by `pulldown-cmark`.
#[derive(Debug, Clone, Copy)]
pub struct PulldownConverter {
    extensions: pulldown_cmark::Options,
    allow_html: bool,
}

impl PulldownConverter {
    pub fn new(options: &Options) -> Self {
        let mut extensions = pulldown_cmark::Options::empty();
        if options.tables {
            extensions.insert(pulldown_cmark::Options::ENABLE_TABLES);
        }
        if options.strikethrough {
            extensions.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
        }
        if options.task_lists {
            extensions.insert(pulldown_cmark::Options::ENABLE_TASKLISTS);
        }
        Self {
            extensions,
            allow_html: options.allow_html,
        }
    }
}

impl Default for PulldownConverter {
    fn default() -> Self {
        Self::new(&Options::default())
    }
}

impl MarkdownConverter for PulldownConverter {
    fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.extensions);
        let mut out = String::with_capacity(markdown.len() + markdown.len() / 4);
        if self.allow_html {
            html::push_html(&mut out, parser);
        } else {
            // Raw HTML becomes text, so it is escaped on output.
            html::push_html(
                &mut out,
                parser.map(|event| match event {
                    Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
                    other => other,
                }),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_inline_markdown() {
        let html = PulldownConverter::default().to_html("Hello **world**");
        assert_eq!(html, "<p>Hello <strong>world</strong></p>\n");
    }

    #[test]
    fn escapes_raw_html_by_default() {
        let html = PulldownConverter::default().to_html("a <b>bold</b> <script>x</script>");
        assert!(!html.contains("<b>"), "Got: {html}");
        assert!(!html.contains("<script>"), "Got: {html}");
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"), "Got: {html}");
    }

    #[test]
    fn passes_raw_html_when_allowed() {
        let options = Options {
            allow_html: true,
            ..Options::default()
        };
        let html = PulldownConverter::new(&options).to_html("a <b>bold</b>");
        assert!(html.contains("<b>bold</b>"), "Got: {html}");
    }

    #[test]
    fn tables_follow_options() {
        let input = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let with = PulldownConverter::default().to_html(input);
        assert!(with.contains("<table>"), "Got: {with}");

        let options = Options {
            tables: false,
            ..Options::default()
        };
        let without = PulldownConverter::new(&options).to_html(input);
        assert!(!without.contains("<table>"), "Got: {without}");
    }

    #[test]
    fn strikethrough_follows_options() {
        let html = PulldownConverter::default().to_html("~~gone~~");
        assert!(html.contains("<del>gone</del>"), "Got: {html}");
    }

    #[test]
    fn closures_are_converters() {
        let shout = |md: &str| md.to_uppercase();
        assert_eq!(shout.to_html("hi"), "HI");
    }

    #[test]
    fn conversion_is_deterministic() {
        let converter = PulldownConverter::default();
        let input = "# Title\n\n- one\n- two\n";
        assert_eq!(converter.to_html(input), converter.to_html(input));
    }
}
