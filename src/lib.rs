//! chatmark: streaming segmenter for chat-assistant markdown.
//!
//! Assistant replies arrive token by token and embed directives for rich
//! content (`<chart>`, `<image>`, `<prompt>`) inside ordinary markdown. This
//! crate turns that text into an ordered list of [`Segment`]s: converted HTML
//! for prose, placeholders for directives.
//!
//! Two entry points share one scanner and builder:
//! - [`parse_markdown`] for a finished message.
//! - [`StreamProcessor`] for a message still arriving. Each chunk yields only
//!   the segments it added or changed, and a tag split across chunks
//!   (`<pr` + `ompt>`) is never shown as text.
//!
//! # Design Principles
//! - Segments never reorder; only the trailing ones change as text arrives.
//! - Feeding any chunking of a message and finalizing gives the same
//!   segments as parsing it in one go.
//! - Directive content is captured, never interpreted. Bad JSON in a chart
//!   does not stop the rest of the message.
//!
//! # Example
//! ```
//! use chatmark::{combine_segments, parse_markdown, TagName};
//!
//! let out = parse_markdown("Sales:\n\n<chart>{\"type\":\"bar\"}</chart>\n\nNice.");
//! let tags: Vec<_> = out.segments.iter().filter_map(|s| s.tag_type()).collect();
//! assert_eq!(tags, vec![TagName::Chart]);
//!
//! let html = combine_segments(&out.segments);
//! assert!(html.contains("data-directive=\"chart\""));
//! ```

pub mod convert;
pub mod directive;
pub mod error;
pub mod range;
pub mod render;
pub mod stream;

pub use convert::{MarkdownConverter, PulldownConverter};
pub use directive::{
    ContentError, DirectiveContent, Segment, SegmentKind, StreamingStatus, TagName,
};
pub use error::StreamError;
pub use range::Range;
pub use stream::{
    ChunkOutput, FinalOutput, ParseState, SegmentUpdate, StreamProcessor, chunks_of,
};

use directive::build_segments;
use directive::scanner::scan;

/// Parsing/rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Pass raw HTML in prose through unescaped. When off, raw HTML and
    /// unknown tags show up as literal text.
    pub allow_html: bool,
    /// GFM tables.
    pub tables: bool,
    /// GFM strikethrough (`~~text~~`).
    pub strikethrough: bool,
    /// GFM task list items (`- [x] done`).
    pub task_lists: bool,
    /// Class attribute of placeholder marker elements.
    pub marker_class: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allow_html: false,
            tables: true,
            strikethrough: true,
            task_lists: true,
            marker_class: "chat-directive".to_string(),
        }
    }
}

/// Result of parsing a complete message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    pub segments: Vec<Segment>,
}

/// Parse a complete message into segments.
///
/// A tag left open at the end of the text comes back as a trailing
/// placeholder with [`StreamingStatus::Streaming`].
pub fn parse_markdown(text: &str) -> ParseOutput {
    parse_markdown_with_converter(text, &PulldownConverter::default())
}

/// Parse a complete message with options.
pub fn parse_markdown_with_options(text: &str, options: &Options) -> ParseOutput {
    parse_markdown_with_converter(text, &PulldownConverter::new(options))
}

/// Parse a complete message with a custom markdown converter.
pub fn parse_markdown_with_converter<C>(text: &str, converter: &C) -> ParseOutput
where
    C: MarkdownConverter + ?Sized,
{
    let scanned = scan(text, 0, 0, true);
    ParseOutput {
        segments: build_segments(text, &scanned.ranges, converter),
    }
}

/// Combined HTML for a segment list, with placeholder markers.
pub fn combine_segments(segments: &[Segment]) -> String {
    render::combine_segments_with_options(segments, &Options::default())
}

/// Combined HTML for a segment list, with options.
pub fn combine_segments_with_options(segments: &[Segment], options: &Options) -> String {
    render::combine_segments_with_options(segments, options)
}

/// Parse a complete message and return its combined HTML.
///
/// # Example
/// ```
/// let html = chatmark::render("**Hi** <prompt>Say more</prompt>");
/// assert!(html.starts_with("<p><strong>Hi</strong></p>"));
/// assert!(html.contains("data-directive=\"prompt\""));
/// ```
pub fn render(text: &str) -> String {
    render_with_options(text, &Options::default())
}

/// Parse a complete message and return its combined HTML, with options.
pub fn render_with_options(text: &str, options: &Options) -> String {
    let out = parse_markdown_with_options(text, options);
    render::combine_segments_with_options(&out.segments, options)
}
