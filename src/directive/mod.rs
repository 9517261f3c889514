//! Directive segmenter: splits assistant text into HTML and directive
//! placeholders.
//!
//! Assistant output embeds three pseudo-tags in ordinary markdown:
//!
//! ```text
//! <image>https://example.com/cat.png</image>
//! <chart>{"type":"bar","data":[1,2,3]}</chart>
//! <prompt>What about next week?</prompt>
//! ```
//!
//! The scanner finds tag boundaries, the builder turns each region into a
//! [`Segment`]. Text between tags goes through the markdown converter; tag
//! content is captured verbatim (trimmed) and never interpreted here. Use
//! [`DirectiveContent`] on the consumer side to decode it.
//!
//! # Example
//! ```
//! use chatmark::{parse_markdown, StreamingStatus, TagName};
//!
//! let out = parse_markdown("Try this: <prompt>Show rainfall</prompt>");
//! assert_eq!(out.segments.len(), 2);
//! assert_eq!(out.segments[1].tag_type(), Some(TagName::Prompt));
//! assert_eq!(out.segments[1].raw_content(), Some("Show rainfall"));
//! assert_eq!(out.segments[1].streaming_status(), StreamingStatus::Complete);
//! ```
//!
//! # Grammar
//!
//! - Tag names are exactly `image`, `chart`, `prompt`, case-sensitive.
//! - No attributes, no self-closing form, no nesting. Inside an open tag only
//!   its own closing delimiter is significant.
//! - Anything else that looks like a tag is plain markdown text.

mod builder;
pub mod content;
pub mod scanner;
pub mod tag;

use serde::{Deserialize, Serialize};

pub use builder::{build_segment, build_segments};
pub use content::{ContentError, DirectiveContent};
pub use tag::TagName;

/// Whether a placeholder's closing delimiter has been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamingStatus {
    Streaming,
    Complete,
}

impl StreamingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            StreamingStatus::Streaming => "streaming",
            StreamingStatus::Complete => "complete",
        }
    }
}

/// Discriminant of a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Html,
    Placeholder,
}

/// A unit of rendered output, in source order.
///
/// Serializes with a `kind` field (`"html"` / `"placeholder"`) and camelCase
/// field names so a UI layer can consume it as JSON directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Segment {
    /// Converted markdown for a span between directives.
    Html { html_content: String },
    /// A directive, either still streaming or closed.
    Placeholder {
        tag_type: TagName,
        /// Inner text of the tag, whitespace-trimmed, otherwise untouched.
        raw_content: String,
        streaming_status: StreamingStatus,
    },
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Html { .. } => SegmentKind::Html,
            Segment::Placeholder { .. } => SegmentKind::Placeholder,
        }
    }

    pub fn tag_type(&self) -> Option<TagName> {
        match self {
            Segment::Placeholder { tag_type, .. } => Some(*tag_type),
            Segment::Html { .. } => None,
        }
    }

    pub fn raw_content(&self) -> Option<&str> {
        match self {
            Segment::Placeholder { raw_content, .. } => Some(raw_content),
            Segment::Html { .. } => None,
        }
    }

    pub fn html_content(&self) -> Option<&str> {
        match self {
            Segment::Html { html_content } => Some(html_content),
            Segment::Placeholder { .. } => None,
        }
    }

    /// HTML segments are always complete.
    pub fn streaming_status(&self) -> StreamingStatus {
        match self {
            Segment::Placeholder {
                streaming_status, ..
            } => *streaming_status,
            Segment::Html { .. } => StreamingStatus::Complete,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming_status() == StreamingStatus::Streaming
    }

    /// Mark a streaming placeholder complete, keeping its content.
    /// Returns `true` if the status changed.
    pub(crate) fn force_complete(&mut self) -> bool {
        if let Segment::Placeholder {
            streaming_status, ..
        } = self
        {
            if *streaming_status == StreamingStatus::Streaming {
                *streaming_status = StreamingStatus::Complete;
                return true;
            }
        }
        false
    }
}
