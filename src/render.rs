//! Combined HTML output for a segment list.
//!
//! HTML segments are copied through. Placeholders become an empty marker
//! element a UI layer can find and mount a component into:
//!
//! ```html
//! <div class="chat-directive" data-directive="chart" data-segment="1" data-status="complete"></div>
//! ```
//!
//! `data-segment` is the segment's index in the list, so it is unique per
//! message and stable across streaming updates.

use html_escape::encode_double_quoted_attribute;

use crate::Options;
use crate::directive::{Segment, StreamingStatus, TagName};

/// Concatenate the rendered form of `segments` in order.
pub fn combine_segments_with_options(segments: &[Segment], options: &Options) -> String {
    let capacity = segments
        .iter()
        .map(|seg| seg.html_content().map_or(MARKER_CAPACITY, str::len))
        .sum();
    let mut out = String::with_capacity(capacity);
    for (index, segment) in segments.iter().enumerate() {
        push_segment(&mut out, index, segment, options);
    }
    out
}

/// Typical marker length, used for buffer sizing only.
const MARKER_CAPACITY: usize = 112;

/// Append the rendered form of the segment at `index`.
pub fn push_segment(out: &mut String, index: usize, segment: &Segment, options: &Options) {
    match segment {
        Segment::Html { html_content } => out.push_str(html_content),
        Segment::Placeholder {
            tag_type,
            streaming_status,
            ..
        } => push_marker(out, index, *tag_type, *streaming_status, options),
    }
}

fn push_marker(
    out: &mut String,
    index: usize,
    tag: TagName,
    status: StreamingStatus,
    options: &Options,
) {
    out.push_str("<div class=\"");
    out.push_str(&encode_double_quoted_attribute(&options.marker_class));
    out.push_str("\" data-directive=\"");
    out.push_str(tag.as_str());
    out.push_str("\" data-segment=\"");
    out.push_str(&index.to_string());
    out.push_str("\" data-status=\"");
    out.push_str(status.as_str());
    out.push_str("\"></div>\n");
}
