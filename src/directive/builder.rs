use super::scanner::ScanRange;
use super::{Segment, StreamingStatus};
use crate::convert::MarkdownConverter;

/// Convert one scanner range into a segment.
///
/// Text ranges go through `converter`; whitespace-only text yields `None`.
/// Tag ranges keep their inner text trimmed and otherwise untouched.
pub fn build_segment<C>(input: &str, range: &ScanRange, converter: &C) -> Option<Segment>
where
    C: MarkdownConverter + ?Sized,
{
    match *range {
        ScanRange::Text(range) => {
            let markdown = range.slice(input);
            if markdown.trim().is_empty() {
                return None;
            }
            Some(Segment::Html {
                html_content: converter.to_html(markdown),
            })
        }
        ScanRange::TagComplete { tag, inner, .. } => Some(Segment::Placeholder {
            tag_type: tag,
            raw_content: inner.slice(input).trim().to_string(),
            streaming_status: StreamingStatus::Complete,
        }),
        ScanRange::TagPartial { tag, inner, .. } => Some(Segment::Placeholder {
            tag_type: tag,
            raw_content: inner.slice(input).trim().to_string(),
            streaming_status: StreamingStatus::Streaming,
        }),
    }
}

/// Convert scanner ranges into segments, in order.
pub fn build_segments<C>(input: &str, ranges: &[ScanRange], converter: &C) -> Vec<Segment>
where
    C: MarkdownConverter + ?Sized,
{
    ranges
        .iter()
        .filter_map(|range| build_segment(input, range, converter))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::TagName;
    use crate::directive::scanner::scan;

    fn upper(markdown: &str) -> String {
        markdown.to_uppercase()
    }

    #[test]
    fn text_goes_through_converter() {
        let input = "hello <prompt> Ask me </prompt> bye";
        let s = scan(input, 0, 0, true);
        let segs = build_segments(input, &s.ranges, &upper);
        assert_eq!(
            segs,
            vec![
                Segment::Html {
                    html_content: "HELLO ".to_string()
                },
                Segment::Placeholder {
                    tag_type: TagName::Prompt,
                    raw_content: "Ask me".to_string(),
                    streaming_status: StreamingStatus::Complete,
                },
                Segment::Html {
                    html_content: " BYE".to_string()
                },
            ]
        );
    }

    #[test]
    fn whitespace_between_tags_is_dropped() {
        let input = "<image>a.png</image>\n\n<prompt>b</prompt>\n";
        let s = scan(input, 0, 0, true);
        let segs = build_segments(input, &s.ranges, &upper);
        assert_eq!(segs.len(), 2);
        assert!(segs.iter().all(|s| s.tag_type().is_some()));
    }

    #[test]
    fn partial_tag_may_be_empty() {
        let input = "<chart>";
        let s = scan(input, 0, 0, false);
        let segs = build_segments(input, &s.ranges, &upper);
        assert_eq!(
            segs,
            vec![Segment::Placeholder {
                tag_type: TagName::Chart,
                raw_content: String::new(),
                streaming_status: StreamingStatus::Streaming,
            }]
        );
    }

    #[test]
    fn malformed_content_is_not_validated() {
        let input = "<chart>{not json}</chart><image>not a url</image>";
        let s = scan(input, 0, 0, true);
        let segs = build_segments(input, &s.ranges, &upper);
        assert_eq!(segs[0].raw_content(), Some("{not json}"));
        assert_eq!(segs[1].raw_content(), Some("not a url"));
        assert!(segs.iter().all(|s| !s.is_streaming()));
    }
}
