use memchr::{memchr, memmem};
use smallvec::SmallVec;

use super::tag::{OpenMatch, TagName, match_open, partial_suffix_len};
use crate::Range;

/// A classified region of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRange {
    /// Plain markdown.
    Text(Range),
    /// Opening and closing delimiter both present.
    TagComplete {
        tag: TagName,
        /// Delimiters included.
        outer: Range,
        /// Content between the delimiters.
        inner: Range,
    },
    /// Opening delimiter present, closing delimiter not yet seen.
    /// Always the last range of a scan.
    TagPartial {
        tag: TagName,
        /// From the `<` of the opener to the end of the buffer.
        outer: Range,
        /// Content captured so far, minus any half-arrived closing delimiter.
        inner: Range,
    },
}

impl ScanRange {
    /// End offset of the region in the buffer.
    pub fn end(&self) -> usize {
        match self {
            ScanRange::Text(range) => range.end_usize(),
            ScanRange::TagComplete { outer, .. } | ScanRange::TagPartial { outer, .. } => {
                outer.end_usize()
            }
        }
    }
}

/// Output of one scanner pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub ranges: SmallVec<[ScanRange; 4]>,
    /// End of the last complete tag. Nothing before this offset can change
    /// when more text is appended.
    pub resolved: usize,
    /// Earliest offset where a `<` could still start an opener that this pass
    /// did not classify. The next pass can begin its search here.
    pub resume: usize,
    /// Offset of a withheld opener prefix (`<ima`) at the end of the buffer.
    pub pending: Option<usize>,
}

/// Scan `input[from..]` for directive tags.
///
/// `search_from` lets a caller skip a region already known to contain no
/// opener; it is clamped to `from`. With `at_eof` set, the input is final:
/// opener prefixes are plain text and an unterminated tag keeps all of its
/// content.
///
/// Single pass, left to right. The first recognized opener wins and its
/// content runs to the first matching closing delimiter; other tags inside
/// it are content.
pub fn scan(input: &str, from: usize, search_from: usize, at_eof: bool) -> Scan {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut ranges: SmallVec<[ScanRange; 4]> = SmallVec::new();
    let mut text_start = from;
    let mut resolved = from;
    let mut pos = search_from.max(from);

    while pos < len {
        let Some(offset) = memchr(b'<', &bytes[pos..]) else {
            break;
        };
        let lt = pos + offset;

        match match_open(&bytes[lt..]) {
            OpenMatch::Tag(tag) => {
                push_text(&mut ranges, text_start, lt);
                let inner_start = lt + tag.open_delimiter().len();
                let close = tag.close_delimiter().as_bytes();

                match memmem::find(&bytes[inner_start..], close) {
                    Some(rel) => {
                        let inner_end = inner_start + rel;
                        let end = inner_end + close.len();
                        ranges.push(ScanRange::TagComplete {
                            tag,
                            outer: Range::from_usize(lt, end),
                            inner: Range::from_usize(inner_start, inner_end),
                        });
                        text_start = end;
                        resolved = end;
                        pos = end;
                    }
                    None => {
                        let held = if at_eof {
                            0
                        } else {
                            partial_suffix_len(&bytes[inner_start..], close)
                        };
                        ranges.push(ScanRange::TagPartial {
                            tag,
                            outer: Range::from_usize(lt, len),
                            inner: Range::from_usize(inner_start, len - held),
                        });
                        return Scan {
                            ranges,
                            resolved,
                            resume: lt,
                            pending: None,
                        };
                    }
                }
            }
            OpenMatch::Prefix if !at_eof => {
                push_text(&mut ranges, text_start, lt);
                return Scan {
                    ranges,
                    resolved,
                    resume: lt,
                    pending: Some(lt),
                };
            }
            OpenMatch::Prefix | OpenMatch::NoMatch => pos = lt + 1,
        }
    }

    push_text(&mut ranges, text_start, len);
    Scan {
        ranges,
        resolved,
        resume: len,
        pending: None,
    }
}

fn push_text(ranges: &mut SmallVec<[ScanRange; 4]>, start: usize, end: usize) {
    if start < end {
        ranges.push(ScanRange::Text(Range::from_usize(start, end)));
    }
}
