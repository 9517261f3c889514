//! Chunk-by-chunk segmentation of a streaming assistant message.
//!
//! Every chunk is appended to the buffer and only the unresolved tail (from
//! the end of the last closed directive) is scanned again. Segments before
//! that point never change and are kept by index; the tail segments are
//! rebuilt and diffed against what was emitted last time.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Options;
use crate::convert::{MarkdownConverter, PulldownConverter};
use crate::directive::scanner::scan;
use crate::directive::{Segment, build_segment};
use crate::error::StreamError;
use crate::render::push_segment;

/// A segment that is new or changed, at its position in the message.
///
/// An index equal to the previous segment count is an append; a lower index
/// replaces the segment already there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentUpdate {
    pub index: usize,
    pub segment: Segment,
}

/// Result of [`StreamProcessor::process_chunk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutput {
    /// Segments added or changed by this chunk, in index order.
    pub new_segments: Vec<SegmentUpdate>,
    /// Combined HTML of everything processed so far.
    pub full_html: String,
}

/// Result of [`StreamProcessor::finalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalOutput {
    /// The whole message; nothing in it is still streaming.
    pub final_segments: Vec<Segment>,
    pub full_html: String,
}

/// Parse state for one message.
#[derive(Debug, Clone, Default)]
pub struct ParseState {
    buffer: String,
    segments: Vec<Segment>,
    /// `segments[..resolved_segments]` is immutable.
    resolved_segments: usize,
    /// Byte offset where the immutable segments end.
    cursor: usize,
    /// Where the next scan starts looking for `<`.
    search_from: usize,
    chunks: usize,
    /// Rendered form of the immutable segments.
    resolved_html: String,
    full_html: String,
}

impl ParseState {
    /// Everything received so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// The segments as last emitted.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Byte offset up to which the buffer is resolved into immutable segments.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of leading segments that can no longer change.
    pub fn resolved_segments(&self) -> usize {
        self.resolved_segments
    }
}

/// Incremental segmenter for a single streamed message.
///
/// Chunks must arrive in stream order. Call [`finalize`](Self::finalize) once
/// when the stream ends, including after an abnormal termination.
///
/// # Example
/// ```
/// use chatmark::{StreamProcessor, StreamingStatus, TagName};
///
/// let mut processor = StreamProcessor::new();
/// processor.process_chunk("Here is a prompt: <pr");
/// let out = processor.process_chunk("ompt>Ask about weather</prompt> and more");
/// assert!(out.new_segments.iter().any(|u| u.index == 1));
///
/// let done = processor.finalize().unwrap();
/// assert_eq!(done.final_segments.len(), 3);
/// assert_eq!(done.final_segments[1].tag_type(), Some(TagName::Prompt));
/// assert_eq!(done.final_segments[1].raw_content(), Some("Ask about weather"));
/// ```
#[derive(Debug)]
pub struct StreamProcessor<C = PulldownConverter> {
    state: ParseState,
    converter: C,
    options: Options,
}

impl StreamProcessor<PulldownConverter> {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self::with_converter(PulldownConverter::new(&options), options)
    }
}

impl Default for StreamProcessor<PulldownConverter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: MarkdownConverter> StreamProcessor<C> {
    /// Use a custom markdown converter. `options` still controls marker
    /// output.
    pub fn with_converter(converter: C, options: Options) -> Self {
        Self {
            state: ParseState::default(),
            converter,
            options,
        }
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    /// Current segment list, including any still-streaming tail.
    pub fn segments(&self) -> &[Segment] {
        &self.state.segments
    }

    /// Append `chunk` and return the segments it added or changed.
    pub fn process_chunk(&mut self, chunk: &str) -> ChunkOutput {
        self.state.chunks += 1;
        self.state.buffer.push_str(chunk);

        if chunk.trim().is_empty() {
            trace!(len = chunk.len(), "whitespace-only chunk, rescan deferred");
            return ChunkOutput {
                new_segments: Vec::new(),
                full_html: self.state.full_html.clone(),
            };
        }

        trace!(
            len = chunk.len(),
            buffered = self.state.buffer.len(),
            cursor = self.state.cursor,
            "chunk received"
        );
        let new_segments = self.rescan(false);
        ChunkOutput {
            new_segments,
            full_html: self.state.full_html.clone(),
        }
    }

    /// Close the stream. Tags that never saw their closing delimiter become
    /// complete with whatever content they captured.
    pub fn finalize(mut self) -> Result<FinalOutput, StreamError> {
        if self.state.chunks == 0 {
            return Err(StreamError::NoInput);
        }

        let updates = self.rescan(true);
        debug!(
            segments = self.state.segments.len(),
            updated = updates.len(),
            bytes = self.state.buffer.len(),
            "stream finalized"
        );

        Ok(FinalOutput {
            final_segments: self.state.segments,
            full_html: self.state.full_html,
        })
    }

    /// Rebuild the segments after the cursor and diff them against the
    /// previous emission.
    fn rescan(&mut self, at_eof: bool) -> Vec<SegmentUpdate> {
        let state = &mut self.state;
        let scanned = scan(&state.buffer, state.cursor, state.search_from, at_eof);

        let mut tail: Vec<(usize, Segment)> = scanned
            .ranges
            .iter()
            .filter_map(|range| {
                build_segment(&state.buffer, range, &self.converter).map(|seg| (range.end(), seg))
            })
            .collect();

        if at_eof {
            for (_, segment) in &mut tail {
                if segment.force_complete() {
                    debug!(
                        tag = ?segment.tag_type(),
                        "unterminated directive closed at end of stream"
                    );
                }
            }
        }

        let base = state.resolved_segments;
        let previous_tail = state.segments.len() - base;
        if tail.len() < previous_tail {
            debug!(
                previous = previous_tail,
                current = tail.len(),
                "segment tail shrank"
            );
        }

        let mut updates = Vec::new();
        for (offset, (_, segment)) in tail.iter().enumerate() {
            let index = base + offset;
            if state.segments.get(index) != Some(segment) {
                updates.push(SegmentUpdate {
                    index,
                    segment: segment.clone(),
                });
            }
        }

        let newly_resolved = tail
            .iter()
            .take_while(|(end, _)| *end <= scanned.resolved)
            .count();

        state.segments.truncate(base);
        for (offset, (_, segment)) in tail.into_iter().enumerate() {
            if offset < newly_resolved {
                push_segment(&mut state.resolved_html, base + offset, &segment, &self.options);
            }
            state.segments.push(segment);
        }

        if newly_resolved > 0 {
            trace!(
                resolved = newly_resolved,
                cursor = scanned.resolved,
                "segments resolved"
            );
        }
        state.resolved_segments = base + newly_resolved;
        state.cursor = scanned.resolved;
        state.search_from = scanned.resume;

        let mut full_html = state.resolved_html.clone();
        for (index, segment) in state
            .segments
            .iter()
            .enumerate()
            .skip(state.resolved_segments)
        {
            push_segment(&mut full_html, index, segment, &self.options);
        }
        state.full_html = full_html;

        updates
    }
}

/// Split `text` into chunks of `size` bytes, moving each cut forward to the
/// next char boundary. Simulates a network stream over a finished message.
///
/// # Panics
/// Panics if `size` is zero.
pub fn chunks_of(text: &str, size: usize) -> impl Iterator<Item = &str> {
    assert!(size > 0, "chunk size must be positive");
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}
