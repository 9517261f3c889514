use chatmark::{
    Options, Segment, StreamError, StreamProcessor, StreamingStatus, TagName, chunks_of,
    combine_segments, parse_markdown,
};

/// Feed `chunks`, then finalize.
fn stream(chunks: &[&str]) -> Vec<Segment> {
    let mut processor = StreamProcessor::new();
    for chunk in chunks {
        processor.process_chunk(chunk);
    }
    processor.finalize().unwrap().final_segments
}

/// Apply each chunk's updates to a client-side list, the way a UI would.
fn replay(chunks: &[&str]) -> (Vec<Segment>, StreamProcessor) {
    let mut processor = StreamProcessor::new();
    let mut view: Vec<Segment> = Vec::new();
    for chunk in chunks {
        for update in processor.process_chunk(chunk).new_segments {
            if update.index < view.len() {
                view[update.index] = update.segment;
            } else {
                assert_eq!(update.index, view.len(), "updates must not skip indices");
                view.push(update.segment);
            }
        }
    }
    (view, processor)
}

#[test]
fn partial_tag_resilience() {
    let segments = stream(&["Here is a prompt: <pr", "ompt>Ask about weather</prompt> and more"]);
    let oneshot =
        parse_markdown("Here is a prompt: <prompt>Ask about weather</prompt> and more").segments;
    assert_eq!(segments, oneshot);
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[1].tag_type(), Some(TagName::Prompt));
    assert_eq!(segments[1].raw_content(), Some("Ask about weather"));
    assert_eq!(segments[1].streaming_status(), StreamingStatus::Complete);
}

#[test]
fn streaming_status_transition() {
    let mut processor = StreamProcessor::new();
    let out = processor.process_chunk("<chart>{\"a\":1");
    assert_eq!(out.new_segments.len(), 1);
    assert_eq!(out.new_segments[0].index, 0);
    assert_eq!(out.new_segments[0].segment.tag_type(), Some(TagName::Chart));
    assert_eq!(
        out.new_segments[0].segment.streaming_status(),
        StreamingStatus::Streaming
    );
    assert!(
        out.new_segments[0]
            .segment
            .raw_content()
            .unwrap()
            .contains("{\"a\":1")
    );

    let out = processor.process_chunk(", \"b\": 2}");
    assert_eq!(out.new_segments.len(), 1);
    assert_eq!(out.new_segments[0].index, 0);
    assert!(out.new_segments[0].segment.is_streaming());

    let out = processor.process_chunk("</chart>");
    assert_eq!(out.new_segments.len(), 1);
    assert_eq!(out.new_segments[0].index, 0);
    assert_eq!(
        out.new_segments[0].segment.streaming_status(),
        StreamingStatus::Complete
    );
    assert_eq!(
        out.new_segments[0].segment.raw_content(),
        Some("{\"a\":1, \"b\": 2}")
    );
}

#[test]
fn byte_by_byte_stream_matches_oneshot() {
    let input = "Intro **bold**\n\n<chart>{\"x\":[1,2]}</chart>\n\n<image> https://e.test/i.png </image>\
                 Ask: <prompt>More?</prompt> <prompt>Less?</prompt> 🎉";
    let chunks: Vec<&str> = chunks_of(input, 1).collect();
    assert_eq!(stream(&chunks), parse_markdown(input).segments);
}

#[test]
fn replayed_updates_match_processor_state() {
    let input = "Look <image>https://e.test/a.png</image> then <chart>{\"k\":1}</chart> done";
    for size in [1, 2, 3, 5, 8, 13] {
        let chunks: Vec<&str> = chunks_of(input, size).collect();
        let (view, processor) = replay(&chunks);
        assert_eq!(view, processor.segments(), "chunk size {size}");
    }
}

#[test]
fn full_html_matches_combined_segments_after_every_chunk() {
    let input = "a <prompt>b</prompt> c <chart>{\"d\":1}</chart> e <image>f";
    let mut processor = StreamProcessor::new();
    for chunk in chunks_of(input, 4) {
        let out = processor.process_chunk(chunk);
        if !chunk.trim().is_empty() {
            assert_eq!(out.full_html, combine_segments(processor.segments()));
        }
    }
    let done = processor.finalize().unwrap();
    assert_eq!(done.full_html, combine_segments(&done.final_segments));
}

#[test]
fn resolved_segments_never_change() {
    let input = "One <prompt>two</prompt> three <prompt>four</prompt> five <chart>{}";
    let mut processor = StreamProcessor::new();
    let mut frozen: Vec<Segment> = Vec::new();
    for chunk in chunks_of(input, 3) {
        let out = processor.process_chunk(chunk);
        let resolved = processor.state().resolved_segments();
        assert!(out.new_segments.iter().all(|u| u.index >= frozen.len()));
        assert_eq!(&processor.segments()[..frozen.len()], frozen.as_slice());
        frozen = processor.segments()[..resolved].to_vec();
    }
}

#[test]
fn unterminated_tag_forced_complete() {
    let segments = stream(&["Chart: <chart>{\"type\":", "\"bar\""]);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[1].raw_content(), Some("{\"type\":\"bar\""));
    assert_eq!(segments[1].streaming_status(), StreamingStatus::Complete);
}

#[test]
fn unterminated_tag_keeps_half_closer_at_end() {
    let segments = stream(&["<prompt>Are you sure</pro"]);
    assert_eq!(segments[0].raw_content(), Some("Are you sure</pro"));
    assert!(!segments[0].is_streaming());
}

#[test]
fn empty_and_whitespace_chunks() {
    let mut processor = StreamProcessor::new();
    assert!(processor.process_chunk("").new_segments.is_empty());
    assert!(processor.process_chunk("Hi").new_segments.len() == 1);
    assert!(processor.process_chunk("  ").new_segments.is_empty());
    assert!(processor.process_chunk("\n").new_segments.is_empty());
    let done = processor.finalize().unwrap();
    assert_eq!(done.final_segments, parse_markdown("Hi  \n").segments);
}

#[test]
fn finalize_without_chunks_is_an_error() {
    let err = StreamProcessor::new().finalize().unwrap_err();
    assert_eq!(err, StreamError::NoInput);
    assert!(err.to_string().contains("never received a chunk"));
}

#[test]
fn marker_class_option_applies_to_stream_html() {
    let options = Options {
        marker_class: "widget".to_string(),
        ..Options::default()
    };
    let mut processor = StreamProcessor::with_options(options);
    let out = processor.process_chunk("<image>x</image>");
    assert!(out.full_html.starts_with("<div class=\"widget\""));
}

#[test]
fn segments_serialize_for_the_ui() {
    let mut processor = StreamProcessor::new();
    let out = processor.process_chunk("<prompt>Go");
    let json = serde_json::to_value(&out.new_segments).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "index": 0,
            "segment": {
                "kind": "placeholder",
                "tagType": "prompt",
                "rawContent": "Go",
                "streamingStatus": "streaming",
            }
        }])
    );
}
