//! Decoding of directive content for the rendering side.
//!
//! The segmenter never looks inside a tag. A UI that mounts a chart or an
//! image for a placeholder calls [`DirectiveContent::from_segment`] and shows
//! its own error state on failure.

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use super::{Segment, StreamingStatus, TagName};

/// Schemes an `<image>` URL may use.
const IMAGE_SCHEMES: &[&str] = &["http", "https", "data"];

/// Typed content of a closed directive.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveContent {
    Image(Url),
    /// Chart configuration; always a JSON object.
    Chart(Map<String, Value>),
    Prompt(String),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("segment is not a directive placeholder")]
    NotPlaceholder,

    #[error("{0} directive is still streaming")]
    Streaming(TagName),

    #[error("invalid image URL {raw:?}: {source}")]
    InvalidUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported image URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid chart JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("chart configuration must be a JSON object")]
    NotAnObject,

    #[error("prompt directive is empty")]
    EmptyPrompt,
}

impl DirectiveContent {
    /// Decode the raw content of a `tag` directive.
    pub fn decode(tag: TagName, raw: &str) -> Result<Self, ContentError> {
        let raw = raw.trim();
        match tag {
            TagName::Image => {
                let url = Url::parse(raw).map_err(|source| ContentError::InvalidUrl {
                    raw: raw.to_string(),
                    source,
                })?;
                if !IMAGE_SCHEMES.contains(&url.scheme()) {
                    return Err(ContentError::UnsupportedScheme(url.scheme().to_string()));
                }
                Ok(DirectiveContent::Image(url))
            }
            TagName::Chart => match serde_json::from_str::<Value>(raw)? {
                Value::Object(config) => Ok(DirectiveContent::Chart(config)),
                _ => Err(ContentError::NotAnObject),
            },
            TagName::Prompt => {
                if raw.is_empty() {
                    Err(ContentError::EmptyPrompt)
                } else {
                    Ok(DirectiveContent::Prompt(raw.to_string()))
                }
            }
        }
    }

    /// Decode a complete placeholder segment.
    pub fn from_segment(segment: &Segment) -> Result<Self, ContentError> {
        match segment {
            Segment::Html { .. } => Err(ContentError::NotPlaceholder),
            Segment::Placeholder {
                tag_type,
                streaming_status: StreamingStatus::Streaming,
                ..
            } => Err(ContentError::Streaming(*tag_type)),
            Segment::Placeholder {
                tag_type,
                raw_content,
                ..
            } => Self::decode(*tag_type, raw_content),
        }
    }

    pub fn tag(&self) -> TagName {
        match self {
            DirectiveContent::Image(_) => TagName::Image,
            DirectiveContent::Chart(_) => TagName::Chart,
            DirectiveContent::Prompt(_) => TagName::Prompt,
        }
    }
}
