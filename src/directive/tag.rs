use std::fmt;

use serde::{Deserialize, Serialize};

/// A directive tag name recognized inside assistant text.
///
/// Names are case-sensitive: `<Image>` is plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagName {
    /// `<image>URL</image>`
    Image,
    /// `<chart>{...JSON...}</chart>`
    Chart,
    /// `<prompt>free text</prompt>`
    Prompt,
}

impl TagName {
    /// Every tag in the grammar.
    pub const ALL: [TagName; 3] = [TagName::Image, TagName::Chart, TagName::Prompt];

    pub const fn as_str(self) -> &'static str {
        match self {
            TagName::Image => "image",
            TagName::Chart => "chart",
            TagName::Prompt => "prompt",
        }
    }

    /// The opening delimiter, e.g. `<chart>`.
    pub const fn open_delimiter(self) -> &'static str {
        match self {
            TagName::Image => "<image>",
            TagName::Chart => "<chart>",
            TagName::Prompt => "<prompt>",
        }
    }

    /// The closing delimiter, e.g. `</chart>`.
    pub const fn close_delimiter(self) -> &'static str {
        match self {
            TagName::Image => "</image>",
            TagName::Chart => "</chart>",
            TagName::Prompt => "</prompt>",
        }
    }

    pub fn from_name(name: &str) -> Option<TagName> {
        TagName::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of matching an opening delimiter at a `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMatch {
    /// A full opening delimiter for this tag.
    Tag(TagName),
    /// The input ends inside what could still become an opening delimiter
    /// (`<`, `<ima`, `<promp`).
    Prefix,
    /// Not an opening delimiter, no matter what follows.
    NoMatch,
}

/// Match an opening delimiter at the start of `input`.
///
/// `input` must begin with `<` and run to the end of the buffer, so a
/// `Prefix` result means the buffer itself ends mid-delimiter.
pub fn match_open(input: &[u8]) -> OpenMatch {
    debug_assert!(input.first() == Some(&b'<'));
    let mut prefix = false;
    for tag in TagName::ALL {
        let delim = tag.open_delimiter().as_bytes();
        if input.starts_with(delim) {
            return OpenMatch::Tag(tag);
        }
        if input.len() < delim.len() && delim.starts_with(input) {
            prefix = true;
        }
    }
    if prefix {
        OpenMatch::Prefix
    } else {
        OpenMatch::NoMatch
    }
}

/// Length of the longest suffix of `content` that is a proper prefix of
/// `delimiter`.
///
/// Used to hold back a closing delimiter that has only partly arrived.
pub fn partial_suffix_len(content: &[u8], delimiter: &[u8]) -> usize {
    let max = content.len().min(delimiter.len().saturating_sub(1));
    (1..=max)
        .rev()
        .find(|&n| delimiter.starts_with(&content[content.len() - n..]))
        .unwrap_or(0)
}
