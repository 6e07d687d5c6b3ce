use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// Separator written in place of any run of whitespace or punctuation.
pub const WORD_SEPARATOR: char = '-';

/// Obsidian nested-tag separator, kept as-is by normalization.
pub const NESTING_SEPARATOR: char = '/';

/// A canonical tag token.
///
/// The only way to obtain a `Tag` is [`normalize`], so every value is lowercase,
/// trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a raw tag string.
///
/// Strips one leading `#`, lowercases, collapses every run of non-alphanumeric
/// characters inside a `/`-separated segment to a single `-`, and drops empty
/// segments. Returns `None` when nothing survives.
pub fn normalize(raw: &str) -> Option<Tag> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let lowered = trimmed.to_lowercase();

    let mut segments: Vec<String> = Vec::new();
    for segment in lowered.split(NESTING_SEPARATOR) {
        let mut out = String::with_capacity(segment.len());
        let mut pending_separator = false;
        for ch in segment.chars() {
            if ch.is_alphanumeric() {
                if pending_separator && !out.is_empty() {
                    out.push(WORD_SEPARATOR);
                }
                pending_separator = false;
                out.push(ch);
            } else {
                pending_separator = true;
            }
        }
        if !out.is_empty() {
            segments.push(out);
        }
    }

    if segments.is_empty() {
        return None;
    }
    Some(Tag(segments.join(&NESTING_SEPARATOR.to_string())))
}

/// Normalize every raw tag, dropping the ones that normalize to nothing.
pub fn normalize_all<I, S>(raw: I) -> Vec<Tag>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|s| normalize(s.as_ref()))
        .collect()
}
