//! Utility functions for the token resolver

use serde::{Deserialize, Serialize};

/// Per-segment name transform applied to token paths and lookup keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameTransform {
    #[default]
    None,
    KebabCase,
    CamelCase,
    PascalCase,
}

impl NameTransform {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "kebab-case" | "kebab" => Some(Self::KebabCase),
            "camel-case" | "camelCase" | "camel" => Some(Self::CamelCase),
            "pascal-case" | "PascalCase" | "pascal" => Some(Self::PascalCase),
            _ => None,
        }
    }

    /// Transform a single path segment
    pub fn segment(&self, segment: &str) -> String {
        match self {
            Self::None => segment.to_string(),
            _ => self.join_words(&split_words(segment)),
        }
    }

    /// Transform every segment of a path and join them with `.`
    pub fn path<S: AsRef<str>>(&self, segments: &[S]) -> String {
        segments
            .iter()
            .map(|s| self.segment(s.as_ref()))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Normalized lookup name for a path or a free-form key.
    ///
    /// Under a casing transform every word of every segment is folded into one
    /// identifier, so `colorPrimary`, `color-primary` and `color.primary` all
    /// normalize to the same name. Without a transform the key is used as-is.
    pub fn name(&self, key: &str) -> String {
        match self {
            Self::None => key.to_string(),
            _ => {
                let words: Vec<String> = key.split('.').flat_map(split_words).collect();
                self.join_words(&words)
            }
        }
    }

    fn join_words(&self, words: &[String]) -> String {
        match self {
            Self::None => words.concat(),
            Self::KebabCase => words
                .iter()
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
                .join("-"),
            Self::CamelCase => words
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize(w) })
                .collect(),
            Self::PascalCase => words.iter().map(|w| capitalize(w)).collect(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split an identifier into words on separators and case boundaries
pub fn split_words(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '-' || ch == '_' || ch == ' ' || ch == '.' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |c| c.is_lowercase());
            // fooBar, or the last capital of an acronym as in HTTPServer
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Extension keys must be namespaced, e.g. `org.example.tool`
pub fn is_valid_extension_key(key: &str) -> bool {
    key.split('.').count() >= 2 && key.split('.').all(|part| !part.is_empty())
}
