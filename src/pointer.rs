//! Canonical JSON-Pointer style references
//!
//! A reference is `[document]#/segment/segment`. Segments are tilde escaped
//! (`~0` for `~`, `~1` for `/`) and percent encoded. The document part is kept
//! verbatim. Unless it is an absolute http(s) locator with a host, its
//! percent-decoded form must not contain a `..` component.

use crate::error::{Result, TokenError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static NETWORK_LOCATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^/?#\\\s]+").unwrap());

/// A parsed, validated pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pointer {
    document: Option<String>,
    segments: Vec<String>,
}

impl Pointer {
    /// The document root (`#`)
    pub fn root() -> Self {
        Self {
            document: None,
            segments: Vec::new(),
        }
    }

    /// Build a local pointer from unescaped path segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            document: None,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parse(reference: &str) -> Result<Self> {
        let (document, fragment) = reference.split_once('#').ok_or_else(|| {
            TokenError::invalid_pointer(reference, "reference", "missing '#' fragment")
        })?;

        let document = if document.is_empty() {
            None
        } else {
            let decoded = percent_decode(document)
                .map_err(|reason| TokenError::invalid_pointer(reference, "reference", reason))?;
            if !NETWORK_LOCATOR.is_match(document)
                && decoded.split(['/', '\\']).any(|part| part == "..")
            {
                return Err(TokenError::invalid_pointer(
                    reference,
                    "reference",
                    "document path traversal ('..') is not allowed",
                ));
            }
            Some(document.to_string())
        };

        if fragment.is_empty() {
            return Ok(Self {
                document,
                segments: Vec::new(),
            });
        }

        let body = fragment.strip_prefix('/').ok_or_else(|| {
            TokenError::invalid_pointer(reference, "reference", "fragment must start with '/'")
        })?;

        let mut segments = Vec::new();
        for raw in body.split('/') {
            let segment = decode_segment(raw)
                .map_err(|reason| TokenError::invalid_pointer(reference, "reference", reason))?;
            if segment == ".." {
                return Err(TokenError::invalid_pointer(
                    reference,
                    "reference",
                    "path traversal segment '..' is not allowed",
                ));
            }
            segments.push(segment);
        }

        Ok(Self { document, segments })
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the pointer addresses `document_id` or carries no document part
    pub fn is_local_to(&self, document_id: &str) -> bool {
        match &self.document {
            None => true,
            Some(document) => document == document_id,
        }
    }

    /// The same pointer with its document part removed
    pub fn local(&self) -> Self {
        Self {
            document: None,
            segments: self.segments.clone(),
        }
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self {
            document: self.document.clone(),
            segments,
        }
    }

    /// Dot-joined presentation path
    pub fn dot_path(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(document) = &self.document {
            f.write_str(document)?;
        }
        f.write_str("#")?;
        for segment in &self.segments {
            write!(f, "/{}", encode_segment(segment))?;
        }
        Ok(())
    }
}

/// Canonicalize a reference string
pub fn canonicalize(reference: &str) -> Result<String> {
    Pointer::parse(reference).map(|pointer| pointer.to_string())
}

/// Canonicalize a reference, naming the token or override that held it on failure
pub fn canonicalize_in(reference: &str, context: &str) -> Result<String> {
    canonicalize(reference).map_err(|e| e.with_context(context))
}

fn percent_decode(raw: &str) -> std::result::Result<String, String> {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw
                .get(i + 1..i + 3)
                .ok_or_else(|| format!("truncated percent escape in '{}'", raw))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|_| format!("invalid percent escape '%{}'", hex))?;
            decoded.push(byte);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).map_err(|_| format!("percent escapes in '{}' are not valid UTF-8", raw))
}

fn decode_segment(raw: &str) -> std::result::Result<String, String> {
    let text = percent_decode(raw)?;

    let mut segment = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.next() {
                Some('0') => segment.push('~'),
                Some('1') => segment.push('/'),
                Some(other) => return Err(format!("invalid escape sequence '~{}'", other)),
                None => return Err("dangling '~' escape".to_string()),
            }
        } else {
            segment.push(ch);
        }
    }
    Ok(segment)
}

fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for ch in segment.chars() {
        match ch {
            '~' => encoded.push_str("~0"),
            '/' => encoded.push_str("~1"),
            c if c.is_ascii_alphanumeric() || "-._!$&'()*+,;=:@".contains(c) => encoded.push(c),
            c if c.is_ascii() => encoded.push_str(&format!("%{:02X}", c as u8)),
            c => encoded.push(c),
        }
    }
    encoded
}
