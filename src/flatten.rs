//! Token tree flattening
//!
//! Walks a nested token document depth first (source order) and produces one
//! [`RawToken`] per leaf. A leaf is any object carrying `$value` or `$ref`;
//! every other object is a group. `$`-prefixed keys on groups are reserved and
//! never walked. Leaves keep only their own `$type`, `$description`,
//! `$extensions` and `$deprecated`; nothing is inherited from groups.

use crate::error::{LocationIndex, TokenError};
use crate::pointer::Pointer;
use crate::resolver::ResolvedSet;
use crate::types::{Deprecation, FlattenedToken, TokenMetadata, TokenType};
use crate::utils::{is_valid_extension_key, NameTransform};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A leaf as found in the tree, before any resolution
#[derive(Debug, Clone)]
pub struct RawToken {
    pub segments: Vec<String>,
    /// Dot-joined path with the name transform applied
    pub path: String,
    /// Canonical local pointer
    pub pointer: String,
    pub declared_type: Option<TokenType>,
    /// Literal `$value`, absent for aliases
    pub value: Option<Value>,
    /// Alias target from `$ref` or `$value: { "$ref" }`
    pub reference: Option<Pointer>,
    pub metadata: TokenMetadata,
    /// Structural problem found while reading the leaf. The token fails.
    pub error: Option<TokenError>,
}

impl RawToken {
    pub fn is_duplicate(&self) -> bool {
        matches!(self.error, Some(TokenError::DuplicatePath { .. }))
    }
}

/// Problems that do not belong to any leaf
#[derive(Debug, Clone)]
pub struct NodeIssue {
    pub pointer: String,
    pub error: TokenError,
}

#[derive(Debug, Default)]
pub struct FlattenOutput {
    pub tokens: Vec<RawToken>,
    pub issues: Vec<NodeIssue>,
}

pub struct Flattener<'a> {
    document_id: &'a str,
    transform: NameTransform,
    locations: &'a LocationIndex,
}

impl<'a> Flattener<'a> {
    pub fn new(document_id: &'a str, transform: NameTransform, locations: &'a LocationIndex) -> Self {
        Self {
            document_id,
            transform,
            locations,
        }
    }

    pub fn flatten(&self, tree: &Value) -> FlattenOutput {
        let mut output = FlattenOutput::default();

        let Some(root) = tree.as_object() else {
            output.issues.push(NodeIssue {
                pointer: Pointer::root().to_string(),
                error: TokenError::invalid_node("#", "document root must be an object"),
            });
            return output;
        };

        let mut seen_paths: HashMap<String, String> = HashMap::new();
        let mut work: Vec<(Vec<String>, &Value)> = Vec::new();
        push_children(&mut work, &[], root);

        while let Some((segments, node)) = work.pop() {
            let pointer = Pointer::from_segments(segments.iter().cloned()).to_string();

            let Some(object) = node.as_object() else {
                output.issues.push(NodeIssue {
                    error: TokenError::invalid_node(
                        &pointer,
                        format!("expected a token or group object, found {}", kind_of(node)),
                    ),
                    pointer,
                });
                continue;
            };

            if !is_leaf(object) {
                push_children(&mut work, &segments, object);
                continue;
            }

            let mut token = self.read_leaf(segments, pointer, object);
            if token.error.is_none() {
                if let Some(existing) = seen_paths.get(&token.path) {
                    token.error = Some(TokenError::DuplicatePath {
                        path: token.path.clone(),
                        existing: existing.clone(),
                    });
                } else {
                    seen_paths.insert(token.path.clone(), token.pointer.clone());
                }
            }
            output.tokens.push(token);
        }

        log::debug!(
            "Flattened '{}': {} tokens, {} node issues",
            self.document_id,
            output.tokens.len(),
            output.issues.len()
        );
        output
    }

    fn read_leaf(&self, segments: Vec<String>, pointer: String, object: &Map<String, Value>) -> RawToken {
        let path = self.transform.path(&segments);
        let mut token = RawToken {
            metadata: TokenMetadata {
                location: self.locations.locate(self.document_id, &pointer),
                ..Default::default()
            },
            segments,
            path,
            pointer,
            declared_type: None,
            value: None,
            reference: None,
            error: None,
        };
        if let Err(error) = self.read_fields(&mut token, object) {
            token.error = Some(error);
        }
        token
    }

    fn read_fields(&self, token: &mut RawToken, object: &Map<String, Value>) -> Result<(), TokenError> {
        match object.get("$type") {
            Some(Value::String(name)) => token.declared_type = Some(TokenType::from_name(name)),
            Some(other) => {
                return Err(TokenError::invalid_node(
                    &token.pointer,
                    format!("$type must be a string, found {}", kind_of(other)),
                ))
            }
            None => {}
        }

        match object.get("$description") {
            Some(Value::String(text)) => token.metadata.description = Some(text.clone()),
            Some(other) => {
                return Err(TokenError::invalid_node(
                    &token.pointer,
                    format!("$description must be a string, found {}", kind_of(other)),
                ))
            }
            None => {}
        }

        if let Some(extensions) = object.get("$extensions") {
            let extensions = extensions
                .as_object()
                .ok_or_else(|| TokenError::invalid_node(&token.pointer, "$extensions must be an object"))?;
            if let Some(key) = extensions.keys().find(|k| !is_valid_extension_key(k)) {
                return Err(TokenError::InvalidExtensionKey {
                    path: token.path.clone(),
                    key: key.clone(),
                });
            }
            token.metadata.extensions = extensions.clone();
        }

        if let Some(deprecated) = object.get("$deprecated") {
            token.metadata.deprecated = parse_deprecation(deprecated, &token.path)?;
        }

        let context = format!("token {}", token.path);
        match (object.get("$ref"), object.get("$value")) {
            (Some(_), Some(_)) => {
                return Err(TokenError::invalid_node(
                    &token.pointer,
                    "a token cannot carry both $ref and $value",
                ))
            }
            (Some(reference), None) => {
                token.reference = Some(parse_reference(reference, &context)?);
            }
            (None, Some(Value::Null)) | (None, None) => {}
            (None, Some(value)) => match reference_object(value) {
                Some(reference) => token.reference = Some(parse_reference(reference, &context)?),
                None => token.value = Some(value.clone()),
            },
        }
        Ok(())
    }
}

fn push_children<'v>(work: &mut Vec<(Vec<String>, &'v Value)>, prefix: &[String], group: &'v Map<String, Value>) {
    // reversed so the first child is popped first
    for (key, child) in group.iter().rev() {
        if key.starts_with('$') {
            continue;
        }
        let mut segments = prefix.to_vec();
        segments.push(key.clone());
        work.push((segments, child));
    }
}

fn is_leaf(object: &Map<String, Value>) -> bool {
    object.contains_key("$value") || object.contains_key("$ref")
}

/// The `$ref` string of a `{ "$ref": ... }` object
pub fn reference_object(value: &Value) -> Option<&Value> {
    match value.as_object() {
        Some(object) if object.len() == 1 => object.get("$ref"),
        _ => None,
    }
}

pub fn parse_reference(reference: &Value, context: &str) -> Result<Pointer, TokenError> {
    let text = reference
        .as_str()
        .ok_or_else(|| TokenError::invalid_pointer(reference.to_string(), context, "$ref must be a string"))?;
    Pointer::parse(text).map_err(|e| e.with_context(context))
}

fn parse_deprecation(value: &Value, path: &str) -> Result<Option<Deprecation>, TokenError> {
    match value {
        Value::Bool(true) => Ok(Some(Deprecation::Flag)),
        Value::Bool(false) => Ok(None),
        Value::String(reason) => Ok(Some(Deprecation::Reason(reason.clone()))),
        Value::Object(object) => {
            let replacement = object.get("$replacement").ok_or_else(|| {
                TokenError::invalid_value(path, "$deprecated object needs a $replacement pointer")
            })?;
            let pointer = parse_reference(replacement, &format!("token {}", path))?;
            let reason = object
                .get("reason")
                .or_else(|| object.get("$reason"))
                .and_then(Value::as_str)
                .map(str::to_string);
            Ok(Some(Deprecation::Replacement {
                pointer: pointer.to_string(),
                reason,
            }))
        }
        other => Err(TokenError::invalid_value(
            path,
            format!("$deprecated must be a boolean, a reason or a replacement, found {}", kind_of(other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Project a resolved set into flattened tokens. Duplicate paths are dropped.
pub fn project(resolved: &ResolvedSet, transform: NameTransform) -> Vec<FlattenedToken> {
    resolved
        .iter()
        .filter(|token| !token.raw.is_duplicate())
        .map(|token| FlattenedToken {
            path: token.raw.path.clone(),
            pointer: token.raw.pointer.clone(),
            name: transform.name(&token.raw.path),
            token_type: token.token_type.clone(),
            value: token.value.clone(),
            aliases: token.aliases.clone(),
            candidates: token.candidates.clone(),
            metadata: token.raw.metadata.clone(),
        })
        .collect()
}
