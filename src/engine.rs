//! The resolution pipeline
//!
//! 1. **Flatten** - walk the tree into raw leaves, collecting structural errors
//! 2. **Resolve** - follow aliases, splice nested refs and validate values
//! 3. **Override** - apply root `$overrides`, then externally supplied rules
//! 4. **Project** - emit flattened tokens under the configured name transform

use crate::config::ResolverOptions;
use crate::diagnostics::{DiagnosticSink, Diagnostics};
use crate::error::{LocationIndex, Result, TokenError};
use crate::flatten::{project, Flattener};
use crate::overrides::OverrideEngine;
use crate::registry::TokenRegistry;
use crate::resolver::Resolver;
use crate::types::{FlattenedToken, TokenType};
use crate::validators::{TokenValidator, ValidatorRegistry};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// An already-decoded token document
#[derive(Debug, Clone)]
pub struct TokenDocument {
    /// Identifier used in diagnostics and to recognise self-referencing pointers
    pub id: String,
    pub tree: Value,
    /// Rules applied after any `$overrides` embedded in the tree
    pub overrides: Vec<Value>,
    pub locations: LocationIndex,
}

impl TokenDocument {
    pub fn new(id: impl Into<String>, tree: Value) -> Self {
        Self {
            id: id.into(),
            tree,
            overrides: Vec::new(),
            locations: LocationIndex::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: Vec<Value>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_locations(mut self, locations: LocationIndex) -> Self {
        self.locations = locations;
        self
    }

    pub fn from_json(id: impl Into<String>, source: &str) -> Result<Self> {
        let id = id.into();
        let tree = serde_json::from_str(source).map_err(|e| TokenError::InvalidFormat {
            message: format!("{}: {}", id, e),
        })?;
        Ok(Self::new(id, tree))
    }

    /// Read a JSON document; its id is the file name
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|e| TokenError::Io(format!("{}: {}", path.display(), e)))?;
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_json(id, &source)
    }
}

/// Per-document resolution counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub token_count: usize,
    pub alias_count: usize,
    pub resolved_count: usize,
    pub failed_count: usize,
    pub overrides_applied: usize,
    pub overrides_failed: usize,
    pub candidate_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub resolve_time_ms: u64,
}

impl ResolutionStats {
    pub fn print_summary(&self) {
        println!("Token Resolution Statistics:");
        println!("  Total tokens: {}", self.token_count);
        println!("  Aliases: {}", self.alias_count);
        println!("  Resolved: {}", self.resolved_count);
        if self.failed_count > 0 {
            println!("  Failed: {}", self.failed_count);
        }
        if self.overrides_applied + self.overrides_failed > 0 {
            println!(
                "  Overrides: {} applied, {} failed ({} candidates)",
                self.overrides_applied, self.overrides_failed, self.candidate_count
            );
        }
        println!("  Diagnostics: {} errors, {} warnings", self.error_count, self.warning_count);
        println!("  Resolve time: {}ms", self.resolve_time_ms);
    }
}

/// Output of resolving one document
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedDocument {
    pub id: String,
    pub tokens: Vec<FlattenedToken>,
    pub diagnostics: Diagnostics,
    pub stats: ResolutionStats,
}

impl ResolvedDocument {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn get(&self, pointer: &str) -> Option<&FlattenedToken> {
        self.tokens.iter().find(|token| token.pointer == pointer)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenEngine {
    options: ResolverOptions,
    validators: ValidatorRegistry,
}

impl TokenEngine {
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            options,
            validators: ValidatorRegistry::new(),
        }
    }

    /// Register a validator for an additional (or replaced) type
    pub fn with_validator(mut self, token_type: TokenType, validator: impl TokenValidator + 'static) -> Self {
        self.validators.register(token_type, validator);
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn resolve(&self, document: &TokenDocument) -> ResolvedDocument {
        let start_time = Instant::now();
        let id = document.id.as_str();
        let validation = self.options.validation();
        let settings = self.options.settings();
        let mut sink = DiagnosticSink::new();

        log::debug!("Phase 1: Flattening '{}'...", id);
        let flattened = Flattener::new(id, self.options.name_transform, &document.locations).flatten(&document.tree);
        for issue in &flattened.issues {
            let location = document.locations.locate(id, &issue.pointer);
            sink.error(&issue.error, Some(&issue.pointer), location);
        }
        for token in &flattened.tokens {
            if let Some(error) = &token.error {
                sink.error(error, Some(&token.pointer), token.metadata.location.clone());
            }
        }

        log::debug!("Phase 2: Resolving {} tokens...", flattened.tokens.len());
        let mut resolved = Resolver::new(id, &flattened.tokens, &self.validators, &validation, settings, &mut sink)
            .resolve_all();

        let mut rules = embedded_overrides(&document.tree, id, &mut sink);
        rules.extend(document.overrides.iter().cloned());
        log::debug!("Phase 3: Applying {} overrides...", rules.len());
        let summary =
            OverrideEngine::new(id, &self.validators, &validation, settings, &mut sink).apply(&rules, &mut resolved);

        log::debug!("Phase 4: Projecting tokens...");
        let tokens = project(&resolved, self.options.name_transform);
        let diagnostics = sink.finish();

        let stats = ResolutionStats {
            token_count: tokens.len(),
            alias_count: resolved.iter().filter(|t| t.raw.reference.is_some()).count(),
            resolved_count: tokens.iter().filter(|t| t.is_resolved()).count(),
            failed_count: tokens.iter().filter(|t| !t.is_resolved()).count(),
            overrides_applied: summary.applied,
            overrides_failed: summary.failed,
            candidate_count: tokens.iter().map(|t| t.candidates.len()).sum(),
            error_count: diagnostics.error_count(),
            warning_count: diagnostics.warning_count(),
            resolve_time_ms: start_time.elapsed().as_millis() as u64,
        };
        log::debug!("Resolved '{}': {:?}", id, stats);

        ResolvedDocument {
            id: id.to_string(),
            tokens,
            diagnostics,
            stats,
        }
    }

    /// Resolve each theme independently on the rayon pool
    pub fn resolve_themes(&self, themes: Vec<(String, TokenDocument)>) -> TokenRegistry {
        log::info!("Resolving {} themes", themes.len());
        let resolved: Vec<(String, ResolvedDocument)> = themes
            .into_par_iter()
            .map(|(name, document)| {
                let result = self.resolve(&document);
                log::debug!("Theme '{}' resolved in {}ms", name, result.stats.resolve_time_ms);
                (name, result)
            })
            .collect();
        TokenRegistry::build(&self.options, resolved)
    }
}

fn embedded_overrides(tree: &Value, document_id: &str, sink: &mut DiagnosticSink) -> Vec<Value> {
    match tree.get("$overrides") {
        Some(Value::Array(rules)) => rules.clone(),
        Some(_) => {
            let error = TokenError::invalid_node("#/$overrides", "$overrides must be an array of rules");
            log::warn!("Ignoring malformed $overrides in '{}'", document_id);
            sink.error(&error, Some("#/$overrides"), None);
            Vec::new()
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorValue, TokenValue};
    use crate::utils::NameTransform;
    use serde_json::json;

    fn engine() -> TokenEngine {
        TokenEngine::new(ResolverOptions::default())
    }

    #[test]
    fn test_end_to_end_alias() {
        let document = TokenDocument::new(
            "tokens.json",
            json!({
                "color": {
                    "background": {"$type": "color", "$value": "#ffffff"},
                    "text": {"$ref": "#/color/background"}
                }
            }),
        );
        let result = engine().resolve(&document);
        let text = result.get("#/color/text").unwrap();
        assert_eq!(text.value, Some(TokenValue::Color(ColorValue::Css("#ffffff".to_string()))));
        assert_eq!(text.aliases, vec!["#/color/background"]);
        assert!(!result.has_errors());
        assert_eq!(result.stats.alias_count, 1);
    }

    #[test]
    fn test_end_to_end_fallback_override() {
        let document = TokenDocument::new(
            "tokens.json",
            json!({"color": {"text": {"$type": "color", "$value": "#333"}}}),
        )
        .with_overrides(vec![json!({
            "$token": "#/color/text",
            "$fallback": [{"$ref": "#/color/missing"}, {"$value": "#000"}]
        })]);

        let result = engine().resolve(&document);
        let text = result.get("#/color/text").unwrap();
        assert_eq!(text.candidates.len(), 1);
        assert_eq!(text.candidates[0].value, TokenValue::Color(ColorValue::Css("#000".to_string())));
        assert!(!result.has_errors());
        assert_eq!(result.stats.overrides_applied, 1);
    }

    #[test]
    fn test_embedded_overrides_run_first() {
        let document = TokenDocument::new(
            "tokens.json",
            json!({
                "$overrides": [{"$token": "#/size", "$value": 2}],
                "size": {"$type": "number", "$value": 1}
            }),
        )
        .with_overrides(vec![json!({"$token": "#/size", "$value": 3})]);

        let result = engine().resolve(&document);
        let values: Vec<_> = result.get("#/size").unwrap().candidates.iter().map(|c| c.value.clone()).collect();
        assert_eq!(values, vec![TokenValue::Number(2.0), TokenValue::Number(3.0)]);
    }

    #[test]
    fn test_gradient_clamping_end_to_end() {
        let document = TokenDocument::new(
            "tokens.json",
            json!({"hero": {"$type": "gradient", "$value": [
                {"color": "#000", "position": -0.5},
                {"color": "#fff", "position": 1.2}
            ]}}),
        );
        let result = engine().resolve(&document);
        let Some(TokenValue::Gradient(gradient)) = &result.get("#/hero").unwrap().value else {
            panic!("expected a gradient");
        };
        assert_eq!(gradient.stops[0].position, 0.0);
        assert_eq!(gradient.stops[1].position, 1.0);
        assert_eq!(result.stats.warning_count, 2);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_every_token_is_processed() {
        let document = TokenDocument::new(
            "tokens.json",
            json!({
                "broken": {"$type": "color", "$value": 12},
                "missing": {"$ref": "#/nope"},
                "fine": {"$type": "number", "$value": 1}
            }),
        );
        let result = engine().resolve(&document);
        assert_eq!(result.stats.token_count, 3);
        assert_eq!(result.stats.resolved_count, 1);
        assert_eq!(result.stats.failed_count, 2);
        // structural diagnostics come before resolution diagnostics
        let codes: Vec<_> = result.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["invalid-value", "unknown-reference"]);
    }

    #[test]
    fn test_locations_are_attached() {
        let mut locations = LocationIndex::new();
        locations.insert("#/broken", 2, 3);
        let document = TokenDocument::new("tokens.json", json!({"broken": {"$value": 1}})).with_locations(locations);
        let result = engine().resolve(&document);
        let diagnostic = result.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.code, "missing-type");
        assert_eq!(diagnostic.location.as_ref().unwrap().to_string(), "tokens.json:2:3");
    }

    #[test]
    fn test_name_transform_applies_to_paths() {
        let options = ResolverOptions {
            name_transform: NameTransform::KebabCase,
            ..Default::default()
        };
        let document = TokenDocument::new(
            "tokens.json",
            json!({"buttonColors": {"primaryBg": {"$type": "color", "$value": "#fff"}}}),
        );
        let result = TokenEngine::new(options).resolve(&document);
        let token = &result.tokens[0];
        assert_eq!(token.path, "button-colors.primary-bg");
        assert_eq!(token.name, "button-colors-primary-bg");
        assert_eq!(token.pointer, "#/buttonColors/primaryBg");
    }

    #[test]
    fn test_custom_validator() {
        let engine = engine().with_validator(
            TokenType::Custom("elevation".to_string()),
            |value: &Value, ctx: &mut crate::validators::ValidationContext<'_>| {
                value
                    .as_u64()
                    .map(|_| TokenValue::Other(value.clone()))
                    .ok_or_else(|| TokenError::invalid_value(ctx.path(), "elevation must be an integer"))
            },
        );
        let document = TokenDocument::new("tokens.json", json!({"card": {"$type": "elevation", "$value": 2}}));
        let result = engine.resolve(&document);
        assert!(result.tokens[0].is_resolved());
    }

    #[test]
    fn test_deep_chain_on_theme_pool() {
        let length = 2_000;
        let mut tree = serde_json::Map::new();
        for i in 0..length - 1 {
            tree.insert(format!("t{}", i), json!({"$ref": format!("#/t{}", i + 1)}));
        }
        tree.insert(format!("t{}", length - 1), json!({"$type": "color", "$value": "#3366ff"}));
        let document = TokenDocument::new("chain.tokens.json", Value::Object(tree));

        let registry = engine().resolve_themes(vec![("default".to_string(), document)]);
        assert!(!registry.has_errors());
        let head = registry.get("#/t0", None).unwrap();
        assert_eq!(head.token_type, Some(TokenType::Color));
        assert_eq!(head.aliases.len(), length - 1);
    }

    #[test]
    fn test_from_json_reports_format_errors() {
        let err = TokenDocument::from_json("broken.json", "{ not json").unwrap_err();
        assert_eq!(err.code(), "invalid-format");
        assert!(err.to_string().contains("broken.json"));
    }
}
