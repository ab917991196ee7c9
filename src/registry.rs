//! Theme-aware token registry
//!
//! A registry is built once from resolved documents and never mutated.
//! Live updates go through [`SharedRegistry`], which swaps in a freshly built
//! registry as a whole.

use crate::config::ResolverOptions;
use crate::diagnostics::Diagnostics;
use crate::engine::{ResolutionStats, ResolvedDocument};
use crate::pointer::Pointer;
use crate::types::FlattenedToken;
use crate::utils::NameTransform;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// The resolved tokens of one theme, indexed by pointer and lookup name
#[derive(Debug, Clone)]
pub struct Theme {
    name: String,
    document_id: String,
    tokens: Vec<FlattenedToken>,
    by_pointer: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    diagnostics: Diagnostics,
    stats: ResolutionStats,
}

impl Theme {
    fn from_document(name: String, document: ResolvedDocument) -> Self {
        let mut by_pointer = HashMap::with_capacity(document.tokens.len());
        let mut by_name = HashMap::with_capacity(document.tokens.len());
        for (i, token) in document.tokens.iter().enumerate() {
            by_pointer.entry(token.pointer.clone()).or_insert(i);
            by_name.entry(token.name.clone()).or_insert(i);
        }
        Self {
            name,
            document_id: document.id,
            tokens: document.tokens,
            by_pointer,
            by_name,
            diagnostics: document.diagnostics,
            stats: document.stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn tokens(&self) -> &[FlattenedToken] {
        &self.tokens
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn stats(&self) -> &ResolutionStats {
        &self.stats
    }

    fn by_pointer(&self, pointer: &str) -> Option<&FlattenedToken> {
        self.by_pointer.get(pointer).map(|&i| &self.tokens[i])
    }

    fn by_name(&self, name: &str) -> Option<&FlattenedToken> {
        self.by_name.get(name).map(|&i| &self.tokens[i])
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    /// Themes in lookup order: the default theme first, then insertion order
    themes: Vec<Theme>,
    default_theme: String,
    transform: NameTransform,
}

impl TokenRegistry {
    pub fn build(options: &ResolverOptions, documents: Vec<(String, ResolvedDocument)>) -> Self {
        let mut themes: Vec<Theme> = documents
            .into_iter()
            .map(|(name, document)| Theme::from_document(name, document))
            .collect();
        if let Some(position) = themes.iter().position(|t| t.name == options.default_theme) {
            let default = themes.remove(position);
            themes.insert(0, default);
        }
        log::debug!(
            "Built registry with themes [{}]",
            themes.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
        );
        Self {
            themes,
            default_theme: options.default_theme.clone(),
            transform: options.name_transform,
        }
    }

    /// A registry holding one document as the default theme
    pub fn single(options: &ResolverOptions, document: ResolvedDocument) -> Self {
        Self::build(options, vec![(options.default_theme.clone(), document)])
    }

    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|t| t.name.as_str())
    }

    /// Themes consulted for a lookup. An explicit theme falls back to the
    /// default theme; no theme means every theme in lookup order.
    fn lookup_order(&self, theme: Option<&str>) -> Vec<&Theme> {
        match theme {
            Some(name) => {
                let mut order: Vec<&Theme> = self.theme(name).into_iter().collect();
                if name != self.default_theme {
                    order.extend(self.theme(&self.default_theme));
                }
                order
            }
            None => self.themes.iter().collect(),
        }
    }

    /// Look a token up by pointer. Any valid reference form is accepted; a
    /// document part only matches themes resolved from that document.
    pub fn get(&self, pointer: &str, theme: Option<&str>) -> Option<&FlattenedToken> {
        let pointer = Pointer::parse(pointer).ok()?;
        let canonical = pointer.local().to_string();
        self.lookup_order(theme)
            .into_iter()
            .filter(|t| pointer.is_local_to(t.document_id()))
            .find_map(|t| t.by_pointer(&canonical))
    }

    /// Look a token up by name, normalized with the registry's transform
    pub fn find(&self, name: &str, theme: Option<&str>) -> Option<&FlattenedToken> {
        let key = self.transform.name(name);
        self.lookup_order(theme).into_iter().find_map(|t| t.by_name(&key))
    }

    pub fn tokens(&self, theme: &str) -> Option<&[FlattenedToken]> {
        self.theme(theme).map(Theme::tokens)
    }

    /// Every token across themes, deduplicated by pointer. The first theme in
    /// lookup order that defines a pointer wins.
    pub fn all(&self) -> Vec<&FlattenedToken> {
        let mut seen = HashSet::new();
        self.themes
            .iter()
            .flat_map(|t| t.tokens.iter())
            .filter(|token| seen.insert(token.pointer.as_str()))
            .collect()
    }

    /// Diagnostics of every theme, in lookup order
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::default();
        for theme in &self.themes {
            diagnostics.extend(theme.diagnostics.clone());
        }
        diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.themes.iter().any(|t| t.diagnostics.has_errors())
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// A registry that can be replaced while readers hold snapshots
#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: RwLock<Arc<TokenRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: TokenRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<TokenRegistry> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Swap in a rebuilt registry, returning the previous one
    pub fn replace(&self, registry: TokenRegistry) -> Arc<TokenRegistry> {
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *guard, Arc::new(registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{TokenDocument, TokenEngine};
    use crate::types::{ColorValue, TokenValue};
    use serde_json::json;

    fn theme(value: &str) -> TokenDocument {
        TokenDocument::new(
            format!("{}.tokens.json", value),
            json!({"color": {"bg": {"$type": "color", "$value": value}}}),
        )
    }

    fn css(text: &str) -> TokenValue {
        TokenValue::Color(ColorValue::Css(text.to_string()))
    }

    #[test]
    fn test_default_theme_wins_in_merged_view() {
        let engine = TokenEngine::new(ResolverOptions::default());
        let registry = engine.resolve_themes(vec![
            ("dark".to_string(), theme("#000")),
            ("default".to_string(), theme("#fff")),
        ]);

        assert_eq!(registry.theme_names().collect::<Vec<_>>(), vec!["default", "dark"]);
        let all = registry.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, Some(css("#fff")));
        assert_eq!(registry.get("#/color/bg", None).unwrap().value, Some(css("#fff")));
        assert_eq!(registry.get("#/color/bg", Some("dark")).unwrap().value, Some(css("#000")));
    }

    #[test]
    fn test_explicit_theme_falls_back_to_default() {
        let engine = TokenEngine::new(ResolverOptions::default());
        let registry = engine.resolve_themes(vec![
            (
                "default".to_string(),
                TokenDocument::new(
                    "default.tokens.json",
                    json!({"space": {"sm": {"$type": "number", "$value": 4}}}),
                ),
            ),
            ("dark".to_string(), theme("#000")),
        ]);
        assert!(registry.get("#/space/sm", Some("dark")).is_some());
        assert!(registry.get("#/space/sm", Some("missing")).is_some());
        assert!(registry.get("#/color/bg", Some("default")).is_none());
        assert!(registry.get("#/color/bg", None).is_some());
    }

    #[test]
    fn test_name_lookup_uses_transform() {
        let options = ResolverOptions {
            name_transform: NameTransform::KebabCase,
            ..Default::default()
        };
        let document = TokenDocument::new(
            "tokens.json",
            json!({"buttonColors": {"primaryBg": {"$type": "color", "$value": "#fff"}}}),
        );
        let registry = TokenRegistry::single(&options, TokenEngine::new(options.clone()).resolve(&document));
        for key in ["buttonColors.primaryBg", "button-colors-primary-bg", "button-colors.primary-bg"] {
            assert!(registry.find(key, None).is_some(), "lookup failed for {}", key);
        }
        assert!(registry.get("#/buttonColors/primaryBg", None).is_some());
        assert!(registry.get("tokens.json#/buttonColors/primaryBg", None).is_some());
        assert!(registry.get("other.json#/buttonColors/primaryBg", None).is_none());
    }

    #[test]
    fn test_document_part_selects_theme() {
        let engine = TokenEngine::new(ResolverOptions::default());
        let document = |id: &str, value: &str| {
            TokenDocument::new(id, json!({"color": {"bg": {"$type": "color", "$value": value}}}))
        };
        let registry = engine.resolve_themes(vec![
            ("default".to_string(), document("default.tokens.json", "#fff")),
            ("dark".to_string(), document("dark.tokens.json", "#000")),
        ]);
        let dark = registry.get("dark.tokens.json#/color/bg", None);
        assert_eq!(dark.unwrap().value, Some(css("#000")));
        assert!(registry.get("dark.tokens.json#/color/bg", Some("default")).is_none());
        assert!(registry.get("light.tokens.json#/color/bg", None).is_none());
    }

    #[test]
    fn test_shared_registry_replacement() {
        let engine = TokenEngine::new(ResolverOptions::default());
        let shared = SharedRegistry::new(engine.resolve_themes(vec![("default".to_string(), theme("#fff"))]));
        let before = shared.snapshot();

        let previous = shared.replace(engine.resolve_themes(vec![("default".to_string(), theme("#000"))]));
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.get("#/color/bg", None).unwrap().value, Some(css("#fff")));
        assert_eq!(shared.snapshot().get("#/color/bg", None).unwrap().value, Some(css("#000")));
    }
}
