//! Alias and reference resolution
//!
//! Each token is resolved at most once. Dependencies (the alias target, or
//! the nested `{ "$ref" }` objects inside a value) are visited depth first
//! with an explicit work-list, so alias chains are bounded by the document
//! and not by the thread stack. A dependency that is already on the stack
//! closes a cycle and every member of that cycle fails with the full chain.
//! Nested refs are replaced by the raw JSON of their resolved target before
//! validation.

use crate::diagnostics::{codes, Diagnostic, DiagnosticSink};
use crate::error::TokenError;
use crate::flatten::{parse_reference, reference_object, RawToken};
use crate::pointer::Pointer;
use crate::types::{Candidate, CandidateSource, Deprecation, TokenType, TokenValue};
use crate::validators::{ValidationContext, ValidationOptions, ValidatorRegistry};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// A token after resolution. `value` is `None` when the token failed.
#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub raw: RawToken,
    pub token_type: Option<TokenType>,
    pub value: Option<TokenValue>,
    /// The JSON the value was decoded from, with nested refs spliced in
    pub resolved_json: Option<Value>,
    pub aliases: Vec<String>,
    pub candidates: Vec<Candidate>,
}

impl ResolvedToken {
    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }
}

/// All tokens of one document, indexed by canonical local pointer
#[derive(Debug, Clone, Default)]
pub struct ResolvedSet {
    tokens: Vec<ResolvedToken>,
    index: HashMap<String, usize>,
}

impl ResolvedSet {
    pub fn get(&self, pointer: &str) -> Option<&ResolvedToken> {
        self.index.get(pointer).map(|&i| &self.tokens[i])
    }

    pub fn get_mut(&mut self, pointer: &str) -> Option<&mut ResolvedToken> {
        self.index.get(pointer).map(|&i| &mut self.tokens[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedToken> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverSettings {
    /// Type mismatches across aliases become errors instead of warnings
    pub strict_types: bool,
}

#[derive(Debug, Clone)]
struct Resolved {
    /// Declared type, or the terminal type for an untyped alias
    token_type: TokenType,
    /// Type of the literal at the end of the alias chain
    terminal_type: TokenType,
    value: TokenValue,
    json: Value,
    aliases: Vec<String>,
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone)]
enum State {
    Pending,
    Active,
    Done(Resolved),
    Failed,
}

/// A token on the work-list and the dependencies it still has to visit
struct Frame {
    token: usize,
    dependencies: Vec<usize>,
    next: usize,
}

/// Resolves a flattened document against its own pointer index
pub struct Resolver<'a> {
    document_id: &'a str,
    tokens: &'a [RawToken],
    index: HashMap<String, usize>,
    validators: &'a ValidatorRegistry,
    options: &'a ValidationOptions,
    settings: ResolverSettings,
    states: Vec<State>,
    /// Tokens currently `Active`, outermost first
    stack: Vec<usize>,
    /// Cycle chain for every token found on a cycle
    cycles: HashMap<usize, Vec<String>>,
    sink: &'a mut DiagnosticSink,
}

impl<'a> Resolver<'a> {
    pub fn new(
        document_id: &'a str,
        tokens: &'a [RawToken],
        validators: &'a ValidatorRegistry,
        options: &'a ValidationOptions,
        settings: ResolverSettings,
        sink: &'a mut DiagnosticSink,
    ) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| (token.pointer.clone(), i))
            .collect();
        Self {
            document_id,
            tokens,
            index,
            validators,
            options,
            settings,
            states: vec![State::Pending; tokens.len()],
            stack: Vec::new(),
            cycles: HashMap::new(),
            sink,
        }
    }

    /// Resolve every token in document order
    pub fn resolve_all(mut self) -> ResolvedSet {
        for i in 0..self.tokens.len() {
            self.resolve(i);
        }
        self.check_replacements();

        let mut resolved = Vec::with_capacity(self.tokens.len());
        for (raw, state) in self.tokens.iter().zip(self.states) {
            let token = match state {
                State::Done(done) => ResolvedToken {
                    raw: raw.clone(),
                    token_type: Some(done.token_type),
                    value: Some(done.value),
                    resolved_json: Some(done.json),
                    aliases: done.aliases,
                    candidates: done.candidates,
                },
                _ => ResolvedToken {
                    raw: raw.clone(),
                    token_type: raw.declared_type.clone(),
                    value: None,
                    resolved_json: None,
                    aliases: Vec::new(),
                    candidates: Vec::new(),
                },
            };
            resolved.push(token);
        }

        ResolvedSet {
            tokens: resolved,
            index: self.index,
        }
    }

    /// Resolve `root` and everything it depends on, dependencies first
    fn resolve(&mut self, root: usize) {
        if !matches!(self.states[root], State::Pending) || !self.enter(root) {
            return;
        }
        let mut frames = vec![self.frame(root)];

        while let Some(frame) = frames.last_mut() {
            if let Some(&dependency) = frame.dependencies.get(frame.next) {
                frame.next += 1;
                let pending = matches!(self.states[dependency], State::Pending);
                let active = matches!(self.states[dependency], State::Active);
                if pending && self.enter(dependency) {
                    frames.push(self.frame(dependency));
                } else if active {
                    if let Some(position) = self.stack.iter().position(|&t| t == dependency) {
                        self.mark_cycle(position);
                    }
                }
                continue;
            }

            let token = frame.token;
            frames.pop();
            self.finish(token);
        }
    }

    /// Mark a pending token active. Tokens with a structural error fail here.
    fn enter(&mut self, i: usize) -> bool {
        let tokens = self.tokens;
        let token = &tokens[i];
        if let Some(error) = &token.error {
            log::trace!("Skipping {} after structural error: {}", token.pointer, error);
            self.states[i] = State::Failed;
            return false;
        }
        self.states[i] = State::Active;
        self.stack.push(i);
        true
    }

    fn frame(&self, token: usize) -> Frame {
        Frame {
            token,
            dependencies: self.dependencies(token),
            next: 0,
        }
    }

    /// Compute token `i` once its dependencies are settled. `i` is the top of the stack.
    fn finish(&mut self, i: usize) {
        let outcome = self.resolve_token(i);
        self.stack.pop();

        let outcome = match self.cycles.remove(&i) {
            Some(chain) => Err(TokenError::CircularReference { chain }),
            None => outcome,
        };

        match outcome {
            Ok(done) => self.states[i] = State::Done(done),
            Err(error) => {
                self.report(&error, i);
                self.states[i] = State::Failed;
            }
        }
    }

    /// Tokens `resolve_token` will follow for token `i`, in the order it follows them
    fn dependencies(&self, i: usize) -> Vec<usize> {
        let token = &self.tokens[i];
        let mut found = Vec::new();
        if let Some(reference) = &token.reference {
            found.extend(self.local_target(reference));
            return found;
        }
        let (Some(value), Some(_)) = (&token.value, &token.declared_type) else {
            return found;
        };

        let mut work = vec![value];
        while let Some(value) = work.pop() {
            if let Some(reference) = reference_object(value) {
                let target = reference
                    .as_str()
                    .and_then(|r| Pointer::parse(r).ok())
                    .and_then(|pointer| self.local_target(&pointer));
                found.extend(target);
                continue;
            }
            match value {
                Value::Array(items) => work.extend(items.iter().rev()),
                Value::Object(object) => work.extend(object.values().rev()),
                _ => {}
            }
        }
        found
    }

    fn local_target(&self, reference: &Pointer) -> Option<usize> {
        if !reference.is_local_to(self.document_id) {
            return None;
        }
        self.index.get(&reference.local().to_string()).copied()
    }

    fn resolve_token(&mut self, i: usize) -> Result<Resolved, TokenError> {
        let tokens = self.tokens;
        let token = &tokens[i];
        if let Some(reference) = &token.reference {
            return self.resolve_alias(i, reference);
        }

        let raw = token
            .value
            .as_ref()
            .ok_or_else(|| TokenError::MissingValue { path: token.path.clone() })?;
        let token_type = token
            .declared_type
            .clone()
            .ok_or_else(|| TokenError::MissingType { path: token.path.clone() })?;

        match raw {
            Value::Array(entries) if !token_type.is_array_shaped() => {
                self.resolve_inline_candidates(i, &token_type, entries)
            }
            _ => {
                let mut aliases = Vec::new();
                let json = self.splice(i, raw, &mut aliases)?;
                let value = self.validate(i, &token_type, &json)?;
                Ok(Resolved {
                    terminal_type: token_type.clone(),
                    token_type,
                    value,
                    json,
                    aliases,
                    candidates: Vec::new(),
                })
            }
        }
    }

    fn resolve_alias(&mut self, i: usize, reference: &Pointer) -> Result<Resolved, TokenError> {
        let (terminal_type, value, json, aliases) = {
            let target = self.follow(i, reference)?;
            let mut aliases = Vec::with_capacity(target.aliases.len() + 1);
            aliases.push(reference.local().to_string());
            push_unique(&mut aliases, target.aliases.iter().cloned());
            (
                target.terminal_type.clone(),
                target.value.clone(),
                target.json.clone(),
                aliases,
            )
        };
        let tokens = self.tokens;
        let token = &tokens[i];

        let token_type = match &token.declared_type {
            None => terminal_type.clone(),
            Some(declared) if *declared == terminal_type => terminal_type.clone(),
            Some(declared) => {
                self.type_mismatch(i, declared, &terminal_type, &aliases)?;
                declared.clone()
            }
        };

        Ok(Resolved {
            token_type,
            terminal_type,
            value,
            json,
            aliases,
            candidates: Vec::new(),
        })
    }

    fn resolve_inline_candidates(
        &mut self,
        i: usize,
        token_type: &TokenType,
        entries: &[Value],
    ) -> Result<Resolved, TokenError> {
        let path = self.tokens[i].path.clone();
        if entries.is_empty() {
            return Err(TokenError::invalid_value(path, "candidate list is empty"));
        }

        let mut candidates = Vec::new();
        let mut first: Option<(Value, Vec<String>)> = None;

        for (n, entry) in entries.iter().enumerate() {
            let mut aliases = Vec::new();
            let attempt = match reference_object(entry) {
                Some(reference) => self.reference_candidate(i, token_type, reference, &mut aliases),
                None => self.literal_candidate(i, token_type, entry, &mut aliases),
            };

            match attempt {
                Ok((value, json, pointer)) => {
                    if first.is_none() {
                        first = Some((json, aliases));
                    }
                    candidates.push(Candidate {
                        value,
                        pointer,
                        source: CandidateSource::Inline,
                    });
                }
                Err(TokenError::CircularReference { chain }) => {
                    return Err(TokenError::CircularReference { chain })
                }
                Err(error) => {
                    let diagnostic = Diagnostic::warning(
                        codes::UNRESOLVED_CANDIDATE,
                        format!("candidate {} of {} skipped: {}", n, path, error),
                    );
                    self.warn(diagnostic, i);
                }
            }
        }

        let (json, aliases) =
            first.ok_or_else(|| TokenError::invalid_value(&path, "no candidate value resolved"))?;
        Ok(Resolved {
            token_type: token_type.clone(),
            terminal_type: token_type.clone(),
            value: candidates[0].value.clone(),
            json,
            aliases,
            candidates,
        })
    }

    fn reference_candidate(
        &mut self,
        i: usize,
        token_type: &TokenType,
        reference: &Value,
        aliases: &mut Vec<String>,
    ) -> Result<(TokenValue, Value, Option<String>), TokenError> {
        let tokens = self.tokens;
        let token = &tokens[i];
        let pointer = parse_reference(reference, &format!("token {}", token.path))?;
        let label = pointer.local().to_string();

        let target = self.follow(i, &pointer)?;
        if target.terminal_type != *token_type {
            return Err(TokenError::TypeMismatch {
                pointer: token.pointer.clone(),
                expected: token_type.to_string(),
                found: target.terminal_type.to_string(),
                via: label,
            });
        }
        aliases.push(label.clone());
        push_unique(aliases, target.aliases.iter().cloned());
        Ok((target.value.clone(), target.json.clone(), Some(label)))
    }

    fn literal_candidate(
        &mut self,
        i: usize,
        token_type: &TokenType,
        entry: &Value,
        aliases: &mut Vec<String>,
    ) -> Result<(TokenValue, Value, Option<String>), TokenError> {
        let json = self.splice(i, entry, aliases)?;
        let value = self.validate(i, token_type, &json)?;
        Ok((value, json, None))
    }

    /// Follow a reference out of token `from`. Dependencies are settled
    /// before `from` is computed, so the target is done, failed or on a cycle.
    fn follow(&mut self, from: usize, reference: &Pointer) -> Result<&Resolved, TokenError> {
        let origin = self.tokens[from].pointer.clone();
        let local = reference.local().to_string();

        let target = match self.index.get(&local) {
            Some(&target) if reference.is_local_to(self.document_id) => target,
            _ => return Err(TokenError::unknown_reference(origin, reference.to_string())),
        };

        if matches!(self.states[target], State::Active) {
            if let Some(position) = self.stack.iter().position(|&t| t == target) {
                self.mark_cycle(position);
            }
            let chain = self.cycles.get(&from).cloned().unwrap_or_default();
            return Err(TokenError::CircularReference { chain });
        }

        match &self.states[target] {
            State::Done(done) => Ok(done),
            _ => Err(TokenError::UnresolvedTarget { origin, target: local }),
        }
    }

    /// Every token from `position` to the top of the stack is on the cycle
    fn mark_cycle(&mut self, position: usize) {
        let members: Vec<usize> = self.stack[position..].to_vec();
        for k in 0..members.len() {
            let mut chain: Vec<String> = members[k..]
                .iter()
                .chain(members[..k].iter())
                .map(|&m| self.tokens[m].pointer.clone())
                .collect();
            chain.push(self.tokens[members[k]].pointer.clone());
            self.cycles.entry(members[k]).or_insert(chain);
        }
        log::debug!("Found reference cycle through {} tokens", members.len());
    }

    /// Replace nested `{ "$ref" }` objects with their targets' JSON
    fn splice(&mut self, i: usize, value: &Value, aliases: &mut Vec<String>) -> Result<Value, TokenError> {
        if let Some(reference) = reference_object(value) {
            let pointer = parse_reference(reference, &format!("token {}", self.tokens[i].path))?;
            let target = self.follow(i, &pointer)?;
            let mut hops = Vec::with_capacity(target.aliases.len() + 1);
            hops.push(pointer.local().to_string());
            hops.extend(target.aliases.iter().cloned());
            let json = target.json.clone();
            push_unique(aliases, hops);
            return Ok(json);
        }

        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.splice(i, item, aliases))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(object) => {
                let mut spliced = Map::with_capacity(object.len());
                for (key, item) in object {
                    spliced.insert(key.clone(), self.splice(i, item, aliases)?);
                }
                Ok(Value::Object(spliced))
            }
            other => Ok(other.clone()),
        }
    }

    fn validate(&mut self, i: usize, token_type: &TokenType, json: &Value) -> Result<TokenValue, TokenError> {
        let path = self.tokens[i].path.clone();
        let mut ctx = ValidationContext::new(&path, self.options);
        let value = self.validators.validate(token_type, json, &mut ctx)?;
        for warning in ctx.into_warnings() {
            self.warn(warning, i);
        }
        Ok(value)
    }

    fn type_mismatch(
        &mut self,
        i: usize,
        declared: &TokenType,
        found: &TokenType,
        aliases: &[String],
    ) -> Result<(), TokenError> {
        let error = TokenError::TypeMismatch {
            pointer: self.tokens[i].pointer.clone(),
            expected: declared.to_string(),
            found: found.to_string(),
            via: aliases.join(" -> "),
        };
        if self.settings.strict_types {
            return Err(error);
        }
        self.warn(Diagnostic::warning(codes::TYPE_MISMATCH, error.to_string()), i);
        Ok(())
    }

    fn check_replacements(&mut self) {
        let tokens = self.tokens;
        for (i, token) in tokens.iter().enumerate() {
            let Some(Deprecation::Replacement { pointer, .. }) = &token.metadata.deprecated else {
                continue;
            };
            let known = Pointer::parse(pointer)
                .map(|p| p.is_local_to(self.document_id) && self.index.contains_key(&p.local().to_string()))
                .unwrap_or(false);
            if !known {
                let diagnostic = Diagnostic::warning(
                    codes::UNKNOWN_REPLACEMENT,
                    format!("{} is deprecated in favour of unknown token {}", token.path, pointer),
                );
                self.warn(diagnostic, i);
            }
        }
    }

    fn report(&mut self, error: &TokenError, i: usize) {
        let tokens = self.tokens;
        let token = &tokens[i];
        self.sink
            .error(error, Some(&token.pointer), token.metadata.location.clone());
    }

    fn warn(&mut self, diagnostic: Diagnostic, i: usize) {
        let tokens = self.tokens;
        let token = &tokens[i];
        self.sink.resolution(
            diagnostic
                .at(token.pointer.clone())
                .located(token.metadata.location.clone()),
        );
    }
}

fn push_unique(list: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    let mut seen: HashSet<String> = list.iter().cloned().collect();
    for item in items {
        if seen.insert(item.clone()) {
            list.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocationIndex;
    use crate::flatten::Flattener;
    use crate::types::ColorValue;
    use crate::utils::NameTransform;
    use serde_json::json;

    fn resolve_with(tree: Value, settings: ResolverSettings) -> (ResolvedSet, crate::diagnostics::Diagnostics) {
        let locations = LocationIndex::new();
        let output = Flattener::new("tokens.json", NameTransform::None, &locations).flatten(&tree);
        let validators = ValidatorRegistry::new();
        let options = ValidationOptions::default();
        let mut sink = DiagnosticSink::new();
        let resolved = Resolver::new("tokens.json", &output.tokens, &validators, &options, settings, &mut sink)
            .resolve_all();
        (resolved, sink.finish())
    }

    fn resolve(tree: Value) -> (ResolvedSet, crate::diagnostics::Diagnostics) {
        resolve_with(tree, ResolverSettings::default())
    }

    #[test]
    fn test_simple_alias() {
        let (set, diagnostics) = resolve(json!({
            "color": {
                "background": {"$type": "color", "$value": "#ffffff"},
                "text": {"$ref": "#/color/background"}
            }
        }));
        let text = set.get("#/color/text").unwrap();
        assert_eq!(text.value, Some(TokenValue::Color(ColorValue::Css("#ffffff".to_string()))));
        assert_eq!(text.token_type, Some(TokenType::Color));
        assert_eq!(text.aliases, vec!["#/color/background"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_chain_records_every_hop_in_order() {
        let (set, _) = resolve(json!({
            "a": {"$ref": "#/b"},
            "b": {"$ref": "#/c"},
            "c": {"$ref": "#/d"},
            "d": {"$type": "number", "$value": 8}
        }));
        let a = set.get("#/a").unwrap();
        assert_eq!(a.value, Some(TokenValue::Number(8.0)));
        assert_eq!(a.aliases, vec!["#/b", "#/c", "#/d"]);
    }

    #[test]
    fn test_untyped_alias_takes_terminal_type() {
        let (set, diagnostics) = resolve(json!({
            "a": {"$ref": "#/b"},
            "b": {"$type": "string", "$ref": "#/c"},
            "c": {"$type": "number", "$value": 4}
        }));
        let a = set.get("#/a").unwrap();
        assert_eq!(a.token_type, Some(TokenType::Number));
        assert_eq!(a.value, Some(TokenValue::Number(4.0)));
        assert_eq!(a.aliases, vec!["#/b", "#/c"]);

        let b = set.get("#/b").unwrap();
        assert_eq!(b.token_type, Some(TokenType::String));
        let mismatches: Vec<_> = diagnostics.with_code("type-mismatch").collect();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].pointer.as_deref(), Some("#/b"));
    }

    #[test]
    fn test_typed_origin_is_checked_against_terminal() {
        let (set, diagnostics) = resolve(json!({
            "a": {"$type": "number", "$ref": "#/b"},
            "b": {"$type": "string", "$ref": "#/c"},
            "c": {"$type": "number", "$value": 4}
        }));
        assert_eq!(set.get("#/a").unwrap().token_type, Some(TokenType::Number));
        assert_eq!(diagnostics.for_pointer("#/a").count(), 0);
        assert_eq!(diagnostics.with_code("type-mismatch").count(), 1);
    }

    #[test]
    fn test_long_forward_chain() {
        let length = 2_000;
        let mut tree = Map::new();
        for i in 0..length - 1 {
            tree.insert(format!("t{}", i), json!({"$ref": format!("#/t{}", i + 1)}));
        }
        tree.insert(format!("t{}", length - 1), json!({"$type": "number", "$value": 1}));

        let (set, diagnostics) = resolve(Value::Object(tree));
        assert!(diagnostics.is_empty());
        assert!(set.iter().all(ResolvedToken::is_resolved));
        let head = set.get("#/t0").unwrap();
        assert_eq!(head.aliases.len(), length - 1);
        assert_eq!(head.aliases.last().map(String::as_str), Some("#/t1999"));
        assert_eq!(head.token_type, Some(TokenType::Number));
    }

    #[test]
    fn test_long_cycle_fails_every_member() {
        let length = 500;
        let mut tree = Map::new();
        for i in 0..length {
            tree.insert(format!("t{}", i), json!({"$ref": format!("#/t{}", (i + 1) % length)}));
        }
        let (set, diagnostics) = resolve(Value::Object(tree));
        assert!(set.iter().all(|t| !t.is_resolved()));
        assert_eq!(diagnostics.with_code("circular-reference").count(), length);
    }

    #[test]
    fn test_cycle_names_every_member() {
        let (set, diagnostics) = resolve(json!({
            "a": {"$ref": "#/b"},
            "b": {"$ref": "#/c"},
            "c": {"$ref": "#/a"},
            "d": {"$ref": "#/a"}
        }));
        assert!(set.iter().all(|t| !t.is_resolved()));

        let cycles: Vec<_> = diagnostics.with_code("circular-reference").collect();
        assert_eq!(cycles.len(), 3);
        let a = diagnostics.for_pointer("#/a").next().unwrap();
        assert!(a.message.contains("#/a -> #/b -> #/c -> #/a"));
        let d = diagnostics.for_pointer("#/d").next().unwrap();
        assert_eq!(d.code, "unresolved-target");
    }

    #[test]
    fn test_self_reference() {
        let (_, diagnostics) = resolve(json!({"a": {"$ref": "#/a"}}));
        let error = diagnostics.iter().next().unwrap();
        assert_eq!(error.code, "circular-reference");
        assert!(error.message.contains("#/a -> #/a"));
    }

    #[test]
    fn test_unknown_and_foreign_references() {
        let (set, diagnostics) = resolve(json!({
            "a": {"$ref": "#/missing"},
            "b": {"$ref": "other.json#/a"},
            "c": {"$ref": "tokens.json#/d"},
            "d": {"$type": "string", "$value": "ok"}
        }));
        assert_eq!(diagnostics.with_code("unknown-reference").count(), 2);
        assert!(set.get("#/c").unwrap().is_resolved());
    }

    #[test]
    fn test_type_mismatch_is_a_warning_by_default() {
        let tree = json!({
            "size": {"$type": "number", "$value": 4},
            "alias": {"$type": "string", "$ref": "#/size"}
        });
        let (set, diagnostics) = resolve(tree.clone());
        let alias = set.get("#/alias").unwrap();
        assert_eq!(alias.token_type, Some(TokenType::String));
        assert!(alias.is_resolved());
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.with_code("type-mismatch").count(), 1);

        let (set, diagnostics) = resolve_with(tree, ResolverSettings { strict_types: true });
        assert!(!set.get("#/alias").unwrap().is_resolved());
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_missing_type_and_value() {
        let (_, diagnostics) = resolve(json!({
            "untyped": {"$value": 4},
            "alias": {"$ref": "#/untyped"}
        }));
        assert_eq!(diagnostics.with_code("missing-type").count(), 1);
        assert_eq!(diagnostics.with_code("unresolved-target").count(), 1);
    }

    #[test]
    fn test_nested_refs_are_spliced() {
        let (set, diagnostics) = resolve(json!({
            "black": {"$type": "color", "$value": "#000000"},
            "blur": {"$type": "dimension", "$value": {"value": 4, "unit": "px"}},
            "card": {"$type": "shadow", "$value": {
                "color": {"$ref": "#/black"},
                "offsetX": {"value": 0, "unit": "px"},
                "offsetY": {"value": 1, "unit": "px"},
                "blur": {"$ref": "#/blur"}
            }}
        }));
        assert!(diagnostics.is_empty());
        let card = set.get("#/card").unwrap();
        assert!(card.is_resolved());
        assert_eq!(card.aliases, vec!["#/black", "#/blur"]);
    }

    #[test]
    fn test_inline_candidates() {
        let (set, diagnostics) = resolve(json!({
            "brand": {"$type": "color", "$value": "#123456"},
            "accent": {"$type": "color", "$value": [{"$ref": "#/missing"}, {"$ref": "#/brand"}, "#000"]}
        }));
        let accent = set.get("#/accent").unwrap();
        assert_eq!(accent.candidates.len(), 2);
        assert_eq!(accent.candidates[0].pointer.as_deref(), Some("#/brand"));
        assert_eq!(accent.value, Some(TokenValue::Color(ColorValue::Css("#123456".to_string()))));
        assert_eq!(diagnostics.with_code("unresolved-candidate").count(), 1);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_replacement_must_exist() {
        let (_, diagnostics) = resolve(json!({
            "old": {"$type": "number", "$value": 1, "$deprecated": {"$replacement": "#/gone"}},
            "older": {"$type": "number", "$value": 1, "$deprecated": {"$replacement": "#/old"}}
        }));
        assert_eq!(diagnostics.with_code("unknown-replacement").count(), 1);
    }
}
