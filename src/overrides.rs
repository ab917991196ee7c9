//! Override rules and fallback chains
//!
//! Rules run in order after alias resolution. A rule never changes its
//! target's type or value; every value it proposes is appended to the target's
//! candidate list, tagged with the rule index, its `$when` map and how deep in
//! the `$fallback` chain it was found.

use crate::diagnostics::{codes, Diagnostic, DiagnosticSink};
use crate::error::{SourceLocation, TokenError};
use crate::flatten::{parse_reference, reference_object};
use crate::resolver::{ResolvedSet, ResolverSettings};
use crate::types::{Candidate, CandidateSource, TokenType, TokenValue};
use crate::validators::{ValidationContext, ValidationOptions, ValidatorRegistry};
use serde_json::{Map, Value};

/// Counts reported back to the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverrideSummary {
    pub applied: usize,
    pub failed: usize,
    pub candidates: usize,
}

struct RuleTarget {
    index: usize,
    pointer: String,
    path: String,
    token_type: TokenType,
    when: Option<Map<String, Value>>,
    location: Option<SourceLocation>,
}

impl RuleTarget {
    fn candidate(&self, value: TokenValue, pointer: Option<String>, fallback_depth: usize) -> Candidate {
        Candidate {
            value,
            pointer,
            source: CandidateSource::Override {
                index: self.index,
                when: self.when.clone(),
                fallback_depth,
            },
        }
    }
}

pub struct OverrideEngine<'a> {
    document_id: &'a str,
    validators: &'a ValidatorRegistry,
    options: &'a ValidationOptions,
    settings: ResolverSettings,
    sink: &'a mut DiagnosticSink,
}

impl<'a> OverrideEngine<'a> {
    pub fn new(
        document_id: &'a str,
        validators: &'a ValidatorRegistry,
        options: &'a ValidationOptions,
        settings: ResolverSettings,
        sink: &'a mut DiagnosticSink,
    ) -> Self {
        Self {
            document_id,
            validators,
            options,
            settings,
            sink,
        }
    }

    /// Apply `rules` in order; `rules[i]` is reported as override #i
    pub fn apply(mut self, rules: &[Value], set: &mut ResolvedSet) -> OverrideSummary {
        let mut summary = OverrideSummary::default();
        for (index, rule) in rules.iter().enumerate() {
            match self.apply_rule(index, rule, set) {
                Some(added) => {
                    summary.applied += 1;
                    summary.candidates += added;
                }
                None => summary.failed += 1,
            }
        }
        log::debug!(
            "Applied {} of {} overrides to '{}' ({} candidates)",
            summary.applied,
            rules.len(),
            self.document_id,
            summary.candidates
        );
        summary
    }

    fn apply_rule(&mut self, index: usize, rule: &Value, set: &mut ResolvedSet) -> Option<usize> {
        let target = match self.read_target(index, rule, set) {
            Ok(Some(target)) => target,
            Ok(None) => return None,
            Err((error, pointer)) => {
                let location = pointer
                    .as_deref()
                    .and_then(|p| set.get(p))
                    .and_then(|token| token.raw.metadata.location.clone());
                self.sink.error(&error, pointer.as_deref(), location);
                return None;
            }
        };

        let mut candidates = Vec::new();
        if let Err(error) = self.collect_rule(&target, rule, set, &mut candidates) {
            self.error(&error, &target);
            return None;
        }

        let added = candidates.len();
        if let Some(token) = set.get_mut(&target.pointer) {
            token.candidates.extend(candidates);
        }
        log::trace!("Override #{} added {} candidates to {}", index, added, target.pointer);
        Some(added)
    }

    /// Find and check the rule's `$token`. `Ok(None)` means the target failed
    /// earlier and the rule is skipped without a new diagnostic.
    fn read_target(
        &self,
        index: usize,
        rule: &Value,
        set: &ResolvedSet,
    ) -> Result<Option<RuleTarget>, (TokenError, Option<String>)> {
        let rule = rule
            .as_object()
            .ok_or_else(|| (TokenError::invalid_override(index, "rule must be an object"), None))?;
        let context = format!("override #{}", index);

        let reference = rule
            .get("$token")
            .ok_or_else(|| (TokenError::invalid_override(index, "missing $token"), None))?;
        let pointer = parse_reference(reference, &context).map_err(|e| (e, None))?;
        let local = pointer.local().to_string();

        let token = set
            .get(&local)
            .filter(|_| pointer.is_local_to(self.document_id))
            .ok_or_else(|| {
                let error = TokenError::UnknownOverrideTarget {
                    index,
                    target: pointer.to_string(),
                };
                (error, None)
            })?;

        let when = match rule.get("$when") {
            Some(Value::Object(when)) => Some(when.clone()),
            Some(_) => {
                return Err((
                    TokenError::invalid_override(index, "$when must be an object"),
                    Some(local),
                ))
            }
            None => None,
        };

        match (&token.token_type, token.is_resolved()) {
            (Some(token_type), true) => Ok(Some(RuleTarget {
                index,
                pointer: local,
                path: token.raw.path.clone(),
                token_type: token_type.clone(),
                when,
                location: token.raw.metadata.location.clone(),
            })),
            _ => {
                log::debug!("Skipping override #{}: target {} did not resolve", index, local);
                Ok(None)
            }
        }
    }

    fn collect_rule(
        &mut self,
        target: &RuleTarget,
        rule: &Value,
        set: &ResolvedSet,
        out: &mut Vec<Candidate>,
    ) -> Result<(), TokenError> {
        let fallback = rule.get("$fallback");
        match (rule.get("$ref"), rule.get("$value")) {
            (Some(_), Some(_)) => {
                return Err(TokenError::invalid_override(
                    target.index,
                    "a rule cannot carry both $ref and $value",
                ))
            }
            (Some(reference), None) => {
                let candidate = self.reference_candidate(target, reference, set, 0)?;
                out.push(candidate);
            }
            (None, Some(value)) => match reference_object(value) {
                Some(reference) => {
                    let candidate = self.reference_candidate(target, reference, set, 0)?;
                    out.push(candidate);
                }
                None => {
                    let value = self.validate(target, value)?;
                    out.push(target.candidate(value, None, 0));
                }
            },
            (None, None) if fallback.is_none() => {
                return Err(TokenError::invalid_override(
                    target.index,
                    "rule supplies no $ref, $value or $fallback",
                ))
            }
            (None, None) => {}
        }

        if let Some(fallback) = fallback {
            self.collect_fallbacks(target, fallback, 1, set, out)?;
        }
        Ok(())
    }

    fn collect_fallbacks(
        &mut self,
        target: &RuleTarget,
        fallback: &Value,
        depth: usize,
        set: &ResolvedSet,
        out: &mut Vec<Candidate>,
    ) -> Result<(), TokenError> {
        let entries = fallback.as_array().ok_or_else(|| {
            TokenError::invalid_override(target.index, format!("$fallback at depth {} must be an array", depth))
        })?;

        for entry in entries {
            let Some(entry) = entry.as_object() else {
                let error = TokenError::invalid_override(
                    target.index,
                    format!("fallback entry at depth {} must be an object", depth),
                );
                self.error(&error, target);
                continue;
            };

            let nested = entry.get("$fallback");
            let reference = match (entry.get("$ref"), entry.get("$value")) {
                (Some(_), Some(_)) => {
                    let error = TokenError::invalid_override(
                        target.index,
                        format!("fallback entry at depth {} carries both $ref and $value", depth),
                    );
                    self.error(&error, target);
                    continue;
                }
                (Some(reference), None) => Some(reference),
                (None, Some(value)) => match reference_object(value) {
                    Some(reference) => Some(reference),
                    None => {
                        match self.validate(target, value) {
                            Ok(value) => out.push(target.candidate(value, None, depth)),
                            Err(error) => self.error(&error, target),
                        }
                        None
                    }
                },
                (None, None) => {
                    if nested.is_none() {
                        self.warn(
                            Diagnostic::warning(
                                codes::EMPTY_FALLBACK,
                                format!(
                                    "override #{}: fallback entry at depth {} supplies nothing",
                                    target.index, depth
                                ),
                            ),
                            target,
                        );
                    }
                    None
                }
            };

            if let Some(reference) = reference {
                match self.reference_candidate(target, reference, set, depth) {
                    Ok(candidate) => out.push(candidate),
                    Err(error @ TokenError::TypeMismatch { .. }) => self.error(&error, target),
                    Err(error) => self.warn(
                        Diagnostic::warning(
                            codes::UNRESOLVED_FALLBACK,
                            format!("override #{}: fallback skipped: {}", target.index, error),
                        ),
                        target,
                    ),
                }
            }

            if let Some(nested) = nested {
                if let Err(error) = self.collect_fallbacks(target, nested, depth + 1, set, out) {
                    self.error(&error, target);
                }
            }
        }
        Ok(())
    }

    /// Look up a `$ref` and turn it into a candidate. A type difference is
    /// reported as a warning here and only returned as an error in strict mode.
    fn reference_candidate(
        &mut self,
        target: &RuleTarget,
        reference: &Value,
        set: &ResolvedSet,
        depth: usize,
    ) -> Result<Candidate, TokenError> {
        let context = format!("override #{}", target.index);
        let pointer = parse_reference(reference, &context)?;
        let local = pointer.local().to_string();

        let source = set
            .get(&local)
            .filter(|_| pointer.is_local_to(self.document_id))
            .ok_or_else(|| TokenError::unknown_reference(&target.pointer, pointer.to_string()))?;
        let (Some(source_type), Some(value)) = (&source.token_type, &source.value) else {
            return Err(TokenError::UnresolvedTarget {
                origin: target.pointer.clone(),
                target: local,
            });
        };

        if *source_type != target.token_type {
            let error = TokenError::TypeMismatch {
                pointer: target.pointer.clone(),
                expected: target.token_type.to_string(),
                found: source_type.to_string(),
                via: format!("{} ({})", local, context),
            };
            if self.settings.strict_types {
                return Err(error);
            }
            self.warn(Diagnostic::warning(codes::TYPE_MISMATCH, error.to_string()), target);
        }

        Ok(target.candidate(value.clone(), Some(local), depth))
    }

    fn validate(&mut self, target: &RuleTarget, value: &Value) -> Result<TokenValue, TokenError> {
        let label = format!("{} (override #{})", target.path, target.index);
        let mut ctx = ValidationContext::new(&label, self.options);
        let value = self.validators.validate(&target.token_type, value, &mut ctx)?;
        for warning in ctx.into_warnings() {
            self.warn(warning, target);
        }
        Ok(value)
    }

    fn error(&mut self, error: &TokenError, target: &RuleTarget) {
        self.sink.error(error, Some(&target.pointer), target.location.clone());
    }

    fn warn(&mut self, diagnostic: Diagnostic, target: &RuleTarget) {
        self.sink.resolution(
            diagnostic
                .at(target.pointer.clone())
                .located(target.location.clone()),
        );
    }
}
