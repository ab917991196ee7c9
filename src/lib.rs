//! Design Token Resolver
//!
//! Validates, alias-resolves and flattens design token documents: nested
//! trees of colors, dimensions, durations, shadows, gradients and other
//! design values that reference each other by pointer, carry conditional
//! overrides and attach deprecation or extension metadata.
//!
//! # Features
//!
//! - Canonical pointers with traversal and escape checking
//! - One validator per token type, extensible with custom types
//! - Color normalization across sRGB, wide-gamut, Lab/LCH and OKLab/OKLCH spaces
//! - Alias resolution with full-chain cycle reporting
//! - Override rules with ordered, nested fallback chains
//! - Theme-aware registry with pointer and name lookup
//!
//! # Basic Usage
//!
//! ```rust
//! use serde_json::json;
//! use tokenc::{ResolverOptions, TokenDocument, TokenEngine};
//!
//! let document = TokenDocument::new(
//!     "tokens.json",
//!     json!({
//!         "color": {
//!             "background": { "$type": "color", "$value": "#ffffff" },
//!             "text": { "$ref": "#/color/background" }
//!         }
//!     }),
//! );
//!
//! let result = TokenEngine::new(ResolverOptions::default()).resolve(&document);
//! assert!(!result.has_errors());
//! assert_eq!(result.get("#/color/text").unwrap().aliases, vec!["#/color/background"]);
//! ```
//!
//! # Resolution Pipeline
//!
//! 1. **Phase 1**: Flattener - Walk the tree into path-addressable leaves
//! 2. **Phase 2**: Resolver - Follow `$ref` chains and validate values
//! 3. **Phase 3**: Override Engine - Apply `$overrides` and fallback chains
//! 4. **Phase 4**: Projection - Emit flattened tokens under the name transform
//!
//! Themes are resolved independently and combined in a [`TokenRegistry`].

pub mod types;
pub mod error;
pub mod utils;
pub mod pointer;

pub mod color;
pub mod config;
pub mod diagnostics;
pub mod validators;
pub mod flatten;
pub mod resolver;
pub mod overrides;
pub mod engine;
pub mod registry;
pub mod cli;

// Re-export commonly used types and functions
pub use error::{LocationIndex, Result, SourceLocation, TokenError};
pub use types::*;
pub use pointer::{canonicalize, Pointer};
pub use utils::NameTransform;
pub use color::{color_forms, colors_equivalent, normalize_color, ColorFormat, ColorForms};
pub use config::{ImplicitUnits, ResolverOptions};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use validators::{TokenValidator, ValidationContext, ValidatorRegistry};
pub use engine::{ResolutionStats, ResolvedDocument, TokenDocument, TokenEngine};
pub use registry::{SharedRegistry, Theme, TokenRegistry};
pub use cli::TokenCli;

/// Resolver version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Resolve a single JSON token file with default options
pub fn resolve_file(path: &str) -> Result<ResolvedDocument> {
    resolve_file_with_options(path, ResolverOptions::default())
}

/// Resolve a single JSON token file
pub fn resolve_file_with_options(path: &str, options: ResolverOptions) -> Result<ResolvedDocument> {
    let document = TokenDocument::load(path)?;
    log::info!("{} v{}", NAME, VERSION);
    log::info!("Resolving '{}'...", path);
    log::debug!("Resolver options: {:?}", options);

    let result = TokenEngine::new(options).resolve(&document);
    log::info!(
        "Resolved {} tokens ({} errors, {} warnings) in {}ms",
        result.stats.token_count,
        result.stats.error_count,
        result.stats.warning_count,
        result.stats.resolve_time_ms
    );
    Ok(result)
}

/// Resolve JSON source text with default options
pub fn resolve_source(source: &str, document_id: &str) -> Result<ResolvedDocument> {
    let document = TokenDocument::from_json(document_id, source)?;
    Ok(TokenEngine::new(ResolverOptions::default()).resolve(&document))
}
