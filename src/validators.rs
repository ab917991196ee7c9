//! Per-type value validation
//!
//! Each token type maps to a [`TokenValidator`] in a [`ValidatorRegistry`].
//! A validator checks the raw JSON shape and decodes it into a [`TokenValue`]
//! once; everything downstream works with the decoded value.

use crate::color::parse_css_color;
use crate::diagnostics::{codes, Diagnostic};
use crate::error::{Result, TokenError};
use crate::types::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

static HEX6: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

const STROKE_KEYWORDS: &[&str] = &[
    "solid", "dashed", "dotted", "double", "groove", "ridge", "outset", "inset",
];

const LINE_CAPS: &[&str] = &["round", "butt", "square"];

const DURATION_UNITS: &[&str] = &["ms", "s"];

const FONT_WEIGHT_KEYWORDS: &[&str] = &[
    "thin", "hairline", "extra-light", "ultra-light", "light", "normal", "regular", "book",
    "medium", "semi-bold", "demi-bold", "bold", "extra-bold", "ultra-bold", "black", "heavy",
    "extra-black", "ultra-black",
];

/// Knobs shared by every validator in a run
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Unit given to plain-number dimensions; plain numbers are rejected when unset
    pub implicit_dimension_unit: Option<String>,
    /// Unit given to plain-number durations; plain numbers are rejected when unset
    pub implicit_duration_unit: Option<String>,
    /// Reject out-of-range gradient stop positions instead of clamping them
    pub strict_gradients: bool,
}

/// The path being validated plus a place to leave non-fatal warnings
pub struct ValidationContext<'a> {
    path: &'a str,
    options: &'a ValidationOptions,
    warnings: Vec<Diagnostic>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(path: &'a str, options: &'a ValidationOptions) -> Self {
        Self {
            path,
            options,
            warnings: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        self.path
    }

    pub fn options(&self) -> &ValidationOptions {
        self.options
    }

    pub fn warn(&mut self, code: &str, message: impl Into<String>) {
        self.warnings.push(Diagnostic::warning(code, message));
    }

    pub fn into_warnings(self) -> Vec<Diagnostic> {
        self.warnings
    }
}

pub trait TokenValidator: Send + Sync {
    fn validate(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue>;
}

impl<F> TokenValidator for F
where
    F: Fn(&Value, &mut ValidationContext<'_>) -> Result<TokenValue> + Send + Sync,
{
    fn validate(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
        self(value, ctx)
    }
}

/// Mapping from token type to validator
#[derive(Clone)]
pub struct ValidatorRegistry {
    validators: HashMap<TokenType, Arc<dyn TokenValidator>>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.validators.keys().map(TokenType::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry").field("types", &names).finish()
    }
}

impl ValidatorRegistry {
    /// A registry with no validators at all
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// A registry with every built-in type registered
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(TokenType::Color, validate_color);
        registry.register(TokenType::Dimension, validate_dimension);
        registry.register(TokenType::Duration, validate_duration);
        registry.register(TokenType::Number, validate_number);
        registry.register(TokenType::String, validate_string);
        registry.register(TokenType::Boolean, validate_boolean);
        registry.register(TokenType::FontWeight, validate_font_weight);
        registry.register(TokenType::FontFamily, validate_font_family);
        registry.register(TokenType::CubicBezier, validate_cubic_bezier);
        registry.register(TokenType::Shadow, validate_shadow);
        registry.register(TokenType::Gradient, validate_gradient);
        registry.register(TokenType::StrokeStyle, validate_stroke_style);
        registry.register(TokenType::Typography, validate_typography);
        registry
    }

    /// Register (or replace) the validator for a type
    pub fn register(&mut self, token_type: TokenType, validator: impl TokenValidator + 'static) {
        self.validators.insert(token_type, Arc::new(validator));
    }

    pub fn is_registered(&self, token_type: &TokenType) -> bool {
        self.validators.contains_key(token_type)
    }

    pub fn validate(
        &self,
        token_type: &TokenType,
        value: &Value,
        ctx: &mut ValidationContext<'_>,
    ) -> Result<TokenValue> {
        let validator = self.validators.get(token_type).ok_or_else(|| TokenError::UnknownType {
            path: ctx.path().to_string(),
            type_name: token_type.to_string(),
        })?;
        validator.validate(value, ctx)
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn field_path(path: &str, field: &str) -> String {
    format!("{}.{}", path, field)
}

fn expect_object<'v>(value: &'v Value, path: &str, what: &str) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| TokenError::invalid_value(path, format!("{} must be an object", what)))
}

fn expect_number(value: &Value, path: &str) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| TokenError::invalid_value(path, format!("expected a number, found {}", value)))
}

fn required<'v>(object: &'v Map<String, Value>, key: &str, path: &str) -> Result<&'v Value> {
    object
        .get(key)
        .ok_or_else(|| TokenError::invalid_value(path, format!("missing required '{}'", key)))
}

pub fn decode_color(value: &Value, path: &str) -> Result<ColorValue> {
    match value {
        Value::String(text) => parse_css_color(text)
            .map(|_| ColorValue::Css(text.clone()))
            .map_err(|e| TokenError::invalid_value(path, e.to_string())),
        Value::Object(object) => {
            let space_name = required(object, "colorSpace", path)?
                .as_str()
                .ok_or_else(|| TokenError::invalid_value(path, "colorSpace must be a string"))?;
            let color_space = ColorSpace::from_name(space_name).ok_or_else(|| {
                let known: Vec<_> = ColorSpace::ALL.iter().map(ColorSpace::as_str).collect();
                TokenError::invalid_value(
                    path,
                    format!("unknown colorSpace '{}' (expected one of {})", space_name, known.join(", ")),
                )
            })?;

            let channels = color_space.channels();
            let components_path = field_path(path, "components");
            let mut components = [0.0; 3];
            match required(object, "components", path)? {
                Value::Array(items) => {
                    if items.len() != channels.len() {
                        return Err(TokenError::invalid_value(
                            &components_path,
                            format!("{} expects {} components, found {}", color_space, channels.len(), items.len()),
                        ));
                    }
                    for (i, item) in items.iter().enumerate() {
                        components[i] = expect_number(item, &components_path)?;
                    }
                }
                Value::Object(map) => {
                    let keys: HashSet<&str> = map.keys().map(String::as_str).collect();
                    let expected: HashSet<&str> = channels.iter().copied().collect();
                    if keys != expected {
                        return Err(TokenError::invalid_value(
                            &components_path,
                            format!("{} components must be exactly {}", color_space, channels.join(", ")),
                        ));
                    }
                    for (i, channel) in channels.iter().enumerate() {
                        components[i] = expect_number(&map[*channel], &field_path(&components_path, channel))?;
                    }
                }
                _ => {
                    return Err(TokenError::invalid_value(
                        &components_path,
                        "components must be an array or a channel map",
                    ))
                }
            }

            let alpha = match object.get("alpha") {
                Some(raw) => {
                    let alpha = expect_number(raw, &field_path(path, "alpha"))?;
                    if !(0.0..=1.0).contains(&alpha) {
                        return Err(TokenError::invalid_value(
                            field_path(path, "alpha"),
                            format!("alpha must be between 0 and 1, found {}", alpha),
                        ));
                    }
                    Some(alpha)
                }
                None => None,
            };

            let hex = match object.get("hex") {
                Some(Value::String(hex)) if HEX6.is_match(hex) => Some(hex.clone()),
                Some(other) => {
                    return Err(TokenError::invalid_value(
                        field_path(path, "hex"),
                        format!("hex fallback must be a 6-digit '#rrggbb' string, found {}", other),
                    ))
                }
                None => None,
            };

            Ok(ColorValue::Structured {
                color_space,
                components,
                alpha,
                hex,
            })
        }
        other => Err(TokenError::invalid_value(
            path,
            format!("color must be a string or a color-space object, found {}", other),
        )),
    }
}

fn decode_measure(value: &Value, path: &str, implicit_unit: Option<&str>, what: &str) -> Result<Dimension> {
    match value {
        Value::Number(n) => match implicit_unit {
            Some(unit) => Ok(Dimension {
                value: n.as_f64().unwrap_or_default(),
                unit: unit.to_string(),
            }),
            None => Err(TokenError::invalid_value(
                path,
                format!("plain number {} needs an explicit unit for a {}", n, what),
            )),
        },
        Value::Object(object) => {
            let value = expect_number(required(object, "value", path)?, &field_path(path, "value"))?;
            let unit = required(object, "unit", path)?
                .as_str()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| TokenError::invalid_value(field_path(path, "unit"), "unit must be a non-empty string"))?;
            Ok(Dimension {
                value,
                unit: unit.to_string(),
            })
        }
        other => Err(TokenError::invalid_value(
            path,
            format!("{} must be {{ value, unit }}, found {}", what, other),
        )),
    }
}

pub fn decode_dimension(value: &Value, path: &str, options: &ValidationOptions) -> Result<Dimension> {
    decode_measure(value, path, options.implicit_dimension_unit.as_deref(), "dimension")
}

pub fn validate_color(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    decode_color(value, ctx.path()).map(TokenValue::Color)
}

pub fn validate_dimension(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    decode_dimension(value, ctx.path(), ctx.options()).map(TokenValue::Dimension)
}

pub fn validate_duration(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    let unit = ctx.options().implicit_duration_unit.as_deref();
    let duration = decode_measure(value, ctx.path(), unit, "duration")?;
    if !DURATION_UNITS.contains(&duration.unit.as_str()) {
        return Err(TokenError::invalid_value(
            ctx.path(),
            format!("duration unit must be 'ms' or 's', found '{}'", duration.unit),
        ));
    }
    Ok(TokenValue::Duration(duration))
}

pub fn validate_number(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    expect_number(value, ctx.path()).map(TokenValue::Number)
}

pub fn validate_string(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    value
        .as_str()
        .map(|s| TokenValue::String(s.to_string()))
        .ok_or_else(|| TokenError::invalid_value(ctx.path(), format!("expected a string, found {}", value)))
}

pub fn validate_boolean(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    value
        .as_bool()
        .map(TokenValue::Boolean)
        .ok_or_else(|| TokenError::invalid_value(ctx.path(), format!("expected a boolean, found {}", value)))
}

fn decode_font_weight(value: &Value, path: &str) -> Result<FontWeight> {
    match value {
        Value::Number(n) => {
            let weight = n.as_f64().unwrap_or_default();
            if (1.0..=1000.0).contains(&weight) {
                Ok(FontWeight::Numeric(weight))
            } else {
                Err(TokenError::invalid_value(
                    path,
                    format!("font weight must be between 1 and 1000, found {}", weight),
                ))
            }
        }
        Value::String(keyword) if FONT_WEIGHT_KEYWORDS.contains(&keyword.as_str()) => {
            Ok(FontWeight::Keyword(keyword.clone()))
        }
        other => Err(TokenError::invalid_value(path, format!("invalid font weight {}", other))),
    }
}

pub fn validate_font_weight(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    decode_font_weight(value, ctx.path()).map(TokenValue::FontWeight)
}

fn decode_font_family(value: &Value, path: &str) -> Result<Vec<String>> {
    match value {
        Value::String(name) if !name.is_empty() => Ok(vec![name.clone()]),
        Value::Array(names) if !names.is_empty() => names
            .iter()
            .map(|name| {
                name.as_str()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| TokenError::invalid_value(path, format!("invalid font family name {}", name)))
            })
            .collect(),
        other => Err(TokenError::invalid_value(
            path,
            format!("font family must be a name or a non-empty list of names, found {}", other),
        )),
    }
}

pub fn validate_font_family(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    decode_font_family(value, ctx.path()).map(TokenValue::FontFamily)
}

pub fn validate_cubic_bezier(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    let path = ctx.path();
    let points = value
        .as_array()
        .filter(|p| p.len() == 4)
        .ok_or_else(|| TokenError::invalid_value(path, "cubic bezier must be an array of 4 numbers"))?;
    let mut bezier = [0.0; 4];
    for (i, point) in points.iter().enumerate() {
        bezier[i] = expect_number(point, path)?;
    }
    if !(0.0..=1.0).contains(&bezier[0]) || !(0.0..=1.0).contains(&bezier[2]) {
        return Err(TokenError::invalid_value(path, "cubic bezier x coordinates must be within [0, 1]"));
    }
    Ok(TokenValue::CubicBezier(bezier))
}

fn decode_shadow_layer(value: &Value, path: &str, options: &ValidationOptions) -> Result<ShadowLayer> {
    let object = expect_object(value, path, "shadow")?;
    let dimension = |key: &str| decode_dimension(required(object, key, path)?, &field_path(path, key), options);
    let spread = match object.get("spread") {
        Some(raw) => Some(decode_dimension(raw, &field_path(path, "spread"), options)?),
        None => None,
    };
    let inset = match object.get("inset") {
        Some(raw) => raw
            .as_bool()
            .ok_or_else(|| TokenError::invalid_value(field_path(path, "inset"), "inset must be a boolean"))?,
        None => false,
    };
    Ok(ShadowLayer {
        color: decode_color(required(object, "color", path)?, &field_path(path, "color"))?,
        offset_x: dimension("offsetX")?,
        offset_y: dimension("offsetY")?,
        blur: dimension("blur")?,
        spread,
        inset,
    })
}

pub fn validate_shadow(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    let path = ctx.path();
    let layers = match value {
        Value::Array(layers) if !layers.is_empty() => layers
            .iter()
            .enumerate()
            .map(|(i, layer)| decode_shadow_layer(layer, &format!("{}[{}]", path, i), ctx.options()))
            .collect::<Result<Vec<_>>>()?,
        Value::Array(_) => return Err(TokenError::invalid_value(path, "shadow list must not be empty")),
        other => vec![decode_shadow_layer(other, path, ctx.options())?],
    };
    Ok(TokenValue::Shadow(layers))
}

pub fn validate_gradient(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    let path = ctx.path().to_string();
    let (gradient_type, stops) = match value {
        Value::Array(stops) => (None, stops),
        Value::Object(object) => {
            let gradient_type = match object.get("gradientType") {
                Some(Value::String(kind)) if ["linear", "radial", "conic"].contains(&kind.as_str()) => {
                    Some(kind.clone())
                }
                Some(other) => {
                    return Err(TokenError::invalid_value(
                        field_path(&path, "gradientType"),
                        format!("unknown gradient type {}", other),
                    ))
                }
                None => None,
            };
            let stops = required(object, "stops", &path)?
                .as_array()
                .ok_or_else(|| TokenError::invalid_value(field_path(&path, "stops"), "stops must be an array"))?;
            (gradient_type, stops)
        }
        other => {
            return Err(TokenError::invalid_value(
                &path,
                format!("gradient must be an array of stops, found {}", other),
            ))
        }
    };

    if stops.len() < 2 {
        return Err(TokenError::invalid_value(
            &path,
            format!("gradient needs at least 2 stops, found {}", stops.len()),
        ));
    }

    let mut decoded = Vec::with_capacity(stops.len());
    for (i, stop) in stops.iter().enumerate() {
        let stop_path = format!("{}[{}]", path, i);
        let object = expect_object(stop, &stop_path, "gradient stop")?;
        let color = decode_color(required(object, "color", &stop_path)?, &field_path(&stop_path, "color"))?;
        let position = expect_number(required(object, "position", &stop_path)?, &field_path(&stop_path, "position"))?;
        let clamped = position.clamp(0.0, 1.0);
        if clamped != position {
            if ctx.options().strict_gradients {
                return Err(TokenError::invalid_value(
                    field_path(&stop_path, "position"),
                    format!("stop position {} is outside [0, 1]", position),
                ));
            }
            ctx.warn(
                codes::CLAMPED_GRADIENT_STOP,
                format!("{}: stop position {} clamped to {}", stop_path, position, clamped),
            );
        }
        decoded.push(GradientStop {
            color,
            position: clamped,
        });
    }

    Ok(TokenValue::Gradient(Gradient {
        gradient_type,
        stops: decoded,
    }))
}

pub fn validate_stroke_style(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    let path = ctx.path();
    match value {
        Value::String(keyword) if STROKE_KEYWORDS.contains(&keyword.as_str()) => {
            Ok(TokenValue::StrokeStyle(StrokeStyle::Keyword(keyword.clone())))
        }
        Value::String(keyword) => Err(TokenError::invalid_value(
            path,
            format!("unknown stroke style '{}' (expected one of {})", keyword, STROKE_KEYWORDS.join(", ")),
        )),
        Value::Object(object) => {
            let dash_path = field_path(path, "dashArray");
            let dashes = required(object, "dashArray", path)?
                .as_array()
                .filter(|d| !d.is_empty())
                .ok_or_else(|| TokenError::invalid_value(&dash_path, "dashArray must be a non-empty array"))?;
            let dash_array = dashes
                .iter()
                .enumerate()
                .map(|(i, dash)| decode_dimension(dash, &format!("{}[{}]", dash_path, i), ctx.options()))
                .collect::<Result<Vec<_>>>()?;
            let line_cap = required(object, "lineCap", path)?
                .as_str()
                .filter(|cap| LINE_CAPS.contains(cap))
                .ok_or_else(|| {
                    TokenError::invalid_value(field_path(path, "lineCap"), "lineCap must be one of round, butt, square")
                })?;
            Ok(TokenValue::StrokeStyle(StrokeStyle::Dashed {
                dash_array,
                line_cap: line_cap.to_string(),
            }))
        }
        other => Err(TokenError::invalid_value(
            path,
            format!("stroke style must be a keyword or {{ dashArray, lineCap }}, found {}", other),
        )),
    }
}

pub fn validate_typography(value: &Value, ctx: &mut ValidationContext<'_>) -> Result<TokenValue> {
    let path = ctx.path();
    let options = ctx.options();
    let object = expect_object(value, path, "typography")?;
    let font_family = decode_font_family(required(object, "fontFamily", path)?, &field_path(path, "fontFamily"))?;
    let font_size = decode_dimension(required(object, "fontSize", path)?, &field_path(path, "fontSize"), options)?;
    let font_weight = object
        .get("fontWeight")
        .map(|w| decode_font_weight(w, &field_path(path, "fontWeight")))
        .transpose()?;
    let line_height = match object.get("lineHeight") {
        Some(Value::Number(n)) => Some(Value::Number(n.clone())),
        Some(raw) => {
            decode_dimension(raw, &field_path(path, "lineHeight"), options)?;
            Some(raw.clone())
        }
        None => None,
    };
    let letter_spacing = object
        .get("letterSpacing")
        .map(|s| decode_dimension(s, &field_path(path, "letterSpacing"), options))
        .transpose()?;
    Ok(TokenValue::Typography(Typography {
        font_family,
        font_size,
        font_weight,
        line_height,
        letter_spacing,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(token_type: TokenType, value: Value) -> Result<TokenValue> {
        let options = ValidationOptions::default();
        let mut ctx = ValidationContext::new("test.token", &options);
        ValidatorRegistry::new().validate(&token_type, &value, &mut ctx)
    }

    #[test]
    fn test_color_strings_and_objects() {
        assert!(run(TokenType::Color, json!("#ff0000")).is_ok());
        assert!(run(TokenType::Color, json!("oklch(0.7 0.1 200)")).is_ok());
        assert!(run(TokenType::Color, json!("not a color")).is_err());

        let value = run(TokenType::Color, json!({"colorSpace": "srgb", "components": [1, 0, 0]})).unwrap();
        assert_eq!(
            value,
            TokenValue::Color(ColorValue::Structured {
                color_space: ColorSpace::Srgb,
                components: [1.0, 0.0, 0.0],
                alpha: None,
                hex: None,
            })
        );
    }

    #[test]
    fn test_color_component_map_must_match_channels() {
        let ok = json!({"colorSpace": "oklch", "components": {"l": 0.5, "c": 0.1, "h": 30}});
        assert!(run(TokenType::Color, ok).is_ok());

        let wrong_keys = json!({"colorSpace": "oklch", "components": {"r": 0.5, "g": 0.1, "b": 30}});
        assert!(run(TokenType::Color, wrong_keys).is_err());

        let non_numeric = json!({"colorSpace": "srgb", "components": {"r": "1", "g": 0, "b": 0}});
        assert!(run(TokenType::Color, non_numeric).is_err());
    }

    #[test]
    fn test_color_alpha_and_hex_fallback() {
        let ok = json!({"colorSpace": "display-p3", "components": [1, 0, 0], "alpha": 0.5, "hex": "#ff0000"});
        assert!(run(TokenType::Color, ok).is_ok());
        let bad_hex = json!({"colorSpace": "srgb", "components": [1, 0, 0], "hex": "#f00"});
        assert!(run(TokenType::Color, bad_hex).is_err());
        let bad_space = json!({"colorSpace": "cmyk", "components": [1, 0, 0]});
        assert!(run(TokenType::Color, bad_space).is_err());
    }

    #[test]
    fn test_dimension_requires_unit_unless_implicit() {
        assert!(run(TokenType::Dimension, json!({"value": 4, "unit": "px"})).is_ok());
        assert!(run(TokenType::Dimension, json!(4)).is_err());

        let options = ValidationOptions {
            implicit_dimension_unit: Some("px".to_string()),
            ..Default::default()
        };
        let mut ctx = ValidationContext::new("space.sm", &options);
        let value = validate_dimension(&json!(4), &mut ctx).unwrap();
        assert_eq!(value, TokenValue::Dimension(Dimension { value: 4.0, unit: "px".to_string() }));
    }

    #[test]
    fn test_duration_units() {
        assert!(run(TokenType::Duration, json!({"value": 200, "unit": "ms"})).is_ok());
        assert!(run(TokenType::Duration, json!({"value": 2, "unit": "min"})).is_err());
    }

    #[test]
    fn test_gradient_positions_are_clamped_with_warning() {
        let options = ValidationOptions::default();
        let mut ctx = ValidationContext::new("gradient.hero", &options);
        let value = json!([
            {"color": "#000", "position": -0.5},
            {"color": "#fff", "position": 1.2}
        ]);
        let decoded = validate_gradient(&value, &mut ctx).unwrap();
        let TokenValue::Gradient(gradient) = decoded else { panic!("expected a gradient") };
        let positions: Vec<f64> = gradient.stops.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0.0, 1.0]);
        assert_eq!(ctx.into_warnings().len(), 2);
    }

    #[test]
    fn test_gradient_strict_mode_rejects_out_of_range() {
        let options = ValidationOptions {
            strict_gradients: true,
            ..Default::default()
        };
        let mut ctx = ValidationContext::new("gradient.hero", &options);
        let value = json!([{"color": "#000", "position": -0.5}, {"color": "#fff", "position": 1}]);
        assert!(validate_gradient(&value, &mut ctx).is_err());
    }

    #[test]
    fn test_gradient_needs_two_stops() {
        assert!(run(TokenType::Gradient, json!([{"color": "#000", "position": 0}])).is_err());
        let object_form = json!({"gradientType": "radial", "stops": [
            {"color": "#000", "position": 0}, {"color": "#fff", "position": 1}
        ]});
        assert!(run(TokenType::Gradient, object_form).is_ok());
    }

    #[test]
    fn test_stroke_style() {
        assert!(run(TokenType::StrokeStyle, json!("dashed")).is_ok());
        assert!(run(TokenType::StrokeStyle, json!("wavy")).is_err());
        let dashed = json!({"dashArray": [{"value": 2, "unit": "px"}], "lineCap": "round"});
        assert!(run(TokenType::StrokeStyle, dashed).is_ok());
        let empty = json!({"dashArray": [], "lineCap": "round"});
        assert!(run(TokenType::StrokeStyle, empty).is_err());
        let bad_cap = json!({"dashArray": [{"value": 2, "unit": "px"}], "lineCap": "pointy"});
        assert!(run(TokenType::StrokeStyle, bad_cap).is_err());
    }

    #[test]
    fn test_shadow_and_typography() {
        let shadow = json!({
            "color": "#00000080",
            "offsetX": {"value": 0, "unit": "px"},
            "offsetY": {"value": 2, "unit": "px"},
            "blur": {"value": 4, "unit": "px"}
        });
        assert!(run(TokenType::Shadow, shadow.clone()).is_ok());
        assert!(run(TokenType::Shadow, json!([shadow])).is_ok());

        let typography = json!({
            "fontFamily": ["Inter", "sans-serif"],
            "fontSize": {"value": 16, "unit": "px"},
            "fontWeight": "bold",
            "lineHeight": 1.5
        });
        assert!(run(TokenType::Typography, typography).is_ok());
    }

    #[test]
    fn test_scalar_types() {
        assert!(run(TokenType::FontWeight, json!(450)).is_ok());
        assert!(run(TokenType::FontWeight, json!(1200)).is_err());
        assert!(run(TokenType::CubicBezier, json!([0.4, 0, 0.2, 1])).is_ok());
        assert!(run(TokenType::CubicBezier, json!([1.4, 0, 0.2, 1])).is_err());
        assert!(run(TokenType::Boolean, json!(true)).is_ok());
        assert!(run(TokenType::Number, json!("1")).is_err());
    }

    #[test]
    fn test_unknown_type_and_custom_registration() {
        let custom = TokenType::Custom("elevation".to_string());
        let err = run(custom.clone(), json!(2)).unwrap_err();
        assert_eq!(err.code(), "unknown-type");

        let mut registry = ValidatorRegistry::new();
        registry.register(custom.clone(), |value: &Value, ctx: &mut ValidationContext<'_>| {
            value
                .as_u64()
                .filter(|level| *level <= 5)
                .map(|_| TokenValue::Other(value.clone()))
                .ok_or_else(|| TokenError::invalid_value(ctx.path(), "elevation must be 0-5"))
        });
        let options = ValidationOptions::default();
        let mut ctx = ValidationContext::new("elevation.card", &options);
        assert!(registry.validate(&custom, &json!(2), &mut ctx).is_ok());
        assert!(registry.validate(&custom, &json!(9), &mut ctx).is_err());
    }
}
