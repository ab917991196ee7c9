//! Core types for resolved design tokens

use crate::error::SourceLocation;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Token type tag.
///
/// The built-in types each have a validator; `Custom` carries any other name
/// a caller registers a validator for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenType {
    Color,
    Dimension,
    Duration,
    Number,
    String,
    Boolean,
    FontWeight,
    FontFamily,
    CubicBezier,
    Shadow,
    Gradient,
    StrokeStyle,
    Typography,
    Custom(String),
}

impl TokenType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "color" => Self::Color,
            "dimension" => Self::Dimension,
            "duration" => Self::Duration,
            "number" => Self::Number,
            "string" => Self::String,
            "boolean" => Self::Boolean,
            "fontWeight" => Self::FontWeight,
            "fontFamily" => Self::FontFamily,
            "cubicBezier" => Self::CubicBezier,
            "shadow" => Self::Shadow,
            "gradient" => Self::Gradient,
            "strokeStyle" => Self::StrokeStyle,
            "typography" => Self::Typography,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Color => "color",
            Self::Dimension => "dimension",
            Self::Duration => "duration",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::FontWeight => "fontWeight",
            Self::FontFamily => "fontFamily",
            Self::CubicBezier => "cubicBezier",
            Self::Shadow => "shadow",
            Self::Gradient => "gradient",
            Self::StrokeStyle => "strokeStyle",
            Self::Typography => "typography",
            Self::Custom(name) => name,
        }
    }

    /// Types whose value is naturally a JSON array. For every other type an
    /// array `$value` is a list of fallback candidates.
    pub fn is_array_shaped(&self) -> bool {
        matches!(
            self,
            Self::FontFamily | Self::CubicBezier | Self::Shadow | Self::Gradient | Self::Custom(_)
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Supported color spaces for structured color values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Srgb,
    SrgbLinear,
    DisplayP3,
    A98Rgb,
    ProphotoRgb,
    Rec2020,
    Lab,
    Lch,
    Oklab,
    Oklch,
    XyzD50,
    XyzD65,
    Hsl,
    Hwb,
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 14] = [
        Self::Srgb,
        Self::SrgbLinear,
        Self::DisplayP3,
        Self::A98Rgb,
        Self::ProphotoRgb,
        Self::Rec2020,
        Self::Lab,
        Self::Lch,
        Self::Oklab,
        Self::Oklch,
        Self::XyzD50,
        Self::XyzD65,
        Self::Hsl,
        Self::Hwb,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "srgb" => Some(Self::Srgb),
            "srgb-linear" => Some(Self::SrgbLinear),
            "display-p3" => Some(Self::DisplayP3),
            "a98-rgb" => Some(Self::A98Rgb),
            "prophoto-rgb" => Some(Self::ProphotoRgb),
            "rec2020" => Some(Self::Rec2020),
            "lab" => Some(Self::Lab),
            "lch" => Some(Self::Lch),
            "oklab" => Some(Self::Oklab),
            "oklch" => Some(Self::Oklch),
            "xyz-d50" => Some(Self::XyzD50),
            "xyz-d65" | "xyz" => Some(Self::XyzD65),
            "hsl" => Some(Self::Hsl),
            "hwb" => Some(Self::Hwb),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Srgb => "srgb",
            Self::SrgbLinear => "srgb-linear",
            Self::DisplayP3 => "display-p3",
            Self::A98Rgb => "a98-rgb",
            Self::ProphotoRgb => "prophoto-rgb",
            Self::Rec2020 => "rec2020",
            Self::Lab => "lab",
            Self::Lch => "lch",
            Self::Oklab => "oklab",
            Self::Oklch => "oklch",
            Self::XyzD50 => "xyz-d50",
            Self::XyzD65 => "xyz-d65",
            Self::Hsl => "hsl",
            Self::Hwb => "hwb",
        }
    }

    /// Spaces addressable through the CSS `color()` function
    pub fn is_predefined_rgb_or_xyz(&self) -> bool {
        !matches!(
            self,
            Self::Hsl | Self::Hwb | Self::Lab | Self::Lch | Self::Oklab | Self::Oklch
        )
    }

    /// Channel names, in component order
    pub fn channels(&self) -> [&'static str; 3] {
        match self {
            Self::Srgb
            | Self::SrgbLinear
            | Self::DisplayP3
            | Self::A98Rgb
            | Self::ProphotoRgb
            | Self::Rec2020 => ["r", "g", "b"],
            Self::Lab | Self::Oklab => ["l", "a", "b"],
            Self::Lch | Self::Oklch => ["l", "c", "h"],
            Self::XyzD50 | Self::XyzD65 => ["x", "y", "z"],
            Self::Hsl => ["h", "s", "l"],
            Self::Hwb => ["h", "w", "b"],
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColorSpace {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A validated color value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// A CSS color string, kept as written
    Css(String),
    #[serde(rename_all = "camelCase")]
    Structured {
        color_space: ColorSpace,
        components: [f64; 3],
        #[serde(skip_serializing_if = "Option::is_none")]
        alpha: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        hex: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FontWeight {
    Numeric(f64),
    Keyword(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowLayer {
    pub color: ColorValue,
    pub offset_x: Dimension,
    pub offset_y: Dimension,
    pub blur: Dimension,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<Dimension>,
    pub inset: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub color: ColorValue,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_type: Option<String>,
    pub stops: Vec<GradientStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StrokeStyle {
    Keyword(String),
    #[serde(rename_all = "camelCase")]
    Dashed {
        dash_array: Vec<Dimension>,
        line_cap: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: Vec<String>,
    pub font_size: Dimension,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<Dimension>,
}

/// A decoded token value, one variant per validated type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    Color(ColorValue),
    Dimension(Dimension),
    Duration(Dimension),
    Number(f64),
    String(String),
    Boolean(bool),
    FontWeight(FontWeight),
    FontFamily(Vec<String>),
    CubicBezier([f64; 4]),
    Shadow(Vec<ShadowLayer>),
    Gradient(Gradient),
    StrokeStyle(StrokeStyle),
    Typography(Typography),
    /// Values of caller-registered types, kept as decoded JSON
    Other(Value),
}

impl TokenValue {
    pub fn as_color(&self) -> Option<&ColorValue> {
        match self {
            Self::Color(color) => Some(color),
            _ => None,
        }
    }
}

/// Deprecation info attached to a token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Deprecation {
    Flag,
    Reason(String),
    Replacement {
        pointer: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// Where a candidate value was proposed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CandidateSource {
    /// An entry of an array `$value`
    Inline,
    /// Proposed by an override rule. `fallback_depth` is 0 for the rule's own
    /// `$ref`/`$value` and grows with each nested `$fallback`.
    #[serde(rename_all = "camelCase")]
    Override {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        when: Option<Map<String, Value>>,
        fallback_depth: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub value: TokenValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    pub source: CandidateSource,
}

/// A resolved, path-addressable token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenedToken {
    pub path: String,
    pub pointer: String,
    /// Normalized lookup name (transform applied to every path word)
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<TokenValue>,
    pub aliases: Vec<String>,
    pub candidates: Vec<Candidate>,
    pub metadata: TokenMetadata,
}

impl FlattenedToken {
    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_alias(&self) -> bool {
        !self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_type_names_round_trip() {
        for name in ["color", "dimension", "fontWeight", "strokeStyle", "typography"] {
            assert_eq!(TokenType::from_name(name).as_str(), name);
        }
        assert_eq!(TokenType::from_name("elevation"), TokenType::Custom("elevation".to_string()));
    }

    #[test]
    fn test_color_space_channels() {
        assert_eq!(ColorSpace::from_name("oklch").unwrap().channels(), ["l", "c", "h"]);
        assert_eq!(ColorSpace::from_name("xyz").unwrap(), ColorSpace::XyzD65);
        assert!(ColorSpace::from_name("cmyk").is_none());
    }

    #[test]
    fn test_value_serialization_is_natural() {
        let value = TokenValue::Dimension(Dimension { value: 4.0, unit: "px".to_string() });
        assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::json!({"value": 4.0, "unit": "px"}));

        let color = TokenValue::Color(ColorValue::Css("#fff".to_string()));
        assert_eq!(serde_json::to_value(&color).unwrap(), serde_json::json!("#fff"));
    }
}
