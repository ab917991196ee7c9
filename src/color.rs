//! Color parsing, color-space conversion and CSS serialization
//!
//! Every color is parsed into a [`ParsedColor`] (space + three channels +
//! alpha). Structured token colors are first rendered into their CSS function
//! form and reparsed, so both representations go through one conversion path.
//! Conversions go through CIE XYZ (D65) using the CSS Color 4 matrices.

use crate::error::{Result, TokenError};
use crate::types::{ColorSpace, ColorValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z0-9-]+)\(\s*(.*?)\s*\)$").unwrap());

/// Output form for [`normalize_color`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    Rgb,
    Hsl,
    Hex,
}

/// A color decoded into a known space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedColor {
    pub space: ColorSpace,
    pub components: [f64; 3],
    pub alpha: f64,
}

/// Every string form of a color, for equivalence checks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorForms {
    /// The CSS string as written, for string colors
    pub literal: Option<String>,
    /// The declared `hex` fallback, for structured colors
    pub fallback_hex: Option<String>,
    /// Space-qualified function form
    pub function: String,
    pub hex: String,
    pub rgb: String,
    pub hsl: String,
}

const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("lime", "#00ff00"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("cyan", "#00ffff"),
    ("aqua", "#00ffff"),
    ("magenta", "#ff00ff"),
    ("fuchsia", "#ff00ff"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("silver", "#c0c0c0"),
    ("maroon", "#800000"),
    ("olive", "#808000"),
    ("teal", "#008080"),
    ("navy", "#000080"),
    ("purple", "#800080"),
    ("orange", "#ffa500"),
    ("rebeccapurple", "#663399"),
];

fn invalid(input: &str, message: impl Into<String>) -> TokenError {
    TokenError::InvalidFormat {
        message: format!("invalid color '{}': {}", input, message.into()),
    }
}

/// Parse a CSS color string (hex, named, rgb/hsl/hwb/lab/lch/oklab/oklch, color())
pub fn parse_css_color(input: &str) -> Result<ParsedColor> {
    let trimmed = input.trim().to_ascii_lowercase();

    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(input, hex);
    }

    if trimmed == "transparent" {
        return Ok(ParsedColor {
            space: ColorSpace::Srgb,
            components: [0.0, 0.0, 0.0],
            alpha: 0.0,
        });
    }

    if let Some((_, hex)) = NAMED_COLORS.iter().find(|(name, _)| *name == trimmed) {
        return parse_hex(input, &hex[1..]);
    }

    let captures = FUNCTION
        .captures(&trimmed)
        .ok_or_else(|| invalid(input, "unrecognized syntax"))?;
    let name = &captures[1];
    let (args, alpha) = split_arguments(input, &captures[2])?;

    let (space, args) = match name {
        "color" => {
            let (space_name, rest) = args
                .split_first()
                .ok_or_else(|| invalid(input, "color() requires a color space"))?;
            let space = ColorSpace::from_name(space_name)
                .filter(|s| s.is_predefined_rgb_or_xyz())
                .ok_or_else(|| invalid(input, format!("unsupported color space '{}'", space_name)))?;
            (space, rest.to_vec())
        }
        "rgb" | "rgba" => (ColorSpace::Srgb, args),
        "hsl" | "hsla" => (ColorSpace::Hsl, args),
        "hwb" => (ColorSpace::Hwb, args),
        "lab" => (ColorSpace::Lab, args),
        "lch" => (ColorSpace::Lch, args),
        "oklab" => (ColorSpace::Oklab, args),
        "oklch" => (ColorSpace::Oklch, args),
        other => return Err(invalid(input, format!("unknown color function '{}'", other))),
    };

    if args.len() != 3 {
        return Err(invalid(input, format!("expected 3 channels, found {}", args.len())));
    }

    let mut components = [0.0; 3];
    for (i, arg) in args.iter().enumerate() {
        components[i] = parse_channel(input, name, space, i, arg)?;
    }

    let alpha = match alpha {
        Some(raw) => parse_number_or_percent(input, &raw, 1.0)?.clamp(0.0, 1.0),
        None => 1.0,
    };

    Ok(ParsedColor {
        space,
        components,
        alpha,
    })
}

fn parse_hex(input: &str, hex: &str) -> Result<ParsedColor> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid(input, "non-hex digit"));
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        n => {
            return Err(invalid(
                input,
                format!("expected 3, 4, 6, or 8 hex digits, found {}", n),
            ))
        }
    };
    let byte = |i: usize| -> Result<f64> {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map(|b| b as f64 / 255.0)
            .map_err(|_| invalid(input, "non-hex digit"))
    };
    let alpha = if expanded.len() == 8 { byte(6)? } else { 1.0 };
    Ok(ParsedColor {
        space: ColorSpace::Srgb,
        components: [byte(0)?, byte(2)?, byte(4)?],
        alpha,
    })
}

/// Split function arguments into channels and an optional alpha, accepting both
/// the modern `a b c / alpha` and the legacy `a, b, c, alpha` syntax
fn split_arguments(input: &str, raw: &str) -> Result<(Vec<String>, Option<String>)> {
    let (main, alpha) = match raw.split_once('/') {
        Some((main, alpha)) => (main, Some(alpha.trim().to_string())),
        None => (raw, None),
    };
    let legacy = main.contains(',');
    let mut args: Vec<String> = main
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if legacy && alpha.is_none() && args.len() == 4 {
        let alpha = args.pop();
        return Ok((args, alpha));
    }
    if alpha.as_deref() == Some("") {
        return Err(invalid(input, "empty alpha"));
    }
    Ok((args, alpha))
}

fn parse_channel(input: &str, function: &str, space: ColorSpace, index: usize, raw: &str) -> Result<f64> {
    if raw == "none" {
        return Ok(0.0);
    }
    match (space, index) {
        (ColorSpace::Hsl | ColorSpace::Hwb, 0) | (ColorSpace::Lch | ColorSpace::Oklch, 2) => {
            parse_angle(input, raw)
        }
        (ColorSpace::Hsl | ColorSpace::Hwb, _) => parse_number_or_percent(input, raw, 100.0),
        (ColorSpace::Srgb, _) if function != "color" => {
            if raw.ends_with('%') {
                parse_number_or_percent(input, raw, 1.0)
            } else {
                parse_number(input, raw).map(|v| v / 255.0)
            }
        }
        (ColorSpace::Lab, 0) | (ColorSpace::Lch, 0) => parse_number_or_percent(input, raw, 100.0),
        (ColorSpace::Lab, _) => parse_number_or_percent(input, raw, 125.0),
        (ColorSpace::Lch, 1) => parse_number_or_percent(input, raw, 150.0),
        (ColorSpace::Oklab, 0) | (ColorSpace::Oklch, 0) => parse_number_or_percent(input, raw, 1.0),
        (ColorSpace::Oklab, _) | (ColorSpace::Oklch, 1) => parse_number_or_percent(input, raw, 0.4),
        _ => parse_number_or_percent(input, raw, 1.0),
    }
}

fn parse_number(input: &str, raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(input, format!("'{}' is not a number", raw)))
}

/// Parse a number, or a percentage where 100% maps to `full`
fn parse_number_or_percent(input: &str, raw: &str, full: f64) -> Result<f64> {
    match raw.strip_suffix('%') {
        Some(percent) => parse_number(input, percent).map(|v| v / 100.0 * full),
        None => parse_number(input, raw),
    }
}

fn parse_angle(input: &str, raw: &str) -> Result<f64> {
    let units: [(&str, f64); 4] = [
        ("deg", 1.0),
        ("grad", 0.9),
        ("rad", 180.0 / std::f64::consts::PI),
        ("turn", 360.0),
    ];
    for (suffix, scale) in units {
        if let Some(number) = raw.strip_suffix(suffix) {
            return parse_number(input, number).map(|v| v * scale);
        }
    }
    parse_number(input, raw)
}

type Matrix = [[f64; 3]; 3];

const LIN_SRGB_TO_XYZ: Matrix = [
    [0.41239079926595934, 0.357584339383878, 0.1804807884018343],
    [0.21263900587151027, 0.715168678767756, 0.07219231536073371],
    [0.01933081871559182, 0.11919477979462598, 0.9505321522496607],
];

const XYZ_TO_LIN_SRGB: Matrix = [
    [3.2409699419045226, -1.537383177570094, -0.4986107602930034],
    [-0.9692436362808796, 1.8759675015077202, 0.04155505740717559],
    [0.05563007969699366, -0.20397695888897652, 1.0569715142428786],
];

const LIN_P3_TO_XYZ: Matrix = [
    [0.4865709486482162, 0.26566769316909306, 0.1982172852343625],
    [0.2289745640697488, 0.6917385218365064, 0.079286914093745],
    [0.0, 0.04511338185890264, 1.043944368900976],
];

const LIN_A98_TO_XYZ: Matrix = [
    [0.5766690429101305, 0.1855582379065463, 0.1882286462349947],
    [0.29734497525053605, 0.6273635662554661, 0.07529145849399788],
    [0.02703136138641234, 0.07068885253582723, 0.9913375368376388],
];

const LIN_PROPHOTO_TO_XYZ_D50: Matrix = [
    [0.7977604896723027, 0.13518583717574031, 0.0313493495815248],
    [0.2880711282292934, 0.7118432178101014, 0.00008565396060525902],
    [0.0, 0.0, 0.8251046025104601],
];

const LIN_REC2020_TO_XYZ: Matrix = [
    [0.6369580483012914, 0.14461690358620832, 0.1688809751641721],
    [0.2627002120112671, 0.6779980715188708, 0.05930171646986196],
    [0.0, 0.028072693049087428, 1.060985057710791],
];

// Bradford chromatic adaptation
const D50_TO_D65: Matrix = [
    [0.9554734527042182, -0.023098536874261423, 0.0632593086610217],
    [-0.028369706963208136, 1.0099954580058226, 0.021041398966943008],
    [0.012314001688319899, -0.020507696433477912, 1.3303659366080753],
];

const D50_WHITE: [f64; 3] = [0.3457 / 0.3585, 1.0, (1.0 - 0.3457 - 0.3585) / 0.3585];

fn multiply(m: &Matrix, v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn map3(v: [f64; 3], f: impl Fn(f64) -> f64) -> [f64; 3] {
    [f(v[0]), f(v[1]), f(v[2])]
}

fn srgb_decode(c: f64) -> f64 {
    let abs = c.abs();
    if abs <= 0.04045 {
        c / 12.92
    } else {
        c.signum() * ((abs + 0.055) / 1.055).powf(2.4)
    }
}

fn srgb_encode(c: f64) -> f64 {
    let abs = c.abs();
    if abs > 0.0031308 {
        c.signum() * (1.055 * abs.powf(1.0 / 2.4) - 0.055)
    } else {
        12.92 * c
    }
}

fn a98_decode(c: f64) -> f64 {
    c.signum() * c.abs().powf(563.0 / 256.0)
}

fn prophoto_decode(c: f64) -> f64 {
    let abs = c.abs();
    if abs <= 16.0 / 512.0 {
        c / 16.0
    } else {
        c.signum() * abs.powf(1.8)
    }
}

fn rec2020_decode(c: f64) -> f64 {
    const ALPHA: f64 = 1.09929682680944;
    const BETA: f64 = 0.018053968510807;
    let abs = c.abs();
    if abs < BETA * 4.5 {
        c / 4.5
    } else {
        c.signum() * ((abs + ALPHA - 1.0) / ALPHA).powf(1.0 / 0.45)
    }
}

fn polar_to_lab([l, c, h]: [f64; 3]) -> [f64; 3] {
    let radians = h.to_radians();
    [l, c * radians.cos(), c * radians.sin()]
}

fn lab_to_xyz_d50([l, a, b]: [f64; 3]) -> [f64; 3] {
    const KAPPA: f64 = 24389.0 / 27.0;
    const EPSILON: f64 = 216.0 / 24389.0;
    let f1 = (l + 16.0) / 116.0;
    let f0 = a / 500.0 + f1;
    let f2 = f1 - b / 200.0;
    let x = if f0.powi(3) > EPSILON { f0.powi(3) } else { (116.0 * f0 - 16.0) / KAPPA };
    let y = if l > KAPPA * EPSILON { f1.powi(3) } else { l / KAPPA };
    let z = if f2.powi(3) > EPSILON { f2.powi(3) } else { (116.0 * f2 - 16.0) / KAPPA };
    [x * D50_WHITE[0], y * D50_WHITE[1], z * D50_WHITE[2]]
}

fn oklab_to_lin_srgb([l, a, b]: [f64; 3]) -> [f64; 3] {
    let l_ = (l + 0.3963377774 * a + 0.2158037573 * b).powi(3);
    let m_ = (l - 0.1055613458 * a - 0.0638541728 * b).powi(3);
    let s_ = (l - 0.0894841775 * a - 1.2914855480 * b).powi(3);
    [
        4.0767416621 * l_ - 3.3077115913 * m_ + 0.2309699292 * s_,
        -1.2684380046 * l_ + 2.6097574011 * m_ - 0.3413193965 * s_,
        -0.0041960863 * l_ - 0.7034186147 * m_ + 1.7076147010 * s_,
    ]
}

fn hsl_to_srgb([h, s, l]: [f64; 3]) -> [f64; 3] {
    let s = s / 100.0;
    let l = l / 100.0;
    let h = h.rem_euclid(360.0);
    let f = |n: f64| {
        let k = (n + h / 30.0).rem_euclid(12.0);
        let a = s * l.min(1.0 - l);
        l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0)
    };
    [f(0.0), f(8.0), f(4.0)]
}

fn hwb_to_srgb([h, w, b]: [f64; 3]) -> [f64; 3] {
    let w = w / 100.0;
    let b = b / 100.0;
    if w + b >= 1.0 {
        let gray = w / (w + b);
        return [gray; 3];
    }
    map3(hsl_to_srgb([h, 100.0, 50.0]), |c| c * (1.0 - w - b) + w)
}

fn srgb_to_hsl([r, g, b]: [f64; 3]) -> [f64; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d == 0.0 {
        return [0.0, 0.0, l * 100.0];
    }
    let s = if l == 0.0 || l == 1.0 {
        0.0
    } else {
        (max - l) / l.min(1.0 - l)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    [h * 60.0, s * 100.0, l * 100.0]
}

impl ParsedColor {
    /// CIE XYZ relative to D65
    pub fn to_xyz_d65(&self) -> [f64; 3] {
        let c = self.components;
        match self.space {
            ColorSpace::Srgb => multiply(&LIN_SRGB_TO_XYZ, map3(c, srgb_decode)),
            ColorSpace::SrgbLinear => multiply(&LIN_SRGB_TO_XYZ, c),
            ColorSpace::DisplayP3 => multiply(&LIN_P3_TO_XYZ, map3(c, srgb_decode)),
            ColorSpace::A98Rgb => multiply(&LIN_A98_TO_XYZ, map3(c, a98_decode)),
            ColorSpace::ProphotoRgb => multiply(
                &D50_TO_D65,
                multiply(&LIN_PROPHOTO_TO_XYZ_D50, map3(c, prophoto_decode)),
            ),
            ColorSpace::Rec2020 => multiply(&LIN_REC2020_TO_XYZ, map3(c, rec2020_decode)),
            ColorSpace::Lab => multiply(&D50_TO_D65, lab_to_xyz_d50(c)),
            ColorSpace::Lch => multiply(&D50_TO_D65, lab_to_xyz_d50(polar_to_lab(c))),
            ColorSpace::Oklab => multiply(&LIN_SRGB_TO_XYZ, oklab_to_lin_srgb(c)),
            ColorSpace::Oklch => multiply(&LIN_SRGB_TO_XYZ, oklab_to_lin_srgb(polar_to_lab(c))),
            ColorSpace::XyzD50 => multiply(&D50_TO_D65, c),
            ColorSpace::XyzD65 => c,
            ColorSpace::Hsl => multiply(&LIN_SRGB_TO_XYZ, map3(hsl_to_srgb(c), srgb_decode)),
            ColorSpace::Hwb => multiply(&LIN_SRGB_TO_XYZ, map3(hwb_to_srgb(c), srgb_decode)),
        }
    }

    /// Gamma-encoded sRGB channels in `[0, 1]`, clipped to gamut
    pub fn to_srgb(&self) -> [f64; 3] {
        let srgb = match self.space {
            ColorSpace::Srgb => self.components,
            ColorSpace::Hsl => hsl_to_srgb(self.components),
            ColorSpace::Hwb => hwb_to_srgb(self.components),
            _ => map3(multiply(&XYZ_TO_LIN_SRGB, self.to_xyz_d65()), srgb_encode),
        };
        map3(srgb, |c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = map3(self.to_srgb(), |c| (c * 255.0).round());
        let mut hex = format!("#{:02x}{:02x}{:02x}", r as u8, g as u8, b as u8);
        if self.alpha < 1.0 {
            hex.push_str(&format!("{:02x}", (self.alpha * 255.0).round() as u8));
        }
        hex
    }

    pub fn to_rgb_string(&self) -> String {
        let [r, g, b] = map3(self.to_srgb(), |c| (c * 255.0).round());
        if self.alpha < 1.0 {
            format!("rgba({}, {}, {}, {})", r, g, b, format_number(self.alpha, 3))
        } else {
            format!("rgb({}, {}, {})", r, g, b)
        }
    }

    pub fn to_hsl_string(&self) -> String {
        let [h, s, l] = srgb_to_hsl(self.to_srgb());
        let (h, s, l) = (format_number(h, 2), format_number(s, 2), format_number(l, 2));
        if self.alpha < 1.0 {
            format!("hsla({}, {}%, {}%, {})", h, s, l, format_number(self.alpha, 3))
        } else {
            format!("hsl({}, {}%, {}%)", h, s, l)
        }
    }

    pub fn format(&self, format: ColorFormat) -> String {
        match format {
            ColorFormat::Hex => self.to_hex(),
            ColorFormat::Rgb => self.to_rgb_string(),
            ColorFormat::Hsl => self.to_hsl_string(),
        }
    }
}

/// Format a number with at most `decimals` fraction digits, trailing zeros removed
pub fn format_number(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

/// Render a color value as a CSS function string.
///
/// String colors are returned as written. Structured colors use the
/// space-specific functions for hsl/hwb/lab/lch/oklab/oklch and `color()` for
/// the rest.
pub fn render_function(color: &ColorValue) -> String {
    let (space, c, alpha) = match color {
        ColorValue::Css(text) => return text.clone(),
        ColorValue::Structured {
            color_space,
            components,
            alpha,
            ..
        } => (*color_space, components, alpha),
    };
    let n = |v: f64| format_number(v, 6);
    let body = match space {
        ColorSpace::Hsl => format!("hsl({} {}% {}%", n(c[0]), n(c[1]), n(c[2])),
        ColorSpace::Hwb => format!("hwb({} {}% {}%", n(c[0]), n(c[1]), n(c[2])),
        ColorSpace::Lab => format!("lab({}% {} {}", n(c[0]), n(c[1]), n(c[2])),
        ColorSpace::Lch => format!("lch({}% {} {}", n(c[0]), n(c[1]), n(c[2])),
        ColorSpace::Oklab => format!("oklab({}% {} {}", n(c[0] * 100.0), n(c[1]), n(c[2])),
        ColorSpace::Oklch => format!("oklch({}% {} {}", n(c[0] * 100.0), n(c[1]), n(c[2])),
        other => format!("color({} {} {} {}", other, n(c[0]), n(c[1]), n(c[2])),
    };
    match alpha {
        Some(a) => format!("{} / {})", body, n(*a)),
        None => format!("{})", body),
    }
}

/// Parse any validated color value
pub fn parse_color_value(color: &ColorValue) -> Result<ParsedColor> {
    parse_css_color(&render_function(color))
}

/// Serialize a color in the requested CSS form
pub fn normalize_color(color: &ColorValue, format: ColorFormat) -> Result<String> {
    parse_color_value(color).map(|parsed| parsed.format(format))
}

pub fn color_forms(color: &ColorValue) -> Result<ColorForms> {
    let function = render_function(color);
    let parsed = parse_css_color(&function)?;
    let (literal, fallback_hex) = match color {
        ColorValue::Css(text) => (Some(text.clone()), None),
        ColorValue::Structured { hex, .. } => (None, hex.clone()),
    };
    Ok(ColorForms {
        literal,
        fallback_hex,
        function,
        hex: parsed.to_hex(),
        rgb: parsed.to_rgb_string(),
        hsl: parsed.to_hsl_string(),
    })
}

/// True when both colors serialize to the same hex form
pub fn colors_equivalent(a: &ColorValue, b: &ColorValue) -> bool {
    match (normalize_color(a, ColorFormat::Hex), normalize_color(b, ColorFormat::Hex)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured(space: ColorSpace, components: [f64; 3], alpha: Option<f64>) -> ColorValue {
        ColorValue::Structured {
            color_space: space,
            components,
            alpha,
            hex: None,
        }
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_css_color("#FF0000").unwrap().to_hex(), "#ff0000");
        assert_eq!(parse_css_color("#f00").unwrap().to_hex(), "#ff0000");
        assert_eq!(parse_css_color("#ff000080").unwrap().to_hex(), "#ff000080");
        assert!(parse_css_color("#ff00").is_ok());
        assert!(parse_css_color("#ff00000").is_err());
        assert!(parse_css_color("#gg0000").is_err());
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(parse_css_color("rgb(255, 0, 0)").unwrap().to_hex(), "#ff0000");
        assert_eq!(parse_css_color("rgb(100% 0% 0% / 50%)").unwrap().to_hex(), "#ff000080");
        assert_eq!(parse_css_color("rgba(0, 0, 255, 0.5)").unwrap().alpha, 0.5);
        assert_eq!(parse_css_color("hsl(120deg 100% 50%)").unwrap().to_hex(), "#00ff00");
        assert_eq!(parse_css_color("hwb(0 0% 0%)").unwrap().to_hex(), "#ff0000");
        assert_eq!(parse_css_color("white").unwrap().to_hex(), "#ffffff");
        assert_eq!(parse_css_color("transparent").unwrap().alpha, 0.0);
        assert!(parse_css_color("notacolor").is_err());
        assert!(parse_css_color("rgb(1, 2)").is_err());
        assert!(parse_css_color("color(cmyk 0 0 0)").is_err());
    }

    #[test]
    fn test_wide_gamut_white_and_black() {
        for text in [
            "lab(100% 0 0)",
            "lch(100% 0 0)",
            "oklab(100% 0 0)",
            "oklch(1 0 0)",
            "color(display-p3 1 1 1)",
            "color(a98-rgb 1 1 1)",
            "color(rec2020 1 1 1)",
            "color(prophoto-rgb 1 1 1)",
            "color(srgb-linear 1 1 1)",
        ] {
            assert_eq!(parse_css_color(text).unwrap().to_hex(), "#ffffff", "{}", text);
        }
        assert_eq!(parse_css_color("oklch(0% 0 0)").unwrap().to_hex(), "#000000");
        assert_eq!(parse_css_color("lab(0 0 0)").unwrap().to_hex(), "#000000");
    }

    #[test]
    fn test_structured_srgb_to_hex() {
        let red = structured(ColorSpace::Srgb, [1.0, 0.0, 0.0], None);
        assert_eq!(render_function(&red), "color(srgb 1 0 0)");
        assert!(normalize_color(&red, ColorFormat::Hex).unwrap().eq_ignore_ascii_case("#FF0000"));
        assert_eq!(normalize_color(&red, ColorFormat::Rgb).unwrap(), "rgb(255, 0, 0)");
        assert_eq!(normalize_color(&red, ColorFormat::Hsl).unwrap(), "hsl(0, 100%, 50%)");
    }

    #[test]
    fn test_space_specific_rendering() {
        let hsl = structured(ColorSpace::Hsl, [240.0, 100.0, 50.0], Some(0.5));
        assert_eq!(render_function(&hsl), "hsl(240 100% 50% / 0.5)");
        assert_eq!(normalize_color(&hsl, ColorFormat::Hex).unwrap(), "#0000ff80");

        let oklch = structured(ColorSpace::Oklch, [0.5, 0.1, 200.0], None);
        assert_eq!(render_function(&oklch), "oklch(50% 0.1 200)");

        let lab = structured(ColorSpace::Lab, [50.0, 20.0, -30.0], None);
        assert_eq!(render_function(&lab), "lab(50% 20 -30)");
    }

    #[test]
    fn test_color_forms_and_equivalence() {
        let literal = ColorValue::Css("#FF0000".to_string());
        let forms = color_forms(&literal).unwrap();
        assert_eq!(forms.literal.as_deref(), Some("#FF0000"));
        assert_eq!(forms.hex, "#ff0000");
        assert_eq!(forms.rgb, "rgb(255, 0, 0)");

        let red = structured(ColorSpace::Srgb, [1.0, 0.0, 0.0], None);
        assert!(colors_equivalent(&literal, &red));
        assert!(!colors_equivalent(&literal, &ColorValue::Css("blue".to_string())));
    }

    #[test]
    fn test_format_number_trims() {
        assert_eq!(format_number(1.0, 3), "1");
        assert_eq!(format_number(0.12345, 3), "0.123");
        assert_eq!(format_number(-0.0000001, 3), "0");
    }
}
