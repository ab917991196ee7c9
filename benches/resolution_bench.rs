//! Resolution performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Map, Value};
use tokenc::*;

/// `count` color tokens where every token aliases the next one, so the
/// first token in document order walks the whole chain
fn alias_chain(count: usize) -> Value {
    let mut chain = Map::new();
    for i in 0..count - 1 {
        chain.insert(format!("t{}", i), json!({"$ref": format!("#/chain/t{}", i + 1)}));
    }
    chain.insert(format!("t{}", count - 1), json!({"$type": "color", "$value": "#3366ff"}));
    json!({ "chain": chain })
}

/// A wide document of literal tokens across several types
fn wide_palette(groups: usize) -> Value {
    let mut root = Map::new();
    for g in 0..groups {
        root.insert(
            format!("group{}", g),
            json!({
                "fg": {"$type": "color", "$value": {"colorSpace": "oklch", "components": [0.7, 0.1, g as f64]}},
                "bg": {"$type": "color", "$value": "#ffffff"},
                "space": {"$type": "dimension", "$value": {"value": g, "unit": "px"}},
                "fade": {"$type": "duration", "$value": {"value": 200, "unit": "ms"}},
                "card": {"$type": "shadow", "$value": {
                    "color": {"$ref": format!("#/group{}/fg", g)},
                    "offsetX": {"value": 0, "unit": "px"},
                    "offsetY": {"value": 2, "unit": "px"},
                    "blur": {"$ref": format!("#/group{}/space", g)}
                }}
            }),
        );
    }
    Value::Object(root)
}

fn bench_alias_chain(c: &mut Criterion) {
    let engine = TokenEngine::new(ResolverOptions::default());
    let document = TokenDocument::new("chain.tokens.json", alias_chain(500));

    c.bench_function("alias_chain_500", |b| b.iter(|| engine.resolve(black_box(&document))));
}

fn bench_wide_palette(c: &mut Criterion) {
    let engine = TokenEngine::new(ResolverOptions::default());
    let document = TokenDocument::new("palette.tokens.json", wide_palette(200));

    c.bench_function("wide_palette_200", |b| b.iter(|| engine.resolve(black_box(&document))));
}

fn bench_themes(c: &mut Criterion) {
    let engine = TokenEngine::new(ResolverOptions::default());
    let themes: Vec<(String, TokenDocument)> = ["default", "dark", "contrast", "print"]
        .iter()
        .map(|name| (name.to_string(), TokenDocument::new(format!("{}.tokens.json", name), wide_palette(100))))
        .collect();

    c.bench_function("four_themes", |b| {
        b.iter(|| engine.resolve_themes(black_box(themes.clone())))
    });
}

fn bench_color_normalization(c: &mut Criterion) {
    let color = ColorValue::Structured {
        color_space: ColorSpace::Oklch,
        components: [0.7, 0.15, 250.0],
        alpha: Some(0.8),
        hex: None,
    };

    c.bench_function("normalize_oklch_to_hex", |b| {
        b.iter(|| normalize_color(black_box(&color), ColorFormat::Hex).unwrap())
    });
}

criterion_group!(
    benches,
    bench_alias_chain,
    bench_wide_palette,
    bench_themes,
    bench_color_normalization
);
criterion_main!(benches);
