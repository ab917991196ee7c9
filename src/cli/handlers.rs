// FILE: src/cli/handlers.rs
use crate::{
    cli::{parse_theme_arg, OutputFormat, TokenCli},
    ResolverOptions, Result, SharedRegistry, TokenDocument, TokenEngine, TokenError, TokenRegistry,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use walkdir::WalkDir;

const TOKEN_FILE_SUFFIX: &str = ".tokens.json";

/// A token file and the theme it provides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeInput {
    pub name: String,
    pub path: PathBuf,
}

/// Theme name of a token file: its file name up to the first `.`
pub fn theme_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| path.display().to_string())
}

/// Expand files and directories into theme inputs. Directories are walked
/// for `*.tokens.json`, sorted by path.
pub fn discover_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<ThemeInput>> {
    let mut found = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            let mut files = Vec::new();
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.map_err(|e| TokenError::Io(format!("Directory traversal error: {}", e)))?;
                let is_token_file = entry
                    .file_name()
                    .to_str()
                    .map_or(false, |name| name.ends_with(TOKEN_FILE_SUFFIX));
                if entry.file_type().is_file() && is_token_file {
                    files.push(entry.into_path());
                }
            }
            log::debug!("Found {} token files under {}", files.len(), input.display());
            found.extend(files.into_iter().map(|path| ThemeInput {
                name: theme_name(&path),
                path,
            }));
        } else if input.is_file() {
            found.push(ThemeInput {
                name: theme_name(input),
                path: input.to_path_buf(),
            });
        } else {
            return Err(TokenError::Io(format!("{}: no such file or directory", input.display())));
        }
    }
    Ok(found)
}

fn load_themes(inputs: &[ThemeInput]) -> Result<Vec<(String, TokenDocument)>> {
    inputs
        .iter()
        .map(|input| TokenDocument::load(&input.path).map(|document| (input.name.clone(), document)))
        .collect()
}

fn build_registry(options: &ResolverOptions, inputs: &[ThemeInput]) -> Result<TokenRegistry> {
    let themes = load_themes(inputs)?;
    Ok(TokenEngine::new(options.clone()).resolve_themes(themes))
}

// --- CHECK ---
pub fn handle_check_command(cli: &TokenCli, matches: &clap::ArgMatches) -> Result<i32> {
    let paths: Vec<&String> = matches
        .get_many::<String>("inputs")
        .map(|values| values.collect())
        .unwrap_or_default();
    let inputs = discover_inputs(&paths)?;
    if inputs.is_empty() {
        println!("No token files found");
        return Ok(0);
    }

    let registry = build_registry(cli.options(), &inputs)?;
    let mut error_files = 0;

    for theme in registry.themes() {
        let diagnostics = theme.diagnostics();
        if diagnostics.is_empty() {
            println!("✅ {} - No issues found", theme.document_id());
        } else {
            println!(
                "{} {} - {} errors, {} warnings",
                if diagnostics.has_errors() { "❌" } else { "⚠️ " },
                theme.document_id(),
                diagnostics.error_count(),
                diagnostics.warning_count()
            );
            for diagnostic in diagnostics {
                println!("   {}", diagnostic);
            }
        }
        if diagnostics.has_errors() {
            error_files += 1;
        }
        if matches.get_flag("stats") {
            theme.stats().print_summary();
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total files: {}", registry.len());
    println!("   Files with errors: {}", error_files);

    Ok(if error_files > 0 { 1 } else { 0 })
}

// --- RESOLVE ---
pub fn handle_resolve_command(cli: &TokenCli, matches: &clap::ArgMatches) -> Result<i32> {
    let input = matches
        .get_one::<String>("input")
        .ok_or_else(|| TokenError::InvalidFormat {
            message: "missing input".to_string(),
        })?;
    let mut inputs = if Path::new(input).is_dir() {
        discover_inputs(&[input])?
    } else {
        vec![ThemeInput {
            name: cli.options().default_theme.clone(),
            path: PathBuf::from(input),
        }]
    };
    if let Some(themes) = matches.get_many::<String>("theme") {
        for theme in themes {
            let (name, file) = parse_theme_arg(theme)?;
            inputs.push(ThemeInput {
                name,
                path: PathBuf::from(file),
            });
        }
    }

    let format = matches.get_one::<OutputFormat>("format").copied().unwrap_or(OutputFormat::Json);
    let output = matches.get_one::<String>("output").map(PathBuf::from);
    let show_stats = matches.get_flag("stats");

    let registry = build_registry(cli.options(), &inputs)?;
    emit(&registry, format, output.as_deref(), show_stats)?;

    if matches.get_flag("watch") {
        watch_and_resolve(cli.options(), &inputs, format, output.as_deref(), SharedRegistry::new(registry))?;
        return Ok(0);
    }
    Ok(if registry.has_errors() { 1 } else { 0 })
}

fn emit(registry: &TokenRegistry, format: OutputFormat, output: Option<&Path>, show_stats: bool) -> Result<()> {
    for diagnostic in &registry.diagnostics() {
        eprintln!("{}", diagnostic);
    }

    let rendered = match format {
        OutputFormat::Json => render_json(registry)?,
        OutputFormat::Text => render_text(registry),
    };
    match output {
        Some(path) => {
            fs::write(path, rendered)?;
            println!("✅ Tokens written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    if show_stats {
        for theme in registry.themes() {
            println!("\n[{}]", theme.name());
            theme.stats().print_summary();
        }
    }
    Ok(())
}

pub fn render_json(registry: &TokenRegistry) -> Result<String> {
    let mut themes = serde_json::Map::new();
    for theme in registry.themes() {
        let tokens = serde_json::to_value(theme.tokens()).map_err(|e| TokenError::InvalidFormat {
            message: format!("JSON serialization error: {}", e),
        })?;
        themes.insert(theme.name().to_string(), tokens);
    }
    let document = serde_json::json!({
        "tokens": registry.all(),
        "themes": themes,
        "diagnostics": registry.diagnostics(),
    });
    serde_json::to_string_pretty(&document).map_err(|e| TokenError::InvalidFormat {
        message: format!("JSON serialization error: {}", e),
    })
}

pub fn render_text(registry: &TokenRegistry) -> String {
    let mut out = String::new();
    for token in registry.all() {
        let value = token
            .value
            .as_ref()
            .and_then(|value| serde_json::to_string(value).ok())
            .unwrap_or_else(|| "<unresolved>".to_string());
        let token_type = token.token_type.as_ref().map(|t| t.as_str()).unwrap_or("?");
        out.push_str(&format!("{} ({}) = {}", token.path, token_type, value));
        if !token.aliases.is_empty() {
            out.push_str(&format!("  via {}", token.aliases.join(" -> ")));
        }
        out.push('\n');
    }
    out
}

fn watch_and_resolve(
    options: &ResolverOptions,
    inputs: &[ThemeInput],
    format: OutputFormat,
    output: Option<&Path>,
    shared: SharedRegistry,
) -> Result<()> {
    println!("👀 Watching {} token files for changes...", inputs.len());

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| TokenError::Io(format!("Failed to create file watcher: {}", e)))?;

    for input in inputs {
        watcher
            .watch(&input.path, RecursiveMode::NonRecursive)
            .map_err(|e| TokenError::Io(format!("Failed to watch {}: {}", input.path.display(), e)))?;
    }

    loop {
        match rx.recv() {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                println!("🔄 Tokens changed, re-resolving...");
                match build_registry(options, inputs) {
                    Ok(registry) => {
                        shared.replace(registry);
                        let snapshot = shared.snapshot();
                        if let Err(e) = emit(&snapshot, format, output, false) {
                            eprintln!("❌ Output failed: {}", e);
                        }
                    }
                    Err(e) => eprintln!("❌ Resolution failed: {}", e),
                }
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_theme_name_uses_first_stem() {
        assert_eq!(theme_name(Path::new("themes/dark.tokens.json")), "dark");
        assert_eq!(theme_name(Path::new("default.json")), "default");
    }

    #[test]
    fn test_discover_walks_directories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("default.tokens.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("more")).unwrap();
        fs::write(dir.path().join("more").join("dark.tokens.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let inputs = discover_inputs(&[dir.path()]).unwrap();
        let names: Vec<_> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["default", "dark"]);
    }

    #[test]
    fn test_discover_rejects_missing_paths() {
        let dir = TempDir::new().unwrap();
        assert!(discover_inputs(&[dir.path().join("absent.tokens.json")]).is_err());
    }

    #[test]
    fn test_render_text_lists_merged_tokens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("default.tokens.json");
        fs::write(
            &path,
            r##"{"color": {"bg": {"$type": "color", "$value": "#fff"}, "text": {"$ref": "#/color/bg"}}}"##,
        )
        .unwrap();

        let inputs = discover_inputs(&[&path]).unwrap();
        let registry = build_registry(&ResolverOptions::default(), &inputs).unwrap();
        let text = render_text(&registry);
        assert!(text.contains("color.bg (color) = \"#fff\""));
        assert!(text.contains("color.text (color) = \"#fff\"  via #/color/bg"));

        let json = render_json(&registry).unwrap();
        assert!(json.contains("\"default\""));
    }
}
