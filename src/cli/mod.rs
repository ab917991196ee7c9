// FILE: src/cli/mod.rs

mod handlers;

use crate::config::{self, ResolverOptions};
use crate::error::{Result, TokenError};
use crate::utils::NameTransform;
use clap::{Arg, ArgAction, Command, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Transform {
    None,
    Kebab,
    Camel,
    Pascal,
}

impl From<Transform> for NameTransform {
    fn from(transform: Transform) -> Self {
        match transform {
            Transform::None => NameTransform::None,
            Transform::Kebab => NameTransform::KebabCase,
            Transform::Camel => NameTransform::CamelCase,
            Transform::Pascal => NameTransform::PascalCase,
        }
    }
}

pub struct TokenCli {
    options: ResolverOptions,
}

impl TokenCli {
    pub fn new() -> Self {
        Self {
            options: ResolverOptions::default(),
        }
    }

    /// Run the command line; the returned value is the process exit code
    pub fn run(&mut self) -> Result<i32> {
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"));

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.options = config::load(config_path)?;
        }
        if let Some(transform) = matches.get_one::<Transform>("transform") {
            self.options.name_transform = (*transform).into();
        }
        if matches.get_flag("strict") {
            self.options.strict_types = true;
            self.options.strict_gradients = true;
        }

        match matches.subcommand() {
            Some(("check", sub_matches)) => handlers::handle_check_command(self, sub_matches),
            Some(("resolve", sub_matches)) => handlers::handle_resolve_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(0)
            }
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Resolver options file (.json or .toml)")
                    .action(ArgAction::Set)
                    .global(true),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count)
                    .global(true),
            )
            .arg(
                Arg::new("transform")
                    .short('t')
                    .long("transform")
                    .value_parser(clap::value_parser!(Transform))
                    .help("Name transform for token paths and lookups")
                    .global(true),
            )
            .arg(
                Arg::new("strict")
                    .long("strict")
                    .help("Treat type mismatches and out-of-range gradient stops as errors")
                    .action(ArgAction::SetTrue)
                    .global(true),
            )
            .subcommand(
                Command::new("check")
                    .about("Validate token documents and report diagnostics")
                    .arg(Arg::new("inputs").help("Token files or directories").required(true).num_args(1..))
                    .arg(Arg::new("stats").long("stats").help("Show resolution statistics").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("resolve")
                    .about("Resolve token documents and print the flattened tokens")
                    .arg(Arg::new("input").help("Default theme file, or a directory of *.tokens.json themes").required(true).index(1))
                    .arg(Arg::new("theme").long("theme").value_name("NAME=FILE").help("Add a named theme").action(ArgAction::Append))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("json").help("Output format"))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Write output to a file"))
                    .arg(Arg::new("stats").long("stats").help("Show resolution statistics").action(ArgAction::SetTrue))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch inputs and re-resolve on change").action(ArgAction::SetTrue)),
            )
    }

    fn setup_logging(&self, verbose_count: u8) {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
    }
}

impl Default for TokenCli {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `NAME=FILE` theme argument
pub fn parse_theme_arg(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((name, file)) if !name.is_empty() && !file.is_empty() => Ok((name.to_string(), file.to_string())),
        _ => Err(TokenError::InvalidFormat {
            message: format!("Invalid theme definition: {}. Use NAME=FILE format.", arg),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme_arg() {
        assert_eq!(
            parse_theme_arg("dark=themes/dark.tokens.json").unwrap(),
            ("dark".to_string(), "themes/dark.tokens.json".to_string())
        );
        assert!(parse_theme_arg("dark").is_err());
        assert!(parse_theme_arg("=file.json").is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        TokenCli::new().build_cli().debug_assert();
    }
}
