use crate::core::path_classifier::PathClassifier;
use crate::core::pipeline::{RunResult, execute};
use crate::core::prompt_builder::dry_run_report;
use crate::domain::error::AppError;
use crate::domain::models::ContextConfig;
use crate::domain::rules::ExclusionRuleSet;
use crate::infra::file_system::ScanProgress;
use crate::infra::logger::setup_logger;
use crate::infra::model_client::{GeminiClient, GeminiConfig, ModelClient};
use crate::infra::output::{print_run_summary, write_output};
use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "readme-agent")]
#[command(about = "Generate a README.md for a project using an LLM", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a project directory and generate its README
    Generate {
        /// Path to the directory to analyze
        directory: String,

        /// Build the context and prompt without calling the LLM
        #[arg(long)]
        dry_run: bool,

        /// Maximum characters to read per file
        #[arg(long, default_value_t = ContextConfig::DEFAULT_MAX_CHARS)]
        max_chars: usize,

        /// Maximum number of files whose content is included
        #[arg(long, default_value_t = ContextConfig::DEFAULT_MAX_FILES)]
        max_files: usize,

        /// Extra file extensions to include, comma separated
        #[arg(long)]
        ext: Option<String>,

        /// Extra directory names to exclude, comma separated
        #[arg(long)]
        exclude: Option<String>,

        #[arg(long, default_value = ContextConfig::DEFAULT_MODEL)]
        model: String,

        /// Base URL of the generative language API
        #[arg(long, default_value = ContextConfig::DEFAULT_BASE_URL)]
        api_base: String,

        /// Request timeout in seconds
        #[arg(long, default_value_t = ContextConfig::DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Seconds to wait before the request (free-tier pacing)
        #[arg(long, default_value_t = 0)]
        cooldown: u64,

        /// Write the result to this file instead of stdout
        #[arg(long)]
        output: Option<String>,

        /// Copy the result to the clipboard
        #[arg(long)]
        clipboard: bool,
    },
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl Commands {
    pub fn into_config(self) -> ContextConfig {
        match self {
            Commands::Generate {
                directory,
                dry_run,
                max_chars,
                max_files,
                ext,
                exclude,
                model,
                api_base,
                timeout,
                cooldown,
                output,
                clipboard,
            } => ContextConfig {
                max_chars,
                max_files,
                extra_extensions: split_list(ext.as_deref()),
                extra_excludes: split_list(exclude.as_deref()),
                dry_run,
                model,
                api_base,
                timeout: Duration::from_secs(timeout),
                cooldown: Duration::from_secs(cooldown),
                output_path: output,
                clipboard,
                ..ContextConfig::new(PathBuf::from(directory))
            },
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;

    info!("Starting generate command");
    let config = cli.command.into_config();
    debug!("Configuration: {:?}", config);

    generate_readme(&config)
}

fn generate_readme(config: &ContextConfig) -> anyhow::Result<()> {
    config.validate().map_err(AppError::from)?;

    let rules = ExclusionRuleSet::default()
        .with_extra_extensions(&config.extra_extensions)
        .with_extra_excluded_dirs(&config.extra_excludes);
    let classifier = PathClassifier::new(rules).map_err(AppError::from)?;

    let client = if config.dry_run {
        None
    } else {
        let gemini = GeminiConfig::from_env()
            .map_err(AppError::from)?
            .with_model(&config.model)
            .with_base_url(&config.api_base)
            .with_timeout(config.timeout);
        Some(GeminiClient::new(gemini).context("Failed to build the HTTP client")?)
    };

    let mut progress = ScanProgress::new();
    let outcome = execute(
        config,
        &classifier,
        client.as_ref().map(|c| c as &dyn ModelClient),
        &mut progress,
    )?;

    print_run_summary(&outcome.context.summary, outcome.prompt.chars().count())?;

    match outcome.result {
        RunResult::DryRun => {
            let report = dry_run_report(&outcome.context, &outcome.prompt);
            write_output(&report, config.output_path.clone(), config.clipboard)
        }
        RunResult::Generated(document) => {
            info!("Writing generated README");
            write_output(&document, config.output_path.clone(), config.clipboard)
        }
        RunResult::Empty => Err(AppError::EmptyContext(config.root_path.clone()).into()),
        RunResult::Failed(e) => Err(AppError::from(e).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ConfigError;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "readme-agent",
            "generate",
            "./my-project",
            "--dry-run",
            "--max-chars",
            "10",
            "--ext",
            ".dart, zig",
            "--exclude",
            "vendor",
            "--output",
            "README.md",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let config = cli.command.into_config();
        assert_eq!(config.root_path, PathBuf::from("./my-project"));
        assert!(config.dry_run);
        assert_eq!(config.max_chars, 10);
        assert_eq!(config.max_files, ContextConfig::DEFAULT_MAX_FILES);
        assert_eq!(config.extra_extensions, vec![".dart", "zig"]);
        assert_eq!(config.extra_excludes, vec!["vendor"]);
        assert_eq!(config.output_path, Some("README.md".to_string()));
        assert!(!config.clipboard);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["readme-agent", "generate", "."]).unwrap();
        let config = cli.command.into_config();

        assert_eq!(config.max_chars, 5000);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config.cooldown.is_zero());
        assert!(!config.dry_run);
        assert_eq!(config.api_base, ContextConfig::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_cli_rejects_negative_max_chars() {
        assert!(
            Cli::try_parse_from(["readme-agent", "generate", ".", "--max-chars", "-5"]).is_err()
        );
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some(" a, ,b ,")), vec!["a", "b"]);
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_generate_readme_rejects_zero_timeout() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cli = Cli::try_parse_from([
            "readme-agent",
            "generate",
            temp_dir.path().to_str().unwrap(),
            "--dry-run",
            "--timeout",
            "0",
        ])
        .unwrap();

        let err = generate_readme(&cli.command.into_config()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Config(ConfigError::InvalidLimit { name: "timeout", .. }))
        ));
    }

    #[test]
    fn test_generate_readme_missing_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = ContextConfig::new(temp_dir.path().join("missing"));
        config.dry_run = true;

        let err = generate_readme(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Config(_))
        ));
    }
}
