use crate::core::context_aggregator::aggregate;
use crate::core::path_classifier::PathClassifier;
use crate::core::prompt_builder::build_prompt;
use crate::domain::error::{AppError, ConfigError, ModelError};
use crate::domain::models::{AggregatedContext, ContextConfig};
use crate::infra::file_system::ScanProgress;
use crate::infra::model_client::{GeminiConfig, ModelClient};
use log::{info, warn};
use std::thread;

#[derive(Debug)]
pub enum RunResult {
    DryRun,
    /// Nothing was loaded, so nothing was sent.
    Empty,
    Generated(String),
    /// The context is still valid; only the remote call failed.
    Failed(ModelError),
}

#[derive(Debug)]
pub struct RunOutcome {
    pub context: AggregatedContext,
    pub prompt: String,
    pub result: RunResult,
}

/// One linear pass: validate, walk, build the prompt, then either stop (dry
/// run) or send it to `client`.
///
/// Configuration problems fail before any walk. A missing client outside dry
/// run counts as a missing credential. An empty context is returned as
/// `RunResult::Empty` so its summary can still be reported.
pub fn execute(
    config: &ContextConfig,
    classifier: &PathClassifier,
    client: Option<&dyn ModelClient>,
    progress: &mut ScanProgress,
) -> Result<RunOutcome, AppError> {
    config.validate()?;
    let client = match (config.dry_run, client) {
        (true, _) => None,
        (false, Some(client)) => Some(client),
        (false, None) => {
            return Err(ConfigError::MissingCredential {
                var: GeminiConfig::API_KEY_ENV,
            }
            .into());
        }
    };

    let context = aggregate(&config.root_path, classifier, &config.limits(), progress);
    let prompt = build_prompt(&context);

    let Some(client) = client else {
        info!("Dry run enabled. Skipping LLM call.");
        return Ok(RunOutcome {
            context,
            prompt,
            result: RunResult::DryRun,
        });
    };

    if context.files.is_empty() {
        warn!("No file content loaded from {}", config.root_path.display());
        return Ok(RunOutcome {
            context,
            prompt,
            result: RunResult::Empty,
        });
    }

    if !config.cooldown.is_zero() {
        info!(
            "Respecting API quota: waiting {}s before the request",
            config.cooldown.as_secs()
        );
        thread::sleep(config.cooldown);
    }

    let result = match client.generate(&prompt) {
        Ok(document) => RunResult::Generated(document),
        Err(e) => {
            warn!("LLM generation failed: {}", e);
            RunResult::Failed(e)
        }
    };

    Ok(RunOutcome {
        context,
        prompt,
        result,
    })
}
