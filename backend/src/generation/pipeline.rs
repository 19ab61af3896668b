//! Generation pipeline
//!
//! Drives the three model calls for one request:
//!
//! ```text
//! message ──> plan (JSON) ──> parse_plan ──┬──> generate ──> check_fragment
//!                                          └──> explain  ──> check_explanation
//! ```
//!
//! A request either yields a complete [`GenerationResult`] or fails with a
//! [`GenerationError`]; partial results are never returned.

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use super::plan::{GenerationRequest, GenerationResult, Plan, PlanType, Stage};
use super::prompts::{build_explanation_prompt, build_generation_prompt, build_planning_prompt};
use super::validator::{check_explanation, check_fragment, parse_plan, PlanError};
use crate::llm::{ModelClient, ModelError, ResponseFormat};

/// Message returned for a missing or blank request message
pub const INPUT_MESSAGE_REQUIRED: &str = "Input message required";

/// Default cap on the request message length, in characters
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 10_000;

/// Pipeline tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Longest accepted message, in characters
    pub max_message_length: usize,
    /// Run the generate and explain stages concurrently
    pub parallel_stages: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            parallel_stages: false,
        }
    }
}

/// Why a pipeline run failed
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The request was rejected before any model call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A model call failed
    #[error("Model call failed during {stage} stage: {source}")]
    Upstream {
        /// Stage whose call failed
        stage: Stage,
        /// Underlying client error
        #[source]
        source: ModelError,
    },

    /// The planning stage returned something that is not a valid plan
    #[error(transparent)]
    MalformedPlan(#[from] PlanError),
}

/// Progress notification emitted while a request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// The stage's model call is about to be sent
    Started(Stage),
    /// The stage's model call returned successfully
    Finished(Stage),
}

/// Callback receiving [`StageEvent`]s
pub type StageObserver<'a> = dyn Fn(StageEvent) + Send + Sync + 'a;

/// Plan → generate → explain orchestrator
pub struct GenerationPipeline {
    client: Arc<dyn ModelClient>,
    options: PipelineOptions,
}

impl GenerationPipeline {
    /// Pipeline with default options
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self::with_options(client, PipelineOptions::default())
    }

    /// Pipeline with explicit options
    pub fn with_options(client: Arc<dyn ModelClient>, options: PipelineOptions) -> Self {
        Self { client, options }
    }

    /// Options in effect
    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Check a request without calling the model.
    pub fn validate_request(&self, request: &GenerationRequest) -> Result<(), GenerationError> {
        if request.message.trim().is_empty() {
            return Err(GenerationError::InvalidInput(
                INPUT_MESSAGE_REQUIRED.to_string(),
            ));
        }

        let length = request.message.chars().count();
        if length > self.options.max_message_length {
            return Err(GenerationError::InvalidInput(format!(
                "Input message is too long ({} characters, maximum {})",
                length, self.options.max_message_length
            )));
        }

        Ok(())
    }

    /// Run all stages for `request`.
    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        self.run_observed(request, &|_: StageEvent| {}).await
    }

    /// Run all stages, reporting progress to `observer`.
    pub async fn run_observed(
        &self,
        request: &GenerationRequest,
        observer: &StageObserver<'_>,
    ) -> Result<GenerationResult, GenerationError> {
        self.validate_request(request)?;

        let started = Instant::now();
        let previous = request.previous();

        let planning_prompt = build_planning_prompt(&request.message, previous);
        let raw_plan = self
            .call_stage(Stage::Plan, &planning_prompt, ResponseFormat::Json, observer)
            .await?;

        let mut plan = parse_plan(&raw_plan).map_err(|e| {
            tracing::warn!(error = %e, "Planner returned an invalid plan");
            e
        })?;

        // Nothing to modify without a previous artifact.
        if plan.is_modify() && previous.is_none() {
            tracing::warn!("Planner chose modify without a previous artifact, treating as create");
            plan.plan_type = PlanType::Create;
        }

        tracing::debug!(
            plan_type = %plan.plan_type,
            num_components = plan.components.len(),
            "Planner produced valid plan"
        );

        let (code, explanation) = if self.options.parallel_stages {
            tokio::try_join!(
                self.generate(&plan, previous, observer),
                self.explain(&plan, observer)
            )?
        } else {
            let code = self.generate(&plan, previous, observer).await?;
            let explanation = self.explain(&plan, observer).await?;
            (code, explanation)
        };

        let mut warnings = check_fragment(&code);
        warnings.extend(check_explanation(&explanation));
        for warning in &warnings {
            tracing::warn!(
                stage = %warning.stage,
                kind = ?warning.kind,
                "{}",
                warning.message
            );
        }

        tracing::info!(
            plan_type = %plan.plan_type,
            num_components = plan.components.len(),
            num_warnings = warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation completed"
        );

        Ok(GenerationResult {
            plan,
            code,
            explanation,
            warnings,
        })
    }

    async fn generate(
        &self,
        plan: &Plan,
        previous: Option<&str>,
        observer: &StageObserver<'_>,
    ) -> Result<String, GenerationError> {
        let prompt = build_generation_prompt(plan, previous);
        self.call_stage(Stage::Generate, &prompt, ResponseFormat::Text, observer)
            .await
    }

    async fn explain(&self, plan: &Plan, observer: &StageObserver<'_>) -> Result<String, GenerationError> {
        let prompt = build_explanation_prompt(plan);
        self.call_stage(Stage::Explain, &prompt, ResponseFormat::Text, observer)
            .await
    }

    async fn call_stage(
        &self,
        stage: Stage,
        prompt: &str,
        format: ResponseFormat,
        observer: &StageObserver<'_>,
    ) -> Result<String, GenerationError> {
        observer(StageEvent::Started(stage));
        let started = Instant::now();

        let response = self
            .client
            .complete(prompt, format)
            .await
            .map_err(|source| {
                tracing::error!(
                    stage = %stage,
                    client = %self.client.name(),
                    error = %source,
                    "Model call failed"
                );
                GenerationError::Upstream { stage, source }
            })?;

        tracing::info!(
            stage = %stage,
            prompt_len = prompt.len(),
            response_len = response.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Stage completed"
        );

        observer(StageEvent::Finished(stage));
        Ok(response)
    }
}

impl std::fmt::Debug for GenerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPipeline")
            .field("client", &self.client.name())
            .field("options", &self.options)
            .finish()
    }
}
