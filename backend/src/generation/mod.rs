//! UI generation
//!
//! Everything between an inbound request and the three model calls:
//! the component vocabulary, the plan data model, prompt rendering,
//! output validation and the orchestrating pipeline.

pub mod components;
pub mod pipeline;
pub mod plan;
pub mod prompts;
pub mod validator;

pub use components::{component_dictionary, ComponentName, PropDef, PropShape};
pub use pipeline::{
    GenerationError, GenerationPipeline, PipelineOptions, StageEvent, StageObserver,
    INPUT_MESSAGE_REQUIRED,
};
pub use plan::{ComponentSpec, GenerationRequest, GenerationResult, Plan, PlanType, Stage};
pub use validator::{
    check_explanation, check_fragment, parse_plan, OutputWarning, PlanError, SchemaViolation,
    WarningKind,
};
