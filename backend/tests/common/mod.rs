//! Shared test helpers: a scripted, call-recording model client and the
//! fixed stage outputs used by the end-to-end tests.

#![allow(dead_code)]

use async_trait::async_trait;
use genui_backend::llm::{ModelClient, ModelError, ResponseFormat};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Planner output for "Create a dashboard with user stats"
pub const DASHBOARD_PLAN: &str = r#"{
  "type": "create",
  "components": [
    {"name": "Navbar", "props": {"title": "Dashboard", "links": [{"label": "Home"}, {"label": "Users"}]}},
    {"name": "Card", "props": {"title": "Users", "content": "1,024", "description": "Active users this week"}},
    {"name": "Chart", "props": {"title": "Signups", "chartType": "line"}}
  ]
}"#;

/// Generator output matching [`DASHBOARD_PLAN`]
pub const DASHBOARD_CODE: &str = r#"<>
  <Navbar title="Dashboard" links={[{ label: "Home" }, { label: "Users" }]} />
  <Card title="Users" content="1,024" description="Active users this week" />
  <Chart title="Signups" chartType="line" />
</>"#;

/// Explainer output for [`DASHBOARD_PLAN`]
pub const DASHBOARD_EXPLANATION: &str =
    "The navigation bar lets you move between pages, the card highlights how many people are active, and the chart shows how signups change over time.";

/// One recorded call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub format: ResponseFormat,
}

/// Model client that replays scripted replies in order and records prompts.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replies for a full successful dashboard run
    pub fn dashboard() -> Self {
        Self::new(vec![
            Ok(DASHBOARD_PLAN.to_string()),
            Ok(DASHBOARD_CODE.to_string()),
            Ok(DASHBOARD_EXPLANATION.to_string()),
        ])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str, format: ResponseFormat) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            format,
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Transport("no scripted reply left".into())))
    }
}
