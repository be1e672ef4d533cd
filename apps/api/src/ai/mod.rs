//! AI Gateway: the two call shapes the dashboard needs (structured extraction and free
//! text), plus the prompt builders for each dashboard operation.
//!
//! `AppState` holds an `Arc<dyn AiGateway>`; production wires in `LlmClient`, tests wire
//! in a scripted fake.

pub mod prompts;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::ai::prompts::{
    ATTENDANCE_ANALYSIS_PROMPT, OPPORTUNITY_ANALYSIS_PROMPT, RESUME_ANALYSIS_PROMPT,
    RESUME_ANALYSIS_SYSTEM, TRAINING_SUGGESTION_PROMPT,
};
use crate::llm_client::prompts::{ADVISOR_SYSTEM, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::consultant::{Consultant, Department, MeetingStatus, ResumeAnalytics};

#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Free-text generation; the reply is returned verbatim.
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;

    /// Structured generation constrained by a JSON schema.
    async fn generate_structured(
        &self,
        prompt: &str,
        system: &str,
        schema: &Value,
    ) -> Result<Value, LlmError>;
}

#[async_trait]
impl AiGateway for LlmClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, ADVISOR_SYSTEM).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        system: &str,
        schema: &Value,
    ) -> Result<Value, LlmError> {
        self.call_with_schema(prompt, system, schema).await
    }
}

/// Output schema for resume analysis. Every property is required.
pub fn resume_analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            "extracted_skills": { "type": "array", "items": { "type": "string" } },
            "years_of_experience": { "type": "number" },
            "project_highlights": { "type": "array", "items": { "type": "string" } },
            "resume_status": { "type": "string", "enum": ["Updated", "Pending"] }
        },
        "required": [
            "summary",
            "extracted_skills",
            "years_of_experience",
            "project_highlights",
            "resume_status"
        ]
    })
}

/// Runs structured resume extraction. Any reply that does not decode into
/// `ResumeAnalytics` (missing field, wrong type, unknown status) is a failure.
pub async fn analyze_resume(
    gateway: &dyn AiGateway,
    resume_text: &str,
) -> Result<ResumeAnalytics, LlmError> {
    let prompt = RESUME_ANALYSIS_PROMPT.replace("{resume_text}", resume_text);
    let system = format!("{RESUME_ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM}");
    let value = gateway
        .generate_structured(&prompt, &system, &resume_analysis_schema())
        .await?;
    serde_json::from_value(value).map_err(|e| LlmError::Schema(e.to_string()))
}

pub fn training_prompt(consultant: &Consultant) -> String {
    let summary = consultant
        .resume_analytics
        .as_ref()
        .map(|a| a.summary.as_str())
        .unwrap_or("(no resume analyzed yet)");
    let completed = if consultant.training_history.is_empty() {
        "none".to_string()
    } else {
        consultant
            .training_history
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    TRAINING_SUGGESTION_PROMPT
        .replace("{name}", &consultant.name)
        .replace("{department}", consultant.department.as_str())
        .replace("{skills}", &list_or_none(&consultant.skills))
        .replace("{summary}", summary)
        .replace("{completed}", &completed)
}

pub fn attendance_prompt(consultant: &Consultant) -> String {
    let attended = consultant
        .meetings
        .iter()
        .filter(|m| m.status == MeetingStatus::Attended)
        .count();
    let log = consultant
        .meetings
        .iter()
        .map(|m| {
            let status = match m.status {
                MeetingStatus::Attended => "attended",
                MeetingStatus::Pending => "pending",
            };
            match &m.notes {
                Some(notes) => format!("- {} [{}]: {}", m.title, status, notes),
                None => format!("- {} [{}]", m.title, status),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    ATTENDANCE_ANALYSIS_PROMPT
        .replace("{name}", &consultant.name)
        .replace("{attended}", &attended.to_string())
        .replace("{total}", &consultant.meetings.len().to_string())
        .replace("{meetings}", &log)
}

/// Prompt over every opportunity description in `department` (all departments when
/// `None`). Returns `None` when there is nothing to analyze.
pub fn opportunity_prompt(
    consultants: &[Consultant],
    department: Option<Department>,
) -> Option<String> {
    let lines: Vec<String> = consultants
        .iter()
        .filter(|c| department.map_or(true, |d| c.department == d))
        .flat_map(|c| {
            c.opportunities
                .descriptions
                .iter()
                .map(move |d| format!("- ({}) {}", c.name, d))
        })
        .collect();
    if lines.is_empty() {
        return None;
    }
    let scope = department.map_or("All departments", |d| d.as_str());
    Some(
        OPPORTUNITY_ANALYSIS_PROMPT
            .replace("{scope}", scope)
            .replace("{count}", &lines.len().to_string())
            .replace("{opportunities}", &lines.join("\n")),
    )
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted gateway for handler tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeGateway {
        text: Mutex<VecDeque<Result<String, LlmError>>>,
        structured: Mutex<VecDeque<Result<Value, LlmError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_text(&self, reply: Result<String, LlmError>) {
            self.text.lock().unwrap().push_back(reply);
        }

        pub fn push_structured(&self, reply: Result<Value, LlmError>) {
            self.structured.lock().unwrap().push_back(reply);
        }
    }

    #[async_trait]
    impl AiGateway for FakeGateway {
        async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.text
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }

        async fn generate_structured(
            &self,
            prompt: &str,
            _system: &str,
            _schema: &Value,
        ) -> Result<Value, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.structured
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }
}
