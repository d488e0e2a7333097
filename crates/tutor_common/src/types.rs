//! Request and pipeline types shared between the daemon and the library.
//!
//! Wire structs are camelCase because the front end speaks the original JSON
//! protocol; everything the client sends is optional except `question`.

use serde::{Deserialize, Serialize};

/// A source backing part of an answer (live-search result, syllabus section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// File metadata attached to a conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_file: Option<AttachedFile>,
}

/// Course data as supplied by the front end for the active course.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseContext {
    pub course_name: Option<String>,
    pub course_code: Option<String>,
    pub instructor: Option<String>,
    pub schedule: Option<String>,
    pub topics: Vec<String>,
    pub assignments: Vec<String>,
    pub exams: Vec<String>,
}

/// Summary of one enrolled course, for cross-course questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
}

/// Topics a student has struggled with, kept by the profile store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningProfile {
    pub user_id: String,
    pub struggled_topics: Vec<String>,
}

/// Request body of the answer endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerRequest {
    pub question: String,
    /// Free-form extra context string from the client.
    pub context: Option<String>,
    pub conversation_history: Vec<ConversationTurn>,
    /// In a shared room, only respond when explicitly asked.
    #[serde(rename = "shouldCallAI")]
    pub should_call_ai: bool,
    pub is_public_chat: bool,
    pub course_data: Option<CourseContext>,
    pub all_syllabi: Vec<CourseSummary>,
    pub thinking_mode: bool,
    pub user_id: Option<String>,
}

/// The output accepted from exactly one provider (or the local fallback).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    pub answer: String,
    /// Identifier of the provider whose output was accepted.
    pub provider: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    /// Intermediate reasoning steps, shown when thinking mode is on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thoughts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_summary: Option<String>,
    /// True when the thought trace was fabricated locally rather than
    /// returned by the provider.
    #[serde(default)]
    pub synthetic_thoughts: bool,
}

impl ProviderResult {
    pub fn new(answer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            provider: provider.into(),
            sources: Vec::new(),
            thoughts: Vec::new(),
            thinking_summary: None,
            synthetic_thoughts: false,
        }
    }
}

/// Body of the non-streaming `/v1/answer` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub success: bool,
    pub answer: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    pub thinking_steps: Vec<String>,
    pub thinking_summary: String,
}

impl From<ProviderResult> for AnswerResponse {
    fn from(r: ProviderResult) -> Self {
        Self {
            success: true,
            answer: r.answer,
            provider: r.provider,
            sources: r.sources,
            thinking_steps: r.thoughts,
            thinking_summary: r.thinking_summary.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_camel_case_wire_names() {
        let json = r#"{
            "question": "what is 2+2?",
            "shouldCallAI": true,
            "isPublicChat": false,
            "thinkingMode": true,
            "conversationHistory": [
                {"role": "user", "content": "hi", "attachedFile": {"name": "hw1.pdf"}}
            ],
            "courseData": {"courseName": "Calculus I", "topics": ["limits"]},
            "userId": "u-42"
        }"#;

        let req: AnswerRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.question, "what is 2+2?");
        assert!(req.should_call_ai);
        assert!(!req.is_public_chat);
        assert!(req.thinking_mode);
        assert_eq!(req.conversation_history.len(), 1);
        assert_eq!(
            req.conversation_history[0]
                .attached_file
                .as_ref()
                .unwrap()
                .name,
            "hw1.pdf"
        );
        assert_eq!(
            req.course_data.unwrap().course_name.as_deref(),
            Some("Calculus I")
        );
        assert_eq!(req.user_id.as_deref(), Some("u-42"));
    }

    #[test]
    fn test_request_defaults_when_fields_absent() {
        let req: AnswerRequest = serde_json::from_str(r#"{"question": "hi"}"#).unwrap();
        assert!(!req.should_call_ai);
        assert!(!req.is_public_chat);
        assert!(!req.thinking_mode);
        assert!(req.conversation_history.is_empty());
        assert!(req.course_data.is_none());
    }

    #[test]
    fn test_answer_response_wire_names() {
        let resp: AnswerResponse = ProviderResult::new("ok", "gemini").into();
        let v = serde_json::to_value(&resp).unwrap();
        assert!(v.get("thinkingSteps").is_some());
        assert!(v.get("thinkingSummary").is_some());
        assert_eq!(v["provider"], "gemini");
    }
}
