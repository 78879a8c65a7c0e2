//! Shared types for the study buddy service and its HTTP clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =====================================================
// Documents
// =====================================================

/// Reserved field holding a document's collection-scoped identifier.
pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// A flat, schemaless stored record.
///
/// Every typed entity below is normalized into a `Document` before it is
/// handed to storage, so the storage layer only ever sees this one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize a typed record into a document. Fails unless the record
    /// serializes to a JSON object.
    pub fn from_record<T: Serialize>(record: &T) -> serde_json::Result<Self> {
        match serde_json::to_value(record)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: &str) {
        self.insert(ID_FIELD, id);
    }

    /// Set `created_at` and `updated_at` to the same instant.
    pub fn stamp(&mut self, timestamp: &str) {
        self.insert(CREATED_AT_FIELD, timestamp);
        self.insert(UPDATED_AT_FIELD, timestamp);
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =====================================================
// Enumerations
// =====================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Email,
    Phone,
    Google,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Hindi,
    #[default]
    English,
    Hinglish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyGoal {
    Exam,
    Homework,
    Preparation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoubtSource {
    Text,
    Image,
}

/// Quick actions offered by the chat box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatAction {
    Simplify,
    Explain10,
    Flashcards,
    Quiz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Short,
}

/// Number of questions in a generated quiz. Only 5 and 10 are offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum QuizLength {
    #[default]
    Five,
    Ten,
}

impl QuizLength {
    pub fn count(self) -> usize {
        match self {
            QuizLength::Five => 5,
            QuizLength::Ten => 10,
        }
    }
}

impl TryFrom<i64> for QuizLength {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(QuizLength::Five),
            10 => Ok(QuizLength::Ten),
            other => Err(format!("quiz count must be 5 or 10, got {}", other)),
        }
    }
}

impl From<QuizLength> for i64 {
    fn from(length: QuizLength) -> Self {
        length.count() as i64
    }
}

// =====================================================
// Domain Types (one per collection)
// =====================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub provider: Provider,
    pub preferred_language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub grade: Option<String>,
    pub subjects: Vec<String>,
    pub study_goal: Option<StudyGoal>,
    pub daily_study_minutes: i64,
    pub badges: Vec<String>,
}

/// A single question episode, typed or photographed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doubt {
    pub user_id: String,
    pub source: DoubtSource,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ocr_text: Option<String>,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub items: Vec<FlashcardItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub user_id: String,
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyTask {
    pub date: String,
    pub subject: String,
    pub topic: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    pub user_id: String,
    pub exam_date: String,
    pub daily_minutes: i64,
    pub subjects: Vec<String>,
    pub tasks: Vec<StudyTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSummary {
    pub user_id: String,
    pub subject: Option<String>,
    pub text: String,
    pub bullets: Vec<String>,
    pub explanation: String,
}

// =====================================================
// Request Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub provider: Provider,
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileSetupRequest {
    pub user_id: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub study_goal: Option<StudyGoal>,
    #[serde(default = "default_daily_study_minutes")]
    pub daily_study_minutes: i64,
}

fn default_daily_study_minutes() -> i64 {
    20
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub action: Option<ChatAction>,
}

/// Query string of `POST /photo-doubt`; the user id may also arrive as a form field.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PhotoDoubtQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlashcardRequest {
    pub user_id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_flashcard_count")]
    pub count: i64,
}

fn default_flashcard_count() -> i64 {
    5
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizRequest {
    pub user_id: String,
    pub topic: String,
    #[serde(default)]
    pub count: QuizLength,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanRequest {
    pub user_id: String,
    pub exam_date: String,
    pub daily_minutes: i64,
    pub subjects: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub user_id: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub text: String,
}

// =====================================================
// Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileSetupResponse {
    pub profile_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatResponse {
    Answer {
        doubt_id: String,
        answer: String,
    },
    Flashcards {
        flashcard_id: String,
        items: Vec<FlashcardItem>,
    },
    Quiz {
        quiz_id: String,
        questions: Vec<QuizQuestion>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoDoubtResponse {
    pub doubt_id: String,
    pub ocr_text: String,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlashcardResponse {
    pub flashcard_id: String,
    pub items: Vec<FlashcardItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub quiz_id: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub plan_id: String,
    pub tasks: Vec<StudyTask>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary_id: String,
    pub bullets: Vec<String>,
    pub explanation: String,
}

/// Most recent saved items for one user, per collection.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LibraryResponse {
    pub recent_doubts: Vec<Document>,
    pub flashcards: Vec<Document>,
    pub quizzes: Vec<Document>,
    pub plans: Vec<Document>,
    pub summaries: Vec<Document>,
}

/// Store connectivity report served by `GET /test`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_from_record_requires_object() {
        let user = User {
            name: "Asha".to_string(),
            email: None,
            phone: Some("98100".to_string()),
            provider: Provider::Phone,
            preferred_language: Language::English,
        };
        let doc = Document::from_record(&user).unwrap();
        assert_eq!(doc.get("provider"), Some(&json!("phone")));
        assert_eq!(doc.get("email"), Some(&Value::Null));
        assert_eq!(doc.get("preferred_language"), Some(&json!("English")));

        assert!(Document::from_record(&"just a string").is_err());
        assert!(Document::from_record(&vec![1, 2, 3]).is_err());
    }

    #[test]
    fn test_document_stamp_and_id() {
        let mut doc = Document::new();
        doc.stamp("2026-01-01T00:00:00+00:00");
        doc.set_id("demo-user-1-1");
        assert_eq!(doc.get(CREATED_AT_FIELD), doc.get(UPDATED_AT_FIELD));
        assert_eq!(doc.id(), Some("demo-user-1-1"));
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "_id": "demo-user-1-1",
                "created_at": "2026-01-01T00:00:00+00:00",
                "updated_at": "2026-01-01T00:00:00+00:00"
            })
        );
    }

    #[test]
    fn test_quiz_length_accepts_only_five_or_ten() {
        let req: QuizRequest =
            serde_json::from_value(json!({"user_id": "u", "topic": "Cells"})).unwrap();
        assert_eq!(req.count, QuizLength::Five);

        let req: QuizRequest =
            serde_json::from_value(json!({"user_id": "u", "topic": "Cells", "count": 10})).unwrap();
        assert_eq!(req.count.count(), 10);

        let bad = serde_json::from_value::<QuizRequest>(
            json!({"user_id": "u", "topic": "Cells", "count": 7}),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_chat_response_is_tagged_by_type() {
        let resp = ChatResponse::Answer {
            doubt_id: "d1".to_string(),
            answer: "ok".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"type": "answer", "doubt_id": "d1", "answer": "ok"})
        );
    }

    #[test]
    fn test_short_question_omits_options_and_answer() {
        let q = QuizQuestion {
            question: "Explain osmosis in one line".to_string(),
            question_type: QuestionType::Short,
            options: None,
            answer: None,
        };
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({"question": "Explain osmosis in one line", "type": "short"})
        );
    }

    #[test]
    fn test_request_defaults() {
        let login: LoginRequest = serde_json::from_value(json!({"identifier": "a@b.c"})).unwrap();
        assert_eq!(login.provider, Provider::Email);
        assert!(login.name.is_none());

        let profile: ProfileSetupRequest =
            serde_json::from_value(json!({"user_id": "u", "preferred_language": "Hindi"})).unwrap();
        assert_eq!(profile.daily_study_minutes, 20);
        assert!(profile.subjects.is_empty());

        let cards: FlashcardRequest = serde_json::from_value(json!({"user_id": "u"})).unwrap();
        assert_eq!(cards.count, 5);
    }
}
