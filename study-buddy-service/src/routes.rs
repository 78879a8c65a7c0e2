//! Axum route handlers for the study buddy HTTP API.

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use study_buddy_types::*;

use crate::config::Config;
use crate::error::ApiError;
use crate::store::{collections, Filter, Persistence, StoreMode};
use crate::templates;

/// Longest store error text echoed back by `GET /test`.
const DIAGNOSTIC_ERROR_CHARS: usize = 50;

/// Upload cap for `POST /photo-doubt`; phone photos run well past axum's 2 MB default.
const PHOTO_UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

pub struct AppState {
    pub store: Arc<Persistence>,
    pub config: Config,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = tower_http::cors::CorsLayer::permissive();

    Router::new()
        .route("/", get(root))
        .route("/test", get(test_store))
        .route("/auth/login", post(login))
        .route("/profile/setup", post(setup_profile))
        .route("/chat", post(chat))
        .route(
            "/photo-doubt",
            post(photo_doubt).layer(DefaultBodyLimit::max(PHOTO_UPLOAD_LIMIT)),
        )
        .route("/flashcards", post(generate_flashcards))
        .route("/quiz", post(generate_quiz))
        .route("/planner", post(create_plan))
        .route("/summary", post(summarize))
        .route("/library/:user_id", get(library))
        .with_state(state)
        .layer(cors)
}

// =====================================================
// Service Endpoints
// =====================================================

// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Study Buddy Backend running".to_string(),
    })
}

// GET /test
pub async fn test_store(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    let report = state.store.diagnostics();

    let (database, connection_status, collections) = match (report.mode, report.collections) {
        (StoreMode::Fallback, _) => (
            "Available but not initialized".to_string(),
            "Not Connected",
            Vec::new(),
        ),
        (StoreMode::Database, Ok(names)) => {
            ("Connected & Working".to_string(), "Connected", names)
        }
        (StoreMode::Database, Err(e)) => (
            format!(
                "Connected but Error: {}",
                truncate_chars(&e, DIAGNOSTIC_ERROR_CHARS)
            ),
            "Connected",
            Vec::new(),
        ),
    };

    Json(DiagnosticsResponse {
        backend: "Running".to_string(),
        database,
        database_url: set_or_not(&state.config.database_url),
        database_name: set_or_not(&state.config.database_name),
        connection_status: connection_status.to_string(),
        collections,
    })
}

fn set_or_not(value: &Option<String>) -> String {
    let label = if value.is_some() { "Set" } else { "Not Set" };
    label.to_string()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// =====================================================
// Auth & Profile
// =====================================================

// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = templates::login_user(&req);
    let user_id = state
        .store
        .create(collections::USER, Document::from_record(&user)?)?;
    Ok(Json(LoginResponse {
        user_id,
        message: "Logged in".to_string(),
    }))
}

// POST /profile/setup
pub async fn setup_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileSetupRequest>,
) -> Result<Json<ProfileSetupResponse>, ApiError> {
    let profile = Profile {
        user_id: req.user_id,
        grade: req.grade,
        subjects: req.subjects,
        study_goal: req.study_goal,
        daily_study_minutes: req.daily_study_minutes,
        badges: Vec::new(),
    };
    let profile_id = state
        .store
        .create(collections::PROFILE, Document::from_record(&profile)?)?;
    Ok(Json(ProfileSetupResponse { profile_id }))
}

// =====================================================
// Chat & Doubts
// =====================================================

// POST /chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = req.message.trim();

    let response = match req.action {
        Some(ChatAction::Flashcards) => {
            let items = templates::chat_flashcards(message);
            let flashcard = Flashcard {
                user_id: req.user_id,
                subject: None,
                topic: Some(message.to_string()),
                items,
            };
            let flashcard_id = state
                .store
                .create(collections::FLASHCARD, Document::from_record(&flashcard)?)?;
            ChatResponse::Flashcards {
                flashcard_id,
                items: flashcard.items,
            }
        }
        Some(ChatAction::Quiz) => {
            let quiz = Quiz {
                user_id: req.user_id,
                topic: message.to_string(),
                questions: templates::chat_quiz(message),
            };
            let quiz_id = state
                .store
                .create(collections::QUIZ, Document::from_record(&quiz)?)?;
            ChatResponse::Quiz {
                quiz_id,
                questions: quiz.questions,
            }
        }
        action => {
            let answer = templates::chat_answer(message, action);
            let doubt = Doubt {
                user_id: req.user_id,
                source: DoubtSource::Text,
                prompt: Some(message.to_string()),
                image_url: None,
                ocr_text: None,
                answer: answer.clone(),
            };
            let doubt_id = state
                .store
                .create(collections::DOUBT, Document::from_record(&doubt)?)?;
            ChatResponse::Answer { doubt_id, answer }
        }
    };

    Ok(Json(response))
}

// POST /photo-doubt
pub async fn photo_doubt(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PhotoDoubtQuery>,
    mut multipart: Multipart,
) -> Result<Json<PhotoDoubtResponse>, ApiError> {
    let mut user_id = query.user_id.filter(|id| !id.is_empty());
    let mut upload: Option<Option<String>> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_owned);
                // The image content is never inspected, only drained.
                field.bytes().await.map_err(multipart_error)?;
                upload = Some(file_name);
            }
            Some("user_id") if user_id.is_none() => {
                user_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let user_id = user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Validation("user_id is required".to_string()))?;
    let file_name =
        upload.ok_or_else(|| ApiError::Validation("file is required".to_string()))?;

    let (image_url, ocr_text, answer) = templates::photo_doubt(file_name.as_deref());
    let doubt = Doubt {
        user_id,
        source: DoubtSource::Image,
        prompt: None,
        image_url: Some(image_url),
        ocr_text: Some(ocr_text.clone()),
        answer: answer.clone(),
    };
    let doubt_id = state
        .store
        .create(collections::DOUBT, Document::from_record(&doubt)?)?;

    Ok(Json(PhotoDoubtResponse {
        doubt_id,
        ocr_text,
        answer,
    }))
}

/// Keep the status axum assigns (413 for oversized bodies, 400 for malformed ones).
fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::Rejected(e.status(), e.body_text())
}

// =====================================================
// Generators
// =====================================================

// POST /flashcards
pub async fn generate_flashcards(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FlashcardRequest>,
) -> Result<Json<FlashcardResponse>, ApiError> {
    let flashcard = Flashcard {
        items: templates::flashcard_items(req.topic.as_deref(), req.count),
        user_id: req.user_id,
        subject: req.subject,
        topic: req.topic,
    };
    let flashcard_id = state
        .store
        .create(collections::FLASHCARD, Document::from_record(&flashcard)?)?;
    Ok(Json(FlashcardResponse {
        flashcard_id,
        items: flashcard.items,
    }))
}

// POST /quiz
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = Quiz {
        questions: templates::quiz_questions(&req.topic, req.count),
        user_id: req.user_id,
        topic: req.topic,
    };
    let quiz_id = state
        .store
        .create(collections::QUIZ, Document::from_record(&quiz)?)?;
    Ok(Json(QuizResponse {
        quiz_id,
        questions: quiz.questions,
    }))
}

// POST /planner
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    let plan = StudyPlan {
        tasks: templates::plan_tasks(req.daily_minutes, &req.subjects),
        user_id: req.user_id,
        exam_date: req.exam_date,
        daily_minutes: req.daily_minutes,
        subjects: req.subjects,
    };
    let plan_id = state
        .store
        .create(collections::STUDY_PLAN, Document::from_record(&plan)?)?;
    Ok(Json(PlanResponse {
        plan_id,
        tasks: plan.tasks,
    }))
}

// POST /summary
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let (bullets, explanation) = templates::summarize(&req.text);
    let summary = NoteSummary {
        user_id: req.user_id,
        subject: req.subject,
        text: req.text,
        bullets,
        explanation,
    };
    let summary_id = state
        .store
        .create(collections::NOTE_SUMMARY, Document::from_record(&summary)?)?;
    Ok(Json(SummaryResponse {
        summary_id,
        bullets: summary.bullets,
        explanation: summary.explanation,
    }))
}

// =====================================================
// Library
// =====================================================

// GET /library/:user_id
pub async fn library(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<LibraryResponse>, ApiError> {
    let store = &state.store;
    let filter = Filter::new().eq("user_id", user_id);

    Ok(Json(LibraryResponse {
        recent_doubts: store.find(collections::DOUBT, &filter, Some(10))?,
        flashcards: store.find(collections::FLASHCARD, &filter, Some(10))?,
        quizzes: store.find(collections::QUIZ, &filter, Some(10))?,
        plans: store.find(collections::STUDY_PLAN, &filter, Some(5))?,
        summaries: store.find(collections::NOTE_SUMMARY, &filter, Some(10))?,
    }))
}
