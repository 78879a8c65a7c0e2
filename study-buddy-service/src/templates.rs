//! Rule-based content generators. Everything here is string templating over
//! the request; nothing is learned or looked up.

use study_buddy_types::{
    ChatAction, FlashcardItem, Language, LoginRequest, Provider, QuestionType, QuizLength,
    QuizQuestion, StudyTask, User,
};

const DEFAULT_USER_NAME: &str = "Student";
const DEFAULT_FLASHCARD_TOPIC: &str = "topic";
const DEFAULT_PHOTO_NAME: &str = "image.jpg";
const MAX_FLASHCARDS: i64 = 20;
const SUMMARY_BULLETS: usize = 5;
const SUMMARY_EXPLANATION: &str =
    "Short explanation combining the key points in simple language.";

/// New user record for a login. The identifier lands in `email` or `phone`
/// depending on the provider; google logins keep neither.
pub fn login_user(req: &LoginRequest) -> User {
    User {
        name: req
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
        email: (req.provider == Provider::Email).then(|| req.identifier.clone()),
        phone: (req.provider == Provider::Phone).then(|| req.identifier.clone()),
        provider: req.provider,
        preferred_language: Language::English,
    }
}

/// Text answer for a chat message. Only called for the answer-producing
/// actions; flashcard and quiz actions use their own generators.
pub fn chat_answer(message: &str, action: Option<ChatAction>) -> String {
    match action {
        Some(ChatAction::Explain10) => format!(
            "Imagine you are 10: {} means we break it into super simple ideas and examples so it's easy to get.",
            message
        ),
        Some(ChatAction::Simplify) => {
            format!("Simplified: {} in plain words with fewer steps.", message)
        }
        _ => format!(
            "Answer for '{}': here's a clear explanation with steps where needed.",
            message
        ),
    }
}

pub fn chat_flashcards(message: &str) -> Vec<FlashcardItem> {
    vec![
        FlashcardItem {
            question: format!("What is: {}?", message),
            answer: "Definition in 1-2 lines".to_string(),
        },
        FlashcardItem {
            question: format!("Why is {} important?", message),
            answer: "Key reason".to_string(),
        },
    ]
}

pub fn chat_quiz(message: &str) -> Vec<QuizQuestion> {
    vec![
        short_question(format!("Explain {} in one line", message)),
        mcq_question(format!("Which is true about {}?", message)),
    ]
}

/// `count` is clamped to 1..=20.
pub fn flashcard_items(topic: Option<&str>, count: i64) -> Vec<FlashcardItem> {
    let topic = topic.unwrap_or(DEFAULT_FLASHCARD_TOPIC);
    (1..=count.clamp(1, MAX_FLASHCARDS))
        .map(|i| FlashcardItem {
            question: format!("Q{} about {}", i, topic),
            answer: "Concise answer".to_string(),
        })
        .collect()
}

/// Alternates mcq/short, starting with mcq.
pub fn quiz_questions(topic: &str, length: QuizLength) -> Vec<QuizQuestion> {
    (0..length.count())
        .map(|i| {
            if i % 2 == 0 {
                mcq_question(format!("MCQ on {} #{}", topic, i + 1))
            } else {
                short_question(format!("Short answer on {} #{}", topic, i + 1))
            }
        })
        .collect()
}

fn mcq_question(question: String) -> QuizQuestion {
    QuizQuestion {
        question,
        question_type: QuestionType::Mcq,
        options: Some(["A", "B", "C", "D"].iter().map(|o| o.to_string()).collect()),
        answer: Some("A".to_string()),
    }
}

fn short_question(question: String) -> QuizQuestion {
    QuizQuestion {
        question,
        question_type: QuestionType::Short,
        options: None,
        answer: None,
    }
}

/// One task per subject, splitting the daily minutes evenly (at least 1).
pub fn plan_tasks(daily_minutes: i64, subjects: &[String]) -> Vec<StudyTask> {
    let per_subject = (daily_minutes.div_euclid(subjects.len().max(1) as i64)).max(1);
    subjects
        .iter()
        .enumerate()
        .map(|(idx, subject)| StudyTask {
            date: format!("D+{}", idx + 1),
            subject: subject.clone(),
            topic: format!("Core concepts {}", idx + 1),
            minutes: per_subject,
        })
        .collect()
}

/// Bullets and explanation for a note. The note text itself is not read.
pub fn summarize(_text: &str) -> (Vec<String>, String) {
    let bullets = (1..=SUMMARY_BULLETS)
        .map(|i| format!("Key point {}", i))
        .collect();
    (bullets, SUMMARY_EXPLANATION.to_string())
}

/// Mock OCR over an uploaded photo: `(file name, recognized text, answer)`.
pub fn photo_doubt(filename: Option<&str>) -> (String, String, String) {
    let filename = filename
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_PHOTO_NAME)
        .to_string();
    let ocr_text = format!("Extracted text from {}", filename);
    let answer = format!(
        "Solution based on OCR: {}. If unclear, please retake a brighter photo.",
        ocr_text
    );
    (filename, ocr_text, answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_user_routes_identifier_by_provider() {
        let email = login_user(&LoginRequest {
            provider: Provider::Email,
            identifier: "asha@example.com".to_string(),
            name: None,
        });
        assert_eq!(email.name, "Student");
        assert_eq!(email.email.as_deref(), Some("asha@example.com"));
        assert!(email.phone.is_none());

        let phone = login_user(&LoginRequest {
            provider: Provider::Phone,
            identifier: "+91 98100 00000".to_string(),
            name: Some("Ravi".to_string()),
        });
        assert_eq!(phone.name, "Ravi");
        assert!(phone.email.is_none());
        assert_eq!(phone.phone.as_deref(), Some("+91 98100 00000"));

        let google = login_user(&LoginRequest {
            provider: Provider::Google,
            identifier: "g-123".to_string(),
            name: None,
        });
        assert!(google.email.is_none() && google.phone.is_none());
        assert_eq!(google.preferred_language, Language::English);
    }

    #[test]
    fn test_login_user_empty_name_falls_back_to_student() {
        let user = login_user(&LoginRequest {
            provider: Provider::Email,
            identifier: "asha@example.com".to_string(),
            name: Some(String::new()),
        });
        assert_eq!(user.name, "Student");
    }

    #[test]
    fn test_chat_answer_variants() {
        assert_eq!(
            chat_answer("photosynthesis", Some(ChatAction::Simplify)),
            "Simplified: photosynthesis in plain words with fewer steps."
        );
        let explained = chat_answer("gravity", Some(ChatAction::Explain10));
        assert!(explained.starts_with("Imagine you are 10: gravity"));
        assert_eq!(
            chat_answer("fractions", None),
            "Answer for 'fractions': here's a clear explanation with steps where needed."
        );
    }

    #[test]
    fn test_chat_quiz_starts_with_short() {
        let questions = chat_quiz("atoms");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question_type, QuestionType::Short);
        assert_eq!(questions[1].question_type, QuestionType::Mcq);
        assert_eq!(questions[1].answer.as_deref(), Some("A"));
    }

    #[test]
    fn test_flashcard_count_is_clamped() {
        assert_eq!(flashcard_items(Some("Cells"), 5).len(), 5);
        assert_eq!(flashcard_items(Some("Cells"), 25).len(), 20);
        assert_eq!(flashcard_items(Some("Cells"), 0).len(), 1);
        assert_eq!(flashcard_items(None, -3).len(), 1);

        let items = flashcard_items(None, 2);
        assert_eq!(items[0].question, "Q1 about topic");
        assert_eq!(items[1].question, "Q2 about topic");
        assert_eq!(items[1].answer, "Concise answer");
    }

    #[test]
    fn test_quiz_alternates_starting_with_mcq() {
        let questions = quiz_questions("Algebra", QuizLength::Five);
        let kinds: Vec<_> = questions.iter().map(|q| q.question_type).collect();
        assert_eq!(
            kinds,
            vec![
                QuestionType::Mcq,
                QuestionType::Short,
                QuestionType::Mcq,
                QuestionType::Short,
                QuestionType::Mcq,
            ]
        );
        assert_eq!(questions[0].question, "MCQ on Algebra #1");
        assert_eq!(questions[1].question, "Short answer on Algebra #2");
        assert!(questions[1].options.is_none());

        assert_eq!(quiz_questions("Algebra", QuizLength::Ten).len(), 10);
    }

    #[test]
    fn test_plan_splits_minutes_across_subjects() {
        let subjects = vec!["Math".to_string(), "Science".to_string()];
        let tasks = plan_tasks(40, &subjects);
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.minutes == 20));
        assert_eq!(tasks[1].date, "D+2");
        assert_eq!(tasks[1].subject, "Science");
        assert_eq!(tasks[1].topic, "Core concepts 2");

        let three: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(plan_tasks(10, &three)[0].minutes, 3);
        assert_eq!(plan_tasks(1, &three)[0].minutes, 1);
        assert!(plan_tasks(30, &[]).is_empty());
    }

    #[test]
    fn test_summary_has_five_bullets() {
        let (bullets, explanation) = summarize("Mitochondria is the powerhouse of the cell.");
        assert_eq!(bullets.len(), 5);
        assert_eq!(bullets[4], "Key point 5");
        assert!(!explanation.is_empty());
    }

    #[test]
    fn test_photo_doubt_defaults_file_name() {
        let (name, ocr, answer) = photo_doubt(None);
        assert_eq!(name, "image.jpg");
        assert_eq!(ocr, "Extracted text from image.jpg");
        assert_eq!(
            answer,
            "Solution based on OCR: Extracted text from image.jpg. If unclear, please retake a brighter photo."
        );
        assert_eq!(photo_doubt(Some("")).0, "image.jpg");
        assert_eq!(photo_doubt(Some("page1.png")).1, "Extracted text from page1.png");
    }
}
