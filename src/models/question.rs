// src/models/question.rs

use serde::{Deserialize, Serialize};

/// One evaluable item inside an assessment.
/// Stored as part of the assessment's JSONB question list, so the
/// answer key travels with the question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The text shown to the student.
    pub prompt: String,

    /// Maximum score this question contributes.
    pub points: u32,

    /// Answer key, one variant per question type. The tag lands in the
    /// same JSON object as the other fields.
    #[serde(flatten)]
    pub key: AnswerKey,
}

/// Per-type answer key. Exactly one variant applies to a question, so
/// irrelevant key fields cannot exist by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AnswerKey {
    MultipleChoice { options: Vec<ChoiceOption> },
    TrueFalse { correct_answer: bool },
    FillInBlank { correct_answers: Vec<String> },
    /// No automatic key; real scores require manual review.
    Essay,
    Matching { pairs: Vec<MatchingPair> },
    Ordering { correct_order: Vec<String> },
}

impl AnswerKey {
    pub fn type_name(&self) -> &'static str {
        match self {
            AnswerKey::MultipleChoice { .. } => "multiple-choice",
            AnswerKey::TrueFalse { .. } => "true-false",
            AnswerKey::FillInBlank { .. } => "fill-in-blank",
            AnswerKey::Essay => "essay",
            AnswerKey::Matching { .. } => "matching",
            AnswerKey::Ordering { .. } => "ordering",
        }
    }

    /// Shape of the answer this key expects, for error messages.
    pub fn expected_shape(&self) -> &'static str {
        match self {
            AnswerKey::MultipleChoice { .. }
            | AnswerKey::FillInBlank { .. }
            | AnswerKey::Essay => "text",
            AnswerKey::TrueFalse { .. } => "boolean",
            AnswerKey::Matching { .. } => "pairs",
            AnswerKey::Ordering { .. } => "sequence",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub left: String,
    pub right: String,
}

/// A student's answer to one question. The JSON shape decides the
/// variant: booleans for true/false, strings for choice and blank
/// questions, arrays of pairs for matching, arrays of strings for
/// ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Boolean(bool),
    Text(String),
    Pairs(Vec<MatchingPair>),
    Sequence(Vec<String>),
}

impl SubmittedAnswer {
    pub fn shape_name(&self) -> &'static str {
        match self {
            SubmittedAnswer::Boolean(_) => "boolean",
            SubmittedAnswer::Text(_) => "text",
            SubmittedAnswer::Pairs(_) => "pairs",
            SubmittedAnswer::Sequence(_) => "sequence",
        }
    }
}

/// DTO for sending a question to an enrolled student (answer key
/// stripped).
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: &'static str,
    pub prompt: String,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_items: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_items: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
}

impl Question {
    /// Builds the public view. Matching right-hand items and ordering
    /// tokens are sorted so the response does not leak the key.
    pub fn view(&self) -> QuestionView {
        let mut view = QuestionView {
            id: self.id,
            question_type: self.key.type_name(),
            prompt: self.prompt.clone(),
            points: self.points,
            options: None,
            left_items: None,
            right_items: None,
            items: None,
        };
        match &self.key {
            AnswerKey::MultipleChoice { options } => {
                view.options = Some(options.iter().map(|o| o.text.clone()).collect());
            }
            AnswerKey::Matching { pairs } => {
                view.left_items = Some(pairs.iter().map(|p| p.left.clone()).collect());
                let mut rights: Vec<String> = pairs.iter().map(|p| p.right.clone()).collect();
                rights.sort();
                view.right_items = Some(rights);
            }
            AnswerKey::Ordering { correct_order } => {
                let mut items = correct_order.clone();
                items.sort();
                view.items = Some(items);
            }
            AnswerKey::TrueFalse { .. } | AnswerKey::FillInBlank { .. } | AnswerKey::Essay => {}
        }
        view
    }
}
