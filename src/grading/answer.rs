// src/grading/answer.rs

use crate::error::AppError;
use crate::models::enrollment::GradedAnswer;
use crate::models::question::{AnswerKey, Question, SubmittedAnswer};

/// Scores one submitted answer against one question's key.
///
/// Pure: the same (question, answer) pair always yields the same
/// result. No partial credit for any type. An answer whose JSON shape
/// does not fit the question type is a validation error, not an
/// incorrect answer.
pub fn grade(question: &Question, submitted: &SubmittedAnswer) -> Result<GradedAnswer, AppError> {
    let is_correct = match (&question.key, submitted) {
        // Equality on option text only; two options with identical
        // text are indistinguishable.
        (AnswerKey::MultipleChoice { options }, SubmittedAnswer::Text(text)) => {
            options.iter().any(|o| o.is_correct && o.text == *text)
        }

        (AnswerKey::TrueFalse { correct_answer }, SubmittedAnswer::Boolean(answer)) => {
            answer == correct_answer
        }

        (AnswerKey::FillInBlank { correct_answers }, SubmittedAnswer::Text(text)) => {
            let submitted = text.to_lowercase();
            correct_answers.iter().any(|a| a.to_lowercase() == submitted)
        }

        // Index-wise comparison: the pair at position i must equal the
        // key pair at position i, so a correct set submitted in a
        // different order scores incorrect.
        (AnswerKey::Matching { pairs }, SubmittedAnswer::Pairs(submitted)) => {
            submitted.len() == pairs.len()
                && submitted.iter().zip(pairs.iter()).all(|(a, b)| a == b)
        }

        (AnswerKey::Ordering { correct_order }, SubmittedAnswer::Sequence(sequence)) => {
            sequence == correct_order
        }

        // Essays accept any shape and always wait for manual review.
        (AnswerKey::Essay, _) => false,

        (key, answer) => {
            return Err(AppError::BadRequest(format!(
                "Question {} expects a {} answer, got {}",
                question.id,
                key.expected_shape(),
                answer.shape_name()
            )));
        }
    };

    Ok(GradedAnswer {
        question_id: question.id,
        answer: submitted.clone(),
        is_correct,
        earned_points: if is_correct { question.points } else { 0 },
    })
}
