use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::{QuestionId, SurveyId},
    mongodb::Id,
};

/// Core answer data: one participant's raw response to one question.
///
/// The `value` encoding depends on the question type: a single option ID for
/// `closed`, a comma-separated list of option IDs for `nominal`, free text
/// for `open`. Decoding happens in [`crate::results::normalize`].
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct AnswerCore {
    pub survey_id: SurveyId,
    pub question_id: QuestionId,
    pub participant_id: Id,
    pub value: String,
}

/// An answer without an ID.
pub type NewAnswer = AnswerCore;

/// An answer from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub answer: AnswerCore,
}

impl Deref for Answer {
    type Target = AnswerCore;

    fn deref(&self) -> &Self::Target {
        &self.answer
    }
}
