use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{Question, QuestionId, SurveyId, SurveyState},
    mongodb::{serde_option_chrono_datetime, Id},
};

/// Core survey data, as stored in the database.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct SurveyCore {
    /// Survey title, unique among the owner's surveys.
    pub title: String,
    /// The user that authored this survey.
    pub owner: Id,
    /// Lifecycle state.
    pub state: SurveyState,
    /// When the survey was last published, if it currently is.
    #[serde(
        default,
        with = "serde_option_chrono_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,
    /// Survey questions, in authoring order.
    pub questions: Vec<Question>,
}

impl SurveyCore {
    /// Create a new, unpublished survey with no questions.
    pub fn new(title: String, owner: Id) -> Self {
        Self {
            title,
            owner,
            state: SurveyState::Unpublished,
            published_at: None,
            questions: Vec::new(),
        }
    }

    /// Look up a question by ID.
    pub fn question(&self, question_id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

/// A survey from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Survey {
    #[serde(rename = "_id")]
    pub id: SurveyId,
    #[serde(flatten)]
    pub survey: SurveyCore,
}

impl Deref for Survey {
    type Target = SurveyCore;

    fn deref(&self) -> &Self::Target {
        &self.survey
    }
}

impl DerefMut for Survey {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.survey
    }
}
