use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::SurveyId, mongodb::Id};

/// Core participant data: one anonymous survey submission.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ParticipantCore {
    /// The survey this participant responded to.
    pub survey_id: SurveyId,
    /// When the submission happened.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ParticipantCore {
    /// Create a participant record for the given survey, timestamped now.
    pub fn new(survey_id: SurveyId) -> Self {
        Self {
            survey_id,
            created_at: Utc::now(),
        }
    }
}

/// A participant without an ID.
pub type NewParticipant = ParticipantCore;

/// A participant from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub participant: ParticipantCore,
}

impl Deref for Participant {
    type Target = ParticipantCore;

    fn deref(&self) -> &Self::Target {
        &self.participant
    }
}
