use crate::{
    error::Result,
    model::{
        common::{Question, QuestionId, QuestionOption, SurveyId},
        db::answer::Answer,
    },
};

/// The persistence operations needed to compute question results.
///
/// Result computation deliberately goes through this narrow interface rather
/// than the collections directly, so the aggregation logic can be tested
/// against an in-memory implementation.
#[rocket::async_trait]
pub trait ResultsStore: Send + Sync {
    /// Load a single question of a survey, if both exist.
    async fn load_question(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Option<Question>>;

    /// Load the options of a question, in declaration order.
    ///
    /// Returns an empty list if the survey or question does not exist.
    async fn load_options(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Vec<QuestionOption>>;

    /// Load all answers recorded for a question, in submission order.
    async fn load_answers_for_question(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>>;

    /// Count the participants of a survey.
    async fn participant_count(&self, survey_id: SurveyId) -> Result<u64>;
}
