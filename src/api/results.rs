use rocket::{serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::auth::AuthToken,
        common::{QuestionId, SurveyId},
        db::{store::MongoStore, survey::Survey},
        mongodb::Coll,
    },
    results::{compute_question_results, QuestionResults},
};

use super::surveys::owned_survey;

pub fn routes() -> Vec<Route> {
    routes![get_question_results]
}

#[get("/surveys/<survey_id>/questions/<question_id>/results")]
async fn get_question_results(
    token: AuthToken,
    survey_id: SurveyId,
    question_id: QuestionId,
    surveys: Coll<Survey>,
    store: MongoStore,
) -> Result<Json<QuestionResults>> {
    // Results are only visible to the survey's owner.
    surveys
        .find_one(owned_survey(survey_id, &token), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Survey {}", survey_id)))?;

    let results = compute_question_results(&store, survey_id, question_id).await?;
    Ok(Json(results))
}
