use mongodb::Client;
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::survey::{encode_submission, AnswerSpec, PublishedSurvey},
        common::{SurveyId, SurveyState},
        db::{
            answer::NewAnswer,
            participant::NewParticipant,
            survey::Survey,
        },
        mongodb::{u32_id_filter, Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![get_published_survey, submit_answers]
}

/// A filter matching the given survey only if it is published.
fn published_survey(survey_id: SurveyId) -> mongodb::bson::Document {
    let mut filter = u32_id_filter(survey_id);
    filter.insert("state", SurveyState::Published);
    filter
}

#[get("/published/<survey_id>")]
async fn get_published_survey(
    survey_id: SurveyId,
    surveys: Coll<Survey>,
) -> Result<Json<PublishedSurvey>> {
    let survey = surveys
        .find_one(published_survey(survey_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Published survey {}", survey_id)))?;
    Ok(Json(survey.into()))
}

#[post("/published/<survey_id>/submissions", data = "<answers>", format = "json")]
async fn submit_answers(
    survey_id: SurveyId,
    answers: Json<Vec<AnswerSpec>>,
    surveys: Coll<Survey>,
    new_participants: Coll<NewParticipant>,
    new_answers: Coll<NewAnswer>,
    db_client: &State<Client>,
) -> Result<()> {
    let survey = surveys
        .find_one(published_survey(survey_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Published survey {}", survey_id)))?;

    // Validate before writing anything.
    let encoded = encode_submission(&survey.questions, &answers)?;

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let participant_id: Id = new_participants
        .insert_one_with_session(NewParticipant::new(survey_id), None, &mut session)
        .await?
        .inserted_id
        .as_object_id()
        .unwrap() // Safe because the ID comes directly from the database.
        .into();

    let answer_docs = encoded
        .into_iter()
        .map(|(question_id, value)| NewAnswer {
            survey_id,
            question_id,
            participant_id,
            value,
        })
        .collect::<Vec<_>>();
    if !answer_docs.is_empty() {
        new_answers
            .insert_many_with_session(&answer_docs, None, &mut session)
            .await?;
    }

    session.commit_transaction().await?;
    Ok(())
}
