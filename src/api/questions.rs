use mongodb::{
    bson::{doc, to_bson},
    Client,
};
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::{auth::AuthToken, survey::QuestionSpec},
        common::{Question, QuestionId, SurveyId},
        db::{answer::Answer, survey::Survey},
        mongodb::{Coll, Counter, QUESTION_ID_COUNTER},
    },
};

use super::surveys::owned_survey;

pub fn routes() -> Vec<Route> {
    routes![add_question, update_question, delete_question]
}

#[post("/surveys/<survey_id>/questions", data = "<spec>", format = "json")]
async fn add_question(
    token: AuthToken,
    survey_id: SurveyId,
    spec: Json<QuestionSpec>,
    surveys: Coll<Survey>,
    counters: Coll<Counter>,
) -> Result<Json<Question>> {
    let question = spec
        .0
        .into_question(Counter::next(&counters, QUESTION_ID_COUNTER).await?)?;

    let update = doc! {
        "$push": {
            "questions": to_bson(&question).expect("Serialisation is infallible"),
        }
    };
    let result = surveys
        .update_one(owned_survey(survey_id, &token), update, None)
        .await?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Survey {}", survey_id)));
    }

    Ok(Json(question))
}

#[put(
    "/surveys/<survey_id>/questions/<question_id>",
    data = "<spec>",
    format = "json"
)]
async fn update_question(
    token: AuthToken,
    survey_id: SurveyId,
    question_id: QuestionId,
    spec: Json<QuestionSpec>,
    surveys: Coll<Survey>,
    answers: Coll<Answer>,
    db_client: &State<Client>,
) -> Result<Json<Question>> {
    let question = spec.0.into_question(question_id)?;

    // The has-answers check and the update must see the same state, or a
    // submission racing this request could slip answers under a structural
    // change.
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let survey = surveys
        .find_one_with_session(owned_survey(survey_id, &token), None, &mut session)
        .await?
        .ok_or_else(|| Error::not_found(format!("Survey {}", survey_id)))?;
    let existing = survey.question(question_id).ok_or_else(|| {
        Error::not_found(format!("Question {} in survey {}", question_id, survey_id))
    })?;

    // Changing the answer structure would silently corrupt recorded answers,
    // so only the text may change once any exist.
    if !question.same_structure(existing) {
        let answer_filter = doc! {
            "survey_id": i64::from(survey_id),
            "question_id": i64::from(question_id),
        };
        let answer_count = answers
            .count_documents_with_session(answer_filter, None, &mut session)
            .await?;
        if answer_count > 0 {
            return Err(Error::bad_request(format!(
                "Question {} already has answers; only its text can change",
                question_id
            )));
        }
    }

    let mut filter = owned_survey(survey_id, &token);
    filter.insert("questions.id", i64::from(question_id));
    let update = doc! {
        "$set": {
            "questions.$": to_bson(&question).expect("Serialisation is infallible"),
        }
    };
    surveys
        .update_one_with_session(filter, update, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(Json(question))
}

#[delete("/surveys/<survey_id>/questions/<question_id>")]
async fn delete_question(
    token: AuthToken,
    survey_id: SurveyId,
    question_id: QuestionId,
    surveys: Coll<Survey>,
    answers: Coll<Answer>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let update = doc! {
        "$pull": {
            "questions": { "id": i64::from(question_id) },
        }
    };
    let result = surveys
        .update_one_with_session(owned_survey(survey_id, &token), update, None, &mut session)
        .await?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Survey {}", survey_id)));
    }
    if result.modified_count == 0 {
        return Err(Error::not_found(format!(
            "Question {} in survey {}",
            question_id, survey_id
        )));
    }

    // The question's answers go with it.
    let answer_filter = doc! {
        "survey_id": i64::from(survey_id),
        "question_id": i64::from(question_id),
    };
    answers
        .delete_many_with_session(answer_filter, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(())
}
