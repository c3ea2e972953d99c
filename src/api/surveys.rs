use chrono::Utc;
use mongodb::{
    bson::{self, doc},
    Client,
};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            survey::{SurveyDescription, SurveySpec, SurveySummary},
        },
        common::{SurveyId, SurveyState},
        db::{
            answer::Answer,
            participant::Participant,
            survey::{Survey, SurveyCore},
        },
        mongodb::{is_duplicate_key_error, u32_id_filter, Coll, Counter, SURVEY_ID_COUNTER},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        get_surveys,
        create_survey,
        get_survey,
        rename_survey,
        delete_survey,
        publish_survey,
        unpublish_survey,
    ]
}

/// A filter matching the given survey only if the given user owns it.
pub(super) fn owned_survey(survey_id: SurveyId, token: &AuthToken) -> bson::Document {
    let mut filter = u32_id_filter(survey_id);
    filter.insert("owner", *token.id);
    filter
}

#[get("/surveys")]
async fn get_surveys(
    token: AuthToken,
    surveys: Coll<Survey>,
    participants: Coll<Participant>,
) -> Result<Json<Vec<SurveySummary>>> {
    let owned: Vec<Survey> = surveys
        .find(doc! { "owner": *token.id }, None)
        .await?
        .try_collect()
        .await?;

    let mut summaries = Vec::with_capacity(owned.len());
    for survey in &owned {
        let participant_count = participants
            .count_documents(doc! { "survey_id": i64::from(survey.id) }, None)
            .await?;
        summaries.push(SurveySummary::new(survey, participant_count));
    }
    Ok(Json(summaries))
}

#[post("/surveys", data = "<spec>", format = "json")]
async fn create_survey(
    token: AuthToken,
    spec: Json<SurveySpec>,
    surveys: Coll<Survey>,
    counters: Coll<Counter>,
) -> Result<Json<SurveyDescription>> {
    let title = spec.0.into_title()?;

    let survey = Survey {
        id: Counter::next(&counters, SURVEY_ID_COUNTER).await?,
        survey: SurveyCore::new(title, token.id),
    };

    // The unique index on (owner, title) catches duplicates atomically.
    let result = surveys.insert_one(&survey, None).await;
    if is_duplicate_key_error(result.as_ref()) {
        return Err(Error::bad_request(format!(
            "Survey title already in use: {}",
            survey.title
        )));
    }
    result?;

    Ok(Json(survey.into()))
}

#[get("/surveys/<survey_id>")]
async fn get_survey(
    token: AuthToken,
    survey_id: SurveyId,
    surveys: Coll<Survey>,
) -> Result<Json<SurveyDescription>> {
    let survey = surveys
        .find_one(owned_survey(survey_id, &token), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Survey {}", survey_id)))?;
    Ok(Json(survey.into()))
}

#[put("/surveys/<survey_id>", data = "<spec>", format = "json")]
async fn rename_survey(
    token: AuthToken,
    survey_id: SurveyId,
    spec: Json<SurveySpec>,
    surveys: Coll<Survey>,
) -> Result<()> {
    let title = spec.0.into_title()?;

    let update = doc! {
        "$set": { "title": &title }
    };
    let result = surveys
        .update_one(owned_survey(survey_id, &token), update, None)
        .await;
    if is_duplicate_key_error(result.as_ref()) {
        return Err(Error::bad_request(format!(
            "Survey title already in use: {}",
            title
        )));
    }
    if result?.matched_count == 0 {
        return Err(Error::not_found(format!("Survey {}", survey_id)));
    }
    Ok(())
}

#[delete("/surveys/<survey_id>")]
async fn delete_survey(
    token: AuthToken,
    survey_id: SurveyId,
    surveys: Coll<Survey>,
    answers: Coll<Answer>,
    participants: Coll<Participant>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let result = surveys
        .delete_one_with_session(owned_survey(survey_id, &token), None, &mut session)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Survey {}", survey_id)));
    }

    // Answers and participants go with the survey.
    let by_survey = doc! { "survey_id": i64::from(survey_id) };
    answers
        .delete_many_with_session(by_survey.clone(), None, &mut session)
        .await?;
    participants
        .delete_many_with_session(by_survey, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(())
}

#[post("/surveys/<survey_id>/publish")]
async fn publish_survey(
    token: AuthToken,
    survey_id: SurveyId,
    surveys: Coll<Survey>,
) -> Result<()> {
    let mut filter = owned_survey(survey_id, &token);
    filter.insert("state", SurveyState::Unpublished);
    let update = doc! {
        "$set": {
            "state": SurveyState::Published,
            "published_at": bson::DateTime::from_chrono(Utc::now()),
        }
    };

    let result = surveys.update_one(filter, update, None).await?;
    if result.matched_count == 0 {
        return match surveys
            .find_one(owned_survey(survey_id, &token), None)
            .await?
        {
            Some(_) => Err(Error::bad_request(format!(
                "Survey {} is already published",
                survey_id
            ))),
            None => Err(Error::not_found(format!("Survey {}", survey_id))),
        };
    }
    Ok(())
}

#[post("/surveys/<survey_id>/unpublish")]
async fn unpublish_survey(
    token: AuthToken,
    survey_id: SurveyId,
    surveys: Coll<Survey>,
    answers: Coll<Answer>,
    participants: Coll<Participant>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let mut filter = owned_survey(survey_id, &token);
    filter.insert("state", SurveyState::Published);
    let update = doc! {
        "$set": { "state": SurveyState::Unpublished },
        "$unset": { "published_at": "" },
    };

    let result = surveys
        .update_one_with_session(filter, update, None, &mut session)
        .await?;
    if result.matched_count == 0 {
        return match surveys
            .find_one(owned_survey(survey_id, &token), None)
            .await?
        {
            Some(_) => Err(Error::bad_request(format!(
                "Survey {} is not published",
                survey_id
            ))),
            None => Err(Error::not_found(format!("Survey {}", survey_id))),
        };
    }

    // Unpublishing discards all participation.
    let by_survey = doc! { "survey_id": i64::from(survey_id) };
    answers
        .delete_many_with_session(by_survey.clone(), None, &mut session)
        .await?;
    participants
        .delete_many_with_session(by_survey, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(())
}
