use mongodb::{bson::doc, Database};
use rocket::{
    futures::TryStreamExt,
    request::{FromRequest, Outcome, Request},
    State,
};

use crate::{
    error::Result,
    model::{
        common::{Question, QuestionId, QuestionOption, SurveyId},
        db::{answer::Answer, participant::Participant, survey::Survey},
        mongodb::{u32_id_filter, Coll},
    },
    results::ResultsStore,
};

/// Results persistence backed by the MongoDB collections.
#[derive(Clone)]
pub struct MongoStore {
    surveys: Coll<Survey>,
    answers: Coll<Answer>,
    participants: Coll<Participant>,
}

impl MongoStore {
    pub fn from_db(db: &Database) -> Self {
        Self {
            surveys: Coll::from_db(db),
            answers: Coll::from_db(db),
            participants: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for MongoStore {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let db = req
            .guard::<&State<Database>>()
            .await
            .expect("Used MongoStore guard without database initialisation!");
        Outcome::Success(MongoStore::from_db(db))
    }
}

#[rocket::async_trait]
impl ResultsStore for MongoStore {
    async fn load_question(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Option<Question>> {
        let survey = self.surveys.find_one(u32_id_filter(survey_id), None).await?;
        Ok(survey.and_then(|s| s.question(question_id).cloned()))
    }

    async fn load_options(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Vec<QuestionOption>> {
        let question = self.load_question(survey_id, question_id).await?;
        Ok(question.map(|q| q.options).unwrap_or_default())
    }

    async fn load_answers_for_question(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>> {
        let filter = doc! {
            "survey_id": i64::from(survey_id),
            "question_id": i64::from(question_id),
        };
        let options = mongodb::options::FindOptions::builder()
            .sort(doc! { "_id": 1 })
            .build();
        let answers = self.answers.find(filter, options).await?.try_collect().await?;
        Ok(answers)
    }

    async fn participant_count(&self, survey_id: SurveyId) -> Result<u64> {
        let filter = doc! { "survey_id": i64::from(survey_id) };
        let count = self.participants.count_documents(filter, None).await?;
        Ok(count)
    }
}
