use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{
    answer::{Answer, NewAnswer},
    participant::{NewParticipant, Participant},
    survey::Survey,
    user::{NewUser, User},
};

use super::counter::Counter;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    ///
    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

// User collections
const USERS: &str = "users";
impl MongoCollection for User {
    const NAME: &'static str = USERS;
}
impl MongoCollection for NewUser {
    const NAME: &'static str = USERS;
}

// Survey collection
const SURVEYS: &str = "surveys";
impl MongoCollection for Survey {
    const NAME: &'static str = SURVEYS;
}

// Participant collections
const PARTICIPANTS: &str = "participants";
impl MongoCollection for Participant {
    const NAME: &'static str = PARTICIPANTS;
}
impl MongoCollection for NewParticipant {
    const NAME: &'static str = PARTICIPANTS;
}

// Answer collections
const ANSWERS: &str = "answers";
impl MongoCollection for Answer {
    const NAME: &'static str = ANSWERS;
}
impl MongoCollection for NewAnswer {
    const NAME: &'static str = ANSWERS;
}

// Counter collection
const COUNTERS: &str = "counters";
impl MongoCollection for Counter {
    const NAME: &'static str = COUNTERS;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // User collection.
    let user_index = IndexModel::builder()
        .keys(doc! {"username": 1})
        .options(unique.clone())
        .build();
    Coll::<User>::from_db(db)
        .create_index(user_index, None)
        .await?;

    // Survey collection: titles are unique per owner.
    let survey_index = IndexModel::builder()
        .keys(doc! {"owner": 1, "title": 1})
        .options(unique)
        .build();
    Coll::<Survey>::from_db(db)
        .create_index(survey_index, None)
        .await?;

    // Answer collection.
    let answer_index = IndexModel::builder()
        .keys(doc! {"survey_id": 1, "question_id": 1})
        .build();
    Coll::<Answer>::from_db(db)
        .create_index(answer_index, None)
        .await?;

    // Participant collection.
    let participant_index = IndexModel::builder().keys(doc! {"survey_id": 1}).build();
    Coll::<Participant>::from_db(db)
        .create_index(participant_index, None)
        .await?;

    Ok(())
}
