use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
};
use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Coll;

/// The counter that allocates survey IDs.
pub const SURVEY_ID_COUNTER: &str = "survey_id";
/// The counter that allocates question IDs.
pub const QUESTION_ID_COUNTER: &str = "question_id";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Atomically retrieve the next value of the counter with the given ID.
    pub async fn next(counters: &Coll<Counter>, id: &str) -> Result<u32> {
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options: FindOneAndUpdateOptions = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| {
                Error::Status(
                    Status::InternalServerError,
                    format!("Failed to find counter with ID {}", id),
                )
            })?;
        Ok(counter.next)
    }
}

/// Ensure the survey and question ID counters exist, starting at 1.
///
/// This operation is idempotent.
pub async fn ensure_id_counters_exist(
    counters: &Coll<Counter>,
) -> std::result::Result<(), DbError> {
    for id in [SURVEY_ID_COUNTER, QUESTION_ID_COUNTER] {
        let update = doc! {
            "$setOnInsert": { "next": 1 }
        };
        let options = UpdateOptions::builder().upsert(true).build();
        counters
            .update_one(doc! { "_id": id }, update, options)
            .await?;
    }
    Ok(())
}
