mod bson;
mod collection;
mod counter;
mod errors;

pub use bson::{serde_option_chrono_datetime, u32_id_filter, Id};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{
    ensure_id_counters_exist, Counter, QUESTION_ID_COUNTER, SURVEY_ID_COUNTER,
};
pub use errors::is_duplicate_key_error;
