//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.
//! datetimes are serialised in MongoDB's own format.

pub mod answer;
pub mod participant;
pub mod store;
pub mod survey;
pub mod user;
