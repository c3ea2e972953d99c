//! API-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are (de)serialised in an HTTP-friendly way and
//! validated on the way in.

pub mod auth;
pub mod survey;
pub mod user;
