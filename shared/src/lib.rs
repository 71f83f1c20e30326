//! Shared types for the tally bookkeeping backend
//!
//! Error taxonomy, the pagination envelope, and the model/request types
//! used by both the database layer and the API layer.

pub mod error;
pub mod models;
pub mod response;

pub use error::AppError;
