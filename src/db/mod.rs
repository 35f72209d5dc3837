//! Database layer: models, repositories, and error mapping.
//!
//! Repositories borrow a [`sqlx::PgConnection`] for their lifetime and run
//! multi-statement operations inside transactions on that connection.

pub mod errors;
pub mod handlers;
pub mod models;
