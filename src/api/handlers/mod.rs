//! HTTP request handlers for all API endpoints.
//!
//! Each handler is responsible for request validation, authentication (via
//! the [`CurrentUser`](crate::api::models::users::CurrentUser) extractor
//! argument), business logic execution through the database repositories,
//! and response serialization.
//!
//! # Handler Modules
//!
//! - [`auth`]: registration, login, and logout
//! - [`clinics`]: clinic lead CRUD, list filtering, and CSV export
//! - [`salons`]: salon lead CRUD, list filtering, and CSV export
//! - [`contacts`]: per-user outbound contact CRUD and CSV export
//! - [`messaging`]: WhatsApp send proxy

pub mod auth;
pub mod clinics;
pub mod contacts;
pub mod messaging;
pub mod salons;
