//! Authentication: password hashing, JWT session cookies, and the
//! [`current_user`] extractor that hands handlers the authenticated caller.
//!
//! Browser-based only: users log in via `/authentication/login` with
//! email/password and receive an HTTP-only session cookie carrying a signed
//! JWT. Every `/api/v1` handler takes a
//! [`CurrentUser`](crate::api::models::users::CurrentUser) argument, so a
//! request without a valid cookie is rejected with 401 before any data
//! access happens.

pub mod current_user;
pub mod password;
pub mod session;
