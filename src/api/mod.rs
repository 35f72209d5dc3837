//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): registration, login, logout
//! - **Clinics** (`/api/v1/clinics/*`): clinic lead CRUD, filtering, CSV export
//! - **Salons** (`/api/v1/salons/*`): salon lead CRUD, filtering, CSV export
//! - **Contacts** (`/api/v1/contacts/*`): per-user outbound contact CRUD
//! - **Messaging** (`/api/v1/messages`): WhatsApp send proxy
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! Interactive documentation is served at `/docs` when the server is running.

pub mod handlers;
pub mod models;
