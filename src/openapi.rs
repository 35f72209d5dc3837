//! OpenAPI documentation configuration.
//!
//! Aggregates every handler's `utoipa::path` annotation into a single
//! document, served interactively at `/docs`.

use utoipa::OpenApi;

use crate::api::handlers;
use crate::api::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "leadctl API",
        description = "Lead management for clinics, beauty salons, and outbound contacts",
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::clinics::list_clinics,
        handlers::clinics::create_clinic,
        handlers::clinics::get_clinic,
        handlers::clinics::update_clinic,
        handlers::clinics::delete_clinic,
        handlers::salons::list_salons,
        handlers::salons::create_salon,
        handlers::salons::get_salon,
        handlers::salons::update_salon,
        handlers::salons::delete_salon,
        handlers::contacts::list_contacts,
        handlers::contacts::list_statuses,
        handlers::contacts::create_contact,
        handlers::contacts::get_contact,
        handlers::contacts::update_contact,
        handlers::contacts::delete_contact,
        handlers::messaging::send_message,
    ),
    components(schemas(
        models::auth::AuthResponse,
        models::auth::AuthSuccessResponse,
        models::auth::LoginRequest,
        models::auth::RegisterRequest,
        models::clinics::ClinicCreate,
        models::clinics::ClinicDetailResponse,
        models::clinics::ClinicResponse,
        models::clinics::ClinicUpdate,
        models::contacts::ContactCreate,
        models::contacts::ContactDetailResponse,
        models::contacts::ContactResponse,
        models::contacts::ContactSummaryResponse,
        models::contacts::ContactUpdate,
        models::messaging::SendMessageRequest,
        models::pagination::PageMeta,
        models::salons::SalonCreate,
        models::salons::SalonResponse,
        models::salons::SalonUpdate,
        models::users::CurrentUser,
        models::users::UserResponse,
        crate::errors::FieldError,
    )),
    tags(
        (name = "authentication", description = "Session management"),
        (name = "clinics", description = "Clinic leads"),
        (name = "salons", description = "Beauty salon leads"),
        (name = "contacts", description = "Per-user outbound contacts"),
        (name = "messaging", description = "WhatsApp messaging proxy"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builds_and_covers_all_tags() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        for tag in ["authentication", "clinics", "salons", "contacts", "messaging"] {
            assert!(json.contains(tag), "missing tag {tag}");
        }
        assert!(json.contains("/clinics/{id}"));
        assert!(json.contains("/messages"));
    }
}
