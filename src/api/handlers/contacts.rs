//! HTTP handlers for outbound contacts.
//!
//! All operations run as the authenticated user; a contact belonging to a
//! different user behaves exactly like one that doesn't exist.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    api::models::{
        contacts::{
            ContactCreate, ContactDetailResponse, ContactResponse, ContactUpdate,
            ListContactsQuery, SUGGESTED_STATUSES,
        },
        pagination::PaginatedResponse,
        users::CurrentUser,
    },
    db::handlers::{
        Repository,
        contacts::{ContactFilter, Contacts},
    },
    errors::Error,
    export,
    types::ContactId,
};

fn build_filter(query: &ListContactsQuery) -> ContactFilter {
    ContactFilter {
        skip: query.pagination.skip(),
        limit: query.pagination.limit(),
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
    }
}

/// List the caller's contacts (JSON page or CSV export)
#[utoipa::path(
    get,
    path = "/contacts",
    tag = "contacts",
    params(ListContactsQuery),
    responses(
        (status = 200, description = "Paginated contacts or CSV attachment", body = PaginatedResponse<ContactResponse>),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_contacts(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListContactsQuery>,
) -> Result<Response, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Contacts::new(&mut pool_conn, user.id);
    let filter = build_filter(&query);

    if export::requested(query.format.as_deref()) {
        let rows = repo.list_all(&filter).await?;
        return Ok(export::attachment(&rows));
    }

    let page = repo.list(&filter).await?;
    let items: Vec<ContactResponse> = page.items.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(items, &query.pagination, page.total)).into_response())
}

/// Suggested status labels for the status field
#[utoipa::path(
    get,
    path = "/contacts/statuses",
    tag = "contacts",
    responses((status = 200, description = "Suggested status labels", body = Vec<String>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_statuses(_user: CurrentUser) -> Json<Vec<&'static str>> {
    Json(SUGGESTED_STATUSES.to_vec())
}

/// Create a contact, optionally with new clinics linked in the same transaction
#[utoipa::path(
    post,
    path = "/contacts",
    tag = "contacts",
    request_body = ContactCreate,
    responses(
        (status = 201, description = "Contact created", body = ContactDetailResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "A nested clinic name conflicts; nothing is created"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ContactCreate>,
) -> Result<(StatusCode, Json<ContactDetailResponse>), Error> {
    let db_request = request.into_db_request()?;
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Contacts::new(&mut pool_conn, user.id);
    let created = repo.create_with_clinics(&db_request).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get one of the caller's contacts with its linked clinics
#[utoipa::path(
    get,
    path = "/contacts/{id}",
    tag = "contacts",
    params(("id" = String, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact details", body = ContactDetailResponse),
        (status = 404, description = "Contact not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id, contact_id = %id))]
pub async fn get_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<ContactId>,
) -> Result<Json<ContactDetailResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Contacts::new(&mut pool_conn, user.id);

    let contact = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Contact".to_string(),
        id: id.to_string(),
    })?;
    let clinics = repo.linked_clinics(id).await?;

    Ok(Json(ContactDetailResponse {
        contact: contact.into(),
        clinics: clinics.into_iter().map(Into::into).collect(),
    }))
}

/// Partially update one of the caller's contacts
#[utoipa::path(
    put,
    path = "/contacts/{id}",
    tag = "contacts",
    params(("id" = String, Path, description = "Contact ID")),
    request_body = ContactUpdate,
    responses(
        (status = 200, description = "Contact updated", body = ContactResponse),
        (status = 404, description = "Contact not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id, contact_id = %id))]
pub async fn update_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<ContactId>,
    Json(request): Json<ContactUpdate>,
) -> Result<Json<ContactResponse>, Error> {
    let db_request = request.into_db_request()?;
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Contacts::new(&mut pool_conn, user.id);

    match repo.update(id, &db_request).await {
        Ok(contact) => Ok(Json(contact.into())),
        Err(crate::db::errors::DbError::NotFound) => Err(Error::NotFound {
            resource: "Contact".to_string(),
            id: id.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Delete one of the caller's contacts
#[utoipa::path(
    delete,
    path = "/contacts/{id}",
    tag = "contacts",
    params(("id" = String, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact deleted"),
        (status = 404, description = "Contact not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id, contact_id = %id))]
pub async fn delete_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<ContactId>,
) -> Result<Json<serde_json::Value>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Contacts::new(&mut pool_conn, user.id);

    if repo.delete(id).await? {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(Error::NotFound {
            resource: "Contact".to_string(),
            id: id.to_string(),
        })
    }
}
