//! HTTP handlers for clinic leads.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    api::models::{
        clinics::{ClinicCreate, ClinicDetailResponse, ClinicResponse, ClinicUpdate, ListClinicsQuery},
        pagination::PaginatedResponse,
        users::CurrentUser,
    },
    db::handlers::{
        Repository,
        clinics::{ClinicFilter, Clinics, ProspectChannel},
    },
    errors::Error,
    export,
    types::ClinicId,
};

/// Parse the comma-separated `missing` parameter, dropping unknown tokens.
fn parse_missing(missing: Option<&str>) -> Vec<ProspectChannel> {
    missing
        .map(|tokens| {
            tokens
                .split(',')
                .filter_map(ProspectChannel::from_token)
                .collect()
        })
        .unwrap_or_default()
}

fn build_filter(query: &ListClinicsQuery) -> ClinicFilter {
    ClinicFilter {
        skip: query.pagination.skip(),
        limit: query.pagination.limit(),
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        missing: parse_missing(query.missing.as_deref()),
    }
}

/// List clinics (JSON page or CSV export)
#[utoipa::path(
    get,
    path = "/clinics",
    tag = "clinics",
    params(ListClinicsQuery),
    responses(
        (status = 200, description = "Paginated clinics or CSV attachment", body = PaginatedResponse<ClinicResponse>),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_clinics(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListClinicsQuery>,
) -> Result<Response, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clinics::new(&mut pool_conn);
    let filter = build_filter(&query);

    if export::requested(query.format.as_deref()) {
        let rows = repo.list_all(&filter).await?;
        return Ok(export::attachment(&rows));
    }

    let page = repo.list(&filter).await?;
    let items: Vec<ClinicResponse> = page.items.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(items, &query.pagination, page.total)).into_response())
}

/// Create a clinic
#[utoipa::path(
    post,
    path = "/clinics",
    tag = "clinics",
    request_body = ClinicCreate,
    responses(
        (status = 201, description = "Clinic created", body = ClinicResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "A clinic with this name already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_clinic(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<ClinicCreate>,
) -> Result<(StatusCode, Json<ClinicResponse>), Error> {
    let db_request = request.into_db_request()?;
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clinics::new(&mut pool_conn);
    let clinic = repo.create(&db_request).await?;
    Ok((StatusCode::CREATED, Json(clinic.into())))
}

/// Get a clinic and its linked contacts
#[utoipa::path(
    get,
    path = "/clinics/{id}",
    tag = "clinics",
    params(("id" = String, Path, description = "Clinic ID")),
    responses(
        (status = 200, description = "Clinic details", body = ClinicDetailResponse),
        (status = 404, description = "Clinic not found"),
    )
)]
#[tracing::instrument(skip_all, fields(clinic_id = %id))]
pub async fn get_clinic(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<ClinicId>,
) -> Result<Json<ClinicDetailResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clinics::new(&mut pool_conn);

    let clinic = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Clinic".to_string(),
        id: id.to_string(),
    })?;
    let contacts = repo.linked_contacts(id).await?;

    Ok(Json(ClinicDetailResponse {
        clinic: clinic.into(),
        contacts: contacts.into_iter().map(Into::into).collect(),
    }))
}

/// Update a clinic (only supplied fields change)
#[utoipa::path(
    put,
    path = "/clinics/{id}",
    tag = "clinics",
    params(("id" = String, Path, description = "Clinic ID")),
    request_body = ClinicUpdate,
    responses(
        (status = 200, description = "Clinic updated", body = ClinicResponse),
        (status = 404, description = "Clinic not found"),
        (status = 409, description = "A clinic with this name already exists"),
    )
)]
#[tracing::instrument(skip_all, fields(clinic_id = %id))]
pub async fn update_clinic(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<ClinicId>,
    Json(request): Json<ClinicUpdate>,
) -> Result<Json<ClinicResponse>, Error> {
    let db_request = request.into_db_request()?;
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clinics::new(&mut pool_conn);

    match repo.update(id, &db_request).await {
        Ok(clinic) => Ok(Json(clinic.into())),
        Err(crate::db::errors::DbError::NotFound) => Err(Error::NotFound {
            resource: "Clinic".to_string(),
            id: id.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Delete a clinic
#[utoipa::path(
    delete,
    path = "/clinics/{id}",
    tag = "clinics",
    params(("id" = String, Path, description = "Clinic ID")),
    responses(
        (status = 200, description = "Clinic deleted"),
        (status = 400, description = "Clinic is linked to contacts"),
        (status = 404, description = "Clinic not found"),
    )
)]
#[tracing::instrument(skip_all, fields(clinic_id = %id))]
pub async fn delete_clinic(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<ClinicId>,
) -> Result<Json<serde_json::Value>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clinics::new(&mut pool_conn);

    if repo.delete(id).await? {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(Error::NotFound {
            resource: "Clinic".to_string(),
            id: id.to_string(),
        })
    }
}
