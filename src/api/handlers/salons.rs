//! HTTP handlers for beauty salon leads.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        salons::{ListSalonsQuery, SalonCreate, SalonResponse, SalonUpdate},
        users::CurrentUser,
    },
    db::handlers::{
        Repository,
        salons::{SalonFilter, Salons},
    },
    errors::Error,
    export,
    types::SalonId,
};

fn build_filter(query: &ListSalonsQuery) -> SalonFilter {
    SalonFilter {
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

/// List salons (JSON page or CSV export)
#[utoipa::path(
    get,
    path = "/salons",
    tag = "salons",
    params(ListSalonsQuery),
    responses(
        (status = 200, description = "Paginated salons or CSV attachment", body = PaginatedResponse<SalonResponse>),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_salons(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListSalonsQuery>,
) -> Result<Response, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Salons::new(&mut pool_conn);
    let filter = build_filter(&query);

    if export::requested(query.format.as_deref()) {
        let rows = repo.list_all(&filter).await?;
        return Ok(export::attachment(&rows));
    }

    let page = repo.list(&filter).await?;
    let items: Vec<SalonResponse> = page.items.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(items, &query.pagination, page.total)).into_response())
}

/// Create a salon
#[utoipa::path(
    post,
    path = "/salons",
    tag = "salons",
    request_body = SalonCreate,
    responses(
        (status = 201, description = "Salon created", body = SalonResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "A salon with this name already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_salon(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<SalonCreate>,
) -> Result<(StatusCode, Json<SalonResponse>), Error> {
    let db_request = request.into_db_request()?;
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Salons::new(&mut pool_conn);
    let salon = repo.create(&db_request).await?;
    Ok((StatusCode::CREATED, Json(salon.into())))
}

/// Get a salon
#[utoipa::path(
    get,
    path = "/salons/{id}",
    tag = "salons",
    params(("id" = String, Path, description = "Salon ID")),
    responses(
        (status = 200, description = "Salon details", body = SalonResponse),
        (status = 404, description = "Salon not found"),
    )
)]
#[tracing::instrument(skip_all, fields(salon_id = %id))]
pub async fn get_salon(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<SalonId>,
) -> Result<Json<SalonResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Salons::new(&mut pool_conn);

    let salon = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Salon".to_string(),
        id: id.to_string(),
    })?;
    Ok(Json(salon.into()))
}

/// Partially update a salon
#[utoipa::path(
    put,
    path = "/salons/{id}",
    tag = "salons",
    params(("id" = String, Path, description = "Salon ID")),
    request_body = SalonUpdate,
    responses(
        (status = 200, description = "Salon updated", body = SalonResponse),
        (status = 404, description = "Salon not found"),
        (status = 409, description = "A salon with this name already exists"),
    )
)]
#[tracing::instrument(skip_all, fields(salon_id = %id))]
pub async fn update_salon(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<SalonId>,
    Json(request): Json<SalonUpdate>,
) -> Result<Json<SalonResponse>, Error> {
    let db_request = request.into_db_request()?;
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Salons::new(&mut pool_conn);

    match repo.update(id, &db_request).await {
        Ok(salon) => Ok(Json(salon.into())),
        Err(crate::db::errors::DbError::NotFound) => Err(Error::NotFound {
            resource: "Salon".to_string(),
            id: id.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Delete a salon
#[utoipa::path(
    delete,
    path = "/salons/{id}",
    tag = "salons",
    params(("id" = String, Path, description = "Salon ID")),
    responses(
        (status = 200, description = "Salon deleted"),
        (status = 404, description = "Salon not found"),
    )
)]
#[tracing::instrument(skip_all, fields(salon_id = %id))]
pub async fn delete_salon(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<SalonId>,
) -> Result<Json<serde_json::Value>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Salons::new(&mut pool_conn);

    if repo.delete(id).await? {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(Error::NotFound {
            resource: "Salon".to_string(),
            id: id.to_string(),
        })
    }
}
