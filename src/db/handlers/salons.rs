//! Repository for beauty salon leads.

use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::{Page, Repository};
use crate::db::models::salons::{SalonCreateDBRequest, SalonDBResponse, SalonUpdateDBRequest};
use crate::types::SalonId;

/// Filter for listing salons.
#[derive(Debug, Clone, Default)]
pub struct SalonFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive substring match across the salon's text columns.
    pub search: Option<String>,
}

const SEARCH_COLUMNS: [&str; 6] = ["name", "address", "instagram", "email", "phone", "site"];

fn push_filters(query: &mut QueryBuilder<'static, Postgres>, filter: &SalonFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        query.push(" AND (");
        for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
            if i > 0 {
                query.push(" OR ");
            }
            query.push(*column);
            query.push(" ILIKE ");
            query.push_bind(pattern.clone());
        }
        query.push(")");
    }
}

fn select_query(filter: &SalonFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT * FROM salons WHERE 1=1");
    push_filters(&mut query, filter);
    query.push(" ORDER BY created_at DESC");
    query
}

fn count_query(filter: &SalonFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM salons WHERE 1=1");
    push_filters(&mut query, filter);
    query
}

/// Repository for salon operations.
pub struct Salons<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Salons<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl Repository for Salons<'_> {
    type CreateRequest = SalonCreateDBRequest;
    type UpdateRequest = SalonUpdateDBRequest;
    type Response = SalonDBResponse;
    type Id = SalonId;
    type Filter = SalonFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let taken: Option<(SalonId,)> =
            sqlx::query_as("SELECT id FROM salons WHERE LOWER(name) = LOWER($1)")
                .bind(&request.name)
                .fetch_optional(&mut *tx)
                .await?;
        if taken.is_some() {
            return Err(DbError::UniqueViolation {
                constraint: Some("salons_name_lower_unique".to_string()),
                table: Some("salons".to_string()),
                message: format!("A salon named '{}' already exists", request.name),
            });
        }

        let salon = sqlx::query_as::<_, SalonDBResponse>(
            r#"
            INSERT INTO salons (name, address, instagram, email, phone, site, unit_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.instagram)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.site)
        .bind(request.unit_count)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(salon)
    }

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let salon = sqlx::query_as::<_, SalonDBResponse>("SELECT * FROM salons WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(salon)
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Page<Self::Response>> {
        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&mut *self.db)
            .await?;

        let mut query = select_query(filter);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);
        query.push(" LIMIT ");
        query.push_bind(filter.limit);
        let items = query
            .build_query_as::<SalonDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;

        Ok(Page { items, total })
    }

    async fn list_all(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let items = select_query(filter)
            .build_query_as::<SalonDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;
        Ok(items)
    }

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, SalonDBResponse>(
            "SELECT * FROM salons WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if let Some(name) = &request.name
            && name != &current.name
        {
            let taken: Option<(SalonId,)> = sqlx::query_as(
                "SELECT id FROM salons WHERE LOWER(name) = LOWER($1) AND id != $2",
            )
            .bind(name)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
            if taken.is_some() {
                return Err(DbError::UniqueViolation {
                    constraint: Some("salons_name_lower_unique".to_string()),
                    table: Some("salons".to_string()),
                    message: format!("A salon named '{name}' already exists"),
                });
            }
        }

        let merged = request.apply(&current);
        let updated = sqlx::query_as::<_, SalonDBResponse>(
            r#"
            UPDATE salons
            SET name = $2, address = $3, instagram = $4, email = $5,
                phone = $6, site = $7, unit_count = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&merged.name)
        .bind(&merged.address)
        .bind(&merged.instagram)
        .bind(&merged.email)
        .bind(&merged.phone)
        .bind(&merged.site)
        .bind(merged.unit_count)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM salons WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_spans_every_text_column() {
        let filter = SalonFilter {
            skip: 0,
            limit: 10,
            search: Some("glow".to_string()),
        };
        let sql = select_query(&filter).into_sql();
        for column in SEARCH_COLUMNS {
            assert!(sql.contains(&format!("{column} ILIKE")), "missing {column}");
        }
        assert!(sql.ends_with("ORDER BY created_at DESC"));
    }

    #[test]
    fn no_search_means_no_ilike() {
        let sql = count_query(&SalonFilter::default()).into_sql();
        assert_eq!(sql, "SELECT COUNT(*) FROM salons WHERE 1=1");
    }
}
