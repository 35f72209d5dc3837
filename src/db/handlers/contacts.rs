//! Repository for outbound contacts.
//!
//! Every operation is scoped to the owning user: a contact created by one
//! user is invisible to every other user, including admins.

use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use crate::db::errors::{DbError, Result};
use crate::db::handlers::clinics::insert_clinic;
use crate::db::handlers::repository::{Page, Repository};
use crate::db::models::clinics::ClinicDBResponse;
use crate::db::models::contacts::{
    ContactCreateDBRequest, ContactDBResponse, ContactUpdateDBRequest,
    ContactWithClinicsDBResponse, DEFAULT_STATUS,
};
use crate::types::{ContactId, UserId};

/// Filter for listing a user's contacts.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive substring match against name, specialty, and email.
    pub search: Option<String>,
}

fn push_filters(query: &mut QueryBuilder<'static, Postgres>, user_id: UserId, filter: &ContactFilter) {
    query.push(" AND user_id = ");
    query.push_bind(user_id);
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        query.push(" AND (name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR specialty ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR email ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}

fn select_query(user_id: UserId, filter: &ContactFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT * FROM contacts WHERE 1=1");
    push_filters(&mut query, user_id, filter);
    query.push(" ORDER BY created_at DESC");
    query
}

fn count_query(user_id: UserId, filter: &ContactFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM contacts WHERE 1=1");
    push_filters(&mut query, user_id, filter);
    query
}

/// Repository for contact operations, bound to one user.
pub struct Contacts<'c> {
    db: &'c mut PgConnection,
    user_id: UserId,
}

impl<'c> Contacts<'c> {
    pub fn new(db: &'c mut PgConnection, user_id: UserId) -> Self {
        Self { db, user_id }
    }

    /// Create a contact, any inline clinics, and the join rows between them,
    /// all in one transaction. A clinic name collision rolls everything back.
    pub async fn create_with_clinics(
        &mut self,
        request: &ContactCreateDBRequest,
    ) -> Result<ContactWithClinicsDBResponse> {
        let mut tx = self.db.begin().await?;

        let status = request.status.as_deref().unwrap_or(DEFAULT_STATUS);
        let contact = sqlx::query_as::<_, ContactDBResponse>(
            r#"
            INSERT INTO contacts (
                user_id, name, specialty, instagram, whatsapp, email,
                status, notes, address
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(self.user_id)
        .bind(&request.name)
        .bind(&request.specialty)
        .bind(&request.instagram)
        .bind(&request.whatsapp)
        .bind(&request.email)
        .bind(status)
        .bind(&request.notes)
        .bind(&request.address)
        .fetch_one(&mut *tx)
        .await?;

        let mut clinics = Vec::with_capacity(request.clinics.len());
        for clinic_request in &request.clinics {
            let clinic = insert_clinic(&mut tx, clinic_request).await?;
            sqlx::query("INSERT INTO contact_clinics (contact_id, clinic_id) VALUES ($1, $2)")
                .bind(contact.id)
                .bind(clinic.id)
                .execute(&mut *tx)
                .await?;
            clinics.push(clinic);
        }

        tx.commit().await?;
        Ok(ContactWithClinicsDBResponse { contact, clinics })
    }

    /// Clinics linked to one of this user's contacts.
    pub async fn linked_clinics(&mut self, id: ContactId) -> Result<Vec<ClinicDBResponse>> {
        let clinics = sqlx::query_as::<_, ClinicDBResponse>(
            r#"
            SELECT cl.*
            FROM clinics cl
            JOIN contact_clinics cc ON cc.clinic_id = cl.id
            JOIN contacts c ON c.id = cc.contact_id
            WHERE cc.contact_id = $1 AND c.user_id = $2
            ORDER BY cl.created_at DESC
            "#,
        )
        .bind(id)
        .bind(self.user_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(clinics)
    }
}

#[async_trait::async_trait]
impl Repository for Contacts<'_> {
    type CreateRequest = ContactCreateDBRequest;
    type UpdateRequest = ContactUpdateDBRequest;
    type Response = ContactDBResponse;
    type Id = ContactId;
    type Filter = ContactFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        Ok(self.create_with_clinics(request).await?.contact)
    }

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let contact = sqlx::query_as::<_, ContactDBResponse>(
            "SELECT * FROM contacts WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(self.user_id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(contact)
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Page<Self::Response>> {
        let total: i64 = count_query(self.user_id, filter)
            .build_query_scalar()
            .fetch_one(&mut *self.db)
            .await?;

        let mut query = select_query(self.user_id, filter);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);
        query.push(" LIMIT ");
        query.push_bind(filter.limit);
        let items = query
            .build_query_as::<ContactDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;

        Ok(Page { items, total })
    }

    async fn list_all(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let items = select_query(self.user_id, filter)
            .build_query_as::<ContactDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;
        Ok(items)
    }

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, ContactDBResponse>(
            "SELECT * FROM contacts WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(self.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        let merged = request.apply(&current);
        let updated = sqlx::query_as::<_, ContactDBResponse>(
            r#"
            UPDATE contacts
            SET name = $2, specialty = $3, instagram = $4, whatsapp = $5,
                email = $6, status = $7, notes = $8, address = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&merged.name)
        .bind(&merged.specialty)
        .bind(&merged.instagram)
        .bind(&merged.whatsapp)
        .bind(&merged.email)
        .bind(&merged.status)
        .bind(&merged.notes)
        .bind(&merged.address)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(self.user_id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn every_query_is_scoped_to_the_user() {
        let user_id = Uuid::new_v4();
        let filter = ContactFilter::default();
        let select = select_query(user_id, &filter).into_sql();
        let count = count_query(user_id, &filter).into_sql();
        assert!(select.contains("user_id = $1"));
        assert!(count.contains("user_id = $1"));
    }

    #[test]
    fn search_filter_matches_three_columns() {
        let filter = ContactFilter {
            search: Some("botox".to_string()),
            ..Default::default()
        };
        let sql = select_query(Uuid::new_v4(), &filter).into_sql();
        assert!(sql.contains("name ILIKE $2"));
        assert!(sql.contains("specialty ILIKE $3"));
        assert!(sql.contains("email ILIKE $4"));
    }
}
