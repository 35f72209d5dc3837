//! Repository for clinic leads.

use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::{Page, Repository};
use crate::db::models::clinics::{ClinicCreateDBRequest, ClinicDBResponse, ClinicUpdateDBRequest};
use crate::db::models::contacts::ContactSummaryDBResponse;
use crate::types::ClinicId;

/// One of the three outreach channels tracked per clinic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProspectChannel {
    Email,
    Call,
    Whatsapp,
}

impl ProspectChannel {
    /// Parse a single filter token. Unknown tokens yield `None` and are
    /// silently ignored by callers.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "email" => Some(Self::Email),
            "call" => Some(Self::Call),
            "whatsapp" => Some(Self::Whatsapp),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Email => "prospect_email",
            Self::Call => "prospect_call",
            Self::Whatsapp => "prospect_whatsapp",
        }
    }
}

/// Filter for listing clinics.
#[derive(Debug, Clone, Default)]
pub struct ClinicFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive substring match against name, location, and email.
    pub search: Option<String>,
    /// Only return clinics where every listed channel is still unmarked.
    pub missing: Vec<ProspectChannel>,
}

/// Appends the WHERE predicates shared by the page, count, and export
/// queries. The caller supplies the SELECT prefix.
fn push_filters(query: &mut QueryBuilder<'static, Postgres>, filter: &ClinicFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        query.push(" AND (name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR location ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR email ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
    for channel in &filter.missing {
        query.push(" AND ");
        query.push(channel.column());
        query.push(" = FALSE");
    }
}

fn select_query(filter: &ClinicFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT * FROM clinics WHERE 1=1");
    push_filters(&mut query, filter);
    query.push(" ORDER BY created_at DESC");
    query
}

fn count_query(filter: &ClinicFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM clinics WHERE 1=1");
    push_filters(&mut query, filter);
    query
}

/// Repository for clinic operations.
pub struct Clinics<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Clinics<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Contacts linked to a clinic, for the detail view.
    pub async fn linked_contacts(
        &mut self,
        id: ClinicId,
    ) -> Result<Vec<ContactSummaryDBResponse>> {
        let contacts = sqlx::query_as::<_, ContactSummaryDBResponse>(
            r#"
            SELECT c.id, c.name, c.specialty, c.status
            FROM contacts c
            JOIN contact_clinics cc ON cc.contact_id = c.id
            WHERE cc.clinic_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(contacts)
    }
}

#[async_trait::async_trait]
impl Repository for Clinics<'_> {
    type CreateRequest = ClinicCreateDBRequest;
    type UpdateRequest = ClinicUpdateDBRequest;
    type Response = ClinicDBResponse;
    type Id = ClinicId;
    type Filter = ClinicFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;
        let clinic = insert_clinic(&mut tx, request).await?;
        tx.commit().await?;
        Ok(clinic)
    }

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let clinic = sqlx::query_as::<_, ClinicDBResponse>("SELECT * FROM clinics WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(clinic)
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
            .build_query_as::<ClinicDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;

        Ok(Page { items, total })
    }

    async fn list_all(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let items = select_query(filter)
            .build_query_as::<ClinicDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;
        Ok(items)
    }

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        // Lock the row so concurrent single-flag updates serialize instead of
        // clobbering each other's merge.
        let current = sqlx::query_as::<_, ClinicDBResponse>(
            "SELECT * FROM clinics WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if let Some(name) = &request.name
            && name != &current.name
        {
            let taken: Option<(ClinicId,)> = sqlx::query_as(
                "SELECT id FROM clinics WHERE LOWER(name) = LOWER($1) AND id != $2",
            )
            .bind(name)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
            if taken.is_some() {
                return Err(DbError::UniqueViolation {
                    constraint: Some("clinics_name_lower_unique".to_string()),
                    table: Some("clinics".to_string()),
                    message: format!("A clinic named '{name}' already exists"),
                });
            }
        }

        let merged = request.apply(&current);
        let updated = sqlx::query_as::<_, ClinicDBResponse>(
            r#"
            UPDATE clinics
            SET name = $2, location = $3, doctor_count = $4, instagram = $5,
                site = $6, bio_link = $7, contact_person = $8, email = $9,
                whatsapp = $10, notes = $11, prospect_email = $12,
                prospect_call = $13, prospect_whatsapp = $14, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&merged.name)
        .bind(&merged.location)
        .bind(merged.doctor_count)
        .bind(&merged.instagram)
        .bind(&merged.site)
        .bind(&merged.bio_link)
        .bind(&merged.contact_person)
        .bind(&merged.email)
        .bind(&merged.whatsapp)
        .bind(&merged.notes)
        .bind(merged.prospect_email)
        .bind(merged.prospect_call)
        .bind(merged.prospect_whatsapp)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        let links: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contact_clinics WHERE clinic_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if links > 0 {
            return Err(DbError::ProtectedEntity {
                reason: format!(
                    "clinic is linked to {links} contact{}",
                    if links == 1 { "" } else { "s" }
                ),
                entity_type: "clinic".to_string(),
                entity_id: Some(id.to_string()),
            });
        }

        let result = sqlx::query("DELETE FROM clinics WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Shared with the contacts repository, which inserts clinics inside its own
/// transaction when a contact arrives with new clinics inline.
pub(crate) async fn insert_clinic(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    request: &ClinicCreateDBRequest,
) -> Result<ClinicDBResponse> {
    let taken: Option<(ClinicId,)> =
        sqlx::query_as("SELECT id FROM clinics WHERE LOWER(name) = LOWER($1)")
            .bind(&request.name)
            .fetch_optional(&mut **tx)
            .await?;
    if taken.is_some() {
        return Err(DbError::UniqueViolation {
            constraint: Some("clinics_name_lower_unique".to_string()),
            table: Some("clinics".to_string()),
            message: format!("A clinic named '{}' already exists", request.name),
        });
    }

    let clinic = sqlx::query_as::<_, ClinicDBResponse>(
        r#"
        INSERT INTO clinics (
            name, location, doctor_count, instagram, site, bio_link,
            contact_person, email, whatsapp, notes,
            prospect_email, prospect_call, prospect_whatsapp
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(&request.name)
    .bind(&request.location)
    .bind(request.doctor_count)
    .bind(&request.instagram)
    .bind(&request.site)
    .bind(&request.bio_link)
    .bind(&request.contact_person)
    .bind(&request.email)
    .bind(&request.whatsapp)
    .bind(&request.notes)
    .bind(request.prospect_email)
    .bind(request.prospect_call)
    .bind(request.prospect_whatsapp)
    .fetch_one(&mut **tx)
    .await?;
    Ok(clinic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filter_matches_three_columns() {
        let filter = ClinicFilter {
            skip: 0,
            limit: 10,
            search: Some("derm".to_string()),
            missing: vec![],
        };
        let sql = select_query(&filter).into_sql();
        assert!(sql.contains("name ILIKE $1"));
        assert!(sql.contains("location ILIKE $2"));
        assert!(sql.contains("email ILIKE $3"));
        assert!(sql.ends_with("ORDER BY created_at DESC"));
    }

    #[test]
    fn missing_channels_become_false_predicates() {
        let filter = ClinicFilter {
            missing: vec![ProspectChannel::Email, ProspectChannel::Whatsapp],
            ..Default::default()
        };
        let sql = select_query(&filter).into_sql();
        assert!(sql.contains("AND prospect_email = FALSE"));
        assert!(sql.contains("AND prospect_whatsapp = FALSE"));
        assert!(!sql.contains("prospect_call"));
    }

    #[test]
    fn empty_filter_selects_everything() {
        let sql = select_query(&ClinicFilter::default()).into_sql();
        assert_eq!(sql, "SELECT * FROM clinics WHERE 1=1 ORDER BY created_at DESC");
    }

    #[test]
    fn count_query_carries_the_same_predicates() {
        let filter = ClinicFilter {
            search: Some("spa".to_string()),
            missing: vec![ProspectChannel::Call],
            ..Default::default()
        };
        let sql = count_query(&filter).into_sql();
        assert!(sql.starts_with("SELECT COUNT(*) FROM clinics"));
        assert!(sql.contains("name ILIKE"));
        assert!(sql.contains("prospect_call = FALSE"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn unknown_channel_tokens_are_ignored() {
        assert_eq!(ProspectChannel::from_token("email"), Some(ProspectChannel::Email));
        assert_eq!(ProspectChannel::from_token(" call "), Some(ProspectChannel::Call));
        assert_eq!(ProspectChannel::from_token("fax"), None);
        assert_eq!(ProspectChannel::from_token(""), None);
    }

    mod db {
        use super::*;
        use crate::db::handlers::contacts::Contacts;
        use crate::db::handlers::users::Users;
        use crate::db::models::contacts::ContactCreateDBRequest;
        use crate::db::models::users::UserCreateDBRequest;
        use sqlx::PgPool;

        fn clinic_named(name: &str) -> ClinicCreateDBRequest {
            ClinicCreateDBRequest {
                name: name.to_string(),
                ..Default::default()
            }
        }

        #[sqlx::test]
        async fn create_assigns_a_server_side_id(pool: PgPool) {
            let mut conn = pool.acquire().await.unwrap();
            let mut repo = Clinics::new(&mut conn);

            let created = repo.create(&clinic_named("Acme Clinic")).await.unwrap();
            assert!(!created.id.is_nil());

            let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
            assert_eq!(fetched.name, "Acme Clinic");
            assert!(!fetched.prospect_email);
        }

        #[sqlx::test]
        async fn duplicate_names_conflict_case_insensitively(pool: PgPool) {
            let mut conn = pool.acquire().await.unwrap();
            let mut repo = Clinics::new(&mut conn);

            repo.create(&clinic_named("Acme Clinic")).await.unwrap();
            let err = repo.create(&clinic_named("ACME clinic")).await.unwrap_err();
            assert!(matches!(err, DbError::UniqueViolation { .. }));
        }

        #[sqlx::test]
        async fn delete_is_blocked_while_contacts_are_linked(pool: PgPool) {
            let mut conn = pool.acquire().await.unwrap();
            let user = Users::new(&mut conn)
                .create(&UserCreateDBRequest {
                    email: "owner@example.com".to_string(),
                    display_name: None,
                    is_admin: false,
                    password_hash: None,
                })
                .await
                .unwrap();

            let contact = Contacts::new(&mut conn, user.id)
                .create_with_clinics(&ContactCreateDBRequest {
                    name: "Dr. Lima".to_string(),
                    clinics: vec![clinic_named("Linked Clinic")],
                    ..Default::default()
                })
                .await
                .unwrap();
            let clinic_id = contact.clinics[0].id;

            let mut repo = Clinics::new(&mut conn);
            let err = repo.delete(clinic_id).await.unwrap_err();
            assert!(matches!(err, DbError::ProtectedEntity { .. }));

            // Unlinking frees the clinic for deletion
            Contacts::new(&mut conn, user.id).delete(contact.contact.id).await.unwrap();
            assert!(Clinics::new(&mut conn).delete(clinic_id).await.unwrap());
        }

        #[sqlx::test]
        async fn list_returns_the_requested_slice_and_full_total(pool: PgPool) {
            let mut conn = pool.acquire().await.unwrap();
            let mut repo = Clinics::new(&mut conn);
            for i in 0..5 {
                repo.create(&clinic_named(&format!("Clinic {i}"))).await.unwrap();
            }

            let page = repo
                .list(&ClinicFilter { skip: 2, limit: 2, ..Default::default() })
                .await
                .unwrap();
            assert_eq!(page.items.len(), 2);
            assert_eq!(page.total, 5);

            // A page past the end is empty, not an error
            let past_the_end = repo
                .list(&ClinicFilter { skip: 10, limit: 2, ..Default::default() })
                .await
                .unwrap();
            assert!(past_the_end.items.is_empty());
            assert_eq!(past_the_end.total, 5);
        }
    }
}
