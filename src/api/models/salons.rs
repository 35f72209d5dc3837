//! API request/response models for beauty salons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use utoipa::{IntoParams, ToSchema};

use super::pagination::PageQuery;
use super::{check_email, check_required_name, normalize, normalize_patch};
use crate::db::models::salons::{SalonCreateDBRequest, SalonDBResponse, SalonUpdateDBRequest};
use crate::errors::{Error, FieldError};
use crate::types::SalonId;

/// Query parameters for listing salons.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListSalonsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,

    /// Case-insensitive substring match across the salon's text fields
    pub search: Option<String>,

    /// `csv` to download the full filtered set instead of a JSON page
    pub format: Option<String>,
}

/// Request body for creating a salon.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalonCreate {
    /// Display name, unique among salons (case-insensitive)
    #[schema(example = "Studio Glow")]
    pub name: String,
    pub address: Option<String>,
    pub instagram: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub site: Option<String>,
    pub unit_count: Option<i32>,
}

impl SalonCreate {
    pub fn into_db_request(self) -> Result<SalonCreateDBRequest, Error> {
        let mut errors = Vec::new();
        check_required_name(&self.name, &mut errors);
        check_email(self.email.as_deref(), &mut errors);
        if !errors.is_empty() {
            return Err(Error::validation("invalid salon", errors));
        }

        Ok(SalonCreateDBRequest {
            name: self.name.trim().to_string(),
            address: normalize(self.address),
            instagram: normalize(self.instagram),
            email: normalize(self.email),
            phone: normalize(self.phone),
            site: normalize(self.site),
            unit_count: self.unit_count,
        })
    }
}

/// Request body for partially updating a salon (see
/// [`super::clinics::ClinicUpdate`] for the absent-vs-null convention).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalonUpdate {
    pub name: Option<String>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub instagram: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub site: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub unit_count: Option<Option<i32>>,
}

impl SalonUpdate {
    pub fn into_db_request(self) -> Result<SalonUpdateDBRequest, Error> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            errors.push(FieldError {
                field: "name".to_string(),
                message: "name cannot be empty".to_string(),
            });
        }
        if let Some(Some(email)) = &self.email {
            check_email(Some(email), &mut errors);
        }
        if !errors.is_empty() {
            return Err(Error::validation("invalid salon update", errors));
        }

        Ok(SalonUpdateDBRequest {
            name: self.name.map(|n| n.trim().to_string()),
            address: normalize_patch(self.address),
            instagram: normalize_patch(self.instagram),
            email: normalize_patch(self.email),
            phone: normalize_patch(self.phone),
            site: normalize_patch(self.site),
            unit_count: self.unit_count,
        })
    }
}

/// Full salon details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalonResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SalonId,
    pub name: String,
    pub address: Option<String>,
    pub instagram: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub site: Option<String>,
    pub unit_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SalonDBResponse> for SalonResponse {
    fn from(db: SalonDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            address: db.address,
            instagram: db.instagram,
            email: db.email,
            phone: db.phone,
            site: db.site,
            unit_count: db.unit_count,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_a_name() {
        let request = SalonCreate::default();
        assert!(request.into_db_request().is_err());
    }

    #[test]
    fn update_clears_unit_count_on_explicit_null() {
        let patch: SalonUpdate = serde_json::from_str(r#"{"unitCount": null}"#).unwrap();
        let db = patch.into_db_request().unwrap();
        assert_eq!(db.unit_count, Some(None));
        assert_eq!(db.address, None);
    }
}
