//! API request/response models for outbound contacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use utoipa::{IntoParams, ToSchema};

use super::clinics::{ClinicCreate, ClinicResponse};
use super::pagination::PageQuery;
use super::{check_email, check_required_name, normalize, normalize_patch};
use crate::db::models::contacts::{
    ContactCreateDBRequest, ContactDBResponse, ContactSummaryDBResponse, ContactUpdateDBRequest,
    ContactWithClinicsDBResponse,
};
use crate::errors::{Error, FieldError};
use crate::types::{ContactId, UserId};

/// Lead status labels the UI offers by default. The column itself is free
/// text, so anything outside this list is stored as-is.
pub const SUGGESTED_STATUSES: &[&str] = &[
    "prospected",
    "approached",
    "replied",
    "interested",
    "published-link",
    "upgraded",
];

/// Query parameters for listing the caller's contacts.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListContactsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,

    /// Case-insensitive substring match on name, specialty, or email
    pub search: Option<String>,

    /// `csv` to download the full filtered set instead of a JSON page
    pub format: Option<String>,
}

/// Request body for creating a contact.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactCreate {
    #[schema(example = "Dra. Ana Souza")]
    pub name: String,
    pub specialty: Option<String>,
    pub instagram: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    /// Free-text status label; defaults to `prospected`
    pub status: Option<String>,
    pub notes: Option<String>,
    pub address: Option<String>,
    /// Clinics to create and link in the same transaction
    #[serde(default)]
    pub clinics: Vec<ClinicCreate>,
}

impl ContactCreate {
    pub fn into_db_request(self) -> Result<ContactCreateDBRequest, Error> {
        let mut errors = Vec::new();
        check_required_name(&self.name, &mut errors);
        check_email(self.email.as_deref(), &mut errors);
        if !errors.is_empty() {
            return Err(Error::validation("invalid contact", errors));
        }

        let clinics = self
            .clinics
            .into_iter()
            .map(ClinicCreate::into_db_request)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ContactCreateDBRequest {
            name: self.name.trim().to_string(),
            specialty: normalize(self.specialty),
            instagram: normalize(self.instagram),
            whatsapp: normalize(self.whatsapp),
            email: normalize(self.email),
            status: normalize(self.status),
            notes: normalize(self.notes),
            address: normalize(self.address),
            clinics,
        })
    }
}

/// Request body for partially updating a contact (see
/// [`super::clinics::ClinicUpdate`] for the absent-vs-null convention;
/// clearing `status` resets it to the default label).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    pub name: Option<String>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub specialty: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub instagram: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub whatsapp: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub status: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
}

impl ContactUpdate {
    pub fn into_db_request(self) -> Result<ContactUpdateDBRequest, Error> {
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
            return Err(Error::validation("invalid contact update", errors));
        }

        Ok(ContactUpdateDBRequest {
            name: self.name.map(|n| n.trim().to_string()),
            specialty: normalize_patch(self.specialty),
            instagram: normalize_patch(self.instagram),
            whatsapp: normalize_patch(self.whatsapp),
            email: normalize_patch(self.email),
            status: normalize_patch(self.status),
            notes: normalize_patch(self.notes),
            address: normalize_patch(self.address),
        })
    }
}

/// Full contact details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ContactId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub name: String,
    pub specialty: Option<String>,
    pub instagram: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContactDBResponse> for ContactResponse {
    fn from(db: ContactDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            specialty: db.specialty,
            instagram: db.instagram,
            whatsapp: db.whatsapp,
            email: db.email,
            status: db.status,
            notes: db.notes,
            address: db.address,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// A contact plus its linked clinics, for create and detail responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactDetailResponse {
    #[serde(flatten)]
    pub contact: ContactResponse,
    pub clinics: Vec<ClinicResponse>,
}

impl From<ContactWithClinicsDBResponse> for ContactDetailResponse {
    fn from(db: ContactWithClinicsDBResponse) -> Self {
        Self {
            contact: db.contact.into(),
            clinics: db.clinics.into_iter().map(Into::into).collect(),
        }
    }
}

/// Slim contact embedded in a clinic detail response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactSummaryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ContactId,
    pub name: String,
    pub specialty: Option<String>,
    pub status: String,
}

impl From<ContactSummaryDBResponse> for ContactSummaryResponse {
    fn from(db: ContactSummaryDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            specialty: db.specialty,
            status: db.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_status_falls_back_to_default() {
        let request = ContactCreate {
            name: "Ana".to_string(),
            status: Some("  ".to_string()),
            ..Default::default()
        };
        let db = request.into_db_request().unwrap();
        // None here makes the repository apply the default label.
        assert_eq!(db.status, None);
    }

    #[test]
    fn custom_status_labels_pass_through() {
        let request = ContactCreate {
            name: "Ana".to_string(),
            status: Some("waiting on lawyer".to_string()),
            ..Default::default()
        };
        let db = request.into_db_request().unwrap();
        assert_eq!(db.status.as_deref(), Some("waiting on lawyer"));
    }

    #[test]
    fn nested_clinic_validation_bubbles_up() {
        let request = ContactCreate {
            name: "Ana".to_string(),
            clinics: vec![ClinicCreate::default()],
            ..Default::default()
        };
        assert!(request.into_db_request().is_err());
    }

    #[test]
    fn null_status_patch_resets_to_default() {
        let patch: ContactUpdate = serde_json::from_str(r#"{"status": null}"#).unwrap();
        let db = patch.into_db_request().unwrap();
        assert_eq!(db.status, Some(None));
    }

    #[test]
    fn suggested_statuses_include_the_default() {
        assert!(SUGGESTED_STATUSES.contains(&"prospected"));
    }
}
