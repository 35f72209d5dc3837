//! API request/response models for clinics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use utoipa::{IntoParams, ToSchema};

use super::contacts::ContactSummaryResponse;
use super::pagination::PageQuery;
use super::{check_email, check_required_name, normalize, normalize_patch};
use crate::db::models::clinics::{ClinicCreateDBRequest, ClinicDBResponse, ClinicUpdateDBRequest};
use crate::errors::{Error, FieldError};
use crate::types::ClinicId;

/// Query parameters for listing clinics.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListClinicsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,

    /// Case-insensitive substring match on name, location, or email
    pub search: Option<String>,

    /// Comma-separated outreach channels that must still be unmarked
    /// (subset of `email,call,whatsapp`; unknown tokens are ignored)
    pub missing: Option<String>,

    /// `csv` to download the full filtered set instead of a JSON page
    pub format: Option<String>,
}

/// Request body for creating a clinic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicCreate {
    /// Display name, unique among clinics (case-insensitive)
    #[schema(example = "Clinica Bella Pelle")]
    pub name: String,
    pub location: Option<String>,
    pub doctor_count: Option<i32>,
    pub instagram: Option<String>,
    pub site: Option<String>,
    pub bio_link: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub prospect_email: Option<bool>,
    #[serde(default)]
    pub prospect_call: Option<bool>,
    #[serde(default)]
    pub prospect_whatsapp: Option<bool>,
}

impl ClinicCreate {
    pub fn into_db_request(self) -> Result<ClinicCreateDBRequest, Error> {
        let mut errors = Vec::new();
        check_required_name(&self.name, &mut errors);
        check_email(self.email.as_deref(), &mut errors);
        if !errors.is_empty() {
            return Err(Error::validation("invalid clinic", errors));
        }

        Ok(ClinicCreateDBRequest {
            name: self.name.trim().to_string(),
            location: normalize(self.location),
            doctor_count: self.doctor_count,
            instagram: normalize(self.instagram),
            site: normalize(self.site),
            bio_link: normalize(self.bio_link),
            contact_person: normalize(self.contact_person),
            email: normalize(self.email),
            whatsapp: normalize(self.whatsapp),
            notes: normalize(self.notes),
            prospect_email: self.prospect_email.unwrap_or(false),
            prospect_call: self.prospect_call.unwrap_or(false),
            prospect_whatsapp: self.prospect_whatsapp.unwrap_or(false),
        })
    }
}

/// Request body for partially updating a clinic.
///
/// Nullable fields distinguish "absent" (keep current value) from an
/// explicit `null` (clear the value) via the two-level `Option`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicUpdate {
    pub name: Option<String>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub doctor_count: Option<Option<i32>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub instagram: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub site: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub bio_link: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub contact_person: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub whatsapp: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
    pub prospect_email: Option<bool>,
    pub prospect_call: Option<bool>,
    pub prospect_whatsapp: Option<bool>,
}

impl ClinicUpdate {
    pub fn into_db_request(self) -> Result<ClinicUpdateDBRequest, Error> {
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
            return Err(Error::validation("invalid clinic update", errors));
        }

        Ok(ClinicUpdateDBRequest {
            name: self.name.map(|n| n.trim().to_string()),
            location: normalize_patch(self.location),
            doctor_count: self.doctor_count,
            instagram: normalize_patch(self.instagram),
            site: normalize_patch(self.site),
            bio_link: normalize_patch(self.bio_link),
            contact_person: normalize_patch(self.contact_person),
            email: normalize_patch(self.email),
            whatsapp: normalize_patch(self.whatsapp),
            notes: normalize_patch(self.notes),
            prospect_email: self.prospect_email,
            prospect_call: self.prospect_call,
            prospect_whatsapp: self.prospect_whatsapp,
        })
    }
}

/// Full clinic details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ClinicId,
    pub name: String,
    pub location: Option<String>,
    pub doctor_count: Option<i32>,
    pub instagram: Option<String>,
    pub site: Option<String>,
    pub bio_link: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub notes: Option<String>,
    pub prospect_email: bool,
    pub prospect_call: bool,
    pub prospect_whatsapp: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClinicDBResponse> for ClinicResponse {
    fn from(db: ClinicDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            location: db.location,
            doctor_count: db.doctor_count,
            instagram: db.instagram,
            site: db.site,
            bio_link: db.bio_link,
            contact_person: db.contact_person,
            email: db.email,
            whatsapp: db.whatsapp,
            notes: db.notes,
            prospect_email: db.prospect_email,
            prospect_call: db.prospect_call,
            prospect_whatsapp: db.prospect_whatsapp,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// A clinic plus the contacts linked to it, for the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClinicDetailResponse {
    #[serde(flatten)]
    pub clinic: ClinicResponse,
    pub contacts: Vec<ContactSummaryResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_a_name() {
        let request = ClinicCreate {
            name: "   ".to_string(),
            ..Default::default()
        };
        let err = request.into_db_request().unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn create_normalizes_blank_optionals() {
        let request = ClinicCreate {
            name: " Bella Pelle ".to_string(),
            location: Some("".to_string()),
            instagram: Some(" @bella ".to_string()),
            ..Default::default()
        };
        let db = request.into_db_request().unwrap();
        assert_eq!(db.name, "Bella Pelle");
        assert_eq!(db.location, None);
        assert_eq!(db.instagram, Some("@bella".to_string()));
        assert!(!db.prospect_email);
    }

    #[test]
    fn create_rejects_malformed_email() {
        let request = ClinicCreate {
            name: "Bella".to_string(),
            email: Some("nope".to_string()),
            ..Default::default()
        };
        let err = request.into_db_request().unwrap_err();
        let Error::Validation { details, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(details[0].field, "email");
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let patch: ClinicUpdate =
            serde_json::from_str(r#"{"location": null, "prospectCall": true}"#).unwrap();
        let db = patch.into_db_request().unwrap();
        assert_eq!(db.location, Some(None));
        assert_eq!(db.notes, None);
        assert_eq!(db.prospect_call, Some(true));
        assert_eq!(db.prospect_email, None);
    }

    #[test]
    fn update_rejects_clearing_the_name() {
        let patch: ClinicUpdate = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(patch.into_db_request().is_err());
    }
}
