//! Database models for outbound contacts.

use crate::db::models::clinics::{ClinicCreateDBRequest, ClinicDBResponse};
use crate::types::{ContactId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status a new contact starts in when the client doesn't supply one.
pub const DEFAULT_STATUS: &str = "prospected";

/// Database request for creating a new outbound contact.
///
/// Nested clinics are created (and linked) in the same transaction as the
/// contact itself, so a failure anywhere rolls the whole request back.
#[derive(Debug, Clone, Default)]
pub struct ContactCreateDBRequest {
    pub name: String,
    pub specialty: Option<String>,
    pub instagram: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub address: Option<String>,
    pub clinics: Vec<ClinicCreateDBRequest>,
}

/// Database request for partially updating a contact (see
/// [`super::clinics::ClinicUpdateDBRequest`] for the two-level `Option`
/// convention).
#[derive(Debug, Clone, Default)]
pub struct ContactUpdateDBRequest {
    pub name: Option<String>,
    pub specialty: Option<Option<String>>,
    pub instagram: Option<Option<String>>,
    pub whatsapp: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub status: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

/// Database response for a contact row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactDBResponse {
    pub id: ContactId,
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

/// Slim contact projection embedded in a clinic detail response.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactSummaryDBResponse {
    pub id: ContactId,
    pub name: String,
    pub specialty: Option<String>,
    pub status: String,
}

/// A contact together with its linked clinics, as returned by create/get.
#[derive(Debug, Clone)]
pub struct ContactWithClinicsDBResponse {
    pub contact: ContactDBResponse,
    pub clinics: Vec<ClinicDBResponse>,
}

/// Merged column values for a contact UPDATE.
#[derive(Debug, Clone)]
pub struct ContactColumns {
    pub name: String,
    pub specialty: Option<String>,
    pub instagram: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub address: Option<String>,
}

impl ContactUpdateDBRequest {
    pub fn apply(&self, current: &ContactDBResponse) -> ContactColumns {
        ContactColumns {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            specialty: self.specialty.clone().unwrap_or_else(|| current.specialty.clone()),
            instagram: self.instagram.clone().unwrap_or_else(|| current.instagram.clone()),
            whatsapp: self.whatsapp.clone().unwrap_or_else(|| current.whatsapp.clone()),
            email: self.email.clone().unwrap_or_else(|| current.email.clone()),
            // The status column is NOT NULL; clearing it resets to the default label.
            status: match &self.status {
                None => current.status.clone(),
                Some(None) => DEFAULT_STATUS.to_string(),
                Some(Some(s)) => s.clone(),
            },
            notes: self.notes.clone().unwrap_or_else(|| current.notes.clone()),
            address: self.address.clone().unwrap_or_else(|| current.address.clone()),
        }
    }
}
