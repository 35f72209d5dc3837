//! Database models for clinic leads.

use crate::types::ClinicId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database request for creating a new clinic
#[derive(Debug, Clone, Default)]
pub struct ClinicCreateDBRequest {
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
}

/// Database request for partially updating a clinic.
///
/// Non-nullable columns use `Option` (absent = untouched). Nullable columns
/// use `Option<Option<T>>` so the outer `None` means untouched while
/// `Some(None)` clears the column.
#[derive(Debug, Clone, Default)]
pub struct ClinicUpdateDBRequest {
    pub name: Option<String>,
    pub location: Option<Option<String>>,
    pub doctor_count: Option<Option<i32>>,
    pub instagram: Option<Option<String>>,
    pub site: Option<Option<String>>,
    pub bio_link: Option<Option<String>>,
    pub contact_person: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub whatsapp: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub prospect_email: Option<bool>,
    pub prospect_call: Option<bool>,
    pub prospect_whatsapp: Option<bool>,
}

/// Database response for a clinic row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClinicDBResponse {
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

impl ClinicUpdateDBRequest {
    /// Merge this patch into an existing row, returning the full set of
    /// column values the UPDATE should write.
    pub fn apply(&self, current: &ClinicDBResponse) -> ClinicCreateDBRequest {
        ClinicCreateDBRequest {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            location: self.location.clone().unwrap_or_else(|| current.location.clone()),
            doctor_count: self.doctor_count.unwrap_or(current.doctor_count),
            instagram: self.instagram.clone().unwrap_or_else(|| current.instagram.clone()),
            site: self.site.clone().unwrap_or_else(|| current.site.clone()),
            bio_link: self.bio_link.clone().unwrap_or_else(|| current.bio_link.clone()),
            contact_person: self.contact_person.clone().unwrap_or_else(|| current.contact_person.clone()),
            email: self.email.clone().unwrap_or_else(|| current.email.clone()),
            whatsapp: self.whatsapp.clone().unwrap_or_else(|| current.whatsapp.clone()),
            notes: self.notes.clone().unwrap_or_else(|| current.notes.clone()),
            prospect_email: self.prospect_email.unwrap_or(current.prospect_email),
            prospect_call: self.prospect_call.unwrap_or(current.prospect_call),
            prospect_whatsapp: self.prospect_whatsapp.unwrap_or(current.prospect_whatsapp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn existing() -> ClinicDBResponse {
        ClinicDBResponse {
            id: Uuid::new_v4(),
            name: "Acme Clinic".into(),
            location: Some("Sao Paulo".into()),
            doctor_count: Some(4),
            instagram: None,
            site: None,
            bio_link: None,
            contact_person: None,
            email: Some("old@acme.test".into()),
            whatsapp: None,
            notes: None,
            prospect_email: false,
            prospect_call: true,
            prospect_whatsapp: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_leaves_absent_fields_untouched() {
        let patch = ClinicUpdateDBRequest {
            prospect_email: Some(true),
            ..Default::default()
        };
        let merged = patch.apply(&existing());
        assert!(merged.prospect_email);
        assert!(merged.prospect_call);
        assert_eq!(merged.name, "Acme Clinic");
        assert_eq!(merged.email.as_deref(), Some("old@acme.test"));
    }

    #[test]
    fn test_apply_explicit_null_clears_field() {
        let patch = ClinicUpdateDBRequest {
            email: Some(None),
            ..Default::default()
        };
        let merged = patch.apply(&existing());
        assert_eq!(merged.email, None);
        assert_eq!(merged.location.as_deref(), Some("Sao Paulo"));
    }
}
