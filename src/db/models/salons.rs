//! Database models for salon leads.

use crate::types::SalonId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database request for creating a new salon
#[derive(Debug, Clone, Default)]
pub struct SalonCreateDBRequest {
    pub name: String,
    pub address: Option<String>,
    pub instagram: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub site: Option<String>,
    pub unit_count: Option<i32>,
}

/// Database request for partially updating a salon (see
/// [`super::clinics::ClinicUpdateDBRequest`] for the two-level `Option`
/// convention).
#[derive(Debug, Clone, Default)]
pub struct SalonUpdateDBRequest {
    pub name: Option<String>,
    pub address: Option<Option<String>>,
    pub instagram: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub site: Option<Option<String>>,
    pub unit_count: Option<Option<i32>>,
}

/// Database response for a salon row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalonDBResponse {
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

impl SalonUpdateDBRequest {
    pub fn apply(&self, current: &SalonDBResponse) -> SalonCreateDBRequest {
        SalonCreateDBRequest {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            address: self.address.clone().unwrap_or_else(|| current.address.clone()),
            instagram: self.instagram.clone().unwrap_or_else(|| current.instagram.clone()),
            email: self.email.clone().unwrap_or_else(|| current.email.clone()),
            phone: self.phone.clone().unwrap_or_else(|| current.phone.clone()),
            site: self.site.clone().unwrap_or_else(|| current.site.clone()),
            unit_count: self.unit_count.unwrap_or(current.unit_count),
        }
    }
}
