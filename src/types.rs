//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: account identifier (owner of outbound contacts)
//! - [`ClinicId`]: clinic lead identifier
//! - [`SalonId`]: salon lead identifier
//! - [`ContactId`]: outbound contact identifier

use uuid::Uuid;

pub type UserId = Uuid;
pub type ClinicId = Uuid;
pub type SalonId = Uuid;
pub type ContactId = Uuid;
