//! Database record structures matching table schemas.

pub mod clinics;
pub mod contacts;
pub mod salons;
pub mod users;
