//! Database repositories, one per table.

pub mod clinics;
pub mod contacts;
pub mod repository;
pub mod salons;
pub mod users;

pub use repository::{Page, Repository};
