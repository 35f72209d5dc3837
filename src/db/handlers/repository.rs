//! Base repository trait for database operations.
//!
//! A repository is a data access layer for a postgres table. It provides
//! methods for creating, reading, updating, and deleting entities, as well as
//! listing them with filters and offset pagination.

use crate::db::errors::Result;

/// One page of a filtered result set, plus the total number of rows the
/// filter matches before pagination.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Base repository trait providing common database operations
///
/// This trait has separate associated types for create requests, update requests, and responses.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for updating entities
    type UpdateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List one page of entities matching the filter, newest first
    async fn list(&mut self, filter: &Self::Filter) -> Result<Page<Self::Response>>;

    /// List every entity matching the filter, ignoring pagination (CSV export)
    async fn list_all(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Update an entity by ID
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;

    /// Delete an entity by ID
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;
}
