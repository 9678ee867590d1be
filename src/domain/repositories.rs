//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::Book;

/// Read-only access to the book catalog
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Select every book, in storage order
    async fn find_all(&self) -> Result<Vec<Book>, DomainError>;
}
