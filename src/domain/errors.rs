//! Domain error types
//!
//! These errors are framework-agnostic and represent backend failures.

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
