use crate::{db::DbPool, errors::ServiceError};
use async_trait::async_trait;
use std::sync::Arc;

/// Command trait for implementing the Command Pattern
///
/// A command encapsulates one multi-step write: it validates its own input
/// and then applies every change inside a single database transaction.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command against the given connection pool
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError>;
}

pub mod customers;
pub mod partial_shipments;
pub mod shipments;
