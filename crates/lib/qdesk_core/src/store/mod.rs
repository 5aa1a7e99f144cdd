//! Persistence traits and their implementations.
//!
//! Every uniqueness rule (national ID, email, token number) is enforced by
//! the store inside a single insert, never by a separate existence check, so
//! concurrent inserts of the same key yield exactly one success and
//! [`StoreError::Duplicate`] for the rest.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Account, Citizen, Department, NewAccount, NewCitizen, NewDepartment, Role, ServiceToken,
    TokenStatus,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key is already taken. Carries the key's field name.
    #[error("Duplicate {0}")]
    Duplicate(&'static str),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CitizenStore: Send + Sync {
    /// Insert unless the national ID is taken (`Duplicate("nationalId")`).
    async fn insert(&self, citizen: NewCitizen) -> StoreResult<Citizen>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Citizen>>;
    async fn find_by_national_id(&self, national_id: &str) -> StoreResult<Option<Citizen>>;
    /// Exact (id, national ID) pair match used by citizen login.
    async fn find_by_credentials(&self, id: Uuid, national_id: &str)
    -> StoreResult<Option<Citizen>>;
    /// Overwrite every mutable field of the stored row and bump `updated_at`.
    /// Returns `None` when the row no longer exists.
    async fn update(&self, citizen: &Citizen) -> StoreResult<Option<Citizen>>;
    async fn delete(&self, id: Uuid) -> StoreResult<Option<Citizen>>;
    async fn list(&self) -> StoreResult<Vec<Citizen>>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert unless the email is taken (`Duplicate("email")`). The first
    /// account ever stored is given [`Role::Admin`], every later one
    /// [`Role::User`].
    async fn insert(&self, account: NewAccount) -> StoreResult<Account>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Account>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<Option<Account>>;
}

#[async_trait]
pub trait DepartmentStore: Send + Sync {
    async fn insert(&self, department: NewDepartment) -> StoreResult<Department>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Department>>;
    async fn update(&self, department: &Department) -> StoreResult<Option<Department>>;
    async fn delete(&self, id: Uuid) -> StoreResult<Option<Department>>;
    async fn list(&self) -> StoreResult<Vec<Department>>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert unless the token number is taken (`Duplicate("tokenNumber")`).
    async fn insert(&self, token: &ServiceToken) -> StoreResult<()>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<ServiceToken>>;
    async fn find_by_number(&self, token_number: &str) -> StoreResult<Option<ServiceToken>>;
    /// Compare-and-set: only applies while the stored status still equals
    /// `expected`. Returns `None` if the token is gone or has moved on.
    async fn update_status(
        &self,
        id: Uuid,
        expected: TokenStatus,
        status: TokenStatus,
        remarks: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<ServiceToken>>;
    /// All tokens, newest `issued_at` first.
    async fn list(&self) -> StoreResult<Vec<ServiceToken>>;
}

/// Handles to every store, shared through application state.
#[derive(Clone)]
pub struct Stores {
    pub citizens: Arc<dyn CitizenStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub departments: Arc<dyn DepartmentStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::default()))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: CitizenStore + AccountStore + DepartmentStore + TokenStore + 'static,
    {
        Self {
            citizens: backend.clone(),
            accounts: backend.clone(),
            departments: backend.clone(),
            tokens: backend,
        }
    }
}
