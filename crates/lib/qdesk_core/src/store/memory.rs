//! In-process store backed by hash maps.
//!
//! Used by tests and local runs without PostgreSQL. Each table sits behind
//! its own lock; uniqueness checks and the insert happen under one write
//! guard.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AccountStore, CitizenStore, DepartmentStore, StoreError, StoreResult, TokenStore,
};
use crate::models::{
    Account, Citizen, Department, NewAccount, NewCitizen, NewDepartment, Role, ServiceToken,
    TokenStatus,
};

#[derive(Default)]
pub struct MemoryStore {
    citizens: RwLock<HashMap<Uuid, Citizen>>,
    accounts: RwLock<HashMap<Uuid, Account>>,
    departments: RwLock<HashMap<Uuid, Department>>,
    tokens: RwLock<HashMap<Uuid, ServiceToken>>,
}

#[async_trait]
impl CitizenStore for MemoryStore {
    async fn insert(&self, citizen: NewCitizen) -> StoreResult<Citizen> {
        let mut rows = self.citizens.write().await;
        if rows.values().any(|c| c.national_id == citizen.national_id) {
            return Err(StoreError::Duplicate("nationalId"));
        }
        let now = Utc::now();
        let row = Citizen {
            id: Uuid::new_v4(),
            name: citizen.name,
            national_id: citizen.national_id,
            contact_details: citizen.contact_details,
            address: citizen.address,
            purpose: citizen.purpose,
            role: Role::User,
            password_hash: None,
            created_at: now,
            updated_at: now,
        };
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Citizen>> {
        Ok(self.citizens.read().await.get(&id).cloned())
    }

    async fn find_by_national_id(&self, national_id: &str) -> StoreResult<Option<Citizen>> {
        let rows = self.citizens.read().await;
        Ok(rows.values().find(|c| c.national_id == national_id).cloned())
    }

    async fn find_by_credentials(
        &self,
        id: Uuid,
        national_id: &str,
    ) -> StoreResult<Option<Citizen>> {
        let rows = self.citizens.read().await;
        Ok(rows
            .get(&id)
            .filter(|c| c.national_id == national_id)
            .cloned())
    }

    async fn update(&self, citizen: &Citizen) -> StoreResult<Option<Citizen>> {
        let mut rows = self.citizens.write().await;
        let Some(row) = rows.get_mut(&citizen.id) else {
            return Ok(None);
        };
        row.name = citizen.name.clone();
        row.contact_details = citizen.contact_details.clone();
        row.address = citizen.address.clone();
        row.purpose = citizen.purpose.clone();
        row.role = citizen.role;
        row.password_hash = citizen.password_hash.clone();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Citizen>> {
        Ok(self.citizens.write().await.remove(&id))
    }

    async fn list(&self) -> StoreResult<Vec<Citizen>> {
        let mut all: Vec<Citizen> = self.citizens.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert(&self, account: NewAccount) -> StoreResult<Account> {
        let mut rows = self.accounts.write().await;
        if rows.values().any(|a| a.email == account.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let role = if rows.is_empty() { Role::Admin } else { Role::User };
        let now = Utc::now();
        let row = Account {
            id: Uuid::new_v4(),
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            image_url: account.image_url,
            role,
            created_at: now,
            updated_at: now,
        };
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let rows = self.accounts.read().await;
        Ok(rows.values().find(|a| a.email == email).cloned())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<Option<Account>> {
        let mut rows = self.accounts.write().await;
        Ok(rows.get_mut(&id).map(|row| {
            row.role = role;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn insert(&self, department: NewDepartment) -> StoreResult<Department> {
        let now = Utc::now();
        let row = Department {
            id: Uuid::new_v4(),
            name: department.name,
            description: department.description,
            staff_capacity: department.staff_capacity,
            created_at: now,
            updated_at: now,
        };
        self.departments.write().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Department>> {
        Ok(self.departments.read().await.get(&id).cloned())
    }

    async fn update(&self, department: &Department) -> StoreResult<Option<Department>> {
        let mut rows = self.departments.write().await;
        let Some(row) = rows.get_mut(&department.id) else {
            return Ok(None);
        };
        row.name = department.name.clone();
        row.description = department.description.clone();
        row.staff_capacity = department.staff_capacity;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Department>> {
        Ok(self.departments.write().await.remove(&id))
    }

    async fn list(&self) -> StoreResult<Vec<Department>> {
        let mut all: Vec<Department> = self.departments.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert(&self, token: &ServiceToken) -> StoreResult<()> {
        let mut rows = self.tokens.write().await;
        if rows.values().any(|t| t.token_number == token.token_number) {
            return Err(StoreError::Duplicate("tokenNumber"));
        }
        rows.insert(token.id, token.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<ServiceToken>> {
        Ok(self.tokens.read().await.get(&id).cloned())
    }

    async fn find_by_number(&self, token_number: &str) -> StoreResult<Option<ServiceToken>> {
        let rows = self.tokens.read().await;
        Ok(rows.values().find(|t| t.token_number == token_number).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: TokenStatus,
        status: TokenStatus,
        remarks: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<ServiceToken>> {
        let mut rows = self.tokens.write().await;
        Ok(rows
            .get_mut(&id)
            .filter(|t| t.status == expected)
            .map(|row| {
                row.status = status;
                row.remarks = remarks;
                row.updated_at = updated_at;
                row.clone()
            }))
    }

    async fn list(&self) -> StoreResult<Vec<ServiceToken>> {
        let mut all: Vec<ServiceToken> = self.tokens.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.issued_at.cmp(&a.issued_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }
}
