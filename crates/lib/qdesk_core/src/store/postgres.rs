//! PostgreSQL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AccountStore, CitizenStore, DepartmentStore, StoreError, StoreResult, TokenStore,
};
use crate::models::{
    Account, Address, Citizen, ContactDetails, Department, NewAccount, NewCitizen, NewDepartment,
    Role, ServiceToken, TokenStatus,
};

const CITIZEN_COLUMNS: &str = "id, name, national_id, phone, alternate_phone, street, city, \
     province, postal_code, purpose, role, password_hash, created_at, updated_at";

const ACCOUNT_COLUMNS: &str =
    "id, name, email, password_hash, image_url, role, created_at, updated_at";

const DEPARTMENT_COLUMNS: &str =
    "id, name, description, staff_capacity, created_at, updated_at";

/// Advisory lock key held while an account is inserted.
const ACCOUNT_SIGNUP_LOCK: i64 = 0x7164_6573_6b01;

const TOKEN_COLUMNS: &str = "id, token_number, beneficiary_id, department_id, purpose, status, \
     remarks, issued_at, updated_at";

/// Store backed by a `PgPool`. Schema lives in `qdesk_core/migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-constraint violation to [`StoreError::Duplicate`].
fn unique_as_duplicate(field: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        if let sqlx::Error::Database(db) = &e
            && db.is_unique_violation()
        {
            return StoreError::Duplicate(field);
        }
        StoreError::Database(e)
    }
}

fn parse_role(raw: &str) -> StoreResult<Role> {
    raw.parse().map_err(|e: crate::models::UnknownRole| StoreError::Corrupt(e.to_string()))
}

// ---------------------------------------------------------------------------
// Citizens
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct CitizenRow {
    id: Uuid,
    name: String,
    national_id: String,
    phone: String,
    alternate_phone: Option<String>,
    street: String,
    city: String,
    province: String,
    postal_code: Option<String>,
    purpose: String,
    role: String,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CitizenRow> for Citizen {
    type Error = StoreError;

    fn try_from(row: CitizenRow) -> StoreResult<Self> {
        Ok(Citizen {
            id: row.id,
            name: row.name,
            national_id: row.national_id,
            contact_details: ContactDetails {
                phone: row.phone,
                alternate_phone: row.alternate_phone,
            },
            address: Address {
                street: row.street,
                city: row.city,
                province: row.province,
                postal_code: row.postal_code,
            },
            purpose: row.purpose,
            role: parse_role(&row.role)?,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn citizen_opt(row: Option<CitizenRow>) -> StoreResult<Option<Citizen>> {
    row.map(Citizen::try_from).transpose()
}

#[async_trait]
impl CitizenStore for PgStore {
    async fn insert(&self, citizen: NewCitizen) -> StoreResult<Citizen> {
        let sql = format!(
            "INSERT INTO citizens \
               (name, national_id, phone, alternate_phone, street, city, province, postal_code, purpose) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (national_id) DO NOTHING \
             RETURNING {CITIZEN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CitizenRow>(&sql)
            .bind(&citizen.name)
            .bind(&citizen.national_id)
            .bind(&citizen.contact_details.phone)
            .bind(&citizen.contact_details.alternate_phone)
            .bind(&citizen.address.street)
            .bind(&citizen.address.city)
            .bind(&citizen.address.province)
            .bind(&citizen.address.postal_code)
            .bind(&citizen.purpose)
            .fetch_optional(&self.pool)
            .await?;
        citizen_opt(row)?.ok_or(StoreError::Duplicate("nationalId"))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Citizen>> {
        let sql = format!("SELECT {CITIZEN_COLUMNS} FROM citizens WHERE id = $1");
        let row = sqlx::query_as::<_, CitizenRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        citizen_opt(row)
    }

    async fn find_by_national_id(&self, national_id: &str) -> StoreResult<Option<Citizen>> {
        let sql = format!("SELECT {CITIZEN_COLUMNS} FROM citizens WHERE national_id = $1");
        let row = sqlx::query_as::<_, CitizenRow>(&sql)
            .bind(national_id)
            .fetch_optional(&self.pool)
            .await?;
        citizen_opt(row)
    }

    async fn find_by_credentials(
        &self,
        id: Uuid,
        national_id: &str,
    ) -> StoreResult<Option<Citizen>> {
        let sql = format!(
            "SELECT {CITIZEN_COLUMNS} FROM citizens WHERE id = $1 AND national_id = $2"
        );
        let row = sqlx::query_as::<_, CitizenRow>(&sql)
            .bind(id)
            .bind(national_id)
            .fetch_optional(&self.pool)
            .await?;
        citizen_opt(row)
    }

    async fn update(&self, citizen: &Citizen) -> StoreResult<Option<Citizen>> {
        let sql = format!(
            "UPDATE citizens SET \
               name = $2, phone = $3, alternate_phone = $4, street = $5, city = $6, \
               province = $7, postal_code = $8, purpose = $9, role = $10, \
               password_hash = $11, updated_at = now() \
             WHERE id = $1 \
             RETURNING {CITIZEN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CitizenRow>(&sql)
            .bind(citizen.id)
            .bind(&citizen.name)
            .bind(&citizen.contact_details.phone)
            .bind(&citizen.contact_details.alternate_phone)
            .bind(&citizen.address.street)
            .bind(&citizen.address.city)
            .bind(&citizen.address.province)
            .bind(&citizen.address.postal_code)
            .bind(&citizen.purpose)
            .bind(citizen.role.as_str())
            .bind(&citizen.password_hash)
            .fetch_optional(&self.pool)
            .await?;
        citizen_opt(row)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Citizen>> {
        let sql = format!("DELETE FROM citizens WHERE id = $1 RETURNING {CITIZEN_COLUMNS}");
        let row = sqlx::query_as::<_, CitizenRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        citizen_opt(row)
    }

    async fn list(&self) -> StoreResult<Vec<Citizen>> {
        let sql = format!("SELECT {CITIZEN_COLUMNS} FROM citizens ORDER BY created_at, id");
        sqlx::query_as::<_, CitizenRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Citizen::try_from)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    image_url: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> StoreResult<Self> {
        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            image_url: row.image_url,
            role: parse_role(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn account_opt(row: Option<AccountRow>) -> StoreResult<Option<Account>> {
    row.map(Account::try_from).transpose()
}

#[async_trait]
impl AccountStore for PgStore {
    async fn insert(&self, account: NewAccount) -> StoreResult<Account> {
        // Signups are serialized on an advisory lock so the emptiness check
        // sees every committed account and only one signup becomes admin.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ACCOUNT_SIGNUP_LOCK)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO accounts (name, email, password_hash, image_url, role) \
             VALUES ($1, $2, $3, $4, \
                     CASE WHEN EXISTS (SELECT 1 FROM accounts) THEN 'user' ELSE 'admin' END) \
             ON CONFLICT (email) DO NOTHING \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.image_url)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        account_opt(row)?.ok_or(StoreError::Duplicate("email"))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        account_opt(row)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        account_opt(row)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<Option<Account>> {
        let sql = format!(
            "UPDATE accounts SET role = $2, updated_at = now() WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;
        account_opt(row)
    }
}

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct DepartmentRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    staff_capacity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department {
            id: row.id,
            name: row.name,
            description: row.description,
            staff_capacity: row.staff_capacity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl DepartmentStore for PgStore {
    async fn insert(&self, department: NewDepartment) -> StoreResult<Department> {
        let sql = format!(
            "INSERT INTO departments (name, description, staff_capacity) \
             VALUES ($1, $2, $3) RETURNING {DEPARTMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DepartmentRow>(&sql)
            .bind(&department.name)
            .bind(&department.description)
            .bind(department.staff_capacity)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Department>> {
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = $1");
        let row = sqlx::query_as::<_, DepartmentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Department::from))
    }

    async fn update(&self, department: &Department) -> StoreResult<Option<Department>> {
        let sql = format!(
            "UPDATE departments \
             SET name = $2, description = $3, staff_capacity = $4, updated_at = now() \
             WHERE id = $1 RETURNING {DEPARTMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DepartmentRow>(&sql)
            .bind(department.id)
            .bind(&department.name)
            .bind(&department.description)
            .bind(department.staff_capacity)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Department::from))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Department>> {
        let sql = format!("DELETE FROM departments WHERE id = $1 RETURNING {DEPARTMENT_COLUMNS}");
        let row = sqlx::query_as::<_, DepartmentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Department::from))
    }

    async fn list(&self) -> StoreResult<Vec<Department>> {
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY name, id");
        let rows = sqlx::query_as::<_, DepartmentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Department::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Service tokens
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: Uuid,
    token_number: String,
    beneficiary_id: Uuid,
    department_id: Uuid,
    purpose: String,
    status: String,
    remarks: Option<String>,
    issued_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TokenRow> for ServiceToken {
    type Error = StoreError;

    fn try_from(row: TokenRow) -> StoreResult<Self> {
        Ok(ServiceToken {
            id: row.id,
            token_number: row.token_number,
            beneficiary_id: row.beneficiary_id,
            department_id: row.department_id,
            purpose: row.purpose,
            status: row
                .status
                .parse()
                .map_err(|e: crate::validation::ValidationError| StoreError::Corrupt(e.0))?,
            remarks: row.remarks,
            issued_at: row.issued_at,
            updated_at: row.updated_at,
        })
    }
}

fn token_opt(row: Option<TokenRow>) -> StoreResult<Option<ServiceToken>> {
    row.map(ServiceToken::try_from).transpose()
}

#[async_trait]
impl TokenStore for PgStore {
    async fn insert(&self, token: &ServiceToken) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO service_tokens \
               (id, token_number, beneficiary_id, department_id, purpose, status, remarks, \
                issued_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(token.id)
        .bind(&token.token_number)
        .bind(token.beneficiary_id)
        .bind(token.department_id)
        .bind(&token.purpose)
        .bind(token.status.as_str())
        .bind(&token.remarks)
        .bind(token.issued_at)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_as_duplicate("tokenNumber"))?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<ServiceToken>> {
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM service_tokens WHERE id = $1");
        let row = sqlx::query_as::<_, TokenRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        token_opt(row)
    }

    async fn find_by_number(&self, token_number: &str) -> StoreResult<Option<ServiceToken>> {
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM service_tokens WHERE token_number = $1");
        let row = sqlx::query_as::<_, TokenRow>(&sql)
            .bind(token_number)
            .fetch_optional(&self.pool)
            .await?;
        token_opt(row)
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: TokenStatus,
        status: TokenStatus,
        remarks: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<ServiceToken>> {
        let sql = format!(
            "UPDATE service_tokens SET status = $3, remarks = $4, updated_at = $5 \
             WHERE id = $1 AND status = $2 \
             RETURNING {TOKEN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TokenRow>(&sql)
            .bind(id)
            .bind(expected.as_str())
            .bind(status.as_str())
            .bind(remarks)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?;
        token_opt(row)
    }

    async fn list(&self) -> StoreResult<Vec<ServiceToken>> {
        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM service_tokens ORDER BY issued_at DESC, id DESC"
        );
        sqlx::query_as::<_, TokenRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(ServiceToken::try_from)
            .collect()
    }
}
