//! Authentication service: citizen registration and login, account signup
//! and login, all delegating to `qdesk_core`.

use qdesk_core::auth::password::{hash_password, verify_missing_account, verify_password};
use qdesk_core::auth::{AuthError, SessionIssuer};
use qdesk_core::models::{
    Account, AccountProfile, CitizenSummary, NewAccount, PrincipalKind, RegisterCitizen, Role,
};
use qdesk_core::store::Stores;
use qdesk_core::validation;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{SessionResponse, SignupRequest};

fn session<U>(
    sessions: &SessionIssuer,
    sub: Uuid,
    kind: PrincipalKind,
    role: Role,
    user: U,
) -> AppResult<SessionResponse<U>> {
    let token = sessions.issue(sub, kind, role)?;
    Ok(SessionResponse {
        token,
        token_type: "Bearer",
        expires_in: sessions.ttl().num_seconds(),
        user,
    })
}

// ---------------------------------------------------------------------------
// Citizens
// ---------------------------------------------------------------------------

/// Validate and store a new citizen. The national ID must be unused.
pub async fn register_citizen(
    stores: &Stores,
    input: RegisterCitizen,
) -> AppResult<CitizenSummary> {
    let new = input.validate()?;
    let citizen = stores.citizens.insert(new).await?;
    info!(citizen_id = %citizen.id, "citizen registered");
    Ok(citizen.summary())
}

/// Look up a citizen's ID by national ID.
pub async fn find_citizen_id(
    stores: &Stores,
    national_id: Option<String>,
) -> AppResult<CitizenSummary> {
    let national_id = validation::required("nationalId", national_id)?;
    stores
        .citizens
        .find_by_national_id(&national_id)
        .await?
        .map(|c| c.summary())
        .ok_or_else(|| AppError::NotFound("No user found with this CNIC.".into()))
}

/// Citizen login: the (id, national ID) pair must match one stored record.
pub async fn login_citizen(
    stores: &Stores,
    sessions: &SessionIssuer,
    id: Option<String>,
    national_id: Option<String>,
) -> AppResult<SessionResponse<CitizenSummary>> {
    let id = validation::required("id", id)?;
    let national_id = validation::required("nationalId", national_id)?;

    // An unparseable ID cannot match any record.
    let id = Uuid::parse_str(&id).map_err(|_| AuthError::InvalidCredentials)?;
    let citizen = stores
        .citizens
        .find_by_credentials(id, &national_id)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    debug!(citizen_id = %citizen.id, "citizen logged in");
    session(
        sessions,
        citizen.id,
        PrincipalKind::Citizen,
        citizen.role,
        citizen.summary(),
    )
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Create an account and sign a session for it. The first account created
/// becomes admin.
pub async fn signup_account(
    stores: &Stores,
    sessions: &SessionIssuer,
    req: SignupRequest,
) -> AppResult<SessionResponse<AccountProfile>> {
    let name = validation::required("name", req.name)?;
    let email = validation::email(validation::required("email", req.email)?)?;
    let password = validation::password(validation::required("password", req.password)?)?;

    let account = stores
        .accounts
        .insert(NewAccount {
            name,
            email,
            password_hash: hash_password(&password)?,
            image_url: validation::optional(req.image_url),
        })
        .await?;

    info!(account_id = %account.id, role = %account.role, "account created");
    account_session(sessions, &account)
}

/// Email + password login. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn login_account(
    stores: &Stores,
    sessions: &SessionIssuer,
    email: Option<String>,
    password: Option<String>,
) -> AppResult<SessionResponse<AccountProfile>> {
    let email = validation::required("email", email)?.to_lowercase();
    let password = validation::required("password", password)?;

    let Some(account) = stores.accounts.find_by_email(&email).await? else {
        verify_missing_account(&password);
        return Err(AuthError::InvalidCredentials.into());
    };
    if !verify_password(&password, &account.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    debug!(account_id = %account.id, "account logged in");
    account_session(sessions, &account)
}

fn account_session(
    sessions: &SessionIssuer,
    account: &Account,
) -> AppResult<SessionResponse<AccountProfile>> {
    session(
        sessions,
        account.id,
        PrincipalKind::Account,
        account.role,
        account.profile(),
    )
}

/// Profile of the account behind the current session.
pub async fn account_profile(
    stores: &Stores,
    kind: PrincipalKind,
    id: Uuid,
) -> AppResult<AccountProfile> {
    let not_found = || AppError::NotFound("Account not found".into());
    if kind != PrincipalKind::Account {
        return Err(not_found());
    }
    stores
        .accounts
        .get(id)
        .await?
        .map(|a| a.profile())
        .ok_or_else(not_found)
}
