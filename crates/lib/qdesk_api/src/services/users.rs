//! Citizen record management: self-service profile, admin listing, updates,
//! deletion and role changes. Also account role changes.

use qdesk_core::auth::SessionClaims;
use qdesk_core::auth::password::hash_password;
use qdesk_core::models::{AccountProfile, Citizen, CitizenPatch, PrincipalKind, Role};
use qdesk_core::store::Stores;
use qdesk_core::validation::{self, ValidationError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// What `manage_citizen` did.
#[derive(Debug)]
pub enum Managed {
    Updated(Citizen),
    Deleted(Citizen),
}

fn citizen_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

fn parse_role(role: Option<String>) -> AppResult<Role> {
    validation::required("role", role)?
        .parse::<Role>()
        .map_err(|_| AppError::Validation("Invalid role provided".into()))
}

/// The citizen record behind a citizen session.
pub async fn citizen_profile(stores: &Stores, claims: &SessionClaims) -> AppResult<Citizen> {
    if claims.kind != PrincipalKind::Citizen {
        return Err(citizen_not_found());
    }
    stores
        .citizens
        .get(claims.sub)
        .await?
        .ok_or_else(citizen_not_found)
}

pub async fn list_citizens(stores: &Stores) -> AppResult<Vec<Citizen>> {
    Ok(stores.citizens.list().await?)
}

/// Apply `action` (`update` or `delete`) to a citizen record.
///
/// `target` defaults to the actor. Only admins may act on another record or
/// delete; for everyone else `role` and `password` are dropped from the patch.
pub async fn manage_citizen(
    stores: &Stores,
    actor: &SessionClaims,
    action: &str,
    target: Option<Uuid>,
    patch: Option<CitizenPatch>,
) -> AppResult<Managed> {
    let is_admin = actor.role.is_admin();
    let target = target.unwrap_or(actor.sub);
    let is_self = actor.kind == PrincipalKind::Citizen && actor.sub == target;

    if !is_admin && !is_self {
        warn!(actor = %actor.sub, %target, "refused change to another user's record");
        return Err(AppError::Forbidden(
            "You can only modify your own profile".into(),
        ));
    }

    match action {
        "update" => {
            let mut patch = patch.unwrap_or_default();
            if !is_admin {
                patch.strip_privileged();
            }
            let mut citizen = stores
                .citizens
                .get(target)
                .await?
                .ok_or_else(citizen_not_found)?;
            patch.apply_to(&mut citizen)?;
            if let Some(password) = patch.password {
                let password = validation::password(password)?;
                citizen.password_hash = Some(hash_password(&password)?);
            }
            let updated = stores
                .citizens
                .update(&citizen)
                .await?
                .ok_or_else(citizen_not_found)?;
            info!(actor = %actor.sub, citizen_id = %updated.id, "citizen updated");
            Ok(Managed::Updated(updated))
        }
        "delete" => {
            if !is_admin {
                return Err(AppError::Forbidden("Only admins can delete users".into()));
            }
            let deleted = stores
                .citizens
                .delete(target)
                .await?
                .ok_or_else(citizen_not_found)?;
            info!(actor = %actor.sub, citizen_id = %deleted.id, "citizen deleted");
            Ok(Managed::Deleted(deleted))
        }
        _ => Err(ValidationError("Invalid action specified".into()).into()),
    }
}

pub async fn set_citizen_role(
    stores: &Stores,
    user_id: Option<Uuid>,
    role: Option<String>,
) -> AppResult<Citizen> {
    let user_id = user_id.ok_or_else(|| AppError::Validation("userId is required".into()))?;
    let role = parse_role(role)?;
    let mut citizen = stores
        .citizens
        .get(user_id)
        .await?
        .ok_or_else(citizen_not_found)?;
    citizen.role = role;
    let updated = stores
        .citizens
        .update(&citizen)
        .await?
        .ok_or_else(citizen_not_found)?;
    info!(citizen_id = %updated.id, %role, "citizen role changed");
    Ok(updated)
}

pub async fn set_account_role(
    stores: &Stores,
    account_id: Option<Uuid>,
    role: Option<String>,
) -> AppResult<AccountProfile> {
    let account_id =
        account_id.ok_or_else(|| AppError::Validation("userId is required".into()))?;
    let role = parse_role(role)?;
    let account = stores
        .accounts
        .set_role(account_id, role)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".into()))?;
    info!(account_id = %account.id, %role, "account role changed");
    Ok(account.profile())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdesk_core::models::{AddressInput, ContactDetailsInput, RegisterCitizen};

    async fn seed(stores: &Stores, national_id: &str) -> Citizen {
        let new = RegisterCitizen {
            name: Some("Bilal".into()),
            national_id: Some(national_id.into()),
            contact_details: Some(ContactDetailsInput {
                phone: Some("0321-7654321".into()),
                alternate_phone: None,
            }),
            address: Some(AddressInput {
                street: Some("12 Canal Bank".into()),
                city: Some("Lahore".into()),
                province: Some("Punjab".into()),
                postal_code: Some("54000".into()),
            }),
            purpose: Some("Renewal".into()),
        }
        .validate()
        .unwrap();
        stores.citizens.insert(new).await.unwrap()
    }

    fn claims(sub: Uuid, kind: PrincipalKind, role: Role) -> SessionClaims {
        SessionClaims {
            sub,
            kind,
            role,
            iat: 0,
            exp: 0,
        }
    }

    #[tokio::test]
    async fn self_update_cannot_escalate() {
        let stores = Stores::in_memory();
        let me = seed(&stores, "35202-0000001-1").await;
        let actor = claims(me.id, PrincipalKind::Citizen, Role::User);
        let patch = CitizenPatch {
            name: Some("Bilal Ahmed".into()),
            role: Some(Role::Admin),
            password: Some("hunter22".into()),
            ..Default::default()
        };

        let Managed::Updated(updated) = manage_citizen(&stores, &actor, "update", None, Some(patch))
            .await
            .unwrap()
        else {
            panic!("expected update");
        };
        assert_eq!(updated.name, "Bilal Ahmed");
        assert_eq!(updated.role, Role::User);
        assert!(updated.password_hash.is_none());
    }

    #[tokio::test]
    async fn admin_may_set_role_and_password() {
        let stores = Stores::in_memory();
        let target = seed(&stores, "35202-0000002-2").await;
        let admin = claims(Uuid::new_v4(), PrincipalKind::Account, Role::Admin);
        let patch = CitizenPatch {
            role: Some(Role::Staff),
            password: Some("hunter22".into()),
            ..Default::default()
        };

        let Managed::Updated(updated) =
            manage_citizen(&stores, &admin, "update", Some(target.id), Some(patch))
                .await
                .unwrap()
        else {
            panic!("expected update");
        };
        assert_eq!(updated.role, Role::Staff);
        assert!(updated.password_hash.is_some());
    }

    #[tokio::test]
    async fn non_admin_cannot_touch_others_or_delete() {
        let stores = Stores::in_memory();
        let me = seed(&stores, "35202-0000003-3").await;
        let other = seed(&stores, "35202-0000004-4").await;
        let actor = claims(me.id, PrincipalKind::Citizen, Role::Staff);

        let err = manage_citizen(&stores, &actor, "update", Some(other.id), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = manage_citizen(&stores, &actor, "delete", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn unknown_action_and_missing_target() {
        let stores = Stores::in_memory();
        let admin = claims(Uuid::new_v4(), PrincipalKind::Account, Role::Admin);

        let err = manage_citizen(&stores, &admin, "archive", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = manage_citizen(&stores, &admin, "delete", Some(Uuid::new_v4()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn role_change_rejects_unknown_role() {
        let stores = Stores::in_memory();
        let target = seed(&stores, "35202-0000005-5").await;
        let err = set_citizen_role(&stores, Some(target.id), Some("root".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let updated = set_citizen_role(&stores, Some(target.id), Some("receptionist".into()))
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Receptionist);
    }
}
