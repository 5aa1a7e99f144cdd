//! Service token issuance, lookup and status updates.

use std::collections::HashMap;

use qdesk_core::auth::SessionClaims;
use qdesk_core::lifecycle;
use qdesk_core::models::{
    CitizenSummary, DepartmentSummary, NewServiceToken, PrincipalKind, ServiceToken,
    ServiceTokenView, TokenStatus,
};
use qdesk_core::store::Stores;
use qdesk_core::validation;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{GenerateTokenRequest, UpdateStatusRequest};

fn token_not_found() -> AppError {
    AppError::NotFound("Token not found".into())
}

async fn beneficiary_summary(stores: &Stores, id: Uuid) -> AppResult<Option<CitizenSummary>> {
    Ok(stores.citizens.get(id).await?.map(|c| c.summary()))
}

async fn department_summary(stores: &Stores, id: Uuid) -> AppResult<Option<DepartmentSummary>> {
    Ok(stores.departments.get(id).await?.map(|d| d.summary()))
}

async fn expand(stores: &Stores, token: ServiceToken) -> AppResult<ServiceTokenView> {
    let b = beneficiary_summary(stores, token.beneficiary_id).await?;
    let d = department_summary(stores, token.department_id).await?;
    Ok(ServiceTokenView::new(token, b, d))
}

/// Issue a `Pending` token for a beneficiary at a department.
///
/// Both references must exist at issue time. A citizen session may omit the
/// beneficiary to issue for itself.
pub async fn generate(
    stores: &Stores,
    actor: &SessionClaims,
    req: GenerateTokenRequest,
) -> AppResult<ServiceTokenView> {
    let beneficiary_id = match (req.beneficiary, actor.kind) {
        (Some(id), _) => id,
        (None, PrincipalKind::Citizen) => actor.sub,
        (None, PrincipalKind::Account) => {
            return Err(AppError::Validation("beneficiary is required".into()));
        }
    };
    let department_id = req
        .department
        .ok_or_else(|| AppError::Validation("department is required".into()))?;
    let purpose = validation::required("purpose", req.purpose)?;

    let department = department_summary(stores, department_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".into()))?;
    let beneficiary = beneficiary_summary(stores, beneficiary_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Beneficiary not found".into()))?;

    let token = lifecycle::issue(
        stores.tokens.as_ref(),
        NewServiceToken {
            beneficiary_id,
            department_id,
            purpose,
        },
    )
    .await?;

    info!(
        actor = %actor.sub,
        token_number = %token.token_number,
        department = %department.name,
        "service token generated"
    );
    Ok(ServiceTokenView::new(token, Some(beneficiary), Some(department)))
}

pub async fn get_by_id(stores: &Stores, token_id: &str) -> AppResult<ServiceTokenView> {
    // Not a UUID, so no token can have it.
    let id = Uuid::parse_str(token_id).map_err(|_| token_not_found())?;
    let token = stores.tokens.get(id).await?.ok_or_else(token_not_found)?;
    expand(stores, token).await
}

pub async fn get_by_number(stores: &Stores, token_number: &str) -> AppResult<ServiceTokenView> {
    let token = stores
        .tokens
        .find_by_number(token_number.trim())
        .await?
        .ok_or_else(token_not_found)?;
    expand(stores, token).await
}

/// Move a token to a new status, replacing its remarks.
pub async fn update_status(
    stores: &Stores,
    actor: &SessionClaims,
    req: UpdateStatusRequest,
) -> AppResult<ServiceTokenView> {
    let token_id = req
        .token_id
        .ok_or_else(|| AppError::Validation("tokenId is required".into()))?;
    let status: TokenStatus = validation::required("status", req.status)?.parse()?;

    let token = lifecycle::transition(
        stores.tokens.as_ref(),
        token_id,
        status,
        validation::optional(req.remarks),
    )
    .await?
    .ok_or_else(token_not_found)?;

    info!(actor = %actor.sub, token_number = %token.token_number, %status, "token status updated");
    expand(stores, token).await
}

/// Every token, newest first, with references expanded.
pub async fn list(stores: &Stores) -> AppResult<Vec<ServiceTokenView>> {
    let tokens = stores.tokens.list().await?;

    let mut citizens: HashMap<Uuid, Option<CitizenSummary>> = HashMap::new();
    let mut departments: HashMap<Uuid, Option<DepartmentSummary>> = HashMap::new();
    let mut views = Vec::with_capacity(tokens.len());
    for token in tokens {
        if !citizens.contains_key(&token.beneficiary_id) {
            let b = beneficiary_summary(stores, token.beneficiary_id).await?;
            citizens.insert(token.beneficiary_id, b);
        }
        if !departments.contains_key(&token.department_id) {
            let d = department_summary(stores, token.department_id).await?;
            departments.insert(token.department_id, d);
        }
        let b = citizens.get(&token.beneficiary_id).cloned().flatten();
        let d = departments.get(&token.department_id).cloned().flatten();
        views.push(ServiceTokenView::new(token, b, d));
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdesk_core::models::{
        AddressInput, ContactDetailsInput, DepartmentInput, RegisterCitizen, Role,
    };

    struct Fixture {
        stores: Stores,
        citizen: Uuid,
        department: Uuid,
        actor: SessionClaims,
    }

    async fn fixture() -> Fixture {
        let stores = Stores::in_memory();
        let citizen = stores
            .citizens
            .insert(
                RegisterCitizen {
                    name: Some("Hina".into()),
                    national_id: Some("42101-7654321-2".into()),
                    contact_details: Some(ContactDetailsInput {
                        phone: Some("+923331234567".into()),
                        alternate_phone: None,
                    }),
                    address: Some(AddressInput {
                        street: Some("Shahrah-e-Faisal".into()),
                        city: Some("Karachi".into()),
                        province: Some("Sindh".into()),
                        postal_code: None,
                    }),
                    purpose: Some("Birth certificate".into()),
                }
                .validate()
                .unwrap(),
            )
            .await
            .unwrap();
        let department = stores
            .departments
            .insert(
                DepartmentInput {
                    name: Some("Civil Registry".into()),
                    ..Default::default()
                }
                .into_new()
                .unwrap(),
            )
            .await
            .unwrap();
        Fixture {
            actor: SessionClaims {
                sub: citizen.id,
                kind: PrincipalKind::Citizen,
                role: Role::User,
                iat: 0,
                exp: 0,
            },
            stores,
            citizen: citizen.id,
            department: department.id,
        }
    }

    #[tokio::test]
    async fn citizen_may_omit_beneficiary() {
        let f = fixture().await;
        let view = generate(
            &f.stores,
            &f.actor,
            GenerateTokenRequest {
                beneficiary: None,
                department: Some(f.department),
                purpose: Some("Birth certificate".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(view.beneficiary_id, f.citizen);
        assert_eq!(view.status, TokenStatus::Pending);
        assert_eq!(view.department.unwrap().name, "Civil Registry");
    }

    #[tokio::test]
    async fn unknown_beneficiary_creates_nothing() {
        let f = fixture().await;
        let err = generate(
            &f.stores,
            &f.actor,
            GenerateTokenRequest {
                beneficiary: Some(Uuid::new_v4()),
                department: Some(f.department),
                purpose: Some("x".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(list(&f.stores).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleted_department_leaves_dangling_reference() {
        let f = fixture().await;
        let view = generate(
            &f.stores,
            &f.actor,
            GenerateTokenRequest {
                beneficiary: Some(f.citizen),
                department: Some(f.department),
                purpose: Some("x".into()),
            },
        )
        .await
        .unwrap();
        f.stores.departments.delete(f.department).await.unwrap();

        let reread = get_by_number(&f.stores, &view.token_number).await.unwrap();
        assert_eq!(reread.department_id, f.department);
        assert!(reread.department.is_none());
        assert!(reread.beneficiary.is_some());
    }

    #[tokio::test]
    async fn malformed_token_id_is_not_found() {
        let f = fixture().await;
        let err = get_by_id(&f.stores, "TKN-1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_status_is_a_validation_error() {
        let f = fixture().await;
        let err = update_status(
            &f.stores,
            &f.actor,
            UpdateStatusRequest {
                token_id: Some(Uuid::new_v4()),
                status: Some("Archived".into()),
                remarks: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
