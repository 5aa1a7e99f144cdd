//! Department directory.

use qdesk_core::models::{Department, DepartmentInput};
use qdesk_core::store::Stores;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Outcome of a manage action, with the message shown to the caller.
#[derive(Debug)]
pub struct Managed {
    pub message: &'static str,
    pub department: Department,
}

fn department_not_found() -> AppError {
    AppError::NotFound("Department not found".into())
}

fn require_id(department_id: Option<Uuid>) -> AppResult<Uuid> {
    department_id.ok_or_else(|| AppError::Validation("departmentId is required".into()))
}

pub async fn list(stores: &Stores) -> AppResult<Vec<Department>> {
    Ok(stores.departments.list().await?)
}

/// Create, update or delete a department.
///
/// Deleting does not check for tokens still referencing the department.
pub async fn manage(
    stores: &Stores,
    action: Option<String>,
    department_id: Option<Uuid>,
    data: Option<DepartmentInput>,
) -> AppResult<Managed> {
    let data = data.unwrap_or_default();
    match action.as_deref().map(str::trim) {
        Some("create") => {
            let department = stores.departments.insert(data.into_new()?).await?;
            info!(department_id = %department.id, name = %department.name, "department created");
            Ok(Managed {
                message: "Department created successfully",
                department,
            })
        }
        Some("update") => {
            let id = require_id(department_id)?;
            let mut department = stores
                .departments
                .get(id)
                .await?
                .ok_or_else(department_not_found)?;
            data.apply_to(&mut department)?;
            let department = stores
                .departments
                .update(&department)
                .await?
                .ok_or_else(department_not_found)?;
            info!(department_id = %department.id, "department updated");
            Ok(Managed {
                message: "Department updated successfully",
                department,
            })
        }
        Some("delete") => {
            let id = require_id(department_id)?;
            let department = stores
                .departments
                .delete(id)
                .await?
                .ok_or_else(department_not_found)?;
            info!(department_id = %department.id, "department deleted");
            Ok(Managed {
                message: "Department deleted successfully",
                department,
            })
        }
        _ => Err(AppError::Validation("Invalid action specified".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> DepartmentInput {
        DepartmentInput {
            name: Some(name.into()),
            description: Some("Front desk".into()),
            staff_capacity: Some(4),
        }
    }

    #[tokio::test]
    async fn create_update_delete() {
        let stores = Stores::in_memory();
        let created = manage(&stores, Some("create".into()), None, Some(input("NADRA")))
            .await
            .unwrap()
            .department;

        let updated = manage(
            &stores,
            Some("update".into()),
            Some(created.id),
            Some(DepartmentInput {
                staff_capacity: Some(9),
                ..Default::default()
            }),
        )
        .await
        .unwrap()
        .department;
        assert_eq!(updated.name, "NADRA");
        assert_eq!(updated.staff_capacity, 9);

        manage(&stores, Some("delete".into()), Some(created.id), None)
            .await
            .unwrap();
        assert!(list(&stores).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_requires_an_existing_id() {
        let stores = Stores::in_memory();
        let err = manage(&stores, Some("update".into()), None, Some(input("X")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = manage(&stores, Some("delete".into()), Some(Uuid::new_v4()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let stores = Stores::in_memory();
        let err = manage(&stores, Some("rename".into()), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Invalid action specified"));
    }
}
