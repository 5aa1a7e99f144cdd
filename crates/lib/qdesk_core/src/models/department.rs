//! Department reference data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub staff_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Department {
    pub fn summary(&self) -> DepartmentSummary {
        DepartmentSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub name: String,
    pub description: Option<String>,
    pub staff_capacity: i32,
}

/// Department fields as submitted to the manage action.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub staff_capacity: Option<i32>,
}

impl DepartmentInput {
    pub fn into_new(self) -> Result<NewDepartment, ValidationError> {
        Ok(NewDepartment {
            name: validation::required("name", self.name)?,
            description: validation::optional(self.description),
            staff_capacity: staff_capacity(self.staff_capacity.unwrap_or(0))?,
        })
    }

    pub fn apply_to(self, department: &mut Department) -> Result<(), ValidationError> {
        if let Some(name) = self.name {
            department.name = validation::required("name", Some(name))?;
        }
        if let Some(description) = self.description {
            department.description = validation::optional(Some(description));
        }
        if let Some(capacity) = self.staff_capacity {
            department.staff_capacity = staff_capacity(capacity)?;
        }
        Ok(())
    }
}

fn staff_capacity(value: i32) -> Result<i32, ValidationError> {
    if value < 0 {
        return Err(ValidationError("staffCapacity must not be negative".into()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_name() {
        let err = DepartmentInput::default().into_new().unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn capacity_defaults_to_zero() {
        let new = DepartmentInput {
            name: Some("NADRA".into()),
            ..Default::default()
        }
        .into_new()
        .unwrap();
        assert_eq!(new.staff_capacity, 0);
        assert_eq!(new.description, None);
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let input = DepartmentInput {
            name: Some("NADRA".into()),
            staff_capacity: Some(-1),
            ..Default::default()
        };
        assert!(input.into_new().is_err());
    }
}
